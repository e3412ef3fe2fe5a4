#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Immutable terrain bitmap and the circle classifier built on top of it.
//!
//! The map stores one passable flag per pixel together with the metric extent
//! of the world. Metric coordinates grow rightward and upward while grid rows
//! grow downward, so row zero is the top edge of the map. Every lookup clamps
//! into the grid rather than failing; callers that care about the world edge
//! ask [`lies_in_bounds`] explicitly.

mod classifier;

use glam::DVec2;
use thiserror::Error;
use worms_core::CellCoord;

pub use classifier::{classify, lies_in_bounds, ADJACENCY_MARGIN, BOUNDARY_SAMPLES};

/// Glyph marking a passable pixel in ASCII layouts.
pub const PASSABLE_GLYPH: char = '.';
/// Glyph marking an impassable pixel in ASCII layouts.
pub const IMPASSABLE_GLYPH: char = '#';

/// Reasons a terrain map could not be constructed.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum TerrainError {
    /// The grid contained no cells.
    #[error("terrain grid must contain at least one cell")]
    EmptyGrid,
    /// A row's length differs from the first row.
    #[error("terrain row {row} has {found} cells, expected {expected}")]
    RaggedRows {
        /// Zero-based index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
    /// The metric extent is not a positive finite size.
    #[error("terrain extent {width} x {height} must be positive and finite")]
    InvalidExtent {
        /// Requested metric width.
        width: f64,
        /// Requested metric height.
        height: f64,
    },
    /// An ASCII layout contained a glyph other than `.` or `#`.
    #[error("unknown terrain glyph {glyph:?} at row {row}, column {column}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Zero-based row of the glyph.
        row: usize,
        /// Zero-based column of the glyph.
        column: usize,
    },
}

/// Passable/impassable pixel grid spanning a metric rectangle.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainMap {
    width: f64,
    height: f64,
    columns: u32,
    rows: u32,
    cells: Vec<bool>,
}

impl TerrainMap {
    /// Builds a map from rows of passable flags, top row first.
    pub fn new(width: f64, height: f64, grid: Vec<Vec<bool>>) -> Result<Self, TerrainError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(TerrainError::InvalidExtent { width, height });
        }

        let expected = grid.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(TerrainError::EmptyGrid);
        }

        let mut cells = Vec::with_capacity(expected * grid.len());
        for (row, values) in grid.iter().enumerate() {
            if values.len() != expected {
                return Err(TerrainError::RaggedRows {
                    row,
                    expected,
                    found: values.len(),
                });
            }
            cells.extend_from_slice(values);
        }

        let columns = u32::try_from(expected).map_err(|_| TerrainError::EmptyGrid)?;
        let rows = u32::try_from(grid.len()).map_err(|_| TerrainError::EmptyGrid)?;

        Ok(Self {
            width,
            height,
            columns,
            rows,
            cells,
        })
    }

    /// Parses a layout where `.` marks passable and `#` impassable pixels.
    ///
    /// Blank lines and surrounding whitespace are ignored; the first
    /// remaining line is the top of the map.
    pub fn from_ascii(width: f64, height: f64, layout: &str) -> Result<Self, TerrainError> {
        let mut grid = Vec::new();
        for (row, line) in layout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
        {
            let mut values = Vec::with_capacity(line.len());
            for (column, glyph) in line.chars().enumerate() {
                match glyph {
                    PASSABLE_GLYPH => values.push(true),
                    IMPASSABLE_GLYPH => values.push(false),
                    other => {
                        return Err(TerrainError::UnknownGlyph {
                            glyph: other,
                            row,
                            column,
                        })
                    }
                }
            }
            grid.push(values);
        }

        Self::new(width, height, grid)
    }

    /// Metric width of the world.
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Metric height of the world.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Number of pixel columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of pixel rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Converts a metric position into the grid cell that contains it.
    ///
    /// Each axis is scaled independently and clamped into the grid, so
    /// positions outside the world resolve to the nearest edge cell.
    #[must_use]
    pub fn metric_to_cell(&self, x: f64, y: f64) -> CellCoord {
        let column = scale_into(x / self.width, self.columns);
        let row = scale_into((self.height - y) / self.height, self.rows);
        CellCoord::new(column, row)
    }

    /// Reports whether the cell is passable; cells outside the grid are not.
    #[must_use]
    pub fn is_passable_cell(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Reports whether the pixel under the metric position is passable.
    #[must_use]
    pub fn is_passable_at(&self, point: DVec2) -> bool {
        self.is_passable_cell(self.metric_to_cell(point.x, point.y))
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

fn scale_into(fraction: f64, dimension: u32) -> u32 {
    let last = f64::from(dimension.saturating_sub(1));
    let scaled = (fraction * f64::from(dimension)).floor();
    if scaled.is_nan() {
        return 0;
    }
    scaled.clamp(0.0, last) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor_map() -> TerrainMap {
        TerrainMap::from_ascii(
            5.0,
            5.0,
            "
            #####
            #####
            .....
            .....
            .....
            ",
        )
        .expect("valid layout")
    }

    #[test]
    fn ascii_layout_preserves_dimensions() {
        let map = floor_map();
        assert_eq!(map.columns(), 5);
        assert_eq!(map.rows(), 5);
        assert_eq!(map.width(), 5.0);
        assert_eq!(map.height(), 5.0);
    }

    #[test]
    fn metric_y_is_inverted() {
        let map = floor_map();
        assert_eq!(map.metric_to_cell(0.5, 4.5), CellCoord::new(0, 0));
        assert_eq!(map.metric_to_cell(0.5, 0.5), CellCoord::new(0, 4));
        assert_eq!(map.metric_to_cell(3.2, 2.9), CellCoord::new(3, 2));
    }

    #[test]
    fn out_of_range_positions_clamp_to_edges() {
        let map = floor_map();
        assert_eq!(map.metric_to_cell(-3.0, -1.0), CellCoord::new(0, 4));
        assert_eq!(map.metric_to_cell(9.0, 12.0), CellCoord::new(4, 0));
        assert_eq!(map.metric_to_cell(5.0, 0.0), CellCoord::new(4, 4));
        assert_eq!(map.metric_to_cell(f64::NAN, f64::NAN), CellCoord::new(0, 0));
    }

    #[test]
    fn passable_lookup_reads_grid() {
        let map = floor_map();
        assert!(!map.is_passable_cell(CellCoord::new(2, 1)));
        assert!(map.is_passable_cell(CellCoord::new(2, 2)));
        assert!(!map.is_passable_cell(CellCoord::new(7, 2)));
        assert!(map.is_passable_at(DVec2::new(2.5, 1.0)));
        assert!(!map.is_passable_at(DVec2::new(2.5, 3.5)));
    }

    #[test]
    fn metric_scaling_respects_resolution() {
        let map = TerrainMap::new(2.0, 1.0, vec![vec![true, false, true, false]])
            .expect("valid grid");
        assert_eq!(map.metric_to_cell(0.49, 0.5), CellCoord::new(0, 0));
        assert_eq!(map.metric_to_cell(0.51, 0.5), CellCoord::new(1, 0));
        assert_eq!(map.metric_to_cell(1.99, 0.5), CellCoord::new(3, 0));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let error = TerrainMap::new(1.0, 1.0, vec![vec![true, true], vec![true]])
            .expect_err("ragged grid");
        assert_eq!(
            error,
            TerrainError::RaggedRows {
                row: 1,
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn empty_grid_is_rejected() {
        assert_eq!(
            TerrainMap::new(1.0, 1.0, Vec::new()),
            Err(TerrainError::EmptyGrid)
        );
        assert_eq!(
            TerrainMap::from_ascii(1.0, 1.0, "\n\n"),
            Err(TerrainError::EmptyGrid)
        );
    }

    #[test]
    fn degenerate_extent_is_rejected() {
        assert!(matches!(
            TerrainMap::new(0.0, 1.0, vec![vec![true]]),
            Err(TerrainError::InvalidExtent { .. })
        ));
        assert!(matches!(
            TerrainMap::new(1.0, f64::INFINITY, vec![vec![true]]),
            Err(TerrainError::InvalidExtent { .. })
        ));
    }

    #[test]
    fn unknown_glyphs_are_reported() {
        assert_eq!(
            TerrainMap::from_ascii(1.0, 1.0, "..\n.x"),
            Err(TerrainError::UnknownGlyph {
                glyph: 'x',
                row: 1,
                column: 1,
            })
        );
    }
}
