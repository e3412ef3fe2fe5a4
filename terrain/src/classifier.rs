//! Classification of circular footprints against the terrain bitmap.

use std::sync::OnceLock;

use glam::DVec2;
use worms_core::{unit_vector, Circle, LocationStatus};

use crate::TerrainMap;

/// Number of evenly spaced boundary samples, one per integer degree.
pub const BOUNDARY_SAMPLES: usize = 360;

/// Radius multiplier of the outer ring sampled for resting contact.
pub const ADJACENCY_MARGIN: f64 = 1.1;

/// Classifies the circle as impassable, adjacent, or passable.
///
/// Each boundary sample at the nominal radius must land on a passable pixel,
/// otherwise the circle is impassable and the scan stops immediately. A
/// circle whose boundary is clear but whose outer ring at
/// [`ADJACENCY_MARGIN`] times the radius touches impassable terrain is
/// adjacent. Anything else is passable.
#[must_use]
pub fn classify(terrain: &TerrainMap, circle: &Circle) -> LocationStatus {
    let center = circle.center();
    let inner = circle.radius();
    let outer = inner * ADJACENCY_MARGIN;
    let mut touches_terrain = false;

    for direction in boundary_directions() {
        if !terrain.is_passable_at(center + *direction * inner) {
            return LocationStatus::Impassable;
        }
        if !touches_terrain && !terrain.is_passable_at(center + *direction * outer) {
            touches_terrain = true;
        }
    }

    if touches_terrain {
        LocationStatus::Adjacent
    } else {
        LocationStatus::Passable
    }
}

/// Reports whether the whole circle lies inside `[0, width] x [0, height]`.
#[must_use]
pub fn lies_in_bounds(circle: &Circle, width: f64, height: f64) -> bool {
    let radius = circle.radius();
    circle.x() - radius >= 0.0
        && circle.x() + radius <= width
        && circle.y() - radius >= 0.0
        && circle.y() + radius <= height
}

fn boundary_directions() -> &'static [DVec2] {
    static DIRECTIONS: OnceLock<Vec<DVec2>> = OnceLock::new();
    DIRECTIONS.get_or_init(|| {
        (0..BOUNDARY_SAMPLES)
            .map(|degree| unit_vector((degree as f64).to_radians()))
            .collect()
    })
}
