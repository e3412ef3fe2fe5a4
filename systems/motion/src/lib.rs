#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic walking planner that picks an actor's best single step.
//!
//! The planner fans a fixed set of candidate headings around the actor's
//! facing, walks increasing distances along each one, and keeps the longest
//! step that leaves the actor resting against terrain. Falling lives in
//! [`fall`] because the planner hands unsupported actors over to it.

mod falling;

use std::f64::consts::TAU;

use glam::DVec2;
use worms_core::{normalize_angle, BlockReason, Circle, LocationStatus};
use worms_terrain::{classify, TerrainMap};

pub use falling::{can_fall, fall, fall_damage, FallOutcome, FALL_DAMAGE_PER_METRE, FALL_STEP};

const ROUNDING_TOLERANCE: f64 = 1e-9;

/// Tunables of the fan search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FanConfig {
    /// Number of heading steps examined on each side of the facing.
    pub divergence_steps: u32,
    /// Angular distance between neighbouring headings, in radians.
    pub heading_step: f64,
    /// Shortest travel distance sampled along a heading, in metres.
    pub minimum_distance: f64,
    /// Distance between neighbouring travel samples, in metres.
    pub distance_step: f64,
}

impl Default for FanConfig {
    fn default() -> Self {
        Self {
            divergence_steps: 45,
            heading_step: 0.0175,
            minimum_distance: 0.1,
            distance_step: 0.01,
        }
    }
}

/// Outcome category of a planned step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// The step ends resting against terrain.
    Adjacent,
    /// Nothing nearby supports the actor; it steps its full radius along its
    /// facing and then falls.
    PassableFall,
    /// No step is possible.
    Blocked(BlockReason),
}

/// Step chosen by the fan search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovePlan {
    heading: f64,
    distance: f64,
    destination: DVec2,
    kind: MoveKind,
}

impl MovePlan {
    fn blocked(footprint: &Circle, orientation: f64, reason: BlockReason) -> Self {
        Self {
            heading: orientation,
            distance: 0.0,
            destination: footprint.center(),
            kind: MoveKind::Blocked(reason),
        }
    }

    /// Heading of the step in radians, not normalized.
    #[must_use]
    pub const fn heading(&self) -> f64 {
        self.heading
    }

    /// Travel distance in metres; zero when blocked.
    #[must_use]
    pub const fn distance(&self) -> f64 {
        self.distance
    }

    /// Center of the footprint after the step.
    #[must_use]
    pub const fn destination(&self) -> DVec2 {
        self.destination
    }

    /// Category of the step.
    #[must_use]
    pub const fn kind(&self) -> MoveKind {
        self.kind
    }

    /// Reports whether the step may be executed.
    #[must_use]
    pub const fn is_admissible(&self) -> bool {
        !matches!(self.kind, MoveKind::Blocked(_))
    }

    /// Whole action points deducted when the step is executed.
    #[must_use]
    pub fn cost(&self) -> u32 {
        if self.is_admissible() {
            move_cost_points(self.heading)
        } else {
            0
        }
    }
}

/// Pure planner that evaluates walking steps against the terrain.
#[derive(Clone, Copy, Debug, Default)]
pub struct MotionPlanner {
    config: FanConfig,
}

impl MotionPlanner {
    /// Creates a planner with explicit fan tunables.
    #[must_use]
    pub const fn new(config: FanConfig) -> Self {
        Self { config }
    }

    /// Fan tunables in use.
    #[must_use]
    pub const fn config(&self) -> FanConfig {
        self.config
    }

    /// Picks the best step for an actor standing at `footprint`.
    ///
    /// The longest resting step wins; equal lengths go to the heading
    /// closest to `orientation`, and on an exact tie the clockwise
    /// candidate, which is examined first.
    #[must_use]
    pub fn plan(
        &self,
        terrain: &TerrainMap,
        footprint: &Circle,
        orientation: f64,
        action_points: u32,
    ) -> MovePlan {
        let spread = i64::from(self.config.divergence_steps);
        let mut affordable = false;
        let mut scanned = false;
        let mut forward_scanned = false;
        let mut uniformly_passable = true;
        let mut best: Option<Candidate> = None;

        for offset in -spread..=spread {
            let heading = orientation + offset as f64 * self.config.heading_step;
            let scan = self.scan_heading(terrain, footprint, heading, action_points);

            let (resting, passable) = match scan {
                HeadingScan::Unaffordable => continue,
                HeadingScan::Obstructed => {
                    affordable = true;
                    continue;
                }
                HeadingScan::Scanned { resting, passable } => (resting, passable),
            };

            affordable = true;
            scanned = true;
            forward_scanned |= offset == 0;
            uniformly_passable &= passable;

            if let Some(sample) = resting {
                let candidate = Candidate {
                    sample,
                    deviation: offset.unsigned_abs(),
                    heading,
                };
                if best.map_or(true, |current| candidate.beats(&current)) {
                    best = Some(candidate);
                }
            }
        }

        if !affordable {
            return MovePlan::blocked(footprint, orientation, BlockReason::InsufficientActionPoints);
        }

        if let Some(candidate) = best {
            let distance = self.sample_distance(candidate.sample);
            return MovePlan {
                heading: candidate.heading,
                distance,
                destination: footprint.displaced(candidate.heading, distance).center(),
                kind: MoveKind::Adjacent,
            };
        }

        if scanned && uniformly_passable && forward_scanned {
            let distance = footprint.radius();
            return MovePlan {
                heading: orientation,
                distance,
                destination: footprint.displaced(orientation, distance).center(),
                kind: MoveKind::PassableFall,
            };
        }

        MovePlan::blocked(footprint, orientation, BlockReason::Impassable)
    }

    fn scan_heading(
        &self,
        terrain: &TerrainMap,
        footprint: &Circle,
        heading: f64,
        action_points: u32,
    ) -> HeadingScan {
        if move_cost_points(heading) > action_points {
            return HeadingScan::Unaffordable;
        }

        let first_step = footprint.displaced(heading, self.config.minimum_distance);
        if classify(terrain, &first_step) == LocationStatus::Impassable {
            return HeadingScan::Obstructed;
        }

        let Some(last) = self.last_sample(footprint.radius()) else {
            return HeadingScan::Scanned {
                resting: None,
                passable: false,
            };
        };

        let mut resting = None;
        let mut obstructed = false;
        for sample in 0..=last {
            let candidate = footprint.displaced(heading, self.sample_distance(sample));
            match classify(terrain, &candidate) {
                LocationStatus::Adjacent => resting = Some(sample),
                LocationStatus::Impassable => {
                    obstructed = true;
                    break;
                }
                LocationStatus::Passable => {}
            }
        }

        HeadingScan::Scanned {
            resting,
            passable: resting.is_none() && !obstructed,
        }
    }

    fn sample_distance(&self, sample: u32) -> f64 {
        self.config.minimum_distance + f64::from(sample) * self.config.distance_step
    }

    fn last_sample(&self, radius: f64) -> Option<u32> {
        let span = (radius - self.config.minimum_distance) / self.config.distance_step;
        if span.is_nan() || span < 0.0 {
            return None;
        }
        let last = (span + ROUNDING_TOLERANCE).floor();
        if last > f64::from(u32::MAX) {
            return None;
        }
        Some(last as u32)
    }
}

#[derive(Clone, Copy, Debug)]
enum HeadingScan {
    Unaffordable,
    Obstructed,
    Scanned {
        resting: Option<u32>,
        passable: bool,
    },
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    sample: u32,
    deviation: u64,
    heading: f64,
}

impl Candidate {
    fn beats(&self, other: &Candidate) -> bool {
        self.sample > other.sample
            || (self.sample == other.sample && self.deviation < other.deviation)
    }
}

/// Fractional action-point cost of one step along `heading`.
///
/// Vertical travel weighs four times as much as horizontal travel.
#[must_use]
pub fn move_cost(heading: f64) -> f64 {
    heading.sin().abs() * 4.0 + heading.cos().abs()
}

/// Whole action points deducted for a step along `heading`.
#[must_use]
pub fn move_cost_points(heading: f64) -> u32 {
    whole_points(move_cost(heading))
}

/// Whole action points deducted for rotating by `angle` radians.
///
/// A full revolution costs sixty points; multiples of a revolution reduce
/// to their remainder.
#[must_use]
pub fn turn_cost_points(angle: f64) -> u32 {
    let remainder = angle.abs() % TAU;
    whole_points(60.0 * remainder / TAU)
}

// Rounds up, ignoring float noise below a billionth of a point.
fn whole_points(cost: f64) -> u32 {
    let rounded = (cost - ROUNDING_TOLERANCE).ceil();
    if rounded.is_nan() {
        return 0;
    }
    rounded.clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Orientation after rotating `orientation` by `angle`, within `[0, 2π)`.
#[must_use]
pub fn turned_orientation(orientation: f64, angle: f64) -> f64 {
    normalize_angle(orientation + angle)
}

/// Reports whether the default planner finds an executable step.
#[must_use]
pub fn can_move(
    terrain: &TerrainMap,
    footprint: &Circle,
    orientation: f64,
    action_points: u32,
) -> bool {
    MotionPlanner::default()
        .plan(terrain, footprint, orientation, action_points)
        .is_admissible()
}
