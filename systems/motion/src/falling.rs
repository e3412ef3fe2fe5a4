use glam::DVec2;
use worms_core::{Circle, LocationStatus};
use worms_terrain::{classify, lies_in_bounds, TerrainMap};

/// Vertical distance covered by one falling step, in metres.
pub const FALL_STEP: f64 = 0.01;

/// Hit points lost per whole metre of drop.
pub const FALL_DAMAGE_PER_METRE: u32 = 3;

/// Where a fall ended.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FallOutcome {
    /// The body came to rest inside the world.
    Landed {
        /// Center of the footprint after the fall.
        position: DVec2,
        /// Hit points lost to the drop.
        damage: u32,
    },
    /// The footprint left the world before finding support.
    Exited {
        /// Center of the first footprint outside the world.
        position: DVec2,
    },
}

/// Reports whether the footprint hangs free of any terrain.
#[must_use]
pub fn can_fall(terrain: &TerrainMap, footprint: &Circle) -> bool {
    classify(terrain, footprint) == LocationStatus::Passable
}

/// Lowers the footprint until it rests against terrain.
///
/// A footprint that is not free to fall lands in place without damage. A
/// step that would sink into terrain stops the fall one step earlier.
#[must_use]
pub fn fall(terrain: &TerrainMap, footprint: &Circle) -> FallOutcome {
    let start = footprint.center();
    if !can_fall(terrain, footprint) {
        return FallOutcome::Landed {
            position: start,
            damage: 0,
        };
    }

    let mut resting = start;
    let mut step: u32 = 1;
    loop {
        let drop = f64::from(step) * FALL_STEP;
        let candidate = Circle::new(start.x, start.y - drop, footprint.radius());
        if !lies_in_bounds(&candidate, terrain.width(), terrain.height()) {
            return FallOutcome::Exited {
                position: candidate.center(),
            };
        }

        match classify(terrain, &candidate) {
            LocationStatus::Passable => resting = candidate.center(),
            LocationStatus::Adjacent => {
                return landed(start, candidate.center());
            }
            LocationStatus::Impassable => return landed(start, resting),
        }

        step = match step.checked_add(1) {
            Some(next) => next,
            None => return landed(start, resting),
        };
    }
}

/// Hit points lost when dropping `drop` metres.
#[must_use]
pub fn fall_damage(drop: f64) -> u32 {
    let metres = drop.max(0.0).floor();
    if metres.is_nan() {
        return 0;
    }
    (metres.min(f64::from(u32::MAX)) as u32).saturating_mul(FALL_DAMAGE_PER_METRE)
}

fn landed(start: DVec2, position: DVec2) -> FallOutcome {
    FallOutcome::Landed {
        position,
        damage: fall_damage(start.y - position.y),
    }
}
