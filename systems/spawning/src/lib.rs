#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded spawning system that places actors and food against terrain.

use std::f64::consts::TAU;

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use worms_core::{
    Circle, Command, LocationStatus, TeamId, FOOD_RADIUS, MINIMUM_ACTOR_RADIUS,
};
use worms_terrain::{classify, lies_in_bounds, TerrainMap};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
    max_attempts: u32,
    radius_range: (f64, f64),
}

impl Config {
    /// Creates a configuration with the provided seed and default limits.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            max_attempts: 10_000,
            radius_range: (MINIMUM_ACTOR_RADIUS, 1.0),
        }
    }

    /// Overrides how many random positions are tried per placement.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Overrides the half-open range actor radii are drawn from.
    #[must_use]
    pub const fn with_radius_range(mut self, minimum: f64, maximum: f64) -> Self {
        self.radius_range = (minimum, maximum);
        self
    }
}

/// Actor placement requested from the spawning system.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorRequest {
    /// Display name of the actor.
    pub name: String,
    /// Team the actor joins, if any.
    pub team: Option<TeamId>,
}

/// Pure system that proposes spawn commands at resting positions.
#[derive(Debug)]
pub struct Spawning {
    rng: ChaCha8Rng,
    max_attempts: u32,
    radius_range: (f64, f64),
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            max_attempts: config.max_attempts,
            radius_range: config.radius_range,
        }
    }

    /// Emits spawn commands for every request and `food` food items.
    ///
    /// `occupied` lists footprints already in the world; new placements
    /// never overlap them or each other. Requests that find no position
    /// within the attempt budget are skipped. Returns the number of commands
    /// pushed.
    pub fn handle(
        &mut self,
        terrain: &TerrainMap,
        actors: &[ActorRequest],
        food: u32,
        occupied: &[Circle],
        out: &mut Vec<Command>,
    ) -> usize {
        let mut taken = occupied.to_vec();
        let before = out.len();

        for request in actors {
            let Some(footprint) = self.find_actor_spot(terrain, &taken) else {
                continue;
            };
            taken.push(footprint);
            let orientation = self.rng.gen_range(0.0..TAU);
            out.push(Command::SpawnActor {
                position: footprint.center(),
                orientation,
                radius: footprint.radius(),
                name: request.name.clone(),
                team: request.team,
            });
        }

        for _ in 0..food {
            let Some(footprint) = self.find_spot(terrain, FOOD_RADIUS, &taken) else {
                continue;
            };
            taken.push(footprint);
            out.push(Command::SpawnFood {
                position: footprint.center(),
            });
        }

        out.len() - before
    }

    /// Proposes a resting footprint for a new actor.
    pub fn find_actor_spot(&mut self, terrain: &TerrainMap, occupied: &[Circle]) -> Option<Circle> {
        let (minimum, maximum) = self.radius_range;
        if !(minimum.is_finite() && maximum.is_finite() && minimum > 0.0 && maximum > minimum) {
            return None;
        }
        let radius = self.rng.gen_range(minimum..maximum);
        self.find_spot(terrain, radius, occupied)
    }

    /// Proposes a resting footprint of the given radius.
    pub fn find_spot(
        &mut self,
        terrain: &TerrainMap,
        radius: f64,
        occupied: &[Circle],
    ) -> Option<Circle> {
        let horizontal = (radius, terrain.width() - radius);
        let vertical = (radius, terrain.height() - radius);
        if !(horizontal.1 > horizontal.0 && vertical.1 > vertical.0) {
            return None;
        }

        for _ in 0..self.max_attempts {
            let center = DVec2::new(
                self.rng.gen_range(horizontal.0..horizontal.1),
                self.rng.gen_range(vertical.0..vertical.1),
            );
            let candidate = Circle::at(center, radius);
            if lies_in_bounds(&candidate, terrain.width(), terrain.height())
                && classify(terrain, &candidate) == LocationStatus::Adjacent
                && !occupied.iter().any(|other| other.overlaps(&candidate))
            {
                return Some(candidate);
            }
        }
        None
    }
}
