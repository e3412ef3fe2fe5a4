#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Time-stepped flight of jumping actors and fired projectiles.
//!
//! Both kinds of flight share one integrator: the body follows a
//! [`Trajectory`], sampled every `time_step` seconds, until it leaves the
//! world, touches terrain, or overlaps another actor. Until the body has
//! first travelled further than its own radius from the launch point only
//! the world edge can end the flight, so a launcher resting on the ground
//! does not land on the spot it took off from. Once departed, the body is
//! checked on every step, including when it comes back down over its
//! launch point.

mod trajectory;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use worms_core::{
    unit_vector, ActorId, Circle, FlightTermination, LocationStatus, WeaponKind, GRAVITY,
};
use worms_terrain::{classify, lies_in_bounds, TerrainMap};

pub use trajectory::Trajectory;

/// Default upper bound on integration steps per flight.
pub const MAX_FLIGHT_STEPS: u32 = 1_000_000;

/// Action points converted into launch force per point spent on a jump.
pub const JUMP_FORCE_PER_POINT: f64 = 5.0;

/// Failures raised while integrating a flight.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum BallisticsError {
    /// The integration step is not a positive finite number.
    #[error("time step {time_step} must be positive and finite")]
    InvalidTimeStep {
        /// Step supplied by the caller.
        time_step: f64,
    },
    /// The body was still airborne after the step budget ran out.
    #[error("flight still airborne after {steps} steps")]
    DidNotSettle {
        /// Number of steps that were integrated.
        steps: u32,
    },
}

/// Result of a completed flight.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlightOutcome {
    landing: DVec2,
    flight_time: f64,
    termination: FlightTermination,
}

impl FlightOutcome {
    /// Center of the body where the flight ended.
    #[must_use]
    pub const fn landing(&self) -> DVec2 {
        self.landing
    }

    /// Seconds between launch and the end of the flight.
    #[must_use]
    pub const fn flight_time(&self) -> f64 {
        self.flight_time
    }

    /// Why the flight ended.
    #[must_use]
    pub const fn termination(&self) -> FlightTermination {
        self.termination
    }
}

/// Fixed-step flight integrator.
#[derive(Clone, Copy, Debug)]
pub struct FlightSimulator {
    max_steps: u32,
}

impl Default for FlightSimulator {
    fn default() -> Self {
        Self::new(MAX_FLIGHT_STEPS)
    }
}

impl FlightSimulator {
    /// Creates an integrator that gives up after `max_steps` steps.
    #[must_use]
    pub const fn new(max_steps: u32) -> Self {
        Self { max_steps }
    }

    /// Integrates a body of `radius` along `trajectory`.
    ///
    /// `obstacles` lists the actors the body may strike; the launcher must
    /// not be among them. A body sinking into terrain lands at the last
    /// sampled position that was still clear.
    pub fn simulate(
        &self,
        terrain: &TerrainMap,
        trajectory: &Trajectory,
        radius: f64,
        obstacles: &[(ActorId, Circle)],
        time_step: f64,
    ) -> Result<FlightOutcome, BallisticsError> {
        if !(time_step.is_finite() && time_step > 0.0) {
            return Err(BallisticsError::InvalidTimeStep { time_step });
        }

        let origin = trajectory.origin();
        let mut last_clear = (origin, 0.0);
        let mut departed = false;

        for step in 1..=self.max_steps {
            let time = f64::from(step) * time_step;
            let position = trajectory.position_at(time);
            let body = Circle::at(position, radius);

            if !lies_in_bounds(&body, terrain.width(), terrain.height()) {
                return Ok(outcome(position, time, FlightTermination::Exited));
            }

            departed = departed || position.distance(origin) > radius;
            let status = classify(terrain, &body);
            if !departed {
                if status != LocationStatus::Impassable {
                    last_clear = (position, time);
                }
                continue;
            }

            if let Some((actor, _)) = obstacles
                .iter()
                .find(|(_, footprint)| body.overlaps(footprint))
            {
                return Ok(outcome(
                    position,
                    time,
                    FlightTermination::Hit { actor: *actor },
                ));
            }

            match status {
                LocationStatus::Adjacent => {
                    return Ok(outcome(position, time, FlightTermination::Terrain));
                }
                LocationStatus::Impassable => {
                    let (landing, landed_at) = last_clear;
                    return Ok(outcome(landing, landed_at, FlightTermination::Terrain));
                }
                LocationStatus::Passable => last_clear = (position, time),
            }
        }

        Err(BallisticsError::DidNotSettle {
            steps: self.max_steps,
        })
    }
}

fn outcome(landing: DVec2, flight_time: f64, termination: FlightTermination) -> FlightOutcome {
    FlightOutcome {
        landing,
        flight_time,
        termination,
    }
}

/// Integrates a flight with the default step budget.
pub fn simulate_flight(
    terrain: &TerrainMap,
    trajectory: &Trajectory,
    radius: f64,
    obstacles: &[(ActorId, Circle)],
    time_step: f64,
) -> Result<FlightOutcome, BallisticsError> {
    FlightSimulator::default().simulate(terrain, trajectory, radius, obstacles, time_step)
}

/// Launch force of a jump spending `action_points`.
#[must_use]
pub fn jump_force(action_points: u32, mass: f64) -> f64 {
    JUMP_FORCE_PER_POINT * f64::from(action_points) + mass * GRAVITY
}

/// Trajectory of an actor jumping along `orientation` with all its points.
#[must_use]
pub fn jump_trajectory(
    footprint: &Circle,
    orientation: f64,
    action_points: u32,
    mass: f64,
) -> Trajectory {
    Trajectory::new(
        footprint.center(),
        orientation,
        jump_force(action_points, mass),
        mass,
    )
}

/// Trajectory of a projectile fired from the launcher's surface.
#[must_use]
pub fn projectile_trajectory(
    launcher: &Circle,
    orientation: f64,
    weapon: WeaponKind,
    yield_percent: u32,
) -> Trajectory {
    let muzzle = launcher.center() + unit_vector(orientation) * launcher.radius();
    Trajectory::new(
        muzzle,
        orientation,
        weapon.force_for_yield(yield_percent),
        weapon.mass(),
    )
}

/// Reports whether a launch costing `cost` points may start from `footprint`.
///
/// The launcher needs at least one action point even for free launches.
#[must_use]
pub fn can_launch(terrain: &TerrainMap, footprint: &Circle, action_points: u32, cost: u32) -> bool {
    action_points > 0
        && action_points >= cost
        && classify(terrain, footprint) != LocationStatus::Impassable
}
