use glam::DVec2;
use serde::{Deserialize, Serialize};
use worms_core::{unit_vector, GRAVITY};

/// Parabolic path of a body launched under constant downward gravity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    origin: DVec2,
    angle: f64,
    initial_speed: f64,
}

impl Trajectory {
    /// Trajectory of a body of `mass` pushed with `force` along `angle`.
    ///
    /// The push acts for half a second, so the launch speed is
    /// `force / (2 × mass)`.
    #[must_use]
    pub fn new(origin: DVec2, angle: f64, force: f64, mass: f64) -> Self {
        Self::with_speed(origin, angle, force / (2.0 * mass))
    }

    /// Trajectory with an explicit launch speed in m/s.
    #[must_use]
    pub const fn with_speed(origin: DVec2, angle: f64, initial_speed: f64) -> Self {
        Self {
            origin,
            angle,
            initial_speed,
        }
    }

    /// Launch position.
    #[must_use]
    pub const fn origin(&self) -> DVec2 {
        self.origin
    }

    /// Launch angle in radians.
    #[must_use]
    pub const fn angle(&self) -> f64 {
        self.angle
    }

    /// Launch speed in m/s.
    #[must_use]
    pub const fn initial_speed(&self) -> f64 {
        self.initial_speed
    }

    /// Position of the body `time` seconds after launch.
    #[must_use]
    pub fn position_at(&self, time: f64) -> DVec2 {
        let velocity = unit_vector(self.angle) * self.initial_speed;
        DVec2::new(
            self.origin.x + velocity.x * time,
            self.origin.y + velocity.y * time - 0.5 * GRAVITY * time * time,
        )
    }

    /// Time at which the body reaches its highest point.
    ///
    /// Negative for downward launches, whose apex lies before the launch.
    #[must_use]
    pub fn apex_time(&self) -> f64 {
        self.initial_speed * self.angle.sin() / GRAVITY
    }

    /// Horizontal distance covered before returning to the launch height.
    #[must_use]
    pub fn range(&self) -> f64 {
        self.initial_speed.powi(2) * (2.0 * self.angle).sin() / GRAVITY
    }
}
