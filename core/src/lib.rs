#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Worms engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired actions, the world validates and executes them via its
//! `apply` entry point, and then reports [`Event`] values describing every
//! observable change. Systems consult immutable terrain and actor views and
//! respond exclusively with new command batches or pure computations.

use std::f64::consts::{PI, TAU};

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Gravitational acceleration applied to every flying body, in m/s².
pub const GRAVITY: f64 = 9.806_65;

/// Density shared by every actor, in kg/m³.
pub const ACTOR_DENSITY: f64 = 1_062.0;

/// Density shared by every projectile, in kg/m³.
pub const PROJECTILE_DENSITY: f64 = 7_800.0;

/// Smallest radius an actor may legally have, in metres.
pub const MINIMUM_ACTOR_RADIUS: f64 = 0.25;

/// Radius of a single food item, in metres.
pub const FOOD_RADIUS: f64 = 0.2;

/// Hit points restored to an actor when its turn begins.
pub const TURN_HEAL: u32 = 10;

/// Lifecycle of a single round as tracked by the turn engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Actors and teams may still be registered; nobody acts yet.
    AwaitingStart,
    /// Exactly one actor holds the turn and may act.
    TurnInProgress,
    /// A winner was determined; only queries remain valid.
    RoundOver,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Registers an empty team that actors may join.
    AddTeam {
        /// Display name of the team.
        name: String,
    },
    /// Places a new actor into the world before the round starts.
    SpawnActor {
        /// Metric position of the actor's center.
        position: DVec2,
        /// Initial facing in radians.
        orientation: f64,
        /// Radius of the actor's circular footprint.
        radius: f64,
        /// Display name of the actor.
        name: String,
        /// Team the actor joins, if any.
        team: Option<TeamId>,
    },
    /// Places a food item into the world before the round starts.
    SpawnFood {
        /// Metric position of the food's center.
        position: DVec2,
    },
    /// Starts the round by handing the turn to the first actor.
    StartRound,
    /// Ends the current turn and hands it to the next actor.
    AdvanceTurn,
    /// Walks the actor one step using the fan search.
    Move {
        /// Actor attempting to walk.
        actor: ActorId,
    },
    /// Rotates the actor by the provided angle.
    Turn {
        /// Actor attempting to rotate.
        actor: ActorId,
        /// Signed rotation in radians.
        angle: f64,
    },
    /// Launches the actor along a parabolic trajectory.
    Jump {
        /// Actor attempting to jump.
        actor: ActorId,
        /// Integration step used while simulating the flight, in seconds.
        time_step: f64,
    },
    /// Lowers an unsupported actor until it rests against terrain.
    Fall {
        /// Actor that should fall.
        actor: ActorId,
    },
    /// Fires the actor's selected weapon.
    Shoot {
        /// Actor pulling the trigger.
        actor: ActorId,
        /// Launch yield in percent, interpolating the weapon's force range.
        yield_percent: u32,
        /// Integration step used while simulating the flight, in seconds.
        time_step: f64,
    },
    /// Cycles the actor's selected weapon.
    SelectNextWeapon {
        /// Actor switching weapons.
        actor: ActorId,
    },
    /// Terminates the retained projectile so the turn may continue.
    ResolveProjectile,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Confirms that a team was registered.
    TeamAdded {
        /// Identifier allocated to the team.
        team: TeamId,
        /// Display name of the team.
        name: String,
    },
    /// Confirms that an actor was placed into the world.
    ActorSpawned {
        /// Identifier allocated to the actor.
        actor: ActorId,
        /// Footprint occupied by the actor.
        footprint: Circle,
    },
    /// Confirms that a food item was placed into the world.
    FoodSpawned {
        /// Identifier allocated to the food item.
        food: FoodId,
        /// Footprint occupied by the food.
        footprint: Circle,
    },
    /// Announces that the round left its setup phase.
    RoundStarted,
    /// Announces that an actor received the turn.
    TurnStarted {
        /// Actor holding the turn.
        actor: ActorId,
        /// Hit points after the turn-start heal.
        hit_points: u32,
        /// Action points after the refill.
        action_points: u32,
    },
    /// Confirms that an actor walked.
    ActorMoved {
        /// Actor that walked.
        actor: ActorId,
        /// Position before the step.
        from: DVec2,
        /// Position after the step.
        to: DVec2,
        /// Action points consumed by the step.
        cost: u32,
    },
    /// Confirms that an actor rotated.
    ActorTurned {
        /// Actor that rotated.
        actor: ActorId,
        /// Orientation after the rotation, in `[0, 2π)`.
        orientation: f64,
        /// Action points consumed by the rotation.
        cost: u32,
    },
    /// Confirms that an actor completed a jump.
    ActorJumped {
        /// Actor that jumped.
        actor: ActorId,
        /// Launch position.
        from: DVec2,
        /// Landing position.
        to: DVec2,
        /// Simulated flight duration in seconds.
        flight_time: f64,
    },
    /// Confirms that an actor fell onto terrain.
    ActorFell {
        /// Actor that fell.
        actor: ActorId,
        /// Position before falling.
        from: DVec2,
        /// Resting position after falling.
        to: DVec2,
        /// Hit points lost to the fall.
        damage: u32,
    },
    /// Confirms that an actor switched weapons.
    WeaponSelected {
        /// Actor that switched.
        actor: ActorId,
        /// Weapon now selected.
        weapon: WeaponKind,
    },
    /// Confirms that a projectile was launched and its flight simulated.
    ProjectileFired {
        /// Actor that fired.
        actor: ActorId,
        /// Weapon that produced the projectile.
        weapon: WeaponKind,
        /// Launch position of the projectile.
        from: DVec2,
        /// Position where the flight ended.
        to: DVec2,
        /// Simulated flight duration in seconds.
        flight_time: f64,
        /// Reason the flight ended.
        termination: FlightTermination,
    },
    /// Reports that a projectile struck an actor.
    ActorHit {
        /// Actor that was struck.
        actor: ActorId,
        /// Hit points removed by the impact.
        damage: u32,
        /// Hit points remaining after the impact.
        remaining: u32,
    },
    /// Confirms that the retained projectile was terminated.
    ProjectileResolved,
    /// Reports that an actor consumed a food item.
    FoodEaten {
        /// Actor that ate.
        actor: ActorId,
        /// Food item that was consumed.
        food: FoodId,
        /// Actor radius after growing.
        radius: f64,
    },
    /// Reports that an actor left the round.
    ActorRemoved {
        /// Actor that left.
        actor: ActorId,
        /// Why the actor left.
        cause: RemovalCause,
    },
    /// Announces that the round finished.
    RoundOver {
        /// Surviving identity, if anyone survived.
        winner: Option<Winner>,
    },
}

/// Unique identifier assigned to an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a team.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(u32);

impl TeamId {
    /// Creates a new team identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a food item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FoodId(u32);

impl FoodId {
    /// Creates a new food identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single terrain cell expressed as column and row coordinates.
///
/// Row zero is the top of the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Circular footprint of an actor, projectile, or food item in metric space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    center: DVec2,
    radius: f64,
}

impl Circle {
    /// Creates a circle centered at `(x, y)`.
    #[must_use]
    pub const fn new(x: f64, y: f64, radius: f64) -> Self {
        Self {
            center: DVec2::new(x, y),
            radius,
        }
    }

    /// Creates a circle centered at the provided point.
    #[must_use]
    pub const fn at(center: DVec2, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Horizontal coordinate of the center.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.center.x
    }

    /// Vertical coordinate of the center; grows upward.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.center.y
    }

    /// Center of the circle.
    #[must_use]
    pub const fn center(&self) -> DVec2 {
        self.center
    }

    /// Radius of the circle.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the same circle displaced by `distance` along `heading`.
    #[must_use]
    pub fn displaced(&self, heading: f64, distance: f64) -> Self {
        Self {
            center: self.center + unit_vector(heading) * distance,
            radius: self.radius,
        }
    }

    /// Returns a circle with the same center and a different radius.
    #[must_use]
    pub const fn with_radius(&self, radius: f64) -> Self {
        Self {
            center: self.center,
            radius,
        }
    }

    /// Reports whether the two circles share any interior area.
    #[must_use]
    pub fn overlaps(&self, other: &Circle) -> bool {
        self.center.distance(other.center) < self.radius + other.radius
    }
}

/// Classification of a circular footprint against the terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationStatus {
    /// Part of the footprint's boundary lies on impassable terrain.
    Impassable,
    /// The footprint is clear but rests against impassable terrain.
    Adjacent,
    /// The footprint and its immediate surroundings are clear.
    Passable,
}

/// Weapons an actor may select.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Light, cheap projectile with a fixed launch force.
    Rifle,
    /// Heavy projectile whose launch force scales with the yield.
    Bazooka,
}

impl WeaponKind {
    /// Weapon every actor holds when it is created.
    pub const DEFAULT: Self = Self::Rifle;

    /// Action points consumed by firing the weapon.
    #[must_use]
    pub const fn action_point_cost(self) -> u32 {
        match self {
            Self::Rifle => 10,
            Self::Bazooka => 50,
        }
    }

    /// Hit points removed from an actor struck by the projectile.
    #[must_use]
    pub const fn hit_point_damage(self) -> u32 {
        match self {
            Self::Rifle => 20,
            Self::Bazooka => 80,
        }
    }

    /// Mass of the projectile in kilograms.
    #[must_use]
    pub const fn mass(self) -> f64 {
        match self {
            Self::Rifle => 0.01,
            Self::Bazooka => 0.3,
        }
    }

    /// Lower and upper launch force in newtons.
    #[must_use]
    pub const fn force_range(self) -> (f64, f64) {
        match self {
            Self::Rifle => (1.5, 1.5),
            Self::Bazooka => (2.5, 9.5),
        }
    }

    /// Interpolates the launch force for a yield in `0..=100` percent.
    ///
    /// Yields above one hundred are treated as one hundred; callers validate
    /// the range before launching.
    #[must_use]
    pub fn force_for_yield(self, yield_percent: u32) -> f64 {
        let (lower, upper) = self.force_range();
        let fraction = f64::from(yield_percent.min(100)) / 100.0;
        lower + (upper - lower) * fraction
    }

    /// Radius of the projectile derived from its mass and density.
    #[must_use]
    pub fn projectile_radius(self) -> f64 {
        (3.0 * self.mass() / (4.0 * PI * PROJECTILE_DENSITY)).cbrt()
    }

    /// Weapon selected after this one when cycling.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Rifle => Self::Bazooka,
            Self::Bazooka => Self::Rifle,
        }
    }

    /// Human readable weapon name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rifle => "Rifle",
            Self::Bazooka => "Bazooka",
        }
    }
}

/// Reasons an action was refused because the actor cannot perform it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockReason {
    /// The actor lacks the action points the action requires.
    InsufficientActionPoints,
    /// Terrain leaves no admissible destination or launch footprint.
    Impassable,
    /// The actor already rests against terrain and cannot fall.
    Grounded,
}

/// Why a simulated flight ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlightTermination {
    /// The flying body left the world bounds.
    Exited,
    /// The flying body touched terrain.
    Terrain,
    /// The flying body overlapped another actor.
    Hit {
        /// Actor that was touched.
        actor: ActorId,
    },
}

/// Why an actor left the round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalCause {
    /// Hit points dropped to zero.
    Killed,
    /// The actor's footprint left the world bounds.
    LeftWorld,
}

/// Identity that won a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Winner {
    /// A solo actor outlived everyone else.
    Actor(ActorId),
    /// Only members of this team remain alive.
    Team(TeamId),
}

/// Failures reported by the world when a command cannot be applied.
///
/// Every failure leaves the world untouched.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ActionError {
    /// The command requires a round in progress.
    #[error("the round has not started")]
    RoundNotStarted,
    /// The command is only valid during setup.
    #[error("the round has already started")]
    RoundAlreadyStarted,
    /// The round finished; only queries remain valid.
    #[error("the round is over")]
    RoundOver,
    /// No registered actor carries the identifier.
    #[error("actor {} is not registered", .0.get())]
    UnknownActor(ActorId),
    /// No registered team carries the identifier.
    #[error("team {} is not registered", .0.get())]
    UnknownTeam(TeamId),
    /// Another actor holds the turn.
    #[error("actor {} does not hold the turn", .0.get())]
    NotCurrentActor(ActorId),
    /// The actor cannot perform the action right now.
    #[error("action blocked: {reason:?}")]
    Blocked {
        /// Specific reason the action was refused.
        reason: BlockReason,
    },
    /// The requested yield lies outside `0..=100`.
    #[error("yield {yield_percent}% lies outside 0..=100")]
    InvalidYield {
        /// Yield supplied by the caller.
        yield_percent: u32,
    },
    /// The integration step is not a positive finite number.
    #[error("time step must be positive and finite")]
    InvalidTimeStep,
    /// The rotation angle is not a finite number.
    #[error("turn angle must be finite")]
    InvalidAngle,
    /// A projectile from this turn has not been resolved yet.
    #[error("a projectile is still in flight")]
    ProjectileInFlight,
    /// The flight did not end within the integration step budget.
    #[error("flight did not settle within the step budget")]
    FlightDidNotSettle,
}

/// Immutable representation of a single actor's state used for queries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    /// Unique identifier assigned to the actor.
    pub id: ActorId,
    /// Display name of the actor.
    pub name: String,
    /// Footprint currently occupied by the actor.
    pub footprint: Circle,
    /// Facing in radians within `[0, 2π)`.
    pub orientation: f64,
    /// Mass derived from the radius.
    pub mass: f64,
    /// Remaining action points.
    pub action_points: u32,
    /// Action point capacity.
    pub max_action_points: u32,
    /// Remaining hit points.
    pub hit_points: u32,
    /// Hit point capacity.
    pub max_hit_points: u32,
    /// Team the actor belongs to, if any.
    pub team: Option<TeamId>,
    /// Weapon currently selected.
    pub weapon: WeaponKind,
}

/// Read-only snapshot describing all actors in the round.
#[derive(Clone, Debug, Default)]
pub struct ActorView {
    snapshots: Vec<ActorSnapshot>,
}

impl ActorView {
    /// Creates a new actor view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ActorSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured actor snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single actor.
    #[must_use]
    pub fn get(&self, actor: ActorId) -> Option<&ActorSnapshot> {
        self.snapshots
            .binary_search_by_key(&actor, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of actors captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no actors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ActorSnapshot> {
        self.snapshots
    }
}

/// Wraps an arbitrary angle into `[0, 2π)`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Mass of an actor with the provided radius.
#[must_use]
pub fn actor_mass(radius: f64) -> f64 {
    ACTOR_DENSITY * (4.0 / 3.0) * PI * radius.powi(3)
}

/// Unit vector pointing along `heading`, measured counter-clockwise from +x.
#[must_use]
pub fn unit_vector(heading: f64) -> DVec2 {
    DVec2::new(heading.cos(), heading.sin())
}
