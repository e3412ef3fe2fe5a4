//! Mutable actor records owned by the world.

use worms_core::{
    actor_mass, ActorId, ActorSnapshot, Circle, TeamId, WeaponKind, TURN_HEAL,
};

/// Radius multiplier applied for every food item an actor eats.
pub(crate) const GROWTH_PER_FOOD: f64 = 1.1;

#[derive(Clone, Debug)]
pub(crate) struct Actor {
    pub(crate) id: ActorId,
    pub(crate) name: String,
    pub(crate) footprint: Circle,
    pub(crate) orientation: f64,
    pub(crate) mass: f64,
    pub(crate) action_points: u32,
    pub(crate) max_action_points: u32,
    pub(crate) hit_points: u32,
    pub(crate) max_hit_points: u32,
    pub(crate) team: Option<TeamId>,
    pub(crate) weapon: WeaponKind,
}

impl Actor {
    /// Creates an actor with full action and hit points.
    pub(crate) fn new(
        id: ActorId,
        name: String,
        footprint: Circle,
        orientation: f64,
        team: Option<TeamId>,
    ) -> Self {
        let mass = actor_mass(footprint.radius());
        let capacity = capacity(mass);
        Self {
            id,
            name,
            footprint,
            orientation,
            mass,
            action_points: capacity,
            max_action_points: capacity,
            hit_points: capacity,
            max_hit_points: capacity,
            team,
            weapon: WeaponKind::DEFAULT,
        }
    }

    /// Heals the actor and refills its action points for a new turn.
    pub(crate) fn begin_turn(&mut self) {
        self.hit_points = self
            .hit_points
            .saturating_add(TURN_HEAL)
            .min(self.max_hit_points);
        self.action_points = self.max_action_points;
    }

    /// Removes hit points, returning what remains.
    pub(crate) fn take_damage(&mut self, damage: u32) -> u32 {
        self.hit_points = self.hit_points.saturating_sub(damage);
        self.hit_points
    }

    pub(crate) fn spend(&mut self, points: u32) {
        self.action_points = self.action_points.saturating_sub(points);
    }

    pub(crate) const fn is_dead(&self) -> bool {
        self.hit_points == 0
    }

    /// Scales the radius and recomputes every quantity derived from it.
    pub(crate) fn grow(&mut self, factor: f64) {
        self.footprint = self.footprint.with_radius(self.footprint.radius() * factor);
        self.mass = actor_mass(self.footprint.radius());
        self.max_action_points = capacity(self.mass);
        self.max_hit_points = self.max_action_points;
        self.action_points = self.action_points.min(self.max_action_points);
        self.hit_points = self.hit_points.min(self.max_hit_points);
    }

    pub(crate) fn snapshot(&self) -> ActorSnapshot {
        ActorSnapshot {
            id: self.id,
            name: self.name.clone(),
            footprint: self.footprint,
            orientation: self.orientation,
            mass: self.mass,
            action_points: self.action_points,
            max_action_points: self.max_action_points,
            hit_points: self.hit_points,
            max_hit_points: self.max_hit_points,
            team: self.team,
            weapon: self.weapon,
        }
    }
}

// Action and hit point capacity both equal the rounded mass.
fn capacity(mass: f64) -> u32 {
    let rounded = mass.round();
    if rounded.is_nan() {
        return 0;
    }
    rounded.clamp(0.0, f64::from(u32::MAX)) as u32
}
