#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative round state for the Worms engine.
//!
//! The world owns the terrain, every actor, team, and food item, the single
//! retained projectile, and the turn engine. [`apply`] is the only way to
//! mutate it: each command is validated completely before anything changes,
//! so a rejected command leaves the world exactly as it was and emits no
//! events. Read access goes through [`query`].

mod actors;
mod turns;

use glam::DVec2;
use log::{debug, info};
use worms_core::{
    normalize_angle, ActionError, ActorId, BlockReason, Circle, Command, Event, FlightTermination,
    FoodId, RemovalCause, RoundPhase, TeamId, WeaponKind,
};
use worms_system_ballistics::{self as ballistics, BallisticsError, FlightOutcome, Trajectory};
use worms_system_motion::{self as motion, FallOutcome, MotionPlanner, MoveKind};
use worms_terrain::{lies_in_bounds, TerrainMap};

use crate::actors::{Actor, GROWTH_PER_FOOD};
use crate::turns::{check_victory, next_actor, TurnEngine};

/// Team registered before the round started.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Team {
    id: TeamId,
    name: String,
}

impl Team {
    /// Identifier allocated to the team.
    #[must_use]
    pub const fn id(&self) -> TeamId {
        self.id
    }

    /// Display name of the team.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Food item lying in the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Food {
    id: FoodId,
    footprint: Circle,
}

impl Food {
    /// Identifier allocated to the food item.
    #[must_use]
    pub const fn id(&self) -> FoodId {
        self.id
    }

    /// Footprint occupied by the food item.
    #[must_use]
    pub const fn footprint(&self) -> Circle {
        self.footprint
    }
}

/// Projectile fired this turn whose flight has already been simulated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveProjectile {
    launcher: ActorId,
    weapon: WeaponKind,
    trajectory: Trajectory,
    radius: f64,
    outcome: FlightOutcome,
}

impl ActiveProjectile {
    /// Actor that fired the projectile.
    #[must_use]
    pub const fn launcher(&self) -> ActorId {
        self.launcher
    }

    /// Weapon that produced the projectile.
    #[must_use]
    pub const fn weapon(&self) -> WeaponKind {
        self.weapon
    }

    /// Path the projectile followed.
    #[must_use]
    pub const fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Radius of the projectile.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// How and where the flight ended.
    #[must_use]
    pub const fn outcome(&self) -> &FlightOutcome {
        &self.outcome
    }

    /// Position along the flight, clamped to its simulated duration.
    #[must_use]
    pub fn position_at(&self, time: f64) -> DVec2 {
        if time >= self.outcome.flight_time() {
            return self.outcome.landing();
        }
        self.trajectory.position_at(time.max(0.0))
    }
}

/// Represents the authoritative round state.
#[derive(Debug)]
pub struct World {
    terrain: TerrainMap,
    planner: MotionPlanner,
    actors: Vec<Actor>,
    teams: Vec<Team>,
    food: Vec<Food>,
    projectile: Option<ActiveProjectile>,
    turns: TurnEngine,
    next_actor_id: u32,
    next_team_id: u32,
    next_food_id: u32,
}

impl World {
    /// Creates an empty world awaiting setup on the provided terrain.
    #[must_use]
    pub fn new(terrain: TerrainMap) -> Self {
        Self {
            terrain,
            planner: MotionPlanner::default(),
            actors: Vec::new(),
            teams: Vec::new(),
            food: Vec::new(),
            projectile: None,
            turns: TurnEngine::new(),
            next_actor_id: 0,
            next_team_id: 0,
            next_food_id: 0,
        }
    }

    fn actor_index(&self, actor: ActorId) -> Option<usize> {
        self.actors.iter().position(|candidate| candidate.id == actor)
    }

    fn acting_index(&self, actor: ActorId) -> Result<usize, ActionError> {
        self.turns.ensure_in_progress()?;
        let index = self
            .actor_index(actor)
            .ok_or(ActionError::UnknownActor(actor))?;
        if self.turns.current() != Some(actor) {
            return Err(ActionError::NotCurrentActor(actor));
        }
        if self.projectile.is_some() {
            return Err(ActionError::ProjectileInFlight);
        }
        Ok(index)
    }

    fn obstacles(&self, except: ActorId) -> Vec<(ActorId, Circle)> {
        self.actors
            .iter()
            .filter(|actor| actor.id != except)
            .map(|actor| (actor.id, actor.footprint))
            .collect()
    }

    fn in_bounds(&self, footprint: &Circle) -> bool {
        lies_in_bounds(footprint, self.terrain.width(), self.terrain.height())
    }

    fn begin_turn(&mut self, actor: ActorId, out_events: &mut Vec<Event>) {
        let Some(index) = self.actor_index(actor) else {
            return;
        };
        self.turns.hand_over(actor);
        let holder = &mut self.actors[index];
        holder.begin_turn();
        debug!("turn passes to {} ({})", holder.name, actor.get());
        out_events.push(Event::TurnStarted {
            actor,
            hit_points: holder.hit_points,
            action_points: holder.action_points,
        });
    }

    fn remove_actor(&mut self, actor: ActorId, cause: RemovalCause, out_events: &mut Vec<Event>) {
        if let Some(index) = self.actor_index(actor) {
            let removed = self.actors.remove(index);
            debug!("{} ({}) leaves the round: {cause:?}", removed.name, actor.get());
            out_events.push(Event::ActorRemoved { actor, cause });
        }
    }

    fn eat_food(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let footprint = self.actors[index].footprint;
        let eaten: Vec<FoodId> = self
            .food
            .iter()
            .filter(|food| food.footprint.overlaps(&footprint))
            .map(|food| food.id)
            .collect();

        for food in eaten {
            self.food.retain(|candidate| candidate.id != food);
            let eater = &mut self.actors[index];
            eater.grow(GROWTH_PER_FOOD);
            out_events.push(Event::FoodEaten {
                actor: eater.id,
                food,
                radius: eater.footprint.radius(),
            });
        }
    }

    fn drop_actor(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let actor = self.actors[index].id;
        let from = self.actors[index].footprint;

        match motion::fall(&self.terrain, &from) {
            FallOutcome::Exited { .. } => {
                self.remove_actor(actor, RemovalCause::LeftWorld, out_events);
            }
            FallOutcome::Landed { position, damage } => {
                let faller = &mut self.actors[index];
                faller.footprint = Circle::at(position, from.radius());
                let _ = faller.take_damage(damage);
                if position != from.center() {
                    out_events.push(Event::ActorFell {
                        actor,
                        from: from.center(),
                        to: position,
                        damage,
                    });
                }
                if faller.is_dead() {
                    self.remove_actor(actor, RemovalCause::Killed, out_events);
                } else {
                    self.eat_food(index, out_events);
                }
            }
        }
    }

    fn hit_actor(&mut self, actor: ActorId, damage: u32, out_events: &mut Vec<Event>) {
        let Some(index) = self.actor_index(actor) else {
            return;
        };
        let target = &mut self.actors[index];
        let remaining = target.take_damage(damage);
        out_events.push(Event::ActorHit {
            actor,
            damage,
            remaining,
        });
        if target.is_dead() {
            self.remove_actor(actor, RemovalCause::Killed, out_events);
        }
    }

    /// Ends the round when the survivors allow it, otherwise makes sure a
    /// living actor holds the turn.
    fn settle(&mut self, out_events: &mut Vec<Event>) {
        if self.turns.phase() != RoundPhase::TurnInProgress {
            return;
        }

        let members = self.actors.iter().map(|actor| (actor.id, actor.team));
        if let Some(winner) = check_victory(members) {
            self.turns.finish(winner);
            info!("round over, winner: {winner:?}");
            out_events.push(Event::RoundOver { winner });
            return;
        }

        let current = self.turns.current();
        let holder_alive = current.is_some_and(|actor| self.actor_index(actor).is_some());
        if !holder_alive {
            if let Some(next) = next_actor(&self.actors, current) {
                self.begin_turn(next, out_events);
            }
        }
    }
}

/// Applies the provided command to the world.
///
/// Either the whole command takes effect and its events are appended to
/// `out_events`, or an error is returned and nothing changes.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), ActionError> {
    debug!("applying {command:?}");
    let result = match command {
        Command::AddTeam { name } => add_team(world, name, out_events),
        Command::SpawnActor {
            position,
            orientation,
            radius,
            name,
            team,
        } => spawn_actor(
            world,
            Circle::at(position, radius),
            orientation,
            name,
            team,
            out_events,
        ),
        Command::SpawnFood { position } => spawn_food(world, position, out_events),
        Command::StartRound => start_round(world, out_events),
        Command::AdvanceTurn => advance_turn(world, out_events),
        Command::Move { actor } => walk(world, actor, out_events),
        Command::Turn { actor, angle } => turn(world, actor, angle, out_events),
        Command::Jump { actor, time_step } => jump(world, actor, time_step, out_events),
        Command::Fall { actor } => fall(world, actor, out_events),
        Command::Shoot {
            actor,
            yield_percent,
            time_step,
        } => shoot(world, actor, yield_percent, time_step, out_events),
        Command::SelectNextWeapon { actor } => select_next_weapon(world, actor, out_events),
        Command::ResolveProjectile => resolve_projectile(world, out_events),
    };

    if let Err(error) = &result {
        debug!("command rejected: {error}");
    }
    result
}

fn add_team(world: &mut World, name: String, out_events: &mut Vec<Event>) -> Result<(), ActionError> {
    world.turns.ensure_setup()?;
    let team = TeamId::new(world.next_team_id);
    world.next_team_id = world.next_team_id.saturating_add(1);
    world.teams.push(Team {
        id: team,
        name: name.clone(),
    });
    out_events.push(Event::TeamAdded { team, name });
    Ok(())
}

fn spawn_actor(
    world: &mut World,
    footprint: Circle,
    orientation: f64,
    name: String,
    team: Option<TeamId>,
    out_events: &mut Vec<Event>,
) -> Result<(), ActionError> {
    world.turns.ensure_setup()?;
    if let Some(team) = team {
        if !world.teams.iter().any(|candidate| candidate.id == team) {
            return Err(ActionError::UnknownTeam(team));
        }
    }

    let actor = ActorId::new(world.next_actor_id);
    world.next_actor_id = world.next_actor_id.saturating_add(1);
    world.actors.push(Actor::new(
        actor,
        name,
        footprint,
        normalize_angle(orientation),
        team,
    ));
    out_events.push(Event::ActorSpawned { actor, footprint });
    Ok(())
}

fn spawn_food(
    world: &mut World,
    position: DVec2,
    out_events: &mut Vec<Event>,
) -> Result<(), ActionError> {
    world.turns.ensure_setup()?;
    let food = FoodId::new(world.next_food_id);
    world.next_food_id = world.next_food_id.saturating_add(1);
    let footprint = Circle::at(position, worms_core::FOOD_RADIUS);
    world.food.push(Food { id: food, footprint });
    out_events.push(Event::FoodSpawned { food, footprint });
    Ok(())
}

fn start_round(world: &mut World, out_events: &mut Vec<Event>) -> Result<(), ActionError> {
    world.turns.ensure_setup()?;
    world.turns.start();
    info!(
        "round started with {} actors in {} teams",
        world.actors.len(),
        world.teams.len()
    );
    out_events.push(Event::RoundStarted);
    world.settle(out_events);
    Ok(())
}

fn advance_turn(world: &mut World, out_events: &mut Vec<Event>) -> Result<(), ActionError> {
    world.turns.ensure_in_progress()?;
    if world.projectile.take().is_some() {
        out_events.push(Event::ProjectileResolved);
    }
    match next_actor(&world.actors, world.turns.current()) {
        Some(next) => world.begin_turn(next, out_events),
        None => world.settle(out_events),
    }
    Ok(())
}

fn resolve_projectile(world: &mut World, out_events: &mut Vec<Event>) -> Result<(), ActionError> {
    world.turns.ensure_in_progress()?;
    if world.projectile.take().is_some() {
        out_events.push(Event::ProjectileResolved);
    }
    Ok(())
}

fn walk(world: &mut World, actor: ActorId, out_events: &mut Vec<Event>) -> Result<(), ActionError> {
    let index = world.acting_index(actor)?;
    let walker = &world.actors[index];
    let from = walker.footprint;
    let plan = world
        .planner
        .plan(&world.terrain, &from, walker.orientation, walker.action_points);
    if let MoveKind::Blocked(reason) = plan.kind() {
        return Err(ActionError::Blocked { reason });
    }

    let cost = plan.cost();
    let to = Circle::at(plan.destination(), from.radius());
    let walker = &mut world.actors[index];
    walker.footprint = to;
    walker.spend(cost);
    out_events.push(Event::ActorMoved {
        actor,
        from: from.center(),
        to: to.center(),
        cost,
    });

    if !world.in_bounds(&to) {
        world.remove_actor(actor, RemovalCause::LeftWorld, out_events);
    } else if plan.kind() == MoveKind::PassableFall {
        world.drop_actor(index, out_events);
    } else {
        world.eat_food(index, out_events);
    }
    world.settle(out_events);
    Ok(())
}

fn turn(
    world: &mut World,
    actor: ActorId,
    angle: f64,
    out_events: &mut Vec<Event>,
) -> Result<(), ActionError> {
    let index = world.acting_index(actor)?;
    if !angle.is_finite() {
        return Err(ActionError::InvalidAngle);
    }

    let cost = motion::turn_cost_points(angle);
    let turner = &mut world.actors[index];
    if cost > turner.action_points {
        return Err(ActionError::Blocked {
            reason: BlockReason::InsufficientActionPoints,
        });
    }

    turner.orientation = motion::turned_orientation(turner.orientation, angle);
    turner.spend(cost);
    out_events.push(Event::ActorTurned {
        actor,
        orientation: turner.orientation,
        cost,
    });
    Ok(())
}

fn jump(
    world: &mut World,
    actor: ActorId,
    time_step: f64,
    out_events: &mut Vec<Event>,
) -> Result<(), ActionError> {
    let index = world.acting_index(actor)?;
    ensure_time_step(time_step)?;

    let jumper = &world.actors[index];
    if !ballistics::can_launch(&world.terrain, &jumper.footprint, jumper.action_points, 1) {
        return Err(ActionError::Blocked {
            reason: launch_block(jumper.action_points, 1),
        });
    }

    let from = jumper.footprint;
    let trajectory =
        ballistics::jump_trajectory(&from, jumper.orientation, jumper.action_points, jumper.mass);
    let outcome = ballistics::simulate_flight(
        &world.terrain,
        &trajectory,
        from.radius(),
        &world.obstacles(actor),
        time_step,
    )
    .map_err(flight_error)?;

    let to = Circle::at(outcome.landing(), from.radius());
    let jumper = &mut world.actors[index];
    jumper.footprint = to;
    jumper.action_points = 0;
    out_events.push(Event::ActorJumped {
        actor,
        from: from.center(),
        to: to.center(),
        flight_time: outcome.flight_time(),
    });

    if outcome.termination() == FlightTermination::Exited || !world.in_bounds(&to) {
        world.remove_actor(actor, RemovalCause::LeftWorld, out_events);
    } else {
        world.eat_food(index, out_events);
    }
    world.settle(out_events);
    Ok(())
}

fn fall(world: &mut World, actor: ActorId, out_events: &mut Vec<Event>) -> Result<(), ActionError> {
    let index = world.acting_index(actor)?;
    if !motion::can_fall(&world.terrain, &world.actors[index].footprint) {
        return Err(ActionError::Blocked {
            reason: BlockReason::Grounded,
        });
    }
    world.drop_actor(index, out_events);
    world.settle(out_events);
    Ok(())
}

fn shoot(
    world: &mut World,
    actor: ActorId,
    yield_percent: u32,
    time_step: f64,
    out_events: &mut Vec<Event>,
) -> Result<(), ActionError> {
    if yield_percent > 100 {
        return Err(ActionError::InvalidYield { yield_percent });
    }
    let index = world.acting_index(actor)?;
    ensure_time_step(time_step)?;

    let shooter = &world.actors[index];
    let weapon = shooter.weapon;
    let cost = weapon.action_point_cost();
    if !ballistics::can_launch(&world.terrain, &shooter.footprint, shooter.action_points, cost) {
        return Err(ActionError::Blocked {
            reason: launch_block(shooter.action_points, cost),
        });
    }

    let trajectory = ballistics::projectile_trajectory(
        &shooter.footprint,
        shooter.orientation,
        weapon,
        yield_percent,
    );
    let radius = weapon.projectile_radius();
    let outcome = ballistics::simulate_flight(
        &world.terrain,
        &trajectory,
        radius,
        &world.obstacles(actor),
        time_step,
    )
    .map_err(flight_error)?;

    world.actors[index].spend(cost);
    out_events.push(Event::ProjectileFired {
        actor,
        weapon,
        from: trajectory.origin(),
        to: outcome.landing(),
        flight_time: outcome.flight_time(),
        termination: outcome.termination(),
    });
    world.projectile = Some(ActiveProjectile {
        launcher: actor,
        weapon,
        trajectory,
        radius,
        outcome,
    });

    if let FlightTermination::Hit { actor: target } = outcome.termination() {
        world.hit_actor(target, weapon.hit_point_damage(), out_events);
    }
    world.settle(out_events);
    Ok(())
}

fn select_next_weapon(
    world: &mut World,
    actor: ActorId,
    out_events: &mut Vec<Event>,
) -> Result<(), ActionError> {
    let index = world.acting_index(actor)?;
    let holder = &mut world.actors[index];
    holder.weapon = holder.weapon.next();
    out_events.push(Event::WeaponSelected {
        actor,
        weapon: holder.weapon,
    });
    Ok(())
}

fn ensure_time_step(time_step: f64) -> Result<(), ActionError> {
    if time_step.is_finite() && time_step > 0.0 {
        Ok(())
    } else {
        Err(ActionError::InvalidTimeStep)
    }
}

fn launch_block(action_points: u32, cost: u32) -> BlockReason {
    if action_points == 0 || action_points < cost {
        BlockReason::InsufficientActionPoints
    } else {
        BlockReason::Impassable
    }
}

fn flight_error(error: BallisticsError) -> ActionError {
    match error {
        BallisticsError::InvalidTimeStep { .. } => ActionError::InvalidTimeStep,
        BallisticsError::DidNotSettle { .. } => ActionError::FlightDidNotSettle,
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use worms_core::{
        ActorId, ActorSnapshot, ActorView, Circle, LocationStatus, RoundPhase, Winner,
    };
    use worms_system_ballistics as ballistics;
    use worms_system_motion::{self as motion, MovePlan};
    use worms_terrain::{classify, TerrainMap};

    use super::{ActiveProjectile, Food, Team, World};

    /// Classifies a circle of `radius` centered at `(x, y)` against the terrain.
    #[must_use]
    pub fn classify_location(world: &World, x: f64, y: f64, radius: f64) -> LocationStatus {
        classify(&world.terrain, &Circle::new(x, y, radius))
    }

    /// Step the actor would take when walking now, if it is registered.
    #[must_use]
    pub fn move_plan(world: &World, actor: ActorId) -> Option<MovePlan> {
        let index = world.actor_index(actor)?;
        let walker = &world.actors[index];
        Some(world.planner.plan(
            &world.terrain,
            &walker.footprint,
            walker.orientation,
            walker.action_points,
        ))
    }

    /// Reports whether the actor's fan search finds an executable step.
    ///
    /// Only the actor's own pose and budget are considered; whether it holds
    /// the turn is checked when the move is applied.
    #[must_use]
    pub fn can_move(world: &World, actor: ActorId) -> bool {
        move_plan(world, actor).is_some_and(|plan| plan.is_admissible())
    }

    /// Reports whether the actor could start a jump.
    #[must_use]
    pub fn can_jump(world: &World, actor: ActorId) -> bool {
        world.actor_index(actor).is_some_and(|index| {
            let jumper = &world.actors[index];
            ballistics::can_launch(&world.terrain, &jumper.footprint, jumper.action_points, 1)
        })
    }

    /// Reports whether the actor could fire its selected weapon.
    #[must_use]
    pub fn can_shoot(world: &World, actor: ActorId) -> bool {
        world.actor_index(actor).is_some_and(|index| {
            let shooter = &world.actors[index];
            ballistics::can_launch(
                &world.terrain,
                &shooter.footprint,
                shooter.action_points,
                shooter.weapon.action_point_cost(),
            )
        })
    }

    /// Reports whether the actor hangs free of terrain.
    #[must_use]
    pub fn can_fall(world: &World, actor: ActorId) -> bool {
        world
            .actor_index(actor)
            .is_some_and(|index| motion::can_fall(&world.terrain, &world.actors[index].footprint))
    }

    /// Current lifecycle phase of the round.
    #[must_use]
    pub fn phase(world: &World) -> RoundPhase {
        world.turns.phase()
    }

    /// Reports whether a winner has been determined.
    #[must_use]
    pub fn is_round_over(world: &World) -> bool {
        world.turns.phase() == RoundPhase::RoundOver
    }

    /// Identity that won the round, once it is over and somebody survived.
    #[must_use]
    pub fn winner(world: &World) -> Option<Winner> {
        world.turns.winner()
    }

    /// Display name of the winner: the team's name, or the lone actor's.
    #[must_use]
    pub fn winner_name(world: &World) -> Option<&str> {
        match world.turns.winner()? {
            Winner::Team(team) => world
                .teams
                .iter()
                .find(|candidate| candidate.id == team)
                .map(Team::name),
            Winner::Actor(actor) => world
                .actors
                .iter()
                .find(|candidate| candidate.id == actor)
                .map(|winner| winner.name.as_str()),
        }
    }

    /// Actor currently holding the turn.
    #[must_use]
    pub fn current_actor(world: &World) -> Option<ActorId> {
        world.turns.current()
    }

    /// Captures a read-only view of every actor still in the round.
    #[must_use]
    pub fn actor_view(world: &World) -> ActorView {
        ActorView::from_snapshots(world.actors.iter().map(|actor| actor.snapshot()).collect())
    }

    /// Captures a single actor, if it is still in the round.
    #[must_use]
    pub fn actor(world: &World, actor: ActorId) -> Option<ActorSnapshot> {
        world
            .actor_index(actor)
            .map(|index| world.actors[index].snapshot())
    }

    /// Teams registered in the world, in registration order.
    #[must_use]
    pub fn teams(world: &World) -> &[Team] {
        &world.teams
    }

    /// Food items that have not been eaten.
    #[must_use]
    pub fn food(world: &World) -> &[Food] {
        &world.food
    }

    /// Projectile fired this turn that has not been resolved yet.
    #[must_use]
    pub fn active_projectile(world: &World) -> Option<&ActiveProjectile> {
        world.projectile.as_ref()
    }

    /// Terrain the round is played on.
    #[must_use]
    pub fn terrain(world: &World) -> &TerrainMap {
        &world.terrain
    }
}
