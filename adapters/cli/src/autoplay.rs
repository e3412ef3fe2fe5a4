//! Scripted policy that plays a round without a human at the controls.

use std::f64::consts::{PI, TAU};

use log::{debug, info};
use serde::Serialize;
use worms_core::{normalize_angle, ActorId, ActorSnapshot, Command, Event, TeamId};
use worms_world::{self as world, query, World};

/// Upward tilt added to the direct line of sight when aiming.
const AIM_ELEVATION: f64 = 0.35;

/// Rotations smaller than this are not worth their action points.
const AIM_TOLERANCE: f64 = 1e-3;

/// Parameters of the scripted policy.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Autoplay {
    pub(crate) max_turns: u32,
    pub(crate) steps_per_turn: u32,
    pub(crate) yield_percent: u32,
    pub(crate) time_step: f64,
}

impl Autoplay {
    /// Plays turns until the round ends or the turn limit is reached.
    ///
    /// Every accepted command's events are appended to `out_events`.
    /// Returns the number of completed turns.
    pub(crate) fn play(&self, world: &mut World, out_events: &mut Vec<Event>) -> u32 {
        let mut turns = 0;
        while turns < self.max_turns && !query::is_round_over(world) {
            let Some(actor) = query::current_actor(world) else {
                break;
            };
            self.take_turn(world, actor, out_events);
            if query::is_round_over(world) {
                break;
            }
            let _ = submit(world, Command::AdvanceTurn, out_events);
            turns += 1;
        }
        turns
    }

    fn take_turn(&self, world: &mut World, actor: ActorId, out_events: &mut Vec<Event>) {
        if query::can_fall(world, actor) {
            let _ = submit(world, Command::Fall { actor }, out_events);
            if !holds_turn(world, actor) {
                return;
            }
        }

        if let Some(angle) = aim(world, actor) {
            if angle.abs() > AIM_TOLERANCE {
                let _ = submit(world, Command::Turn { actor, angle }, out_events);
            }
            if query::can_shoot(world, actor) {
                let fired = submit(
                    world,
                    Command::Shoot {
                        actor,
                        yield_percent: self.yield_percent,
                        time_step: self.time_step,
                    },
                    out_events,
                );
                if fired && !query::is_round_over(world) {
                    let _ = submit(world, Command::ResolveProjectile, out_events);
                }
            }
        }

        for _ in 0..self.steps_per_turn {
            if !holds_turn(world, actor) || !query::can_move(world, actor) {
                break;
            }
            if !submit(world, Command::Move { actor }, out_events) {
                break;
            }
        }
    }
}

fn holds_turn(world: &World, actor: ActorId) -> bool {
    query::current_actor(world) == Some(actor)
}

fn is_enemy(me: &ActorSnapshot, other: &ActorSnapshot) -> bool {
    other.id != me.id && (me.team.is_none() || me.team != other.team)
}

/// Signed rotation that points the actor slightly above its nearest enemy.
fn aim(world: &World, actor: ActorId) -> Option<f64> {
    let view = query::actor_view(world);
    let me = view.get(actor)?;
    let target = view
        .iter()
        .filter(|other| is_enemy(me, other))
        .min_by(|a, b| {
            let left = a.footprint.center().distance_squared(me.footprint.center());
            let right = b.footprint.center().distance_squared(me.footprint.center());
            left.total_cmp(&right)
        })?;

    let offset = target.footprint.center() - me.footprint.center();
    let elevation = if offset.x >= 0.0 {
        AIM_ELEVATION
    } else {
        -AIM_ELEVATION
    };
    let heading = offset.y.atan2(offset.x) + elevation;
    let rotation = normalize_angle(heading - me.orientation);
    Some(if rotation > PI { rotation - TAU } else { rotation })
}

fn submit(world: &mut World, command: Command, out_events: &mut Vec<Event>) -> bool {
    let before = out_events.len();
    match world::apply(world, command.clone(), out_events) {
        Ok(()) => {
            for event in &out_events[before..] {
                log_event(world, event);
            }
            true
        }
        Err(error) => {
            debug!("autoplay skipped {command:?}: {error}");
            false
        }
    }
}

fn log_event(world: &World, event: &Event) {
    let name = |actor: ActorId| {
        query::actor(world, actor).map_or_else(|| format!("#{}", actor.get()), |actor| actor.name)
    };
    match event {
        Event::TurnStarted {
            actor,
            hit_points,
            action_points,
        } => info!(
            "{} starts a turn with {hit_points} HP and {action_points} AP",
            name(*actor)
        ),
        Event::ProjectileFired {
            actor,
            weapon,
            to,
            termination,
            ..
        } => info!(
            "{} fires the {}; it ends at ({:.2}, {:.2}): {termination:?}",
            name(*actor),
            weapon.name(),
            to.x,
            to.y
        ),
        Event::ActorHit {
            actor,
            damage,
            remaining,
        } => info!("{} takes {damage} damage, {remaining} HP left", name(*actor)),
        Event::ActorRemoved { actor, cause } => {
            info!("worm #{} leaves the round: {cause:?}", actor.get());
        }
        Event::RoundOver { winner } => info!(
            "round over, winner: {}",
            query::winner_name(world).unwrap_or(if winner.is_some() { "unknown" } else { "nobody" })
        ),
        other => debug!("{other:?}"),
    }
}

/// Final state reported once the autoplay stops.
#[derive(Debug, PartialEq, Serialize)]
pub(crate) struct RoundSummary {
    turns: u32,
    round_over: bool,
    winner: Option<String>,
    survivors: Vec<SurvivorSummary>,
}

#[derive(Debug, PartialEq, Serialize)]
struct SurvivorSummary {
    id: u32,
    name: String,
    team: Option<String>,
    x: f64,
    y: f64,
    radius: f64,
    hit_points: u32,
}

impl RoundSummary {
    pub(crate) fn capture(world: &World, turns: u32) -> Self {
        let team_name = |team: TeamId| {
            query::teams(world)
                .iter()
                .find(|candidate| candidate.id() == team)
                .map(|candidate| candidate.name().to_owned())
        };
        let survivors = query::actor_view(world)
            .into_vec()
            .into_iter()
            .map(|actor| SurvivorSummary {
                id: actor.id.get(),
                team: actor.team.and_then(|team| team_name(team)),
                x: actor.footprint.x(),
                y: actor.footprint.y(),
                radius: actor.footprint.radius(),
                hit_points: actor.hit_points,
                name: actor.name,
            })
            .collect();

        Self {
            turns,
            round_over: query::is_round_over(world),
            winner: query::winner_name(world).map(str::to_owned),
            survivors,
        }
    }

    /// Writes a human readable report to standard output.
    pub(crate) fn print(&self) {
        println!("turns played: {}", self.turns);
        match (&self.winner, self.round_over) {
            (Some(winner), _) => println!("winner: {winner}"),
            (None, true) => println!("winner: nobody"),
            (None, false) => println!("round unfinished"),
        }
        for survivor in &self.survivors {
            println!(
                "  #{} {} [{}] at ({:.2}, {:.2}) r={:.2} hp={}",
                survivor.id,
                survivor.name,
                survivor.team.as_deref().unwrap_or("-"),
                survivor.x,
                survivor.y,
                survivor.radius,
                survivor.hit_points
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{Scenario, DEFAULT_SCENARIO};

    fn policy(max_turns: u32) -> Autoplay {
        Autoplay {
            max_turns,
            steps_per_turn: 5,
            yield_percent: 60,
            time_step: 0.001,
        }
    }

    fn play(seed: u64, max_turns: u32) -> (RoundSummary, Vec<Event>) {
        let scenario = Scenario::parse(DEFAULT_SCENARIO).expect("bundled scenario parses");
        let mut events = Vec::new();
        let mut world = scenario.populate(seed, &mut events).expect("scenario populates");
        assert!(submit(&mut world, Command::StartRound, &mut events));
        let turns = policy(max_turns).play(&mut world, &mut events);
        (RoundSummary::capture(&world, turns), events)
    }

    #[test]
    fn turn_limit_is_respected() {
        let (summary, _) = play(5, 3);
        assert!(summary.turns <= 3);
        assert!(summary.round_over || summary.turns == 3);
    }

    #[test]
    fn identical_seeds_play_identical_rounds() {
        assert_eq!(play(9, 4), play(9, 4));
    }

    #[test]
    fn aim_turns_toward_the_nearest_enemy() {
        let scenario = Scenario::parse(DEFAULT_SCENARIO).expect("bundled scenario parses");
        let world = scenario.populate(0, &mut Vec::new()).expect("scenario populates");
        let ada = query::actor_view(&world)
            .iter()
            .find(|actor| actor.name == "Ada")
            .map(|actor| actor.id)
            .expect("Ada is spawned");

        let rotation = aim(&world, ada).expect("Ada has an enemy");
        assert!(rotation > 0.0 && rotation < PI / 2.0);
    }
}
