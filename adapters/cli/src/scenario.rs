//! TOML scenario describing the terrain and the participants of a round.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use glam::DVec2;
use log::warn;
use serde::Deserialize;
use worms_core::{Command, Event, TeamId, MINIMUM_ACTOR_RADIUS};
use worms_system_spawning::{ActorRequest, Config, Spawning};
use worms_terrain::TerrainMap;
use worms_world::{self as world, query, World};

/// Scenario played when no file is given on the command line.
pub(crate) const DEFAULT_SCENARIO: &str = include_str!("../../../scenarios/duel.toml");

const DEFAULT_RADIUS: f64 = 0.5;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    width: f64,
    height: f64,
    terrain: Vec<String>,
    #[serde(default)]
    teams: Vec<TeamEntry>,
    #[serde(default)]
    actors: Vec<ActorEntry>,
    #[serde(default)]
    food: Vec<FoodEntry>,
    #[serde(default)]
    random_actors: u32,
    #[serde(default)]
    random_food: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TeamEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ActorEntry {
    name: String,
    x: f64,
    y: f64,
    #[serde(default = "default_radius")]
    radius: f64,
    #[serde(default)]
    orientation: f64,
    #[serde(default)]
    team: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FoodEntry {
    x: f64,
    y: f64,
}

fn default_radius() -> f64 {
    DEFAULT_RADIUS
}

impl Scenario {
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse scenario toml contents")
    }

    fn terrain(&self) -> Result<TerrainMap> {
        TerrainMap::from_ascii(self.width, self.height, &self.terrain.join("\n"))
            .context("scenario terrain is malformed")
    }

    /// Builds a world that is ready for `StartRound`.
    ///
    /// Explicit teams, actors and food are registered first; the random ones
    /// are then placed by the seeded spawning system around them. Every setup
    /// event is appended to `out_events`.
    pub(crate) fn populate(&self, seed: u64, out_events: &mut Vec<Event>) -> Result<World> {
        let mut world = World::new(self.terrain()?);

        let mut teams: HashMap<&str, TeamId> = HashMap::new();
        let mut team_order = Vec::with_capacity(self.teams.len());
        for entry in &self.teams {
            if entry.name.trim().is_empty() {
                bail!("team names must not be empty");
            }
            if teams.contains_key(entry.name.as_str()) {
                bail!("scenario declares team {:?} twice", entry.name);
            }
            let before = out_events.len();
            submit(
                &mut world,
                Command::AddTeam {
                    name: entry.name.clone(),
                },
                out_events,
            )?;
            let Some(team) = out_events[before..].iter().find_map(|event| match event {
                Event::TeamAdded { team, .. } => Some(*team),
                _ => None,
            }) else {
                bail!("team {:?} was not registered", entry.name);
            };
            let _ = teams.insert(entry.name.as_str(), team);
            team_order.push(team);
        }

        for entry in &self.actors {
            let team = resolve_team(entry, &teams)?;
            submit(
                &mut world,
                Command::SpawnActor {
                    position: DVec2::new(entry.x, entry.y),
                    orientation: entry.orientation,
                    radius: entry.radius,
                    name: entry.name.clone(),
                    team,
                },
                out_events,
            )?;
        }

        for entry in &self.food {
            if !(entry.x.is_finite() && entry.y.is_finite()) {
                bail!("food position ({}, {}) is not finite", entry.x, entry.y);
            }
            submit(
                &mut world,
                Command::SpawnFood {
                    position: DVec2::new(entry.x, entry.y),
                },
                out_events,
            )?;
        }

        self.place_random(&mut world, seed, &team_order, out_events)?;
        Ok(world)
    }

    fn place_random(
        &self,
        world: &mut World,
        seed: u64,
        teams: &[TeamId],
        out_events: &mut Vec<Event>,
    ) -> Result<()> {
        if self.random_actors == 0 && self.random_food == 0 {
            return Ok(());
        }

        let requests: Vec<ActorRequest> = (0..self.random_actors)
            .map(|index| ActorRequest {
                name: format!("Worm {}", index + 1),
                team: (!teams.is_empty()).then(|| teams[index as usize % teams.len()]),
            })
            .collect();
        let occupied: Vec<_> = query::actor_view(world)
            .iter()
            .map(|actor| actor.footprint)
            .chain(query::food(world).iter().map(|food| food.footprint()))
            .collect();

        let mut commands = Vec::new();
        let mut spawning = Spawning::new(Config::new(seed));
        let placed = spawning.handle(
            query::terrain(world),
            &requests,
            self.random_food,
            &occupied,
            &mut commands,
        );
        let requested = self.random_actors + self.random_food;
        if placed < requested as usize {
            warn!("placed {placed} of {requested} random actors and food items");
        }

        for command in commands {
            submit(world, command, out_events)?;
        }
        Ok(())
    }
}

fn resolve_team(
    entry: &ActorEntry,
    teams: &HashMap<&str, TeamId>,
) -> Result<Option<TeamId>> {
    if entry.name.trim().is_empty() {
        bail!("actor names must not be empty");
    }
    if !(entry.x.is_finite() && entry.y.is_finite() && entry.orientation.is_finite()) {
        bail!("actor {:?} has a non-finite pose", entry.name);
    }
    if !(entry.radius.is_finite() && entry.radius >= MINIMUM_ACTOR_RADIUS) {
        bail!(
            "actor {:?} has radius {}, the minimum is {MINIMUM_ACTOR_RADIUS}",
            entry.name,
            entry.radius
        );
    }
    entry
        .team
        .as_deref()
        .map(|name| {
            teams
                .get(name)
                .copied()
                .with_context(|| format!("actor {:?} joins unknown team {name:?}", entry.name))
        })
        .transpose()
}

fn submit(world: &mut World, command: Command, out_events: &mut Vec<Event>) -> Result<()> {
    let description = format!("{command:?}");
    world::apply(world, command, out_events)
        .with_context(|| format!("scenario command {description} was rejected"))
}
