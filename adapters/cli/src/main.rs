#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that loads a scenario and auto-plays a Worms round.

mod autoplay;
mod scenario;

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use worms_core::{Command, Event};
use worms_world::{self as world, World};

use crate::autoplay::{Autoplay, RoundSummary};
use crate::scenario::{Scenario, DEFAULT_SCENARIO};

#[derive(Debug, Parser)]
#[command(author, version, about = "Auto-plays a turn-based Worms round", long_about = None)]
struct Args {
    /// TOML scenario to play; the bundled duel is used when omitted.
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Seed for the placement of random actors and food.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Number of turns after which the round is abandoned.
    #[arg(long, default_value_t = 40)]
    max_turns: u32,
    /// Walking steps each actor attempts per turn.
    #[arg(long, default_value_t = 10)]
    steps_per_turn: u32,
    /// Integration step for jumps and projectiles, in seconds.
    #[arg(long, default_value_t = 0.001)]
    time_step: f64,
    /// Launch yield for every shot, in percent.
    #[arg(long = "yield", default_value_t = 60)]
    yield_percent: u32,
    /// Print the final summary as JSON instead of text.
    #[arg(long)]
    json: bool,
}

/// Entry point for the Worms command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.yield_percent > 100 {
        bail!("--yield must lie in 0..=100, got {}", args.yield_percent);
    }
    if !(args.time_step.is_finite() && args.time_step > 0.0) {
        bail!("--time-step must be positive, got {}", args.time_step);
    }

    let contents = match &args.scenario {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?,
        None => DEFAULT_SCENARIO.to_owned(),
    };
    let scenario = Scenario::parse(&contents)?;

    let mut events = Vec::new();
    let mut world = scenario.populate(args.seed, &mut events)?;
    start_round(&mut world, &mut events)?;

    let policy = Autoplay {
        max_turns: args.max_turns,
        steps_per_turn: args.steps_per_turn,
        yield_percent: args.yield_percent,
        time_step: args.time_step,
    };
    let turns = policy.play(&mut world, &mut events);
    info!("{} events over {turns} turns", events.len());

    let summary = RoundSummary::capture(&world, turns);
    if args.json {
        let json =
            serde_json::to_string_pretty(&summary).context("failed to serialise round summary")?;
        println!("{json}");
    } else {
        summary.print();
    }
    Ok(())
}

fn start_round(world: &mut World, events: &mut Vec<Event>) -> Result<()> {
    world::apply(world, Command::StartRound, events).context("failed to start the round")
}
