#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless host that drives a Maze Survival run from the command line.

mod goal;

use std::{
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use maze_survival_core::{EntityKind, Event, SimulationConfig, TileCoord};
use maze_survival_engine::{load_config, validate, Simulation};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Runs the maze survival simulation without a renderer.
#[derive(Debug, Parser)]
#[command(name = "maze-survival", version)]
struct Args {
    /// Seed fully determining the maze and every random decision.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of ticks to simulate; the run also ends when the player dies.
    #[arg(long, default_value_t = 1_800)]
    ticks: u64,

    /// TOML file overriding the default tuning.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tile the player walks toward, written as `x,y`.
    #[arg(long, value_parser = goal::parse_goal)]
    goal: Option<TileCoord>,

    /// Succeed every terminal challenge as soon as it is requested.
    #[arg(long)]
    auto_challenge: bool,

    /// Pace ticks at the configured rate instead of running unthrottled.
    #[arg(long)]
    realtime: bool,

    /// Log filter directive used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log: String,
}

/// Counters reported once the run ends.
#[derive(Debug, Default)]
struct RunSummary {
    ticks: u64,
    spawned: usize,
    removed: usize,
    challenges: usize,
}

impl RunSummary {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::MonsterSpawned { .. } => self.spawned += 1,
                Event::MonsterRemoved { .. } => self.removed += 1,
                Event::ChallengeCompleted { .. } => self.challenges += 1,
                _ => {}
            }
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log)?;

    let config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => {
            let config = SimulationConfig::default();
            validate(&config).context("default configuration is invalid")?;
            config
        }
    };

    let mut simulation = Simulation::new(config, args.seed);
    if let Some(goal) = args.goal {
        if !simulation.request_path(goal) {
            warn!(?goal, "goal is unreachable; the player will stand still");
        }
    }

    let summary = run(&mut simulation, &args);
    print_summary(&simulation, &summary);
    Ok(())
}

fn init_logging(directive: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log directive '{directive}'"))?,
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

fn run(simulation: &mut Simulation, args: &Args) -> RunSummary {
    let step = Duration::from_secs_f64(simulation.config().clock.seconds_per_tick());
    let mut summary = RunSummary::default();
    let mut next_frame = Instant::now();

    while summary.ticks < args.ticks && !simulation.is_dead() {
        let events = simulation.tick();
        summary.ticks += 1;
        summary.record(&events);

        if args.auto_challenge {
            if let Some((terminal, kind)) = simulation.pending_challenge() {
                info!(terminal = terminal.get(), ?kind, "auto-completing challenge");
                summary.record(&simulation.complete_challenge(terminal, kind));
            }
        }

        if args.realtime {
            next_frame += step;
            let now = Instant::now();
            if next_frame > now {
                thread::sleep(next_frame - now);
            }
        }
    }
    summary
}

fn print_summary(simulation: &Simulation, summary: &RunSummary) {
    let frame = simulation.frame();
    let monsters = frame
        .entities
        .iter()
        .filter(|entity| matches!(entity.kind, EntityKind::Monster(_)))
        .count();
    let terminals = frame
        .entities
        .iter()
        .filter(|entity| matches!(entity.kind, EntityKind::Terminal(_)))
        .count();

    println!("seed: {}", simulation.seed());
    println!("ticks: {}", summary.ticks);
    println!("survival: {:.2}s", frame.status.survival_secs);
    println!("score: {:.3}", frame.status.score);
    if let Some((health, max_health)) = frame.player_health {
        println!("health: {health:.2}/{max_health:.0}");
    }
    println!("dead: {}", frame.status.dead);
    println!(
        "monsters: {monsters} alive, {} spawned, {} removed",
        summary.spawned, summary.removed
    );
    println!("terminals: {terminals} live, {} completed", summary.challenges);
    println!("beams: {}", frame.beams.len());
}
