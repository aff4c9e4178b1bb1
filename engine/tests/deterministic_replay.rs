use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use maze_survival_core::{SimulationConfig, TileCoord};
use maze_survival_engine::Simulation;
use maze_survival_world::query;

const TICKS: usize = 900;

#[test]
fn identical_seeds_replay_identically() {
    let first = replay(77);
    let second = replay(77);

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[test]
fn different_seeds_generate_different_mazes() {
    let first = Simulation::new(config(), 1);
    let second = Simulation::new(config(), 2);

    assert_ne!(
        query::grid(first.world()).cells(),
        query::grid(second.world()).cells()
    );
}

#[test]
fn restarted_runs_replay_identically() {
    let mut first = Simulation::new(config(), 9);
    let mut second = Simulation::new(config(), 9);
    first.restart();
    second.restart();

    assert_eq!(first.seed(), second.seed());
    assert_eq!(
        query::grid(first.world()).cells(),
        query::grid(second.world()).cells()
    );
    for _ in 0..200 {
        assert_eq!(first.tick(), second.tick());
    }
}

fn config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.world.grid_size = 128;
    config.world.player_anchor = [64, 64];
    config.world.altar_anchors = vec![[20, 20], [100, 100]];
    config.combat.railgun_chance = 0.5;
    config
}

fn replay(seed: u64) -> ReplayOutcome {
    let mut simulation = Simulation::new(config(), seed);
    let mut events = Vec::new();

    for tick in 0..TICKS {
        if tick % 150 == 0 {
            let goal = TileCoord::new(64 + (tick / 150) as u32 * 7, 64);
            let _ = simulation.request_path(goal);
        }
        if let Some((terminal, kind)) = simulation.pending_challenge() {
            let completed = simulation.complete_challenge(terminal, kind);
            events.extend(completed.iter().map(|event| format!("{event:?}")));
        }
        events.extend(simulation.tick().iter().map(|event| format!("{event:?}")));
    }

    let frame = simulation.frame();
    ReplayOutcome {
        events,
        entities: frame
            .entities
            .iter()
            .map(|entity| format!("{entity:?}"))
            .collect(),
        score_bits: frame.status.score.to_bits(),
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    events: Vec<String>,
    entities: Vec<String>,
    score_bits: u64,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}
