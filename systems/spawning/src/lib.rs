#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timer and spawn director: monster waves, terminal batches and challenge
//! requests.

use maze_survival_core::{
    within_box, Command, DirectorTuning, EntityView, Event, SimulationStatus, SpawnTarget,
    TerminalKind, TerminalPlacement, TileCoord, Vec2,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Debug)]
pub struct Config {
    tuning: DirectorTuning,
    grid_size: u32,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration from director tuning, the grid side length
    /// and the seed of the director's random stream.
    #[must_use]
    pub const fn new(tuning: DirectorTuning, grid_size: u32, rng_seed: u64) -> Self {
        Self {
            tuning,
            grid_size,
            rng_seed,
        }
    }
}

/// Pure system that paces monster waves and terminal batches.
#[derive(Debug)]
pub struct Spawning {
    tuning: DirectorTuning,
    grid_size: u32,
    spawn_timer: u32,
    terminal_timer: u32,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            tuning: config.tuning,
            grid_size: config.grid_size,
            spawn_timer: 0,
            terminal_timer: 0,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Advances both timers once per [`Event::TimeAdvanced`] and emits spawn,
    /// terminal and challenge commands.
    ///
    /// Nothing happens once the player has died.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        status: &SimulationStatus,
        view: &EntityView,
        is_walkable: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(TileCoord) -> bool,
    {
        if status.dead {
            return;
        }

        let ticks = events
            .iter()
            .filter(|event| matches!(event, Event::TimeAdvanced { .. }))
            .count();

        for _ in 0..ticks {
            self.advance_spawn_timer(status, out);
            self.advance_terminal_timer(view, &is_walkable, out);
        }

        if ticks > 0 {
            self.request_nearby_challenge(view, out);
        }
    }

    /// Ticks elapsed since the last wave.
    #[must_use]
    pub fn spawn_timer(&self) -> u32 {
        self.spawn_timer
    }

    fn advance_spawn_timer(&mut self, status: &SimulationStatus, out: &mut Vec<Command>) {
        self.spawn_timer = self.spawn_timer.saturating_add(1);
        if self.spawn_timer < self.tuning.spawn_interval_ticks || status.altars_disabled {
            return;
        }

        for _ in 0..wave_size(status.score) {
            let anchor = self.edge_anchor();
            let target = if self.rng.gen_bool(0.5) {
                SpawnTarget::Player
            } else {
                SpawnTarget::FirstAltar
            };
            out.push(Command::SpawnMonster { anchor, target });
        }
        self.spawn_timer = 0;
    }

    fn edge_anchor(&mut self) -> TileCoord {
        let far = self.grid_size.saturating_sub(1);
        let window = self.tuning.spawn_edge_window.clamp(1, self.grid_size.max(1));
        let edge = self.rng.gen_range(0..4_u8);
        let offset = self.rng.gen_range(0..window);
        match edge {
            0 => TileCoord::new(0, offset),
            1 => TileCoord::new(far, offset),
            2 => TileCoord::new(offset, 0),
            _ => TileCoord::new(offset, far),
        }
    }

    fn advance_terminal_timer<F>(&mut self, view: &EntityView, is_walkable: &F, out: &mut Vec<Command>)
    where
        F: Fn(TileCoord) -> bool,
    {
        if view.terminals().next().is_some() {
            self.terminal_timer = 0;
            return;
        }
        if self.terminal_timer < self.tuning.terminal_regen_ticks {
            self.terminal_timer += 1;
            return;
        }

        let player = view.player().map(|player| player.position);
        let placements = self.sample_terminals(player, is_walkable);
        out.push(Command::ReplaceTerminals { placements });
        self.terminal_timer = 0;
    }

    fn sample_terminals<F>(&mut self, player: Option<Vec2>, is_walkable: &F) -> Vec<TerminalPlacement>
    where
        F: Fn(TileCoord) -> bool,
    {
        let tuning = &self.tuning;
        let min = tuning.terminal_batch_min.min(tuning.terminal_batch_max);
        let count = self.rng.gen_range(min..=tuning.terminal_batch_max);
        let mut placements: Vec<TerminalPlacement> = Vec::new();
        if self.grid_size == 0 {
            return placements;
        }

        for slot in 0..count as usize {
            for _ in 0..self.tuning.terminal_attempts {
                let tile = TileCoord::new(
                    self.rng.gen_range(0..self.grid_size),
                    self.rng.gen_range(0..self.grid_size),
                );
                if !is_walkable(tile) {
                    continue;
                }
                let position = tile.to_position();
                let spacing = self.tuning.terminal_spacing;
                if player.map_or(false, |player| within_box(position, player, spacing))
                    || placements
                        .iter()
                        .any(|placed| within_box(position, placed.tile.to_position(), spacing))
                {
                    continue;
                }
                placements.push(TerminalPlacement {
                    tile,
                    kind: TerminalKind::for_slot(slot),
                });
                break;
            }
        }
        placements
    }

    fn request_nearby_challenge(&self, view: &EntityView, out: &mut Vec<Command>) {
        let Some(player) = view.player() else {
            return;
        };
        let range = self.tuning.interaction_range;
        if let Some(terminal) = view
            .terminals()
            .find(|terminal| within_box(terminal.position, player.position, range))
        {
            out.push(Command::RequestChallenge {
                terminal: terminal.id,
            });
        }
    }
}

/// Number of monsters spawned per wave at the given score.
#[must_use]
pub fn wave_size(score: f64) -> u32 {
    1 + score.max(0.0).sqrt().floor() as u32
}
