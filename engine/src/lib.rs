#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-step simulation driver that runs the world and every system in a
//! fixed order once per tick.

mod config;

use maze_survival_core::{
    derive_stream_seed, Beam, Command, Entity, EntityId, Event, SimulationConfig,
    SimulationStatus, TerminalKind, TileCoord, RNG_STREAM_COMBAT, RNG_STREAM_DIRECTOR,
};
use maze_survival_system_combat::Combat;
use maze_survival_system_movement::Movement;
use maze_survival_system_spawning::{Config as SpawningConfig, Spawning};
use maze_survival_system_targeting::Targeting;
use maze_survival_world::{self as world, query, World};
use tracing::info;

pub use config::{load_config, parse_config, validate, ConfigError};

const RNG_STREAM_RESTART: &str = "restart";

/// Read-only snapshot handed to a renderer once per tick.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Every live entity in identifier order.
    pub entities: Vec<Entity>,
    /// Active beams.
    pub beams: Vec<Beam>,
    /// Clock, score, death and power-up flags.
    pub status: SimulationStatus,
    /// Player health and maximum health, if the player exists.
    pub player_health: Option<(f32, f32)>,
    /// Terminal whose challenge is awaiting a result.
    pub pending_challenge: Option<EntityId>,
}

/// A complete run: the world plus the systems that drive it.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    base_seed: u64,
    generation: u64,
    world: World,
    spawning: Spawning,
    combat: Combat,
    targeting: Targeting,
    movement: Movement,
}

impl Simulation {
    /// Generates a fresh maze and prepares every system for the first tick.
    #[must_use]
    pub fn new(config: SimulationConfig, seed: u64) -> Self {
        let run_seed = run_seed(seed, 0);
        let (world, spawning, combat) = build(&config, run_seed);
        info!(seed = run_seed, "simulation started");
        Self {
            config,
            base_seed: seed,
            generation: 0,
            world,
            spawning,
            combat,
            targeting: Targeting::new(),
            movement: Movement,
        }
    }

    /// Advances the simulation by one fixed step and returns every event it
    /// produced. Does nothing once the player has died.
    pub fn tick(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if self.is_dead() {
            return events;
        }

        world::apply(&mut self.world, Command::Tick, &mut events);

        let mut commands = Vec::new();
        {
            let view = query::entity_view(&self.world);
            let status = query::status(&self.world);
            let grid = query::grid(&self.world);
            self.spawning.handle(
                &events,
                &status,
                &view,
                |tile| grid.is_walkable(tile),
                &mut commands,
            );
        }
        self.apply_all(&mut commands, &mut events);

        let snapshot = query::entity_view(&self.world);
        let beams = query::beams(&self.world).to_vec();
        let status = query::status(&self.world);
        self.combat.handle(&snapshot, &beams, &status, &mut commands);
        self.apply_all(&mut commands, &mut events);

        self.targeting.handle(&snapshot, &mut commands);
        self.apply_all(&mut commands, &mut events);

        let view = query::entity_view(&self.world);
        let alive = !self.is_dead();
        self.movement.handle(&view, alive, &mut commands);
        self.apply_all(&mut commands, &mut events);

        world::apply(&mut self.world, Command::RemoveFallenMonsters, &mut events);
        events
    }

    /// Routes the player toward a tile. Returns `false` when no path exists or
    /// the player has died; the player then stands still.
    pub fn request_path(&mut self, goal: TileCoord) -> bool {
        if self.is_dead() {
            return false;
        }
        let events = self.submit(Command::RequestPlayerPath { goal });
        events
            .iter()
            .any(|event| matches!(event, Event::PlayerPathAssigned { .. }))
    }

    /// Reports a successful challenge for the pending terminal.
    pub fn complete_challenge(&mut self, terminal: EntityId, kind: TerminalKind) -> Vec<Event> {
        self.submit(Command::CompleteChallenge { terminal, kind })
    }

    /// Dismisses the pending challenge without effect.
    pub fn cancel_challenge(&mut self) -> Vec<Event> {
        self.submit(Command::CancelChallenge)
    }

    /// Applies a single command between ticks.
    pub fn submit(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        events
    }

    /// Terminal awaiting a challenge result and the challenge it carries.
    #[must_use]
    pub fn pending_challenge(&self) -> Option<(EntityId, TerminalKind)> {
        let terminal = query::pending_challenge(&self.world)?;
        let kind = query::entity(&self.world, terminal)?.terminal_kind()?;
        Some((terminal, kind))
    }

    /// Whether the run has ended.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        query::status(&self.world).dead
    }

    /// Clock, score, death and power-up flags.
    #[must_use]
    pub fn status(&self) -> SimulationStatus {
        query::status(&self.world)
    }

    /// Discards every piece of run state and starts over on a new maze.
    pub fn restart(&mut self) {
        self.generation = self.generation.saturating_add(1);
        let run_seed = run_seed(self.base_seed, self.generation);
        let (world, spawning, combat) = build(&self.config, run_seed);
        self.world = world;
        self.spawning = spawning;
        self.combat = combat;
        self.targeting = Targeting::new();
        self.movement = Movement;
        info!(generation = self.generation, seed = run_seed, "simulation restarted");
    }

    /// Captures the render snapshot for the current tick.
    #[must_use]
    pub fn frame(&self) -> Frame {
        let entities = query::entity_view(&self.world).into_vec();
        let player_health = entities
            .iter()
            .find_map(|entity| entity.as_player().map(|player| (player.health, player.max_health)));
        Frame {
            entities,
            beams: query::beams(&self.world).to_vec(),
            status: query::status(&self.world),
            player_health,
            pending_challenge: query::pending_challenge(&self.world),
        }
    }

    /// Read-only access to the world for queries such as the grid.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Tuning the simulation runs with.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Seed of the current run.
    #[must_use]
    pub fn seed(&self) -> u64 {
        run_seed(self.base_seed, self.generation)
    }

    fn apply_all(&mut self, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, events);
        }
    }
}

fn build(config: &SimulationConfig, seed: u64) -> (World, Spawning, Combat) {
    let world = World::new(config.clone(), seed);
    let spawning = Spawning::new(SpawningConfig::new(
        config.director.clone(),
        config.world.grid_size,
        derive_stream_seed(seed, RNG_STREAM_DIRECTOR),
    ));
    let combat = Combat::new(
        config.combat.clone(),
        derive_stream_seed(seed, RNG_STREAM_COMBAT),
    );
    (world, spawning, combat)
}

fn run_seed(base_seed: u64, generation: u64) -> u64 {
    if generation == 0 {
        base_seed
    } else {
        derive_stream_seed(base_seed.wrapping_add(generation), RNG_STREAM_RESTART)
    }
}
