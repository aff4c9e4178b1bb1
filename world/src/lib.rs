#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Maze Survival.

mod grid;
mod maze;
mod navigation;
mod power_ups;
mod registry;

use std::collections::VecDeque;

use maze_survival_core::{
    derive_stream_seed, Beam, BeamKind, Command, Entity, EntityId, EntityKind, Event,
    MonsterState, PlayerState, PowerUp, RemovalCause, SimulationConfig, SimulationStatus,
    SpawnTarget, TerminalKind, TerminalPlacement, TileCoord, Vec2, MONSTER_ABANDON_THRESHOLD,
    RNG_STREAM_MAZE,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

pub use grid::WalkabilityGrid;
pub use navigation::{PathCache, PathError, PathPlanner};
pub use power_ups::PowerUpSchedule;
pub use registry::EntityRegistry;

/// Radius of the square searched around an edge anchor for a spawn tile.
const SPAWN_SEARCH_RADIUS: u32 = 2;

/// Represents the authoritative Maze Survival world state.
#[derive(Debug)]
pub struct World {
    config: SimulationConfig,
    grid: WalkabilityGrid,
    maze_seed: Option<TileCoord>,
    planner: PathPlanner,
    registry: EntityRegistry,
    beams: Vec<Beam>,
    power_ups: PowerUpSchedule,
    pending_challenge: Option<EntityId>,
    tick_index: u64,
    score: f64,
    survival_secs: f64,
    dead: bool,
}

impl World {
    /// Generates a fresh maze and places the player and altars on it.
    #[must_use]
    pub fn new(config: SimulationConfig, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(derive_stream_seed(seed, RNG_STREAM_MAZE));
        let mut grid = WalkabilityGrid::blocked(config.world.grid_size);
        let maze_seed = maze::generate(&mut grid, &mut rng);

        let mut world = Self {
            planner: PathPlanner::new(config.world.path_cache_capacity),
            registry: EntityRegistry::new(),
            beams: Vec::new(),
            power_ups: PowerUpSchedule::default(),
            pending_challenge: None,
            tick_index: 0,
            score: 0.0,
            survival_secs: 0.0,
            dead: false,
            maze_seed,
            grid,
            config,
        };
        world.populate();
        info!(
            seed,
            walkable = world.grid.walkable_count(),
            "generated maze"
        );
        world
    }

    fn populate(&mut self) {
        let tuning = &self.config.world;
        let player_tile = self.snap_anchor(tuning.player_anchor);
        let player = PlayerState {
            health: tuning.player_health,
            max_health: tuning.player_health,
            speed: tuning.player_speed,
            path: VecDeque::new(),
        };
        let altar_tiles: Vec<TileCoord> = tuning
            .altar_anchors
            .iter()
            .map(|anchor| self.snap_anchor(*anchor))
            .collect();

        let _ = self
            .registry
            .insert(player_tile.to_position(), EntityKind::Player(player));
        for tile in altar_tiles {
            let _ = self.registry.insert(tile.to_position(), EntityKind::Altar);
        }
    }

    fn snap_anchor(&self, anchor: [u32; 2]) -> TileCoord {
        let anchor = TileCoord::new(anchor[0], anchor[1]).clamped(self.grid.width());
        self.grid
            .nearest_walkable(anchor, self.config.world.snap_radius)
            .unwrap_or(anchor)
    }

    fn player_id(&self) -> Option<EntityId> {
        self.registry.player().map(|player| player.id)
    }

    fn tile_of(&self, position: Vec2) -> TileCoord {
        TileCoord::from_position(position, self.grid.width())
    }

    fn status(&self) -> SimulationStatus {
        SimulationStatus {
            tick: self.tick_index,
            score: self.score,
            survival_secs: self.survival_secs,
            dead: self.dead,
            altars_disabled: self.power_ups.is_active(PowerUp::AltarsDisabled),
            railgun_active: self.power_ups.is_active(PowerUp::Railgun),
        }
    }

    fn advance_clock(&mut self, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced {
            tick: self.tick_index,
        });

        for power_up in self.power_ups.expire_due(self.tick_index) {
            info!(?power_up, tick = self.tick_index, "power-up expired");
            out_events.push(Event::PowerUpExpired { power_up });
        }

        if !self.dead {
            self.score += self.config.clock.score_per_tick;
            self.survival_secs += self.config.clock.seconds_per_tick();
        }
    }

    fn spawn_monster(&mut self, anchor: TileCoord, target: SpawnTarget, out_events: &mut Vec<Event>) {
        let objective = match target {
            SpawnTarget::Player => self.player_id(),
            SpawnTarget::FirstAltar => self
                .registry
                .altars()
                .next()
                .map(|altar| altar.id)
                .or_else(|| self.player_id()),
        };
        let Some(objective) = objective else {
            out_events.push(Event::SpawnFailed { anchor });
            return;
        };

        let Some(tile) = self.grid.first_walkable_within(anchor, SPAWN_SEARCH_RADIUS) else {
            debug!(?anchor, "no walkable spawn tile near anchor");
            out_events.push(Event::SpawnFailed { anchor });
            return;
        };

        let monster = MonsterState {
            health: self.config.world.monster_health,
            speed: self.config.world.monster_speed,
            path: VecDeque::new(),
            target: Some(objective),
            charge: 0.0,
            stuck_counter: 0,
        };
        let id = self
            .registry
            .insert(tile.to_position(), EntityKind::Monster(monster));
        debug!(monster = id.get(), ?tile, target = objective.get(), "monster spawned");
        out_events.push(Event::MonsterSpawned {
            monster: id,
            tile,
            target: objective,
        });
    }

    fn replace_terminals(
        &mut self,
        placements: Vec<TerminalPlacement>,
        out_events: &mut Vec<Event>,
    ) {
        let _ = self
            .registry
            .drain_where(|entity| entity.terminal_kind().is_some());
        self.pending_challenge = None;

        let terminals: Vec<EntityId> = placements
            .into_iter()
            .map(|placement| {
                self.registry
                    .insert(placement.tile.to_position(), EntityKind::Terminal(placement.kind))
            })
            .collect();
        info!(count = terminals.len(), "terminals regenerated");
        out_events.push(Event::TerminalsRegenerated { terminals });
    }

    fn request_challenge(&mut self, terminal: EntityId, out_events: &mut Vec<Event>) {
        if self.dead || self.pending_challenge.is_some() {
            return;
        }
        let Some(kind) = self
            .registry
            .get(terminal)
            .and_then(Entity::terminal_kind)
        else {
            return;
        };
        self.pending_challenge = Some(terminal);
        out_events.push(Event::ChallengeRequested { terminal, kind });
    }

    fn complete_challenge(
        &mut self,
        terminal: EntityId,
        kind: TerminalKind,
        out_events: &mut Vec<Event>,
    ) {
        if self.dead || self.pending_challenge != Some(terminal) {
            warn!(
                terminal = terminal.get(),
                pending = ?self.pending_challenge,
                "ignoring completion for a challenge that is not pending"
            );
            return;
        }
        self.pending_challenge = None;

        match kind {
            TerminalKind::Heal => {
                if let Some(EntityKind::Player(player)) =
                    self.registry.player_mut().map(|entity| &mut entity.kind)
                {
                    player.health = player.max_health;
                }
            }
            TerminalKind::DisableAltar => {
                let duration = self.config.clock.ticks_for_secs(self.config.clock.altar_disable_secs);
                self.activate(PowerUp::AltarsDisabled, duration, out_events);
            }
            TerminalKind::Railgun => {
                let duration = self.config.clock.ticks_for_secs(self.config.clock.railgun_secs);
                self.activate(PowerUp::Railgun, duration, out_events);
            }
        }

        self.score += self.config.clock.terminal_bonus;
        let _ = self.registry.remove(terminal);
        out_events.push(Event::ChallengeCompleted { terminal, kind });
    }

    fn activate(&mut self, power_up: PowerUp, duration: u64, out_events: &mut Vec<Event>) {
        let expires_at = self
            .power_ups
            .activate(power_up, self.tick_index, duration);
        info!(?power_up, expires_at, "power-up activated");
        out_events.push(Event::PowerUpActivated {
            power_up,
            expires_at,
        });
    }

    fn request_player_path(&mut self, goal: TileCoord, out_events: &mut Vec<Event>) {
        let Some((id, position)) = self
            .registry
            .player()
            .map(|player| (player.id, player.position))
        else {
            return;
        };
        let start = self.tile_of(position);
        let path = self.planner.find_path(&self.grid, start, goal);

        let Some(EntityKind::Player(player)) =
            self.registry.get_mut(id).map(|entity| &mut entity.kind)
        else {
            return;
        };
        let waypoints = path.len();
        player.path = path.into();
        if waypoints == 0 {
            out_events.push(Event::PathUnreachable { entity: id });
        } else {
            out_events.push(Event::PlayerPathAssigned { waypoints });
        }
    }

    fn damage(&mut self, entity: EntityId, amount: f32, out_events: &mut Vec<Event>) {
        let death_threshold = self.config.clock.death_threshold;
        let Some(target) = self.registry.get_mut(entity) else {
            return;
        };
        match &mut target.kind {
            EntityKind::Player(player) => {
                player.health = (player.health - amount).max(0.0);
                if !self.dead && player.health <= death_threshold {
                    self.dead = true;
                    info!(
                        survival_secs = self.survival_secs,
                        score = self.score,
                        "player died"
                    );
                    out_events.push(Event::PlayerDied {
                        survival_secs: self.survival_secs,
                        score: self.score,
                    });
                }
            }
            EntityKind::Monster(monster) => monster.health -= amount,
            EntityKind::Altar | EntityKind::Terminal(_) => {}
        }
    }

    fn fire_beam(&mut self, beam: Beam, out_events: &mut Vec<Event>) {
        self.beams.push(beam);
        out_events.push(Event::BeamFired { beam });
    }

    fn discharge_altar(&mut self, monster: EntityId, altar: EntityId, out_events: &mut Vec<Event>) {
        let altar_position = self.registry.get(altar).map(|entity| entity.position);
        let player_position = self.registry.player().map(|entity| entity.position);
        if let Some(state) = self.monster_mut(monster) {
            state.charge = 0.0;
            state.target = None;
            state.path.clear();
        }
        if let (Some(from), Some(to)) = (altar_position, player_position) {
            let beam = Beam::new(from, to, self.config.combat.altar_beam_ticks, BeamKind::Normal);
            self.fire_beam(beam, out_events);
        }
    }

    fn plan_monster_path(&mut self, monster: EntityId, goal: Vec2, out_events: &mut Vec<Event>) {
        let Some(position) = self.registry.get(monster).map(|entity| entity.position) else {
            return;
        };
        let start = self.tile_of(position);
        let end = self.tile_of(goal);
        let path = self.planner.find_path(&self.grid, start, end);

        let Some(state) = self.monster_mut(monster) else {
            return;
        };
        let unreachable = path.is_empty();
        state.path = path.into();
        if unreachable {
            state.stuck_counter = MONSTER_ABANDON_THRESHOLD;
            debug!(monster = monster.get(), "monster abandoned without a path");
            out_events.push(Event::PathUnreachable { entity: monster });
        }
    }

    fn move_entity(&mut self, entity: EntityId, position: Vec2, reached_waypoint: bool) {
        let Some(target) = self.registry.get_mut(entity) else {
            return;
        };
        target.position = position;
        if !reached_waypoint {
            return;
        }
        match &mut target.kind {
            EntityKind::Player(PlayerState { path, .. })
            | EntityKind::Monster(MonsterState { path, .. }) => {
                let _ = path.pop_front();
            }
            EntityKind::Altar | EntityKind::Terminal(_) => {}
        }
    }

    fn remove_fallen_monsters(&mut self, out_events: &mut Vec<Event>) {
        let removed = self.registry.drain_where(|entity| {
            entity.as_monster().map_or(false, |monster| {
                monster.health <= 0.0 || monster.stuck_counter >= MONSTER_ABANDON_THRESHOLD
            })
        });

        for entity in removed {
            let cause = match entity.as_monster() {
                Some(monster) if monster.health <= 0.0 => RemovalCause::Slain,
                _ => RemovalCause::Abandoned,
            };
            debug!(monster = entity.id.get(), ?cause, "monster removed");
            out_events.push(Event::MonsterRemoved {
                monster: entity.id,
                cause,
            });
        }
    }

    fn monster_mut(&mut self, monster: EntityId) -> Option<&mut MonsterState> {
        match self.registry.get_mut(monster).map(|entity| &mut entity.kind) {
            Some(EntityKind::Monster(state)) => Some(state),
            _ => None,
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => world.advance_clock(out_events),
        Command::SpawnMonster { anchor, target } => world.spawn_monster(anchor, target, out_events),
        Command::ReplaceTerminals { placements } => world.replace_terminals(placements, out_events),
        Command::RequestChallenge { terminal } => world.request_challenge(terminal, out_events),
        Command::CompleteChallenge { terminal, kind } => {
            world.complete_challenge(terminal, kind, out_events);
        }
        Command::CancelChallenge => {
            if let Some(terminal) = world.pending_challenge.take() {
                out_events.push(Event::ChallengeCancelled { terminal });
            }
        }
        Command::RequestPlayerPath { goal } => world.request_player_path(goal, out_events),
        Command::DamageEntity { entity, amount } => world.damage(entity, amount, out_events),
        Command::FireBeam { beam } => world.fire_beam(beam, out_events),
        Command::AgeBeams => {
            world.beams.retain(Beam::is_alive);
            for beam in &mut world.beams {
                beam.progress = beam.progress.saturating_add(1);
            }
        }
        Command::RetargetMonster { monster, target } => {
            if let Some(state) = world.monster_mut(monster) {
                state.target = Some(target);
                state.path.clear();
            }
        }
        Command::ChargeAltar { monster, progress } => {
            if let Some(state) = world.monster_mut(monster) {
                state.charge = progress;
                state.path.clear();
            }
        }
        Command::DischargeAltar { monster, altar } => {
            world.discharge_altar(monster, altar, out_events);
        }
        Command::PlanMonsterPath { monster, goal } => {
            world.plan_monster_path(monster, goal, out_events);
        }
        Command::MoveEntity {
            entity,
            position,
            reached_waypoint,
        } => world.move_entity(entity, position, reached_waypoint),
        Command::RemoveFallenMonsters => world.remove_fallen_monsters(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use maze_survival_core::{
        Beam, Entity, EntityId, EntityView, SimulationConfig, SimulationStatus, TileCoord,
    };

    use super::{PathCache, WalkabilityGrid, World};

    /// Provides read-only access to the walkability grid.
    #[must_use]
    pub fn grid(world: &World) -> &WalkabilityGrid {
        &world.grid
    }

    /// Tile the corridor carving started from, if the grid could host one.
    #[must_use]
    pub fn maze_seed(world: &World) -> Option<TileCoord> {
        world.maze_seed
    }

    /// Captures a read-only view of every entity.
    #[must_use]
    pub fn entity_view(world: &World) -> EntityView {
        world.registry.snapshot()
    }

    /// Looks up a single entity.
    #[must_use]
    pub fn entity(world: &World, id: EntityId) -> Option<&Entity> {
        world.registry.get(id)
    }

    /// The player entity.
    #[must_use]
    pub fn player(world: &World) -> Option<&Entity> {
        world.registry.player()
    }

    /// Beams currently tracked, including ones that expire on the next aging pass.
    #[must_use]
    pub fn beams(world: &World) -> &[Beam] {
        &world.beams
    }

    /// Clock, score, death and power-up flags.
    #[must_use]
    pub fn status(world: &World) -> SimulationStatus {
        world.status()
    }

    /// Terminal whose challenge is awaiting a result.
    #[must_use]
    pub fn pending_challenge(world: &World) -> Option<EntityId> {
        world.pending_challenge
    }

    /// Memoized path results.
    #[must_use]
    pub fn path_cache(world: &World) -> &PathCache {
        world.planner.cache()
    }

    /// Tuning the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &SimulationConfig {
        &world.config
    }
}
