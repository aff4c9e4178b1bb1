#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Survival engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

mod config;

use std::collections::VecDeque;

pub use glam::Vec2;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use config::{ClockTuning, CombatTuning, DirectorTuning, SimulationConfig, WorldTuning};

/// Label of the random stream that drives maze carving.
pub const RNG_STREAM_MAZE: &str = "maze";
/// Label of the random stream that drives the spawn director.
pub const RNG_STREAM_DIRECTOR: &str = "director";
/// Label of the random stream that drives the railgun hazard.
pub const RNG_STREAM_COMBAT: &str = "combat";

/// Stuck counter value at which a monster is considered abandoned and removed.
pub const MONSTER_ABANDON_THRESHOLD: u32 = 600;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by one fixed step.
    Tick,
    /// Requests a monster spawn near the provided edge anchor.
    SpawnMonster {
        /// Edge tile around which the world searches for a walkable spawn tile.
        anchor: TileCoord,
        /// Objective the spawned monster initially pursues.
        target: SpawnTarget,
    },
    /// Replaces every live terminal with a freshly sampled batch.
    ReplaceTerminals {
        /// Tiles and challenge kinds of the new batch.
        placements: Vec<TerminalPlacement>,
    },
    /// Opens a challenge for a terminal the player is standing next to.
    RequestChallenge {
        /// Terminal the player reached.
        terminal: EntityId,
    },
    /// Reports that the challenge collaborator finished successfully.
    CompleteChallenge {
        /// Terminal whose challenge was solved.
        terminal: EntityId,
        /// Effect selected by the solved challenge.
        kind: TerminalKind,
    },
    /// Reports that the challenge collaborator was closed without success.
    CancelChallenge,
    /// Requests that the player walk to the provided tile.
    RequestPlayerPath {
        /// Destination tile; clamped to the grid by the planner.
        goal: TileCoord,
    },
    /// Subtracts health from an entity.
    DamageEntity {
        /// Entity receiving the damage.
        entity: EntityId,
        /// Health removed this tick.
        amount: f32,
    },
    /// Adds a beam to the active hazard list.
    FireBeam {
        /// Beam to activate with zero progress.
        beam: Beam,
    },
    /// Advances every beam by one tick and drops expired beams.
    AgeBeams,
    /// Points a monster at a new objective and clears its path.
    RetargetMonster {
        /// Monster changing objectives.
        monster: EntityId,
        /// Newly selected objective.
        target: EntityId,
    },
    /// Records altar charge progress for a monster holding still at an altar.
    ChargeAltar {
        /// Charging monster.
        monster: EntityId,
        /// Charge progress after this tick's increment.
        progress: f32,
    },
    /// Completes an altar charge, emitting a beam at the player.
    DischargeAltar {
        /// Monster whose charge completed.
        monster: EntityId,
        /// Altar emitting the beam.
        altar: EntityId,
    },
    /// Requests a fresh path for a monster toward its objective.
    PlanMonsterPath {
        /// Monster needing a path.
        monster: EntityId,
        /// Current position of the objective.
        goal: Vec2,
    },
    /// Moves an entity along its path.
    MoveEntity {
        /// Entity being moved.
        entity: EntityId,
        /// Position after this tick's movement.
        position: Vec2,
        /// Whether the head waypoint was reached and should be consumed.
        reached_waypoint: bool,
    },
    /// Removes slain and abandoned monsters from the registry.
    RemoveFallenMonsters,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Index of the tick that just started.
        tick: u64,
    },
    /// Announces that a timed power-up became active.
    PowerUpActivated {
        /// Power-up that was activated.
        power_up: PowerUp,
        /// Tick at which the power-up resets.
        expires_at: u64,
    },
    /// Announces that a timed power-up reset.
    PowerUpExpired {
        /// Power-up that expired.
        power_up: PowerUp,
    },
    /// Confirms that a monster entered the maze.
    MonsterSpawned {
        /// Identifier assigned to the monster.
        monster: EntityId,
        /// Tile the monster occupies after spawning.
        tile: TileCoord,
        /// Objective the monster initially pursues.
        target: EntityId,
    },
    /// Reports that no walkable tile was found near a spawn anchor.
    SpawnFailed {
        /// Anchor the search started from.
        anchor: TileCoord,
    },
    /// Confirms that a monster left the registry.
    MonsterRemoved {
        /// Identifier of the removed monster.
        monster: EntityId,
        /// Why the monster was removed.
        cause: RemovalCause,
    },
    /// Reports that no path exists for an entity's request.
    PathUnreachable {
        /// Entity whose request failed.
        entity: EntityId,
    },
    /// Confirms that the player received a new path.
    PlayerPathAssigned {
        /// Number of waypoints in the path, including the start tile.
        waypoints: usize,
    },
    /// Confirms that a beam became active.
    BeamFired {
        /// Beam that was activated.
        beam: Beam,
    },
    /// Confirms that the terminal batch was replaced.
    TerminalsRegenerated {
        /// Terminals created in the new batch.
        terminals: Vec<EntityId>,
    },
    /// Asks the challenge collaborator to run a mini-game.
    ChallengeRequested {
        /// Terminal the player reached.
        terminal: EntityId,
        /// Challenge type carried by the terminal.
        kind: TerminalKind,
    },
    /// Confirms that a challenge effect was applied.
    ChallengeCompleted {
        /// Terminal that was consumed.
        terminal: EntityId,
        /// Effect that was applied.
        kind: TerminalKind,
    },
    /// Confirms that a pending challenge was dismissed without effect.
    ChallengeCancelled {
        /// Terminal whose challenge was dismissed.
        terminal: EntityId,
    },
    /// Announces the terminal game-over transition.
    PlayerDied {
        /// Survival time at death, in seconds.
        survival_secs: f64,
        /// Score at death.
        score: f64,
    },
}

/// Unique identifier assigned to an entity.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid tile expressed as column and row coordinates.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TileCoord {
    x: u32,
    y: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Floors a continuous position to a tile and clamps it to `[0, size - 1]`.
    #[must_use]
    pub fn from_position(position: Vec2, size: u32) -> Self {
        let max = size.saturating_sub(1) as f32;
        let clamp = |value: f32| {
            if value.is_nan() {
                0
            } else {
                value.floor().clamp(0.0, max) as u32
            }
        };
        Self::new(clamp(position.x), clamp(position.y))
    }

    /// Position of the tile's origin corner in world units.
    #[must_use]
    pub fn to_position(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }

    /// Clamps both axes to `[0, size - 1]`.
    #[must_use]
    pub fn clamped(self, size: u32) -> Self {
        let max = size.saturating_sub(1);
        Self::new(self.x.min(max), self.y.min(max))
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Challenge carried by a terminal and the power-up it grants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminalKind {
    /// Restores the player to full health.
    Heal,
    /// Suspends monster spawning for a while.
    DisableAltar,
    /// Calls down railgun strikes on every monster for a while.
    Railgun,
}

impl TerminalKind {
    /// Kinds assigned to a terminal batch in slot order.
    pub const CYCLE: [TerminalKind; 3] = [Self::Heal, Self::DisableAltar, Self::Railgun];

    /// Kind assigned to the terminal occupying the given batch slot.
    #[must_use]
    pub const fn for_slot(slot: usize) -> Self {
        Self::CYCLE[slot % Self::CYCLE.len()]
    }
}

/// Timed global effects granted by terminal challenges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUp {
    /// Monster spawning is suspended.
    AltarsDisabled,
    /// Railgun strikes rain on monsters.
    Railgun,
}

/// Visual and behavioural flavour of a beam.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeamKind {
    /// Beam emitted by a fully charged altar.
    Normal,
    /// Vertical strike produced by the railgun power-up.
    Railgun,
}

/// Timed damaging line hazard between two points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    /// Origin of the beam.
    pub from: Vec2,
    /// Endpoint of the beam; damage is applied around this point.
    pub to: Vec2,
    /// Ticks the beam has been alive.
    pub progress: u32,
    /// Ticks the beam lives in total.
    pub duration: u32,
    /// Flavour of the beam.
    pub kind: BeamKind,
}

impl Beam {
    /// Creates a fresh beam with zero progress.
    #[must_use]
    pub const fn new(from: Vec2, to: Vec2, duration: u32, kind: BeamKind) -> Self {
        Self {
            from,
            to,
            progress: 0,
            duration,
            kind,
        }
    }

    /// Reports whether the beam still deals damage.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.progress < self.duration
    }
}

/// Objective chosen for a monster at spawn time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnTarget {
    /// The player.
    Player,
    /// The first altar in the registry.
    FirstAltar,
}

/// Tile and challenge kind of a terminal about to be created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TerminalPlacement {
    /// Walkable tile the terminal stands on.
    pub tile: TileCoord,
    /// Challenge the terminal offers.
    pub kind: TerminalKind,
}

/// Reasons a monster may leave the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemovalCause {
    /// Health dropped to zero.
    Slain,
    /// Path search was abandoned.
    Abandoned,
}

/// Mutable state carried by the player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Current health.
    pub health: f32,
    /// Health restored by a heal challenge.
    pub max_health: f32,
    /// Movement in world units per tick.
    pub speed: f32,
    /// Remaining waypoints; the front is the next one.
    pub path: VecDeque<TileCoord>,
}

/// Mutable state carried by a monster.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonsterState {
    /// Current health.
    pub health: f32,
    /// Movement in world units per tick.
    pub speed: f32,
    /// Remaining waypoints; the front is the next one.
    pub path: VecDeque<TileCoord>,
    /// Objective being pursued, if any.
    pub target: Option<EntityId>,
    /// Altar charge progress in `0..=1`.
    pub charge: f32,
    /// Abandonment signal; the monster is removed once it reaches the threshold.
    pub stuck_counter: u32,
}

/// Variant-specific payload of an entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    /// The single player-controlled entity.
    Player(PlayerState),
    /// A hostile pathing unit.
    Monster(MonsterState),
    /// A stationary objective and beam source.
    Altar,
    /// A stationary power-up dispenser.
    Terminal(TerminalKind),
}

/// Identity, position and payload of a simulated entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier.
    pub id: EntityId,
    /// Continuous position in world units.
    pub position: Vec2,
    /// Variant-specific payload.
    pub kind: EntityKind,
}

impl Entity {
    /// Player payload, if this entity is the player.
    #[must_use]
    pub fn as_player(&self) -> Option<&PlayerState> {
        match &self.kind {
            EntityKind::Player(player) => Some(player),
            _ => None,
        }
    }

    /// Monster payload, if this entity is a monster.
    #[must_use]
    pub fn as_monster(&self) -> Option<&MonsterState> {
        match &self.kind {
            EntityKind::Monster(monster) => Some(monster),
            _ => None,
        }
    }

    /// Terminal kind, if this entity is a terminal.
    #[must_use]
    pub fn terminal_kind(&self) -> Option<TerminalKind> {
        match self.kind {
            EntityKind::Terminal(kind) => Some(kind),
            _ => None,
        }
    }

    /// Reports whether this entity is an altar.
    #[must_use]
    pub fn is_altar(&self) -> bool {
        matches!(self.kind, EntityKind::Altar)
    }

    /// Current path of a moving entity; empty for stationary ones.
    #[must_use]
    pub fn path(&self) -> Option<&VecDeque<TileCoord>> {
        match &self.kind {
            EntityKind::Player(player) => Some(&player.path),
            EntityKind::Monster(monster) => Some(&monster.path),
            EntityKind::Altar | EntityKind::Terminal(_) => None,
        }
    }

    /// Movement speed of a moving entity.
    #[must_use]
    pub fn speed(&self) -> Option<f32> {
        match &self.kind {
            EntityKind::Player(player) => Some(player.speed),
            EntityKind::Monster(monster) => Some(monster.speed),
            EntityKind::Altar | EntityKind::Terminal(_) => None,
        }
    }
}

/// Read-only snapshot describing every entity at the start of a tick.
#[derive(Clone, Debug, Default)]
pub struct EntityView {
    snapshots: Vec<Entity>,
}

impl EntityView {
    /// Creates a new entity view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<Entity>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.snapshots.iter()
    }

    /// Looks up an entity by identifier.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// The player entity, if present.
    #[must_use]
    pub fn player(&self) -> Option<&Entity> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.as_player().is_some())
    }

    /// Iterator over every altar.
    pub fn altars(&self) -> impl Iterator<Item = &Entity> {
        self.snapshots.iter().filter(|snapshot| snapshot.is_altar())
    }

    /// Iterator over every monster.
    pub fn monsters(&self) -> impl Iterator<Item = &Entity> {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.as_monster().is_some())
    }

    /// Iterator over every terminal.
    pub fn terminals(&self) -> impl Iterator<Item = &Entity> {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.terminal_kind().is_some())
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<Entity> {
        self.snapshots
    }
}

/// Global clock, score and power-up state observed by systems each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimulationStatus {
    /// Index of the current tick.
    pub tick: u64,
    /// Accumulated score.
    pub score: f64,
    /// Simulated seconds survived.
    pub survival_secs: f64,
    /// Whether the player has died.
    pub dead: bool,
    /// Whether monster spawning is suspended.
    pub altars_disabled: bool,
    /// Whether railgun strikes are active.
    pub railgun_active: bool,
}

/// Reports whether two points lie within `range` of each other on both axes.
#[must_use]
pub fn within_box(a: Vec2, b: Vec2, range: f32) -> bool {
    (a.x - b.x).abs() < range && (a.y - b.y).abs() < range
}

/// Derives an independent stream seed from a base seed and a stream label.
#[must_use]
pub fn derive_stream_seed(base_seed: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base_seed.to_le_bytes());
    hasher.update(label.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[0..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn positions_floor_and_clamp_into_grid() {
        assert_eq!(
            TileCoord::from_position(Vec2::new(3.9, 7.2), 512),
            TileCoord::new(3, 7)
        );
        assert_eq!(
            TileCoord::from_position(Vec2::new(-4.0, 900.5), 512),
            TileCoord::new(0, 511)
        );
        assert_eq!(
            TileCoord::new(600, 2).clamped(512),
            TileCoord::new(511, 2)
        );
    }

    #[test]
    fn terminal_kinds_cycle_by_slot() {
        assert_eq!(TerminalKind::for_slot(0), TerminalKind::Heal);
        assert_eq!(TerminalKind::for_slot(1), TerminalKind::DisableAltar);
        assert_eq!(TerminalKind::for_slot(2), TerminalKind::Railgun);
        assert_eq!(TerminalKind::for_slot(3), TerminalKind::Heal);
    }

    #[test]
    fn entity_view_sorts_and_finds_by_id() {
        let view = EntityView::from_snapshots(vec![
            Entity {
                id: EntityId::new(4),
                position: Vec2::ZERO,
                kind: EntityKind::Altar,
            },
            Entity {
                id: EntityId::new(1),
                position: Vec2::ONE,
                kind: EntityKind::Terminal(TerminalKind::Railgun),
            },
        ]);

        let ids: Vec<_> = view.iter().map(|entity| entity.id.get()).collect();
        assert_eq!(ids, vec![1, 4]);
        assert!(view.get(EntityId::new(4)).is_some_and(Entity::is_altar));
        assert!(view.get(EntityId::new(2)).is_none());
        assert!(view.player().is_none());
        assert_eq!(view.terminals().count(), 1);
    }

    #[test]
    fn within_box_is_strict_on_both_axes() {
        let origin = Vec2::new(100.0, 100.0);
        assert!(within_box(origin, Vec2::new(109.9, 90.1), 10.0));
        assert!(!within_box(origin, Vec2::new(110.0, 100.0), 10.0));
        assert!(!within_box(origin, Vec2::new(100.0, 89.0), 10.0));
    }

    #[test]
    fn stream_seeds_differ_by_label() {
        let maze = derive_stream_seed(7, RNG_STREAM_MAZE);
        assert_eq!(maze, derive_stream_seed(7, RNG_STREAM_MAZE));
        assert_ne!(maze, derive_stream_seed(7, RNG_STREAM_DIRECTOR));
        assert_ne!(maze, derive_stream_seed(8, RNG_STREAM_MAZE));
    }

    #[test]
    fn beam_round_trips_through_bincode() {
        let beam = Beam::new(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0), 10, BeamKind::Normal);
        assert_round_trip(&beam);
    }

    #[test]
    fn monster_round_trips_through_bincode() {
        let monster = Entity {
            id: EntityId::new(9),
            position: Vec2::new(12.5, 3.0),
            kind: EntityKind::Monster(MonsterState {
                health: 80.0,
                speed: 1.0,
                path: VecDeque::from(vec![TileCoord::new(12, 3), TileCoord::new(13, 3)]),
                target: Some(EntityId::new(1)),
                charge: 0.4,
                stuck_counter: 0,
            }),
        };
        assert_round_trip(&monster);
    }
}
