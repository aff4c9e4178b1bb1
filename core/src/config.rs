//! Tuning surface shared by the world, the systems and the engine.
//!
//! Every group implements [`Default`] with the values the game ships with and
//! deserializes with `#[serde(default)]`, so a configuration file only needs
//! to name the knobs it overrides.

use serde::{Deserialize, Serialize};

/// Aggregated tuning knobs controlling every adjustable aspect of a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Grid dimensions, path cache sizing and initial entity placement.
    pub world: WorldTuning,
    /// Spawn cadence, terminal regeneration and challenge range.
    pub director: DirectorTuning,
    /// Contact damage, beam damage and the railgun hazard.
    pub combat: CombatTuning,
    /// Tick rate, score accrual and power-up durations.
    pub clock: ClockTuning,
}

/// Grid, cache and entity bootstrap parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    /// Side length N of the square tile grid.
    pub grid_size: u32,
    /// Maximum number of memoized `(start, end)` path results.
    pub path_cache_capacity: usize,
    /// Tile the player spawns on before walkable snapping.
    pub player_anchor: [u32; 2],
    /// Tiles the altars are placed on before walkable snapping.
    pub altar_anchors: Vec<[u32; 2]>,
    /// Largest ring radius searched when snapping an anchor to a walkable tile.
    pub snap_radius: u32,
    /// Health the player starts with and is healed back to.
    pub player_health: f32,
    /// Player movement in world units per tick.
    pub player_speed: f32,
    /// Health each monster spawns with.
    pub monster_health: f32,
    /// Monster movement in world units per tick.
    pub monster_speed: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            grid_size: 512,
            path_cache_capacity: 50,
            player_anchor: [256, 256],
            altar_anchors: vec![[100, 100], [400, 100], [100, 400], [400, 400]],
            snap_radius: 50,
            player_health: 100.0,
            player_speed: 2.0,
            monster_health: 100.0,
            monster_speed: 1.0,
        }
    }
}

/// Timer and spawn director parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorTuning {
    /// Ticks between monster waves.
    pub spawn_interval_ticks: u32,
    /// Length of the window along a map edge in which spawn anchors are drawn.
    pub spawn_edge_window: u32,
    /// Ticks without any live terminal before a fresh batch is generated.
    pub terminal_regen_ticks: u32,
    /// Smallest terminal batch.
    pub terminal_batch_min: u32,
    /// Largest terminal batch.
    pub terminal_batch_max: u32,
    /// Minimum axis separation between a terminal and the player or another terminal.
    pub terminal_spacing: f32,
    /// Rejection-sampling attempts allowed per terminal slot.
    pub terminal_attempts: u32,
    /// Axis distance at which the player triggers a terminal challenge.
    pub interaction_range: f32,
}

impl Default for DirectorTuning {
    fn default() -> Self {
        Self {
            spawn_interval_ticks: 150,
            spawn_edge_window: 32,
            terminal_regen_ticks: 0,
            terminal_batch_min: 3,
            terminal_batch_max: 5,
            terminal_spacing: 50.0,
            terminal_attempts: 100,
            interaction_range: 15.0,
        }
    }
}

/// Damage and hazard parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Axis distance below which a monster touches the player.
    pub contact_range: f32,
    /// Player damage per touching monster per tick.
    pub contact_damage: f32,
    /// Axis distance around a beam endpoint that takes damage.
    pub beam_radius: f32,
    /// Beam damage applied to the player per beam per tick.
    pub beam_damage_player: f32,
    /// Beam damage applied to every other entity per beam per tick.
    pub beam_damage_other: f32,
    /// Lifetime of the beam emitted by a fully charged altar.
    pub altar_beam_ticks: u32,
    /// Per-tick probability of a railgun volley while the power-up is active.
    pub railgun_chance: f64,
    /// Lifetime of each railgun beam.
    pub railgun_beam_ticks: u32,
    /// Height above the map the railgun beams originate from.
    pub railgun_origin_y: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            contact_range: 10.0,
            contact_damage: 0.03,
            beam_radius: 10.0,
            beam_damage_player: 0.008,
            beam_damage_other: 0.4,
            altar_beam_ticks: 10,
            railgun_chance: 0.1,
            railgun_beam_ticks: 30,
            railgun_origin_y: -100.0,
        }
    }
}

/// Clock, scoring and power-up parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockTuning {
    /// Fixed simulation rate.
    pub ticks_per_second: u32,
    /// Score accrued every tick while the player is alive.
    pub score_per_tick: f64,
    /// Flat score awarded for a completed terminal challenge.
    pub terminal_bonus: f64,
    /// Seconds the altars stay disabled after a successful challenge.
    pub altar_disable_secs: u32,
    /// Seconds the railgun stays active after a successful challenge.
    pub railgun_secs: u32,
    /// Player health at or below which the run ends.
    pub death_threshold: f32,
}

impl Default for ClockTuning {
    fn default() -> Self {
        Self {
            ticks_per_second: 30,
            score_per_tick: 0.005,
            terminal_bonus: 10.0,
            altar_disable_secs: 30,
            railgun_secs: 15,
            death_threshold: 0.1,
        }
    }
}

impl ClockTuning {
    /// Converts a duration in whole seconds to simulation ticks.
    #[must_use]
    pub fn ticks_for_secs(&self, secs: u32) -> u64 {
        u64::from(secs) * u64::from(self.ticks_per_second)
    }

    /// Simulated seconds covered by a single tick.
    #[must_use]
    pub fn seconds_per_tick(&self) -> f64 {
        if self.ticks_per_second == 0 {
            return 0.0;
        }
        1.0 / f64::from(self.ticks_per_second)
    }
}
