//! Loading and validating [`SimulationConfig`] from TOML.

use std::{fs, path::Path};

use maze_survival_core::SimulationConfig;
use thiserror::Error;

/// Smallest grid that can host a maze seed and a corridor.
const MIN_GRID_SIZE: u32 = 8;

/// Errors that can occur while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML or does not match the schema.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// The values parsed but cannot drive a simulation.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Reads and validates a configuration file.
pub fn load_config(path: &Path) -> Result<SimulationConfig, ConfigError> {
    let text = fs::read_to_string(path)?;
    parse_config(&text)
}

/// Parses and validates configuration text. Omitted fields keep their defaults.
pub fn parse_config(text: &str) -> Result<SimulationConfig, ConfigError> {
    let config: SimulationConfig = toml::from_str(text)?;
    validate(&config)?;
    Ok(config)
}

/// Rejects tuning values the simulation cannot run with.
pub fn validate(config: &SimulationConfig) -> Result<(), ConfigError> {
    if config.world.grid_size < MIN_GRID_SIZE {
        return Err(ConfigError::Invalid(format!(
            "world.grid_size must be at least {MIN_GRID_SIZE}, got {}",
            config.world.grid_size
        )));
    }
    if config.clock.ticks_per_second == 0 {
        return Err(ConfigError::Invalid(
            "clock.ticks_per_second must be positive".to_owned(),
        ));
    }
    if config.director.terminal_batch_min > config.director.terminal_batch_max {
        return Err(ConfigError::Invalid(format!(
            "director.terminal_batch_min ({}) exceeds terminal_batch_max ({})",
            config.director.terminal_batch_min, config.director.terminal_batch_max
        )));
    }
    if !(0.0..=1.0).contains(&config.combat.railgun_chance) {
        return Err(ConfigError::Invalid(format!(
            "combat.railgun_chance must lie in [0, 1], got {}",
            config.combat.railgun_chance
        )));
    }
    Ok(())
}
