//! Designer-facing tuning constants for a Maze Crawl session.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::MIN_MAZE_SIZE;

const DEFAULT_INITIAL_SIZE: u32 = 10;
const DEFAULT_SIZE_INCREMENT: u32 = 2;
const DEFAULT_TICK_PERIOD_MS: u64 = 250;
const DEFAULT_RECENT_WINDOW: usize = 5;
const DEFAULT_LEVEL_TRANSITION_DELAY_MS: u64 = 100;

/// Tuning knobs for maze growth, pacing and presentation.
///
/// Every field falls back to its default when omitted from a TOML document,
/// so partial files only override what they mention.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Side length of the level-one maze.
    pub initial_size: u32,
    /// Cells added to the side length on every level-up.
    pub size_increment: u32,
    /// Period between simulation ticks in milliseconds.
    pub tick_period_ms: u64,
    /// Number of accepted moves kept for the recent-command panel.
    pub recent_window: usize,
    /// Pause between reaching the exit and regenerating, in milliseconds.
    /// Zero applies the level-up within the winning tick.
    pub level_transition_delay_ms: u64,
    /// Seed for maze generation; adapters pick one when absent.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_size: DEFAULT_INITIAL_SIZE,
            size_increment: DEFAULT_SIZE_INCREMENT,
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            recent_window: DEFAULT_RECENT_WINDOW,
            level_transition_delay_ms: DEFAULT_LEVEL_TRANSITION_DELAY_MS,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the TOML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Checks that every value can drive a playable session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_size < MIN_MAZE_SIZE {
            return Err(ConfigError::InvalidSize {
                size: self.initial_size,
            });
        }
        if self.tick_period_ms == 0 {
            return Err(ConfigError::InvalidTickPeriod);
        }
        if self.recent_window == 0 {
            return Err(ConfigError::InvalidRecentWindow);
        }
        Ok(())
    }

    /// Period between simulation ticks.
    #[must_use]
    pub const fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Pause between reaching the exit and applying the level-up.
    #[must_use]
    pub const fn level_transition_delay(&self) -> Duration {
        Duration::from_millis(self.level_transition_delay_ms)
    }
}

/// Reasons a configuration cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration from {}: {source}", path.display())]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
    /// The TOML document is malformed or contains unknown keys.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// The initial maze would be too small to hold a start and an exit.
    #[error("initial maze size {size} is below the minimum of {MIN_MAZE_SIZE}")]
    InvalidSize {
        /// Configured side length.
        size: u32,
    },
    /// A zero tick period would spin the scheduler.
    #[error("tick period must be greater than zero")]
    InvalidTickPeriod,
    /// A zero-length window could never show a command.
    #[error("recent command window must hold at least one command")]
    InvalidRecentWindow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_designer_constants() {
        let config = GameConfig::default();
        assert_eq!(config.initial_size, 10);
        assert_eq!(config.size_increment, 2);
        assert_eq!(config.tick_period(), Duration::from_millis(250));
        assert_eq!(config.recent_window, 5);
        assert_eq!(config.level_transition_delay(), Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_documents_keep_remaining_defaults() {
        let config = GameConfig::from_toml_str("initial_size = 15\nseed = 7\n")
            .expect("valid configuration");
        assert_eq!(config.initial_size, 15);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.tick_period_ms, 250);
    }

    #[test]
    fn undersized_mazes_are_rejected() {
        let error = GameConfig::from_toml_str("initial_size = 1").expect_err("too small");
        assert!(matches!(error, ConfigError::InvalidSize { size: 1 }));
    }

    #[test]
    fn zero_tick_period_is_rejected() {
        let error = GameConfig::from_toml_str("tick_period_ms = 0").expect_err("zero period");
        assert!(matches!(error, ConfigError::InvalidTickPeriod));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = GameConfig::from_toml_str("tick_rate = 4").expect_err("unknown key");
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_files_report_their_path() {
        let error = GameConfig::load("/nonexistent/maze-crawl.toml").expect_err("missing file");
        assert!(matches!(error, ConfigError::Read { .. }));
        assert!(error.to_string().contains("/nonexistent/maze-crawl.toml"));
    }
}
