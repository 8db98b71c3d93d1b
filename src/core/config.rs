//! Session configuration.
//!
//! Embeddings configure a session at startup with `SessionConfig`, either
//! through the builder methods or from TOML:
//!
//! ```toml
//! seed = 42
//! connect_timeout_ticks = 12
//! deck_size = 16
//! ```
//!
//! Missing keys fall back to their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default connect timeout in ticks.
pub const DEFAULT_CONNECT_TIMEOUT_TICKS: u64 = 10;

/// Accepted connect timeout bounds in ticks.
pub const CONNECT_TIMEOUT_RANGE: std::ops::RangeInclusive<u64> = 10..=15;

/// Default cards per party at the deal.
pub const DEFAULT_DECK_SIZE: usize = 16;

/// Complete session configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// RNG seed for deals and CPU noise. `None` seeds from OS entropy.
    pub seed: Option<u64>,

    /// Ticks a pending connect may wait for the channel to open.
    pub connect_timeout_ticks: u64,

    /// Cards dealt to each party. Twice this must fit in the card pool.
    pub deck_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            connect_timeout_ticks: DEFAULT_CONNECT_TIMEOUT_TICKS,
            deck_size: DEFAULT_DECK_SIZE,
        }
    }
}

impl SessionConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a fixed RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the connect timeout in ticks.
    #[must_use]
    pub fn with_connect_timeout(mut self, ticks: u64) -> Self {
        self.connect_timeout_ticks = ticks;
        self
    }

    /// Set the number of cards dealt to each party.
    #[must_use]
    pub fn with_deck_size(mut self, size: usize) -> Self {
        self.deck_size = size;
        self
    }

    /// Total cards in play for one game.
    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.deck_size * 2
    }

    /// Check values against their accepted ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !CONNECT_TIMEOUT_RANGE.contains(&self.connect_timeout_ticks) {
            return Err(ConfigError::Invalid(format!(
                "connect_timeout_ticks must be within {}..={}, got {}",
                CONNECT_TIMEOUT_RANGE.start(),
                CONNECT_TIMEOUT_RANGE.end(),
                self.connect_timeout_ticks
            )));
        }
        if self.deck_size == 0 {
            return Err(ConfigError::Invalid("deck_size must be at least 1".into()));
        }
        Ok(())
    }

    /// Parse and validate a config from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Error loading a config (I/O, TOML syntax, or out-of-range value).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
