//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Each `[[players]]` table configures one virtual controller: its key
//! layout, press pause, and optional analog channel tuning. Channel tables
//! left out of the file keep the built-in defaults and stay lazily created.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::player::{
    AXIS_HIGH_THRESHOLD, AXIS_LOW_THRESHOLD, DEFAULT_TRANSITION_WINDOW, NUM_BUTTONS,
    SINGLE_ENDED_HIGH_THRESHOLD, SINGLE_ENDED_LOW_THRESHOLD,
};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub players: Vec<PlayerConfig>,
}

/// Per-player configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PlayerConfig {
    /// Key symbols in bit-position order (a, b, left, up, right, down).
    pub keys: String,

    #[serde(default = "default_press_pause_ms")]
    pub press_pause_ms: u64,

    /// Tuning for both bidirectional axis channels (left/right, down/up).
    #[serde(default)]
    pub axis: Option<ChannelTuning>,

    /// Tuning for both single-ended channels (A, B).
    #[serde(default)]
    pub analog: Option<ChannelTuning>,
}

/// Threshold and debounce tuning for an analog channel pair
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ChannelTuning {
    /// Low threshold. Supplying a tuning table requires both bounds;
    /// built-in defaults differ per channel kind.
    pub low: f32,

    pub high: f32,

    #[serde(default = "default_transition_window")]
    pub transition_window: u32,
}

// Default value functions
fn default_press_pause_ms() -> u64 { 5 }
fn default_transition_window() -> u32 { DEFAULT_TRANSITION_WINDOW }

impl ChannelTuning {
    /// Built-in tuning for the bidirectional axis channels.
    #[must_use]
    pub fn axis_default() -> Self {
        Self {
            low: AXIS_LOW_THRESHOLD,
            high: AXIS_HIGH_THRESHOLD,
            transition_window: DEFAULT_TRANSITION_WINDOW,
        }
    }

    /// Built-in tuning for the single-ended A/B channels.
    #[must_use]
    pub fn single_ended_default() -> Self {
        Self {
            low: SINGLE_ENDED_LOW_THRESHOLD,
            high: SINGLE_ENDED_HIGH_THRESHOLD,
            transition_window: DEFAULT_TRANSITION_WINDOW,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use key_bridge::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// Threshold order is deliberately NOT validated: an inverted pair is
    /// legal and normalized by the detector.
    fn validate(&self) -> Result<()> {
        if self.players.is_empty() {
            return Err(crate::error::KeyBridgeError::Config(
                toml::de::Error::custom("at least one [[players]] table is required"),
            ));
        }

        for (index, player) in self.players.iter().enumerate() {
            let count = player.keys.chars().count();
            if count != NUM_BUTTONS {
                return Err(crate::error::KeyBridgeError::Config(toml::de::Error::custom(
                    format!(
                        "players[{}].keys must contain exactly {} symbols, got {}",
                        index, NUM_BUTTONS, count
                    ),
                )));
            }

            if player.press_pause_ms > 1000 {
                return Err(crate::error::KeyBridgeError::Config(toml::de::Error::custom(
                    format!("players[{}].press_pause_ms must be at most 1000", index),
                )));
            }

            for (name, tuning) in [("axis", &player.axis), ("analog", &player.analog)] {
                if let Some(tuning) = tuning {
                    if tuning.transition_window > 1000 {
                        return Err(crate::error::KeyBridgeError::Config(
                            toml::de::Error::custom(format!(
                                "players[{}].{}.transition_window must be at most 1000",
                                index, name
                            )),
                        ));
                    }
                    if !tuning.low.is_finite() || !tuning.high.is_finite() {
                        return Err(crate::error::KeyBridgeError::Config(
                            toml::de::Error::custom(format!(
                                "players[{}].{} thresholds must be finite",
                                index, name
                            )),
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}
