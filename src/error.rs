//! # Error Types
//!
//! Custom error types for Key Bridge using `thiserror`.

use thiserror::Error;

/// Main error type for Key Bridge
#[derive(Debug, Error)]
pub enum KeyBridgeError {
    /// Key layout errors (wrong number of symbols for a player)
    #[error("key layout error: {0}")]
    KeyLayout(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Key Bridge
pub type Result<T> = std::result::Result<T, KeyBridgeError>;
