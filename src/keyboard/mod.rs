//! # Keyboard Emission Module
//!
//! The delivery boundary between the input core and the host.
//!
//! This module handles:
//! - The [`KeyEvent`] transition alphabet (down / up / press)
//! - The [`KeySink`] trait every delivery backend implements
//! - A `tracing`-backed sink used by the demo binary
//!
//! The core never talks to a real keyboard: it decides *when* a transition
//! should be emitted and hands it to whatever sink the embedding application
//! configured.

pub mod sink;

pub use sink::{KeySink, TracingKeySink};

/// A single key transition emitted for one mapped symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// Key transitioned to held.
    Down,
    /// Key transitioned to released.
    Up,
    /// Atomic down-then-up, for sinks that support it natively.
    Press,
}

impl std::fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyEvent::Down => write!(f, "down"),
            KeyEvent::Up => write!(f, "up"),
            KeyEvent::Press => write!(f, "press"),
        }
    }
}
