//! # Key Bridge Library
//!
//! Map game controller inputs to emulated keyboard key events.
//!
//! This library converts asynchronous controller inputs (button edges,
//! periodically sampled analog signals) into stable, de-duplicated key
//! down/up transitions that a keyboard-emulation layer can deliver to a host.

pub mod config;
pub mod error;
pub mod keyboard;
pub mod player;
