//! # Key Bridge
//!
//! Map game controller inputs to emulated keyboard key events.
//!
//! This binary wires the input core to a line-oriented command source on
//! stdin, standing in for the physical edge and analog sources an embedding
//! application would provide. Emitted key transitions are reported through
//! `tracing`.
//!
//! ## Commands
//!
//! | Command                        | Effect                                   |
//! |--------------------------------|------------------------------------------|
//! | `press a+b`                    | Press and release a button set           |
//! | `down left` / `up left`        | Hold or release a button set             |
//! | `analog lr 300`                | Feed one sample to an analog channel     |
//! | `threshold a 0 200`            | Replace a channel's thresholds           |
//! | `window lr 3`                  | Replace a channel's confirmation window  |
//! | `reset`                        | Release everything held                  |
//!
//! Channels: `lr` (left/right axis), `du` (down/up axis), `a`, `b`.
//! Prefix any command with a player number (`2 press a`) to address a
//! player other than the first.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

mod config;
mod error;
mod keyboard;
mod player;

use config::Config;
use keyboard::TracingKeySink;
use player::{AnalogChannel, ButtonSet, Player};
use std::time::Duration;

/// Default configuration file path
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// One parsed stdin command.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Press(ButtonSet),
    SetDown(ButtonSet, bool),
    Analog(AnalogChannel, f32),
    Threshold(AnalogChannel, f32, f32),
    Window(AnalogChannel, u32),
    Reset,
}

/// Parses a command line into a zero-based player index and a [`Command`].
///
/// An optional leading integer selects the player (1-based); everything else
/// addresses player 1.
fn parse_command(line: &str) -> Result<(usize, Command), String> {
    let mut tokens = line.split_whitespace().peekable();

    let player = match tokens.peek().and_then(|t| t.parse::<usize>().ok()) {
        Some(n) if n >= 1 => {
            tokens.next();
            n - 1
        }
        Some(_) => return Err("player numbers start at 1".to_string()),
        None => 0,
    };

    let verb = tokens.next().ok_or("empty command")?;
    let command = match verb {
        "press" => Command::Press(parse_buttons(tokens.next())?),
        "down" => Command::SetDown(parse_buttons(tokens.next())?, true),
        "up" => Command::SetDown(parse_buttons(tokens.next())?, false),
        "analog" => Command::Analog(
            parse_channel(tokens.next())?,
            parse_number(tokens.next(), "sample value")?,
        ),
        "threshold" => Command::Threshold(
            parse_channel(tokens.next())?,
            parse_number(tokens.next(), "low threshold")?,
            parse_number(tokens.next(), "high threshold")?,
        ),
        "window" => {
            let channel = parse_channel(tokens.next())?;
            let samples = tokens
                .next()
                .ok_or("missing window size")?
                .parse::<u32>()
                .map_err(|e| format!("invalid window size: {}", e))?;
            Command::Window(channel, samples)
        }
        "reset" => Command::Reset,
        other => return Err(format!("unknown command '{}'", other)),
    };

    if let Some(extra) = tokens.next() {
        return Err(format!("unexpected trailing argument '{}'", extra));
    }

    Ok((player, command))
}

fn parse_buttons(token: Option<&str>) -> Result<ButtonSet, String> {
    token.ok_or("missing button set")?.parse()
}

fn parse_channel(token: Option<&str>) -> Result<AnalogChannel, String> {
    token.ok_or("missing analog channel")?.parse()
}

fn parse_number(token: Option<&str>, what: &str) -> Result<f32, String> {
    token
        .ok_or_else(|| format!("missing {}", what))?
        .parse::<f32>()
        .map_err(|e| format!("invalid {}: {}", what, e))
}

/// Applies one command to the addressed player.
async fn apply_command(
    players: &mut [Player<TracingKeySink>],
    index: usize,
    command: Command,
) -> Result<(), String> {
    let player = players
        .get_mut(index)
        .ok_or_else(|| format!("no player {} configured", index + 1))?;

    match command {
        Command::Press(buttons) => player.press(buttons).await,
        Command::SetDown(buttons, down) => player.set_down(buttons, down),
        Command::Analog(channel, value) => player.set_analog(channel, value),
        Command::Threshold(channel, low, high) => player.set_analog_threshold(channel, low, high),
        Command::Window(channel, samples) => player.set_transition_window(channel, samples),
        Command::Reset => player.reset(),
    }

    Ok(())
}

/// Builds one player from its configuration, applying any channel tuning the
/// file supplied. Channels without a tuning table stay lazily created.
fn build_player(config: &config::PlayerConfig) -> error::Result<Player<TracingKeySink>> {
    let mut player = Player::new(
        &config.keys,
        Duration::from_millis(config.press_pause_ms),
        TracingKeySink::new(),
    )?;

    if let Some(axis) = config.axis {
        for channel in [AnalogChannel::LeftRight, AnalogChannel::DownUp] {
            player.set_analog_threshold(channel, axis.low, axis.high);
            player.set_transition_window(channel, axis.transition_window);
        }
    }

    if let Some(analog) = config.analog {
        for channel in [AnalogChannel::A, AnalogChannel::B] {
            player.set_analog_threshold(channel, analog.low, analog.high);
            player.set_transition_window(channel, analog.transition_window);
        }
    }

    Ok(player)
}

/// Main entry point for the Key Bridge demo binary
///
/// Loads the player configuration, then runs a `tokio::select!` loop that
/// feeds stdin commands to the players until EOF or Ctrl+C. On shutdown
/// every player is reset so no emulated key is left held.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::DEBUG.into()),
        )
        .init();

    info!("Key Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path))?;

    let mut players = config
        .players
        .iter()
        .map(build_player)
        .collect::<error::Result<Vec<_>>>()?;
    info!("Configured {} player(s)", players.len());
    info!("Reading commands from stdin; press Ctrl+C to exit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut command_count: u64 = 0;

    // Main control loop
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) if line.trim().is_empty() => continue,
                    Some(line) => {
                        match parse_command(line.trim()) {
                            Ok((index, command)) => {
                                if let Err(e) = apply_command(&mut players, index, command).await {
                                    warn!("{}", e);
                                } else {
                                    command_count += 1;
                                }
                            }
                            Err(e) => warn!("{}: {}", e, line.trim()),
                        }
                    }
                    None => {
                        info!("stdin closed, shutting down...");
                        break;
                    }
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    // Leave no emulated key held behind.
    for player in &mut players {
        player.reset();
    }
    info!("Processed {} command(s)", command_count);

    Ok(())
}
