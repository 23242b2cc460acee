//! # Player Module
//!
//! One virtual controller mapped onto a keyboard layout.
//!
//! This module handles:
//! - The logical button alphabet and bitmask type
//! - De-duplicated button state tracking ([`tracker`])
//! - Hysteresis classification of analog channels ([`level`])
//! - Wiring detector transitions to button transitions
//!
//! A [`Player`] owns one [`ButtonTracker`], the key sink it emits into, and
//! up to four lazily created [`LevelDetector`] instances: a horizontal axis,
//! a vertical axis, and two single-ended channels (A/B, e.g. a sound level).
//! Data flows one direction: raw sample, detector classification, tracker
//! diffing, key sink.

pub mod buttons;
pub mod level;
pub mod tracker;

pub use buttons::{ButtonSet, NUM_BUTTONS};
pub use level::{Level, LevelDetector};
pub use tracker::ButtonTracker;

use std::str::FromStr;
use std::time::Duration;

use tracing::trace;

use crate::error::Result;
use crate::keyboard::KeySink;

/// Default low threshold for the bidirectional axis channels.
pub const AXIS_LOW_THRESHOLD: f32 = -250.0;
/// Default high threshold for the bidirectional axis channels.
pub const AXIS_HIGH_THRESHOLD: f32 = 250.0;
/// Default low threshold for the single-ended A/B channels.
pub const SINGLE_ENDED_LOW_THRESHOLD: f32 = 0.0;
/// Default high threshold for the single-ended A/B channels.
pub const SINGLE_ENDED_HIGH_THRESHOLD: f32 = 128.0;
/// Default confirmation window (immediate).
pub const DEFAULT_TRANSITION_WINDOW: u32 = 0;
/// Default pause between the two halves of a press.
pub const DEFAULT_PRESS_PAUSE: Duration = Duration::from_millis(5);

/// Analog input channel of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalogChannel {
    /// Horizontal axis: Low drives Left, High drives Right.
    LeftRight,
    /// Vertical axis: Low drives Down, High drives Up.
    DownUp,
    /// Single-ended channel driving the A button (High vs Neutral only).
    A,
    /// Single-ended channel driving the B button (High vs Neutral only).
    B,
}

impl FromStr for AnalogChannel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lr" | "leftright" => Ok(AnalogChannel::LeftRight),
            "du" | "downup" => Ok(AnalogChannel::DownUp),
            "a" => Ok(AnalogChannel::A),
            "b" => Ok(AnalogChannel::B),
            other => Err(format!("unknown analog channel '{}'", other)),
        }
    }
}

/// A virtual controller emitting key transitions into a [`KeySink`].
///
/// # Thread Safety
///
/// `Player` is not thread-safe. All input must arrive on a single logical
/// thread; wrap the whole player in a mutex if that cannot be guaranteed.
///
/// # Examples
///
/// ```
/// use key_bridge::keyboard::TracingKeySink;
/// use key_bridge::player::{AnalogChannel, ButtonSet, Player, DEFAULT_PRESS_PAUSE};
///
/// let mut player = Player::new("qeawds", DEFAULT_PRESS_PAUSE, TracingKeySink::new())?;
///
/// player.set_down(ButtonSet::A, true);
/// player.set_analog(AnalogChannel::LeftRight, 300.0); // Right goes down
/// player.reset();
/// # Ok::<(), key_bridge::error::KeyBridgeError>(())
/// ```
#[derive(Debug)]
pub struct Player<S: KeySink> {
    tracker: ButtonTracker,
    sink: S,
    press_pause: Duration,
    hpad: Option<LevelDetector>,
    vpad: Option<LevelDetector>,
    apad: Option<LevelDetector>,
    bpad: Option<LevelDetector>,
}

impl<S: KeySink> Player<S> {
    /// Creates a player with one key symbol per logical button.
    ///
    /// Analog channels materialize on first use; an untouched channel costs
    /// nothing and stays untouched through [`reset`](Player::reset).
    ///
    /// # Errors
    ///
    /// Returns an error unless `keys` supplies exactly
    /// [`NUM_BUTTONS`] symbols.
    pub fn new(keys: &str, press_pause: Duration, sink: S) -> Result<Self> {
        Ok(Self {
            tracker: ButtonTracker::new(keys)?,
            sink,
            press_pause,
            hpad: None,
            vpad: None,
            apad: None,
            bpad: None,
        })
    }

    /// Buttons currently held.
    #[must_use]
    pub fn downs(&self) -> ButtonSet {
        self.tracker.downs()
    }

    /// Whether a channel's detector has been materialized.
    #[must_use]
    pub fn has_detector(&self, channel: AnalogChannel) -> bool {
        self.detector(channel).is_some()
    }

    /// Requests a set of buttons down or up.
    pub fn set_down(&mut self, buttons: ButtonSet, down: bool) {
        self.tracker.set_down(buttons, down, &mut self.sink);
    }

    /// Presses and releases a set of buttons with a cooperative pause
    /// between the two halves.
    ///
    /// The pause is an awaited sleep, never a blocking one, so other input
    /// processing on the same runtime keeps running during it. Bits already
    /// held before the press stay held throughout.
    pub async fn press(&mut self, buttons: ButtonSet) {
        let fresh = self.tracker.fresh(buttons);
        self.tracker.set_down(buttons, true, &mut self.sink);
        tokio::time::sleep(self.press_pause).await;
        self.tracker.set_down(fresh, false, &mut self.sink);
    }

    /// Feeds one analog sample to a channel, materializing its detector on
    /// first use.
    pub fn set_analog(&mut self, channel: AnalogChannel, value: f32) {
        if let Some(level) = self.detector_mut(channel).observe(value) {
            trace!("channel {:?} entered {:?}", channel, level);
            self.route(channel, level);
        }
    }

    /// Replaces a channel's thresholds, materializing its detector on first
    /// use. Any confirmation in flight on the channel is discarded.
    pub fn set_analog_threshold(&mut self, channel: AnalogChannel, low: f32, high: f32) {
        self.detector_mut(channel).set_thresholds(low, high);
    }

    /// Replaces a channel's confirmation window, materializing its detector
    /// on first use.
    pub fn set_transition_window(&mut self, channel: AnalogChannel, samples: u32) {
        self.detector_mut(channel).set_transition_window(samples);
    }

    /// Releases every held button and silently re-neutralizes every
    /// materialized detector, so stale analog state cannot resurrect a
    /// button on the next sample. Channels never used stay unmaterialized.
    pub fn reset(&mut self) {
        self.tracker.reset(&mut self.sink);

        for detector in [&mut self.hpad, &mut self.vpad, &mut self.apad, &mut self.bpad]
            .into_iter()
            .flatten()
        {
            detector.reset();
        }
    }

    /// Translates a detector state entry into tracker transitions.
    fn route(&mut self, channel: AnalogChannel, level: Level) {
        match (channel, level) {
            (AnalogChannel::LeftRight, Level::High) => {
                self.tracker.set_down(ButtonSet::RIGHT, true, &mut self.sink);
            }
            (AnalogChannel::LeftRight, Level::Low) => {
                self.tracker.set_down(ButtonSet::LEFT, true, &mut self.sink);
            }
            (AnalogChannel::LeftRight, Level::Neutral) => {
                self.tracker
                    .set_down(ButtonSet::LEFT | ButtonSet::RIGHT, false, &mut self.sink);
            }
            (AnalogChannel::DownUp, Level::High) => {
                self.tracker.set_down(ButtonSet::UP, true, &mut self.sink);
            }
            (AnalogChannel::DownUp, Level::Low) => {
                self.tracker.set_down(ButtonSet::DOWN, true, &mut self.sink);
            }
            (AnalogChannel::DownUp, Level::Neutral) => {
                self.tracker
                    .set_down(ButtonSet::UP | ButtonSet::DOWN, false, &mut self.sink);
            }
            (AnalogChannel::A, Level::High) => {
                self.tracker.set_down(ButtonSet::A, true, &mut self.sink);
            }
            (AnalogChannel::A, Level::Neutral) => {
                self.tracker.set_down(ButtonSet::A, false, &mut self.sink);
            }
            (AnalogChannel::B, Level::High) => {
                self.tracker.set_down(ButtonSet::B, true, &mut self.sink);
            }
            (AnalogChannel::B, Level::Neutral) => {
                self.tracker.set_down(ButtonSet::B, false, &mut self.sink);
            }
            // Single-ended channels have no Low region semantics.
            (AnalogChannel::A | AnalogChannel::B, Level::Low) => {}
        }
    }

    fn detector(&self, channel: AnalogChannel) -> &Option<LevelDetector> {
        match channel {
            AnalogChannel::LeftRight => &self.hpad,
            AnalogChannel::DownUp => &self.vpad,
            AnalogChannel::A => &self.apad,
            AnalogChannel::B => &self.bpad,
        }
    }

    fn detector_mut(&mut self, channel: AnalogChannel) -> &mut LevelDetector {
        let slot = match channel {
            AnalogChannel::LeftRight => &mut self.hpad,
            AnalogChannel::DownUp => &mut self.vpad,
            AnalogChannel::A => &mut self.apad,
            AnalogChannel::B => &mut self.bpad,
        };
        slot.get_or_insert_with(|| Self::default_detector(channel))
    }

    fn default_detector(channel: AnalogChannel) -> LevelDetector {
        match channel {
            AnalogChannel::LeftRight | AnalogChannel::DownUp => LevelDetector::new(
                AXIS_LOW_THRESHOLD,
                AXIS_HIGH_THRESHOLD,
                DEFAULT_TRANSITION_WINDOW,
            ),
            AnalogChannel::A | AnalogChannel::B => LevelDetector::new(
                SINGLE_ENDED_LOW_THRESHOLD,
                SINGLE_ENDED_HIGH_THRESHOLD,
                DEFAULT_TRANSITION_WINDOW,
            ),
        }
    }
}
