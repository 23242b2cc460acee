//! # Level Detector Module
//!
//! Converts a continuous scalar signal into a ternary discrete state using
//! hysteresis thresholds and an optional confirmation window.
//!
//! ## Classification
//!
//! | Region  | Condition                       |
//! |---------|---------------------------------|
//! | High    | `sample >= high` threshold      |
//! | Low     | `sample <= low` threshold       |
//! | Neutral | strictly between the thresholds |
//!
//! Boundaries are inclusive on the extreme side. A threshold pair supplied in
//! the wrong order is normalized by swapping, so the Low region is always
//! defined by the smaller bound and the High region by the larger one.
//!
//! ## Confirmation Window
//!
//! With `transition_window = N`, a state change is accepted only after the
//! first out-of-state sample has been confirmed by `N` further consecutive
//! samples classifying the same. `0` accepts changes immediately. Samples
//! returning to the current state, or flipping to a different candidate
//! region, restart the confirmation from scratch.
//!
//! ## Usage
//!
//! ```
//! use key_bridge::player::level::{Level, LevelDetector};
//!
//! let mut detector = LevelDetector::new(-250.0, 250.0, 0);
//!
//! assert_eq!(detector.observe(0.0), None); // already Neutral
//! assert_eq!(detector.observe(300.0), Some(Level::High));
//! assert_eq!(detector.observe(300.0), None); // no repeat
//! ```

/// Discrete state of an analog signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    /// At or below the low threshold.
    Low,
    /// Strictly between the thresholds.
    #[default]
    Neutral,
    /// At or above the high threshold.
    High,
}

/// In-flight state change awaiting confirmation.
#[derive(Debug, Clone, Copy)]
struct Pending {
    candidate: Level,
    confirmations: u32,
}

/// Hysteresis classifier for one analog channel.
///
/// [`LevelDetector::observe`] reports a [`Level`] exactly when the classified
/// state changes; the composing player routes that transition to the button
/// tracker. The detector itself holds no reference back into the player.
#[derive(Debug, Clone)]
pub struct LevelDetector {
    /// Lower bound; samples at or below it are Low.
    low: f32,
    /// Upper bound; samples at or above it are High.
    high: f32,
    /// Confirming samples required after the first out-of-state sample.
    transition_window: u32,
    state: Level,
    pending: Option<Pending>,
}

impl LevelDetector {
    /// Creates a detector in the Neutral state.
    ///
    /// Threshold order does not matter; the pair is normalized so the Low
    /// region sits at the smaller bound.
    #[must_use]
    pub fn new(low: f32, high: f32, transition_window: u32) -> Self {
        let (low, high) = Self::ordered(low, high);
        Self {
            low,
            high,
            transition_window,
            state: Level::Neutral,
            pending: None,
        }
    }

    /// Current discrete state.
    #[must_use]
    pub fn state(&self) -> Level {
        self.state
    }

    /// Configured low threshold (after normalization).
    #[must_use]
    pub fn low_threshold(&self) -> f32 {
        self.low
    }

    /// Configured high threshold (after normalization).
    #[must_use]
    pub fn high_threshold(&self) -> f32 {
        self.high
    }

    /// Replaces both thresholds.
    ///
    /// Discards any confirmation in flight: the pending count would have been
    /// accumulated against the old regions.
    pub fn set_thresholds(&mut self, low: f32, high: f32) {
        let (low, high) = Self::ordered(low, high);
        self.low = low;
        self.high = high;
        self.pending = None;
    }

    /// Replaces the confirmation window.
    pub fn set_transition_window(&mut self, transition_window: u32) {
        self.transition_window = transition_window;
    }

    /// Classifies one sample.
    ///
    /// Returns `Some(level)` exactly when the detector enters a new state,
    /// `None` for every sample that confirms or keeps the current one. Any
    /// finite value is accepted and classified, never rejected.
    pub fn observe(&mut self, sample: f32) -> Option<Level> {
        let classified = self.classify(sample);

        if classified == self.state {
            self.pending = None;
            return None;
        }

        let confirmations = match self.pending {
            Some(p) if p.candidate == classified => p.confirmations + 1,
            _ => 1,
        };

        if confirmations > self.transition_window {
            self.pending = None;
            self.state = classified;
            Some(classified)
        } else {
            self.pending = Some(Pending {
                candidate: classified,
                confirmations,
            });
            None
        }
    }

    /// Forces the detector back to Neutral without reporting a transition.
    ///
    /// Callers must independently release any buttons the detector drove
    /// down; the owning player does exactly that in its own `reset`.
    pub fn reset(&mut self) {
        self.state = Level::Neutral;
        self.pending = None;
    }

    fn classify(&self, sample: f32) -> Level {
        if sample >= self.high {
            Level::High
        } else if sample <= self.low {
            Level::Low
        } else {
            Level::Neutral
        }
    }

    fn ordered(low: f32, high: f32) -> (f32, f32) {
        if low > high {
            (high, low)
        } else {
            (low, high)
        }
    }
}
