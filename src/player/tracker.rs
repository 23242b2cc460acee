//! # Button State Tracker Module
//!
//! Converts a requested bitmask of "buttons that should be down" into the
//! minimal set of individual key transitions.
//!
//! ## Algorithm
//!
//! 1. Mask the request to the valid button range.
//! 2. When requesting down, clear any opposing pair (Left+Right, Up+Down)
//!    present in the same mask. Analog dead-zone noise can request both
//!    directions at once; the simultaneous combined request is a no-op for
//!    that axis. Sequential requests are NOT cancelled.
//! 3. Emit a Down only for bits not already held, an Up only for bits
//!    currently held, in ascending bit order.
//!
//! The result is idempotent in both directions: overlapping or repeated
//! requests never produce duplicate key events.
//!
//! ## Usage
//!
//! ```
//! use key_bridge::keyboard::TracingKeySink;
//! use key_bridge::player::buttons::ButtonSet;
//! use key_bridge::player::tracker::ButtonTracker;
//!
//! let mut tracker = ButtonTracker::new("qeawds")?;
//! let mut sink = TracingKeySink::new();
//!
//! tracker.set_down(ButtonSet::A, true, &mut sink);  // emits ('q', Down)
//! tracker.set_down(ButtonSet::A, true, &mut sink);  // emits nothing
//! tracker.set_down(ButtonSet::A, false, &mut sink); // emits ('q', Up)
//! # Ok::<(), key_bridge::error::KeyBridgeError>(())
//! ```

use crate::error::{KeyBridgeError, Result};
use crate::keyboard::{KeyEvent, KeySink};

use super::buttons::{ButtonSet, NUM_BUTTONS};

/// Direction pairs that cancel each other when requested down simultaneously.
const OPPOSING_PAIRS: [ButtonSet; 2] = [
    ButtonSet(ButtonSet::LEFT.0 | ButtonSet::RIGHT.0),
    ButtonSet(ButtonSet::UP.0 | ButtonSet::DOWN.0),
];

/// Tracks which logical buttons are currently held and emits de-duplicated
/// key transitions into a [`KeySink`].
///
/// A bit is set in the internal state iff the most recent transition emitted
/// for it was Down with no Up since. The state is mutated only through
/// [`set_down`](ButtonTracker::set_down), [`press`](ButtonTracker::press)
/// and [`reset`](ButtonTracker::reset).
#[derive(Debug, Clone)]
pub struct ButtonTracker {
    /// Key symbol per bit position, fixed for the tracker lifetime.
    keys: [char; NUM_BUTTONS],
    /// Buttons currently held.
    downs: ButtonSet,
}

impl ButtonTracker {
    /// Creates a tracker with one key symbol per bit position.
    ///
    /// # Errors
    ///
    /// Returns [`KeyBridgeError::KeyLayout`] unless `keys` supplies exactly
    /// [`NUM_BUTTONS`] symbols.
    pub fn new(keys: &str) -> Result<Self> {
        let symbols: Vec<char> = keys.chars().collect();
        let count = symbols.len();
        let keys: [char; NUM_BUTTONS] = symbols.try_into().map_err(|_| {
            KeyBridgeError::KeyLayout(format!(
                "expected exactly {} key symbols, got {}",
                NUM_BUTTONS, count
            ))
        })?;

        Ok(Self {
            keys,
            downs: ButtonSet::EMPTY,
        })
    }

    /// Buttons currently held.
    #[must_use]
    pub fn downs(&self) -> ButtonSet {
        self.downs
    }

    /// Key symbol mapped to a bit position.
    #[must_use]
    pub fn key(&self, bit: usize) -> char {
        self.keys[bit]
    }

    /// Bits of `buttons` that are not currently held.
    ///
    /// These are the bits a [`press`](ButtonTracker::press) will freshly pair
    /// with a Down and an Up.
    #[must_use]
    pub fn fresh(&self, buttons: ButtonSet) -> ButtonSet {
        buttons.masked().without(self.downs)
    }

    /// Requests a set of buttons down or up.
    ///
    /// Emits one transition per bit that actually changes state, in ascending
    /// bit order. Bits outside the valid range are masked off; a simultaneous
    /// request for both directions of an opposing pair is dropped for that
    /// pair before any diffing happens.
    pub fn set_down<S: KeySink>(&mut self, buttons: ButtonSet, down: bool, sink: &mut S) {
        let buttons = Self::normalize(buttons, down);
        if buttons.is_empty() {
            return; // nothing to do
        }

        if down {
            let to_press = buttons.without(self.downs);
            for bit in to_press.bits() {
                sink.key(self.keys[bit], KeyEvent::Down);
            }
            self.downs |= buttons;
        } else {
            let to_release = buttons & self.downs;
            for bit in to_release.bits() {
                sink.key(self.keys[bit], KeyEvent::Up);
            }
            self.downs = self.downs.without(buttons);
        }
    }

    /// Presses and releases a set of buttons.
    ///
    /// Routes through [`set_down`](ButtonTracker::set_down), so only bits
    /// that were up beforehand get a fresh Down/Up pair; bits already held
    /// stay held throughout and are never spuriously toggled.
    pub fn press<S: KeySink>(&mut self, buttons: ButtonSet, sink: &mut S) {
        let fresh = self.fresh(buttons);
        self.set_down(buttons, true, sink);
        self.set_down(fresh, false, sink);
    }

    /// Releases every held button, in ascending bit order, and zeroes state.
    pub fn reset<S: KeySink>(&mut self, sink: &mut S) {
        for bit in self.downs.bits() {
            sink.key(self.keys[bit], KeyEvent::Up);
        }
        self.downs = ButtonSet::EMPTY;
    }

    /// Masks the request to the valid range and drops simultaneously
    /// requested opposing pairs on the down path.
    fn normalize(buttons: ButtonSet, down: bool) -> ButtonSet {
        let mut buttons = buttons.masked();
        if down {
            for pair in OPPOSING_PAIRS {
                if buttons.contains(pair) {
                    buttons = buttons.without(pair);
                }
            }
        }
        buttons
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::sink::mocks::RecordingSink;

    fn tracker() -> ButtonTracker {
        ButtonTracker::new("qeawds").unwrap()
    }

    // ==================== Construction Tests ====================

    #[test]
    fn test_new_with_exact_layout() {
        let tracker = tracker();
        assert_eq!(tracker.key(0), 'q');
        assert_eq!(tracker.key(5), 's');
        assert!(tracker.downs().is_empty());
    }

    #[test]
    fn test_new_rejects_short_layout() {
        let err = ButtonTracker::new("qea").unwrap_err();
        match err {
            KeyBridgeError::KeyLayout(msg) => {
                assert!(msg.contains("got 3"));
            }
            other => panic!("expected KeyLayout error, got: {:?}", other),
        }
    }

    #[test]
    fn test_new_rejects_long_layout() {
        assert!(ButtonTracker::new("qeawdsx").is_err());
    }

    // ==================== Idempotence Tests ====================

    #[test]
    fn test_down_is_idempotent() {
        let mut tracker = tracker();
        let mut sink = RecordingSink::new();

        tracker.set_down(ButtonSet::A, true, &mut sink);
        tracker.set_down(ButtonSet::A, true, &mut sink);

        assert_eq!(sink.recorded(), vec![('q', KeyEvent::Down)]);
        assert_eq!(tracker.downs(), ButtonSet::A);
    }

    #[test]
    fn test_up_is_idempotent() {
        let mut tracker = tracker();
        let mut sink = RecordingSink::new();

        tracker.set_down(ButtonSet::A, false, &mut sink);
        assert!(sink.recorded().is_empty());

        tracker.set_down(ButtonSet::A, true, &mut sink);
        tracker.set_down(ButtonSet::A, false, &mut sink);
        tracker.set_down(ButtonSet::A, false, &mut sink);

        assert_eq!(
            sink.recorded(),
            vec![('q', KeyEvent::Down), ('q', KeyEvent::Up)]
        );
    }

    #[test]
    fn test_overlapping_masks_emit_only_new_bits() {
        let mut tracker = tracker();
        let mut sink = RecordingSink::new();

        tracker.set_down(ButtonSet::A, true, &mut sink);
        tracker.set_down(ButtonSet::AB, true, &mut sink);

        // A was already down; only B ('e') gets a Down.
        assert_eq!(
            sink.recorded(),
            vec![('q', KeyEvent::Down), ('e', KeyEvent::Down)]
        );
        assert_eq!(tracker.downs(), ButtonSet::AB);
    }

    // ==================== Ordering Tests ====================

    #[test]
    fn test_emission_is_ascending_bit_order() {
        let mut tracker = tracker();
        let mut sink = RecordingSink::new();

        tracker.set_down(ButtonSet::DOWN | ButtonSet::A | ButtonSet::LEFT, true, &mut sink);

        assert_eq!(
            sink.recorded(),
            vec![
                ('q', KeyEvent::Down), // bit 0: A
                ('a', KeyEvent::Down), // bit 2: Left
                ('s', KeyEvent::Down), // bit 5: Down
            ]
        );
    }

    // ==================== Opposing Pair Tests ====================

    #[test]
    fn test_simultaneous_opposing_request_is_cancelled() {
        let mut tracker = tracker();
        let mut sink = RecordingSink::new();

        tracker.set_down(ButtonSet::LEFT | ButtonSet::RIGHT, true, &mut sink);

        assert!(sink.recorded().is_empty());
        assert!(tracker.downs().is_empty());
    }

    #[test]
    fn test_sequential_opposing_requests_are_not_cancelled() {
        let mut tracker = tracker();
        let mut sink = RecordingSink::new();

        tracker.set_down(ButtonSet::LEFT, true, &mut sink);
        tracker.set_down(ButtonSet::RIGHT, true, &mut sink);

        // Both held: only the simultaneous combined request cancels.
        assert_eq!(
            sink.recorded(),
            vec![('a', KeyEvent::Down), ('w', KeyEvent::Down)]
        );
        assert_eq!(tracker.downs(), ButtonSet::LEFT | ButtonSet::RIGHT);
    }

    #[test]
    fn test_opposing_pair_survives_on_up_path() {
        let mut tracker = tracker();
        let mut sink = RecordingSink::new();

        tracker.set_down(ButtonSet::LEFT, true, &mut sink);
        sink.clear();

        // Releases are not normalized; the combined up mask works.
        tracker.set_down(ButtonSet::LEFT | ButtonSet::RIGHT, false, &mut sink);
        assert_eq!(sink.recorded(), vec![('a', KeyEvent::Up)]);
        assert!(tracker.downs().is_empty());
    }

    #[test]
    fn test_up_down_pair_cancelled_independently_of_left_right() {
        let mut tracker = tracker();
        let mut sink = RecordingSink::new();

        tracker.set_down(
            ButtonSet::UP | ButtonSet::DOWN | ButtonSet::A,
            true,
            &mut sink,
        );

        // The vertical pair cancels; A still goes down.
        assert_eq!(sink.recorded(), vec![('q', KeyEvent::Down)]);
        assert_eq!(tracker.downs(), ButtonSet::A);
    }

    // ==================== Invalid Input Tests ====================

    #[test]
    fn test_out_of_range_bits_are_masked_off() {
        let mut tracker = tracker();
        let mut sink = RecordingSink::new();

        tracker.set_down(ButtonSet(0xc0), true, &mut sink);
        assert!(sink.recorded().is_empty());
        assert!(tracker.downs().is_empty());

        tracker.set_down(ButtonSet(0x41), true, &mut sink);
        assert_eq!(sink.recorded(), vec![('q', KeyEvent::Down)]);
        assert_eq!(tracker.downs(), ButtonSet::A);
    }

    #[test]
    fn test_empty_mask_has_no_effect() {
        let mut tracker = tracker();
        let mut sink = RecordingSink::new();

        tracker.set_down(ButtonSet::EMPTY, true, &mut sink);
        tracker.set_down(ButtonSet::EMPTY, false, &mut sink);
        assert!(sink.recorded().is_empty());
    }

    // ==================== Press Tests ====================

    #[test]
    fn test_press_emits_down_up_pair() {
        let mut tracker = tracker();
        let mut sink = RecordingSink::new();

        tracker.press(ButtonSet::A, &mut sink);

        assert_eq!(
            sink.recorded(),
            vec![('q', KeyEvent::Down), ('q', KeyEvent::Up)]
        );
        assert!(tracker.downs().is_empty());
    }

    #[test]
    fn test_press_leaves_already_held_bits_down() {
        // Regression test pinning the state-honoring press semantics: a bit
        // held before the press is not toggled by it.
        let mut tracker = tracker();
        let mut sink = RecordingSink::new();

        tracker.set_down(ButtonSet::A, true, &mut sink);
        sink.clear();

        tracker.press(ButtonSet::AB, &mut sink);

        // Only B gets a fresh Down/Up pair; A stays held.
        assert_eq!(
            sink.recorded(),
            vec![('e', KeyEvent::Down), ('e', KeyEvent::Up)]
        );
        assert_eq!(tracker.downs(), ButtonSet::A);
    }

    #[test]
    fn test_press_of_opposing_pair_is_a_no_op() {
        let mut tracker = tracker();
        let mut sink = RecordingSink::new();

        tracker.press(ButtonSet::LEFT | ButtonSet::RIGHT, &mut sink);
        assert!(sink.recorded().is_empty());
        assert!(tracker.downs().is_empty());
    }

    // ==================== Balance and Reset Tests ====================

    #[test]
    fn test_downs_and_ups_balance() {
        let mut tracker = tracker();
        let mut sink = RecordingSink::new();

        tracker.set_down(ButtonSet::A | ButtonSet::LEFT, true, &mut sink);
        tracker.set_down(ButtonSet::AB, true, &mut sink);
        tracker.set_down(ButtonSet::LEFT, false, &mut sink);
        tracker.press(ButtonSet::A | ButtonSet::UP, &mut sink);
        tracker.reset(&mut sink);

        // Every symbol sees as many Downs as Ups once state is back to zero.
        let events = sink.recorded();
        for symbol in ['q', 'e', 'a', 'w', 'd', 's'] {
            let downs = events
                .iter()
                .filter(|&&(c, e)| c == symbol && e == KeyEvent::Down)
                .count();
            let ups = events
                .iter()
                .filter(|&&(c, e)| c == symbol && e == KeyEvent::Up)
                .count();
            assert_eq!(downs, ups, "unbalanced transitions for '{}'", symbol);
        }
        assert!(tracker.downs().is_empty());
    }

    #[test]
    fn test_reset_releases_all_held_buttons_in_order() {
        let mut tracker = tracker();
        let mut sink = RecordingSink::new();

        tracker.set_down(ButtonSet::DOWN, true, &mut sink);
        tracker.set_down(ButtonSet::A, true, &mut sink);
        sink.clear();

        tracker.reset(&mut sink);

        assert_eq!(
            sink.recorded(),
            vec![('q', KeyEvent::Up), ('s', KeyEvent::Up)]
        );
        assert!(tracker.downs().is_empty());
    }

    #[test]
    fn test_reset_with_nothing_held_emits_nothing() {
        let mut tracker = tracker();
        let mut sink = RecordingSink::new();

        tracker.reset(&mut sink);
        assert!(sink.recorded().is_empty());
    }
}
