//! # Logical Button Module
//!
//! Defines the fixed alphabet of logical buttons a player can hold and the
//! bitmask type used to request transitions for several of them at once.
//!
//! ## Bit Assignments
//!
//! | Button | Bit | Mask |
//! |--------|-----|------|
//! | A      | 0   | 0x01 |
//! | B      | 1   | 0x02 |
//! | Left   | 2   | 0x04 |
//! | Up     | 3   | 0x08 |
//! | Right  | 4   | 0x10 |
//! | Down   | 5   | 0x20 |
//!
//! Bit position `i` always maps to symbol `i` of the player's key layout for
//! the lifetime of the player. Bits outside the valid range are masked off
//! rather than rejected.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::str::FromStr;

/// Number of logical buttons in the alphabet.
pub const NUM_BUTTONS: usize = 6;

/// Mask covering every valid button bit.
pub const VALID_MASK: u8 = (1 << NUM_BUTTONS) - 1;

/// A set of logical buttons, represented as a bitmask.
///
/// # Examples
///
/// ```
/// use key_bridge::player::buttons::ButtonSet;
///
/// let set = ButtonSet::LEFT | ButtonSet::UP;
/// assert!(set.contains(ButtonSet::LEFT));
/// assert!(!set.contains(ButtonSet::DOWN));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonSet(pub u8);

impl ButtonSet {
    /// Empty set.
    pub const EMPTY: ButtonSet = ButtonSet(0);
    /// A button.
    pub const A: ButtonSet = ButtonSet(0x01);
    /// B button.
    pub const B: ButtonSet = ButtonSet(0x02);
    /// A and B together.
    pub const AB: ButtonSet = ButtonSet(0x03);
    /// Left direction.
    pub const LEFT: ButtonSet = ButtonSet(0x04);
    /// Up direction.
    pub const UP: ButtonSet = ButtonSet(0x08);
    /// Left and up diagonal.
    pub const LEFT_UP: ButtonSet = ButtonSet(0x0c);
    /// Right direction.
    pub const RIGHT: ButtonSet = ButtonSet(0x10);
    /// Right and up diagonal.
    pub const RIGHT_UP: ButtonSet = ButtonSet(0x18);
    /// Down direction.
    pub const DOWN: ButtonSet = ButtonSet(0x20);
    /// Right and down diagonal.
    pub const RIGHT_DOWN: ButtonSet = ButtonSet(0x30);
    /// Left and down diagonal.
    pub const LEFT_DOWN: ButtonSet = ButtonSet(0x24);

    /// Returns the set restricted to the valid button range.
    #[must_use]
    pub fn masked(self) -> ButtonSet {
        ButtonSet(self.0 & VALID_MASK)
    }

    /// True when no button bit is set.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every bit of `other` is set in `self`.
    #[must_use]
    pub fn contains(self, other: ButtonSet) -> bool {
        self.0 & other.0 == other.0
    }

    /// Removes the bits of `other` from the set.
    #[must_use]
    pub fn without(self, other: ButtonSet) -> ButtonSet {
        ButtonSet(self.0 & !other.0)
    }

    /// Iterates set bit positions in ascending order.
    ///
    /// Ascending order is a contract: emitted key transitions must be
    /// deterministic for a given mask.
    pub fn bits(self) -> impl Iterator<Item = usize> {
        (0..NUM_BUTTONS).filter(move |i| self.0 & (1 << i) != 0)
    }
}

impl BitOr for ButtonSet {
    type Output = ButtonSet;

    fn bitor(self, rhs: ButtonSet) -> ButtonSet {
        ButtonSet(self.0 | rhs.0)
    }
}

impl BitOrAssign for ButtonSet {
    fn bitor_assign(&mut self, rhs: ButtonSet) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ButtonSet {
    type Output = ButtonSet;

    fn bitand(self, rhs: ButtonSet) -> ButtonSet {
        ButtonSet(self.0 & rhs.0)
    }
}

impl fmt::Display for ButtonSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; NUM_BUTTONS] = ["a", "b", "left", "up", "right", "down"];
        let mut first = true;
        for i in self.masked().bits() {
            if !first {
                write!(f, "+")?;
            }
            write!(f, "{}", NAMES[i])?;
            first = false;
        }
        if first {
            write!(f, "none")?;
        }
        Ok(())
    }
}

impl FromStr for ButtonSet {
    type Err = String;

    /// Parses `+`-separated button names, e.g. `"left+up"` or `"a"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut set = ButtonSet::EMPTY;
        for name in s.split('+') {
            set |= match name.trim().to_ascii_lowercase().as_str() {
                "a" => ButtonSet::A,
                "b" => ButtonSet::B,
                "left" => ButtonSet::LEFT,
                "up" => ButtonSet::UP,
                "right" => ButtonSet::RIGHT,
                "down" => ButtonSet::DOWN,
                other => return Err(format!("unknown button '{}'", other)),
            };
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Constant Tests ====================

    #[test]
    fn test_bit_assignments() {
        assert_eq!(ButtonSet::A.0, 0x01);
        assert_eq!(ButtonSet::B.0, 0x02);
        assert_eq!(ButtonSet::LEFT.0, 0x04);
        assert_eq!(ButtonSet::UP.0, 0x08);
        assert_eq!(ButtonSet::RIGHT.0, 0x10);
        assert_eq!(ButtonSet::DOWN.0, 0x20);
    }

    #[test]
    fn test_combined_aliases() {
        assert_eq!(ButtonSet::AB, ButtonSet::A | ButtonSet::B);
        assert_eq!(ButtonSet::LEFT_UP, ButtonSet::LEFT | ButtonSet::UP);
        assert_eq!(ButtonSet::RIGHT_UP, ButtonSet::RIGHT | ButtonSet::UP);
        assert_eq!(ButtonSet::RIGHT_DOWN, ButtonSet::RIGHT | ButtonSet::DOWN);
        assert_eq!(ButtonSet::LEFT_DOWN, ButtonSet::LEFT | ButtonSet::DOWN);
    }

    #[test]
    fn test_valid_mask_covers_all_buttons() {
        assert_eq!(VALID_MASK, 0x3f);
        assert_eq!(NUM_BUTTONS, 6);
    }

    // ==================== Set Operation Tests ====================

    #[test]
    fn test_masked_clears_out_of_range_bits() {
        let set = ButtonSet(0xff);
        assert_eq!(set.masked(), ButtonSet(VALID_MASK));
    }

    #[test]
    fn test_contains() {
        let set = ButtonSet::LEFT | ButtonSet::UP;
        assert!(set.contains(ButtonSet::LEFT));
        assert!(set.contains(ButtonSet::LEFT_UP));
        assert!(!set.contains(ButtonSet::RIGHT));
        assert!(!set.contains(ButtonSet::LEFT | ButtonSet::RIGHT));
    }

    #[test]
    fn test_without() {
        let set = ButtonSet::LEFT | ButtonSet::RIGHT | ButtonSet::A;
        assert_eq!(
            set.without(ButtonSet::LEFT | ButtonSet::RIGHT),
            ButtonSet::A
        );
    }

    #[test]
    fn test_is_empty() {
        assert!(ButtonSet::EMPTY.is_empty());
        assert!(!ButtonSet::A.is_empty());
    }

    #[test]
    fn test_bits_ascending_order() {
        let set = ButtonSet::DOWN | ButtonSet::A | ButtonSet::LEFT;
        let positions: Vec<usize> = set.bits().collect();
        assert_eq!(positions, vec![0, 2, 5]);
    }

    // ==================== Parsing and Display Tests ====================

    #[test]
    fn test_parse_single_button() {
        assert_eq!("a".parse::<ButtonSet>().unwrap(), ButtonSet::A);
        assert_eq!("down".parse::<ButtonSet>().unwrap(), ButtonSet::DOWN);
    }

    #[test]
    fn test_parse_combined_buttons() {
        assert_eq!(
            "left+up".parse::<ButtonSet>().unwrap(),
            ButtonSet::LEFT_UP
        );
        assert_eq!("a+b".parse::<ButtonSet>().unwrap(), ButtonSet::AB);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Right".parse::<ButtonSet>().unwrap(), ButtonSet::RIGHT);
    }

    #[test]
    fn test_parse_unknown_button_fails() {
        assert!("start".parse::<ButtonSet>().is_err());
        assert!("a+turbo".parse::<ButtonSet>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!((ButtonSet::LEFT | ButtonSet::UP).to_string(), "left+up");
        assert_eq!(ButtonSet::EMPTY.to_string(), "none");
    }
}
