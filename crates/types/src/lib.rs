//! Core types module - pins, leaves and rule constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (scoring core, adapter protocol, replay tooling).
//!
//! # The Rack
//!
//! Pins are numbered the way USBC numbers them, viewed from the foul line:
//!
//! ```text
//!   7   8   9   10
//!     4   5   6
//!       2   3
//!         1
//! ```
//!
//! # Leaves
//!
//! A [`Leave`] is the set of pins still standing after a delivery. The empty leave
//! means every pin went down; [`Leave::FULL`] means none did.
//!
//! # Examples
//!
//! ```
//! use tenpin_types::{Leave, Pin, PIN_COUNT};
//!
//! // Parse a pin from its number
//! let pin = Pin::from_number(7).unwrap();
//! assert_eq!(pin, Pin::Seven);
//!
//! // Build the 7-10 leave
//! let leave = Leave::from_str("7-10").unwrap();
//! assert!(leave.contains(Pin::Seven));
//! assert!(leave.contains(Pin::Ten));
//! assert_eq!(leave.len(), 2);
//!
//! // A full rack holds every pin
//! assert_eq!(Leave::FULL.len(), PIN_COUNT);
//! ```

use std::fmt;

/// Number of pins in a rack
pub const PIN_COUNT: usize = 10;

/// Number of frames in a game
pub const FRAME_COUNT: usize = 10;

/// Number of the last frame, the only one that may take three deliveries
pub const TENTH_FRAME: u8 = 10;

/// Maximum deliveries any frame can hold
pub const MAX_DELIVERIES: usize = 3;

/// Pins felled by a strike (and by a spare, over two balls)
pub const STRIKE_COUNT: u32 = 10;

/// One of the ten pins of a rack.
///
/// Each pin carries a unique power-of-two tag. [`Leave`] stores its members as the
/// bitwise OR of their tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pin {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
}

impl Pin {
    /// All pins in number order
    pub const ALL: [Pin; PIN_COUNT] = [
        Pin::One,
        Pin::Two,
        Pin::Three,
        Pin::Four,
        Pin::Five,
        Pin::Six,
        Pin::Seven,
        Pin::Eight,
        Pin::Nine,
        Pin::Ten,
    ];

    /// Look up a pin by its number (1-10)
    ///
    /// # Examples
    ///
    /// ```
    /// use tenpin_types::Pin;
    ///
    /// assert_eq!(Pin::from_number(1), Some(Pin::One));
    /// assert_eq!(Pin::from_number(10), Some(Pin::Ten));
    /// assert_eq!(Pin::from_number(0), None);
    /// assert_eq!(Pin::from_number(11), None);
    /// ```
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1..=10 => Some(Self::ALL[(number - 1) as usize]),
            _ => None,
        }
    }

    /// The pin's number (1-10)
    pub fn number(&self) -> u8 {
        *self as u8 + 1
    }

    /// The pin's power-of-two tag
    ///
    /// ```
    /// use tenpin_types::Pin;
    ///
    /// assert_eq!(Pin::One.tag(), 0x001);
    /// assert_eq!(Pin::Ten.tag(), 0x200);
    /// ```
    pub fn tag(&self) -> u16 {
        1 << (*self as u16)
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Pins left standing after a delivery
///
/// Stored as a bitset of pin tags, so a leave is `Copy` and set operations are single
/// integer ops. Iteration is always in pin number order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Leave {
    bits: u16,
}

/// Every valid tag bit
const RACK_MASK: u16 = (1 << PIN_COUNT) - 1;

impl Leave {
    /// Every pin down
    pub const EMPTY: Leave = Leave { bits: 0 };

    /// Every pin standing
    pub const FULL: Leave = Leave { bits: RACK_MASK };

    /// Create an empty leave
    pub fn new() -> Self {
        Self::EMPTY
    }

    /// Create a leave from raw tag bits; bits above pin 10 are ignored
    pub fn from_bits(bits: u16) -> Self {
        Self {
            bits: bits & RACK_MASK,
        }
    }

    /// Raw tag bits
    pub fn bits(&self) -> u16 {
        self.bits
    }

    /// Build a leave from pin numbers
    ///
    /// Returns `None` if any number is outside 1-10.
    ///
    /// ```
    /// use tenpin_types::{Leave, Pin};
    ///
    /// let leave = Leave::from_numbers(&[4, 6, 7, 10]).unwrap();
    /// assert_eq!(leave.len(), 4);
    /// assert!(leave.contains(Pin::Four));
    /// assert!(Leave::from_numbers(&[0]).is_none());
    /// ```
    pub fn from_numbers(numbers: &[u8]) -> Option<Self> {
        numbers
            .iter()
            .map(|&n| Pin::from_number(n))
            .collect::<Option<Leave>>()
    }

    /// Parse a leave from text (case-insensitive)
    ///
    /// Accepts `x` / `strike` for the empty leave, `all` / `g` / `gutter` for a full
    /// rack, `-` on its own for the empty leave, or pin numbers separated by spaces,
    /// commas or dashes (`7-10`, `4 6 7 10`).
    ///
    /// ```
    /// use tenpin_types::Leave;
    ///
    /// assert_eq!(Leave::from_str("X"), Some(Leave::EMPTY));
    /// assert_eq!(Leave::from_str("gutter"), Some(Leave::FULL));
    /// assert_eq!(Leave::from_str("7-10"), Leave::from_numbers(&[7, 10]));
    /// assert_eq!(Leave::from_str("2, 4 5"), Leave::from_numbers(&[2, 4, 5]));
    /// assert_eq!(Leave::from_str("11"), None);
    /// assert_eq!(Leave::from_str(""), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "" => return None,
            "x" | "strike" | "-" => return Some(Self::EMPTY),
            "all" | "g" | "gutter" => return Some(Self::FULL),
            _ => {}
        }

        let mut leave = Self::EMPTY;
        for token in s
            .split(|c: char| c.is_whitespace() || c == ',' || c == '-')
            .filter(|t| !t.is_empty())
        {
            let number = token.parse::<u8>().ok()?;
            leave.insert(Pin::from_number(number)?);
        }
        Some(leave)
    }

    /// Number of standing pins
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// True when every pin is down
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Number of pins down, measured against a full rack
    pub fn felled(&self) -> u32 {
        (PIN_COUNT - self.len()) as u32
    }

    pub fn contains(&self, pin: Pin) -> bool {
        self.bits & pin.tag() != 0
    }

    /// True when every pin in `pins` is standing
    pub fn contains_all(&self, pins: &[Pin]) -> bool {
        pins.iter().all(|&p| self.contains(p))
    }

    /// True when any pin in `pins` is standing
    pub fn contains_any(&self, pins: &[Pin]) -> bool {
        pins.iter().any(|&p| self.contains(p))
    }

    /// Add a pin; returns false if it was already standing
    pub fn insert(&mut self, pin: Pin) -> bool {
        let was = self.contains(pin);
        self.bits |= pin.tag();
        !was
    }

    /// Remove a pin; returns false if it was already down
    pub fn remove(&mut self, pin: Pin) -> bool {
        let was = self.contains(pin);
        self.bits &= !pin.tag();
        was
    }

    pub fn union(&self, other: Leave) -> Leave {
        Leave {
            bits: self.bits | other.bits,
        }
    }

    /// Pins standing in `self` but not in `other`
    pub fn difference(&self, other: Leave) -> Leave {
        Leave {
            bits: self.bits & !other.bits,
        }
    }

    pub fn is_subset(&self, other: Leave) -> bool {
        self.bits & !other.bits == 0
    }

    /// Standing pins in number order
    pub fn iter(&self) -> impl Iterator<Item = Pin> + '_ {
        Pin::ALL.into_iter().filter(move |p| self.contains(*p))
    }

    /// Standing pin numbers in ascending order
    pub fn numbers(&self) -> impl Iterator<Item = u8> + '_ {
        self.iter().map(|p| p.number())
    }
}

impl FromIterator<Pin> for Leave {
    fn from_iter<I: IntoIterator<Item = Pin>>(iter: I) -> Self {
        let mut leave = Leave::EMPTY;
        for pin in iter {
            leave.insert(pin);
        }
        leave
    }
}

impl<const N: usize> From<[Pin; N]> for Leave {
    fn from(pins: [Pin; N]) -> Self {
        pins.into_iter().collect()
    }
}

/// Renders as dash-joined pin numbers (`7-10`), or `-` when every pin is down.
impl fmt::Display for Leave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        for (i, pin) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            write!(f, "{}", pin)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_tags_are_distinct_powers_of_two() {
        let mut seen = 0u16;
        for pin in Pin::ALL {
            assert!(pin.tag().is_power_of_two());
            assert_eq!(seen & pin.tag(), 0, "tag of pin {} reused", pin);
            seen |= pin.tag();
        }
        assert_eq!(seen, Leave::FULL.bits());
    }

    #[test]
    fn pin_number_round_trips() {
        for n in 1..=10u8 {
            assert_eq!(Pin::from_number(n).map(|p| p.number()), Some(n));
        }
    }

    #[test]
    fn set_operations() {
        let a = Leave::from([Pin::Two, Pin::Four, Pin::Five]);
        let b = Leave::from([Pin::Four, Pin::Seven]);

        assert_eq!(a.union(b).len(), 4);
        assert_eq!(a.difference(b), Leave::from([Pin::Two, Pin::Five]));
        assert!(Leave::from([Pin::Four]).is_subset(a));
        assert!(!b.is_subset(a));
        assert!(Leave::EMPTY.is_subset(b));
    }

    #[test]
    fn insert_and_remove_report_change() {
        let mut leave = Leave::new();
        assert!(leave.insert(Pin::Ten));
        assert!(!leave.insert(Pin::Ten));
        assert!(leave.remove(Pin::Ten));
        assert!(!leave.remove(Pin::Ten));
        assert!(leave.is_empty());
    }

    #[test]
    fn from_bits_masks_unknown_bits() {
        assert_eq!(Leave::from_bits(0xffff), Leave::FULL);
    }

    #[test]
    fn felled_counts_against_full_rack() {
        assert_eq!(Leave::EMPTY.felled(), 10);
        assert_eq!(Leave::FULL.felled(), 0);
        assert_eq!(Leave::from([Pin::Seven, Pin::Ten]).felled(), 8);
    }

    #[test]
    fn display_joins_numbers() {
        assert_eq!(Leave::from([Pin::Ten, Pin::Seven]).to_string(), "7-10");
        assert_eq!(Leave::EMPTY.to_string(), "-");
        assert_eq!(Leave::from_str(&Leave::FULL.to_string()), Some(Leave::FULL));
    }
}
