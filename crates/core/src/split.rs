//! Split module - USBC Rule 2h split classification
//!
//! A split is a setup of pins left standing after the first delivery, provided the
//! headpin is down and at least one pin is down between or immediately ahead of two
//! or more standing pins.
//!
//! The classifier is a fixed rule table rather than a geometric derivation. Rules are
//! evaluated in order and the first match wins:
//!
//! 1. One pin or fewer standing: not a split
//! 2. Headpin standing: not a split
//! 3. Two adjacent pins standing with the pin directly ahead of them down: split
//! 4. Any pin standing with all of its neighbors down: split
//! 5. The big-four family (4-6, 7-9, 8-10 with the middle pin down): split
//! 6. Anything else: not a split

use crate::types::{Leave, Pin};

/// Adjacent pairs and the pin directly ahead of each pair.
///
/// The 2-3 pair sits behind the headpin, which rule 2 has already required to be down.
const ADJACENT_PAIRS: [(Pin, Pin, Option<Pin>); 6] = [
    (Pin::Two, Pin::Three, None),
    (Pin::Four, Pin::Five, Some(Pin::Two)),
    (Pin::Five, Pin::Six, Some(Pin::Three)),
    (Pin::Seven, Pin::Eight, Some(Pin::Four)),
    (Pin::Eight, Pin::Nine, Some(Pin::Five)),
    (Pin::Nine, Pin::Ten, Some(Pin::Six)),
];

/// Neighbor table used for the "out by itself" rule.
const NEIGHBORS: [(Pin, &[Pin]); 9] = [
    (Pin::Two, &[Pin::Four, Pin::Five, Pin::Eight]),
    (Pin::Three, &[Pin::Five, Pin::Six, Pin::Nine]),
    (Pin::Four, &[Pin::Two, Pin::Seven, Pin::Eight]),
    (Pin::Five, &[Pin::Two, Pin::Three, Pin::Eight, Pin::Nine]),
    (Pin::Six, &[Pin::Three, Pin::Nine, Pin::Ten]),
    (Pin::Seven, &[Pin::Four, Pin::Eight]),
    (Pin::Eight, &[Pin::Two, Pin::Four, Pin::Five]),
    (Pin::Nine, &[Pin::Three, Pin::Five, Pin::Six]),
    (Pin::Ten, &[Pin::Six, Pin::Nine]),
];

/// Wide configurations: (outer, outer, middle pin that must be down)
const WIDE_SETUPS: [(Pin, Pin, Pin); 3] = [
    (Pin::Four, Pin::Six, Pin::Five),
    (Pin::Seven, Pin::Nine, Pin::Eight),
    (Pin::Eight, Pin::Ten, Pin::Nine),
];

/// Classify a first-ball leave as a split.
///
/// # Examples
///
/// ```
/// use tenpin_core::is_split;
/// use tenpin_types::Leave;
///
/// assert!(is_split(Leave::from_str("7-10").unwrap()));
/// assert!(!is_split(Leave::from_str("1-2-4-10").unwrap())); // washout, headpin up
/// assert!(!is_split(Leave::from_str("10").unwrap()));
/// ```
pub fn is_split(leave: Leave) -> bool {
    if leave.len() <= 1 || leave.contains(Pin::One) {
        return false;
    }

    let adjacent = ADJACENT_PAIRS.iter().any(|&(a, b, ahead)| {
        leave.contains(a) && leave.contains(b) && ahead.map_or(true, |p| !leave.contains(p))
    });
    if adjacent {
        return true;
    }

    let isolated = NEIGHBORS
        .iter()
        .any(|&(pin, neighbors)| leave.contains(pin) && !leave.contains_any(neighbors));
    if isolated {
        return true;
    }

    WIDE_SETUPS
        .iter()
        .any(|&(a, b, middle)| leave.contains(a) && leave.contains(b) && !leave.contains(middle))
}
