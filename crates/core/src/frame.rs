//! Frame module - the per-frame delivery state machine
//!
//! A frame moves through `None -> One -> Two` and, in the tenth frame only, on to
//! `Three`. Whether a frame is complete depends on its number: frames 1-9 end on a
//! strike or after any second ball, while the tenth owes fill balls after a strike or
//! spare.
//!
//! Every derived query (counts, strike/spare flags, the scoring line) is a pure
//! function of the recorded leaves. The running score is a cache written by
//! [`Scoresheet::update_running_score`](crate::Scoresheet::update_running_score).

use std::fmt;

use arrayvec::ArrayVec;

use crate::error::{ScoresheetError, ScoresheetResult};
use crate::split::is_split;
use crate::types::{Leave, MAX_DELIVERIES, STRIKE_COUNT, TENTH_FRAME};

/// Leaves recorded in a frame, in delivery order
pub type FrameLeaves = ArrayVec<Leave, MAX_DELIVERIES>;

/// How much of a frame has been delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Deliveries {
    #[default]
    None,
    One(Leave),
    Two(Leave, Leave),
    /// Tenth frame only
    Three(Leave, Leave, Leave),
}

impl Deliveries {
    /// Number of balls recorded
    pub fn count(&self) -> usize {
        match self {
            Deliveries::None => 0,
            Deliveries::One(_) => 1,
            Deliveries::Two(..) => 2,
            Deliveries::Three(..) => 3,
        }
    }

    /// Recorded leaves in delivery order
    pub fn leaves(&self) -> FrameLeaves {
        let mut out = FrameLeaves::new();
        match *self {
            Deliveries::None => {}
            Deliveries::One(first) => out.push(first),
            Deliveries::Two(first, second) => {
                out.push(first);
                out.push(second);
            }
            Deliveries::Three(first, second, third) => {
                out.push(first);
                out.push(second);
                out.push(third);
            }
        }
        out
    }
}

/// One of the ten scoring units of a game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    number: u8,
    deliveries: Deliveries,
    running_score: u32,
}

/// Renders a pin count, with a dash for zero
fn count_mark(count: u32) -> String {
    if count == 0 {
        "-".to_string()
    } else {
        count.to_string()
    }
}

impl Frame {
    /// Create an empty frame
    pub fn new(number: u8) -> Self {
        Self::with_deliveries(number, Deliveries::None)
    }

    /// Create a frame with deliveries already recorded
    ///
    /// No sequencing checks are applied; this is meant for fixtures and for
    /// rebuilding a frame from data that was validated elsewhere.
    pub fn with_deliveries(number: u8, deliveries: Deliveries) -> Self {
        Self {
            number,
            deliveries,
            running_score: 0,
        }
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn deliveries(&self) -> Deliveries {
        self.deliveries
    }

    /// Cumulative score through this frame, as of the last rescore
    pub fn running_score(&self) -> u32 {
        self.running_score
    }

    pub(crate) fn set_running_score(&mut self, score: u32) {
        self.running_score = score;
    }

    fn is_tenth(&self) -> bool {
        self.number == TENTH_FRAME
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.deliveries, Deliveries::None)
    }

    /// Recorded leaves in delivery order
    pub fn leaves(&self) -> FrameLeaves {
        self.deliveries.leaves()
    }

    /// Leave after the first ball, if thrown
    pub fn first_leave(&self) -> Option<Leave> {
        match self.deliveries {
            Deliveries::None => None,
            Deliveries::One(first) | Deliveries::Two(first, _) | Deliveries::Three(first, _, _) => {
                Some(first)
            }
        }
    }

    /// Whether the first-ball leave is a split
    pub fn is_split(&self) -> bool {
        self.first_leave().is_some_and(is_split)
    }

    pub fn is_complete(&self) -> bool {
        match self.deliveries {
            Deliveries::None => false,
            Deliveries::One(first) => first.is_empty() && !self.is_tenth(),
            Deliveries::Two(first, second) => {
                !self.is_tenth() || (!first.is_empty() && !second.is_empty())
            }
            Deliveries::Three(..) => true,
        }
    }

    /// 1-based number of the ball this frame expects next, or `None` once complete
    pub fn next_delivery(&self) -> Option<u8> {
        if self.is_complete() {
            return None;
        }
        match self.deliveries {
            Deliveries::None => Some(1),
            Deliveries::One(_) => Some(2),
            Deliveries::Two(..) => Some(3),
            Deliveries::Three(..) => None,
        }
    }

    /// Pins standing in front of the next ball
    ///
    /// In the tenth frame a strike or spare brings a fresh rack.
    pub fn standing(&self) -> Leave {
        match self.deliveries {
            Deliveries::None => Leave::FULL,
            Deliveries::One(first) => {
                if first.is_empty() {
                    Leave::FULL
                } else {
                    first
                }
            }
            Deliveries::Two(_, second) => {
                if second.is_empty() {
                    Leave::FULL
                } else {
                    second
                }
            }
            Deliveries::Three(_, _, third) => third,
        }
    }

    pub fn is_strike(&self) -> bool {
        self.first_leave().is_some_and(|first| first.is_empty())
    }

    /// Second ball cleared what the first left; never true behind a strike
    pub fn is_spare(&self) -> bool {
        match self.deliveries {
            Deliveries::None | Deliveries::One(_) => false,
            Deliveries::Two(first, second) | Deliveries::Three(first, second, _) => {
                !first.is_empty() && second.is_empty()
            }
        }
    }

    /// Two strikes on the first two balls of the tenth, without a third
    pub fn is_double(&self) -> bool {
        if !self.is_tenth() {
            return false;
        }
        match self.deliveries {
            Deliveries::None | Deliveries::One(_) => false,
            Deliveries::Two(first, second) => first.is_empty() && second.is_empty(),
            Deliveries::Three(first, second, third) => {
                first.is_empty() && second.is_empty() && !third.is_empty()
            }
        }
    }

    /// Three strikes in the tenth
    pub fn is_triple(&self) -> bool {
        if !self.is_tenth() {
            return false;
        }
        match self.deliveries {
            Deliveries::None | Deliveries::One(_) | Deliveries::Two(..) => false,
            Deliveries::Three(first, second, third) => {
                first.is_empty() && second.is_empty() && third.is_empty()
            }
        }
    }

    pub fn first_ball_count(&self) -> u32 {
        self.first_leave().map_or(0, |first| first.felled())
    }

    /// Pins felled by the second ball
    ///
    /// After a tenth-frame strike the second ball is thrown at a fresh rack.
    pub fn second_ball_count(&self) -> u32 {
        match self.deliveries {
            Deliveries::None | Deliveries::One(_) => 0,
            Deliveries::Two(first, second) | Deliveries::Three(first, second, _) => {
                if self.is_tenth() && first.is_empty() {
                    second.felled()
                } else {
                    (first.len() - second.len().min(first.len())) as u32
                }
            }
        }
    }

    /// Pins felled over the whole frame, fill balls included
    pub fn total_count(&self) -> u32 {
        match self.deliveries {
            Deliveries::None => 0,
            Deliveries::One(first) => first.felled(),
            Deliveries::Two(first, second) => {
                if self.is_tenth() && first.is_empty() {
                    STRIKE_COUNT + second.felled()
                } else {
                    second.felled()
                }
            }
            Deliveries::Three(first, second, third) => {
                if first.is_empty() && second.is_empty() {
                    2 * STRIKE_COUNT + third.felled()
                } else {
                    STRIKE_COUNT + third.felled()
                }
            }
        }
    }

    /// Human-readable scoring line, e.g. `X`, `7 /`, `8 -`, `X X X`
    pub fn line(&self) -> String {
        match self.deliveries {
            Deliveries::None => String::new(),
            Deliveries::One(_) => {
                if self.is_strike() {
                    "X".to_string()
                } else {
                    count_mark(self.first_ball_count())
                }
            }
            Deliveries::Two(_, second) => {
                if !self.is_strike() || !self.is_tenth() {
                    self.open_or_spare_line()
                } else if second.is_empty() {
                    "X X".to_string()
                } else {
                    format!("X {}", count_mark(second.felled()))
                }
            }
            Deliveries::Three(_, second, third) => {
                if self.is_strike() {
                    if second.is_empty() && third.is_empty() {
                        "X X X".to_string()
                    } else if second.is_empty() {
                        format!("X X {}", count_mark(third.felled()))
                    } else if third.is_empty() {
                        format!("X {} /", count_mark(second.felled()))
                    } else {
                        let fill = (second.len() - third.len().min(second.len())) as u32;
                        format!("X {} {}", count_mark(second.felled()), count_mark(fill))
                    }
                } else if self.is_spare() {
                    let fill = if third.is_empty() {
                        "X".to_string()
                    } else {
                        count_mark(third.felled())
                    };
                    format!("{} / {}", count_mark(self.first_ball_count()), fill)
                } else {
                    // Not reachable through sequenced recording.
                    format!(
                        "{} {}",
                        self.open_or_spare_line(),
                        count_mark(third.felled())
                    )
                }
            }
        }
    }

    fn open_or_spare_line(&self) -> String {
        let first = count_mark(self.first_ball_count());
        if self.is_spare() {
            format!("{} /", first)
        } else {
            format!("{} {}", first, count_mark(self.second_ball_count()))
        }
    }

    /// Record the next ball in sequence.
    ///
    /// Fails with [`ScoresheetError::UnsequencedDelivery`] if the frame is complete or
    /// has no room for another ball.
    pub fn record_delivery(&mut self, leave: Leave) -> ScoresheetResult<()> {
        let unsequenced = ScoresheetError::UnsequencedDelivery { frame: self.number };
        if self.is_complete() {
            return Err(unsequenced);
        }

        self.deliveries = match self.deliveries {
            Deliveries::None => Deliveries::One(leave),
            Deliveries::One(first) => Deliveries::Two(first, leave),
            Deliveries::Two(first, second) if self.is_tenth() => {
                Deliveries::Three(first, second, leave)
            }
            Deliveries::Two(..) | Deliveries::Three(..) => return Err(unsequenced),
        };
        Ok(())
    }

    /// Overwrite ball `slot` (1-3) directly, for edits.
    ///
    /// The slot must make sense for the frame: frames 1-9 take balls 1-2 and no second
    /// ball after a strike; the tenth takes a third ball only behind a strike or spare.
    /// Balls before `slot` must already be recorded. Balls after `slot` are kept when
    /// the edited frame could still have been bowled that way, and dropped otherwise.
    pub fn record_delivery_at(&mut self, slot: u8, leave: Leave) -> ScoresheetResult<()> {
        let invalid = ScoresheetError::InvalidDelivery {
            frame: self.number,
            slot,
        };

        let allowed = if self.is_tenth() {
            (1..=3).contains(&slot) && (slot != 3 || self.is_strike() || self.is_spare())
        } else {
            (1..=2).contains(&slot) && !(slot == 2 && self.is_strike())
        };
        if !allowed {
            return Err(invalid);
        }

        let edited = match (slot, self.deliveries) {
            (1, Deliveries::None) => Deliveries::One(leave),
            (1, Deliveries::One(_)) => Deliveries::One(leave),
            (1, Deliveries::Two(_, second)) => Deliveries::Two(leave, second),
            (1, Deliveries::Three(_, second, third)) => Deliveries::Three(leave, second, third),
            (2, Deliveries::One(first)) | (2, Deliveries::Two(first, _)) => {
                Deliveries::Two(first, leave)
            }
            (2, Deliveries::Three(first, _, third)) => Deliveries::Three(first, leave, third),
            (3, Deliveries::Two(first, second)) | (3, Deliveries::Three(first, second, _)) => {
                Deliveries::Three(first, second, leave)
            }
            _ => return Err(invalid),
        };

        self.deliveries = self.trim_unplayable(edited);
        Ok(())
    }

    /// Drop trailing balls that normal play could not have produced
    fn trim_unplayable(&self, deliveries: Deliveries) -> Deliveries {
        match deliveries {
            Deliveries::Two(first, _) if first.is_empty() && !self.is_tenth() => {
                Deliveries::One(first)
            }
            Deliveries::Three(first, second, _)
                if !(first.is_empty() || second.is_empty()) || !self.is_tenth() =>
            {
                Deliveries::Two(first, second)
            }
            other => other,
        }
    }

    /// Clear the frame, returning the leaves it held.
    pub fn reset(&mut self) -> FrameLeaves {
        let old = std::mem::take(&mut self.deliveries);
        old.leaves()
    }
}

/// Renders as `[#n: <line> = <running score>]`
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[#{}: {} = {}]", self.number, self.line(), self.running_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Pin;

    fn leave(numbers: &[u8]) -> Leave {
        Leave::from_numbers(numbers).unwrap()
    }

    const X: Leave = Leave::EMPTY;

    #[test]
    fn completion_status() {
        assert!(!Frame::new(1).is_complete());
        assert!(Frame::with_deliveries(1, Deliveries::One(X)).is_complete());
        assert!(!Frame::with_deliveries(1, Deliveries::One(leave(&[1]))).is_complete());
        assert!(Frame::with_deliveries(1, Deliveries::Two(leave(&[1]), X)).is_complete());
        assert!(
            Frame::with_deliveries(1, Deliveries::Two(leave(&[1, 2]), leave(&[1]))).is_complete()
        );
        assert!(!Frame::with_deliveries(10, Deliveries::One(X)).is_complete());
        assert!(!Frame::with_deliveries(10, Deliveries::Two(leave(&[1]), X)).is_complete());
        assert!(!Frame::with_deliveries(10, Deliveries::Two(X, leave(&[3]))).is_complete());
        assert!(Frame::with_deliveries(10, Deliveries::Three(X, X, X)).is_complete());
        assert!(
            Frame::with_deliveries(10, Deliveries::Two(leave(&[1]), leave(&[1]))).is_complete()
        );
    }

    #[test]
    fn ball_counts() {
        let frame = Frame::with_deliveries(1, Deliveries::Two(leave(&[1, 2]), X));
        assert_eq!(frame.first_ball_count(), 8);
        assert_eq!(frame.second_ball_count(), 2);
        assert_eq!(frame.total_count(), 10);

        let strike = Frame::with_deliveries(1, Deliveries::One(X));
        assert_eq!(strike.second_ball_count(), 0);
        assert_eq!(strike.total_count(), 10);

        let turkey = Frame::with_deliveries(10, Deliveries::Three(X, X, X));
        assert_eq!(turkey.first_ball_count(), 10);
        assert_eq!(turkey.second_ball_count(), 10);
        assert_eq!(turkey.total_count(), 30);

        let nine_spare_nine = Frame::with_deliveries(10, Deliveries::Three(leave(&[1]), X, leave(&[1])));
        assert_eq!(nine_spare_nine.second_ball_count(), 1);
        assert_eq!(nine_spare_nine.total_count(), 19);

        let strike_spare = Frame::with_deliveries(10, Deliveries::Three(X, leave(&[1]), X));
        assert_eq!(strike_spare.total_count(), 20);

        let double_nine = Frame::with_deliveries(10, Deliveries::Three(X, X, leave(&[1])));
        assert_eq!(double_nine.total_count(), 29);
    }

    #[test]
    fn tenth_frame_strike_then_partial_counts_both_balls() {
        let frame = Frame::with_deliveries(10, Deliveries::Two(X, leave(&[7, 10])));
        assert_eq!(frame.second_ball_count(), 8);
        assert_eq!(frame.total_count(), 18);
    }

    #[test]
    fn strike_spare_double_triple_flags() {
        let turkey = Frame::with_deliveries(10, Deliveries::Three(X, X, X));
        assert!(turkey.is_complete());
        assert!(turkey.is_strike());
        assert!(!turkey.is_spare());
        assert!(!turkey.is_double());
        assert!(turkey.is_triple());
        assert_eq!(turkey.line(), "X X X");

        let double = Frame::with_deliveries(10, Deliveries::Three(X, X, leave(&[2])));
        assert!(double.is_double());
        assert!(!double.is_triple());
        assert!(!double.is_spare());
        assert!(!Frame::with_deliveries(10, Deliveries::Two(X, X)).is_spare());

        let spare = Frame::with_deliveries(4, Deliveries::Two(leave(&[3]), X));
        assert!(spare.is_spare());
        let spare_tenth = Frame::with_deliveries(10, Deliveries::Three(leave(&[3]), X, X));
        assert!(spare_tenth.is_spare());
        assert!(!spare_tenth.is_strike());

        let not_tenth = Frame::with_deliveries(9, Deliveries::Two(X, X));
        assert!(!not_tenth.is_double());

        let strike_then_pins = Frame::with_deliveries(10, Deliveries::Three(X, leave(&[1, 2]), leave(&[1])));
        assert!(strike_then_pins.is_strike());
    }

    #[test]
    fn lines() {
        let cases = [
            (1, Deliveries::None, ""),
            (1, Deliveries::One(X), "X"),
            (1, Deliveries::One(Leave::FULL), "-"),
            (1, Deliveries::One(leave(&[10])), "9"),
            (1, Deliveries::Two(leave(&[10]), X), "9 /"),
            (1, Deliveries::Two(Leave::FULL, X), "- /"),
            (1, Deliveries::Two(leave(&[7, 10]), leave(&[7, 10])), "8 -"),
            (1, Deliveries::Two(leave(&[7, 10]), leave(&[7])), "8 1"),
            (10, Deliveries::Two(X, X), "X X"),
            (10, Deliveries::Two(X, leave(&[4])), "X 9"),
            (10, Deliveries::Three(X, X, X), "X X X"),
            (10, Deliveries::Three(X, leave(&[4]), X), "X 9 /"),
            (10, Deliveries::Three(leave(&[4]), X, X), "9 / X"),
            (10, Deliveries::Three(leave(&[4]), X, leave(&[1, 2])), "9 / 8"),
            (10, Deliveries::Three(X, X, leave(&[7])), "X X 9"),
            (10, Deliveries::Three(X, leave(&[6, 10]), leave(&[10])), "X 8 1"),
        ];
        for (number, deliveries, expected) in cases {
            let frame = Frame::with_deliveries(number, deliveries);
            assert_eq!(frame.line(), expected, "{:?}", deliveries);
        }
    }

    #[test]
    fn record_in_sequence() {
        let mut frame = Frame::new(1);
        frame.record_delivery(leave(&[10])).unwrap();
        assert_eq!(frame.deliveries(), Deliveries::One(leave(&[10])));
        frame.record_delivery(X).unwrap();
        assert_eq!(frame.deliveries(), Deliveries::Two(leave(&[10]), X));
        assert_eq!(
            frame.record_delivery(X),
            Err(ScoresheetError::UnsequencedDelivery { frame: 1 })
        );

        let mut frame = Frame::new(1);
        frame.record_delivery(X).unwrap();
        assert_eq!(
            frame.record_delivery(X),
            Err(ScoresheetError::UnsequencedDelivery { frame: 1 })
        );
        assert_eq!(frame.deliveries(), Deliveries::One(X));
    }

    #[test]
    fn tenth_frame_takes_fill_balls() {
        let mut frame = Frame::new(10);
        for _ in 0..3 {
            frame.record_delivery(X).unwrap();
        }
        assert_eq!(frame.deliveries(), Deliveries::Three(X, X, X));
        assert!(frame.record_delivery(X).is_err());

        let mut frame = Frame::new(10);
        frame.record_delivery(leave(&[10])).unwrap();
        frame.record_delivery(X).unwrap();
        frame.record_delivery(leave(&[10])).unwrap();
        assert_eq!(frame.deliveries(), Deliveries::Three(leave(&[10]), X, leave(&[10])));

        let mut frame = Frame::new(10);
        frame.record_delivery(leave(&[10])).unwrap();
        frame.record_delivery(leave(&[10])).unwrap();
        assert_eq!(
            frame.record_delivery(X),
            Err(ScoresheetError::UnsequencedDelivery { frame: 10 })
        );
    }

    #[test]
    fn next_delivery_and_standing() {
        let mut frame = Frame::new(10);
        assert_eq!(frame.next_delivery(), Some(1));
        assert_eq!(frame.standing(), Leave::FULL);

        frame.record_delivery(X).unwrap();
        assert_eq!(frame.next_delivery(), Some(2));
        assert_eq!(frame.standing(), Leave::FULL);

        frame.record_delivery(leave(&[3, 6])).unwrap();
        assert_eq!(frame.next_delivery(), Some(3));
        assert_eq!(frame.standing(), leave(&[3, 6]));

        frame.record_delivery(leave(&[6])).unwrap();
        assert_eq!(frame.next_delivery(), None);

        let mut open = Frame::new(4);
        open.record_delivery(leave(&[2, 4])).unwrap();
        assert_eq!(open.standing(), leave(&[2, 4]));
        open.record_delivery(leave(&[4])).unwrap();
        assert_eq!(open.next_delivery(), None);
    }

    #[test]
    fn edit_slot_rules() {
        let mut frame = Frame::with_deliveries(3, Deliveries::One(X));
        assert_eq!(
            frame.record_delivery_at(2, X),
            Err(ScoresheetError::InvalidDelivery { frame: 3, slot: 2 })
        );
        assert!(frame.record_delivery_at(3, X).is_err());
        assert!(frame.record_delivery_at(0, X).is_err());

        let mut empty = Frame::new(3);
        assert!(empty.record_delivery_at(2, X).is_err());
        assert!(empty.is_empty());

        let mut open_tenth = Frame::with_deliveries(10, Deliveries::Two(leave(&[1]), leave(&[1])));
        assert!(open_tenth.record_delivery_at(3, X).is_err());
        assert!(open_tenth.record_delivery_at(4, X).is_err());

        let mut spare_tenth = Frame::with_deliveries(10, Deliveries::Two(leave(&[1]), X));
        spare_tenth.record_delivery_at(3, leave(&[5])).unwrap();
        assert_eq!(spare_tenth.deliveries(), Deliveries::Three(leave(&[1]), X, leave(&[5])));
    }

    #[test]
    fn edit_keeps_later_balls_when_still_playable() {
        let mut frame = Frame::with_deliveries(2, Deliveries::Two(leave(&[7, 10]), leave(&[10])));
        frame.record_delivery_at(1, leave(&[6, 10])).unwrap();
        assert_eq!(frame.deliveries(), Deliveries::Two(leave(&[6, 10]), leave(&[10])));

        frame.record_delivery_at(2, X).unwrap();
        assert!(frame.is_spare());
    }

    #[test]
    fn edit_drops_later_balls_that_no_longer_fit() {
        let mut frame = Frame::with_deliveries(2, Deliveries::Two(leave(&[7, 10]), leave(&[10])));
        frame.record_delivery_at(1, X).unwrap();
        assert_eq!(frame.deliveries(), Deliveries::One(X));

        let mut tenth = Frame::with_deliveries(10, Deliveries::Three(leave(&[4]), X, X));
        tenth.record_delivery_at(2, leave(&[4])).unwrap();
        assert_eq!(tenth.deliveries(), Deliveries::Two(leave(&[4]), leave(&[4])));
        assert!(tenth.is_complete());
    }

    #[test]
    fn reset_returns_previous_leaves() {
        let mut frame = Frame::with_deliveries(10, Deliveries::Three(X, leave(&[2]), X));
        let leaves = frame.reset();
        assert_eq!(leaves.as_slice(), &[X, leave(&[2]), X]);
        assert!(frame.is_empty());
        assert!(frame.reset().is_empty());
    }

    #[test]
    fn split_uses_first_leave() {
        let frame = Frame::with_deliveries(5, Deliveries::Two(leave(&[7, 10]), leave(&[7])));
        assert!(frame.is_split());
        assert!(!Frame::new(5).is_split());
        assert!(!Frame::with_deliveries(5, Deliveries::One(Leave::from([Pin::Ten]))).is_split());
    }

    #[test]
    fn display() {
        let frame = Frame::with_deliveries(7, Deliveries::Two(leave(&[10]), leave(&[10])));
        assert_eq!(frame.to_string(), "[#7: 9 - = 0]");
    }
}
