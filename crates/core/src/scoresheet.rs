//! Scoresheet module - the ten frames of one game
//!
//! The scoresheet owns the frames and a cursor naming the frame awaiting its next
//! delivery. Recording a delivery is O(1); scores are a separate O(n) pass, so callers
//! must run [`Scoresheet::update_running_score`] after any mutation before reading
//! [`Frame::running_score`] or [`Scoresheet::total_score`].

use std::fmt;

use crate::error::{ScoresheetError, ScoresheetResult};
use crate::frame::{Frame, FrameLeaves};
use crate::types::{Leave, FRAME_COUNT, STRIKE_COUNT, TENTH_FRAME};

/// A scoresheet for one game of American Tenpins (USBC Rule 2)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scoresheet {
    frames: [Frame; FRAME_COUNT],
    total_score: u32,
    current_number: Option<u8>,
}

fn check_frame_number(number: u8) -> ScoresheetResult<u8> {
    if (1..=TENTH_FRAME).contains(&number) {
        Ok(number)
    } else {
        Err(ScoresheetError::InvalidFrame { number })
    }
}

impl Scoresheet {
    /// Create a fresh scoresheet with frame 1 awaiting the first ball
    pub fn new() -> Self {
        Self {
            frames: std::array::from_fn(|i| Frame::new(i as u8 + 1)),
            total_score: 0,
            current_number: Some(1),
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Frame by number (1-10)
    pub fn frame(&self, number: u8) -> Option<&Frame> {
        check_frame_number(number)
            .ok()
            .map(|n| &self.frames[n as usize - 1])
    }

    pub fn current_number(&self) -> Option<u8> {
        self.current_number
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.current_number.and_then(|n| self.frame(n))
    }

    /// Score through the last frame, as of the last rescore
    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    pub fn is_complete(&self) -> bool {
        self.frames.iter().all(Frame::is_complete)
    }

    /// True when every frame before `number` is complete
    pub fn is_frame_selectable(&self, number: u8) -> bool {
        if check_frame_number(number).is_err() {
            return false;
        }
        self.frames[..number as usize - 1]
            .iter()
            .all(Frame::is_complete)
    }

    /// Record the next ball in the current frame.
    ///
    /// Advances the cursor when the frame completes; after the tenth frame the
    /// cursor is cleared.
    pub fn record_delivery(&mut self, leave: Leave) -> ScoresheetResult<()> {
        let number = self.current_number.ok_or(ScoresheetError::GameCompleted)?;
        let frame = &mut self.frames[number as usize - 1];

        frame.record_delivery(leave)?;
        if frame.is_complete() {
            self.current_number = if number < TENTH_FRAME {
                Some(number + 1)
            } else {
                None
            };
        }
        Ok(())
    }

    /// Record a ball that fells none of the pins standing in the current frame
    pub fn record_miss(&mut self) -> ScoresheetResult<()> {
        let standing = self
            .current_frame()
            .map(Frame::standing)
            .ok_or(ScoresheetError::GameCompleted)?;
        self.record_delivery(standing)
    }

    /// Overwrite ball `slot` of frame `number`, for edits.
    ///
    /// Edits never advance the cursor, so an edit that would complete the current
    /// frame is rejected with [`ScoresheetError::InvalidDelivery`]; record the ball
    /// instead. An edit that reopens an earlier frame (or the tenth of a finished game)
    /// moves the cursor back to that frame.
    pub fn record_delivery_at(&mut self, number: u8, slot: u8, leave: Leave) -> ScoresheetResult<()> {
        let number = check_frame_number(number)?;
        let frame = &self.frames[number as usize - 1];
        let was_complete = frame.is_complete();

        let mut edited = frame.clone();
        edited.record_delivery_at(slot, leave)?;
        let is_complete = edited.is_complete();

        let reopened = was_complete && !is_complete;
        match self.current_number {
            Some(current) if current == number && is_complete && !was_complete => {
                return Err(ScoresheetError::InvalidDelivery {
                    frame: number,
                    slot,
                });
            }
            Some(current) if number < current && reopened => self.current_number = Some(number),
            None if reopened => self.current_number = Some(number),
            _ => {}
        }

        self.frames[number as usize - 1] = edited;
        Ok(())
    }

    /// Clear one frame and make it the current frame.
    ///
    /// With no `number` the current frame is reset. Later frames are untouched, so
    /// callers re-entering a sequence must reset them separately.
    pub fn reset_frame(&mut self, number: Option<u8>) -> ScoresheetResult<FrameLeaves> {
        let number = match number {
            Some(n) => n,
            None => self.current_number.ok_or(ScoresheetError::GameCompleted)?,
        };
        let number = check_frame_number(number)?;

        self.current_number = Some(number);
        Ok(self.frames[number as usize - 1].reset())
    }

    /// Clear frames `to_frame` through 10.
    ///
    /// The cursor is not moved.
    pub fn reset_game(&mut self, to_frame: u8) -> ScoresheetResult<()> {
        let to_frame = check_frame_number(to_frame)?;
        for frame in &mut self.frames[to_frame as usize - 1..] {
            frame.reset();
        }
        Ok(())
    }

    /// Recompute every frame's running score and the total.
    ///
    /// Strikes look ahead two frames and spares one, using whatever those frames have
    /// recorded so far. The ninth frame takes its strike bonus from the tenth frame's
    /// first two balls.
    pub fn update_running_score(&mut self) {
        let mut total = 0u32;

        for i in 0..FRAME_COUNT {
            let frame = &self.frames[i];

            let score = match frame.number() {
                1..=8 => {
                    let next = &self.frames[i + 1];
                    if frame.is_strike() {
                        if next.is_strike() {
                            let after = &self.frames[i + 2];
                            if after.is_strike() {
                                3 * STRIKE_COUNT
                            } else {
                                2 * STRIKE_COUNT + after.first_ball_count()
                            }
                        } else {
                            STRIKE_COUNT + next.total_count()
                        }
                    } else if frame.is_spare() {
                        STRIKE_COUNT + next.first_ball_count()
                    } else {
                        frame.total_count()
                    }
                }
                9 => {
                    let tenth = &self.frames[i + 1];
                    if frame.is_strike() {
                        STRIKE_COUNT + tenth.first_ball_count() + tenth.second_ball_count()
                    } else if frame.is_spare() {
                        STRIKE_COUNT + tenth.first_ball_count()
                    } else {
                        frame.total_count()
                    }
                }
                _ => frame.total_count(),
            };

            total += score;
            self.frames[i].set_running_score(total);
        }

        self.total_score = total;
    }
}

impl Default for Scoresheet {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders every frame in order inside brackets
impl fmt::Display for Scoresheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for frame in &self.frames {
            write!(f, "{}", frame)?;
        }
        f.write_str("]")
    }
}
