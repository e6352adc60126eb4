use thiserror::Error;

/// Caller-misuse errors raised by scoresheet commands.
///
/// None of these are transient; a failed command leaves the scoresheet untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoresheetError {
    #[error("game is complete; no frame is awaiting a delivery")]
    GameCompleted,

    #[error("frame {number} is out of range (1-10)")]
    InvalidFrame { number: u8 },

    #[error("frame {frame} cannot take another delivery")]
    UnsequencedDelivery { frame: u8 },

    #[error("delivery {slot} is not valid for frame {frame} in its current state")]
    InvalidDelivery { frame: u8, slot: u8 },
}

pub type ScoresheetResult<T> = Result<T, ScoresheetError>;
