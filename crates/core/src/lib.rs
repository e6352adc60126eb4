//! Core scoring module - pure, deterministic, and testable
//!
//! This crate contains the scoring rules and game progression for American Tenpins
//! as specified by USBC Playing Rule 2. It has **zero dependencies** on networking,
//! rendering or I/O, and performs no logging:
//!
//! - **Deterministic**: the same deliveries always produce the same sheet
//! - **Atomic**: every command either succeeds or leaves the sheet untouched
//! - **Cheap**: recording a delivery is O(1); rescoring is one pass over ten frames
//!
//! # Module Structure
//!
//! - [`split`]: rule-table split classifier over a first-ball leave
//! - [`frame`]: per-frame delivery state machine and derived counts
//! - [`scoresheet`]: the ten frames, the current-frame cursor and the scoring pass
//! - [`error`]: caller-misuse errors
//!
//! # Scoring Rules
//!
//! - **Strike**: 10 plus the next two balls
//! - **Spare**: 10 plus the next ball
//! - **Open frame**: pins felled
//! - **Tenth frame**: a strike or spare earns fill balls, scored as thrown
//!
//! # Example
//!
//! ```
//! use tenpin_core::Scoresheet;
//! use tenpin_types::Leave;
//!
//! let mut sheet = Scoresheet::new();
//! for _ in 0..12 {
//!     sheet.record_delivery(Leave::EMPTY).unwrap();
//! }
//!
//! // Scores are a cache; refresh them after recording.
//! sheet.update_running_score();
//! assert_eq!(sheet.total_score(), 300);
//! assert!(sheet.is_complete());
//! ```

pub mod error;
pub mod frame;
pub mod scoresheet;
pub mod split;

pub use tenpin_types as types;

// Re-export commonly used types for convenience
pub use error::{ScoresheetError, ScoresheetResult};
pub use frame::{Deliveries, Frame, FrameLeaves};
pub use scoresheet::Scoresheet;
pub use split::is_split;
