//! Coordination layer shared by every TA.
//!
//! - [`RubricGuard`]: rubric lines, revised under a write lock and written
//!   through to the rubric document
//! - [`QuestionClaimTable`]: per-question claim state for the current exam
//! - [`ExamTransitionCoordinator`]: single-advancer move to the next exam
//! - [`SharedGradingState`]: the handle tying them together
//!
//! The three locks are never taken in the reverse order of
//! cursor -> claim table, and the rubric lock never nests with either.

pub mod claims;
pub mod rubric;
pub mod state;
pub mod transition;

pub use claims::{ClaimState, QuestionClaimTable};
pub use rubric::{next_grade, RevisionOutcome, RubricGuard, EMPTY_LINE};
pub use state::{SharedGradingState, TerminationFlag};
pub use transition::{AdvanceOutcome, CurrentExam, ExamTransitionCoordinator};
