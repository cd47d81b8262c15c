//! Teaching assistants: the per-grader control loop.
//!
//! Every TA runs the same loop against the shared state:
//!
//! 1. **Revising**: walk the rubric, occasionally bumping a grade letter
//! 2. **Grading**: claim and grade questions until none are left unclaimed
//! 3. **Attempting advance**: try to move everyone to the next exam
//! 4. Sleep one poll interval, then exit if the run is finished
//!
//! There is no coordinator task. Which TA grades which question and which
//! TA advances the exam is decided by whoever gets the lock first.

pub mod pacing;
pub mod worker;

pub use pacing::Pacer;
pub use worker::{TaPhase, TeachingAssistant, WorkerReport};
