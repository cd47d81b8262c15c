pub mod loader;
pub mod queue;

pub use loader::{ExamHeader, ExamLoader, FsExamLoader, SENTINEL_STUDENT_ID};
pub use queue::ExamQueue;
