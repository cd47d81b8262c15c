pub mod config;
pub mod error;
pub mod exams;
pub mod grading;
pub mod session;
pub mod shutdown;
pub mod ta;
