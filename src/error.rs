use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GradingError {
    #[error("Cannot access {}: {source}", path.display())]
    Resource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Exam {} does not start with a student id: {line:?}", path.display())]
    InvalidExam { path: PathBuf, line: String },

    #[error("Worker task failed: {0}")]
    WorkerFailed(#[from] tokio::task::JoinError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl GradingError {
    pub fn resource(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Resource {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GradingError>;
