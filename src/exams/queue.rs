use std::path::{Path, PathBuf};

use crate::error::{GradingError, Result};

/// Number formed by every decimal digit in `name`, in order.
/// `exam12.txt` is 12, names without digits are 0.
pub fn exam_number(name: &str) -> u64 {
    name.chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0u64, |acc, d| acc.saturating_mul(10).saturating_add(d as u64))
}

/// Exams in grading order. Fixed once built, so TAs read it without locking.
#[derive(Debug, Clone, Default)]
pub struct ExamQueue {
    exams: Vec<PathBuf>,
}

impl ExamQueue {
    /// Build a queue from paths that are already in grading order.
    pub fn from_paths<P: Into<PathBuf>>(paths: impl IntoIterator<Item = P>) -> Self {
        Self {
            exams: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Collect every visible `*.txt` file in `dir`, sorted by the number in
    /// its file name.
    pub async fn scan(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| GradingError::resource(dir, e))?;

        let mut named: Vec<(u64, String)> = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| GradingError::resource(dir, e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || !name.contains(".txt") {
                continue;
            }
            named.push((exam_number(&name), name));
        }
        named.sort();

        tracing::info!(dir = %dir.display(), exams = named.len(), "Exam directory scanned");
        Ok(Self {
            exams: named.into_iter().map(|(_, name)| dir.join(name)).collect(),
        })
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.exams.get(index).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.exams.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.exams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exams.is_empty()
    }
}
