use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::{GradingError, Result};

/// Stand-in for rubric lines missing from the document.
pub const EMPTY_LINE: &str = "EMPTY";

/// Result of a single revision attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RevisionOutcome {
    Revised { line: usize, old: char, new: char },
    /// No grade letter to revise (no comma, comma last, or no such line).
    Malformed,
}

/// The letter that follows `grade` on the rubric: `A..=Y` step forward,
/// everything else wraps to `A`.
pub fn next_grade(grade: char) -> char {
    match grade {
        'A'..='Y' => (grade as u8 + 1) as char,
        _ => 'A',
    }
}

/// Splits `<question>,<grade>...` into the prefix up to and including the
/// comma, the grade letter and whatever follows it.
fn split_grade(line: &str) -> Option<(&str, char, &str)> {
    let comma = line.find(',')?;
    let (prefix, rest) = line.split_at(comma + 1);
    let mut chars = rest.chars();
    let grade = chars.next()?;
    Some((prefix, grade, chars.as_str()))
}

/// Rubric lines shared by every TA.
///
/// Revisions take the write side of the lock and, when the rubric is backed
/// by a document, rewrite the whole document before releasing it. The
/// persisted copy therefore always matches memory once a revision returns.
#[derive(Debug)]
pub struct RubricGuard {
    lines: RwLock<Vec<String>>,
    document: Option<PathBuf>,
}

impl RubricGuard {
    /// Load exactly `line_count` lines from `path`, padding with [`EMPTY_LINE`].
    pub async fn load(path: impl AsRef<Path>, line_count: usize) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GradingError::resource(path, e))?;

        let mut lines: Vec<String> = content
            .lines()
            .take(line_count)
            .map(str::to_string)
            .collect();
        lines.resize(line_count, EMPTY_LINE.to_string());

        tracing::info!(path = %path.display(), lines = line_count, "Rubric loaded");
        Ok(Self {
            lines: RwLock::new(lines),
            document: Some(path.to_path_buf()),
        })
    }

    /// A rubric with no backing document; revisions stay in memory.
    pub fn in_memory<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            lines: RwLock::new(lines.into_iter().map(Into::into).collect()),
            document: None,
        }
    }

    pub fn document(&self) -> Option<&Path> {
        self.document.as_deref()
    }

    /// Current text of line `index`. The value may be revised by another TA
    /// as soon as the read lock is released.
    pub async fn read_line(&self, index: usize) -> Option<String> {
        self.lines.read().await.get(index).cloned()
    }

    pub async fn snapshot(&self) -> Vec<String> {
        self.lines.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.lines.read().await.len()
    }

    /// Advance the grade letter on line `index` and persist the rubric.
    ///
    /// A malformed line is left untouched and nothing is written. A failed
    /// write is a fatal resource error.
    pub async fn try_revise_line(&self, index: usize, ta_id: u64) -> Result<RevisionOutcome> {
        let mut lines = self.lines.write().await;

        let Some(line) = lines.get_mut(index) else {
            return Ok(RevisionOutcome::Malformed);
        };
        let Some((prefix, old, rest)) = split_grade(line) else {
            tracing::warn!(ta_id, line = index + 1, text = %line, "Rubric line has no grade to revise");
            return Ok(RevisionOutcome::Malformed);
        };

        let new = next_grade(old);
        *line = format!("{}{}{}", prefix, new, rest);
        tracing::info!(ta_id, line = index + 1, %old, %new, "Rubric line corrected");

        if let Some(path) = &self.document {
            Self::persist(path, &lines).await?;
        }

        Ok(RevisionOutcome::Revised {
            line: index,
            old,
            new,
        })
    }

    async fn persist(path: &Path, lines: &[String]) -> Result<()> {
        let mut body = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
        for line in lines {
            body.push_str(line);
            body.push('\n');
        }
        tokio::fs::write(path, body)
            .await
            .map_err(|e| GradingError::resource(path, e))
    }
}
