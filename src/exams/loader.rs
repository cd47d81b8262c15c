use std::path::Path;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::{GradingError, Result};

/// Student id that marks the end of the exam pile.
pub const SENTINEL_STUDENT_ID: u32 = 9999;

/// What the first line of an exam says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamHeader {
    Student(u32),
    Sentinel,
}

impl ExamHeader {
    pub fn from_student_id(student_id: u32) -> Self {
        if student_id == SENTINEL_STUDENT_ID {
            ExamHeader::Sentinel
        } else {
            ExamHeader::Student(student_id)
        }
    }
}

/// Leading decimal digits of `line`, ignoring surrounding whitespace.
pub fn parse_student_id(line: &str) -> Option<u32> {
    let line = line.trim();
    let end = line
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(line.len());
    line[..end].parse().ok()
}

/// Reads the header of an exam identified by its path.
#[async_trait]
pub trait ExamLoader: std::fmt::Debug + Send + Sync {
    async fn load(&self, exam: &Path) -> Result<ExamHeader>;
}

/// Loads exams from disk, reading only the first line.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsExamLoader;

#[async_trait]
impl ExamLoader for FsExamLoader {
    async fn load(&self, exam: &Path) -> Result<ExamHeader> {
        let file = tokio::fs::File::open(exam)
            .await
            .map_err(|e| GradingError::resource(exam, e))?;

        let mut first = String::new();
        let read = BufReader::new(file)
            .read_line(&mut first)
            .await
            .map_err(|e| GradingError::resource(exam, e))?;
        if read == 0 {
            return Err(GradingError::resource(
                exam,
                std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "exam is empty"),
            ));
        }

        parse_student_id(&first)
            .map(ExamHeader::from_student_id)
            .ok_or_else(|| GradingError::InvalidExam {
                path: exam.to_path_buf(),
                line: first.trim_end().to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_student_id_variants() {
        assert_eq!(parse_student_id("1234\n"), Some(1234));
        assert_eq!(parse_student_id("  0042 \r\n"), Some(42));
        assert_eq!(parse_student_id("5678 Jane Doe"), Some(5678));
        assert_eq!(parse_student_id("Jane"), None);
        assert_eq!(parse_student_id(""), None);
    }

    #[test]
    fn sentinel_header() {
        assert_eq!(ExamHeader::from_student_id(9999), ExamHeader::Sentinel);
        assert_eq!(ExamHeader::from_student_id(1234), ExamHeader::Student(1234));
    }

    #[tokio::test]
    async fn fs_loader_reads_first_line_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exam1.txt");
        std::fs::write(&path, "0815\nQ1 answer\nQ2 answer\n").unwrap();

        assert_eq!(
            FsExamLoader.load(&path).await.unwrap(),
            ExamHeader::Student(815)
        );
    }

    #[tokio::test]
    async fn fs_loader_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.txt");
        assert!(matches!(
            FsExamLoader.load(&missing).await,
            Err(GradingError::Resource { .. })
        ));

        let empty = dir.path().join("empty.txt");
        std::fs::write(&empty, "").unwrap();
        assert!(matches!(
            FsExamLoader.load(&empty).await,
            Err(GradingError::Resource { .. })
        ));

        let garbage = dir.path().join("garbage.txt");
        std::fs::write(&garbage, "student\n").unwrap();
        assert!(matches!(
            FsExamLoader.load(&garbage).await,
            Err(GradingError::InvalidExam { .. })
        ));
    }
}
