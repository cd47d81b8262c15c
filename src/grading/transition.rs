use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::exams::{ExamHeader, ExamLoader, ExamQueue};
use crate::grading::claims::QuestionClaimTable;
use crate::grading::state::TerminationFlag;

/// The exam whose questions are currently being claimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentExam {
    /// Position in the exam queue
    pub index: usize,
    pub student_id: u32,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AdvanceOutcome {
    /// This TA moved the cursor and loaded the next exam.
    Advanced(CurrentExam),
    /// Questions are still outstanding, or someone else already advanced.
    NotReady,
    /// The queue is exhausted or the sentinel exam was reached.
    Finished,
}

#[derive(Debug, Default)]
struct Cursor {
    index: usize,
    current: Option<CurrentExam>,
    sentinel_reached: bool,
}

/// Elects exactly one TA to move past a finished exam.
///
/// Completion is re-checked under the cursor lock, so the TA that wins the
/// lock and sees every question completed is the only one that can advance.
/// Anyone arriving later finds the new exam's freshly reset table and gets
/// [`AdvanceOutcome::NotReady`].
///
/// Lock order is cursor, then claim table. The claim table lock is never held
/// while waiting for the cursor.
#[derive(Debug)]
pub struct ExamTransitionCoordinator {
    cursor: Mutex<Cursor>,
    loader: Arc<dyn ExamLoader>,
}

impl ExamTransitionCoordinator {
    pub fn new(loader: Arc<dyn ExamLoader>) -> Self {
        Self {
            cursor: Mutex::new(Cursor::default()),
            loader,
        }
    }

    /// Load the first exam before any TA starts.
    pub async fn prime(
        &self,
        queue: &ExamQueue,
        termination: &TerminationFlag,
    ) -> Result<AdvanceOutcome> {
        let mut cursor = self.cursor.lock().await;
        if queue.is_empty() {
            tracing::info!("Exam queue is empty, nothing to grade");
            termination.set();
            return Ok(AdvanceOutcome::Finished);
        }
        self.load_at(&mut cursor, 0, queue, termination).await
    }

    pub async fn try_advance(
        &self,
        ta_id: u64,
        queue: &ExamQueue,
        claims: &Mutex<QuestionClaimTable>,
        termination: &TerminationFlag,
    ) -> Result<AdvanceOutcome> {
        let mut cursor = self.cursor.lock().await;

        if termination.is_set() {
            return Ok(AdvanceOutcome::Finished);
        }
        if !claims.lock().await.all_completed() {
            tracing::debug!(ta_id, exam_index = cursor.index, "Exam not ready to advance");
            return Ok(AdvanceOutcome::NotReady);
        }

        let next = cursor.index + 1;
        if next >= queue.len() {
            cursor.index = queue.len();
            cursor.current = None;
            tracing::info!(ta_id, exams = queue.len(), "All exams graded");
            termination.set();
            return Ok(AdvanceOutcome::Finished);
        }

        let outcome = self.load_at(&mut cursor, next, queue, termination).await?;
        if matches!(outcome, AdvanceOutcome::Advanced(_)) {
            // Every cell is completed, so no TA can touch the table until
            // the reset below hands out fresh questions.
            claims.lock().await.reset();
            tracing::debug!(ta_id, exam_index = next, "Advanced exam cursor");
        }
        Ok(outcome)
    }

    /// Read the header of exam `index` and move the cursor there. A failed
    /// read leaves the cursor and current exam untouched. A sentinel ends
    /// the run and leaves the claim table as it was.
    async fn load_at(
        &self,
        cursor: &mut Cursor,
        index: usize,
        queue: &ExamQueue,
        termination: &TerminationFlag,
    ) -> Result<AdvanceOutcome> {
        let Some(path) = queue.get(index) else {
            cursor.index = queue.len();
            termination.set();
            return Ok(AdvanceOutcome::Finished);
        };

        let header = self.loader.load(path).await?;
        cursor.index = index;
        match header {
            ExamHeader::Sentinel => {
                tracing::info!(exam_index = index, path = %path.display(), "Sentinel exam reached, stopping");
                cursor.current = None;
                cursor.sentinel_reached = true;
                termination.set();
                Ok(AdvanceOutcome::Finished)
            }
            ExamHeader::Student(student_id) => {
                let exam = CurrentExam {
                    index,
                    student_id,
                    path: path.to_path_buf(),
                };
                tracing::info!(
                    exam = index + 1,
                    path = %path.display(),
                    student_id,
                    "Loaded exam"
                );
                cursor.current = Some(exam.clone());
                Ok(AdvanceOutcome::Advanced(exam))
            }
        }
    }

    pub async fn cursor(&self) -> usize {
        self.cursor.lock().await.index
    }

    pub async fn current_exam(&self) -> Option<CurrentExam> {
        self.cursor.lock().await.current.clone()
    }

    pub async fn sentinel_reached(&self) -> bool {
        self.cursor.lock().await.sentinel_reached
    }
}
