use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::GradingConfig;
use crate::error::Result;
use crate::exams::{ExamLoader, ExamQueue, FsExamLoader};
use crate::grading::claims::{ClaimState, QuestionClaimTable};
use crate::grading::rubric::{RevisionOutcome, RubricGuard};
use crate::grading::transition::{AdvanceOutcome, CurrentExam, ExamTransitionCoordinator};

/// Run-wide stop signal. Goes from unset to set exactly once and never back.
#[derive(Debug, Clone, Default)]
pub struct TerminationFlag {
    token: CancellationToken,
}

impl TerminationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.token.cancel();
    }

    pub fn is_set(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the flag is set.
    pub async fn wait(&self) {
        self.token.cancelled().await;
    }

    /// Sleep for `duration` unless the flag is set first.
    /// Returns `true` if the sleep was cut short.
    pub async fn pause(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            tokio::task::yield_now().await;
            return self.is_set();
        }
        tokio::select! {
            _ = self.token.cancelled() => true,
            _ = tokio::time::sleep(duration) => false,
        }
    }
}

/// Everything the TAs share, handed to each of them at spawn time.
///
/// Three independent locks guard disjoint pieces: rubric lines, the current
/// exam's claim table, and the exam cursor. The exam queue is read-only and
/// the termination flag is lock-free.
#[derive(Debug)]
pub struct SharedGradingState {
    queue: ExamQueue,
    rubric: RubricGuard,
    claims: Mutex<QuestionClaimTable>,
    transition: ExamTransitionCoordinator,
    termination: TerminationFlag,
}

impl SharedGradingState {
    pub fn new(
        rubric: RubricGuard,
        queue: ExamQueue,
        questions: usize,
        loader: Arc<dyn ExamLoader>,
    ) -> Self {
        Self {
            queue,
            rubric,
            claims: Mutex::new(QuestionClaimTable::new(questions)),
            transition: ExamTransitionCoordinator::new(loader),
            termination: TerminationFlag::new(),
        }
    }

    /// Load the rubric and scan the exam directory named in `config`.
    pub async fn open(config: &GradingConfig) -> Result<Self> {
        let rubric = RubricGuard::load(&config.rubric_path, config.rubric_lines).await?;
        let queue = ExamQueue::scan(&config.exam_dir).await?;
        Ok(Self::new(
            rubric,
            queue,
            config.rubric_lines,
            Arc::new(FsExamLoader),
        ))
    }

    pub fn queue(&self) -> &ExamQueue {
        &self.queue
    }

    pub fn rubric(&self) -> &RubricGuard {
        &self.rubric
    }

    pub fn termination(&self) -> &TerminationFlag {
        &self.termination
    }

    pub fn is_finished(&self) -> bool {
        self.termination.is_set()
    }

    /// Load the first exam. Call once, before any TA is spawned.
    pub async fn prime(&self) -> Result<AdvanceOutcome> {
        self.transition.prime(&self.queue, &self.termination).await
    }

    pub async fn try_revise_line(&self, index: usize, ta_id: u64) -> Result<RevisionOutcome> {
        self.rubric.try_revise_line(index, ta_id).await
    }

    pub async fn claim_next(&self, ta_id: u64) -> Option<usize> {
        self.claims.lock().await.claim_next(ta_id)
    }

    pub async fn complete(&self, question: usize, ta_id: u64) {
        self.claims.lock().await.complete(question, ta_id);
    }

    /// Hint only; [`try_advance`](Self::try_advance) re-checks under its own lock.
    pub async fn all_completed(&self) -> bool {
        self.claims.lock().await.all_completed()
    }

    pub async fn claim_states(&self) -> Vec<ClaimState> {
        self.claims.lock().await.cells().to_vec()
    }

    pub async fn try_advance(&self, ta_id: u64) -> Result<AdvanceOutcome> {
        self.transition
            .try_advance(ta_id, &self.queue, &self.claims, &self.termination)
            .await
    }

    pub async fn cursor(&self) -> usize {
        self.transition.cursor().await
    }

    pub async fn current_exam(&self) -> Option<CurrentExam> {
        self.transition.current_exam().await
    }

    pub async fn sentinel_reached(&self) -> bool {
        self.transition.sentinel_reached().await
    }
}
