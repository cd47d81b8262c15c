use std::sync::Arc;

use serde::Serialize;

use crate::config::GradingConfig;
use crate::error::Result;
use crate::grading::{AdvanceOutcome, RevisionOutcome, SharedGradingState};
use crate::ta::pacing::Pacer;

/// Where a TA is within one pass of its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaPhase {
    Revising,
    Grading,
    AttemptingAdvance,
    Exiting,
}

impl std::fmt::Display for TaPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaPhase::Revising => write!(f, "revising"),
            TaPhase::Grading => write!(f, "grading"),
            TaPhase::AttemptingAdvance => write!(f, "attempting-advance"),
            TaPhase::Exiting => write!(f, "exiting"),
        }
    }
}

/// What one TA did over the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    pub ta_id: u64,
    pub questions_graded: u64,
    pub revisions: u64,
    pub malformed_lines: u64,
    pub advances: u64,
    pub passes: u64,
}

/// One grader working through the shared exam pile.
#[derive(Debug)]
pub struct TeachingAssistant {
    id: u64,
    state: Arc<SharedGradingState>,
    config: GradingConfig,
    pacer: Pacer,
    phase: TaPhase,
    report: WorkerReport,
}

impl TeachingAssistant {
    pub fn new(id: u64, state: Arc<SharedGradingState>, config: &GradingConfig) -> Self {
        Self {
            id,
            state,
            pacer: Pacer::new(config.seed, id),
            config: config.clone(),
            phase: TaPhase::Revising,
            report: WorkerReport {
                ta_id: id,
                ..WorkerReport::default()
            },
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn phase(&self) -> TaPhase {
        self.phase
    }

    /// Run until the termination flag is observed.
    ///
    /// # Errors
    ///
    /// Resource errors from persisting the rubric or loading the next exam
    /// are fatal and end this TA immediately.
    pub async fn run(mut self) -> Result<WorkerReport> {
        let poll_interval = self.config.poll_interval();

        while !self.state.is_finished() {
            self.report.passes += 1;
            self.review_rubric().await?;
            self.grade_questions().await;
            self.attempt_advance().await?;
            self.state.termination().pause(poll_interval).await;
        }

        self.enter(TaPhase::Exiting);
        tracing::info!(
            ta_id = self.id,
            graded = self.report.questions_graded,
            revisions = self.report.revisions,
            "TA exiting"
        );
        Ok(self.report)
    }

    fn enter(&mut self, phase: TaPhase) {
        tracing::trace!(ta_id = self.id, from = %self.phase, to = %phase, "TA phase change");
        self.phase = phase;
    }

    /// One pass over the rubric. Each line gets a pause and then a chance of
    /// being revised. The random decision is taken without any lock.
    async fn review_rubric(&mut self) -> Result<()> {
        self.enter(TaPhase::Revising);
        tracing::info!(ta_id = self.id, "TA checking rubric");

        for line in 0..self.config.rubric_lines {
            let pause = self.pacer.delay(self.config.rubric_delay);
            if self.state.termination().pause(pause).await {
                return Ok(());
            }
            if !self.pacer.should_revise(self.config.revise_probability) {
                continue;
            }
            match self.state.try_revise_line(line, self.id).await? {
                RevisionOutcome::Revised { .. } => self.report.revisions += 1,
                RevisionOutcome::Malformed => {
                    tracing::info!(
                        ta_id = self.id,
                        line = line + 1,
                        "TA could not modify rubric line (invalid format)"
                    );
                    self.report.malformed_lines += 1;
                }
            }
        }
        Ok(())
    }

    /// Claim and grade questions until none are left unclaimed.
    async fn grade_questions(&mut self) {
        self.enter(TaPhase::Grading);

        while !self.state.is_finished() {
            let Some(question) = self.state.claim_next(self.id).await else {
                break;
            };
            // The exam cannot advance while this claim is open.
            let student_id = self.state.current_exam().await.map(|e| e.student_id);
            tracing::info!(
                ta_id = self.id,
                question = question + 1,
                student_id = ?student_id,
                "TA marking question"
            );

            let work = self.pacer.delay(self.config.grading_delay);
            if self.state.termination().pause(work).await {
                tracing::info!(
                    ta_id = self.id,
                    question = question + 1,
                    "TA stopped before finishing question"
                );
                break;
            }

            self.state.complete(question, self.id).await;
            self.report.questions_graded += 1;
            tracing::info!(
                ta_id = self.id,
                question = question + 1,
                student_id = ?student_id,
                "TA finished question"
            );
        }
    }

    async fn attempt_advance(&mut self) -> Result<()> {
        self.enter(TaPhase::AttemptingAdvance);

        if !self.state.all_completed().await {
            return Ok(());
        }
        if let AdvanceOutcome::Advanced(_) = self.state.try_advance(self.id).await? {
            self.report.advances += 1;
        }
        Ok(())
    }
}
