use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;

use crate::config::GradingConfig;
use crate::error::Result;
use crate::grading::SharedGradingState;
use crate::ta::{TeachingAssistant, WorkerReport};

/// Totals reported once every TA has exited.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub tas: usize,
    pub exams_in_queue: usize,
    /// Exams before the cursor are fully graded.
    pub cursor: usize,
    pub questions_graded: u64,
    pub revisions: u64,
    pub malformed_lines: u64,
    pub advances: u64,
    pub sentinel_reached: bool,
    pub workers: Vec<WorkerReport>,
}

/// A grading run: one shared state and the TAs working on it.
pub struct GradingSession {
    config: GradingConfig,
    state: Arc<SharedGradingState>,
}

impl GradingSession {
    pub fn new(config: GradingConfig, state: SharedGradingState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// Load the rubric and exam queue named in `config`.
    pub async fn open(config: GradingConfig) -> Result<Self> {
        config.validate()?;
        let state = SharedGradingState::open(&config).await?;
        Ok(Self::new(config, state))
    }

    pub fn state(&self) -> Arc<SharedGradingState> {
        self.state.clone()
    }

    /// Run the session to completion.
    ///
    /// 1. Loads the first exam (an empty queue or sentinel ends the run here)
    /// 2. Spawns `num_tas` TAs with ids `1..=num_tas`
    /// 3. Waits for all of them to exit
    ///
    /// # Errors
    ///
    /// The first fatal error from any TA aborts the others and is returned.
    pub async fn run(self) -> Result<RunSummary> {
        self.config.validate()?;
        self.state.prime().await?;

        tracing::info!(
            tas = self.config.num_tas,
            exams = self.state.queue().len(),
            "Starting grading run"
        );

        let mut tas = JoinSet::new();
        for ta_id in 1..=self.config.num_tas as u64 {
            let ta = TeachingAssistant::new(ta_id, self.state.clone(), &self.config);
            tas.spawn(ta.run());
        }

        let mut workers = Vec::with_capacity(self.config.num_tas);
        while let Some(joined) = tas.join_next().await {
            let result = match joined {
                Ok(result) => result,
                Err(join_error) => Err(join_error.into()),
            };
            match result {
                Ok(report) => workers.push(report),
                Err(e) => {
                    tracing::error!(error = %e, "TA failed, stopping the run");
                    tas.abort_all();
                    return Err(e);
                }
            }
        }
        workers.sort_by_key(|w| w.ta_id);

        let summary = RunSummary {
            tas: workers.len(),
            exams_in_queue: self.state.queue().len(),
            cursor: self.state.cursor().await,
            questions_graded: workers.iter().map(|w| w.questions_graded).sum(),
            revisions: workers.iter().map(|w| w.revisions).sum(),
            malformed_lines: workers.iter().map(|w| w.malformed_lines).sum(),
            advances: workers.iter().map(|w| w.advances).sum(),
            sentinel_reached: self.state.sentinel_reached().await,
            workers,
        };
        tracing::info!(
            cursor = summary.cursor,
            graded = summary.questions_graded,
            "All exams finished"
        );
        Ok(summary)
    }
}
