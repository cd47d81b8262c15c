use std::path::PathBuf;
use std::time::Duration;

use crate::error::{GradingError, Result};

/// Number of questions per exam, one per rubric line.
pub const DEFAULT_RUBRIC_LINES: usize = 5;

/// Fewest TAs a run is allowed to start with.
pub const MIN_TAS: usize = 2;

/// Inclusive range of milliseconds a TA pauses for simulated work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    /// No pause at all. Used to stress the protocol in tests.
    pub const ZERO: DelayRange = DelayRange {
        min_ms: 0,
        max_ms: 0,
    };

    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub fn is_zero(&self) -> bool {
        self.max_ms == 0
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.min_ms > self.max_ms {
            return Err(GradingError::Config(format!(
                "{} delay min {}ms exceeds max {}ms",
                name, self.min_ms, self.max_ms
            )));
        }
        Ok(())
    }
}

/// Configuration for a grading run.
///
/// Timing and randomness live here so tests can run the same protocol with
/// zero delays and a fixed seed.
#[derive(Debug, Clone)]
pub struct GradingConfig {
    /// Rubric document, rewritten on every accepted revision
    pub rubric_path: PathBuf,
    /// Directory scanned for `*.txt` exams
    pub exam_dir: PathBuf,
    /// Number of concurrent TAs
    pub num_tas: usize,
    /// Rubric lines, and therefore questions per exam
    pub rubric_lines: usize,
    /// Chance that a TA tries to revise a given rubric line on each pass
    pub revise_probability: f64,
    /// Pause before each rubric line is considered
    pub rubric_delay: DelayRange,
    /// Simulated time spent grading one question
    pub grading_delay: DelayRange,
    /// Pause between a TA's termination checks
    pub poll_interval_ms: u64,
    /// Fixed RNG seed. Each TA derives its own stream as `seed + ta_id`.
    pub seed: Option<u64>,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            rubric_path: PathBuf::from("rubric.txt"),
            exam_dir: PathBuf::from("exams"),
            num_tas: MIN_TAS,
            rubric_lines: DEFAULT_RUBRIC_LINES,
            revise_probability: 0.30,
            rubric_delay: DelayRange::new(500, 1000),
            grading_delay: DelayRange::new(1000, 2000),
            poll_interval_ms: 100,
            seed: None,
        }
    }
}

impl GradingConfig {
    pub fn new(num_tas: usize, exam_dir: impl Into<PathBuf>) -> Self {
        Self {
            num_tas,
            exam_dir: exam_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_rubric_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.rubric_path = path.into();
        self
    }

    pub fn with_delays(mut self, rubric_delay: DelayRange, grading_delay: DelayRange) -> Self {
        self.rubric_delay = rubric_delay;
        self.grading_delay = grading_delay;
        self
    }

    pub fn with_revise_probability(mut self, probability: f64) -> Self {
        self.revise_probability = probability;
        self
    }

    pub fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Reject settings the workers cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.num_tas == 0 {
            return Err(GradingError::Config("at least one TA is required".into()));
        }
        if self.rubric_lines == 0 {
            return Err(GradingError::Config(
                "rubric must have at least one line".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.revise_probability) {
            return Err(GradingError::Config(format!(
                "revise probability {} is outside [0, 1]",
                self.revise_probability
            )));
        }
        self.rubric_delay.validate("rubric")?;
        self.grading_delay.validate("grading")?;
        Ok(())
    }
}
