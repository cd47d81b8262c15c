use serde::Serialize;

/// State of one question on the current exam.
///
/// Cells only move forward: `Unclaimed -> Claimed -> Completed`. The only way
/// back to `Unclaimed` is [`QuestionClaimTable::reset`] when the next exam is
/// loaded, which requires every cell to be `Completed` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClaimState {
    Unclaimed,
    Claimed(u64),
    Completed,
}

impl std::fmt::Display for ClaimState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimState::Unclaimed => write!(f, "unclaimed"),
            ClaimState::Claimed(ta_id) => write!(f, "claimed by TA {}", ta_id),
            ClaimState::Completed => write!(f, "completed"),
        }
    }
}

/// One cell per rubric question for the exam being graded.
///
/// The table itself is not synchronized; [`SharedGradingState`] keeps it
/// behind its own mutex.
///
/// [`SharedGradingState`]: crate::grading::SharedGradingState
#[derive(Debug, Clone)]
pub struct QuestionClaimTable {
    cells: Vec<ClaimState>,
}

impl QuestionClaimTable {
    pub fn new(questions: usize) -> Self {
        Self {
            cells: vec![ClaimState::Unclaimed; questions],
        }
    }

    /// Reserve the lowest-indexed unclaimed question for `ta_id`.
    pub fn claim_next(&mut self, ta_id: u64) -> Option<usize> {
        let question = self
            .cells
            .iter()
            .position(|cell| *cell == ClaimState::Unclaimed)?;
        self.cells[question] = ClaimState::Claimed(ta_id);
        Some(question)
    }

    /// Mark a question graded.
    ///
    /// # Panics
    ///
    /// Panics if `ta_id` does not hold the claim on `question`. Completing a
    /// question you never claimed is a bug in the caller.
    pub fn complete(&mut self, question: usize, ta_id: u64) {
        let cell = &mut self.cells[question];
        assert_eq!(
            *cell,
            ClaimState::Claimed(ta_id),
            "TA {} completed question {} without holding its claim",
            ta_id,
            question
        );
        *cell = ClaimState::Completed;
    }

    pub fn all_completed(&self) -> bool {
        self.cells.iter().all(|cell| *cell == ClaimState::Completed)
    }

    /// Clear every cell for a freshly loaded exam.
    ///
    /// # Panics
    ///
    /// Panics if any question is still unclaimed or in progress.
    pub fn reset(&mut self) {
        assert!(
            self.all_completed(),
            "claim table reset while questions are outstanding: {:?}",
            self.cells
        );
        self.cells.fill(ClaimState::Unclaimed);
    }

    pub fn state(&self, question: usize) -> Option<ClaimState> {
        self.cells.get(question).copied()
    }

    pub fn cells(&self) -> &[ClaimState] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
