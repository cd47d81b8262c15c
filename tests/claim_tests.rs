
use std::collections::HashSet;
use std::sync::Arc;

use ta_grader::grading::{ClaimState, QuestionClaimTable};
use test_harness::{memory_state, numbered_exams};

/// Five sequential claims by one TA come back in index order, then nothing.
#[test]
fn test_single_worker_claims_in_order() {
    let mut table = QuestionClaimTable::new(5);
    let claimed: Vec<Option<usize>> = (0..6).map(|_| table.claim_next(1)).collect();
    assert_eq!(
        claimed,
        vec![Some(0), Some(1), Some(2), Some(3), Some(4), None]
    );
}

#[tokio::test]
async fn test_claims_through_shared_state() {
    let (queue, loader) = numbered_exams(1);
    let state = memory_state(5, queue, Arc::new(loader));
    state.prime().await.unwrap();

    assert_eq!(state.claim_next(1).await, Some(0));
    assert_eq!(state.claim_next(2).await, Some(1));
    state.complete(0, 1).await;

    let cells = state.claim_states().await;
    assert_eq!(cells[0], ClaimState::Completed);
    assert_eq!(cells[1], ClaimState::Claimed(2));
    assert_eq!(cells[2], ClaimState::Unclaimed);
    assert!(!state.all_completed().await);
}

/// Many TAs racing for the same table never receive the same question.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_no_double_claim_under_contention() {
    const QUESTIONS: usize = 256;
    const TAS: u64 = 16;

    let (queue, loader) = numbered_exams(1);
    let state = memory_state(QUESTIONS, queue, Arc::new(loader));
    state.prime().await.unwrap();

    let mut handles = Vec::new();
    for ta_id in 1..=TAS {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            let mut mine = Vec::new();
            while let Some(q) = state.claim_next(ta_id).await {
                mine.push(q);
                tokio::task::yield_now().await;
                state.complete(q, ta_id).await;
            }
            mine
        }));
    }

    let mut seen = HashSet::new();
    let mut total = 0;
    for handle in handles {
        for q in handle.await.unwrap() {
            assert!(seen.insert(q), "question {} was claimed twice", q);
            total += 1;
        }
    }

    assert_eq!(total, QUESTIONS);
    assert!(state.all_completed().await);
}

/// While one TA holds a claim nobody else can take or finish that question.
#[tokio::test]
async fn test_claimed_question_is_skipped_by_others() {
    let (queue, loader) = numbered_exams(1);
    let state = memory_state(2, queue, Arc::new(loader));
    state.prime().await.unwrap();

    assert_eq!(state.claim_next(1).await, Some(0));
    assert_eq!(state.claim_next(2).await, Some(1));
    assert_eq!(state.claim_next(3).await, None);

    state.complete(1, 2).await;
    assert_eq!(state.claim_next(3).await, None);
    assert!(!state.all_completed().await);

    state.complete(0, 1).await;
    assert!(state.all_completed().await);
}
