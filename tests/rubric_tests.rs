
use std::sync::Arc;

use ta_grader::error::GradingError;
use ta_grader::grading::{RevisionOutcome, RubricGuard, EMPTY_LINE};
use test_harness::{GradingFixture, DEFAULT_RUBRIC};

#[tokio::test]
async fn test_load_pads_short_rubric() {
    let fixture = GradingFixture::new().with_rubric(&["1,A", "2,B"]);

    let rubric = RubricGuard::load(&fixture.rubric_path, 5).await.unwrap();
    assert_eq!(
        rubric.snapshot().await,
        vec!["1,A", "2,B", EMPTY_LINE, EMPTY_LINE, EMPTY_LINE]
    );
    assert_eq!(rubric.document(), Some(fixture.rubric_path.as_path()));
}

#[tokio::test]
async fn test_load_ignores_extra_lines_and_crlf() {
    let fixture = GradingFixture::new();
    std::fs::write(&fixture.rubric_path, "1,A\r\n2,B\r\n3,C\r\n").unwrap();

    let rubric = RubricGuard::load(&fixture.rubric_path, 2).await.unwrap();
    assert_eq!(rubric.snapshot().await, vec!["1,A", "2,B"]);
    assert_eq!(rubric.len().await, 2);
}

#[tokio::test]
async fn test_missing_rubric_is_resource_error() {
    let fixture = GradingFixture::new();
    let result = RubricGuard::load(&fixture.rubric_path, 5).await;
    assert!(matches!(result, Err(GradingError::Resource { .. })));
}

/// Every accepted revision rewrites the whole document to match memory.
#[tokio::test]
async fn test_revision_writes_through() {
    let fixture = GradingFixture::new().with_rubric(&DEFAULT_RUBRIC);
    let rubric = RubricGuard::load(&fixture.rubric_path, 5).await.unwrap();

    let outcome = rubric.try_revise_line(2, 1).await.unwrap();
    assert_eq!(
        outcome,
        RevisionOutcome::Revised {
            line: 2,
            old: 'A',
            new: 'B'
        }
    );
    assert_eq!(
        fixture.rubric_on_disk(),
        vec!["1,A", "2,A", "3,B", "4,A", "5,A"]
    );
    assert_eq!(fixture.rubric_on_disk(), rubric.snapshot().await);
}

/// A line without a comma is reported malformed; neither memory nor the
/// document changes.
#[tokio::test]
async fn test_malformed_line_left_untouched() {
    let fixture =
        GradingFixture::new().with_rubric(&["1,A", "malformed", "3,A", "4,", "5,A"]);
    let before = std::fs::read(&fixture.rubric_path).unwrap();
    let rubric = RubricGuard::load(&fixture.rubric_path, 5).await.unwrap();

    assert_eq!(
        rubric.try_revise_line(1, 1).await.unwrap(),
        RevisionOutcome::Malformed
    );
    assert_eq!(
        rubric.try_revise_line(3, 1).await.unwrap(),
        RevisionOutcome::Malformed
    );
    assert_eq!(rubric.read_line(1).await.as_deref(), Some("malformed"));
    assert_eq!(std::fs::read(&fixture.rubric_path).unwrap(), before);
}

/// Padding lines are malformed too.
#[tokio::test]
async fn test_empty_placeholder_is_malformed() {
    let fixture = GradingFixture::new().with_rubric(&["1,A"]);
    let rubric = RubricGuard::load(&fixture.rubric_path, 2).await.unwrap();
    assert_eq!(
        rubric.try_revise_line(1, 1).await.unwrap(),
        RevisionOutcome::Malformed
    );
}

/// Twenty-six revisions bring a grade back to where it started.
#[tokio::test]
async fn test_twenty_six_revisions_cycle() {
    let fixture = GradingFixture::new().with_rubric(&["1,K", "2,A", "3,A", "4,A", "5,A"]);
    let rubric = RubricGuard::load(&fixture.rubric_path, 5).await.unwrap();

    let mut letters = Vec::new();
    for _ in 0..26 {
        match rubric.try_revise_line(0, 1).await.unwrap() {
            RevisionOutcome::Revised { new, .. } => letters.push(new),
            RevisionOutcome::Malformed => panic!("well-formed line reported malformed"),
        }
    }

    assert_eq!(rubric.read_line(0).await.as_deref(), Some("1,K"));
    assert_eq!(fixture.rubric_on_disk()[0], "1,K");
    assert!(letters.contains(&'Z'));
    assert!(letters.contains(&'A'));
}

/// Concurrent revisions of the same line are all applied: none is lost.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_revisions_linearize() {
    const TAS: u64 = 8;
    const PER_TA: usize = 10;

    let fixture = GradingFixture::new().with_rubric(&DEFAULT_RUBRIC);
    let rubric = Arc::new(RubricGuard::load(&fixture.rubric_path, 5).await.unwrap());

    let mut handles = Vec::new();
    for ta_id in 1..=TAS {
        let rubric = rubric.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..PER_TA {
                rubric.try_revise_line(0, ta_id).await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // 80 steps from 'A' is 80 % 26 = 2 letters on.
    assert_eq!(rubric.read_line(0).await.as_deref(), Some("1,C"));
    assert_eq!(fixture.rubric_on_disk(), rubric.snapshot().await);
}
