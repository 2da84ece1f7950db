use crate::batch_worker::{final_batch_status, progress_percentage, RETRY_PRIORITY, SUBMIT_PRIORITY};
use crate::models::BatchJobStatus;

#[test]
fn test_final_status_all_succeeded() {
    assert_eq!(final_batch_status(0, 3), BatchJobStatus::Completed);
    assert_eq!(final_batch_status(0, 1), BatchJobStatus::Completed);
}

#[test]
fn test_final_status_all_failed() {
    assert_eq!(final_batch_status(3, 3), BatchJobStatus::Failed);
    assert_eq!(final_batch_status(1, 1), BatchJobStatus::Failed);
}

#[test]
fn test_final_status_partial_failure() {
    assert_eq!(final_batch_status(1, 3), BatchJobStatus::CompletedWithErrors);
    assert_eq!(final_batch_status(4, 5), BatchJobStatus::CompletedWithErrors);
}

#[test]
fn test_progress_percentage() {
    assert_eq!(progress_percentage(0, 0, 4), 0);
    assert_eq!(progress_percentage(1, 0, 4), 25);
    assert_eq!(progress_percentage(2, 1, 4), 75);
    assert_eq!(progress_percentage(3, 1, 4), 100);
}

#[test]
fn test_progress_percentage_rounds() {
    assert_eq!(progress_percentage(1, 0, 3), 33);
    assert_eq!(progress_percentage(2, 0, 3), 67);
}

#[test]
fn test_progress_percentage_empty_batch() {
    assert_eq!(progress_percentage(0, 0, 0), 100);
}

#[test]
fn test_retries_outrank_fresh_submissions() {
    assert!(RETRY_PRIORITY > SUBMIT_PRIORITY);
}
