use serde_json::json;
use uuid::Uuid;

use crate::models::{
    BatchDocumentMetadata, BatchJobMetadata, BatchJobStatus, BatchDocumentStatus, JobPayload,
    QueueJobStatus,
};

#[test]
fn test_queue_job_status_round_trip() {
    for status in [
        QueueJobStatus::Pending,
        QueueJobStatus::Processing,
        QueueJobStatus::Completed,
        QueueJobStatus::Failed,
        QueueJobStatus::Retrying,
    ] {
        let text = status.to_string();
        assert_eq!(QueueJobStatus::try_from(text).unwrap(), status);
    }
}

#[test]
fn test_batch_job_status_round_trip() {
    for status in [
        BatchJobStatus::Pending,
        BatchJobStatus::Processing,
        BatchJobStatus::Completed,
        BatchJobStatus::CompletedWithErrors,
        BatchJobStatus::Failed,
        BatchJobStatus::Cancelled,
    ] {
        let text = status.to_string();
        assert_eq!(BatchJobStatus::try_from(text).unwrap(), status);
    }
}

#[test]
fn test_invalid_status_strings_rejected() {
    assert!(QueueJobStatus::try_from("done".to_string()).is_err());
    assert!(BatchJobStatus::try_from("".to_string()).is_err());
    assert!(BatchDocumentStatus::try_from("cancelled".to_string()).is_err());
}

#[test]
fn test_terminal_batch_statuses() {
    assert!(!BatchJobStatus::Pending.is_terminal());
    assert!(!BatchJobStatus::Processing.is_terminal());
    assert!(BatchJobStatus::Completed.is_terminal());
    assert!(BatchJobStatus::CompletedWithErrors.is_terminal());
    assert!(BatchJobStatus::Failed.is_terminal());
    assert!(BatchJobStatus::Cancelled.is_terminal());
}

#[test]
fn test_decode_batch_processing_payload() {
    let batch_job_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();

    let payload = JobPayload::decode(
        "batch_processing",
        json!({
            "batchJobId": batch_job_id,
            "userId": user_id,
            "aiProvider": "anthropic",
            "aiModel": "claude",
            "analysisType": "contract",
        }),
    )
    .unwrap();

    let JobPayload::BatchProcessing(decoded) = payload;
    assert_eq!(decoded.batch_job_id, batch_job_id);
    assert_eq!(decoded.user_id, user_id);
    assert_eq!(decoded.ai_provider, "anthropic");
    assert_eq!(decoded.ai_model, "claude");
    assert_eq!(decoded.analysis_type, "contract");
    assert!(decoded.template_id.is_none());
}

#[test]
fn test_decode_unknown_job_type() {
    let err = JobPayload::decode("email_digest", json!({})).unwrap_err();
    assert!(err.contains("Unsupported job type"));
}

#[test]
fn test_decode_malformed_payload() {
    let err = JobPayload::decode("batch_processing", json!({"batchJobId": 42})).unwrap_err();
    assert!(err.contains("Invalid batch_processing payload"));
}

#[test]
fn test_payload_round_trip() {
    let original = JobPayload::decode(
        "batch_processing",
        json!({
            "batchJobId": Uuid::new_v4(),
            "userId": Uuid::new_v4(),
            "aiProvider": "free",
            "aiModel": "basic",
            "analysisType": "general",
            "templateId": Uuid::new_v4(),
        }),
    )
    .unwrap();

    let reencoded = JobPayload::decode(original.job_type(), original.job_data()).unwrap();
    let (JobPayload::BatchProcessing(a), JobPayload::BatchProcessing(b)) = (&original, &reencoded);
    assert_eq!(a.batch_job_id, b.batch_job_id);
    assert_eq!(a.template_id, b.template_id);
}

#[test]
fn test_document_metadata_wire_keys_are_camel_case() {
    let metadata = BatchDocumentMetadata {
        file_path: Some("/staging/abc.txt".to_string()),
        temp_file: true,
    };

    let value = serde_json::to_value(&metadata).unwrap();
    assert_eq!(value["filePath"], "/staging/abc.txt");
    assert_eq!(value["tempFile"], true);
}

#[test]
fn test_document_metadata_tolerates_missing_keys() {
    let metadata: BatchDocumentMetadata = serde_json::from_value(json!({})).unwrap();
    assert!(metadata.file_path.is_none());
    assert!(!metadata.temp_file);
}

#[test]
fn test_batch_job_metadata_progress_key() {
    let metadata = BatchJobMetadata {
        progress_percentage: Some(40),
    };

    let value = serde_json::to_value(&metadata).unwrap();
    assert_eq!(value["progressPercentage"], 40);

    let parsed: BatchJobMetadata =
        serde_json::from_value(json!({"progressPercentage": 100})).unwrap();
    assert_eq!(parsed.progress_percentage, Some(100));
}
