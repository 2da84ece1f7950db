use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum QueueJobStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "processing")]
    Processing,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "failed")]
    Failed,
    #[serde(rename = "retrying")]
    Retrying,
}

impl std::fmt::Display for QueueJobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueJobStatus::Pending => write!(f, "pending"),
            QueueJobStatus::Processing => write!(f, "processing"),
            QueueJobStatus::Completed => write!(f, "completed"),
            QueueJobStatus::Failed => write!(f, "failed"),
            QueueJobStatus::Retrying => write!(f, "retrying"),
        }
    }
}

impl TryFrom<String> for QueueJobStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(QueueJobStatus::Pending),
            "processing" => Ok(QueueJobStatus::Processing),
            "completed" => Ok(QueueJobStatus::Completed),
            "failed" => Ok(QueueJobStatus::Failed),
            "retrying" => Ok(QueueJobStatus::Retrying),
            _ => Err(format!("Invalid queue job status: {}", value)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum BatchJobStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "processing")]
    Processing,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "completed_with_errors")]
    CompletedWithErrors,
    #[serde(rename = "failed")]
    Failed,
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl BatchJobStatus {
    /// No further automatic transition happens from these states; only an
    /// explicit retry re-admits the batch.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BatchJobStatus::Completed
                | BatchJobStatus::CompletedWithErrors
                | BatchJobStatus::Failed
                | BatchJobStatus::Cancelled
        )
    }
}

impl std::fmt::Display for BatchJobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchJobStatus::Pending => write!(f, "pending"),
            BatchJobStatus::Processing => write!(f, "processing"),
            BatchJobStatus::Completed => write!(f, "completed"),
            BatchJobStatus::CompletedWithErrors => write!(f, "completed_with_errors"),
            BatchJobStatus::Failed => write!(f, "failed"),
            BatchJobStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl TryFrom<String> for BatchJobStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(BatchJobStatus::Pending),
            "processing" => Ok(BatchJobStatus::Processing),
            "completed" => Ok(BatchJobStatus::Completed),
            "completed_with_errors" => Ok(BatchJobStatus::CompletedWithErrors),
            "failed" => Ok(BatchJobStatus::Failed),
            "cancelled" => Ok(BatchJobStatus::Cancelled),
            _ => Err(format!("Invalid batch job status: {}", value)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum BatchDocumentStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "processing")]
    Processing,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "failed")]
    Failed,
    #[serde(rename = "skipped")]
    Skipped,
}

impl std::fmt::Display for BatchDocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchDocumentStatus::Pending => write!(f, "pending"),
            BatchDocumentStatus::Processing => write!(f, "processing"),
            BatchDocumentStatus::Completed => write!(f, "completed"),
            BatchDocumentStatus::Failed => write!(f, "failed"),
            BatchDocumentStatus::Skipped => write!(f, "skipped"),
        }
    }
}

impl TryFrom<String> for BatchDocumentStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(BatchDocumentStatus::Pending),
            "processing" => Ok(BatchDocumentStatus::Processing),
            "completed" => Ok(BatchDocumentStatus::Completed),
            "failed" => Ok(BatchDocumentStatus::Failed),
            "skipped" => Ok(BatchDocumentStatus::Skipped),
            _ => Err(format!("Invalid batch document status: {}", value)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum AnalysisStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "failed")]
    Failed,
}

impl std::fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisStatus::Pending => write!(f, "pending"),
            AnalysisStatus::Completed => write!(f, "completed"),
            AnalysisStatus::Failed => write!(f, "failed"),
        }
    }
}

impl TryFrom<String> for AnalysisStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(AnalysisStatus::Pending),
            "completed" => Ok(AnalysisStatus::Completed),
            "failed" => Ok(AnalysisStatus::Failed),
            _ => Err(format!("Invalid analysis status: {}", value)),
        }
    }
}

/// A generic unit of deferred work. Only `batch_processing` jobs are consumed
/// by this engine; the (job_type, job_data) pair stays open for other job
/// kinds.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QueueJob {
    pub id: Uuid,
    pub job_type: String,
    pub job_data: serde_json::Value,
    pub priority: i32,
    #[sqlx(try_from = "String")]
    pub status: QueueJobStatus,
    pub attempts: i32,
    pub max_attempts: i32,
    pub scheduled_for: DateTime<Utc>,
    pub error_message: Option<String>,
    pub worker_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl QueueJob {
    pub fn payload(&self) -> Result<JobPayload, String> {
        JobPayload::decode(&self.job_type, self.job_data.clone())
    }
}

/// Typed view of a queue job's (job_type, job_data) pair.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum JobPayload {
    BatchProcessing(BatchProcessingPayload),
}

impl JobPayload {
    pub const BATCH_PROCESSING: &'static str = "batch_processing";

    pub fn decode(job_type: &str, job_data: serde_json::Value) -> Result<Self, String> {
        match job_type {
            Self::BATCH_PROCESSING => serde_json::from_value(job_data)
                .map(JobPayload::BatchProcessing)
                .map_err(|e| format!("Invalid batch_processing payload: {}", e)),
            other => Err(format!("Unsupported job type: {}", other)),
        }
    }

    pub fn job_type(&self) -> &'static str {
        match self {
            JobPayload::BatchProcessing(_) => Self::BATCH_PROCESSING,
        }
    }

    pub fn job_data(&self) -> serde_json::Value {
        match self {
            JobPayload::BatchProcessing(payload) => {
                serde_json::to_value(payload).unwrap_or_default()
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProcessingPayload {
    pub batch_job_id: Uuid,
    pub user_id: Uuid,
    pub ai_provider: String,
    pub ai_model: String,
    pub analysis_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<Uuid>,
}

/// Aggregate record for one user-submitted multi-document request.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BatchJob {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub analysis_type: String,
    pub ai_provider: String,
    pub ai_model: String,
    pub template_id: Option<Uuid>,
    #[sqlx(try_from = "String")]
    pub status: BatchJobStatus,
    pub total_documents: i32,
    pub processed_documents: i32,
    pub failed_documents: i32,
    pub total_credits_estimated: i32,
    pub total_credits_used: i32,
    pub error_message: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBatchJob {
    pub name: String,
    pub description: Option<String>,
    pub analysis_type: String,
    pub ai_provider: String,
    pub ai_model: String,
    pub template_id: Option<Uuid>,
    pub total_documents: i32,
    pub total_credits_estimated: i32,
}

/// One file within a batch, tracked independently.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BatchDocument {
    pub id: Uuid,
    pub batch_job_id: Uuid,
    pub document_analysis_id: Option<Uuid>,
    pub original_file_name: String,
    pub file_size: i64,
    pub mime_type: String,
    #[sqlx(try_from = "String")]
    pub status: BatchDocumentStatus,
    pub credits_used: i32,
    pub error_message: Option<String>,
    pub sort_order: i32,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BatchDocument {
    /// Staged-file details, tolerating metadata written by older submission
    /// paths that omitted either key.
    pub fn staging(&self) -> BatchDocumentMetadata {
        serde_json::from_value(self.metadata.clone()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBatchDocument {
    pub batch_job_id: Uuid,
    pub original_file_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub sort_order: i32,
    pub metadata: BatchDocumentMetadata,
}

/// Per-document metadata persisted at submission: where the staged file
/// content lives and whether the pipeline owns its deletion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default)]
    pub temp_file: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchJobMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_percentage: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentAnalysis {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub ai_provider: String,
    pub ai_model: String,
    pub analysis_type: String,
    pub template_id: Option<Uuid>,
    pub result: serde_json::Value,
    #[sqlx(try_from = "String")]
    pub status: AnalysisStatus,
    pub credits_used: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocumentAnalysis {
    pub title: String,
    pub content: String,
    pub ai_provider: String,
    pub ai_model: String,
    pub analysis_type: String,
    pub template_id: Option<Uuid>,
    pub credits_used: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub credits: i32,
    pub created_at: DateTime<Utc>,
}

/// A user's stored API key for one AI provider.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AiProviderCredential {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: String,
    pub api_key: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnalysisTemplate {
    pub id: Uuid,
    pub name: String,
    pub system_prompt: String,
    pub created_at: DateTime<Utc>,
}
