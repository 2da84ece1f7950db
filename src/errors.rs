use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Error taxonomy of the batch engine.
///
/// Configuration errors (missing batch, empty batch, missing user) abort the
/// whole batch; staged-file errors fail a single document; everything else is
/// carried through as `Internal`. Cleanup failures are never represented here
/// at all, they are logged and swallowed at the call site.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Batch job not found: {0}")]
    BatchNotFound(Uuid),

    #[error("No documents found for batch job: {0}")]
    NoDocuments(Uuid),

    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("Queue job not found: {0}")]
    QueueJobNotFound(Uuid),

    #[error("Queue job {id} is {status}, only failed jobs can be retried")]
    QueueJobNotRetryable { id: Uuid, status: String },

    #[error("Batch job {id} is {status}, only pending batches can be cancelled")]
    BatchNotCancellable { id: Uuid, status: String },

    #[error("Invalid status filter: {0}")]
    InvalidStatusFilter(String),

    #[error("File path not found in document metadata")]
    MissingFilePath,

    #[error("File not found on disk: {0}")]
    StagedFileMissing(String),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl BatchError {
    /// Recover the typed variant from an `anyhow` chain, so route handlers
    /// can map store errors onto the right HTTP status.
    pub fn from_anyhow(error: anyhow::Error) -> Self {
        match error.downcast::<BatchError>() {
            Ok(batch_error) => batch_error,
            Err(other) => BatchError::Internal(other),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            BatchError::BatchNotFound(_)
            | BatchError::UserNotFound(_)
            | BatchError::QueueJobNotFound(_) => StatusCode::NOT_FOUND,
            BatchError::QueueJobNotRetryable { .. } | BatchError::BatchNotCancellable { .. } => {
                StatusCode::CONFLICT
            }
            BatchError::InvalidStatusFilter(_) => StatusCode::BAD_REQUEST,
            BatchError::NoDocuments(_)
            | BatchError::MissingFilePath
            | BatchError::StagedFileMissing(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BatchError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BatchError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "message": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
