use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::BatchError;
use crate::models::{QueueJob, QueueJobStatus};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stats", get(get_queue_stats))
        .route("/status", get(get_worker_status))
        .route("/jobs", get(list_queue_jobs))
        .route("/jobs/{id}/retry", post(retry_queue_job))
        .route("/jobs/{id}", delete(delete_queue_job))
}

async fn get_queue_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, BatchError> {
    let stats = state
        .db
        .get_queue_stats()
        .await
        .map_err(BatchError::from_anyhow)?;

    Ok(Json(serde_json::json!({
        "pending": stats.pending_count,
        "processing": stats.processing_count,
        "retrying": stats.retrying_count,
        "failed": stats.failed_count,
        "completed_today": stats.completed_today,
        "oldest_pending_minutes": stats.oldest_pending_minutes,
    })))
}

async fn get_worker_status(
    State(state): State<Arc<AppState>>,
) -> Json<crate::batch_worker::WorkerStatus> {
    Json(state.batch_worker.get_status())
}

#[derive(Debug, Deserialize)]
struct ListQueueJobsQuery {
    status: Option<String>,
    limit: Option<i64>,
}

async fn list_queue_jobs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQueueJobsQuery>,
) -> Result<Json<Vec<QueueJob>>, BatchError> {
    let status = match query.status {
        Some(raw) => Some(QueueJobStatus::try_from(raw).map_err(BatchError::InvalidStatusFilter)?),
        None => None,
    };

    let jobs = state
        .db
        .get_queue_jobs(status, query.limit.unwrap_or(50))
        .await
        .map_err(BatchError::from_anyhow)?;

    Ok(Json(jobs))
}

async fn retry_queue_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<QueueJob>, BatchError> {
    let job = state
        .db
        .retry_failed_queue_job(id)
        .await
        .map_err(BatchError::from_anyhow)?;

    Ok(Json(job))
}

async fn delete_queue_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BatchError> {
    let deleted = state
        .db
        .delete_queue_job(id)
        .await
        .map_err(BatchError::from_anyhow)?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(BatchError::QueueJobNotFound(id))
    }
}
