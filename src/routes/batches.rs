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
use crate::models::{BatchJob, QueueJob};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/jobs", get(list_batch_jobs))
        .route("/jobs/{id}", get(get_batch_job))
        .route("/jobs/{id}", delete(delete_batch_job))
        .route("/jobs/{id}/retry", post(retry_batch_job))
        .route("/jobs/{id}/cancel", post(cancel_batch_job))
        .route("/statistics", get(get_batch_statistics))
}

#[derive(Debug, Deserialize)]
struct ListBatchJobsQuery {
    user_id: Option<Uuid>,
    limit: Option<i64>,
    offset: Option<i64>,
}

async fn list_batch_jobs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListBatchJobsQuery>,
) -> Result<Json<Vec<BatchJob>>, BatchError> {
    let limit = query.limit.unwrap_or(20);

    let jobs = match query.user_id {
        Some(user_id) => state
            .db
            .get_batch_jobs(user_id, limit)
            .await
            .map_err(BatchError::from_anyhow)?,
        None => state
            .db
            .get_all_batch_jobs(limit, query.offset.unwrap_or(0))
            .await
            .map_err(BatchError::from_anyhow)?,
    };

    Ok(Json(jobs))
}

async fn get_batch_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, BatchError> {
    let batch_job = state
        .db
        .get_batch_job(id)
        .await
        .map_err(BatchError::from_anyhow)?
        .ok_or(BatchError::BatchNotFound(id))?;

    let documents = state
        .db
        .get_batch_documents(id)
        .await
        .map_err(BatchError::from_anyhow)?;

    Ok(Json(serde_json::json!({
        "batchJob": batch_job,
        "documents": documents,
    })))
}

async fn delete_batch_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BatchError> {
    let deleted = state
        .db
        .delete_batch_job(id)
        .await
        .map_err(BatchError::from_anyhow)?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(BatchError::BatchNotFound(id))
    }
}

async fn retry_batch_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<QueueJob>, BatchError> {
    let job = state.batch_worker.retry_batch_job(id).await?;
    Ok(Json(job))
}

async fn cancel_batch_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BatchJob>, BatchError> {
    let job = state
        .db
        .cancel_batch_job(id)
        .await
        .map_err(BatchError::from_anyhow)?;

    Ok(Json(job))
}

#[derive(Debug, Deserialize)]
struct StatisticsQuery {
    user_id: Option<Uuid>,
}

async fn get_batch_statistics(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<crate::db::batches::BatchStatistics>, BatchError> {
    let statistics = state
        .db
        .get_batch_statistics(query.user_id)
        .await
        .map_err(BatchError::from_anyhow)?;

    Ok(Json(statistics))
}
