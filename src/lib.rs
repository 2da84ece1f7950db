pub mod analyzer;
pub mod batch_worker;
pub mod config;
pub mod credits;
pub mod db;
pub mod errors;
pub mod file_service;
pub mod models;
pub mod routes;

#[cfg(test)]
mod tests;

use axum::{http::StatusCode, Json};
use std::sync::Arc;

use batch_worker::BatchWorker;
use config::Config;
use db::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
    pub batch_worker: Arc<BatchWorker>,
}

/// Health check endpoint for monitoring
pub async fn health_check() -> Result<Json<serde_json::Value>, StatusCode> {
    Ok(Json(serde_json::json!({"status": "ok"})))
}
