use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::info;

use lexflow::analyzer::{DocumentAnalyzer, FreeAnalyzer};
use lexflow::batch_worker::BatchWorker;
use lexflow::config::Config;
use lexflow::db::Database;
use lexflow::file_service::FileService;
use lexflow::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let db = Database::new(&config.database_url).await?;

    info!("Running database migrations...");
    db.migrate().await?;

    let file_service = FileService::new(config.staging_path.clone());

    // The free-tier analyzer is the only provider client built in; paid
    // providers are wired in from outside through the same trait.
    let analyzer: Arc<dyn DocumentAnalyzer> = Arc::new(FreeAnalyzer);

    let batch_worker = Arc::new(BatchWorker::new(
        db.clone(),
        analyzer,
        file_service,
        config.max_concurrent_documents,
        Duration::from_secs(config.polling_interval_secs),
    ));

    let worker = batch_worker.clone();
    tokio::spawn(async move {
        worker.start_polling().await;
    });

    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        batch_worker,
    });

    let app = Router::new()
        .route("/api/health", get(lexflow::health_check))
        .nest("/api/queue", lexflow::routes::queue::router())
        .nest("/api/batch", lexflow::routes::batches::router())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.server_address).await?;
    info!("Server starting on {}", config.server_address);

    axum::serve(listener, app).await?;

    Ok(())
}
