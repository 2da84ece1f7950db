use anyhow::Result;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::analyzer::DocumentAnalyzer;
use crate::credits;
use crate::db::Database;
use crate::errors::BatchError;
use crate::file_service::FileService;
use crate::models::{
    BatchDocument, BatchDocumentMetadata, BatchDocumentStatus, BatchJobStatus,
    BatchProcessingPayload, CreateDocumentAnalysis, AnalysisStatus, JobPayload, QueueJob,
};

/// Fresh submissions enqueue at priority 1; retries jump the line.
pub const SUBMIT_PRIORITY: i32 = 1;
pub const RETRY_PRIORITY: i32 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerStatus {
    pub is_processing: bool,
    pub polling_active: bool,
    pub max_concurrent_documents: usize,
    pub polling_interval_ms: u64,
}

/// The batch engine: polls the queue store, claims one job per tick, and
/// drives the claimed batch through its state machine with a bounded
/// fan-out per chunk of documents.
///
/// All durable state lives in the stores. A crashed worker leaves its job in
/// `processing`, to be re-admitted by an operator through the retry path.
pub struct BatchWorker {
    db: Database,
    analyzer: Arc<dyn DocumentAnalyzer>,
    file_service: FileService,
    max_concurrent_documents: usize,
    polling_interval: Duration,
    worker_id: String,
    is_processing: AtomicBool,
    polling_active: AtomicBool,
}

impl BatchWorker {
    pub fn new(
        db: Database,
        analyzer: Arc<dyn DocumentAnalyzer>,
        file_service: FileService,
        max_concurrent_documents: usize,
        polling_interval: Duration,
    ) -> Self {
        let worker_id = format!(
            "worker-{}-{}",
            hostname::get().unwrap_or_default().to_string_lossy(),
            Uuid::new_v4()
        );

        Self {
            db,
            analyzer,
            file_service,
            max_concurrent_documents: max_concurrent_documents.max(1),
            polling_interval,
            worker_id,
            is_processing: AtomicBool::new(false),
            polling_active: AtomicBool::new(false),
        }
    }

    /// Run the polling loop until [`stop_polling`](Self::stop_polling) is
    /// called. A tick that finds no eligible job is a no-op; a tick whose
    /// processing fails only logs, the next tick starts clean.
    pub async fn start_polling(self: Arc<Self>) {
        self.polling_active.store(true, Ordering::SeqCst);
        info!(
            "Starting batch worker {} (chunk size {}, polling every {:?})",
            self.worker_id, self.max_concurrent_documents, self.polling_interval
        );

        let mut ticker = interval(self.polling_interval);
        loop {
            ticker.tick().await;

            if !self.polling_active.load(Ordering::SeqCst) {
                info!("Batch worker {} stopped polling", self.worker_id);
                break;
            }

            if let Err(e) = self.poll_once().await {
                error!("Error in batch worker poll: {:#}", e);
            }
        }
    }

    pub fn stop_polling(&self) {
        self.polling_active.store(false, Ordering::SeqCst);
    }

    /// Claim and process at most one queue job. The single-slot guard makes
    /// re-entrant polls no-ops while a claim is in flight.
    pub async fn poll_once(&self) -> Result<()> {
        if self
            .is_processing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(());
        }

        let result = self.claim_and_process().await;
        self.is_processing.store(false, Ordering::SeqCst);
        result
    }

    async fn claim_and_process(&self) -> Result<()> {
        let Some(job) = self.db.claim_next_queue_job(&self.worker_id).await? else {
            return Ok(());
        };

        info!("Claimed queue job {} ({})", job.id, job.job_type);
        self.process_queue_job(&job).await;
        Ok(())
    }

    /// Drive one claimed job to `completed` or `failed`. Every failure path
    /// finalizes the queue job; an error here must never leave the job
    /// wedged in `processing`.
    async fn process_queue_job(&self, job: &QueueJob) {
        let payload = match job.payload() {
            Ok(JobPayload::BatchProcessing(payload)) => payload,
            Err(e) => {
                error!("Rejecting queue job {}: {}", job.id, e);
                if let Err(mark_err) = self.db.mark_queue_job_failed(job.id, &e).await {
                    error!("Failed to mark queue job {} as failed: {:#}", job.id, mark_err);
                }
                return;
            }
        };

        match self.process_batch_job(&payload).await {
            Ok(()) => {
                if let Err(e) = self.db.mark_queue_job_completed(job.id).await {
                    error!("Failed to mark queue job {} as completed: {:#}", job.id, e);
                } else {
                    info!("✅ Completed queue job {}", job.id);
                }
            }
            Err(e) => {
                let message = format!("{:#}", e);
                error!("Queue job {} failed: {}", job.id, message);

                if let Err(mark_err) = self.db.mark_queue_job_failed(job.id, &message).await {
                    error!("Failed to mark queue job {} as failed: {:#}", job.id, mark_err);
                }

                if let Err(batch_err) = self
                    .db
                    .update_batch_job_status(payload.batch_job_id, BatchJobStatus::Failed, Some(&message))
                    .await
                {
                    error!(
                        "Failed to propagate failure onto batch job {}: {:#}",
                        payload.batch_job_id, batch_err
                    );
                }
            }
        }
    }

    /// The batch state machine: pending/processing -> completed |
    /// completed_with_errors | failed, with progress folded in after every
    /// chunk.
    async fn process_batch_job(&self, payload: &BatchProcessingPayload) -> Result<()> {
        let batch = self
            .db
            .get_batch_job(payload.batch_job_id)
            .await?
            .ok_or(BatchError::BatchNotFound(payload.batch_job_id))?;

        if batch.status == BatchJobStatus::Cancelled {
            info!("Batch job {} was cancelled before processing, skipping", batch.id);
            return Ok(());
        }

        let documents = self.db.get_batch_documents(batch.id).await?;
        if documents.is_empty() {
            return Err(BatchError::NoDocuments(batch.id).into());
        }

        self.db
            .update_batch_job_status(batch.id, BatchJobStatus::Processing, None)
            .await?;

        let user = self
            .db
            .get_user(payload.user_id)
            .await?
            .ok_or(BatchError::UserNotFound(payload.user_id))?;

        let api_key = if payload.ai_provider != "free" {
            self.db
                .get_ai_provider_credential(user.id, &payload.ai_provider)
                .await?
                .map(|credential| credential.api_key)
        } else {
            None
        };

        if let Some(template_id) = payload.template_id {
            if self.db.get_analysis_template(template_id).await?.is_none() {
                warn!(
                    "Template {} for batch job {} no longer exists",
                    template_id, batch.id
                );
            }
        }

        info!(
            "🚀 Starting batch processing for job {} ({} documents)",
            batch.id,
            documents.len()
        );

        let total = documents.len();

        // Retries are incremental: documents already completed keep their
        // results and seed the counters; only pending ones run again.
        let mut processed_count = documents
            .iter()
            .filter(|d| d.status == BatchDocumentStatus::Completed)
            .count();
        let mut failed_count = documents
            .iter()
            .filter(|d| d.status == BatchDocumentStatus::Failed)
            .count();
        let mut total_credits_used: i32 = documents
            .iter()
            .filter(|d| d.status == BatchDocumentStatus::Completed)
            .map(|d| d.credits_used)
            .sum();

        let pending: Vec<&BatchDocument> = documents
            .iter()
            .filter(|d| d.status == BatchDocumentStatus::Pending)
            .collect();

        for chunk in pending.chunks(self.max_concurrent_documents) {
            let outcomes = join_all(chunk.iter().map(|document| {
                self.process_document(
                    document,
                    user.id,
                    &payload.ai_provider,
                    &payload.ai_model,
                    &payload.analysis_type,
                    api_key.as_deref(),
                    payload.template_id,
                )
            }))
            .await;

            for (document, outcome) in chunk.iter().zip(outcomes) {
                match outcome {
                    Ok(credits_used) => {
                        total_credits_used += credits_used;
                        processed_count += 1;
                        info!("✅ Processed document: {}", document.original_file_name);
                    }
                    Err(e) => {
                        failed_count += 1;
                        let message = format!("{:#}", e);
                        error!(
                            "❌ Failed to process document {}: {}",
                            document.original_file_name, message
                        );
                        if let Err(update_err) = self
                            .db
                            .update_batch_document_status(
                                document.id,
                                BatchDocumentStatus::Failed,
                                Some(&message),
                            )
                            .await
                        {
                            error!(
                                "Failed to record failure for document {}: {:#}",
                                document.id, update_err
                            );
                        }
                    }
                }
            }

            self.db
                .update_batch_job_progress(
                    batch.id,
                    processed_count as i32,
                    failed_count as i32,
                    total_credits_used,
                    progress_percentage(processed_count, failed_count, total),
                )
                .await?;
        }

        if pending.is_empty() {
            // Nothing ran (e.g. a retry where every document had already
            // completed); still reconcile the persisted counters once.
            self.db
                .update_batch_job_progress(
                    batch.id,
                    processed_count as i32,
                    failed_count as i32,
                    total_credits_used,
                    progress_percentage(processed_count, failed_count, total),
                )
                .await?;
        }

        let final_status = final_batch_status(failed_count, total);
        self.db
            .update_batch_job_status(batch.id, final_status, None)
            .await?;

        info!(
            "🎉 Batch processing finished for {}: {} succeeded, {} failed ({})",
            batch.id, processed_count, failed_count, final_status
        );

        Ok(())
    }

    /// Process exactly one document to a terminal state. Staged-file cleanup
    /// runs on every exit path and never masks the primary outcome.
    async fn process_document(
        &self,
        document: &BatchDocument,
        user_id: Uuid,
        provider: &str,
        model: &str,
        analysis_type: &str,
        api_key: Option<&str>,
        template_id: Option<Uuid>,
    ) -> Result<i32> {
        let staging = document.staging();

        let result = self
            .analyze_staged_document(
                document,
                &staging,
                user_id,
                provider,
                model,
                analysis_type,
                api_key,
                template_id,
            )
            .await;

        if let Err(cleanup_err) = self.file_service.cleanup_staged_file(&staging).await {
            error!(
                "Failed to clean up staged file for document {}: {:#}",
                document.id, cleanup_err
            );
        }

        result
    }

    async fn analyze_staged_document(
        &self,
        document: &BatchDocument,
        staging: &BatchDocumentMetadata,
        user_id: Uuid,
        provider: &str,
        model: &str,
        analysis_type: &str,
        api_key: Option<&str>,
        template_id: Option<Uuid>,
    ) -> Result<i32> {
        self.db
            .update_batch_document_status(document.id, BatchDocumentStatus::Processing, None)
            .await?;

        let content = self.file_service.read_staged_text(staging).await?;
        info!(
            "Read staged file for {} ({} bytes)",
            document.original_file_name,
            content.len()
        );

        let credits_used = credits::estimate_credits(provider, model, analysis_type);

        let analysis = self
            .db
            .create_document_analysis(
                user_id,
                CreateDocumentAnalysis {
                    title: format!("Batch: {}", document.original_file_name),
                    content: content.clone(),
                    ai_provider: provider.to_string(),
                    ai_model: model.to_string(),
                    analysis_type: analysis_type.to_string(),
                    template_id,
                    credits_used,
                },
            )
            .await?;

        match self
            .analyzer
            .analyze(&content, analysis_type, provider, model, api_key, template_id)
            .await
        {
            Ok(result) => {
                let result_json = serde_json::to_value(&result)?;
                self.db
                    .update_document_analysis_result(
                        analysis.id,
                        result_json,
                        AnalysisStatus::Completed,
                    )
                    .await?;
                self.db
                    .complete_batch_document(document.id, analysis.id, credits_used)
                    .await?;

                // Credits were reserved at submission; this only reports how
                // many were consumed.
                Ok(credits_used)
            }
            Err(e) => {
                let error_payload = serde_json::json!({ "error": e.to_string() });
                self.db
                    .update_document_analysis_result(
                        analysis.id,
                        error_payload,
                        AnalysisStatus::Failed,
                    )
                    .await?;
                Err(e)
            }
        }
    }

    /// Re-admit a failed batch: failed documents go back to `pending`,
    /// completed ones keep their results, and a fresh queue job is enqueued
    /// at elevated priority.
    pub async fn retry_batch_job(&self, batch_job_id: Uuid) -> Result<QueueJob, BatchError> {
        let batch = self
            .db
            .get_batch_job(batch_job_id)
            .await?
            .ok_or(BatchError::BatchNotFound(batch_job_id))?;

        self.db
            .update_batch_job_status(batch_job_id, BatchJobStatus::Pending, None)
            .await?;

        let reset = self.db.reset_failed_batch_documents(batch_job_id).await?;

        let payload = JobPayload::BatchProcessing(BatchProcessingPayload {
            batch_job_id: batch.id,
            user_id: batch.user_id,
            ai_provider: batch.ai_provider.clone(),
            ai_model: batch.ai_model.clone(),
            analysis_type: batch.analysis_type.clone(),
            template_id: batch.template_id,
        });

        let job = self.db.enqueue(&payload, RETRY_PRIORITY).await?;

        info!(
            "🔄 Retry initiated for batch job {} ({} documents reset)",
            batch_job_id, reset
        );

        Ok(job)
    }

    /// Operational introspection for the status endpoint.
    pub fn get_status(&self) -> WorkerStatus {
        WorkerStatus {
            is_processing: self.is_processing.load(Ordering::SeqCst),
            polling_active: self.polling_active.load(Ordering::SeqCst),
            max_concurrent_documents: self.max_concurrent_documents,
            polling_interval_ms: self.polling_interval.as_millis() as u64,
        }
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }
}

/// Terminal status from the failure partition: all good -> completed, all
/// bad -> failed, anything in between -> completed_with_errors.
pub fn final_batch_status(failed: usize, total: usize) -> BatchJobStatus {
    if failed == 0 {
        BatchJobStatus::Completed
    } else if failed == total {
        BatchJobStatus::Failed
    } else {
        BatchJobStatus::CompletedWithErrors
    }
}

pub fn progress_percentage(processed: usize, failed: usize, total: usize) -> i32 {
    if total == 0 {
        return 100;
    }
    (((processed + failed) as f64 / total as f64) * 100.0).round() as i32
}
