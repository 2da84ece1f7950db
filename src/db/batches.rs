use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::errors::BatchError;
use crate::models::{
    BatchDocument, BatchDocumentStatus, BatchJob, BatchJobStatus, CreateBatchDocument,
    CreateBatchJob,
};

const BATCH_JOB_COLUMNS: &str = "id, user_id, name, description, analysis_type, ai_provider, \
     ai_model, template_id, status, total_documents, processed_documents, failed_documents, \
     total_credits_estimated, total_credits_used, error_message, metadata, created_at, \
     started_at, completed_at";

const BATCH_DOCUMENT_COLUMNS: &str = "id, batch_job_id, document_analysis_id, original_file_name, \
     file_size, mime_type, status, credits_used, error_message, sort_order, metadata, \
     created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchStatistics {
    pub total_batches: i64,
    pub pending: i64,
    pub processing: i64,
    pub completed: i64,
    pub completed_with_errors: i64,
    pub failed: i64,
    pub cancelled: i64,
    pub total_credits_used: i64,
}

impl Database {
    pub async fn create_batch_job(&self, user_id: Uuid, batch: CreateBatchJob) -> Result<BatchJob> {
        let job = sqlx::query_as::<_, BatchJob>(&format!(
            r#"
            INSERT INTO batch_jobs (
                user_id, name, description, analysis_type, ai_provider, ai_model,
                template_id, total_documents, total_credits_estimated
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {BATCH_JOB_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&batch.name)
        .bind(&batch.description)
        .bind(&batch.analysis_type)
        .bind(&batch.ai_provider)
        .bind(&batch.ai_model)
        .bind(batch.template_id)
        .bind(batch.total_documents)
        .bind(batch.total_credits_estimated)
        .fetch_one(&self.pool)
        .await?;

        Ok(job)
    }

    pub async fn get_batch_job(&self, id: Uuid) -> Result<Option<BatchJob>> {
        let job = sqlx::query_as::<_, BatchJob>(&format!(
            r#"SELECT {BATCH_JOB_COLUMNS} FROM batch_jobs WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(job)
    }

    pub async fn get_batch_job_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<BatchJob>> {
        let job = sqlx::query_as::<_, BatchJob>(&format!(
            r#"SELECT {BATCH_JOB_COLUMNS} FROM batch_jobs WHERE id = $1 AND user_id = $2"#
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(job)
    }

    pub async fn get_batch_jobs(&self, user_id: Uuid, limit: i64) -> Result<Vec<BatchJob>> {
        let jobs = sqlx::query_as::<_, BatchJob>(&format!(
            r#"
            SELECT {BATCH_JOB_COLUMNS}
            FROM batch_jobs
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(jobs)
    }

    pub async fn get_all_batch_jobs(&self, limit: i64, offset: i64) -> Result<Vec<BatchJob>> {
        let jobs = sqlx::query_as::<_, BatchJob>(&format!(
            r#"
            SELECT {BATCH_JOB_COLUMNS}
            FROM batch_jobs
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(jobs)
    }

    /// Status transition. `started_at` is stamped on the first move to
    /// `processing`; `completed_at` on any terminal status.
    pub async fn update_batch_job_status(
        &self,
        id: Uuid,
        status: BatchJobStatus,
        error_message: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE batch_jobs
            SET status = $2,
                error_message = $3,
                started_at = CASE WHEN $2 = 'processing' THEN COALESCE(started_at, NOW())
                                  ELSE started_at END,
                completed_at = CASE WHEN $2 IN ('completed', 'completed_with_errors', 'failed', 'cancelled')
                                    THEN NOW()
                                    ELSE NULL END
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status.to_string())
        .bind(error_message)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fold one chunk's outcomes into the aggregate. Counters only grow
    /// while a batch is processing, so the write is a plain overwrite.
    pub async fn update_batch_job_progress(
        &self,
        id: Uuid,
        processed_documents: i32,
        failed_documents: i32,
        total_credits_used: i32,
        progress_percentage: i32,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE batch_jobs
            SET processed_documents = $2,
                failed_documents = $3,
                total_credits_used = $4,
                metadata = metadata || jsonb_build_object('progressPercentage', $5::int)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(processed_documents)
        .bind(failed_documents)
        .bind(total_credits_used)
        .bind(progress_percentage)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Cancel a batch that has not started; its pending documents become
    /// `skipped`. The conditional update is the whole race-protection: once
    /// the worker flips the batch to `processing` this affects zero rows.
    pub async fn cancel_batch_job(&self, id: Uuid) -> Result<BatchJob> {
        let cancelled = sqlx::query_as::<_, BatchJob>(&format!(
            r#"
            UPDATE batch_jobs
            SET status = 'cancelled',
                completed_at = NOW()
            WHERE id = $1
              AND status = 'pending'
            RETURNING {BATCH_JOB_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match cancelled {
            Some(job) => {
                sqlx::query(
                    r#"
                    UPDATE batch_documents
                    SET status = 'skipped',
                        updated_at = NOW()
                    WHERE batch_job_id = $1
                      AND status = 'pending'
                    "#,
                )
                .bind(id)
                .execute(&self.pool)
                .await?;

                Ok(job)
            }
            None => {
                let job = self
                    .get_batch_job(id)
                    .await?
                    .ok_or(BatchError::BatchNotFound(id))?;
                Err(BatchError::BatchNotCancellable {
                    id,
                    status: job.status.to_string(),
                }
                .into())
            }
        }
    }

    pub async fn delete_batch_job(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM batch_jobs WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Aggregate counts by status, per user or global.
    pub async fn get_batch_statistics(&self, user_id: Option<Uuid>) -> Result<BatchStatistics> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_batches,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                COUNT(*) FILTER (WHERE status = 'processing') AS processing,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed,
                COUNT(*) FILTER (WHERE status = 'completed_with_errors') AS completed_with_errors,
                COUNT(*) FILTER (WHERE status = 'failed') AS failed,
                COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled,
                COALESCE(SUM(total_credits_used), 0)::bigint AS total_credits_used
            FROM batch_jobs
            WHERE $1::uuid IS NULL OR user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(BatchStatistics {
            total_batches: row.get::<Option<i64>, _>("total_batches").unwrap_or(0),
            pending: row.get::<Option<i64>, _>("pending").unwrap_or(0),
            processing: row.get::<Option<i64>, _>("processing").unwrap_or(0),
            completed: row.get::<Option<i64>, _>("completed").unwrap_or(0),
            completed_with_errors: row
                .get::<Option<i64>, _>("completed_with_errors")
                .unwrap_or(0),
            failed: row.get::<Option<i64>, _>("failed").unwrap_or(0),
            cancelled: row.get::<Option<i64>, _>("cancelled").unwrap_or(0),
            total_credits_used: row.get::<Option<i64>, _>("total_credits_used").unwrap_or(0),
        })
    }

    pub async fn create_batch_document(
        &self,
        document: CreateBatchDocument,
    ) -> Result<BatchDocument> {
        let metadata = serde_json::to_value(&document.metadata)?;

        let doc = sqlx::query_as::<_, BatchDocument>(&format!(
            r#"
            INSERT INTO batch_documents (
                batch_job_id, original_file_name, file_size, mime_type, sort_order, metadata
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {BATCH_DOCUMENT_COLUMNS}
            "#
        ))
        .bind(document.batch_job_id)
        .bind(&document.original_file_name)
        .bind(document.file_size)
        .bind(&document.mime_type)
        .bind(document.sort_order)
        .bind(metadata)
        .fetch_one(&self.pool)
        .await?;

        Ok(doc)
    }

    /// Documents of one batch in submission order, which is also the order
    /// the worker partitions them into chunks.
    pub async fn get_batch_documents(&self, batch_job_id: Uuid) -> Result<Vec<BatchDocument>> {
        let docs = sqlx::query_as::<_, BatchDocument>(&format!(
            r#"
            SELECT {BATCH_DOCUMENT_COLUMNS}
            FROM batch_documents
            WHERE batch_job_id = $1
            ORDER BY sort_order ASC
            "#
        ))
        .bind(batch_job_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(docs)
    }

    pub async fn update_batch_document_status(
        &self,
        id: Uuid,
        status: BatchDocumentStatus,
        error_message: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE batch_documents
            SET status = $2,
                error_message = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status.to_string())
        .bind(error_message)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Completion is a single write: the analysis link, the credits, and the
    /// terminal status land together, so `document_analysis_id` is never
    /// observable on a non-completed document.
    pub async fn complete_batch_document(
        &self,
        id: Uuid,
        document_analysis_id: Uuid,
        credits_used: i32,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE batch_documents
            SET status = 'completed',
                document_analysis_id = $2,
                credits_used = $3,
                error_message = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(document_analysis_id)
        .bind(credits_used)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Retry support: failed documents go back to `pending`, completed ones
    /// are left alone.
    pub async fn reset_failed_batch_documents(&self, batch_job_id: Uuid) -> Result<i64> {
        let result = sqlx::query(
            r#"
            UPDATE batch_documents
            SET status = 'pending',
                error_message = NULL,
                updated_at = NOW()
            WHERE batch_job_id = $1
              AND status = 'failed'
            "#,
        )
        .bind(batch_job_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() as i64)
    }
}
