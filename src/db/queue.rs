use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::errors::BatchError;
use crate::models::{JobPayload, QueueJob, QueueJobStatus};

const QUEUE_JOB_COLUMNS: &str = "id, job_type, job_data, priority, status, attempts, \
     max_attempts, scheduled_for, error_message, worker_id, created_at, started_at, completed_at";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueStats {
    pub pending_count: i64,
    pub processing_count: i64,
    pub retrying_count: i64,
    pub failed_count: i64,
    pub completed_today: i64,
    pub oldest_pending_minutes: Option<f64>,
}

impl Database {
    pub async fn create_queue_job(
        &self,
        job_type: &str,
        job_data: serde_json::Value,
        priority: i32,
    ) -> Result<QueueJob> {
        let job = sqlx::query_as::<_, QueueJob>(&format!(
            r#"
            INSERT INTO queue_jobs (job_type, job_data, priority)
            VALUES ($1, $2, $3)
            RETURNING {QUEUE_JOB_COLUMNS}
            "#
        ))
        .bind(job_type)
        .bind(job_data)
        .bind(priority)
        .fetch_one(&self.pool)
        .await?;

        Ok(job)
    }

    /// Typed enqueue for payloads this engine knows how to build.
    pub async fn enqueue(&self, payload: &JobPayload, priority: i32) -> Result<QueueJob> {
        self.create_queue_job(payload.job_type(), payload.job_data(), priority)
            .await
    }

    /// Claim the next eligible job: highest priority first, earliest schedule
    /// first, only jobs whose `scheduled_for` has passed.
    ///
    /// The claim is atomic at the storage layer (`FOR UPDATE SKIP LOCKED`
    /// plus a conditional update inside one transaction), so concurrent
    /// worker instances can never both own the same job.
    pub async fn claim_next_queue_job(&self, worker_id: &str) -> Result<Option<QueueJob>> {
        let mut tx = self.pool.begin().await?;

        let job_row = sqlx::query(
            r#"
            SELECT id
            FROM queue_jobs
            WHERE status IN ('pending', 'retrying')
              AND scheduled_for <= NOW()
            ORDER BY priority DESC, scheduled_for ASC, created_at ASC
            FOR UPDATE SKIP LOCKED
            LIMIT 1
            "#,
        )
        .fetch_optional(&mut *tx)
        .await?;

        let job_id: Uuid = match job_row {
            Some(row) => row.get("id"),
            None => {
                tx.rollback().await?;
                return Ok(None);
            }
        };

        let updated = sqlx::query(
            r#"
            UPDATE queue_jobs
            SET status = 'processing',
                started_at = NOW(),
                worker_id = $1,
                attempts = attempts + 1
            WHERE id = $2
              AND status IN ('pending', 'retrying')
            "#,
        )
        .bind(worker_id)
        .bind(job_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() != 1 {
            tx.rollback().await?;
            tracing::warn!("Queue job {} was claimed by another worker", job_id);
            return Ok(None);
        }

        let job = sqlx::query_as::<_, QueueJob>(&format!(
            r#"SELECT {QUEUE_JOB_COLUMNS} FROM queue_jobs WHERE id = $1"#
        ))
        .bind(job_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(job))
    }

    pub async fn mark_queue_job_completed(&self, id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE queue_jobs
            SET status = 'completed',
                completed_at = NOW(),
                error_message = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// A failed job stays failed until an operator re-admits it; the worker
    /// never retries on its own.
    pub async fn mark_queue_job_failed(&self, id: Uuid, error: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE queue_jobs
            SET status = 'failed',
                completed_at = NOW(),
                error_message = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Operator re-admission of a single failed job. The job moves to
    /// `retrying`, which the claim query treats like `pending`.
    pub async fn retry_failed_queue_job(&self, id: Uuid) -> Result<QueueJob> {
        let job = sqlx::query_as::<_, QueueJob>(&format!(
            r#"SELECT {QUEUE_JOB_COLUMNS} FROM queue_jobs WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(BatchError::QueueJobNotFound(id))?;

        if job.status != QueueJobStatus::Failed {
            return Err(BatchError::QueueJobNotRetryable {
                id,
                status: job.status.to_string(),
            }
            .into());
        }

        let job = sqlx::query_as::<_, QueueJob>(&format!(
            r#"
            UPDATE queue_jobs
            SET status = 'retrying',
                error_message = NULL,
                worker_id = NULL,
                started_at = NULL,
                completed_at = NULL,
                scheduled_for = NOW()
            WHERE id = $1
              AND status = 'failed'
            RETURNING {QUEUE_JOB_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(job)
    }

    pub async fn get_queue_job(&self, id: Uuid) -> Result<Option<QueueJob>> {
        let job = sqlx::query_as::<_, QueueJob>(&format!(
            r#"SELECT {QUEUE_JOB_COLUMNS} FROM queue_jobs WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(job)
    }

    pub async fn get_queue_jobs(
        &self,
        status: Option<QueueJobStatus>,
        limit: i64,
    ) -> Result<Vec<QueueJob>> {
        let jobs = match status {
            Some(status) => {
                sqlx::query_as::<_, QueueJob>(&format!(
                    r#"
                    SELECT {QUEUE_JOB_COLUMNS}
                    FROM queue_jobs
                    WHERE status = $1
                    ORDER BY created_at DESC
                    LIMIT $2
                    "#
                ))
                .bind(status.to_string())
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, QueueJob>(&format!(
                    r#"
                    SELECT {QUEUE_JOB_COLUMNS}
                    FROM queue_jobs
                    ORDER BY created_at DESC
                    LIMIT $1
                    "#
                ))
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(jobs)
    }

    pub async fn delete_queue_job(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM queue_jobs WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn get_queue_stats(&self) -> Result<QueueStats> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'pending') AS pending_count,
                COUNT(*) FILTER (WHERE status = 'processing') AS processing_count,
                COUNT(*) FILTER (WHERE status = 'retrying') AS retrying_count,
                COUNT(*) FILTER (WHERE status = 'failed') AS failed_count,
                COUNT(*) FILTER (WHERE status = 'completed'
                                   AND completed_at >= date_trunc('day', NOW())) AS completed_today,
                (EXTRACT(EPOCH FROM (NOW() - MIN(scheduled_for)
                                     FILTER (WHERE status = 'pending'))) / 60.0)::double precision
                    AS oldest_pending_minutes
            FROM queue_jobs
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(QueueStats {
            pending_count: row.get::<Option<i64>, _>("pending_count").unwrap_or(0),
            processing_count: row.get::<Option<i64>, _>("processing_count").unwrap_or(0),
            retrying_count: row.get::<Option<i64>, _>("retrying_count").unwrap_or(0),
            failed_count: row.get::<Option<i64>, _>("failed_count").unwrap_or(0),
            completed_today: row.get::<Option<i64>, _>("completed_today").unwrap_or(0),
            oldest_pending_minutes: row.get("oldest_pending_minutes"),
        })
    }
}
