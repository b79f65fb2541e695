//! Durable embedding job queue.
//!
//! Jobs are plain rows; workers claim one at a time with
//! `FOR UPDATE SKIP LOCKED` so concurrent workers never double-run a
//! job. A claim commits immediately, so a worker that dies mid-run
//! strands its job in `running`; `reclaim_stale` puts such rows back
//! in the queue once they have sat untouched past a threshold.
//! Execution is at-least-once: a claim bumps `attempts` before the
//! work happens.

use std::time::Duration;

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::schema::EmbedJob;

#[derive(Clone)]
pub struct EmbedJobRepository {
    pool: PgPool,
}

impl EmbedJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Queue an embedding run for a document.
    pub async fn enqueue(&self, document_id: Uuid) -> Result<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO embed_jobs (document_id, status) VALUES ($1, 'queued') RETURNING id",
        )
        .bind(document_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Claim the oldest queued job, if any, marking it running.
    pub async fn claim_next(&self) -> Result<Option<EmbedJob>> {
        let job = sqlx::query_as::<_, EmbedJob>(
            r#"
            UPDATE embed_jobs
            SET status = 'running', attempts = attempts + 1, updated_at = now()
            WHERE id = (
                SELECT id FROM embed_jobs
                WHERE status = 'queued'
                ORDER BY created_at
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id, document_id, status, attempts, last_error
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(job)
    }

    /// Requeue `running` jobs whose claim has gone untouched for longer
    /// than `older_than`. Returns how many rows were put back.
    pub async fn reclaim_stale(&self, older_than: Duration) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE embed_jobs
            SET status = 'queued', updated_at = now()
            WHERE status = 'running'
              AND updated_at < now() - make_interval(secs => $1)
            "#,
        )
        .bind(older_than.as_secs_f64())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn mark_done(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE embed_jobs SET status = 'done', updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Record a failed run; `requeue` puts the job back in the queue for
    /// another attempt, otherwise it is failed for good.
    pub async fn mark_failed(&self, id: Uuid, error: &str, requeue: bool) -> Result<()> {
        let status = if requeue { "queued" } else { "failed" };
        sqlx::query(
            "UPDATE embed_jobs SET status = $1, last_error = $2, updated_at = now() WHERE id = $3",
        )
        .bind(status)
        .bind(error)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
