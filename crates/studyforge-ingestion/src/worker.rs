//! Embed-job worker.
//!
//! Pulls queued jobs one at a time and runs the embedding stage.
//! Because jobs are rows, the queue survives process restarts and a
//! failed run is retried until the attempt cap — at-least-once, made
//! safe by the chunk wipe + idempotent upserts in the pipeline. Each
//! tick first requeues jobs stranded in `running` by a dead worker,
//! so a crash between claim and completion never wedges a document.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, instrument, warn};

use crate::pipeline::IngestionPipeline;
use crate::store::JobStore;

pub struct EmbedWorker {
    pipeline: Arc<IngestionPipeline>,
    jobs: Arc<dyn JobStore>,
    poll_interval: Duration,
    max_attempts: i32,
    stale_after: Duration,
}

impl EmbedWorker {
    pub fn new(
        pipeline: Arc<IngestionPipeline>,
        jobs: Arc<dyn JobStore>,
        poll_interval: Duration,
        max_attempts: i32,
        stale_after: Duration,
    ) -> Self {
        Self {
            pipeline,
            jobs,
            poll_interval,
            max_attempts,
            stale_after,
        }
    }

    /// Run forever. When the queue is empty (or a tick errors) the
    /// worker sleeps for one poll interval; after a completed job it
    /// immediately looks for the next.
    pub async fn run(self) {
        info!(poll_ms = self.poll_interval.as_millis() as u64, "embed worker started");
        loop {
            match self.tick().await {
                Ok(true) => {}
                Ok(false) => tokio::time::sleep(self.poll_interval).await,
                Err(e) => {
                    warn!(error = %e, "worker tick failed");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }

    /// Claim and run at most one job. Returns whether a job was claimed.
    #[instrument(skip(self))]
    pub async fn tick(&self) -> Result<bool> {
        let reclaimed = self.jobs.reclaim_stale(self.stale_after).await?;
        if reclaimed > 0 {
            warn!(reclaimed, "requeued jobs stranded by a dead worker");
        }

        let Some(job) = self.jobs.claim_next().await? else {
            return Ok(false);
        };

        info!(
            job_id = %job.id,
            document_id = %job.document_id,
            attempt = job.attempts,
            "running embed job"
        );

        match self.pipeline.run_embedding(job.document_id).await {
            Ok(chunks) => {
                self.jobs.mark_done(job.id).await?;
                info!(job_id = %job.id, chunks, "embed job done");
            }
            Err(e) => {
                let requeue = job.attempts < self.max_attempts;
                warn!(job_id = %job.id, error = %e, requeue, "embed job failed");
                self.jobs.mark_failed(job.id, &e.to_string(), requeue).await?;
            }
        }
        Ok(true)
    }
}
