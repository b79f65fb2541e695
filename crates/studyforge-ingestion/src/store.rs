//! Persistence seams for the pipeline.
//!
//! The orchestrator only sees these traits; production wires them to
//! the Postgres repositories in `studyforge-db`, tests wire them to
//! in-memory fakes.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use studyforge_db::chunks::ChunkRepository;
use studyforge_db::documents::DocumentRepository;
use studyforge_db::jobs::EmbedJobRepository;
use studyforge_db::{DocumentStatus, NewDocument};

use crate::models::ClaimedJob;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, doc: &NewDocument) -> Result<Uuid>;
    async fn set_status(&self, id: Uuid, status: DocumentStatus) -> Result<()>;
    async fn set_error(&self, id: Uuid, message: &str) -> Result<()>;
    async fn raw_text(&self, id: Uuid) -> Result<Option<String>>;
}

#[async_trait]
pub trait ChunkStore: Send + Sync {
    async fn upsert(
        &self,
        document_id: Uuid,
        chunk_index: i32,
        content: &str,
        embedding: &[f32],
    ) -> Result<()>;
    async fn delete_for_document(&self, document_id: Uuid) -> Result<u64>;
}

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn enqueue(&self, document_id: Uuid) -> Result<Uuid>;
    async fn claim_next(&self) -> Result<Option<ClaimedJob>>;
    /// Requeue running jobs abandoned by a dead worker; returns the count.
    async fn reclaim_stale(&self, older_than: Duration) -> Result<u64>;
    async fn mark_done(&self, id: Uuid) -> Result<()>;
    async fn mark_failed(&self, id: Uuid, error: &str, requeue: bool) -> Result<()>;
}

// ── Postgres adapters ────────────────────────────────────────────────────────

#[async_trait]
impl DocumentStore for DocumentRepository {
    async fn insert(&self, doc: &NewDocument) -> Result<Uuid> {
        Ok(DocumentRepository::insert(self, doc).await?)
    }

    async fn set_status(&self, id: Uuid, status: DocumentStatus) -> Result<()> {
        Ok(DocumentRepository::set_status(self, id, status).await?)
    }

    async fn set_error(&self, id: Uuid, message: &str) -> Result<()> {
        Ok(DocumentRepository::set_error(self, id, message).await?)
    }

    async fn raw_text(&self, id: Uuid) -> Result<Option<String>> {
        Ok(DocumentRepository::raw_text(self, id).await?)
    }
}

#[async_trait]
impl ChunkStore for ChunkRepository {
    async fn upsert(
        &self,
        document_id: Uuid,
        chunk_index: i32,
        content: &str,
        embedding: &[f32],
    ) -> Result<()> {
        Ok(ChunkRepository::upsert(self, document_id, chunk_index, content, embedding).await?)
    }

    async fn delete_for_document(&self, document_id: Uuid) -> Result<u64> {
        Ok(ChunkRepository::delete_for_document(self, document_id).await?)
    }
}

#[async_trait]
impl JobStore for EmbedJobRepository {
    async fn enqueue(&self, document_id: Uuid) -> Result<Uuid> {
        Ok(EmbedJobRepository::enqueue(self, document_id).await?)
    }

    async fn claim_next(&self) -> Result<Option<ClaimedJob>> {
        let job = EmbedJobRepository::claim_next(self).await?;
        Ok(job.map(|j| ClaimedJob {
            id: j.id,
            document_id: j.document_id,
            attempts: j.attempts,
        }))
    }

    async fn reclaim_stale(&self, older_than: Duration) -> Result<u64> {
        Ok(EmbedJobRepository::reclaim_stale(self, older_than).await?)
    }

    async fn mark_done(&self, id: Uuid) -> Result<()> {
        Ok(EmbedJobRepository::mark_done(self, id).await?)
    }

    async fn mark_failed(&self, id: Uuid, error: &str, requeue: bool) -> Result<()> {
        Ok(EmbedJobRepository::mark_failed(self, id, error, requeue).await?)
    }
}
