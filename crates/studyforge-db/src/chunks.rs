//! Chunk repository.
//!
//! Chunks are immutable once written. The `(document_id, chunk_index)`
//! unique key plus `ON CONFLICT DO NOTHING` makes re-runs of the
//! embedding stage idempotent.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;

#[derive(Clone)]
pub struct ChunkRepository {
    pool: PgPool,
}

impl ChunkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one embedded chunk; a duplicate index for the same
    /// document is silently skipped.
    pub async fn upsert(
        &self,
        document_id: Uuid,
        chunk_index: i32,
        content: &str,
        embedding: &[f32],
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO document_chunks (document_id, chunk_index, content, embedding)
            VALUES ($1,$2,$3,$4)
            ON CONFLICT (document_id, chunk_index) DO NOTHING
            "#,
        )
        .bind(document_id)
        .bind(chunk_index)
        .bind(content)
        .bind(embedding)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Wipe all chunks for a document before an embedding re-run, so an
    /// aborted previous run never leaves a mixed set behind.
    pub async fn delete_for_document(&self, document_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM document_chunks WHERE document_id = $1")
            .bind(document_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_for_document(&self, document_id: Uuid) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM document_chunks WHERE document_id = $1")
                .bind(document_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
