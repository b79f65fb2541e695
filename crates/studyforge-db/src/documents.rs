//! Curriculum document repository.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbError, Result};
use crate::schema::{Document, DocumentStatus, NewDocument};

#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new document with status `processing`.
    ///
    /// `content` mirrors `raw_text` on insert; the original column pair
    /// is kept so search features can diverge the two later.
    pub async fn insert(&self, doc: &NewDocument) -> Result<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO documents
                (uploader_id, title, subject, grade_level, file_name,
                 file_path, raw_text, content, status)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$7,'processing')
            RETURNING id
            "#,
        )
        .bind(doc.uploader_id)
        .bind(&doc.title)
        .bind(&doc.subject)
        .bind(&doc.grade_level)
        .bind(&doc.file_name)
        .bind(&doc.file_path)
        .bind(&doc.raw_text)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Transition a document's lifecycle status, clearing any old error.
    pub async fn set_status(&self, id: Uuid, status: DocumentStatus) -> Result<()> {
        sqlx::query("UPDATE documents SET status = $1, error_message = NULL WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Mark a document failed with a human-readable message.
    pub async fn set_error(&self, id: Uuid, message: &str) -> Result<()> {
        sqlx::query("UPDATE documents SET status = 'error', error_message = $1 WHERE id = $2")
            .bind(message)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Load only the raw extracted text (embedding stage input).
    pub async fn raw_text(&self, id: Uuid) -> Result<Option<String>> {
        let text: Option<String> =
            sqlx::query_scalar("SELECT raw_text FROM documents WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(text)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Document> {
        sqlx::query_as::<_, Document>(
            r#"
            SELECT id, uploader_id, title, subject, grade_level, file_name,
                   file_path, status, error_message, created_at
            FROM documents WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("document {id}")))
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Document>> {
        let docs = sqlx::query_as::<_, Document>(
            r#"
            SELECT id, uploader_id, title, subject, grade_level, file_name,
                   file_path, status, error_message, created_at
            FROM documents
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(docs)
    }

    /// Documents currently in the given lifecycle status, oldest first.
    pub async fn list_by_status(&self, status: DocumentStatus) -> Result<Vec<Document>> {
        let docs = sqlx::query_as::<_, Document>(
            r#"
            SELECT id, uploader_id, title, subject, grade_level, file_name,
                   file_path, status, error_message, created_at
            FROM documents
            WHERE status = $1
            ORDER BY created_at
            "#,
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(docs)
    }

    /// Delete a document row (cascades to its chunks).
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("document {id}")));
        }
        Ok(())
    }

    /// `(status, count)` pairs for the analytics summary.
    pub async fn status_counts(&self) -> Result<Vec<(String, i64)>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM documents GROUP BY status")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }
}
