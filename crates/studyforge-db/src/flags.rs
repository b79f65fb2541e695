//! Moderation flag repository.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbError, Result};
use crate::schema::Flag;

#[derive(Clone)]
pub struct FlagRepository {
    pool: PgPool,
}

impl FlagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_open(&self) -> Result<Vec<Flag>> {
        let flags = sqlx::query_as::<_, Flag>(
            r#"
            SELECT id, content_type, content_id, reason, status, created_at
            FROM flags
            WHERE status = 'open'
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(flags)
    }

    pub async fn open_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM flags WHERE status = 'open'")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Resolve a flag without touching the flagged content.
    pub async fn dismiss(&self, flag_id: Uuid, admin_id: Uuid) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE flags
            SET status = 'resolved', resolved_by = $2, resolved_at = now()
            WHERE id = $1 AND status = 'open'
            "#,
        )
        .bind(flag_id)
        .bind(admin_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("open flag {flag_id}")));
        }
        Ok(())
    }

    /// Delete the flagged content and resolve the flag in one
    /// transaction. Only question content is deletable at this layer.
    pub async fn delete_content(
        &self,
        flag_id: Uuid,
        content_type: &str,
        content_id: Uuid,
        admin_id: Uuid,
    ) -> Result<()> {
        if content_type != "question" {
            return Err(DbError::Unsupported(format!(
                "cannot delete content of type '{content_type}'"
            )));
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(content_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(
            r#"
            UPDATE flags
            SET status = 'resolved', resolved_by = $2, resolved_at = now()
            WHERE id = $1 AND status = 'open'
            "#,
        )
        .bind(flag_id)
        .bind(admin_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("open flag {flag_id}")));
        }

        tx.commit().await?;
        Ok(())
    }
}
