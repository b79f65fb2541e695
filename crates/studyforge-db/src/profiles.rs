//! User profile repository (admin user-management surface).

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbError, Result};
use crate::schema::Profile;

#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Substring search over name and email, with an optional role filter.
    /// A `None` role means "all roles".
    pub async fn search(&self, term: &str, role: Option<&str>) -> Result<Vec<Profile>> {
        let pattern = format!("%{}%", term.trim());
        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, email, full_name, role, banned, created_at
            FROM profiles
            WHERE (full_name ILIKE $1 OR email ILIKE $1)
              AND ($2::text IS NULL OR role = $2)
            ORDER BY created_at DESC
            LIMIT 100
            "#,
        )
        .bind(&pattern)
        .bind(role)
        .fetch_all(&self.pool)
        .await?;
        Ok(profiles)
    }

    /// Ban a user. Banned users keep their rows; the auth layer rejects
    /// their sessions.
    pub async fn ban(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("UPDATE profiles SET banned = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("profile {id}")));
        }
        Ok(())
    }

    /// `(role, count)` pairs for the analytics summary.
    pub async fn role_counts(&self) -> Result<Vec<(String, i64)>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT role, COUNT(*) FROM profiles GROUP BY role")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }
}
