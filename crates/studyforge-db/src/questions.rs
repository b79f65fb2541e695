//! Question bank repository.

use sqlx::PgPool;

use crate::error::Result;

#[derive(Clone)]
pub struct QuestionRepository {
    pool: PgPool,
}

impl QuestionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Bulk-insert questions from a JSON array in a single statement.
    ///
    /// The caller only validates array shape and count; field handling
    /// happens here via `jsonb_to_recordset`, the same division of
    /// labour the platform's original bulk-insert procedure had.
    pub async fn bulk_insert(&self, questions: &serde_json::Value) -> Result<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO questions (subject, grade_level, question_text, options, correct_answer)
            SELECT q.subject, q.grade_level, q.question_text, q.options, q.correct_answer
            FROM jsonb_to_recordset($1::jsonb) AS q(
                subject        text,
                grade_level    text,
                question_text  text,
                options        jsonb,
                correct_answer text
            )
            "#,
        )
        .bind(questions)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
