//! Bulk question-bank upload.

use axum::extract::State;
use axum::Json;
use serde_json::json;

use studyforge_db::questions::QuestionRepository;
use studyforge_ingestion::IngestError;

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::state::SharedState;

pub const MAX_QUESTIONS_PER_UPLOAD: usize = 1000;

/// Insert a JSON array of questions in one statement.
///
/// The handler checks only array shape and count; per-field coercion
/// happens inside the database via `jsonb_to_recordset`.
pub async fn bulk_upload(
    State(state): State<SharedState>,
    _user: AuthedUser,
    Json(questions): Json<Vec<serde_json::Value>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    validate_batch(questions.len())?;

    let inserted = QuestionRepository::new(state.db.clone())
        .bulk_insert(&serde_json::Value::Array(questions))
        .await?;

    Ok(Json(json!({ "inserted": inserted })))
}

fn validate_batch(count: usize) -> Result<(), IngestError> {
    if count == 0 {
        return Err(IngestError::Validation("question batch is empty".into()));
    }
    if count > MAX_QUESTIONS_PER_UPLOAD {
        return Err(IngestError::Validation(format!(
            "question batch has {count} items, maximum is {MAX_QUESTIONS_PER_UPLOAD}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_batch() {
        assert!(validate_batch(0).is_err());
    }

    #[test]
    fn rejects_oversized_batch() {
        assert!(validate_batch(MAX_QUESTIONS_PER_UPLOAD + 1).is_err());
    }

    #[test]
    fn accepts_boundary_sizes() {
        assert!(validate_batch(1).is_ok());
        assert!(validate_batch(MAX_QUESTIONS_PER_UPLOAD).is_ok());
    }
}
