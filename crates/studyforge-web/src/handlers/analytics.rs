//! Dashboard analytics summary.

use axum::extract::State;
use axum::Json;
use serde_json::json;

use studyforge_db::documents::DocumentRepository;
use studyforge_db::flags::FlagRepository;
use studyforge_db::profiles::ProfileRepository;

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::state::SharedState;

/// One-shot summary for the admin dashboard: document pipeline
/// health, user role distribution, and open moderation load.
pub async fn summary(
    State(state): State<SharedState>,
    _user: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let documents = DocumentRepository::new(state.db.clone())
        .status_counts()
        .await?;
    let users = ProfileRepository::new(state.db.clone())
        .role_counts()
        .await?;
    let open_flags = FlagRepository::new(state.db.clone()).open_count().await?;

    Ok(Json(json!({
        "documents_by_status": counts_to_object(documents),
        "users_by_role": counts_to_object(users),
        "open_flags": open_flags,
    })))
}

fn counts_to_object(counts: Vec<(String, i64)>) -> serde_json::Value {
    serde_json::Value::Object(
        counts
            .into_iter()
            .map(|(key, n)| (key, serde_json::Value::from(n)))
            .collect(),
    )
}
