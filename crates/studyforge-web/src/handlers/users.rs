//! Admin user-management endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use studyforge_db::profiles::ProfileRepository;
use studyforge_db::Profile;

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub search: String,
    pub role: Option<String>,
}

pub async fn search_users(
    State(state): State<SharedState>,
    _user: AuthedUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Profile>>, ApiError> {
    // "all" is what the UI sends for an unset role dropdown
    let role = params
        .role
        .as_deref()
        .filter(|r| !r.is_empty() && *r != "all");

    let profiles = ProfileRepository::new(state.db.clone())
        .search(&params.search, role)
        .await?;
    Ok(Json(profiles))
}

pub async fn ban_user(
    State(state): State<SharedState>,
    admin: AuthedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    ProfileRepository::new(state.db.clone()).ban(id).await?;
    tracing::info!(banned = %id, by = %admin.id, "user banned");
    Ok(Json(json!({ "banned": id })))
}
