//! Moderation queue endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use studyforge_db::flags::FlagRepository;
use studyforge_db::Flag;

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::state::{AppEvent, SharedState};

pub async fn list_flags(
    State(state): State<SharedState>,
    _user: AuthedUser,
) -> Result<Json<Vec<Flag>>, ApiError> {
    let flags = FlagRepository::new(state.db.clone()).list_open().await?;
    Ok(Json(flags))
}

/// Resolve a flag, leaving the flagged content in place.
pub async fn dismiss_flag(
    State(state): State<SharedState>,
    admin: AuthedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    FlagRepository::new(state.db.clone())
        .dismiss(id, admin.id)
        .await?;
    Ok(Json(json!({ "dismissed": id })))
}

#[derive(Debug, Deserialize)]
pub struct DeleteContentRequest {
    pub content_type: String,
    pub content_id: Uuid,
}

/// Delete the flagged content and resolve the flag atomically.
pub async fn delete_flagged_content(
    State(state): State<SharedState>,
    admin: AuthedUser,
    Path(id): Path<Uuid>,
    Json(req): Json<DeleteContentRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    FlagRepository::new(state.db.clone())
        .delete_content(id, &req.content_type, req.content_id, admin.id)
        .await?;

    let _ = state.event_tx.send(AppEvent::Notification {
        level: "info".into(),
        message: format!("flagged {} {} deleted", req.content_type, req.content_id),
    });

    Ok(Json(json!({ "deleted": req.content_id })))
}
