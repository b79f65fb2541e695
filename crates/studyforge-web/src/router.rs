//! Axum router — maps all URL paths to handlers.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{
    analytics::summary,
    documents::{delete_document, get_document, ingest_document, list_documents},
    moderation::{delete_flagged_content, dismiss_flag, list_flags},
    questions::bulk_upload,
    users::{ban_user, search_users},
};
use crate::sse::sse_handler;
use crate::state::{AppState, SharedState};

/// Room for the configured upload ceiling plus multipart overhead.
const BODY_LIMIT: usize = 55 * 1024 * 1024;

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Documents
        .route("/api/documents", post(ingest_document).get(list_documents))
        .route("/api/documents/{id}", get(get_document).delete(delete_document))

        // Question bank
        .route("/api/questions/bulk", post(bulk_upload))

        // User management
        .route("/api/users", get(search_users))
        .route("/api/users/{id}/ban", post(ban_user))

        // Moderation
        .route("/api/moderation/flags", get(list_flags))
        .route("/api/moderation/flags/{id}/dismiss", post(dismiss_flag))
        .route("/api/moderation/flags/{id}/delete-content", post(delete_flagged_content))

        // Analytics
        .route("/api/analytics/summary", get(summary))

        // SSE streaming
        .route("/api/events", get(sse_handler))

        // Middleware
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
