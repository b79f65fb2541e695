//! API error type and HTTP status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use studyforge_db::DbError;
use studyforge_ingestion::IngestError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Ingest(IngestError::Auth(_)) => StatusCode::UNAUTHORIZED,
            ApiError::Ingest(IngestError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            // Failures of collaborators we call over the network
            ApiError::Ingest(IngestError::Upload(_))
            | ApiError::Ingest(IngestError::Extraction(_))
            | ApiError::Ingest(IngestError::Embedding(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Ingest(IngestError::Persistence(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Db(DbError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Db(DbError::Unsupported(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Db(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_expected_statuses() {
        let cases = [
            (IngestError::Auth("x".into()), StatusCode::UNAUTHORIZED),
            (IngestError::Validation("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (IngestError::Upload("x".into()), StatusCode::BAD_GATEWAY),
            (IngestError::Extraction("x".into()), StatusCode::BAD_GATEWAY),
            (IngestError::Persistence("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (IngestError::Embedding("x".into()), StatusCode::BAD_GATEWAY),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }
}
