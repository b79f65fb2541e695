//! Bearer-session authentication.
//!
//! Handlers take an [`AuthedUser`] argument; extraction resolves the
//! bearer token against the `sessions` table and rejects banned
//! accounts. There is no middleware layer — unauthenticated routes
//! simply do not ask for the extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use uuid::Uuid;

use studyforge_ingestion::IngestError;

use crate::error::ApiError;
use crate::state::SharedState;

/// The authenticated caller of the current request.
#[derive(Debug, Clone, Copy)]
pub struct AuthedUser {
    pub id: Uuid,
}

impl FromRequestParts<SharedState> for AuthedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    ApiError::Ingest(IngestError::Auth("missing bearer token".into()))
                })?;

        let row: Option<(Uuid, bool)> = sqlx::query_as(
            r#"
            SELECT s.user_id, p.banned
            FROM sessions s
            JOIN profiles p ON p.id = s.user_id
            WHERE s.token = $1 AND s.expires_at > now()
            "#,
        )
        .bind(bearer.token())
        .fetch_optional(&state.db)
        .await
        .map_err(|e| ApiError::Db(e.into()))?;

        match row {
            Some((id, false)) => Ok(AuthedUser { id }),
            Some((_, true)) => Err(ApiError::Ingest(IngestError::Auth(
                "account is banned".into(),
            ))),
            None => Err(ApiError::Ingest(IngestError::Auth(
                "invalid or expired session".into(),
            ))),
        }
    }
}
