//! Curriculum document endpoints: upload, listing, status polling.

use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use studyforge_db::chunks::ChunkRepository;
use studyforge_db::documents::DocumentRepository;
use studyforge_db::DbError;
use studyforge_ingestion::models::NewUpload;
use studyforge_ingestion::IngestError;

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::state::{AppEvent, SharedState};

/// Accept a multipart curriculum upload and run the synchronous phase
/// of the ingestion pipeline. Responds once the document row exists;
/// embedding continues in the background worker.
pub async fn ingest_document(
    State(state): State<SharedState>,
    user: AuthedUser,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let upload = parse_upload(multipart).await?;
    let title = format!("{} - {}", upload.subject, upload.grade);

    let document_id = state.pipeline.ingest(user.id, upload).await?;

    // Best-effort; nobody listening is fine.
    let _ = state.event_tx.send(AppEvent::DocumentIngested {
        document_id: document_id.to_string(),
        title,
    });

    Ok(Json(json!({ "document_id": document_id })))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

pub async fn list_documents(
    State(state): State<SharedState>,
    _user: AuthedUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<studyforge_db::Document>>, ApiError> {
    let limit = params.limit.clamp(1, 200);
    let docs = DocumentRepository::new(state.db.clone())
        .list(limit, params.offset.max(0))
        .await?;
    Ok(Json(docs))
}

/// Document detail with its embedded chunk count — the polling surface
/// for the detached embed stage.
pub async fn get_document(
    State(state): State<SharedState>,
    _user: AuthedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let doc = DocumentRepository::new(state.db.clone())
        .find_by_id(id)
        .await?;
    let chunk_count = ChunkRepository::new(state.db.clone())
        .count_for_document(id)
        .await?;

    let mut body = serde_json::to_value(&doc).map_err(DbError::from)?;
    body["chunk_count"] = chunk_count.into();
    Ok(Json(body))
}

/// Remove a document; its chunks go with it via the FK cascade. The
/// stored PDF is left behind for audit.
pub async fn delete_document(
    State(state): State<SharedState>,
    admin: AuthedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    DocumentRepository::new(state.db.clone()).delete(id).await?;
    tracing::info!(document_id = %id, by = %admin.id, "document deleted");
    Ok(Json(json!({ "deleted": id })))
}

/// Pull the subject/grade/file fields out of a multipart form.
async fn parse_upload(mut multipart: Multipart) -> Result<NewUpload, ApiError> {
    let mut subject = None;
    let mut grade = None;
    let mut file_name = None;
    let mut content_type = None;
    let mut bytes = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| IngestError::Validation(format!("malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("subject") => {
                subject = Some(field.text().await.map_err(bad_field)?);
            }
            Some("grade") => {
                grade = Some(field.text().await.map_err(bad_field)?);
            }
            Some("file") => {
                file_name = field.file_name().map(str::to_owned);
                content_type = field.content_type().map(str::to_owned);
                bytes = Some(field.bytes().await.map_err(bad_field)?.to_vec());
            }
            _ => {}
        }
    }

    let missing = |name: &str| IngestError::Validation(format!("missing field '{name}'"));

    Ok(NewUpload {
        subject: subject.ok_or_else(|| missing("subject"))?,
        grade: grade.ok_or_else(|| missing("grade"))?,
        file_name: file_name.unwrap_or_default(),
        content_type,
        bytes: bytes.ok_or_else(|| missing("file"))?,
    })
}

fn bad_field(e: axum::extract::multipart::MultipartError) -> IngestError {
    IngestError::Validation(format!("unreadable multipart field: {e}"))
}
