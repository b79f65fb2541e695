//! Row types shared by the repositories and the web layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a curriculum document.
///
/// Stored as TEXT; a document's chunk set is guaranteed complete only
/// at `EmbeddingComplete`. Every other status means chunks may be
/// partial or absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Processing,
    EmbeddingComplete,
    Error,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Processing => "processing",
            DocumentStatus::EmbeddingComplete => "embedding_complete",
            DocumentStatus::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(DocumentStatus::Pending),
            "processing" => Some(DocumentStatus::Processing),
            "embedding_complete" => Some(DocumentStatus::EmbeddingComplete),
            "error" => Some(DocumentStatus::Error),
            _ => None,
        }
    }
}

/// Fields for a new document row; the repository assigns id and status.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub uploader_id: Uuid,
    pub title: String,
    pub subject: String,
    pub grade_level: String,
    pub file_name: String,
    pub file_path: String,
    pub raw_text: String,
}

/// A curriculum document as listed by the API.
///
/// `raw_text` is deliberately not carried here; it can be megabytes and
/// only the embedding stage needs it (see `DocumentRepository::raw_text`).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Document {
    pub id: Uuid,
    pub uploader_id: Uuid,
    pub title: String,
    pub subject: String,
    pub grade_level: String,
    pub file_name: String,
    pub file_path: String,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A queued or running embedding job.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmbedJob {
    pub id: Uuid,
    pub document_id: Uuid,
    pub status: String,
    pub attempts: i32,
    pub last_error: Option<String>,
}

/// A platform user profile (admin user-management surface).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: String,
    pub banned: bool,
    pub created_at: DateTime<Utc>,
}

/// A moderation flag raised against a piece of content.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Flag {
    pub id: Uuid,
    pub content_type: String,
    pub content_id: Uuid,
    pub reason: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
