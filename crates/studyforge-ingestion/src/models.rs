//! Input and queue types for the ingestion pipeline.

use uuid::Uuid;

/// A file submitted for ingestion, plus its form metadata.
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub subject: String,
    pub grade: String,
    pub file_name: String,
    /// MIME type as reported by the client, if any.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// An embed job claimed from the queue by a worker.
#[derive(Debug, Clone)]
pub struct ClaimedJob {
    pub id: Uuid,
    pub document_id: Uuid,
    /// Attempt count including the current run.
    pub attempts: i32,
}
