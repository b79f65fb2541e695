//! Ingestion failure taxonomy.
//!
//! Upload/extraction/persistence failures surface synchronously to the
//! caller; embedding failures only ever show up on the document's
//! status field.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("not authenticated: {0}")]
    Auth(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("storage upload failed: {0}")]
    Upload(String),

    #[error("text extraction failed: {0}")]
    Extraction(String),

    #[error("database write failed: {0}")]
    Persistence(String),

    #[error("embedding failed: {0}")]
    Embedding(String),
}
