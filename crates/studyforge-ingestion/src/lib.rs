//! studyforge-ingestion — the curriculum document ingestion pipeline.
//!
//! Flow for one upload:
//!   1. Validate subject/grade/file
//!   2. Upload the PDF to object storage (sanitized, namespaced path)
//!   3. Extract plain text (remote function, or local lopdf fallback)
//!   4. Insert the document row (status `processing`)
//!   5. Enqueue a durable embed job; a worker chunks the text, calls the
//!      embedding model per chunk, and flips the document to
//!      `embedding_complete` (or `error`)
//!
//! All collaborators (storage, extractor, embedder, stores) are trait
//! objects injected into [`pipeline::IngestionPipeline`], so tests run
//! against in-memory fakes.

pub mod chunker;
pub mod embedding;
pub mod error;
pub mod extractor;
pub mod models;
pub mod pipeline;
pub mod storage;
pub mod store;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use error::IngestError;
pub use pipeline::{IngestionPipeline, PipelineConfig};
pub use worker::EmbedWorker;
