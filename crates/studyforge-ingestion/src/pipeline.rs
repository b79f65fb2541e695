//! Ingestion orchestrator.
//!
//! `ingest` is the synchronous phase: validate, upload, extract,
//! persist, enqueue. The caller blocks until the document row commits;
//! the embedding stage runs later under the worker. Upload and
//! extraction failures compensate by deleting the stored object so a
//! failed ingest leaves nothing behind.
//!
//! `run_embedding` is the detached phase: wipe any leftover chunks,
//! re-chunk the raw text, embed one chunk at a time, persist each as it
//! succeeds, then flip the document status. A single chunk failure
//! aborts the whole stage with the document marked `error`.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use studyforge_db::{DocumentStatus, NewDocument};

use crate::chunker::{chunk_text, MIN_CHUNK_CHARS};
use crate::embedding::Embedder;
use crate::error::IngestError;
use crate::extractor::TextExtractor;
use crate::models::NewUpload;
use crate::storage::{object_path, ObjectStorage};
use crate::store::{ChunkStore, DocumentStore, JobStore};

const MAX_FIELD_CHARS: usize = 128;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub max_upload_bytes: usize,
    pub min_chunk_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 50 * 1024 * 1024,
            min_chunk_chars: MIN_CHUNK_CHARS,
        }
    }
}

pub struct IngestionPipeline {
    storage: Arc<dyn ObjectStorage>,
    extractor: Arc<dyn TextExtractor>,
    embedder: Arc<dyn Embedder>,
    documents: Arc<dyn DocumentStore>,
    chunks: Arc<dyn ChunkStore>,
    jobs: Arc<dyn JobStore>,
    cfg: PipelineConfig,
}

impl IngestionPipeline {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        extractor: Arc<dyn TextExtractor>,
        embedder: Arc<dyn Embedder>,
        documents: Arc<dyn DocumentStore>,
        chunks: Arc<dyn ChunkStore>,
        jobs: Arc<dyn JobStore>,
        cfg: PipelineConfig,
    ) -> Self {
        Self {
            storage,
            extractor,
            embedder,
            documents,
            chunks,
            jobs,
            cfg,
        }
    }

    /// Synchronous ingestion phase. Returns the new document id once
    /// the row has committed; embedding happens later.
    ///
    /// Not idempotent: the same file ingested twice makes two documents.
    #[instrument(skip(self, upload), fields(uploader = %uploader_id, file = %upload.file_name))]
    pub async fn ingest(
        &self,
        uploader_id: Uuid,
        upload: NewUpload,
    ) -> Result<Uuid, IngestError> {
        validate_upload(&upload, self.cfg.max_upload_bytes)?;

        let path = object_path(uploader_id, Utc::now().timestamp_millis(), &upload.file_name);

        self.storage
            .upload(&path, &upload.bytes, "application/pdf")
            .await
            .map_err(|e| IngestError::Upload(e.to_string()))?;

        let text = match self.extractor.extract(&path).await {
            Ok(t) => t,
            Err(e) => {
                self.remove_uploaded(&path).await;
                return Err(IngestError::Extraction(e.to_string()));
            }
        };

        let doc = NewDocument {
            uploader_id,
            title: format!("{} - {}", upload.subject, upload.grade),
            subject: upload.subject,
            grade_level: upload.grade,
            file_name: upload.file_name,
            file_path: path.clone(),
            raw_text: strip_nul(&text),
        };

        let document_id = match self.documents.insert(&doc).await {
            Ok(id) => id,
            Err(e) => {
                self.remove_uploaded(&path).await;
                return Err(IngestError::Persistence(e.to_string()));
            }
        };

        // The caller already has a committed document; a scheduling
        // failure must not fail the ingest, only surface on the status.
        if let Err(e) = self.jobs.enqueue(document_id).await {
            warn!(document_id = %document_id, error = %e, "could not enqueue embed job");
            let _ = self
                .documents
                .set_error(document_id, "embedding could not be scheduled")
                .await;
        }

        info!(document_id = %document_id, path = %path, "document ingested");
        Ok(document_id)
    }

    /// Detached embedding phase, run by the worker.
    ///
    /// Returns the number of chunks embedded. Previous partial chunk
    /// sets are wiped first so a retry can never mix output from two
    /// runs.
    #[instrument(skip(self))]
    pub async fn run_embedding(&self, document_id: Uuid) -> Result<usize, IngestError> {
        self.documents
            .set_status(document_id, DocumentStatus::Processing)
            .await
            .map_err(|e| IngestError::Persistence(e.to_string()))?;

        let raw = self
            .documents
            .raw_text(document_id)
            .await
            .map_err(|e| IngestError::Persistence(e.to_string()))?
            .ok_or_else(|| IngestError::Embedding(format!("document {document_id} not found")))?;

        let wiped = self
            .chunks
            .delete_for_document(document_id)
            .await
            .map_err(|e| IngestError::Persistence(e.to_string()))?;
        if wiped > 0 {
            info!(document_id = %document_id, wiped, "removed chunks from an aborted run");
        }

        let mut embedded = 0usize;
        for (index, chunk) in chunk_text(&raw, self.cfg.min_chunk_chars).enumerate() {
            let vector = match self.embedder.embed(chunk).await {
                Ok(v) => v,
                Err(e) => {
                    let msg = format!("chunk {index}: {e}");
                    return Err(self.fail_embedding(document_id, msg).await);
                }
            };

            if let Err(e) = self
                .chunks
                .upsert(document_id, index as i32, chunk, &vector)
                .await
            {
                let msg = format!("chunk {index} insert: {e}");
                return Err(self.fail_embedding(document_id, msg).await);
            }
            embedded += 1;
        }

        self.documents
            .set_status(document_id, DocumentStatus::EmbeddingComplete)
            .await
            .map_err(|e| IngestError::Persistence(e.to_string()))?;

        info!(document_id = %document_id, embedded, "embedding complete");
        Ok(embedded)
    }

    async fn fail_embedding(&self, document_id: Uuid, message: String) -> IngestError {
        warn!(document_id = %document_id, %message, "embedding stage aborted");
        if let Err(e) = self.documents.set_error(document_id, &message).await {
            warn!(document_id = %document_id, error = %e, "could not record embedding failure");
        }
        IngestError::Embedding(message)
    }

    async fn remove_uploaded(&self, path: &str) {
        if let Err(e) = self.storage.delete(path).await {
            warn!(path, error = %e, "compensating delete failed, object may be orphaned");
        }
    }
}

/// Reject malformed uploads before any side effect happens.
fn validate_upload(upload: &NewUpload, max_bytes: usize) -> Result<(), IngestError> {
    if upload.subject.trim().is_empty() {
        return Err(IngestError::Validation("subject is required".into()));
    }
    if upload.grade.trim().is_empty() {
        return Err(IngestError::Validation("grade is required".into()));
    }
    if upload.subject.chars().count() > MAX_FIELD_CHARS
        || upload.grade.chars().count() > MAX_FIELD_CHARS
    {
        return Err(IngestError::Validation(format!(
            "subject and grade must be at most {MAX_FIELD_CHARS} characters"
        )));
    }
    if upload.bytes.is_empty() {
        return Err(IngestError::Validation("file is required".into()));
    }
    if upload.bytes.len() > max_bytes {
        return Err(IngestError::Validation(format!(
            "file exceeds the {} MB upload limit",
            max_bytes / (1024 * 1024)
        )));
    }
    let is_pdf = upload.content_type.as_deref() == Some("application/pdf")
        || upload.bytes.starts_with(b"%PDF");
    if !is_pdf {
        return Err(IngestError::Validation("file must be a PDF".into()));
    }
    Ok(())
}

/// Postgres TEXT cannot hold NUL bytes; extracted PDFs sometimes do.
fn strip_nul(text: &str) -> String {
    if text.contains('\u{0}') {
        text.replace('\u{0}', "")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    const LONG_PARA: &str =
        "This paragraph is comfortably longer than the fifty character minimum used by the chunker.";

    fn pdf_upload() -> NewUpload {
        NewUpload {
            subject: "Mathematics".into(),
            grade: "Grade 7".into(),
            file_name: "maths g7.pdf".into(),
            content_type: Some("application/pdf".into()),
            bytes: b"%PDF-1.4 fake".to_vec(),
        }
    }

    fn pipeline(world: &FakeWorld) -> IngestionPipeline {
        IngestionPipeline::new(
            world.storage.clone(),
            world.extractor.clone(),
            world.embedder.clone(),
            world.documents.clone(),
            world.chunks.clone(),
            world.jobs.clone(),
            PipelineConfig::default(),
        )
    }

    #[tokio::test]
    async fn happy_path_persists_and_enqueues() {
        let world = FakeWorld::new();
        world.extractor.set_text(format!("{LONG_PARA}\n\n{LONG_PARA}"));

        let id = pipeline(&world).ingest(Uuid::new_v4(), pdf_upload()).await.unwrap();

        assert_eq!(world.storage.uploads().len(), 1);
        assert!(world.storage.deletes().is_empty());
        let doc = world.documents.get(id).unwrap();
        assert_eq!(doc.status, DocumentStatus::Processing);
        assert_eq!(doc.title, "Mathematics - Grade 7");
        assert!(doc.file_path.contains("maths_g7.pdf"));
        assert_eq!(world.jobs.enqueued(), vec![id]);
    }

    #[tokio::test]
    async fn extraction_failure_deletes_the_upload_and_writes_no_row() {
        let world = FakeWorld::new();
        world.extractor.fail();

        let err = pipeline(&world)
            .ingest(Uuid::new_v4(), pdf_upload())
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::Extraction(_)));
        let uploads = world.storage.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(world.storage.deletes(), uploads);
        assert_eq!(world.documents.len(), 0);
        assert!(world.jobs.enqueued().is_empty());
    }

    #[tokio::test]
    async fn persistence_failure_deletes_the_upload() {
        let world = FakeWorld::new();
        world.extractor.set_text(LONG_PARA.to_string());
        world.documents.fail_insert();

        let err = pipeline(&world)
            .ingest(Uuid::new_v4(), pdf_upload())
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::Persistence(_)));
        assert_eq!(world.storage.deletes(), world.storage.uploads());
    }

    #[tokio::test]
    async fn enqueue_failure_marks_the_document_errored_but_ingest_succeeds() {
        let world = FakeWorld::new();
        world.extractor.set_text(LONG_PARA.to_string());
        world.jobs.fail_enqueue();

        let id = pipeline(&world).ingest(Uuid::new_v4(), pdf_upload()).await.unwrap();

        let doc = world.documents.get(id).unwrap();
        assert_eq!(doc.status, DocumentStatus::Error);
        assert!(doc.error_message.as_deref().unwrap().contains("scheduled"));
    }

    #[tokio::test]
    async fn rejects_non_pdf_and_oversize_and_empty_fields() {
        let world = FakeWorld::new();
        let p = pipeline(&world);
        let user = Uuid::new_v4();

        let mut u = pdf_upload();
        u.subject = "  ".into();
        assert!(matches!(
            p.ingest(user, u).await.unwrap_err(),
            IngestError::Validation(_)
        ));

        let mut u = pdf_upload();
        u.content_type = Some("text/plain".into());
        u.bytes = b"hello".to_vec();
        assert!(matches!(
            p.ingest(user, u).await.unwrap_err(),
            IngestError::Validation(_)
        ));

        let mut u = pdf_upload();
        u.bytes = vec![b'%'; 51 * 1024 * 1024];
        assert!(matches!(
            p.ingest(user, u).await.unwrap_err(),
            IngestError::Validation(_)
        ));

        // No side effects from any rejected upload.
        assert!(world.storage.uploads().is_empty());
        assert_eq!(world.documents.len(), 0);
    }

    #[tokio::test]
    async fn field_bounds_count_characters_not_bytes() {
        let world = FakeWorld::new();
        world.extractor.set_text(LONG_PARA.to_string());
        let p = pipeline(&world);

        // 128 accented chars is 256 bytes but still within the bound.
        let mut u = pdf_upload();
        u.subject = "é".repeat(128);
        assert!(p.ingest(Uuid::new_v4(), u).await.is_ok());

        let mut u = pdf_upload();
        u.subject = "é".repeat(129);
        assert!(matches!(
            p.ingest(Uuid::new_v4(), u).await.unwrap_err(),
            IngestError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn embedding_success_stores_chunks_and_completes() {
        let world = FakeWorld::new();
        let id = world
            .documents
            .seed(format!("{LONG_PARA}\n\nshort\n\n{LONG_PARA}"));

        let n = pipeline(&world).run_embedding(id).await.unwrap();

        assert_eq!(n, 2); // the short middle paragraph is dropped
        assert_eq!(world.chunks.for_document(id).len(), 2);
        assert_eq!(
            world.documents.get(id).unwrap().status,
            DocumentStatus::EmbeddingComplete
        );
    }

    #[tokio::test]
    async fn embedding_failure_sets_error_status_with_message() {
        let world = FakeWorld::new();
        let id = world
            .documents
            .seed(format!("{LONG_PARA}\n\n{LONG_PARA}\n\n{LONG_PARA}"));
        world.embedder.fail_after(1);

        let err = pipeline(&world).run_embedding(id).await.unwrap_err();

        assert!(matches!(err, IngestError::Embedding(_)));
        let doc = world.documents.get(id).unwrap();
        assert_eq!(doc.status, DocumentStatus::Error);
        assert!(!doc.error_message.as_deref().unwrap().is_empty());
        // Chunks processed before the failure are left in place; the
        // next run wipes them first.
        assert_eq!(world.chunks.for_document(id).len(), 1);
    }

    #[tokio::test]
    async fn retry_wipes_leftover_chunks_before_re_embedding() {
        let world = FakeWorld::new();
        let id = world
            .documents
            .seed(format!("{LONG_PARA}\n\n{LONG_PARA}"));
        world.embedder.fail_after(1);

        let p = pipeline(&world);
        assert!(p.run_embedding(id).await.is_err());
        assert_eq!(world.chunks.for_document(id).len(), 1);

        world.embedder.succeed();
        let n = p.run_embedding(id).await.unwrap();

        assert_eq!(n, 2);
        assert_eq!(world.chunks.for_document(id).len(), 2);
        assert_eq!(world.chunks.wipes_for(id), 2); // one per run, first was a no-op
        assert_eq!(
            world.documents.get(id).unwrap().status,
            DocumentStatus::EmbeddingComplete
        );
    }

    #[test]
    fn strip_nul_removes_embedded_nuls() {
        assert_eq!(strip_nul("a\u{0}b"), "ab");
        assert_eq!(strip_nul("clean"), "clean");
    }
}
