//! In-memory fakes for the pipeline's trait seams, shared by the
//! pipeline and worker tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use studyforge_db::{DocumentStatus, NewDocument};

use crate::embedding::Embedder;
use crate::extractor::TextExtractor;
use crate::models::ClaimedJob;
use crate::storage::ObjectStorage;
use crate::store::{ChunkStore, DocumentStore, JobStore};

pub struct FakeWorld {
    pub storage: Arc<FakeStorage>,
    pub extractor: Arc<FakeExtractor>,
    pub embedder: Arc<FakeEmbedder>,
    pub documents: Arc<FakeDocumentStore>,
    pub chunks: Arc<FakeChunkStore>,
    pub jobs: Arc<FakeJobStore>,
}

impl FakeWorld {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(FakeStorage::default()),
            extractor: Arc::new(FakeExtractor::default()),
            embedder: Arc::new(FakeEmbedder::default()),
            documents: Arc::new(FakeDocumentStore::default()),
            chunks: Arc::new(FakeChunkStore::default()),
            jobs: Arc::new(FakeJobStore::default()),
        }
    }
}

// ── Storage ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeStorage {
    uploads: Mutex<Vec<String>>,
    deletes: Mutex<Vec<String>>,
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl FakeStorage {
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn upload(&self, path: &str, bytes: &[u8], _content_type: &str) -> Result<()> {
        self.uploads.lock().unwrap().push(path.to_string());
        self.objects
            .lock()
            .unwrap()
            .insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such object: {path}"))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.deletes.lock().unwrap().push(path.to_string());
        self.objects.lock().unwrap().remove(path);
        Ok(())
    }
}

// ── Extractor ────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeExtractor {
    text: Mutex<Option<String>>,
}

impl FakeExtractor {
    pub fn set_text(&self, text: String) {
        *self.text.lock().unwrap() = Some(text);
    }

    pub fn fail(&self) {
        *self.text.lock().unwrap() = None;
    }
}

#[async_trait]
impl TextExtractor for FakeExtractor {
    async fn extract(&self, _file_path: &str) -> Result<String> {
        self.text
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow::anyhow!("extractor exploded"))
    }
}

// ── Embedder ─────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeEmbedder {
    calls: Mutex<usize>,
    fail_after: Mutex<Option<usize>>,
}

impl FakeEmbedder {
    /// Succeed for the first `n` calls, then fail.
    pub fn fail_after(&self, n: usize) {
        *self.fail_after.lock().unwrap() = Some(n);
        *self.calls.lock().unwrap() = 0;
    }

    pub fn succeed(&self) {
        *self.fail_after.lock().unwrap() = None;
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        if let Some(limit) = *self.fail_after.lock().unwrap() {
            if *calls > limit {
                anyhow::bail!("model unavailable");
            }
        }
        Ok(vec![0.5; 384])
    }
}

// ── Document store ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FakeDoc {
    pub title: String,
    pub file_path: String,
    pub raw_text: String,
    pub status: DocumentStatus,
    pub error_message: Option<String>,
}

#[derive(Default)]
pub struct FakeDocumentStore {
    docs: Mutex<HashMap<Uuid, FakeDoc>>,
    fail_insert: Mutex<bool>,
}

impl FakeDocumentStore {
    pub fn fail_insert(&self) {
        *self.fail_insert.lock().unwrap() = true;
    }

    pub fn get(&self, id: Uuid) -> Option<FakeDoc> {
        self.docs.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.docs.lock().unwrap().len()
    }

    /// Insert a document directly, as if a previous ingest committed it.
    pub fn seed(&self, raw_text: String) -> Uuid {
        let id = Uuid::new_v4();
        self.docs.lock().unwrap().insert(
            id,
            FakeDoc {
                title: "seeded".into(),
                file_path: "public/seed/1-seed.pdf".into(),
                raw_text,
                status: DocumentStatus::Processing,
                error_message: None,
            },
        );
        id
    }
}

#[async_trait]
impl DocumentStore for FakeDocumentStore {
    async fn insert(&self, doc: &NewDocument) -> Result<Uuid> {
        if *self.fail_insert.lock().unwrap() {
            anyhow::bail!("insert refused");
        }
        let id = Uuid::new_v4();
        self.docs.lock().unwrap().insert(
            id,
            FakeDoc {
                title: doc.title.clone(),
                file_path: doc.file_path.clone(),
                raw_text: doc.raw_text.clone(),
                status: DocumentStatus::Processing,
                error_message: None,
            },
        );
        Ok(id)
    }

    async fn set_status(&self, id: Uuid, status: DocumentStatus) -> Result<()> {
        let mut docs = self.docs.lock().unwrap();
        let doc = docs
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("no document {id}"))?;
        doc.status = status;
        doc.error_message = None;
        Ok(())
    }

    async fn set_error(&self, id: Uuid, message: &str) -> Result<()> {
        let mut docs = self.docs.lock().unwrap();
        let doc = docs
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("no document {id}"))?;
        doc.status = DocumentStatus::Error;
        doc.error_message = Some(message.to_string());
        Ok(())
    }

    async fn raw_text(&self, id: Uuid) -> Result<Option<String>> {
        Ok(self
            .docs
            .lock()
            .unwrap()
            .get(&id)
            .map(|d| d.raw_text.clone()))
    }
}

// ── Chunk store ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeChunkStore {
    rows: Mutex<Vec<(Uuid, i32, String)>>,
    wipe_calls: Mutex<HashMap<Uuid, usize>>,
}

impl FakeChunkStore {
    pub fn for_document(&self, id: Uuid) -> Vec<(i32, String)> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(doc, _, _)| *doc == id)
            .map(|(_, i, c)| (*i, c.clone()))
            .collect()
    }

    /// How many times the wipe ran for a document (no-op wipes count).
    pub fn wipes_for(&self, id: Uuid) -> usize {
        self.wipe_calls.lock().unwrap().get(&id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ChunkStore for FakeChunkStore {
    async fn upsert(
        &self,
        document_id: Uuid,
        chunk_index: i32,
        content: &str,
        _embedding: &[f32],
    ) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        // Mirrors ON CONFLICT DO NOTHING on (document_id, chunk_index).
        if !rows
            .iter()
            .any(|(d, i, _)| *d == document_id && *i == chunk_index)
        {
            rows.push((document_id, chunk_index, content.to_string()));
        }
        Ok(())
    }

    async fn delete_for_document(&self, document_id: Uuid) -> Result<u64> {
        *self
            .wipe_calls
            .lock()
            .unwrap()
            .entry(document_id)
            .or_insert(0) += 1;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|(d, _, _)| *d != document_id);
        Ok((before - rows.len()) as u64)
    }
}

// ── Job store ────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeJobStore {
    enqueued: Mutex<Vec<Uuid>>,
    queue: Mutex<VecDeque<ClaimedJob>>,
    running: Mutex<Vec<(ClaimedJob, Duration)>>,
    done: Mutex<Vec<Uuid>>,
    failed: Mutex<Vec<(Uuid, String, bool)>>,
    fail_enqueue: Mutex<bool>,
}

impl FakeJobStore {
    pub fn fail_enqueue(&self) {
        *self.fail_enqueue.lock().unwrap() = true;
    }

    pub fn enqueued(&self) -> Vec<Uuid> {
        self.enqueued.lock().unwrap().clone()
    }

    pub fn push_claimable(&self, job: ClaimedJob) {
        self.queue.lock().unwrap().push_back(job);
    }

    /// Simulate a job claimed `age` ago by a worker that never finished.
    pub fn push_running(&self, job: ClaimedJob, age: Duration) {
        self.running.lock().unwrap().push((job, age));
    }

    pub fn done(&self) -> Vec<Uuid> {
        self.done.lock().unwrap().clone()
    }

    pub fn failed(&self) -> Vec<(Uuid, String, bool)> {
        self.failed.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobStore for FakeJobStore {
    async fn enqueue(&self, document_id: Uuid) -> Result<Uuid> {
        if *self.fail_enqueue.lock().unwrap() {
            anyhow::bail!("queue unavailable");
        }
        self.enqueued.lock().unwrap().push(document_id);
        Ok(Uuid::new_v4())
    }

    async fn claim_next(&self) -> Result<Option<ClaimedJob>> {
        Ok(self.queue.lock().unwrap().pop_front())
    }

    async fn reclaim_stale(&self, older_than: Duration) -> Result<u64> {
        let mut running = self.running.lock().unwrap();
        let mut queue = self.queue.lock().unwrap();
        let before = running.len();
        running.retain(|(job, age)| {
            if *age >= older_than {
                queue.push_back(job.clone());
                false
            } else {
                true
            }
        });
        Ok((before - running.len()) as u64)
    }

    async fn mark_done(&self, id: Uuid) -> Result<()> {
        self.done.lock().unwrap().push(id);
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, error: &str, requeue: bool) -> Result<()> {
        self.failed
            .lock()
            .unwrap()
            .push((id, error.to_string(), requeue));
        Ok(())
    }
}
