//! Runtime configuration, loaded from the environment.
//!
//! Every deployable binary calls [`Config::from_env`] once at startup.
//! A `.env` file is honoured in development via dotenvy; production
//! deployments set real environment variables.

use std::time::Duration;

use crate::error::{Result, StudyforgeError};

/// Complete service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string.
    pub database_url: String,
    /// Address the HTTP server binds to.
    pub bind_addr: String,

    /// Base URL of the object storage REST API.
    pub storage_url: String,
    /// Bucket holding uploaded curriculum PDFs.
    pub storage_bucket: String,
    /// Service key used as bearer auth for storage and the extractor.
    pub service_key: String,

    /// URL of the remote PDF text-extraction function.
    pub extractor_url: String,

    /// Feature-extraction endpoint of the embedding model.
    pub embed_url: String,
    /// Bearer token for the embedding endpoint.
    pub embed_token: Option<String>,
    /// Expected embedding dimension (all-MiniLM-L6-v2 → 384).
    pub embed_dim: usize,
    /// Attempts per chunk before the embedding stage gives up.
    pub embed_max_attempts: u32,
    /// Fixed delay between embedding retries.
    pub embed_retry_delay: Duration,

    /// How often the embed worker polls for queued jobs.
    pub worker_poll_interval: Duration,
    /// How many times a job may run before it is marked failed for good.
    pub job_max_attempts: i32,

    /// Running jobs untouched for this long are treated as abandoned
    /// and put back in the queue.
    pub job_stale_after: Duration,

    /// Which text-extraction backend to use.
    pub extractor_mode: ExtractorMode,

    /// Upload size ceiling in bytes.
    pub max_upload_bytes: usize,
    /// Paragraphs at or under this length are dropped by the chunker.
    pub min_chunk_chars: usize,
}

impl Config {
    /// Load configuration from the environment (and `.env` if present).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            bind_addr: optional("BIND_ADDR", "127.0.0.1:3001"),
            storage_url: optional("STORAGE_URL", "http://localhost:8000/storage/v1"),
            storage_bucket: optional("STORAGE_BUCKET", "sbc_documents"),
            service_key: required("SERVICE_KEY")?,
            extractor_url: optional("EXTRACTOR_URL", "http://localhost:8000/functions/v1/parse-pdf"),
            embed_url: optional(
                "EMBED_URL",
                "https://router.huggingface.co/hf-inference/models/sentence-transformers/all-MiniLM-L6-v2/pipeline/feature-extraction",
            ),
            embed_token: std::env::var("EMBED_TOKEN").ok(),
            embed_dim: parsed("EMBED_DIM", 384)?,
            embed_max_attempts: parsed("EMBED_MAX_ATTEMPTS", 3)?,
            embed_retry_delay: Duration::from_millis(parsed("EMBED_RETRY_DELAY_MS", 500)?),
            worker_poll_interval: Duration::from_millis(parsed("WORKER_POLL_MS", 1000)?),
            job_max_attempts: parsed("JOB_MAX_ATTEMPTS", 3)?,
            job_stale_after: Duration::from_millis(parsed("JOB_STALE_AFTER_MS", 300_000)?),
            extractor_mode: ExtractorMode::parse(&optional("EXTRACTOR_MODE", "remote"))?,
            max_upload_bytes: parsed("MAX_UPLOAD_BYTES", 50 * 1024 * 1024)?,
            min_chunk_chars: parsed("MIN_CHUNK_CHARS", 50)?,
        })
    }
}

/// Text-extraction backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorMode {
    /// Hosted extraction function (default).
    Remote,
    /// In-process PDF parsing over the stored object.
    Local,
}

impl ExtractorMode {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "remote" => Ok(ExtractorMode::Remote),
            "local" => Ok(ExtractorMode::Local),
            other => Err(StudyforgeError::Config(format!(
                "invalid EXTRACTOR_MODE '{other}' (expected 'remote' or 'local')"
            ))),
        }
    }
}

fn required(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| StudyforgeError::Config(format!("missing required env var {name}")))
}

fn optional(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parsed<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| StudyforgeError::Config(format!("invalid {name}: {e}"))),
        Err(_) => Ok(default),
    }
}
