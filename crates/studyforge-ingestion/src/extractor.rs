//! PDF text extraction.
//!
//! The primary backend is a remote extraction function that receives a
//! storage path and returns plain text. A local lopdf-based fallback is
//! available for deployments that cannot reach the function runtime.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use studyforge_common::StudyforgeError;

use crate::storage::ObjectStorage;

#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract plain text from the PDF stored at `file_path`.
    async fn extract(&self, file_path: &str) -> Result<String>;
}

// ── Remote extraction function ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    text: String,
}

/// Client for the hosted extraction function:
/// `POST {url} {"filePath": ...}` → `{"text": ...}`.
#[derive(Clone)]
pub struct HttpTextExtractor {
    client: Client,
    url: String,
    service_key: String,
}

impl HttpTextExtractor {
    pub fn new(url: &str, service_key: &str) -> studyforge_common::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(StudyforgeError::Http)?;
        Ok(Self {
            client,
            url: url.to_string(),
            service_key: service_key.to_string(),
        })
    }
}

#[async_trait]
impl TextExtractor for HttpTextExtractor {
    async fn extract(&self, file_path: &str) -> Result<String> {
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.service_key)
            .json(&serde_json::json!({ "filePath": file_path }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("extractor returned HTTP {status}: {body}");
        }

        let parsed: ExtractResponse = resp
            .json()
            .await
            .context("extractor response was not valid JSON")?;
        debug!(file_path, chars = parsed.text.len(), "PDF text extracted");
        Ok(parsed.text)
    }
}

// ── Local lopdf fallback ─────────────────────────────────────────────────────

/// Downloads the object and extracts text in-process with lopdf.
/// Plain-text extraction only, no layout awareness.
pub struct LocalPdfExtractor {
    storage: Arc<dyn ObjectStorage>,
}

impl LocalPdfExtractor {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl TextExtractor for LocalPdfExtractor {
    async fn extract(&self, file_path: &str) -> Result<String> {
        let bytes = self.storage.download(file_path).await?;
        // lopdf parsing is CPU-bound; keep it off the async executor.
        let text = tokio::task::spawn_blocking(move || -> Result<String> {
            let doc = lopdf::Document::load_mem(&bytes).context("PDF could not be parsed")?;
            let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
            let text = doc.extract_text(&pages).context("PDF text extraction failed")?;
            Ok(text)
        })
        .await??;
        Ok(text)
    }
}
