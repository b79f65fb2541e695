//! Object storage client for uploaded curriculum PDFs.
//!
//! Objects live under `public/{uploader_id}/{millis}-{name}`, with the
//! file name reduced to an alphanumeric/dot/dash allow-list so user
//! input can never influence the path structure.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use uuid::Uuid;

use studyforge_common::StudyforgeError;

/// Durable blob storage keyed by path.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<()>;
    async fn download(&self, path: &str) -> Result<Vec<u8>>;
    async fn delete(&self, path: &str) -> Result<()>;
}

/// Strip everything outside `[A-Za-z0-9._-]` from a client-supplied
/// file name.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload.pdf".to_string()
    } else {
        cleaned
    }
}

/// Build the storage path for a new upload.
pub fn object_path(uploader_id: Uuid, millis: i64, file_name: &str) -> String {
    format!("public/{uploader_id}/{millis}-{}", sanitize_file_name(file_name))
}

// ── REST storage backend ─────────────────────────────────────────────────────

/// Storage REST API client (`{base}/object/{bucket}/{path}`).
#[derive(Clone)]
pub struct HttpObjectStorage {
    client: Client,
    base_url: String,
    bucket: String,
    service_key: String,
}

impl HttpObjectStorage {
    pub fn new(
        base_url: &str,
        bucket: &str,
        service_key: &str,
    ) -> studyforge_common::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(StudyforgeError::Http)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            service_key: service_key.to_string(),
        })
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/object/{}/{}", self.base_url, self.bucket, path)
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn upload(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<()> {
        let resp = self
            .client
            .post(self.object_url(path))
            .bearer_auth(&self.service_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .await?;
        if !resp.status().is_success() {
            anyhow::bail!("storage upload failed: HTTP {}", resp.status());
        }
        Ok(())
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(self.object_url(path))
            .bearer_auth(&self.service_key)
            .send()
            .await?;
        if !resp.status().is_success() {
            anyhow::bail!("storage download failed: HTTP {}", resp.status());
        }
        Ok(resp.bytes().await?.to_vec())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let resp = self
            .client
            .delete(self.object_url(path))
            .bearer_auth(&self.service_key)
            .send()
            .await?;
        if !resp.status().is_success() {
            anyhow::bail!("storage delete failed: HTTP {}", resp.status());
        }
        Ok(())
    }
}
