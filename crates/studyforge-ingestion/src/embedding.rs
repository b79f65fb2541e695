//! Embedding client — calls the hosted feature-extraction endpoint to
//! produce a fixed-dimension vector per text chunk.
//!
//! The hosted model cold-starts: the router answers 404 or 422 until
//! the model is resident. Those two statuses are retried a fixed number
//! of times with a short flat delay; anything else fails immediately.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use studyforge_common::StudyforgeError;

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single chunk of text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub endpoint: String,
    pub api_token: Option<String>,
    /// Expected vector dimension; a mismatch is treated as a hard error.
    pub dim: usize,
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            // all-MiniLM-L6-v2 via the hosted inference router
            endpoint: "https://router.huggingface.co/hf-inference/models/sentence-transformers/all-MiniLM-L6-v2/pipeline/feature-extraction".to_string(),
            api_token: None,
            dim: 384,
            max_attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

pub struct HttpEmbedder {
    cfg: EmbeddingConfig,
    client: Client,
}

impl HttpEmbedder {
    pub fn new(cfg: EmbeddingConfig) -> studyforge_common::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(StudyforgeError::Http)?;
        Ok(Self { cfg, client })
    }

    fn is_cold_start(status: StatusCode) -> bool {
        status == StatusCode::NOT_FOUND || status == StatusCode::UNPROCESSABLE_ENTITY
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let body = serde_json::json!({ "inputs": [text] });
        let mut attempt = 1u32;

        loop {
            let mut req = self
                .client
                .post(&self.cfg.endpoint)
                .query(&[("wait_for_model", "true")])
                .json(&body);
            if let Some(ref token) = self.cfg.api_token {
                req = req.bearer_auth(token);
            }
            let resp = req.send().await?;
            let status = resp.status();

            if status.is_success() {
                let rows: Vec<Vec<f32>> = resp
                    .json()
                    .await
                    .context("embedding response was not a float matrix")?;
                let vec = rows
                    .into_iter()
                    .next()
                    .context("embedding response was empty")?;
                if vec.len() != self.cfg.dim {
                    anyhow::bail!(
                        "embedding dimension mismatch: expected {}, got {}",
                        self.cfg.dim,
                        vec.len()
                    );
                }
                debug!(attempt, dim = vec.len(), "chunk embedded");
                return Ok(vec);
            }

            if Self::is_cold_start(status) && attempt < self.cfg.max_attempts {
                warn!(attempt, %status, "embedding model not ready, retrying");
                tokio::time::sleep(self.cfg.retry_delay).await;
                attempt += 1;
                continue;
            }

            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("embedding request failed: HTTP {status} {body}");
        }
    }
}
