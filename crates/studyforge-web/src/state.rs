//! Shared application state for the web server.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::sync::broadcast;

use studyforge_ingestion::IngestionPipeline;

/// Events pushed to connected clients via SSE.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    /// A document finished the synchronous ingest phase
    DocumentIngested { document_id: String, title: String },
    /// Embedding pipeline status update
    PipelineStatus { document_id: String, stage: String, message: String },
    /// General admin notification
    Notification { level: String, message: String },
}

/// Shared state injected into every Axum handler.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub pipeline: Arc<IngestionPipeline>,
    /// Broadcast channel for SSE push events
    pub event_tx: broadcast::Sender<AppEvent>,
}

impl AppState {
    pub fn new(db: PgPool, pipeline: Arc<IngestionPipeline>) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self { db, pipeline, event_tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.event_tx.subscribe()
    }
}

pub type SharedState = Arc<AppState>;
