//! Studyforge admin backend server.
//!
//! Run with: cargo run -p studyforge-web

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use studyforge_common::{Config, ExtractorMode};
use studyforge_db::chunks::ChunkRepository;
use studyforge_db::documents::DocumentRepository;
use studyforge_db::jobs::EmbedJobRepository;
use studyforge_ingestion::embedding::{EmbeddingConfig, HttpEmbedder};
use studyforge_ingestion::extractor::{HttpTextExtractor, LocalPdfExtractor, TextExtractor};
use studyforge_ingestion::storage::HttpObjectStorage;
use studyforge_ingestion::store::JobStore;
use studyforge_ingestion::{EmbedWorker, IngestionPipeline, PipelineConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;

    let storage = Arc::new(HttpObjectStorage::new(
        &cfg.storage_url,
        &cfg.storage_bucket,
        &cfg.service_key,
    )?);
    let extractor: Arc<dyn TextExtractor> = match cfg.extractor_mode {
        ExtractorMode::Remote => {
            Arc::new(HttpTextExtractor::new(&cfg.extractor_url, &cfg.service_key)?)
        }
        ExtractorMode::Local => Arc::new(LocalPdfExtractor::new(storage.clone())),
    };
    let embedder = Arc::new(HttpEmbedder::new(EmbeddingConfig {
        endpoint: cfg.embed_url.clone(),
        api_token: cfg.embed_token.clone(),
        dim: cfg.embed_dim,
        max_attempts: cfg.embed_max_attempts,
        retry_delay: cfg.embed_retry_delay,
    })?);

    let documents = Arc::new(DocumentRepository::new(pool.clone()));
    let chunks = Arc::new(ChunkRepository::new(pool.clone()));
    let jobs = Arc::new(EmbedJobRepository::new(pool.clone()));

    let pipeline = Arc::new(IngestionPipeline::new(
        storage,
        extractor,
        embedder,
        documents,
        chunks,
        jobs.clone(),
        PipelineConfig {
            max_upload_bytes: cfg.max_upload_bytes,
            min_chunk_chars: cfg.min_chunk_chars,
        },
    ));

    // Background worker drains the embed job queue.
    let worker = EmbedWorker::new(
        pipeline.clone(),
        jobs as Arc<dyn JobStore>,
        cfg.worker_poll_interval,
        cfg.job_max_attempts,
        cfg.job_stale_after,
    );
    tokio::spawn(worker.run());

    let state = studyforge_web::state::AppState::new(pool, pipeline);
    let app = studyforge_web::router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    info!("server listening on http://{}", cfg.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
