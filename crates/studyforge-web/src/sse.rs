//! Event stream for the admin dashboard.
//!
//! A connecting client first gets one `pipeline_status` event per
//! document still working through the embed stage, so a page reload
//! never loses sight of in-flight ingests. Live events from the
//! broadcast channel follow; a subscriber that lags drops events
//! rather than blocking the sender.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::Stream;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use studyforge_db::documents::DocumentRepository;
use studyforge_db::{Document, DocumentStatus};

use crate::state::{AppEvent, SharedState};

pub async fn sse_handler(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let in_flight = DocumentRepository::new(state.db.clone())
        .list_by_status(DocumentStatus::Processing)
        .await
        .unwrap_or_default();

    let backlog = tokio_stream::iter(
        catch_up_events(&in_flight)
            .into_iter()
            .filter_map(|event| encode(&event)),
    );
    let live = BroadcastStream::new(state.subscribe())
        .filter_map(|next| next.ok().as_ref().and_then(encode));

    Sse::new(backlog.chain(live)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn encode(event: &AppEvent) -> Option<Result<Event, Infallible>> {
    serde_json::to_string(event)
        .ok()
        .map(|data| Ok(Event::default().data(data)))
}

/// One status event per document still being embedded.
fn catch_up_events(in_flight: &[Document]) -> Vec<AppEvent> {
    in_flight
        .iter()
        .map(|doc| AppEvent::PipelineStatus {
            document_id: doc.id.to_string(),
            stage: doc.status.clone(),
            message: format!("\"{}\" is awaiting embedding", doc.title),
        })
        .collect()
}
