//! studyforge-web — HTTP surface for the Studyforge admin backend.
//! Provides:
//!   - Curriculum document ingestion and status polling
//!   - Bulk question upload
//!   - User search and banning
//!   - Moderation flag handling
//!   - Analytics summary
//!   - SSE event stream

pub mod auth;
pub mod error;
pub mod handlers;
pub mod router;
pub mod sse;
pub mod state;
