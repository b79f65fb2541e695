//! studyforge-db — Postgres repositories for the Studyforge backend.
//!
//! One repository struct per aggregate, all thin wrappers over a shared
//! `PgPool`. Queries use runtime binds (`sqlx::query` / `query_as`), so
//! no live database is needed at compile time. Schema lives in the
//! workspace-level `migrations/` directory.

pub mod chunks;
pub mod documents;
pub mod error;
pub mod flags;
pub mod jobs;
pub mod profiles;
pub mod questions;
pub mod schema;

pub use error::{DbError, Result};
pub use schema::{Document, DocumentStatus, EmbedJob, Flag, NewDocument, Profile};
