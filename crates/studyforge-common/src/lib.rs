//! studyforge-common — Shared errors and configuration used across all Studyforge crates.

pub mod config;
pub mod error;

pub use config::{Config, ExtractorMode};
pub use error::{Result, StudyforgeError};
