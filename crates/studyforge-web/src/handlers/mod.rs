pub mod analytics;
pub mod documents;
pub mod moderation;
pub mod questions;
pub mod users;
