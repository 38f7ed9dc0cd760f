//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: SQLite-backed note repository using Diesel ORM
//! - **blob**: filesystem storage for uploaded images
//! - **transcription**: OpenAI-compatible chat-completion client
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod blob;
pub mod persistence;
pub mod transcription;
