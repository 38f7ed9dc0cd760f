//! Notes service: transcribe uploaded images of notes into Markdown.
//!
//! Ports live in [`domain`]; HTTP handlers in [`inbound`]; SQLite, filesystem
//! and transcription-provider adapters in [`outbound`].

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
