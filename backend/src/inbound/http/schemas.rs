//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay framework-agnostic by not deriving `ToSchema`; the
//! wrappers here mirror their serialized shape for utoipa.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The endpoint does not accept the request method.
    #[schema(rename = "method_not_allowed")]
    MethodNotAllowed,
    /// The requested note or image does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// Storage, transcription or the service itself failed.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Note ID required")]
    message: String,
    /// Correlation identifier matching the `trace-id` response header.
    #[schema(example = "00000000-0000-0000-0000-000000000000")]
    trace_id: Option<String>,
    /// Supplementary error details for client errors.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for the `POST /api/add-note` multipart body.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct AddNoteRequestSchema {
    /// Image of the notes to transcribe.
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

/// OpenAPI schema for the `POST /api/update-note` multipart body.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UpdateNoteRequestSchema {
    /// Identifier of the note to update.
    #[schema(example = "1")]
    id: String,
    /// Replacement image.
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

/// OpenAPI schema for the `POST /api/regenerate-note` form body.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct RegenerateNoteRequestSchema {
    /// Identifier of the note to regenerate.
    #[schema(example = "1")]
    id: String,
}
