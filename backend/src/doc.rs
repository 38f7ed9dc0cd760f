//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer and the
//! schema wrappers from [`crate::inbound::http::schemas`], which describe
//! domain types without coupling them to utoipa.
//!
//! The document backs Swagger UI in debug builds and is exported via
//! `cargo run --bin openapi-dump` for external tooling.

use utoipa::OpenApi;

use crate::inbound::http::notes::{NoteResponse, NoteSummary, NotesResponse};
use crate::inbound::http::schemas::{
    AddNoteRequestSchema, ErrorCodeSchema, ErrorSchema, RegenerateNoteRequestSchema,
    UpdateNoteRequestSchema,
};

/// OpenAPI document for the notes service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "bookmd API",
        description = "Upload images of notes and receive Markdown transcriptions."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::notes::add_note,
        crate::inbound::http::notes::update_note,
        crate::inbound::http::notes::regenerate_note,
        crate::inbound::http::notes::list_notes,
        crate::inbound::http::pages::index,
        crate::inbound::http::pages::static_file,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        NoteResponse,
        NoteSummary,
        NotesResponse,
        AddNoteRequestSchema,
        UpdateNoteRequestSchema,
        RegenerateNoteRequestSchema,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "notes", description = "Create, update, regenerate and list notes"),
        (name = "pages", description = "Upload UI and static assets"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated OpenAPI document.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    fn error_schema_uses_wire_field_names() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[rstest]
    #[case("/api/add-note")]
    #[case("/api/update-note")]
    #[case("/api/regenerate-note")]
    #[case("/api/notes")]
    #[case("/health/ready")]
    fn document_lists_endpoint(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[rstest]
    fn note_response_schema_has_envelope_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let envelope = schemas.get("NoteResponse").expect("NoteResponse schema");

        for field in ["success", "id", "image", "markdown"] {
            assert_object_schema_has_field(envelope, field);
        }
    }
}
