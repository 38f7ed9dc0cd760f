//! Note HTTP handlers.
//!
//! ```text
//! POST /api/add-note         multipart: image
//! POST /api/update-note      multipart: id, image
//! POST /api/regenerate-note  urlencoded or multipart: id
//! GET  /api/notes
//! ```
//!
//! `id` may also be sent in the query string; a value in the body wins.
//!
//! Handlers are registered by [`super::routes`] so that a wrong method on a
//! known path answers with a JSON 405 rather than falling through to 404.

use actix_multipart::MultipartError;
use actix_multipart::form::bytes::Bytes;
use actix_multipart::form::text::Text;
use actix_multipart::form::{MultipartForm, MultipartFormConfig};
use actix_web::error::UrlencodedError;
use actix_web::{Either, HttpRequest, web};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::ports::UpdateNoteRequest;
use crate::domain::{Error, ImageUpload, Note};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    AddNoteRequestSchema, ErrorSchema, RegenerateNoteRequestSchema, UpdateNoteRequestSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{missing_image_error, parse_note_id};

/// Largest multipart body accepted for an upload.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

const FORM_PARSE_FAILED: &str = "Failed to parse form";

/// Multipart body for `POST /api/add-note`.
#[derive(Debug, MultipartForm)]
pub struct AddNoteForm {
    pub image: Option<Bytes>,
}

/// Multipart body for `POST /api/update-note`.
#[derive(Debug, MultipartForm)]
pub struct UpdateNoteForm {
    pub id: Option<Text<String>>,
    pub image: Option<Bytes>,
}

/// Url-encoded body for `POST /api/regenerate-note`.
#[derive(Debug, Deserialize)]
pub struct RegenerateNoteForm {
    pub id: Option<String>,
}

/// Query string accepted by the `id`-taking endpoints.
#[derive(Debug, Deserialize)]
pub struct NoteIdQuery {
    pub id: Option<String>,
}

/// Multipart body for `POST /api/regenerate-note`.
#[derive(Debug, MultipartForm)]
pub struct RegenerateNoteMultipart {
    pub id: Option<Text<String>>,
}

/// Envelope returned by every note mutation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NoteResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08.png")]
    pub image: String,
    #[schema(example = "# Meeting notes\n\n- item")]
    pub markdown: String,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            success: true,
            id: note.id.get(),
            image: note.image.to_string(),
            markdown: note.markdown,
        }
    }
}

/// One entry of the note listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NoteSummary {
    pub id: i64,
    #[schema(example = "2026-03-01T12:30:15.250Z")]
    pub date_created: String,
    pub image: String,
    pub markdown: String,
}

impl From<Note> for NoteSummary {
    fn from(note: Note) -> Self {
        Self {
            id: note.id.get(),
            date_created: note
                .date_created
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            image: note.image.to_string(),
            markdown: note.markdown,
        }
    }
}

/// Envelope returned by `GET /api/notes`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotesResponse {
    pub success: bool,
    pub notes: Vec<NoteSummary>,
}

/// Multipart limits and error mapping shared by the upload endpoints.
pub fn multipart_config() -> MultipartFormConfig {
    MultipartFormConfig::default()
        .total_limit(MAX_UPLOAD_BYTES)
        .memory_limit(MAX_UPLOAD_BYTES)
        .error_handler(multipart_error)
}

/// Url-encoded form error mapping for the regenerate endpoint.
pub fn urlencoded_config() -> web::FormConfig {
    web::FormConfig::default().error_handler(urlencoded_error)
}

fn multipart_error(err: MultipartError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "multipart form rejected");
    Error::invalid_request(FORM_PARSE_FAILED).into()
}

fn urlencoded_error(err: UrlencodedError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "url-encoded form rejected");
    Error::invalid_request(FORM_PARSE_FAILED).into()
}

/// Turn the `image` part into an upload; absent and empty parts are rejected.
fn parse_image(image: Option<Bytes>) -> Result<ImageUpload, Error> {
    let image = image
        .filter(|part| !part.data.is_empty())
        .ok_or_else(missing_image_error)?;
    Ok(ImageUpload::new(
        image.data.to_vec(),
        image.file_name.unwrap_or_default(),
    ))
}

/// Either encoding of the regenerate body.
type RegenerateBody = Either<web::Form<RegenerateNoteForm>, MultipartForm<RegenerateNoteMultipart>>;

fn regenerate_id(form: Option<RegenerateBody>) -> Option<String> {
    match form? {
        Either::Left(form) => form.into_inner().id,
        Either::Right(form) => form.into_inner().id.map(Text::into_inner),
    }
}

fn id_or_query(body: Option<String>, query: Option<web::Query<NoteIdQuery>>) -> Option<String> {
    body.or_else(|| query.and_then(|query| query.into_inner().id))
}

/// Create a note from an uploaded image.
#[utoipa::path(
    post,
    path = "/api/add-note",
    request_body(content = AddNoteRequestSchema, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Note created", body = NoteResponse),
        (status = 400, description = "Missing image or malformed form", body = ErrorSchema),
        (status = 405, description = "Method not allowed", body = ErrorSchema),
        (status = 500, description = "Storage or transcription failed", body = ErrorSchema)
    ),
    tags = ["notes"],
    operation_id = "addNote"
)]
pub async fn add_note(
    state: web::Data<HttpState>,
    MultipartForm(form): MultipartForm<AddNoteForm>,
) -> ApiResult<web::Json<NoteResponse>> {
    let upload = parse_image(form.image)?;
    let note = state.notes.add_note(upload).await?;
    Ok(web::Json(NoteResponse::from(note)))
}

/// Replace a note's image and transcribe it again.
#[utoipa::path(
    post,
    path = "/api/update-note",
    params(("id" = Option<i64>, Query, description = "Note id when the form carries none")),
    request_body(content = UpdateNoteRequestSchema, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Note updated", body = NoteResponse),
        (status = 400, description = "Missing or invalid id, missing image", body = ErrorSchema),
        (status = 404, description = "Note not found", body = ErrorSchema),
        (status = 405, description = "Method not allowed", body = ErrorSchema),
        (status = 500, description = "Storage or transcription failed", body = ErrorSchema)
    ),
    tags = ["notes"],
    operation_id = "updateNote"
)]
pub async fn update_note(
    state: web::Data<HttpState>,
    query: Option<web::Query<NoteIdQuery>>,
    MultipartForm(form): MultipartForm<UpdateNoteForm>,
) -> ApiResult<web::Json<NoteResponse>> {
    let raw_id = id_or_query(form.id.map(Text::into_inner), query);
    let id = parse_note_id(raw_id.as_deref())?;
    let upload = parse_image(form.image)?;
    let note = state
        .notes
        .update_note(UpdateNoteRequest { id, upload })
        .await?;
    Ok(web::Json(NoteResponse::from(note)))
}

/// Transcribe a note's stored image again, keeping the image.
///
/// A body that is neither a url-encoded nor a multipart form is treated as
/// carrying no `id`.
#[utoipa::path(
    post,
    path = "/api/regenerate-note",
    params(("id" = Option<i64>, Query, description = "Note id when the body carries none")),
    request_body(
        content = RegenerateNoteRequestSchema,
        content_type = "application/x-www-form-urlencoded"
    ),
    responses(
        (status = 200, description = "Transcription regenerated", body = NoteResponse),
        (status = 400, description = "Missing or invalid id", body = ErrorSchema),
        (status = 404, description = "Note or image file not found", body = ErrorSchema),
        (status = 405, description = "Method not allowed", body = ErrorSchema),
        (status = 500, description = "Transcription or persistence failed", body = ErrorSchema)
    ),
    tags = ["notes"],
    operation_id = "regenerateNote"
)]
pub async fn regenerate_note(
    state: web::Data<HttpState>,
    query: Option<web::Query<NoteIdQuery>>,
    form: Option<RegenerateBody>,
) -> ApiResult<web::Json<NoteResponse>> {
    let raw_id = id_or_query(regenerate_id(form), query);
    let id = parse_note_id(raw_id.as_deref())?;
    let note = state.notes.regenerate_note(id).await?;
    Ok(web::Json(NoteResponse::from(note)))
}

/// List every note, newest first.
#[utoipa::path(
    get,
    path = "/api/notes",
    responses(
        (status = 200, description = "All notes", body = NotesResponse),
        (status = 405, description = "Method not allowed", body = ErrorSchema),
        (status = 500, description = "Note store unavailable", body = ErrorSchema)
    ),
    tags = ["notes"],
    operation_id = "listNotes"
)]
pub async fn list_notes(state: web::Data<HttpState>) -> ApiResult<web::Json<NotesResponse>> {
    let notes = state.notes_query.list_notes().await?;
    Ok(web::Json(NotesResponse {
        success: true,
        notes: notes.into_iter().map(NoteSummary::from).collect(),
    }))
}

#[cfg(test)]
#[path = "notes_tests.rs"]
mod tests;
