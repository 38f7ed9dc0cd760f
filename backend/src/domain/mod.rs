//! Domain primitives, ports, and services.
//!
//! Purpose: define the note model and the transport-agnostic operations over
//! it. Adapters in `inbound` and `outbound` depend on this module, never the
//! other way round.
//!
//! Public surface:
//! - `Error` / `ErrorCode`: failure payload shared by all adapters.
//! - `TraceId`: request correlation identifier.
//! - `Note`, `NoteId`, `ImageRef` and friends: the note model.
//! - `NoteService`: implementation of the `NoteCommand` and `NoteQuery`
//!   driving ports.

pub mod error;
mod image_locks;
pub mod note;
mod note_service;
pub mod ports;
pub mod trace_id;

pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::note::{
    ImageRef, ImageRefValidationError, ImageUpload, NewNote, Note, NoteId, StoredImage,
};
pub use self::note_service::NoteService;
pub use self::trace_id::TraceId;
