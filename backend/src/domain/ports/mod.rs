//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`NoteRepository`, `BlobStore`, `Transcriber`) are
//! implemented by outbound adapters; driving ports (`NoteCommand`,
//! `NoteQuery`) are consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod blob_store;
mod note_command;
mod note_query;
mod note_repository;
mod transcriber;

#[cfg(test)]
pub use blob_store::MockBlobStore;
pub use blob_store::{BlobStore, BlobStoreError, FixtureBlobStore};
#[cfg(test)]
pub use note_command::MockNoteCommand;
pub use note_command::{FixtureNoteCommand, NoteCommand, UpdateNoteRequest};
#[cfg(test)]
pub use note_query::MockNoteQuery;
pub use note_query::{FixtureNoteQuery, NoteQuery};
#[cfg(test)]
pub use note_repository::MockNoteRepository;
pub use note_repository::{FixtureNoteRepository, NoteRepository, NoteRepositoryError};
#[cfg(test)]
pub use transcriber::MockTranscriber;
pub use transcriber::{FixtureTranscriber, Transcriber, TranscriberError};
