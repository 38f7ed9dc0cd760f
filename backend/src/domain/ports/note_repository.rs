//! Port for note persistence.
//!
//! The store assigns identifiers and creation timestamps. Writes return the
//! row as persisted so callers never approximate store-assigned values.

use async_trait::async_trait;

use crate::domain::{ImageRef, NewNote, Note, NoteId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by note repository adapters.
    pub enum NoteRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "note repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "note repository query failed: {message}",
        /// No note matches the identifier.
        NotFound { id: NoteId } =>
            "note not found: {id}",
    }
}

/// Port for note storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a note and return the persisted row.
    async fn create(&self, note: &NewNote) -> Result<Note, NoteRepositoryError>;

    /// Replace the image and markdown of an existing note.
    ///
    /// `date_created` is left untouched.
    ///
    /// # Errors
    /// [`NoteRepositoryError::NotFound`] when no row has `id`; nothing is
    /// modified in that case.
    async fn update_by_id(
        &self,
        id: NoteId,
        image: &ImageRef,
        markdown: &str,
    ) -> Result<Note, NoteRepositoryError>;

    /// Fetch a note by identifier.
    ///
    /// # Errors
    /// [`NoteRepositoryError::NotFound`] when no row has `id`.
    async fn get_by_id(&self, id: NoteId) -> Result<Note, NoteRepositoryError>;

    /// Delete a note. The referenced image is left in place.
    ///
    /// # Errors
    /// [`NoteRepositoryError::NotFound`] when no row has `id`.
    async fn delete_by_id(&self, id: NoteId) -> Result<(), NoteRepositoryError>;

    /// All notes, newest first; ties on `date_created` are broken by id,
    /// highest first.
    async fn list_all(&self) -> Result<Vec<Note>, NoteRepositoryError>;

    /// Whether any note currently points at `image`.
    async fn references_image(&self, image: &ImageRef) -> Result<bool, NoteRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
///
/// Holds no rows: lookups report `NotFound`, listing is empty, and `create`
/// echoes the input back as note `1`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNoteRepository;

#[async_trait]
impl NoteRepository for FixtureNoteRepository {
    async fn create(&self, note: &NewNote) -> Result<Note, NoteRepositoryError> {
        Ok(Note {
            id: NoteId::new(1),
            date_created: chrono::DateTime::UNIX_EPOCH,
            image: note.image.clone(),
            markdown: note.markdown.clone(),
        })
    }

    async fn update_by_id(
        &self,
        id: NoteId,
        _image: &ImageRef,
        _markdown: &str,
    ) -> Result<Note, NoteRepositoryError> {
        Err(NoteRepositoryError::not_found(id))
    }

    async fn get_by_id(&self, id: NoteId) -> Result<Note, NoteRepositoryError> {
        Err(NoteRepositoryError::not_found(id))
    }

    async fn delete_by_id(&self, id: NoteId) -> Result<(), NoteRepositoryError> {
        Err(NoteRepositoryError::not_found(id))
    }

    async fn list_all(&self) -> Result<Vec<Note>, NoteRepositoryError> {
        Ok(Vec::new())
    }

    async fn references_image(&self, _image: &ImageRef) -> Result<bool, NoteRepositoryError> {
        Ok(false)
    }
}
