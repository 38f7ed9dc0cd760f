//! Note service implementing the note driving ports.
//!
//! Each operation is a short pipeline over the three driven ports: write the
//! image, transcribe it, persist the row. When a later stage fails after this
//! request wrote a new image, the image is removed again unless a note already
//! references it. Identical uploads map to the same image name, so the write,
//! transcription and commit for one name run under a per-image lock; a second
//! upload of the same bytes waits instead of racing the first one's cleanup.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    BlobStore, BlobStoreError, NoteCommand, NoteQuery, NoteRepository, NoteRepositoryError,
    Transcriber, TranscriberError, UpdateNoteRequest,
};
use crate::domain::image_locks::ImageLocks;
use crate::domain::{Error, ImageRef, ImageUpload, NewNote, Note, NoteId, StoredImage};

/// Note service wiring the repository, blob store and transcriber together.
pub struct NoteService<R, B, T> {
    notes: Arc<R>,
    blobs: Arc<B>,
    transcriber: Arc<T>,
    image_locks: Arc<ImageLocks>,
}

impl<R, B, T> Clone for NoteService<R, B, T> {
    fn clone(&self) -> Self {
        Self {
            notes: Arc::clone(&self.notes),
            blobs: Arc::clone(&self.blobs),
            transcriber: Arc::clone(&self.transcriber),
            image_locks: Arc::clone(&self.image_locks),
        }
    }
}

impl<R, B, T> NoteService<R, B, T> {
    /// Create a service over the given ports.
    pub fn new(notes: Arc<R>, blobs: Arc<B>, transcriber: Arc<T>) -> Self {
        Self {
            notes,
            blobs,
            transcriber,
            image_locks: Arc::default(),
        }
    }
}

impl<R, B, T> NoteService<R, B, T>
where
    R: NoteRepository,
    B: BlobStore,
    T: Transcriber,
{
    fn map_blob_error(error: BlobStoreError) -> Error {
        match error {
            BlobStoreError::Io { .. } => Error::internal(format!("Failed to save image: {error}")),
            BlobStoreError::NotFound { ref image } => Error::not_found("Image file not found")
                .with_details(json!({ "image": image })),
        }
    }

    fn map_transcriber_error(error: TranscriberError) -> Error {
        Error::internal(format!("Failed to convert image to markdown: {error}"))
    }

    fn map_lookup_error(error: NoteRepositoryError) -> Error {
        match error {
            NoteRepositoryError::NotFound { id } => {
                Error::not_found(format!("Failed to retrieve note: {error}"))
                    .with_details(json!({ "id": id }))
            }
            NoteRepositoryError::Connection { .. } | NoteRepositoryError::Query { .. } => {
                Error::internal(format!("Failed to retrieve note: {error}"))
            }
        }
    }

    fn map_write_error(error: NoteRepositoryError, context: &str) -> Error {
        match error {
            NoteRepositoryError::NotFound { id } => {
                Error::not_found(format!("{context}: {error}")).with_details(json!({ "id": id }))
            }
            NoteRepositoryError::Connection { .. } | NoteRepositoryError::Query { .. } => {
                Error::internal(format!("{context}: {error}"))
            }
        }
    }

    async fn store_image(&self, upload: &ImageUpload) -> Result<StoredImage, Error> {
        let stored = self
            .blobs
            .store(&upload.bytes, &upload.file_name)
            .await
            .map_err(Self::map_blob_error)?;
        debug!(
            image = %stored.image,
            newly_created = stored.newly_created,
            bytes = upload.bytes.len(),
            "stored uploaded image"
        );
        Ok(stored)
    }

    /// Remove an image written by this request after a later stage failed.
    ///
    /// The image stays when a note references it or when that cannot be
    /// determined. Failures are logged; the caller still reports the original
    /// error.
    async fn compensate(&self, stored: &StoredImage) {
        if !stored.newly_created {
            return;
        }
        match self.notes.references_image(&stored.image).await {
            Ok(false) => {}
            Ok(true) => {
                debug!(image = %stored.image, "image referenced by a note; keeping it");
                return;
            }
            Err(error) => {
                warn!(
                    image = %stored.image,
                    %error,
                    "could not check image references; keeping it"
                );
                return;
            }
        }
        match self.blobs.remove(&stored.image).await {
            Ok(()) => debug!(image = %stored.image, "removed orphaned image"),
            Err(error) => warn!(
                image = %stored.image,
                %error,
                "failed to remove orphaned image"
            ),
        }
    }

    async fn transcribe_stored(
        &self,
        stored: &StoredImage,
        bytes: &[u8],
    ) -> Result<String, Error> {
        match self.transcriber.transcribe(bytes).await {
            Ok(markdown) => Ok(markdown),
            Err(error) => {
                warn!(image = %stored.image, %error, "transcription failed");
                self.compensate(stored).await;
                Err(Self::map_transcriber_error(error))
            }
        }
    }
}

#[async_trait]
impl<R, B, T> NoteCommand for NoteService<R, B, T>
where
    R: NoteRepository,
    B: BlobStore,
    T: Transcriber,
{
    async fn add_note(&self, upload: ImageUpload) -> Result<Note, Error> {
        let key = ImageRef::for_content(&upload.bytes, &upload.file_name);
        let _image_lock = self.image_locks.acquire(&key).await;
        let stored = self.store_image(&upload).await?;
        let markdown = self.transcribe_stored(&stored, &upload.bytes).await?;

        let new_note = NewNote {
            image: stored.image.clone(),
            markdown,
        };
        match self.notes.create(&new_note).await {
            Ok(note) => {
                info!(note_id = %note.id, image = %note.image, "note created");
                Ok(note)
            }
            Err(error) => {
                self.compensate(&stored).await;
                Err(Self::map_write_error(error, "Failed to save to database"))
            }
        }
    }

    async fn update_note(&self, request: UpdateNoteRequest) -> Result<Note, Error> {
        let UpdateNoteRequest { id, upload } = request;
        self.notes
            .get_by_id(id)
            .await
            .map_err(Self::map_lookup_error)?;

        let key = ImageRef::for_content(&upload.bytes, &upload.file_name);
        let _image_lock = self.image_locks.acquire(&key).await;
        let stored = self.store_image(&upload).await?;
        let markdown = self.transcribe_stored(&stored, &upload.bytes).await?;

        match self.notes.update_by_id(id, &stored.image, &markdown).await {
            Ok(note) => {
                info!(note_id = %note.id, image = %note.image, "note updated");
                Ok(note)
            }
            Err(error) => {
                self.compensate(&stored).await;
                Err(Self::map_write_error(error, "Failed to update database"))
            }
        }
    }

    async fn regenerate_note(&self, id: NoteId) -> Result<Note, Error> {
        let note = self
            .notes
            .get_by_id(id)
            .await
            .map_err(Self::map_lookup_error)?;

        let present = self
            .blobs
            .exists(&note.image)
            .await
            .map_err(Self::map_blob_error)?;
        if !present {
            return Err(Error::not_found("Image file not found")
                .with_details(json!({ "id": id, "image": note.image })));
        }

        let bytes = self
            .blobs
            .read(&note.image)
            .await
            .map_err(Self::map_blob_error)?;
        let markdown = self
            .transcriber
            .transcribe(&bytes)
            .await
            .map_err(Self::map_transcriber_error)?;

        let note = self
            .notes
            .update_by_id(id, &note.image, &markdown)
            .await
            .map_err(|error| Self::map_write_error(error, "Failed to update database"))?;
        info!(note_id = %note.id, "note regenerated");
        Ok(note)
    }
}

#[async_trait]
impl<R, B, T> NoteQuery for NoteService<R, B, T>
where
    R: NoteRepository,
    B: BlobStore,
    T: Transcriber,
{
    async fn list_notes(&self) -> Result<Vec<Note>, Error> {
        self.notes
            .list_all()
            .await
            .map_err(|error| Error::internal(format!("Failed to list notes: {error}")))
    }
}

#[cfg(test)]
#[path = "note_service_tests.rs"]
mod tests;
