//! Driving port for note mutations.
//!
//! HTTP handlers call [`NoteCommand`] after parsing form input. Every
//! operation transcribes an image and returns the note as persisted.

use async_trait::async_trait;

use crate::domain::{Error, ImageRef, ImageUpload, Note, NoteId};

/// Request to replace a note's image.
#[derive(Debug, Clone)]
pub struct UpdateNoteRequest {
    /// Note to update.
    pub id: NoteId,
    /// Replacement image.
    pub upload: ImageUpload,
}

/// Driving port for creating and updating notes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NoteCommand: Send + Sync {
    /// Store the image, transcribe it, and persist a new note.
    ///
    /// # Errors
    /// Internal errors when storage, transcription, or persistence fails. A
    /// newly written image is removed again when a later step fails.
    async fn add_note(&self, upload: ImageUpload) -> Result<Note, Error>;

    /// Replace a note's image and re-transcribe it.
    ///
    /// # Errors
    /// Not found when the note does not exist; in that case nothing is stored
    /// and no transcription is attempted.
    async fn update_note(&self, request: UpdateNoteRequest) -> Result<Note, Error>;

    /// Re-transcribe a note's existing image, keeping the image reference.
    ///
    /// # Errors
    /// Not found when the note or its image file is missing.
    async fn regenerate_note(&self, id: NoteId) -> Result<Note, Error>;
}

/// Fixture command returning canned notes without touching any store.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNoteCommand;

impl FixtureNoteCommand {
    fn note(id: NoteId, upload: Option<&ImageUpload>) -> Result<Note, Error> {
        let image = match upload {
            Some(upload) => ImageRef::for_content(&upload.bytes, &upload.file_name),
            None => ImageRef::new("fixture.png")
                .map_err(|err| Error::internal(err.to_string()))?,
        };
        Ok(Note {
            id,
            date_created: chrono::DateTime::UNIX_EPOCH,
            image,
            markdown: "# Fixture".to_owned(),
        })
    }
}

#[async_trait]
impl NoteCommand for FixtureNoteCommand {
    async fn add_note(&self, upload: ImageUpload) -> Result<Note, Error> {
        Self::note(NoteId::new(1), Some(&upload))
    }

    async fn update_note(&self, request: UpdateNoteRequest) -> Result<Note, Error> {
        Self::note(request.id, Some(&request.upload))
    }

    async fn regenerate_note(&self, id: NoteId) -> Result<Note, Error> {
        Self::note(id, None)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_update_keeps_requested_id() {
        let note = FixtureNoteCommand
            .update_note(UpdateNoteRequest {
                id: NoteId::new(12),
                upload: ImageUpload::new(b"img".to_vec(), "a.png"),
            })
            .await
            .expect("fixture update succeeds");
        assert_eq!(note.id, NoteId::new(12));
        assert!(note.image.as_str().ends_with(".png"));
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_regenerate_returns_markdown() {
        let note = FixtureNoteCommand
            .regenerate_note(NoteId::new(4))
            .await
            .expect("fixture regenerate succeeds");
        assert_eq!(note.markdown, "# Fixture");
    }
}
