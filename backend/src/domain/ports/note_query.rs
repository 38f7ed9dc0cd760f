//! Driving port for reading notes.

use async_trait::async_trait;

use crate::domain::{Error, Note};

/// Driving port for note listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NoteQuery: Send + Sync {
    /// Every note, newest first.
    async fn list_notes(&self) -> Result<Vec<Note>, Error>;
}

/// Fixture query with no notes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNoteQuery;

#[async_trait]
impl NoteQuery for FixtureNoteQuery {
    async fn list_notes(&self) -> Result<Vec<Note>, Error> {
        Ok(Vec::new())
    }
}
