//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{NoteCommand, NoteQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub notes: Arc<dyn NoteCommand>,
    pub notes_query: Arc<dyn NoteQuery>,
}

impl HttpState {
    /// Construct state from the note use-cases.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use bookmd::domain::ports::{FixtureNoteCommand, FixtureNoteQuery};
    /// use bookmd::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(Arc::new(FixtureNoteCommand), Arc::new(FixtureNoteQuery));
    /// let _notes = state.notes.clone();
    /// ```
    pub fn new(notes: Arc<dyn NoteCommand>, notes_query: Arc<dyn NoteQuery>) -> Self {
        Self { notes, notes_query }
    }
}
