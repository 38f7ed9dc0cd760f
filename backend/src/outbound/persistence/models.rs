//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use super::schema::notes;

/// Row struct for reading from the notes table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct NoteRow {
    pub id: i64,
    pub date_created: NaiveDateTime,
    pub image: String,
    pub markdown: String,
}

/// Insertable struct for creating note records. `id` and `date_created` come
/// from the store.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notes)]
pub(crate) struct NewNoteRow<'a> {
    pub image: &'a str,
    pub markdown: &'a str,
}

/// Changeset for replacing a note's image and transcription.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = notes)]
pub(crate) struct NoteUpdate<'a> {
    pub image: &'a str,
    pub markdown: &'a str,
}
