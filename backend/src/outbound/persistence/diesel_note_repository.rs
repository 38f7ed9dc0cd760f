//! SQLite-backed `NoteRepository` implementation using Diesel ORM.
//!
//! Writes use `RETURNING` so the store-assigned id and timestamp come back in
//! the same statement that created or changed the row.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{NoteRepository, NoteRepositoryError};
use crate::domain::{ImageRef, NewNote, Note, NoteId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewNoteRow, NoteRow, NoteUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::notes;

/// Diesel-backed implementation of the `NoteRepository` port.
#[derive(Clone)]
pub struct DieselNoteRepository {
    pool: DbPool,
}

impl DieselNoteRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> NoteRepositoryError {
    map_basic_pool_error(error, NoteRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> NoteRepositoryError {
    map_basic_diesel_error(
        error,
        NoteRepositoryError::query,
        NoteRepositoryError::connection,
    )
}

/// Convert a database row to a domain note.
fn row_to_note(row: NoteRow) -> Result<Note, NoteRepositoryError> {
    let image = ImageRef::new(row.image).map_err(|err| {
        NoteRepositoryError::query(format!("note {} has an invalid image name: {err}", row.id))
    })?;
    Ok(Note {
        id: NoteId::new(row.id),
        date_created: row.date_created.and_utc(),
        image,
        markdown: row.markdown,
    })
}

#[async_trait]
impl NoteRepository for DieselNoteRepository {
    async fn create(&self, note: &NewNote) -> Result<Note, NoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::insert_into(notes::table)
            .values(NewNoteRow {
                image: note.image.as_str(),
                markdown: &note.markdown,
            })
            .returning(NoteRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_note(row)
    }

    async fn update_by_id(
        &self,
        id: NoteId,
        image: &ImageRef,
        markdown: &str,
    ) -> Result<Note, NoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::update(notes::table.find(id.get()))
            .set(NoteUpdate {
                image: image.as_str(),
                markdown,
            })
            .returning(NoteRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .ok_or_else(|| NoteRepositoryError::not_found(id))?;

        row_to_note(row)
    }

    async fn get_by_id(&self, id: NoteId) -> Result<Note, NoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = notes::table
            .find(id.get())
            .select(NoteRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .ok_or_else(|| NoteRepositoryError::not_found(id))?;

        row_to_note(row)
    }

    async fn delete_by_id(&self, id: NoteId) -> Result<(), NoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(notes::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if deleted == 0 {
            return Err(NoteRepositoryError::not_found(id));
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Note>, NoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<NoteRow> = notes::table
            .order((notes::date_created.desc(), notes::id.desc()))
            .select(NoteRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_note).collect()
    }

    async fn references_image(&self, image: &ImageRef) -> Result<bool, NoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::select(diesel::dsl::exists(
            notes::table.filter(notes::image.eq(image.as_str())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }
}
