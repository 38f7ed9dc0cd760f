//! SQLite persistence adapters using Diesel ORM.
//!
//! Repository implementations translate between Diesel row structs and
//! domain types and nothing more. Row structs (`models.rs`) and the table
//! definition (`schema.rs`) never leave this module. Connections come from a
//! `bb8` pool over `diesel-async`'s sync connection wrapper.
//!
//! # Example
//!
//! ```ignore
//! use bookmd::outbound::persistence::{DbPool, DieselNoteRepository, PoolConfig, run_migrations};
//!
//! run_migrations("./notes.db").await?;
//! let pool = DbPool::new(PoolConfig::new("./notes.db")).await?;
//! let repo = DieselNoteRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_note_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_note_repository::DieselNoteRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError, SqliteAsyncConnection};
