//! Diesel table definitions for the SQLite schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Notes transcribed from uploaded images.
    notes (id) {
        /// Monotonic identifier assigned by SQLite; never reused.
        id -> BigInt,
        /// Creation time with millisecond precision, set by a column default.
        date_created -> Timestamp,
        /// File name of the stored image.
        image -> Text,
        /// Markdown transcription.
        markdown -> Text,
    }
}
