//! Notes: a stored image of handwritten or printed notes plus its Markdown
//! transcription.
//!
//! A [`Note`] only *references* its image through an [`ImageRef`]; the bytes
//! themselves live in a blob store. Deleting a note never deletes its image.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Longest file extension carried over from an upload's original name.
const MAX_EXTENSION_LEN: usize = 10;

/// Store-assigned note identifier: the 64-bit SQLite rowid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NoteId(i64);

impl NoteId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Raw integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NoteId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Validation errors for [`ImageRef`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageRefValidationError {
    /// The name was empty.
    #[error("image name must not be empty")]
    Empty,
    /// The name was `.` or `..`.
    #[error("image name must not be a relative directory reference")]
    RelativeComponent,
    /// The name contained a path separator or NUL.
    #[error("image name must not contain path separators: {name}")]
    PathSeparator {
        /// Offending name.
        name: String,
    },
}

/// Name of a stored image: a bare filename, never a path.
///
/// # Examples
/// ```
/// use bookmd::domain::ImageRef;
///
/// let image = ImageRef::new("abc123.png").expect("plain file name");
/// assert_eq!(image.as_str(), "abc123.png");
/// assert!(ImageRef::new("../etc/passwd").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Validate and wrap a stored image name.
    ///
    /// # Errors
    /// Rejects empty names, `.`/`..`, and names containing `/`, `\` or NUL.
    pub fn new(name: impl Into<String>) -> Result<Self, ImageRefValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ImageRefValidationError::Empty);
        }
        if name == "." || name == ".." {
            return Err(ImageRefValidationError::RelativeComponent);
        }
        if name.contains(['/', '\\', '\0']) {
            return Err(ImageRefValidationError::PathSeparator { name });
        }
        Ok(Self(name))
    }

    /// Content-addressed name for `bytes`: the SHA-256 hex digest followed by
    /// the lowercased extension of `original_filename`.
    ///
    /// The extension is kept only when it is 1 to 10 ASCII alphanumerics, so
    /// the result is always a valid [`ImageRef`].
    ///
    /// # Examples
    /// ```
    /// use bookmd::domain::ImageRef;
    ///
    /// let image = ImageRef::for_content(b"hello", "Photo.PNG");
    /// assert!(image.as_str().ends_with(".png"));
    /// assert_eq!(image.as_str().len(), 64 + ".png".len());
    /// ```
    #[must_use]
    pub fn for_content(bytes: &[u8], original_filename: &str) -> Self {
        let digest = hex::encode(Sha256::digest(bytes));
        match extension_of(original_filename) {
            Some(ext) => Self(format!("{digest}.{ext}")),
            None => Self(digest),
        }
    }

    /// Borrow the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ImageRef {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

fn extension_of(filename: &str) -> Option<String> {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let (stem, ext) = base.rsplit_once('.')?;
    let acceptable = !stem.is_empty()
        && (1..=MAX_EXTENSION_LEN).contains(&ext.len())
        && ext.chars().all(|c| c.is_ascii_alphanumeric());
    acceptable.then(|| ext.to_ascii_lowercase())
}

/// A persisted note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Store-assigned identifier.
    pub id: NoteId,
    /// Creation time; never changes after insert.
    pub date_created: DateTime<Utc>,
    /// Stored image the transcription came from.
    pub image: ImageRef,
    /// Markdown transcription; may be empty.
    pub markdown: String,
}

/// Fields supplied when creating a note. The store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    /// Stored image reference.
    pub image: ImageRef,
    /// Markdown transcription.
    pub markdown: String,
}

/// Raw image received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Uploaded bytes.
    pub bytes: Vec<u8>,
    /// Filename declared by the client; only its extension is used.
    pub file_name: String,
}

impl ImageUpload {
    /// Bundle uploaded bytes with the client's filename.
    pub fn new(bytes: impl Into<Vec<u8>>, file_name: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: file_name.into(),
        }
    }
}

/// Outcome of writing an image to a blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Name the bytes are stored under.
    pub image: ImageRef,
    /// `false` when identical content was already stored under that name.
    pub newly_created: bool,
}
