//! Filesystem-backed `BlobStore`.
//!
//! Images live flat under one root directory, named by content hash. Every
//! access goes through a `cap_std::fs::Dir` opened on that root, so no image
//! name (or symlink planted in the directory) can reach a file outside it.
//! A write goes to a uniquely named temporary file first and is then linked
//! into place, so readers never observe a partially written image and
//! concurrent uploads of the same bytes agree on which request created the
//! file. The blocking `cap_std` calls run on Tokio's blocking pool.

use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::ports::{BlobStore, BlobStoreError};
use crate::domain::{ImageRef, StoredImage};

/// Blob store writing images beneath a root directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Store images under `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory images are written to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run `task` against the root path on the blocking pool.
    async fn blocking<T, F>(&self, task: F) -> Result<T, BlobStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> Result<T, BlobStoreError> + Send + 'static,
    {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || task(&root))
            .await
            .map_err(|error| BlobStoreError::io(format!("blob task failed: {error}")))?
    }
}

/// Open the root for reading. `None` when it does not exist yet.
fn open_root(root: &Path) -> Result<Option<Dir>, BlobStoreError> {
    match Dir::open_ambient_dir(root, ambient_authority()) {
        Ok(dir) => Ok(Some(dir)),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
        Err(error) => Err(io_error("open", &root.display().to_string(), &error)),
    }
}

fn create_root(root: &Path) -> Result<Dir, BlobStoreError> {
    Dir::create_ambient_dir_all(root, ambient_authority())
        .and_then(|()| Dir::open_ambient_dir(root, ambient_authority()))
        .map_err(|error| {
            warn!(root = %root.display(), %error, "failed to create image directory");
            io_error("create directory", &root.display().to_string(), &error)
        })
}

fn store_in(dir: &Dir, image: ImageRef, bytes: &[u8]) -> Result<StoredImage, BlobStoreError> {
    if is_present(dir, image.as_str())? {
        debug!(%image, "image content already stored");
        return Ok(StoredImage {
            image,
            newly_created: false,
        });
    }

    let temp_name = write_temp(dir, &image, bytes)?;
    let newly_created = publish(dir, &temp_name, image.as_str())?;
    sync_directory(dir);
    debug!(%image, size = bytes.len(), newly_created, "image stored");
    Ok(StoredImage {
        image,
        newly_created,
    })
}

fn is_present(dir: &Dir, name: &str) -> Result<bool, BlobStoreError> {
    match dir.metadata(name) {
        Ok(_) => Ok(true),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
        Err(error) => Err(io_error("stat", name, &error)),
    }
}

/// Write `bytes` to a fresh hidden file and return its name.
fn write_temp(dir: &Dir, image: &ImageRef, bytes: &[u8]) -> Result<String, BlobStoreError> {
    let temp_name = format!(".{}.{}.tmp", image.as_str(), Uuid::new_v4());
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let result = dir.open_with(&temp_name, &options).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
    });

    match result {
        Ok(()) => Ok(temp_name),
        Err(error) => {
            warn!(temp_name = %temp_name, %error, "failed to write temporary image");
            discard(dir, &temp_name);
            Err(io_error("write", &temp_name, &error))
        }
    }
}

/// Move `temp_name` to `final_name` unless something already lives there.
///
/// Returns `true` when this call created `final_name`.
fn publish(dir: &Dir, temp_name: &str, final_name: &str) -> Result<bool, BlobStoreError> {
    match dir.hard_link(temp_name, dir, final_name) {
        Ok(()) => {
            discard(dir, temp_name);
            Ok(true)
        }
        Err(error) if error.kind() == ErrorKind::AlreadyExists => {
            discard(dir, temp_name);
            Ok(false)
        }
        Err(link_error) => {
            // Filesystems without hard links still get an atomic rename.
            debug!(%link_error, "hard link unavailable; renaming instead");
            dir.rename(temp_name, dir, final_name).map_err(|error| {
                warn!(from = temp_name, to = final_name, %error, "failed to move image into place");
                discard(dir, temp_name);
                io_error("rename", final_name, &error)
            })?;
            Ok(true)
        }
    }
}

fn discard(dir: &Dir, name: &str) {
    if let Err(error) = dir.remove_file(name) {
        if error.kind() != ErrorKind::NotFound {
            warn!(name, %error, "failed to remove temporary image");
        }
    }
}

fn sync_directory(dir: &Dir) {
    if let Err(error) = dir.open(".").and_then(|handle| handle.sync_all()) {
        debug!(%error, "image directory sync skipped");
    }
}

fn io_error(operation: &str, name: &str, error: &io::Error) -> BlobStoreError {
    BlobStoreError::io(format!("{operation} {name}: {error}"))
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn store(
        &self,
        bytes: &[u8],
        original_filename: &str,
    ) -> Result<StoredImage, BlobStoreError> {
        let image = ImageRef::for_content(bytes, original_filename);
        let bytes = bytes.to_vec();
        self.blocking(move |root| store_in(&create_root(root)?, image, &bytes))
            .await
    }

    async fn read(&self, image: &ImageRef) -> Result<Vec<u8>, BlobStoreError> {
        let image = image.clone();
        self.blocking(move |root| {
            let missing = || BlobStoreError::not_found(image.as_str());
            let dir = open_root(root)?.ok_or_else(missing)?;
            dir.read(image.as_str()).map_err(|error| match error.kind() {
                ErrorKind::NotFound => missing(),
                _ => io_error("read", image.as_str(), &error),
            })
        })
        .await
    }

    async fn exists(&self, image: &ImageRef) -> Result<bool, BlobStoreError> {
        let image = image.clone();
        self.blocking(move |root| match open_root(root)? {
            Some(dir) => is_present(&dir, image.as_str()),
            None => Ok(false),
        })
        .await
    }

    async fn remove(&self, image: &ImageRef) -> Result<(), BlobStoreError> {
        let image = image.clone();
        self.blocking(move |root| {
            let Some(dir) = open_root(root)? else {
                return Ok(());
            };
            match dir.remove_file(image.as_str()) {
                Ok(()) => Ok(()),
                Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
                Err(error) => Err(io_error("remove", image.as_str(), &error)),
            }
        })
        .await
    }
}
