//! Port for image byte storage.
//!
//! Blobs are addressed by [`ImageRef`], a bare file name. Stores derive the
//! name from the content via [`ImageRef::for_content`], so two different
//! uploads never share a name and re-uploading identical bytes is a no-op.

use async_trait::async_trait;

use crate::domain::{ImageRef, StoredImage};

use super::define_port_error;

define_port_error! {
    /// Errors raised by blob store adapters.
    pub enum BlobStoreError {
        /// Reading or writing the underlying storage failed.
        Io { message: String } =>
            "image storage failed: {message}",
        /// No blob exists under the name.
        NotFound { image: String } =>
            "image not found: {image}",
    }
}

/// Port for storing and retrieving uploaded images.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist `bytes` under a content-derived name.
    ///
    /// `original_filename` contributes only its extension.
    async fn store(
        &self,
        bytes: &[u8],
        original_filename: &str,
    ) -> Result<StoredImage, BlobStoreError>;

    /// Read a stored blob.
    ///
    /// # Errors
    /// [`BlobStoreError::NotFound`] when no blob exists under `image`.
    async fn read(&self, image: &ImageRef) -> Result<Vec<u8>, BlobStoreError>;

    /// Whether a blob exists under `image`.
    async fn exists(&self, image: &ImageRef) -> Result<bool, BlobStoreError>;

    /// Delete a blob. Removing an absent blob succeeds.
    async fn remove(&self, image: &ImageRef) -> Result<(), BlobStoreError>;
}

/// Fixture blob store that accepts writes and holds nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBlobStore;

#[async_trait]
impl BlobStore for FixtureBlobStore {
    async fn store(
        &self,
        bytes: &[u8],
        original_filename: &str,
    ) -> Result<StoredImage, BlobStoreError> {
        Ok(StoredImage {
            image: ImageRef::for_content(bytes, original_filename),
            newly_created: true,
        })
    }

    async fn read(&self, image: &ImageRef) -> Result<Vec<u8>, BlobStoreError> {
        Err(BlobStoreError::not_found(image.as_str()))
    }

    async fn exists(&self, _image: &ImageRef) -> Result<bool, BlobStoreError> {
        Ok(false)
    }

    async fn remove(&self, _image: &ImageRef) -> Result<(), BlobStoreError> {
        Ok(())
    }
}
