//! Blob storage adapters for uploaded images.

mod fs_blob_store;

pub use fs_blob_store::FsBlobStore;
