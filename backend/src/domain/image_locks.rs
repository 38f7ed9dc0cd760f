//! Per-image async locks.
//!
//! Identical uploads share one content-addressed name. Holding the lock for
//! that name from the blob write until the note row is committed (or the blob
//! is compensated away) keeps one request's cleanup from deleting a blob that
//! another request is about to reference.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::ImageRef;

type Slot = Arc<AsyncMutex<()>>;

/// Registry of locks keyed by stored image name.
///
/// Entries are dropped again once nobody holds or waits for them.
#[derive(Debug, Default)]
pub(crate) struct ImageLocks {
    slots: Mutex<HashMap<ImageRef, Slot>>,
}

impl ImageLocks {
    fn slots(&self) -> MutexGuard<'_, HashMap<ImageRef, Slot>> {
        // The map stays consistent across a panicking holder; keep using it.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait until no other request holds `image`, then hold it until the
    /// returned guard is dropped.
    pub(crate) async fn acquire(&self, image: &ImageRef) -> ImageLockGuard<'_> {
        let slot = self.slots().entry(image.clone()).or_default().clone();
        let held = Arc::clone(&slot).lock_owned().await;
        ImageLockGuard {
            locks: self,
            image: image.clone(),
            slot,
            held: Some(held),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots().len()
    }
}

/// Exclusive hold on one image name.
#[derive(Debug)]
pub(crate) struct ImageLockGuard<'a> {
    locks: &'a ImageLocks,
    image: ImageRef,
    slot: Slot,
    held: Option<OwnedMutexGuard<()>>,
}

impl Drop for ImageLockGuard<'_> {
    fn drop(&mut self) {
        self.held.take();
        let mut slots = self.locks.slots();
        // One reference lives in the map and one in this guard; anything
        // more is a waiter that still needs the entry.
        if Arc::strong_count(&self.slot) <= 2 {
            slots.remove(&self.image);
        }
    }
}
