//! In-process listing revision store.
//!
//! Holds one counter per (owner, view) pair in a least-recently-used map of
//! fixed capacity. Counters live for the process lifetime, so a restart resets
//! every revision to zero; an evicted owner also restarts at zero. Validators
//! carry the account count as well, so a reset counter never matches a stale
//! listing while accounts are only ever added.

use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use lru::LruCache;
use tracing::debug;

use crate::domain::UserId;
use crate::domain::ports::{InvalidationError, ListingInvalidator, ListingView};

/// Counters kept before the least recently used one is evicted.
pub const DEFAULT_REVISION_CAPACITY: NonZeroUsize = match NonZeroUsize::new(100_000) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

/// [`ListingInvalidator`] backed by a mutex-guarded LRU map.
#[derive(Debug)]
pub struct InMemoryListingRevisions {
    revisions: Mutex<LruCache<(UserId, ListingView), u64>>,
}

impl Default for InMemoryListingRevisions {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_REVISION_CAPACITY)
    }
}

impl InMemoryListingRevisions {
    /// Create an empty store; every revision starts at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store holding at most `capacity` counters.
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            revisions: Mutex::new(LruCache::new(capacity)),
        }
    }
}

#[async_trait]
impl ListingInvalidator for InMemoryListingRevisions {
    async fn invalidate(
        &self,
        owner: &UserId,
        views: &[ListingView],
    ) -> Result<(), InvalidationError> {
        let mut revisions = self
            .revisions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for view in views {
            let key = (owner.clone(), *view);
            let revision = match revisions.get_mut(&key) {
                Some(revision) => {
                    *revision = revision.wrapping_add(1);
                    *revision
                }
                None => {
                    revisions.put(key, 1);
                    1
                }
            };
            debug!(owner = %owner, view = view.as_str(), revision, "listing invalidated");
        }
        Ok(())
    }

    async fn revision(&self, owner: &UserId, view: ListingView) -> Result<u64, InvalidationError> {
        let mut revisions = self
            .revisions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(revisions
            .get(&(owner.clone(), view))
            .copied()
            .unwrap_or_default())
    }
}
