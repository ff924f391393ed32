//! Lock-guarded, process-wide view of the disk cache store.
//!
//! There is exactly one [`DiskCacheStore`] per process. The first wrapper
//! constructed creates it, under the same lock that serializes every
//! subsequent operation, so initialization never races and never relies on
//! static-initialization ordering. All wrapper instances are peers; the
//! cache directory passed to later constructors is ignored.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use bytes::Bytes;
use url::Url;

use super::entry::CacheMetadata;
use super::store::{CacheWriteHandle, DiskCacheStore};
use crate::error::{HttpError, Result};

static STORE: Mutex<Option<DiskCacheStore>> = Mutex::new(None);

/// Concurrency-safe wrapper around the single process-wide cache store.
///
/// Every operation acquires the shared lock, delegates to the store, and
/// releases the lock before returning, making all cache operations
/// linearizable regardless of the calling thread.
#[derive(Debug, Clone, Copy)]
pub struct SharedResponseCache;

impl SharedResponseCache {
    /// Create a wrapper, initializing the process-wide store at
    /// `cache_dir` if no wrapper has done so yet.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut store = STORE.lock().unwrap_or_else(PoisonError::into_inner);
        if store.is_none() {
            *store = Some(DiskCacheStore::open(cache_dir)?);
        }
        Ok(Self)
    }

    fn with_store<T>(f: impl FnOnce(&DiskCacheStore) -> Result<T>) -> Result<T> {
        let store = STORE.lock().unwrap_or_else(PoisonError::into_inner);
        match store.as_ref() {
            Some(store) => f(store),
            None => Err(HttpError::Cache(
                "shared cache store not initialized".to_string(),
            )),
        }
    }

    /// Total size in bytes of the cache store.
    pub fn cache_size(&self) -> Result<u64> {
        Self::with_store(|store| store.cache_size())
    }

    /// Read the cached body for `url`. A miss is `Ok(None)`.
    pub fn data(&self, url: &Url) -> Result<Option<Bytes>> {
        Self::with_store(|store| store.data(url))
    }

    /// Read the cached metadata for `url`. A miss is `Ok(None)`.
    pub fn meta_data(&self, url: &Url) -> Result<Option<CacheMetadata>> {
        Self::with_store(|store| store.meta_data(url))
    }

    /// Begin a write for the entry described by `metadata`.
    pub fn prepare(&self, metadata: CacheMetadata) -> Result<CacheWriteHandle> {
        Self::with_store(|store| store.prepare(metadata))
    }

    /// Commit a prepared write. Fully committed before any subsequent
    /// read can observe the entry.
    pub fn insert(&self, handle: CacheWriteHandle) -> Result<()> {
        Self::with_store(|store| store.insert(handle))
    }

    /// Remove the entry for `url`. Returns whether an entry existed.
    pub fn remove(&self, url: &Url) -> Result<bool> {
        Self::with_store(|store| store.remove(url))
    }

    /// Replace the metadata of an existing entry.
    pub fn update_meta_data(&self, metadata: CacheMetadata) -> Result<()> {
        Self::with_store(|store| store.update_meta_data(metadata))
    }

    /// Remove every entry in the store.
    pub fn clear(&self) -> Result<()> {
        Self::with_store(|store| store.clear())
    }
}
