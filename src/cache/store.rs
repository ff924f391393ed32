//! Disk-backed cache store.
//!
//! Each entry is a `<key>.meta` JSON sidecar plus a `<key>.data` body file,
//! keyed by a hash of the canonical URL. Commits go through a temp file and
//! an atomic rename so no reader ever observes a partially written entry.
//!
//! The store itself is not thread-safe; concurrent access goes through
//! [`SharedResponseCache`](super::SharedResponseCache).

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use url::Url;

use super::entry::CacheMetadata;
use crate::error::{HttpError, Result};

/// An in-progress cache write.
///
/// Obtained from [`DiskCacheStore::prepare`]; body bytes are buffered here
/// and nothing touches the disk until [`DiskCacheStore::insert`] commits
/// the handle.
#[derive(Debug)]
pub struct CacheWriteHandle {
    key: String,
    metadata: CacheMetadata,
    body: Vec<u8>,
}

impl CacheWriteHandle {
    /// Append a chunk of body data.
    pub fn write(&mut self, chunk: &[u8]) {
        self.body.extend_from_slice(chunk);
    }

    /// The metadata this handle was prepared with.
    pub fn metadata(&self) -> &CacheMetadata {
        &self.metadata
    }
}

/// Single-owner disk cache store.
#[derive(Debug)]
pub struct DiskCacheStore {
    dir: PathBuf,
}

impl DiskCacheStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(HttpError::cache)?;
        tracing::debug!(
            target: "reqguard::cache",
            dir = %dir.display(),
            "disk cache store opened"
        );
        Ok(Self { dir })
    }

    /// The directory backing this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_for(url: &str) -> String {
        let mut hasher = DefaultHasher::new();
        url.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.meta"))
    }

    fn data_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.data"))
    }

    /// Total size in bytes of everything stored.
    pub fn cache_size(&self) -> Result<u64> {
        let mut total = 0;
        for entry in fs::read_dir(&self.dir).map_err(HttpError::cache)? {
            let entry = entry.map_err(HttpError::cache)?;
            let meta = entry.metadata().map_err(HttpError::cache)?;
            if meta.is_file() {
                total += meta.len();
            }
        }
        Ok(total)
    }

    /// Read the cached body for `url`. A miss is `Ok(None)`.
    pub fn data(&self, url: &Url) -> Result<Option<Bytes>> {
        let key = Self::key_for(url.as_str());
        if !self.meta_path(&key).exists() {
            return Ok(None);
        }
        match fs::read(self.data_path(&key)) {
            Ok(body) => Ok(Some(Bytes::from(body))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(HttpError::cache(err)),
        }
    }

    /// Read the cached metadata for `url`. A miss is `Ok(None)`.
    ///
    /// A corrupt sidecar is treated as a miss and the entry is dropped.
    pub fn meta_data(&self, url: &Url) -> Result<Option<CacheMetadata>> {
        let key = Self::key_for(url.as_str());
        let raw = match fs::read(self.meta_path(&key)) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(HttpError::cache(err)),
        };

        match serde_json::from_slice(&raw) {
            Ok(metadata) => Ok(Some(metadata)),
            Err(err) => {
                tracing::warn!(
                    target: "reqguard::cache",
                    url = %url,
                    error = %err,
                    "dropping cache entry with corrupt metadata"
                );
                self.remove_key(&key)?;
                Ok(None)
            }
        }
    }

    /// Begin a write for the entry described by `metadata`.
    pub fn prepare(&self, metadata: CacheMetadata) -> Result<CacheWriteHandle> {
        let url = Url::parse(&metadata.url)
            .map_err(|err| HttpError::builder(format!("invalid cache URL: {err}")))?;
        Ok(CacheWriteHandle {
            key: Self::key_for(url.as_str()),
            metadata,
            body: Vec::new(),
        })
    }

    /// Commit a prepared write. The entry becomes visible to readers only
    /// once both files are in place; at most one entry exists per key.
    pub fn insert(&self, handle: CacheWriteHandle) -> Result<()> {
        let CacheWriteHandle {
            key,
            metadata,
            body,
        } = handle;

        self.commit_file(&self.data_path(&key), &body)?;
        let raw = serde_json::to_vec(&metadata)
            .map_err(|err| HttpError::Cache(err.to_string()))?;
        self.commit_file(&self.meta_path(&key), &raw)?;

        tracing::debug!(
            target: "reqguard::cache",
            url = %metadata.url,
            bytes = body.len(),
            "cache entry committed"
        );
        Ok(())
    }

    fn commit_file(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, contents).map_err(HttpError::cache)?;
        fs::rename(&tmp, path).map_err(HttpError::cache)?;
        Ok(())
    }

    /// Remove the entry for `url`. Returns whether an entry existed.
    pub fn remove(&self, url: &Url) -> Result<bool> {
        let key = Self::key_for(url.as_str());
        let existed = self.meta_path(&key).exists();
        self.remove_key(&key)?;
        Ok(existed)
    }

    fn remove_key(&self, key: &str) -> Result<()> {
        for path in [self.meta_path(key), self.data_path(key)] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(HttpError::cache(err)),
            }
        }
        Ok(())
    }

    /// Replace the metadata of an existing entry. A no-op when the entry
    /// is absent.
    pub fn update_meta_data(&self, metadata: CacheMetadata) -> Result<()> {
        let url = Url::parse(&metadata.url)
            .map_err(|err| HttpError::builder(format!("invalid cache URL: {err}")))?;
        let key = Self::key_for(url.as_str());
        if !self.meta_path(&key).exists() {
            return Ok(());
        }

        let raw = serde_json::to_vec(&metadata)
            .map_err(|err| HttpError::Cache(err.to_string()))?;
        self.commit_file(&self.meta_path(&key), &raw)
    }

    /// Remove every entry in the store.
    pub fn clear(&self) -> Result<()> {
        for entry in fs::read_dir(&self.dir).map_err(HttpError::cache)? {
            let entry = entry.map_err(HttpError::cache)?;
            if entry.file_type().map_err(HttpError::cache)?.is_file() {
                match fs::remove_file(entry.path()) {
                    Ok(()) => {}
                    Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                    Err(err) => return Err(HttpError::cache(err)),
                }
            }
        }
        Ok(())
    }
}
