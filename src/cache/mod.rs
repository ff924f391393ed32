//! Disk-backed HTTP response caching.
//!
//! One [`DiskCacheStore`] exists per process; every [`SharedResponseCache`]
//! wrapper instance is a peer view onto it, serialized by a single shared
//! lock so the store tolerates calls from any thread.

mod entry;
mod shared;
mod store;

pub use entry::CacheMetadata;
pub use shared::SharedResponseCache;
pub use store::{CacheWriteHandle, DiskCacheStore};
