//! Disk-based cache implementation
//!
//! One file per key inside a root directory. Each file is a binary header
//! (see [`header`]) immediately followed by the raw payload. An in-memory,
//! recency-ordered index tracks every entry's header and the total payload size;
//! writes that would push the total past the budget first evict the least recently
//! used entries down to a hysteresis low-water mark.
//!
//! Filesystem access goes through the [`backend::DiskBackend`] trait so the cache
//! logic can be exercised against an in-memory backend.

// Re-export main types
pub use self::disk_cache::DiskCache;
pub use self::error::DiskCacheError;
pub use self::eviction::EvictionPolicy;
pub use self::fs_backend::StdFsBackend;
pub use self::index::CacheIndex;

pub mod backend;
mod disk_cache;
mod error;
mod eviction;
mod fs_backend;
pub mod header;
mod index;
pub mod utils;

#[cfg(test)]
mod mock_backend;
