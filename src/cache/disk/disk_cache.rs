//! Main DiskCache implementation

use super::backend::DiskBackend;
use super::error::DiskCacheError;
use super::eviction::EvictionPolicy;
use super::fs_backend::StdFsBackend;
use super::header::{decode_header, encode_header, read_header};
use super::index::CacheIndex;
use super::utils::{cache_key_to_file_path, is_temp_file};
use crate::cache::codec::ValueCodec;
use crate::cache::config::{DiskCacheConfig, FileNaming, OversizePolicy};
use crate::cache::entry::{absolute_ttl, now_millis, Entry, Header};
use crate::cache::error::CacheError;
use crate::cache::stats::{CacheStats, StatsTracker};
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// State guarded by the cache lock
#[derive(Default)]
struct CacheState {
    index: CacheIndex,
    stats: StatsTracker,
    /// Key whose entry currently occupies each cache file
    owners: HashMap<PathBuf, String>,
}

impl CacheState {
    /// Forget `key` as the owner of `path`; another key's claim is left alone
    fn release_owner(&mut self, path: &Path, key: &str) {
        if self.owners.get(path).map(String::as_str) == Some(key) {
            self.owners.remove(path);
        }
    }
}

/// Disk-based cache with a byte budget, TTL metadata and LRU eviction.
///
/// Every operation runs under one lock, so index and files change together from the
/// caller's point of view. Operations block on file I/O. The directory must not be
/// shared with another `DiskCache` (in this or any other process).
pub struct DiskCache {
    root: PathBuf,
    file_naming: FileNaming,
    oversize_policy: OversizePolicy,
    policy: EvictionPolicy,
    backend: Arc<dyn DiskBackend>,
    state: Mutex<CacheState>,
}

impl DiskCache {
    /// Create a cache on the local filesystem. Call `initialize` before use.
    pub fn new(config: DiskCacheConfig) -> Result<Self, CacheError> {
        Self::with_backend(config, Arc::new(StdFsBackend::new()))
    }

    /// Create a cache over an arbitrary storage backend
    pub fn with_backend(
        config: DiskCacheConfig,
        backend: Arc<dyn DiskBackend>,
    ) -> Result<Self, CacheError> {
        config.validate().map_err(CacheError::ConfigurationError)?;

        Ok(Self {
            root: config.cache_dir,
            file_naming: config.file_naming,
            oversize_policy: config.oversize_policy,
            policy: EvictionPolicy::new(config.max_cache_size_bytes, config.hysteresis),
            backend,
            state: Mutex::new(CacheState::default()),
        })
    }

    /// Populate the index from files left by a previous session.
    ///
    /// Creates the root directory if it is missing. Files whose header cannot be
    /// read are deleted; nothing here returns an error.
    pub fn initialize(&self) {
        let mut state = self.state.lock();

        if !self.backend.exists(&self.root) {
            if let Err(e) = self.backend.create_dir_all(&self.root) {
                tracing::error!(
                    path = %self.root.display(),
                    error = %e,
                    "Unable to create cache directory"
                );
            }
            return;
        }

        let files = match self.backend.read_dir(&self.root) {
            Ok(files) => files,
            Err(e) => {
                tracing::error!(
                    path = %self.root.display(),
                    error = %e,
                    "Unable to list cache directory"
                );
                return;
            }
        };

        for path in files {
            if is_temp_file(&path) {
                self.delete_logged(&path, None);
                continue;
            }

            match self.scan_file(&path) {
                Ok(header) => {
                    state.owners.insert(path, header.key.clone());
                    state.index.insert(header);
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Discarding unreadable cache file"
                    );
                    if e.is_corruption() {
                        state.stats.record_corruption();
                    }
                    self.delete_logged(&path, None);
                }
            }
        }

        tracing::info!(
            path = %self.root.display(),
            entries = state.index.len(),
            total_size = state.index.total_size(),
            "Disk cache initialized"
        );
    }

    /// True if the index holds `key`. Touches neither the disk nor recency.
    pub fn has(&self, key: &str) -> bool {
        self.state.lock().index.contains(key)
    }

    /// Read the entry for `key`.
    ///
    /// Absent, expired and unreadable entries all yield `None`; unreadable files are
    /// deleted along with their index entry.
    pub fn get(&self, key: &str) -> Option<Entry> {
        let mut state = self.state.lock();

        let header = match state.index.peek(key) {
            Some(header) => header.clone(),
            None => {
                state.stats.record_miss();
                return None;
            }
        };

        if header.is_expired(now_millis()) {
            tracing::debug!(key = key, "Cache entry expired");
            state.stats.record_miss();
            return None;
        }

        let data = match self.read_payload(&mut state, key) {
            Some(data) => data,
            None => {
                state.stats.record_miss();
                return None;
            }
        };

        state.index.get(key);
        state.stats.record_hit();
        Some(header.to_entry(data))
    }

    /// Store `data` under `key`, expiring `ttl_millis` from now (negative = already
    /// expired). The soft TTL equals the hard TTL.
    pub fn put(
        &self,
        key: &str,
        data: impl Into<Bytes>,
        ttl_millis: i64,
    ) -> Result<(), DiskCacheError> {
        let ttl = absolute_ttl(now_millis(), ttl_millis);
        self.put_entry(key, Entry::new(data.into(), ttl))
    }

    /// Store a fully described entry under `key`
    pub fn put_entry(&self, key: &str, entry: Entry) -> Result<(), DiskCacheError> {
        let mut state = self.state.lock();
        let header = Header::for_entry(key, &entry);
        self.store(&mut state, header, &entry.data)
    }

    /// Mark `key` as needing refresh (soft TTL = 0); with `full_expire`, also expire it
    /// (TTL = 0). No-op for unknown keys.
    pub fn invalidate(&self, key: &str, full_expire: bool) -> Result<(), DiskCacheError> {
        let mut state = self.state.lock();

        let mut header = match state.index.peek(key) {
            Some(header) => header.clone(),
            None => return Ok(()),
        };

        let data = match self.read_payload(&mut state, key) {
            Some(data) => data,
            None => return Ok(()),
        };

        header.soft_ttl = 0;
        if full_expire {
            header.ttl = 0;
        }
        self.store(&mut state, header, &data)
    }

    /// Delete `key` from disk and the index. Delete failures are only logged.
    ///
    /// A file that now holds a different key's entry is left in place.
    pub fn remove(&self, key: &str) {
        let mut state = self.state.lock();
        let path = self.path_for_key(key);

        let owned_by_other = matches!(state.owners.get(&path), Some(owner) if owner != key);
        if !owned_by_other {
            self.delete_logged(&path, Some(key));
        }
        state.release_owner(&path, key);
        state.index.remove(key);
    }

    /// Delete every file directly inside the root directory and empty the index
    pub fn clear(&self) {
        let mut state = self.state.lock();

        match self.backend.read_dir(&self.root) {
            Ok(files) => {
                for path in files {
                    self.delete_logged(&path, None);
                }
            }
            Err(e) => tracing::warn!(
                path = %self.root.display(),
                error = %e,
                "Unable to list cache directory for clearing"
            ),
        }

        state.index.clear();
        state.owners.clear();
        tracing::debug!(path = %self.root.display(), "Cache cleared");
    }

    /// Encode `value` with `codec` and store it
    pub fn put_value<T, C>(
        &self,
        key: &str,
        value: &T,
        ttl_millis: i64,
        codec: &C,
    ) -> Result<(), CacheError>
    where
        C: ValueCodec<T>,
    {
        let bytes = codec.encode(value)?;
        self.put(key, bytes, ttl_millis)?;
        Ok(())
    }

    /// Read and decode the value stored under `key`; undecodable payloads are misses
    pub fn get_value<T, C>(&self, key: &str, codec: &C) -> Option<T>
    where
        C: ValueCodec<T>,
    {
        let entry = self.get(key)?;
        match codec.decode(&entry.data) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = key, error = %e, "Could not decode cached value");
                None
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        state.stats.snapshot(
            state.index.total_size(),
            state.index.len() as u64,
            self.policy.max_bytes(),
        )
    }

    /// Cached keys from least to most recently used
    pub fn keys(&self) -> Vec<String> {
        let state = self.state.lock();
        state.index.iter().map(|h| h.key.clone()).collect()
    }

    /// Indexed metadata for `key`, without touching recency or disk
    pub fn header(&self, key: &str) -> Option<Header> {
        self.state.lock().index.peek(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().index.is_empty()
    }

    /// Sum of payload sizes currently indexed
    pub fn total_size(&self) -> u64 {
        self.state.lock().index.total_size()
    }

    pub fn root_dir(&self) -> &Path {
        &self.root
    }

    /// File that holds (or would hold) the entry for `key`
    pub fn path_for_key(&self, key: &str) -> PathBuf {
        cache_key_to_file_path(&self.root, key, self.file_naming)
    }

    /// Evict as needed, then write header + payload and index the entry.
    /// The index is untouched if the write fails. A different key that shared the
    /// file is dropped from the index, since its entry was just overwritten.
    fn store(
        &self,
        state: &mut CacheState,
        mut header: Header,
        data: &[u8],
    ) -> Result<(), DiskCacheError> {
        let size = data.len() as u64;
        header.size = size;

        if self.oversize_policy == OversizePolicy::Reject && size > self.policy.max_bytes() {
            return Err(DiskCacheError::EntryTooLarge {
                size,
                max: self.policy.max_bytes(),
            });
        }

        let CacheState {
            index,
            stats,
            owners,
        } = &mut *state;
        let evicted = self.policy.prune(index, size, |victim| {
            tracing::debug!(key = %victim.key, size = victim.size, "Evicting cache entry");
            let victim_path = self.path_for_key(&victim.key);
            owners.remove(&victim_path);
            self.delete_logged(&victim_path, Some(&victim.key));
        });
        stats.record_evictions(evicted.len());

        let path = self.path_for_key(&header.key);
        let encoded = encode_header(&header);
        if let Err(e) = self.backend.write_file_atomic(&path, &[&encoded[..], data]) {
            tracing::warn!(
                key = %header.key,
                path = %path.display(),
                error = %e,
                "Failed to write cache entry"
            );
            return Err(e);
        }

        if let Some(previous) = state.owners.insert(path, header.key.clone()) {
            if previous != header.key && state.index.remove(&previous).is_some() {
                tracing::debug!(
                    key = %header.key,
                    displaced = %previous,
                    "Cache file taken over by a colliding key"
                );
            }
        }
        state.index.insert(header);
        Ok(())
    }

    /// Read the payload stored for `key`, dropping the entry if the file is unusable
    fn read_payload(&self, state: &mut CacheState, key: &str) -> Option<Bytes> {
        let path = self.path_for_key(key);

        let result = self.backend.read_file(&path).and_then(|data| {
            let (file_header, consumed) = decode_header(&data)?;
            Ok((file_header, data.slice(consumed..)))
        });

        match result {
            Ok((file_header, payload)) if file_header.key == key => Some(payload),
            Ok((file_header, _)) => {
                // Another key hashed to the same file and replaced ours
                tracing::debug!(
                    key = key,
                    other_key = %file_header.key,
                    path = %path.display(),
                    "Cache file belongs to a different key"
                );
                state.release_owner(&path, key);
                state.index.remove(key);
                None
            }
            Err(e) => {
                tracing::warn!(
                    key = key,
                    path = %path.display(),
                    error = %e,
                    "Discarding unreadable cache entry"
                );
                if e.is_corruption() {
                    state.stats.record_corruption();
                }
                self.delete_logged(&path, Some(key));
                state.owners.remove(&path);
                state.index.remove(key);
                None
            }
        }
    }

    /// Parse only the header of `path` and size it from the file length
    fn scan_file(&self, path: &Path) -> Result<Header, DiskCacheError> {
        let mut reader = self.backend.open_reader(path)?;
        let (mut header, header_len) = read_header(&mut reader)?;

        if self.path_for_key(&header.key) != path {
            return Err(DiskCacheError::CorruptHeader(format!(
                "file does not match the name derived from key '{}'",
                header.key
            )));
        }

        let file_len = self.backend.file_size(path)?;
        header.size = file_len.saturating_sub(header_len);
        Ok(header)
    }

    fn delete_logged(&self, path: &Path, key: Option<&str>) {
        match self.backend.delete_file(path) {
            Ok(()) => {}
            Err(DiskCacheError::Io(e)) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                key = key.unwrap_or(""),
                path = %path.display(),
                error = %e,
                "Could not delete cache file"
            ),
        }
    }
}
