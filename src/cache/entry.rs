//! Cache entry and header types
//!
//! This module defines the core cache record structures:
//! - `Entry`: payload plus freshness metadata, as returned to callers
//! - `Header`: the persisted metadata for one entry (everything except the payload),
//!   which is what the in-memory index tracks and eviction operates on

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Milliseconds since the UNIX epoch
pub type Timestamp = u64;

/// Current wall-clock time in milliseconds since the UNIX epoch
pub fn now_millis() -> Timestamp {
    // Clocks set before 1970 collapse to the epoch
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Relative TTLs at or beyond this value never expire
const SATURATING_TTL_MS: i64 = i64::MAX >> 1;

/// Convert a relative TTL into an absolute expiry instant.
///
/// Negative TTLs yield an instant in the past. TTLs at or beyond half of the
/// `i64` range saturate to `Timestamp::MAX` instead of overflowing.
pub fn absolute_ttl(now: Timestamp, ttl_millis: i64) -> Timestamp {
    if ttl_millis >= SATURATING_TTL_MS {
        Timestamp::MAX
    } else {
        now.saturating_add_signed(ttl_millis)
    }
}

/// A cached record returned by the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The cached payload bytes
    pub data: Bytes,
    /// ETag for cache coherency
    pub etag: Option<String>,
    /// Date of the response as reported by the origin
    pub server_date: Timestamp,
    /// Last-modified date of the cached object
    pub last_modified: Timestamp,
    /// Absolute instant after which the entry is unusable
    pub ttl: Timestamp,
    /// Absolute instant after which the entry should be refreshed
    pub soft_ttl: Timestamp,
    /// Response headers captured with the payload
    pub headers: BTreeMap<String, String>,
}

impl Entry {
    /// Create an entry whose hard and soft TTL are both `ttl`
    pub fn new(data: Bytes, ttl: Timestamp) -> Self {
        Self {
            data,
            etag: None,
            server_date: 0,
            last_modified: 0,
            ttl,
            soft_ttl: ttl,
            headers: BTreeMap::new(),
        }
    }

    /// True if the entry is past its hard TTL
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.ttl < now
    }

    /// True if the entry is past its soft TTL and should be refetched
    pub fn refresh_needed(&self, now: Timestamp) -> bool {
        self.soft_ttl < now
    }
}

/// Persisted metadata for one cache entry
///
/// `size` is derived from the payload length and never written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub key: String,
    pub etag: Option<String>,
    pub server_date: Timestamp,
    pub last_modified: Timestamp,
    pub ttl: Timestamp,
    pub soft_ttl: Timestamp,
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub size: u64,
}

impl Header {
    /// Build the header describing `entry` under `key`
    pub fn for_entry(key: &str, entry: &Entry) -> Self {
        Self {
            key: key.to_string(),
            etag: entry.etag.clone(),
            server_date: entry.server_date,
            last_modified: entry.last_modified,
            ttl: entry.ttl,
            soft_ttl: entry.soft_ttl,
            headers: entry.headers.clone(),
            size: entry.data.len() as u64,
        }
    }

    /// Reattach a payload to produce the caller-facing entry
    pub fn to_entry(&self, data: Bytes) -> Entry {
        Entry {
            data,
            etag: self.etag.clone(),
            server_date: self.server_date,
            last_modified: self.last_modified,
            ttl: self.ttl,
            soft_ttl: self.soft_ttl,
            headers: self.headers.clone(),
        }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.ttl < now
    }

    pub fn refresh_needed(&self, now: Timestamp) -> bool {
        self.soft_ttl < now
    }
}
