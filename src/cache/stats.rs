//! Cache statistics types
//!
//! This module provides structures for tracking cache behaviour:
//! - `CacheStats`: snapshot of counters and sizes, serializable for reporting
//! - `StatsTracker`: the running counters a cache instance updates

use serde::{Deserialize, Serialize};

/// Cache statistics for monitoring and reporting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of reads that returned an entry
    pub hits: u64,
    /// Number of reads that returned nothing (absent, expired or corrupt)
    pub misses: u64,
    /// Number of entries dropped to stay within the byte budget
    pub evictions: u64,
    /// Number of files discarded because they could not be decoded
    pub corruptions: u64,
    /// Current cache size in bytes
    pub current_size_bytes: u64,
    /// Current number of items in cache
    pub current_item_count: u64,
    /// Maximum cache size in bytes
    pub max_size_bytes: u64,
}

impl CacheStats {
    /// Calculate hit rate (hits / total requests)
    /// Returns 0.0 if there are no requests
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Running counters; callers hold the cache lock while updating them
#[derive(Debug, Default)]
pub(crate) struct StatsTracker {
    hits: u64,
    misses: u64,
    evictions: u64,
    corruptions: u64,
}

impl StatsTracker {
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    pub fn record_corruption(&mut self) {
        self.corruptions += 1;
    }

    /// Get a snapshot of current statistics
    pub fn snapshot(
        &self,
        current_size_bytes: u64,
        current_item_count: u64,
        max_size_bytes: u64,
    ) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            corruptions: self.corruptions,
            current_size_bytes,
            current_item_count,
            max_size_bytes,
        }
    }
}
