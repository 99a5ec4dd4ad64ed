//! Size-based LRU eviction with a hysteresis low-water mark

use super::index::CacheIndex;
use crate::cache::entry::Header;

/// Decides when and how far to prune the index for an incoming write
#[derive(Debug, Clone, Copy)]
pub struct EvictionPolicy {
    max_bytes: u64,
    hysteresis: f64,
}

impl EvictionPolicy {
    pub fn new(max_bytes: u64, hysteresis: f64) -> Self {
        Self {
            max_bytes,
            hysteresis,
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// True when writing `incoming` more bytes would reach the hard budget
    pub fn should_prune(&self, total_size: u64, incoming: u64) -> bool {
        total_size.saturating_add(incoming) >= self.max_bytes
    }

    /// True once usage plus `incoming` has dropped below the low-water mark
    pub fn below_low_water(&self, total_size: u64, incoming: u64) -> bool {
        (total_size.saturating_add(incoming) as f64) < self.max_bytes as f64 * self.hysteresis
    }

    /// Evict least recently used headers until `incoming` fits under the low-water mark.
    ///
    /// `on_evict` runs for every removed header (to delete its file); the header leaves
    /// the index whether or not that succeeds. Returns the evicted headers in eviction
    /// order. If `incoming` alone exceeds the budget the index ends up empty.
    pub fn prune<F>(&self, index: &mut CacheIndex, incoming: u64, mut on_evict: F) -> Vec<Header>
    where
        F: FnMut(&Header),
    {
        let mut evicted = Vec::new();
        if !self.should_prune(index.total_size(), incoming) {
            return evicted;
        }

        while let Some(header) = index.pop_lru() {
            on_evict(&header);
            evicted.push(header);
            if self.below_low_water(index.total_size(), incoming) {
                break;
            }
        }
        evicted
    }
}
