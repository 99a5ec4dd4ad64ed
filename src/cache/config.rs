//! Cache configuration types
//!
//! This module defines the disk cache configuration:
//! - Root directory and byte budget
//! - Hysteresis low-water mark used by eviction
//! - File naming scheme and oversize-entry policy

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{DEFAULT_CACHE_DIR, DEFAULT_HYSTERESIS, DEFAULT_MAX_CACHE_SIZE_BYTES};

/// How cache keys are turned into filenames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FileNaming {
    /// Concatenated 32-bit hashes of each half of the key (short, may collide)
    #[default]
    HalfKeyHash,
    /// Hex SHA-256 of the key (long, effectively collision-free)
    Sha256,
}

/// What to do with an entry whose payload alone exceeds the whole budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OversizePolicy {
    /// Evict everything else and store it anyway
    #[default]
    Admit,
    /// Refuse the write before evicting anything
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskCacheConfig {
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    #[serde(default = "default_max_cache_size_bytes")]
    pub max_cache_size_bytes: u64,
    #[serde(default = "default_hysteresis")]
    pub hysteresis: f64,
    #[serde(default)]
    pub file_naming: FileNaming,
    #[serde(default)]
    pub oversize_policy: OversizePolicy,
}

impl Default for DiskCacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            max_cache_size_bytes: default_max_cache_size_bytes(),
            hysteresis: default_hysteresis(),
            file_naming: FileNaming::default(),
            oversize_policy: OversizePolicy::default(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_DIR)
}

fn default_max_cache_size_bytes() -> u64 {
    DEFAULT_MAX_CACHE_SIZE_BYTES
}

fn default_hysteresis() -> f64 {
    DEFAULT_HYSTERESIS
}

impl DiskCacheConfig {
    /// Configuration rooted at `cache_dir` with every other field defaulted
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_max_size(mut self, max_cache_size_bytes: u64) -> Self {
        self.max_cache_size_bytes = max_cache_size_bytes;
        self
    }

    pub fn with_hysteresis(mut self, hysteresis: f64) -> Self {
        self.hysteresis = hysteresis;
        self
    }

    pub fn with_file_naming(mut self, file_naming: FileNaming) -> Self {
        self.file_naming = file_naming;
        self
    }

    pub fn with_oversize_policy(mut self, oversize_policy: OversizePolicy) -> Self {
        self.oversize_policy = oversize_policy;
        self
    }

    /// Validate disk cache configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_dir.as_os_str().is_empty() {
            return Err("cache_dir cannot be empty".to_string());
        }
        if self.max_cache_size_bytes == 0 {
            return Err("max_cache_size_bytes must be greater than 0".to_string());
        }
        if !(self.hysteresis > 0.0 && self.hysteresis <= 1.0) {
            return Err(format!(
                "hysteresis must be in (0, 1], got {}",
                self.hysteresis
            ));
        }
        Ok(())
    }
}
