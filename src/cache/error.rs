//! Cache error types
//!
//! This module defines the crate-level error type for cache configuration and
//! value encoding. Disk-level failures live in `disk::DiskCacheError` and convert
//! into `CacheError`.

/// Cache error types
#[derive(Debug)]
pub enum CacheError {
    /// I/O error
    IoError(std::io::Error),
    /// Disk cache operation failed
    Disk(crate::cache::disk::DiskCacheError),
    /// Configuration error
    ConfigurationError(String),
    /// Serialization/deserialization error
    SerializationError(String),
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::IoError(err) => write!(f, "I/O error: {}", err),
            CacheError::Disk(err) => write!(f, "Disk cache error: {}", err),
            CacheError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            CacheError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::IoError(err) => Some(err),
            CacheError::Disk(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::IoError(err)
    }
}

impl From<crate::cache::disk::DiskCacheError> for CacheError {
    fn from(err: crate::cache::disk::DiskCacheError) -> Self {
        CacheError::Disk(err)
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::SerializationError(err.to_string())
    }
}
