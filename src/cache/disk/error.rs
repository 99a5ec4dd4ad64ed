//! Error types for disk cache operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiskCacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt cache header: {0}")]
    CorruptHeader(String),

    #[error("Entry of {size} bytes exceeds the cache budget of {max} bytes")]
    EntryTooLarge { size: u64, max: u64 },

    #[error("Storage full: cannot store entry")]
    StorageFull,
}

impl DiskCacheError {
    /// True for failures caused by bytes on disk rather than the filesystem itself
    pub fn is_corruption(&self) -> bool {
        match self {
            DiskCacheError::CorruptHeader(_) => true,
            DiskCacheError::Io(e) => e.kind() == std::io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncation_counts_as_corruption() {
        let eof = DiskCacheError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "short read",
        ));
        assert!(eof.is_corruption());
        assert!(DiskCacheError::CorruptHeader("magic".into()).is_corruption());

        let denied = DiskCacheError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(!denied.is_corruption());
        assert!(!DiskCacheError::StorageFull.is_corruption());
    }

    #[test]
    fn test_entry_too_large_message_names_sizes() {
        let err = DiskCacheError::EntryTooLarge { size: 200, max: 100 };
        let msg = err.to_string();
        assert!(msg.contains("200"));
        assert!(msg.contains("100"));
    }
}
