//! Backend trait for filesystem operations

use super::error::DiskCacheError;
use bytes::Bytes;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Abstraction over filesystem operations to support multiple backends
pub trait DiskBackend: Send + Sync {
    /// Read entire file contents
    fn read_file(&self, path: &Path) -> Result<Bytes, DiskCacheError>;

    /// Open a file for sequential reading (used to parse only a header prefix)
    fn open_reader(&self, path: &Path) -> Result<Box<dyn Read + Send>, DiskCacheError>;

    /// Write `chunks` back to back as the new file contents, atomically
    /// (temp file + rename). On error no partial file is left behind.
    fn write_file_atomic(&self, path: &Path, chunks: &[&[u8]]) -> Result<(), DiskCacheError>;

    /// Delete a file
    fn delete_file(&self, path: &Path) -> Result<(), DiskCacheError>;

    /// Create directory and all parent directories
    fn create_dir_all(&self, path: &Path) -> Result<(), DiskCacheError>;

    /// True if `path` exists
    fn exists(&self, path: &Path) -> bool;

    /// Get file size in bytes
    fn file_size(&self, path: &Path) -> Result<u64, DiskCacheError>;

    /// List regular files directly inside a directory (non-recursive)
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>, DiskCacheError>;
}
