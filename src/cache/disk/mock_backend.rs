//! Mock disk backend for testing (in-memory HashMap storage)

use super::backend::DiskBackend;
use super::error::DiskCacheError;
use bytes::{Bytes, BytesMut};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Mock backend that stores files in memory for testing
#[derive(Clone, Default)]
pub struct MockDiskBackend {
    files: Arc<RwLock<HashMap<PathBuf, Bytes>>>,
    directories: Arc<RwLock<Vec<PathBuf>>>,
    /// Simulate errors if true
    simulate_storage_full: Arc<RwLock<bool>>,
    simulate_delete_failure: Arc<RwLock<bool>>,
    simulate_mkdir_failure: Arc<RwLock<bool>>,
}

impl MockDiskBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every write with `StorageFull`
    pub fn set_storage_full(&self, enabled: bool) {
        *self.simulate_storage_full.write() = enabled;
    }

    /// Fail every delete with a permission error (files stay in place)
    pub fn set_delete_failure(&self, enabled: bool) {
        *self.simulate_delete_failure.write() = enabled;
    }

    /// Fail directory creation with a permission error
    pub fn set_mkdir_failure(&self, enabled: bool) {
        *self.simulate_mkdir_failure.write() = enabled;
    }

    /// Get number of stored files
    pub fn file_count(&self) -> usize {
        self.files.read().len()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.read().contains_key(path)
    }

    /// Place raw bytes at `path`, bypassing the cache
    pub fn insert_raw(&self, path: &Path, data: &[u8]) {
        self.files
            .write()
            .insert(path.to_path_buf(), Bytes::copy_from_slice(data));
    }

    fn permission_denied() -> DiskCacheError {
        DiskCacheError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "Simulated permission denied",
        ))
    }

    fn not_found() -> DiskCacheError {
        DiskCacheError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "File not found",
        ))
    }
}

impl DiskBackend for MockDiskBackend {
    fn read_file(&self, path: &Path) -> Result<Bytes, DiskCacheError> {
        self.files
            .read()
            .get(path)
            .cloned()
            .ok_or_else(Self::not_found)
    }

    fn open_reader(&self, path: &Path) -> Result<Box<dyn Read + Send>, DiskCacheError> {
        let data = self.read_file(path)?;
        Ok(Box::new(Cursor::new(data)))
    }

    fn write_file_atomic(&self, path: &Path, chunks: &[&[u8]]) -> Result<(), DiskCacheError> {
        if *self.simulate_storage_full.read() {
            return Err(DiskCacheError::StorageFull);
        }

        let mut data = BytesMut::new();
        for chunk in chunks {
            data.extend_from_slice(chunk);
        }
        self.files.write().insert(path.to_path_buf(), data.freeze());
        Ok(())
    }

    fn delete_file(&self, path: &Path) -> Result<(), DiskCacheError> {
        if *self.simulate_delete_failure.read() {
            return Err(Self::permission_denied());
        }

        self.files
            .write()
            .remove(path)
            .map(|_| ())
            .ok_or_else(Self::not_found)
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), DiskCacheError> {
        if *self.simulate_mkdir_failure.read() {
            return Err(Self::permission_denied());
        }

        let mut dirs = self.directories.write();
        if !dirs.iter().any(|d| d == path) {
            dirs.push(path.to_path_buf());
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.directories.read().iter().any(|d| d == path) || self.contains(path)
    }

    fn file_size(&self, path: &Path) -> Result<u64, DiskCacheError> {
        self.files
            .read()
            .get(path)
            .map(|data| data.len() as u64)
            .ok_or_else(Self::not_found)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>, DiskCacheError> {
        if !self.exists(path) {
            return Err(Self::not_found());
        }

        let files = self.files.read();
        let entries: Vec<PathBuf> = files
            .keys()
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect();

        Ok(entries)
    }
}
