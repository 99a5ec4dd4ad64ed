//! std::fs-based filesystem backend (portable, works on all platforms)

use super::backend::DiskBackend;
use super::error::DiskCacheError;
use super::utils::temp_path_for;
use bytes::Bytes;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Blocking filesystem backend using std::fs
#[derive(Default)]
pub struct StdFsBackend;

impl StdFsBackend {
    pub fn new() -> Self {
        Self
    }

    fn write_temp(temp_path: &Path, chunks: &[&[u8]]) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(temp_path)?);
        for chunk in chunks {
            writer.write_all(chunk)?;
        }
        writer.flush()?;
        writer.get_ref().sync_all()
    }
}

impl DiskBackend for StdFsBackend {
    fn read_file(&self, path: &Path) -> Result<Bytes, DiskCacheError> {
        let data = fs::read(path)?;
        Ok(Bytes::from(data))
    }

    fn open_reader(&self, path: &Path) -> Result<Box<dyn Read + Send>, DiskCacheError> {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn write_file_atomic(&self, path: &Path, chunks: &[&[u8]]) -> Result<(), DiskCacheError> {
        let temp_path = temp_path_for(path);

        let result =
            Self::write_temp(&temp_path, chunks).and_then(|_| fs::rename(&temp_path, path));
        if let Err(e) = result {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %temp_path.display(),
                        error = %cleanup,
                        "Could not clean up partial cache file"
                    );
                }
            }
            return Err(e.into());
        }

        Ok(())
    }

    fn delete_file(&self, path: &Path) -> Result<(), DiskCacheError> {
        fs::remove_file(path)?;
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), DiskCacheError> {
        fs::create_dir_all(path)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn file_size(&self, path: &Path) -> Result<u64, DiskCacheError> {
        let metadata = fs::metadata(path)?;
        Ok(metadata.len())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>, DiskCacheError> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                entries.push(entry.path());
            }
        }
        Ok(entries)
    }
}
