//! Utility functions for disk cache file naming

use crate::cache::config::FileNaming;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Suffix for in-flight writes that have not been renamed into place yet
pub const TEMP_SUFFIX: &str = "tmp";

/// 32-bit polynomial string hash (`h = h * 31 + unit`) over UTF-16 code units
fn polynomial_hash<I: IntoIterator<Item = u16>>(units: I) -> i32 {
    units
        .into_iter()
        .fold(0i32, |acc, unit| acc.wrapping_mul(31).wrapping_add(unit as i32))
}

/// Short filename built from independent hashes of each half of the key.
///
/// Not collision-free: distinct keys can map to the same file.
pub fn half_key_hash(key: &str) -> String {
    let units: Vec<u16> = key.encode_utf16().collect();
    let (first, second) = units.split_at(units.len() / 2);
    format!(
        "{}{}",
        polynomial_hash(first.iter().copied()),
        polynomial_hash(second.iter().copied())
    )
}

/// SHA-256 of the key as lowercase hex
pub fn sha256_hash(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Filename for `key` under the given naming scheme
pub fn filename_for_key(key: &str, naming: FileNaming) -> String {
    match naming {
        FileNaming::HalfKeyHash => half_key_hash(key),
        FileNaming::Sha256 => sha256_hash(key),
    }
}

/// Path of the cache file for `key` inside `root`
pub fn cache_key_to_file_path(root: &Path, key: &str, naming: FileNaming) -> PathBuf {
    root.join(filename_for_key(key, naming))
}

/// Sibling path used while a write is in flight
pub fn temp_path_for(path: &Path) -> PathBuf {
    path.with_extension(TEMP_SUFFIX)
}

/// True for leftovers of interrupted writes
pub fn is_temp_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(TEMP_SUFFIX)
}
