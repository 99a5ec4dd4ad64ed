//! Cache module
//!
//! - `disk`: the persistent disk cache (`DiskCache`) and its building blocks
//! - `entry`: `Entry` and `Header` records plus time helpers
//! - `codec`: value codecs for storing typed values as payload bytes
//! - `config`, `error`, `stats`: configuration, errors and statistics

pub mod codec;
pub mod config;
pub mod disk;
pub mod entry;
pub mod error;
pub mod stats;

pub use codec::{JsonCodec, MsgPackCodec, ValueCodec};
pub use config::{DiskCacheConfig, FileNaming, OversizePolicy};
pub use disk::{DiskCache, DiskCacheError};
pub use entry::{absolute_ttl, now_millis, Entry, Header, Timestamp};
pub use error::CacheError;
pub use stats::CacheStats;
