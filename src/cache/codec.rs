//! Value codecs
//!
//! The disk cache stores opaque bytes. A `ValueCodec` turns an application value
//! into those bytes and back; the cache never looks inside the payload.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::CacheError;

/// Converts values of type `T` to and from payload bytes
pub trait ValueCodec<T> {
    fn encode(&self, value: &T) -> Result<Vec<u8>, CacheError>;
    fn decode(&self, bytes: &[u8]) -> Result<T, CacheError>;
}

/// JSON payloads via serde_json
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<T: Serialize + DeserializeOwned> ValueCodec<T> for JsonCodec {
    fn encode(&self, value: &T) -> Result<Vec<u8>, CacheError> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<T, CacheError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Compact MessagePack payloads via rmp-serde
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackCodec;

impl<T: Serialize + DeserializeOwned> ValueCodec<T> for MsgPackCodec {
    fn encode(&self, value: &T) -> Result<Vec<u8>, CacheError> {
        rmp_serde::to_vec(value).map_err(|e| {
            CacheError::SerializationError(format!("MessagePack encoding failed: {}", e))
        })
    }

    fn decode(&self, bytes: &[u8]) -> Result<T, CacheError> {
        rmp_serde::from_slice(bytes).map_err(|e| {
            CacheError::SerializationError(format!("MessagePack decoding failed: {}", e))
        })
    }
}
