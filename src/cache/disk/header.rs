//! Binary codec for per-entry cache headers
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! magic          u32
//! key            u64 length + UTF-8 bytes
//! etag           u64 length + UTF-8 bytes (empty = absent)
//! server_date    u64
//! last_modified  u64
//! ttl            u64
//! soft_ttl       u64
//! header count   u32, then count x (key string, value string)
//! ```
//!
//! The payload follows the header immediately in the same file.

use super::error::DiskCacheError;
use crate::cache::entry::Header;
use bytes::{BufMut, Bytes, BytesMut};
use std::collections::BTreeMap;
use std::io::{ErrorKind, Read, Write};

/// Format marker for the current cache file version
pub const CACHE_MAGIC: u32 = 0x2016_0306;

/// Upper bound on the read buffer reserved up front for a single string
const MAX_PREALLOC: usize = 8 * 1024;

/// Encode `header` into its on-disk representation
pub fn encode_header(header: &Header) -> Bytes {
    let mut buf = BytesMut::with_capacity(encoded_len(header));
    buf.put_u32_le(CACHE_MAGIC);
    put_string(&mut buf, &header.key);
    put_string(&mut buf, header.etag.as_deref().unwrap_or(""));
    buf.put_u64_le(header.server_date);
    buf.put_u64_le(header.last_modified);
    buf.put_u64_le(header.ttl);
    buf.put_u64_le(header.soft_ttl);
    buf.put_u32_le(header.headers.len() as u32);
    for (name, value) in &header.headers {
        put_string(&mut buf, name);
        put_string(&mut buf, value);
    }
    buf.freeze()
}

/// Write the encoded header to `sink`
pub fn write_header<W: Write>(header: &Header, sink: &mut W) -> Result<(), DiskCacheError> {
    sink.write_all(&encode_header(header))?;
    Ok(())
}

/// Number of bytes `encode_header` produces for `header`
pub fn encoded_len(header: &Header) -> usize {
    let string_len = |s: &str| 8 + s.len();
    4 + string_len(&header.key)
        + string_len(header.etag.as_deref().unwrap_or(""))
        + 4 * 8
        + 4
        + header
            .headers
            .iter()
            .map(|(k, v)| string_len(k) + string_len(v))
            .sum::<usize>()
}

/// Read a header from the front of `source`.
///
/// Returns the header (with `size` left at 0) and the number of bytes consumed,
/// leaving `source` positioned at the first payload byte.
pub fn read_header<R: Read>(source: &mut R) -> Result<(Header, u64), DiskCacheError> {
    let mut reader = CountingReader::new(source);

    let magic = reader.read_u32()?;
    if magic != CACHE_MAGIC {
        return Err(DiskCacheError::CorruptHeader(format!("bad magic {:#010x}", magic)));
    }

    let key = reader.read_string()?;
    let etag = Some(reader.read_string()?).filter(|s| !s.is_empty());
    let server_date = reader.read_u64()?;
    let last_modified = reader.read_u64()?;
    let ttl = reader.read_u64()?;
    let soft_ttl = reader.read_u64()?;

    let count = reader.read_u32()?;
    let mut headers = BTreeMap::new();
    for _ in 0..count {
        let name = reader.read_string()?;
        let value = reader.read_string()?;
        headers.insert(name, value);
    }

    let header = Header {
        key,
        etag,
        server_date,
        last_modified,
        ttl,
        soft_ttl,
        headers,
        size: 0,
    };
    Ok((header, reader.consumed))
}

/// Decode a header from the front of an in-memory file image
pub fn decode_header(data: &[u8]) -> Result<(Header, usize), DiskCacheError> {
    let mut cursor = data;
    let (header, consumed) = read_header(&mut cursor)?;
    Ok((header, consumed as usize))
}

fn put_string(buf: &mut BytesMut, s: &str) {
    buf.put_u64_le(s.len() as u64);
    buf.put_slice(s.as_bytes());
}

/// Reader wrapper that tracks how many bytes have been consumed
struct CountingReader<'a, R> {
    inner: &'a mut R,
    consumed: u64,
}

impl<'a, R: Read> CountingReader<'a, R> {
    fn new(inner: &'a mut R) -> Self {
        Self { inner, consumed: 0 }
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), DiskCacheError> {
        self.inner.read_exact(buf).map_err(truncated)?;
        self.consumed += buf.len() as u64;
        Ok(())
    }

    fn read_u32(&mut self) -> Result<u32, DiskCacheError> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_u64(&mut self) -> Result<u64, DiskCacheError> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    fn read_string(&mut self) -> Result<String, DiskCacheError> {
        let len = self.read_u64()?;
        let capacity = usize::try_from(len).unwrap_or(usize::MAX).min(MAX_PREALLOC);
        let mut bytes = Vec::with_capacity(capacity);

        // A garbage length prefix must not turn into a giant allocation
        let read = (&mut *self.inner)
            .take(len)
            .read_to_end(&mut bytes)
            .map_err(truncated)?;
        self.consumed += read as u64;
        if read as u64 != len {
            return Err(DiskCacheError::CorruptHeader(format!(
                "string declares {} bytes but only {} remain",
                len, read
            )));
        }

        String::from_utf8(bytes)
            .map_err(|e| DiskCacheError::CorruptHeader(format!("invalid UTF-8: {}", e)))
    }
}

fn truncated(err: std::io::Error) -> DiskCacheError {
    if err.kind() == ErrorKind::UnexpectedEof {
        DiskCacheError::CorruptHeader("truncated header".to_string())
    } else {
        DiskCacheError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample_header() -> Header {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        headers.insert("x-request-id".to_string(), "42".to_string());
        Header {
            key: "https://example.com/api/items?page=2".to_string(),
            etag: Some("W/\"1a2b\"".to_string()),
            server_date: 1_700_000_000_000,
            last_modified: 1_699_999_000_000,
            ttl: 1_700_000_600_000,
            soft_ttl: 1_700_000_300_000,
            headers,
            size: 0,
        }
    }

    #[test]
    fn test_header_encodes_and_decodes() {
        let header = sample_header();
        let encoded = encode_header(&header);
        assert_eq!(encoded.len(), encoded_len(&header));

        let (decoded, consumed) = decode_header(&encoded).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(consumed, encoded.len());
    }

    #[test]
    fn test_layout_is_little_endian_with_magic_first() {
        let header = Header {
            key: "k".to_string(),
            etag: None,
            server_date: 1,
            last_modified: 2,
            ttl: 3,
            soft_ttl: 4,
            headers: BTreeMap::new(),
            size: 0,
        };
        let encoded = encode_header(&header);

        assert_eq!(&encoded[0..4], &[0x06, 0x03, 0x16, 0x20]);
        assert_eq!(&encoded[4..12], &1u64.to_le_bytes());
        assert_eq!(encoded[12], b'k');
        // Absent etag is a zero-length string
        assert_eq!(&encoded[13..21], &0u64.to_le_bytes());
        assert_eq!(&encoded[21..29], &1u64.to_le_bytes());
        assert_eq!(&encoded[45..53], &4u64.to_le_bytes());
        // Zero headers still writes the count
        assert_eq!(&encoded[53..57], &0u32.to_le_bytes());
        assert_eq!(encoded.len(), 57);
    }

    #[test]
    fn test_empty_etag_reads_back_as_absent() {
        let mut header = sample_header();
        header.etag = Some(String::new());
        let (decoded, _) = decode_header(&encode_header(&header)).unwrap();
        assert_eq!(decoded.etag, None);
    }

    #[test]
    fn test_decode_stops_at_payload_boundary() {
        let header = sample_header();
        let mut file = encode_header(&header).to_vec();
        file.extend_from_slice(b"payload bytes");

        let mut cursor = std::io::Cursor::new(file);
        let (_, consumed) = read_header(&mut cursor).unwrap();
        let mut rest = Vec::new();
        cursor.read_to_end(&mut rest).unwrap();

        assert_eq!(consumed, encoded_len(&header) as u64);
        assert_eq!(rest, b"payload bytes");
    }

    #[test]
    fn test_bad_magic_is_corrupt() {
        let mut encoded = encode_header(&sample_header()).to_vec();
        encoded[0] ^= 0xff;
        let err = decode_header(&encoded).unwrap_err();
        assert!(matches!(err, DiskCacheError::CorruptHeader(_)));
    }

    #[rstest]
    #[case::empty(0)]
    #[case::partial_magic(3)]
    #[case::inside_key_length(8)]
    #[case::inside_key(14)]
    #[case::before_dates(60)]
    #[case::missing_last_byte(usize::MAX)]
    fn test_truncated_input_is_corrupt(#[case] cut: usize) {
        let encoded = encode_header(&sample_header());
        let cut = cut.min(encoded.len() - 1);
        let err = decode_header(&encoded[..cut]).unwrap_err();
        assert!(matches!(err, DiskCacheError::CorruptHeader(_)), "cut at {}", cut);
    }

    #[test]
    fn test_oversized_length_prefix_is_corrupt() {
        let mut encoded = Vec::new();
        encoded.extend_from_slice(&CACHE_MAGIC.to_le_bytes());
        encoded.extend_from_slice(&u64::MAX.to_le_bytes());
        encoded.extend_from_slice(b"short");

        let err = decode_header(&encoded).unwrap_err();
        assert!(matches!(err, DiskCacheError::CorruptHeader(_)));
    }

    #[test]
    fn test_invalid_utf8_is_corrupt() {
        let mut encoded = Vec::new();
        encoded.extend_from_slice(&CACHE_MAGIC.to_le_bytes());
        encoded.extend_from_slice(&2u64.to_le_bytes());
        encoded.extend_from_slice(&[0xff, 0xfe]);

        let err = decode_header(&encoded).unwrap_err();
        assert!(matches!(err, DiskCacheError::CorruptHeader(_)));
    }

    #[test]
    fn test_write_header_matches_encode() {
        let header = sample_header();
        let mut sink = Vec::new();
        write_header(&header, &mut sink).unwrap();
        assert_eq!(sink, encode_header(&header).to_vec());
    }
}
