//! Key/value header-section codec.
//!
//! Each entry is encoded as `u32 key length, key bytes, u32 value length,
//! value bytes`, all big-endian. Entry order is not significant; keys are
//! unique.

use std::collections::HashMap;

use bytes::{Buf, BufMut, BytesMut};

use crate::error::CodecError;

/// Encodes a header map into the buffer.
pub fn encode_header(buf: &mut BytesMut, map: &HashMap<String, String>) {
    for (key, value) in map {
        buf.put_u32(key.len() as u32);
        buf.put_slice(key.as_bytes());
        buf.put_u32(value.len() as u32);
        buf.put_slice(value.as_bytes());
    }
}

/// Decodes a header section into a map.
///
/// The whole slice must be consumed by well-formed entries; a truncated
/// length prefix, an overrunning entry, or non-UTF-8 text is a
/// [`CodecError::Header`].
pub fn decode_header(mut buf: &[u8]) -> Result<HashMap<String, String>, CodecError> {
    let mut map = HashMap::new();
    while buf.has_remaining() {
        let key = decode_chunk(&mut buf, "key")?;
        let value = decode_chunk(&mut buf, "value")?;
        map.insert(key, value);
    }
    Ok(map)
}

fn decode_chunk(buf: &mut &[u8], what: &str) -> Result<String, CodecError> {
    if buf.remaining() < 4 {
        return Err(CodecError::Header(format!(
            "truncated {what} length: {} bytes remaining",
            buf.remaining()
        )));
    }
    let len = buf.get_u32() as usize;
    if buf.remaining() < len {
        return Err(CodecError::Header(format!(
            "{what} length {len} overruns section ({} bytes remaining)",
            buf.remaining()
        )));
    }
    let mut data = vec![0u8; len];
    buf.copy_to_slice(&mut data);
    String::from_utf8(data).map_err(|e| CodecError::Header(format!("{what} is not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(map: &HashMap<String, String>) -> HashMap<String, String> {
        let mut buf = BytesMut::new();
        encode_header(&mut buf, map);
        decode_header(&buf).expect("decode failed")
    }

    #[test]
    fn round_trip_entries() {
        let map = HashMap::from([
            ("service".to_string(), "com.acme.EchoService:1.0".to_string()),
            ("sofa_head_method_name".to_string(), "echo".to_string()),
            ("empty".to_string(), String::new()),
        ]);
        assert_eq!(round_trip(&map), map);
    }

    #[test]
    fn empty_map_is_empty_section() {
        let mut buf = BytesMut::new();
        encode_header(&mut buf, &HashMap::new());
        assert!(buf.is_empty());
        assert!(decode_header(&buf).unwrap().is_empty());
    }

    #[test]
    fn single_entry_layout() {
        let map = HashMap::from([("k".to_string(), "vv".to_string())]);
        let mut buf = BytesMut::new();
        encode_header(&mut buf, &map);
        assert_eq!(
            &buf[..],
            &[0, 0, 0, 1, b'k', 0, 0, 0, 2, b'v', b'v'],
        );
    }

    #[test]
    fn truncated_length_prefix() {
        let err = decode_header(&[0, 0, 1]).unwrap_err();
        assert!(matches!(err, CodecError::Header(_)));
    }

    #[test]
    fn overrunning_value() {
        // key "a" then a value claiming 200 bytes.
        let bytes = [0, 0, 0, 1, b'a', 0, 0, 0, 200, b'x'];
        let err = decode_header(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::Header(_)));
    }

    #[test]
    fn invalid_utf8_key() {
        let bytes = [0, 0, 0, 2, 0xFF, 0xFE, 0, 0, 0, 0];
        let err = decode_header(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::Header(_)));
    }
}
