//! Record codec
//!
//! Encoding and decoding of record frames.

use std::io::{ErrorKind, Read};

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Result, SegKvError};

use super::{Record, HEADER_SIZE, MAX_KEY_SIZE, MAX_VALUE_SIZE};

/// Outcome of decoding one record from a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A complete record and the number of bytes it occupied
    Record { record: Record, len: usize },

    /// No bytes left: the stream ended exactly on a record boundary
    EndOfData,

    /// The stream ended mid-record after `len` bytes
    Truncated { len: usize },
}

/// Encoded length of a record with the given key and value sizes
pub fn encoded_len(key_len: usize, value_len: usize) -> usize {
    HEADER_SIZE + key_len + value_len
}

/// Encode a key/value pair into a frame
///
/// Format: key_len (4) + val_len (4) + crc32 (4) + key + value
pub fn encode(key: &[u8], value: &[u8]) -> Result<Bytes> {
    if key.len() > MAX_KEY_SIZE || value.len() > MAX_VALUE_SIZE {
        return Err(SegKvError::RecordTooLarge {
            key_len: key.len(),
            value_len: value.len(),
        });
    }

    let key_len = (key.len() as u32).to_le_bytes();
    let val_len = (value.len() as u32).to_le_bytes();
    let crc = checksum(&key_len, &val_len, key, value);

    let mut buf = BytesMut::with_capacity(encoded_len(key.len(), value.len()));
    buf.put_slice(&key_len);
    buf.put_slice(&val_len);
    buf.put_u32_le(crc);
    buf.put_slice(key);
    buf.put_slice(value);

    Ok(buf.freeze())
}

/// Decode exactly one record from `reader`
///
/// Returns:
/// - `Ok(Decoded::Record { .. })` — a complete, checksummed record
/// - `Ok(Decoded::EndOfData)` — zero bytes available
/// - `Ok(Decoded::Truncated { .. })` — the stream ended inside a record
/// - `Err(CorruptedSegment)` — a complete frame that fails validation
pub fn decode<R: Read>(reader: &mut R) -> Result<Decoded> {
    let mut header = [0u8; HEADER_SIZE];
    let n = read_full(reader, &mut header)?;
    if n == 0 {
        return Ok(Decoded::EndOfData);
    }
    if n < HEADER_SIZE {
        return Ok(Decoded::Truncated { len: n });
    }

    let key_len_bytes: [u8; 4] = [header[0], header[1], header[2], header[3]];
    let val_len_bytes: [u8; 4] = [header[4], header[5], header[6], header[7]];
    let stored_crc = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);

    let key_len = u32::from_le_bytes(key_len_bytes) as usize;
    let val_len = u32::from_le_bytes(val_len_bytes) as usize;

    if key_len > MAX_KEY_SIZE || val_len > MAX_VALUE_SIZE {
        return Err(SegKvError::CorruptedSegment(format!(
            "record lengths out of range: key {} bytes, value {} bytes",
            key_len, val_len
        )));
    }

    let mut body = vec![0u8; key_len + val_len];
    let n = read_full(reader, &mut body)?;
    if n < body.len() {
        return Ok(Decoded::Truncated {
            len: HEADER_SIZE + n,
        });
    }

    let value = body.split_off(key_len);
    let key = body;

    let crc = checksum(&key_len_bytes, &val_len_bytes, &key, &value);
    if crc != stored_crc {
        return Err(SegKvError::CorruptedSegment(format!(
            "checksum mismatch: expected {:#010x}, got {:#010x}",
            stored_crc, crc
        )));
    }

    Ok(Decoded::Record {
        record: Record { key, value },
        len: encoded_len(key_len, val_len),
    })
}

// =============================================================================
// Private Helpers
// =============================================================================

fn checksum(key_len: &[u8; 4], val_len: &[u8; 4], key: &[u8], value: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(key_len);
    hasher.update(val_len);
    hasher.update(key);
    hasher.update(value);
    hasher.finalize()
}

/// Fill `buf` as far as the stream allows; returns the number of bytes read.
/// Unlike `read_exact`, a short read is reported instead of turned into an error.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
