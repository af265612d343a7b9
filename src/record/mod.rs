//! Record Module
//!
//! The unit of persistence: one key/value pair framed for an append-only file.
//!
//! ## Responsibilities
//! - Self-delimiting binary framing (explicit lengths, no separators)
//! - CRC32 checksum over the whole frame
//! - Distinguish clean end-of-data from a truncated trailing record
//!
//! ## Record Format
//! ```text
//! ┌──────────────┬──────────────┬────────────┬─────────┬───────────┐
//! │ KeyLen (4)   │ ValLen (4)   │ CRC32 (4)  │   Key   │   Value   │
//! └──────────────┴──────────────┴────────────┴─────────┴───────────┘
//! ```
//! All integers are little-endian. The CRC covers KeyLen, ValLen, Key and Value.

mod codec;

pub use codec::{decode, encode, encoded_len, Decoded};

/// Header size: KeyLen (4) + ValLen (4) + CRC32 (4) = 12 bytes
pub const HEADER_SIZE: usize = 12;

/// Largest key accepted by the codec (64 KB)
pub const MAX_KEY_SIZE: usize = 64 * 1024;

/// Largest value accepted by the codec (64 MB)
pub const MAX_VALUE_SIZE: usize = 64 * 1024 * 1024;

/// A single key/value pair as stored in a segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl Record {
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Number of bytes this record occupies once encoded
    pub fn encoded_len(&self) -> usize {
        encoded_len(self.key.len(), self.value.len())
    }

    /// Encode this record into a frame
    pub fn encode(&self) -> crate::Result<bytes::Bytes> {
        encode(&self.key, &self.value)
    }
}
