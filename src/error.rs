//! Error types for SegKV
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using SegKvError
pub type Result<T> = std::result::Result<T, SegKvError>;

/// Unified error type for SegKV operations
#[derive(Debug, Error)]
pub enum SegKvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Segment Errors
    // -------------------------------------------------------------------------
    #[error("Corrupted segment: {0}")]
    CorruptedSegment(String),

    #[error("Record too large: key {key_len} bytes, value {value_len} bytes")]
    RecordTooLarge { key_len: usize, value_len: usize },

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Key not found")]
    KeyNotFound,

    #[error("Store is closed")]
    StoreClosed,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
