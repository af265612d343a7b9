//! Segment Module
//!
//! One append-only data file holding a contiguous run of records.
//!
//! ## Responsibilities
//! - Append encoded records at the tail (call order = file order)
//! - Positioned reads through independent read handles
//! - Sequential scans for crash recovery and verification
//!
//! ## File Layout
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Record 1 (offset 0)                     │
//! ├─────────────────────────────────────────┤
//! │ Record 2 (offset = len(Record 1))       │
//! ├─────────────────────────────────────────┤
//! │ ...                                     │
//! ├─────────────────────────────────────────┤
//! │ Record N                                │
//! └─────────────────────────────────────────┘
//!                                      tail ┘
//! ```
//! There is no header or footer: a segment is nothing but concatenated
//! record frames, so a crash can only ever leave a partial frame at the tail.

mod file;
mod reader;
mod recovery;

pub use file::SegmentFile;
pub use reader::SegmentReader;
pub use recovery::{RecoveryResult, SegmentRecovery};
