//! Storage Module
//!
//! Directory-level bookkeeping: which segment files exist and how the active
//! segment becomes a sealed one.
//!
//! ## Responsibilities
//! - Track the Segment List (sealed segments oldest first, then the active one)
//! - Generate unique, increasing names for sealed segments
//! - Perform rotation: flush, rename, reopen a fresh active segment
//!
//! ## Directory Layout
//! ```text
//! {data_dir}/
//!   ├── current-data                  active segment (always this name)
//!   ├── segment-1760772000000000000.dat   sealed
//!   └── segment-1760772000000000042.dat   sealed
//! ```
//! The Segment List lives in memory only. Reopening a directory replays the
//! active segment and starts with an empty list of sealed segments.

mod manager;

pub use manager::SegmentManager;
