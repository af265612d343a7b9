//! # SegKV
//!
//! An append-only, log-structured key-value store with:
//! - Checksummed, self-delimiting record framing
//! - An in-memory hash index over the active segment
//! - Crash recovery that tells a clean end of data from a torn write
//! - Size-triggered segment rotation
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Store                               │
//! │            (Single Writer / Multi Reader)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │ put                     │ get
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Segment   │◄─offset──│    Index    │
//!   │  (Append)   │          │  (RwLock)   │
//!   └──────┬──────┘          └─────────────┘
//!          │ size >= limit
//!          ▼
//!   ┌─────────────┐
//!   │  Rotation   │  current-data → segment-<id>.dat
//!   └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use segkv::Store;
//!
//! let store = Store::open_path(std::path::Path::new("./data"), 10 * 1024 * 1024).unwrap();
//! store.put(b"hello", b"world").unwrap();
//! assert_eq!(store.get(b"hello").unwrap(), b"world");
//! store.close().unwrap();
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod segment;
pub mod index;
pub mod storage;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SegKvError, Result};
pub use config::{Config, SyncStrategy};
pub use engine::{Store, StoreState};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of SegKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
