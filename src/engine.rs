//! Engine Module
//!
//! The store that coordinates all components.
//!
//! ## Responsibilities
//! - Open the active segment and replay it into the index
//! - Serve get/put/size against the active segment
//! - Trigger rotation when the active segment reaches its size limit
//! - Refuse every operation once closed

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Result, SegKvError};
use crate::index::Index;
use crate::record;
use crate::segment::{SegmentFile, SegmentRecovery};
use crate::storage::SegmentManager;

/// Lifecycle state of a [`Store`] visible to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Recovered and serving requests
    Ready,
    /// `close` has been called
    Closed,
}

/// Everything the write path mutates, kept under one lock
struct Writer {
    /// Active segment; `None` once the store is closed.
    /// Its tracked tail is where the next record lands.
    segment: Option<SegmentFile>,

    /// Segment List and rotation mechanics
    manager: SegmentManager,
}

/// The key-value store
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader
///
/// - **Writes** (put/close): Serialized by the `writer` mutex
///   - append → (rotate) → index update happens as one unit
///
/// - **Reads** (get): Only take the index read lock
///   - Each read opens its own file handle; the write handle is never shared
///   - The read lock is held across the positioned read, so a rotation
///     cannot swap the file out from under a stale offset
///
/// Lock order is always `writer` → `index`.
pub struct Store {
    /// Store configuration
    config: Config,

    /// Path of the active segment (fixed for the store's lifetime)
    active_path: PathBuf,

    /// Write-side state (exclusive access needed)
    writer: Mutex<Writer>,

    /// Key → offset map for the active segment
    index: RwLock<Index>,

    /// Set once by `close`
    closed: AtomicBool,
}

impl Store {
    /// Open a store with the given config
    ///
    /// On startup:
    /// 1. Validate config
    /// 2. Open/create the active segment for appending
    /// 3. Replay the active segment to rebuild the index
    /// 4. Ready to serve requests
    ///
    /// The data directory must already exist.
    pub fn open(config: Config) -> Result<Self> {
        // Step 1: Reject unusable settings up front
        config.validate()?;

        // Step 2: Open the active segment (fails if the directory is missing)
        let manager = SegmentManager::new(&config.data_dir, config.sync_strategy);
        let active_path = manager.active_path().to_path_buf();
        let segment = manager.open_active()?;

        // Step 3: Recover through an independent read handle
        let (index, recovery) = SegmentRecovery::recover(&active_path)?;

        info!(
            data_dir = %config.data_dir.display(),
            keys = recovery.keys_indexed,
            write_offset = recovery.end_offset,
            "store opened"
        );

        Ok(Self {
            config,
            active_path,
            writer: Mutex::new(Writer {
                segment: Some(segment),
                manager,
            }),
            index: RwLock::new(index),
            closed: AtomicBool::new(false),
        })
    }

    /// Open with a path and rotation threshold (convenience method)
    ///
    /// Uses default config otherwise
    pub fn open_path(path: &Path, max_segment_bytes: u64) -> Result<Self> {
        let config = Config::builder()
            .data_dir(path)
            .max_segment_bytes(max_segment_bytes)
            .build();
        Self::open(config)
    }

    /// Get the value for a key
    ///
    /// Only the active segment is consulted; keys that live solely in sealed
    /// segments are reported as `KeyNotFound`.
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        self.ensure_open()?;

        let index = self.index.read();
        let offset = index.get(key).ok_or(SegKvError::KeyNotFound)?;

        let record = SegmentFile::read_at(&self.active_path, offset)?;
        if record.key != key {
            return Err(SegKvError::CorruptedSegment(format!(
                "index points at offset {} but the record there has a different key",
                offset
            )));
        }

        Ok(record.value)
    }

    /// Put a key-value pair
    ///
    /// Steps:
    /// 1. Encode the record
    /// 2. Append to the active segment
    /// 3. Rotate if the segment reached its size limit
    /// 4. Point the key at its new record
    ///
    /// A failed append (write or fsync) leaves the index and write offset
    /// untouched. When this write triggers a rotation, its record is sealed
    /// with the old segment and is not indexed.
    ///
    /// If the rotation itself fails, the record is already committed to the
    /// still-active segment and indexed; the rotation error is returned, but
    /// a later `get` sees the new value.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        // Step 1: Encode before taking any lock
        let frame = record::encode(key, value)?;

        let mut guard = self.writer.lock();
        let writer = &mut *guard;
        let segment = writer.segment.as_mut().ok_or(SegKvError::StoreClosed)?;

        // Step 2: Append
        let offset = segment.len();
        let written = segment.append(&frame)?;

        debug!(offset, written, "appended record");

        // Step 3: Rotation check uses the size after this append
        if segment.len() >= self.config.max_segment_bytes {
            let mut index = self.index.write();
            match writer.manager.rotate(segment) {
                Ok(_) => {
                    index.clear();
                    return Ok(());
                }
                Err(e) => {
                    // The active segment is still in place; keep its record reachable
                    index.insert(key.to_vec(), offset);
                    return Err(e);
                }
            }
        }

        // Step 4: Index update
        self.index.write().insert(key.to_vec(), offset);

        Ok(())
    }

    /// Size of the active segment in bytes
    ///
    /// Read from filesystem metadata. The rotation check in `put` uses the
    /// segment's tracked tail instead; the two agree while this store is the
    /// only writer.
    pub fn size(&self) -> Result<u64> {
        let writer = self.writer.lock();
        let segment = writer.segment.as_ref().ok_or(SegKvError::StoreClosed)?;
        segment.size()
    }

    /// Close the store
    ///
    /// Syncs and releases the active segment. Every later call, including a
    /// second `close`, fails with `StoreClosed`.
    pub fn close(&self) -> Result<()> {
        let mut writer = self.writer.lock();
        let segment = writer.segment.take().ok_or(SegKvError::StoreClosed)?;
        self.closed.store(true, Ordering::Release);

        segment.close()?;

        info!(data_dir = %self.config.data_dir.display(), "store closed");
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the lifecycle state
    pub fn state(&self) -> StoreState {
        if self.closed.load(Ordering::Acquire) {
            StoreState::Closed
        } else {
            StoreState::Ready
        }
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the active segment path
    pub fn active_path(&self) -> &Path {
        &self.active_path
    }

    /// The Segment List: sealed segments oldest first, then the active one
    pub fn segments(&self) -> Vec<PathBuf> {
        self.writer.lock().manager.segments()
    }

    /// Sealed segments created by this store, oldest first
    pub fn sealed_segments(&self) -> Vec<PathBuf> {
        self.writer.lock().manager.sealed_segments().to_vec()
    }

    /// Number of keys reachable through the index
    pub fn key_count(&self) -> usize {
        self.index.read().len()
    }

    /// Offset where the next record will be written (0 once closed)
    pub fn write_offset(&self) -> u64 {
        self.writer
            .lock()
            .segment
            .as_ref()
            .map_or(0, |segment| segment.len())
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn ensure_open(&self) -> Result<()> {
        match self.state() {
            StoreState::Ready => Ok(()),
            StoreState::Closed => Err(SegKvError::StoreClosed),
        }
    }
}
