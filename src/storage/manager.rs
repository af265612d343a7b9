//! Segment Manager
//!
//! Owns the Segment List and the mechanics of rotation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{info, warn};

use crate::config::{
    SyncStrategy, ACTIVE_SEGMENT_NAME, SEALED_SEGMENT_EXTENSION, SEALED_SEGMENT_PREFIX,
};
use crate::error::Result;
use crate::segment::SegmentFile;

/// Tracks the segments of one data directory
///
/// ## Concurrency:
/// - Not synchronized internally; the engine keeps it under its write lock
///   together with the active segment handle
pub struct SegmentManager {
    /// Directory holding every segment file
    data_dir: PathBuf,

    /// Fixed path of the active segment
    active_path: PathBuf,

    /// Sealed segment paths, oldest first
    sealed: Vec<PathBuf>,

    /// Last id handed out for a sealed segment name
    last_sealed_id: u64,

    /// Sync strategy for freshly opened active segments
    sync_strategy: SyncStrategy,
}

impl SegmentManager {
    /// Create a manager for `data_dir` with an empty Segment List
    ///
    /// Sealed files already present on disk are not listed.
    pub fn new(data_dir: &Path, sync_strategy: SyncStrategy) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            active_path: data_dir.join(ACTIVE_SEGMENT_NAME),
            sealed: Vec::new(),
            last_sealed_id: 0,
            sync_strategy,
        }
    }

    /// Open (or create) the active segment for appending
    pub fn open_active(&self) -> Result<SegmentFile> {
        SegmentFile::open(&self.active_path, self.sync_strategy)
    }

    /// Seal the active segment and replace it with a fresh, empty one
    ///
    /// Steps:
    /// 1. Flush the active segment
    /// 2. Rename it to a unique sealed name
    /// 3. Open a new empty file at the active path
    /// 4. Release the old handle and record the sealed path
    ///
    /// On failure `active` is left in place and still writable; a rename
    /// that already happened is undone.
    pub fn rotate(&mut self, active: &mut SegmentFile) -> Result<PathBuf> {
        // Step 1: Everything appended so far must be on disk before sealing
        active.sync()?;

        // Step 2: Rename under a unique sealed name
        let sealed_path = self.next_sealed_path();
        fs::rename(&self.active_path, &sealed_path)?;

        // Step 3: Fresh active segment
        let fresh = match self.open_active() {
            Ok(fresh) => fresh,
            Err(e) => {
                if let Err(undo) = fs::rename(&sealed_path, &self.active_path) {
                    warn!(
                        sealed = %sealed_path.display(),
                        error = %undo,
                        "failed to restore active segment after rotation error"
                    );
                }
                return Err(e);
            }
        };

        // Step 4: Swap handles; the old one is dropped (closed) here
        let sealed = std::mem::replace(active, fresh);
        drop(sealed);

        self.sealed.push(sealed_path.clone());

        info!(
            sealed = %sealed_path.display(),
            sealed_count = self.sealed.len(),
            "rotated active segment"
        );

        Ok(sealed_path)
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get the active segment path
    pub fn active_path(&self) -> &Path {
        &self.active_path
    }

    /// Sealed segments, oldest first
    pub fn sealed_segments(&self) -> &[PathBuf] {
        &self.sealed
    }

    /// The full Segment List: sealed segments oldest first, then the active one
    pub fn segments(&self) -> Vec<PathBuf> {
        let mut all = self.sealed.clone();
        all.push(self.active_path.clone());
        all
    }

    /// Parse a sealed segment id from its file name
    /// "segment-42.dat" → Some(42)
    pub fn parse_sealed_id(path: &Path) -> Option<u64> {
        if path.extension()?.to_str()? != SEALED_SEGMENT_EXTENSION {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        stem.strip_prefix(SEALED_SEGMENT_PREFIX)?.parse().ok()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Next unused sealed path
    ///
    /// Ids are wall-clock nanoseconds, forced strictly increasing within this
    /// manager and bumped past any file that already exists.
    fn next_sealed_path(&mut self) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();

        let mut id = now.max(self.last_sealed_id + 1);
        while self.sealed_path(id).exists() {
            id += 1;
        }

        self.last_sealed_id = id;
        self.sealed_path(id)
    }

    fn sealed_path(&self, id: u64) -> PathBuf {
        self.data_dir.join(format!(
            "{}{}.{}",
            SEALED_SEGMENT_PREFIX, id, SEALED_SEGMENT_EXTENSION
        ))
    }
}
