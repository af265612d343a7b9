//! Segment File
//!
//! Append handle for the active segment plus positioned reads.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::SyncStrategy;
use crate::error::{Result, SegKvError};
use crate::record::{self, Decoded, Record};

/// An append-only segment file
///
/// Owns the only write handle to the file. Reads never use it: each read
/// opens its own handle so the append position is never disturbed.
pub struct SegmentFile {
    /// Path of the file on disk
    path: PathBuf,
    /// Write handle, opened in append mode
    file: File,
    /// Current tail (bytes successfully appended so far)
    len: u64,
    /// How often to fsync
    sync_strategy: SyncStrategy,
    /// Appends since the last fsync
    unsynced: usize,
}

impl SegmentFile {
    /// Open or create a segment file for appending
    pub fn open(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        let len = file.metadata()?.len();

        debug!(path = %path.display(), len, "opened segment");

        Ok(Self {
            path: path.to_path_buf(),
            file,
            len,
            sync_strategy,
            unsynced: 0,
        })
    }

    /// Append an encoded record at the end of the file
    ///
    /// Returns the number of bytes written. If the write or the fsync that
    /// follows it fails, the file is cut back to its previous tail and the
    /// tail is left unchanged.
    pub fn append(&mut self, bytes: &[u8]) -> Result<usize> {
        let tail = self.len;
        let unsynced = self.unsynced;

        if let Err(e) = self.write_frame(bytes) {
            self.rollback(tail, unsynced);
            return Err(e);
        }

        Ok(bytes.len())
    }

    /// Read the record starting at `offset` through a fresh read handle
    pub fn read_record(&self, offset: u64) -> Result<Record> {
        Self::read_at(&self.path, offset)
    }

    /// Read the record starting at `offset` in the file at `path`
    ///
    /// An index offset must always point at a complete record, so running
    /// into end-of-data or a truncated frame here is corruption.
    pub fn read_at(path: &Path, offset: u64) -> Result<Record> {
        let mut file = File::open(path)?;
        file.seek(SeekFrom::Start(offset))?;

        match record::decode(&mut BufReader::new(file))? {
            Decoded::Record { record, .. } => Ok(record),
            Decoded::EndOfData => Err(SegKvError::CorruptedSegment(format!(
                "no record at offset {} in {}",
                offset,
                path.display()
            ))),
            Decoded::Truncated { len } => Err(SegKvError::CorruptedSegment(format!(
                "truncated record ({} bytes) at offset {} in {}",
                len,
                offset,
                path.display()
            ))),
        }
    }

    /// Current file length as reported by the filesystem
    pub fn size(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    /// Tail position tracked by this handle
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Force appended data to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_data()?;
        self.unsynced = 0;
        Ok(())
    }

    /// Sync and release the write handle
    pub fn close(mut self) -> Result<()> {
        self.sync()?;
        debug!(path = %self.path.display(), len = self.len, "closed segment");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn write_frame(&mut self, bytes: &[u8]) -> Result<()> {
        self.file.write_all(bytes)?;
        self.len += bytes.len() as u64;
        self.unsynced += 1;

        let should_sync = match self.sync_strategy {
            SyncStrategy::EveryWrite => true,
            SyncStrategy::EveryNEntries { count } => self.unsynced >= count,
        };
        if should_sync {
            self.sync()?;
        }

        Ok(())
    }

    /// Cut the file back to `tail` after a failed append
    fn rollback(&mut self, tail: u64, unsynced: usize) {
        if let Err(e) = self.file.set_len(tail) {
            warn!(
                path = %self.path.display(),
                error = %e,
                "failed to cut back partial append"
            );
        }
        self.len = tail;
        self.unsynced = unsynced;
    }
}
