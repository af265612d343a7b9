//! Segment Reader
//!
//! Sequential scan over the records of a segment file.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{Result, SegKvError};
use crate::record::{self, Decoded, Record};

/// Reads records front to back from a segment file
pub struct SegmentReader {
    path: PathBuf,
    reader: BufReader<File>,
    /// Offset of the next record to decode
    position: u64,
}

impl SegmentReader {
    /// Open a segment file for scanning from offset 0
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            position: 0,
        })
    }

    /// Read the next record together with the offset it starts at
    ///
    /// Returns:
    /// - `Ok(Some((offset, record)))` — a complete record
    /// - `Ok(None)` — clean end of the segment
    /// - `Err(CorruptedSegment)` — the segment ends mid-record or a frame is invalid
    pub fn next_record(&mut self) -> Result<Option<(u64, Record)>> {
        match record::decode(&mut self.reader)? {
            Decoded::Record { record, len } => {
                let offset = self.position;
                self.position += len as u64;
                Ok(Some((offset, record)))
            }
            Decoded::EndOfData => Ok(None),
            Decoded::Truncated { len } => Err(SegKvError::CorruptedSegment(format!(
                "{}: {} trailing bytes at offset {} do not form a complete record",
                self.path.display(),
                len,
                self.position
            ))),
        }
    }

    /// Offset just past the last record returned
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl Iterator for SegmentReader {
    type Item = Result<(u64, Record)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
