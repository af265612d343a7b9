//! Tests for segment recovery
//!
//! These tests verify:
//! - Recovery from an empty segment
//! - Recovery of every key from a clean segment
//! - Latest offset wins for rewritten keys
//! - Torn tails and checksum damage fail recovery
//! - Verify mode (stats only, no index)

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use segkv::record::encode;
use segkv::segment::{SegmentFile, SegmentRecovery};
use segkv::SegKvError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_segment() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("current-data");
    (temp_dir, path)
}

/// Write raw frames directly to a file (for crafting damage)
fn write_raw_records(path: &PathBuf, pairs: &[(&str, &str)]) -> Vec<u64> {
    let mut file = File::create(path).unwrap();
    let mut offsets = Vec::new();
    let mut offset = 0u64;
    for (key, value) in pairs {
        let frame = encode(key.as_bytes(), value.as_bytes()).unwrap();
        offsets.push(offset);
        offset += frame.len() as u64;
        file.write_all(&frame).unwrap();
    }
    file.sync_all().unwrap();
    offsets
}

fn append_raw(path: &PathBuf, bytes: &[u8]) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(bytes).unwrap();
    file.sync_all().unwrap();
}

// =============================================================================
// Recover: Clean Segment Tests
// =============================================================================

#[test]
fn test_recover_empty_file() {
    let (_temp, path) = setup_temp_segment();
    File::create(&path).unwrap();

    let (index, result) = SegmentRecovery::recover(&path).unwrap();

    assert!(index.is_empty());
    assert_eq!(result.records_recovered, 0);
    assert_eq!(result.keys_indexed, 0);
    assert_eq!(result.end_offset, 0);
}

#[test]
fn test_recover_indexes_every_key() {
    let (_temp, path) = setup_temp_segment();
    let offsets = write_raw_records(&path, &[("k1", "v1"), ("k2", "v2"), ("k3", "v3")]);

    let (index, result) = SegmentRecovery::recover(&path).unwrap();

    assert_eq!(result.records_recovered, 3);
    assert_eq!(result.keys_indexed, 3);
    assert_eq!(index.get(b"k1"), Some(offsets[0]));
    assert_eq!(index.get(b"k2"), Some(offsets[1]));
    assert_eq!(index.get(b"k3"), Some(offsets[2]));
    assert_eq!(result.end_offset, std::fs::metadata(&path).unwrap().len());
}

#[test]
fn test_recover_latest_offset_wins() {
    let (_temp, path) = setup_temp_segment();
    let offsets = write_raw_records(&path, &[("k", "old"), ("other", "x"), ("k", "new")]);

    let (index, result) = SegmentRecovery::recover(&path).unwrap();

    assert_eq!(result.records_recovered, 3);
    assert_eq!(result.keys_indexed, 2);
    assert_eq!(index.get(b"k"), Some(offsets[2]));

    let record = SegmentFile::read_at(&path, index.get(b"k").unwrap()).unwrap();
    assert_eq!(record.value, b"new".to_vec());
}

// =============================================================================
// Recover: Damaged Segment Tests
// =============================================================================

#[test]
fn test_recover_partial_header_at_tail() {
    let (_temp, path) = setup_temp_segment();
    write_raw_records(&path, &[("k", "v")]);
    append_raw(&path, &[0xAB; 6]);

    let result = SegmentRecovery::recover(&path);

    assert!(matches!(result, Err(SegKvError::CorruptedSegment(_))));
}

#[test]
fn test_recover_partial_body_at_tail() {
    let (_temp, path) = setup_temp_segment();
    write_raw_records(&path, &[("k1", "v1")]);
    let frame = encode(b"k2", b"a longer value that gets cut").unwrap();
    append_raw(&path, &frame[..frame.len() / 2]);

    assert!(matches!(
        SegmentRecovery::recover(&path),
        Err(SegKvError::CorruptedSegment(_))
    ));
}

#[test]
fn test_recover_checksum_mismatch() {
    let (_temp, path) = setup_temp_segment();
    let mut frame = encode(b"key", b"value").unwrap().to_vec();
    let last = frame.len() - 1;
    frame[last] = frame[last].wrapping_add(1);
    File::create(&path).unwrap().write_all(&frame).unwrap();

    assert!(matches!(
        SegmentRecovery::recover(&path),
        Err(SegKvError::CorruptedSegment(_))
    ));
}

#[test]
fn test_recover_missing_file() {
    let (_temp, path) = setup_temp_segment();

    assert!(matches!(
        SegmentRecovery::recover(&path),
        Err(SegKvError::Io(_))
    ));
}

// =============================================================================
// Verify Tests
// =============================================================================

#[test]
fn test_verify_reports_stats() {
    let (_temp, path) = setup_temp_segment();
    write_raw_records(&path, &[("a", "1"), ("b", "2"), ("a", "3")]);

    let result = SegmentRecovery::verify(&path).unwrap();

    assert_eq!(result.records_recovered, 3);
    assert_eq!(result.keys_indexed, 2);
    assert_eq!(result.end_offset, std::fs::metadata(&path).unwrap().len());
}

#[test]
fn test_verify_matches_recover() {
    let (_temp, path) = setup_temp_segment();
    write_raw_records(&path, &[("x", "1"), ("y", "2")]);

    let verified = SegmentRecovery::verify(&path).unwrap();
    let (_, recovered) = SegmentRecovery::recover(&path).unwrap();

    assert_eq!(verified, recovered);
}

#[test]
fn test_verify_detects_torn_tail() {
    let (_temp, path) = setup_temp_segment();
    write_raw_records(&path, &[("x", "1")]);
    append_raw(&path, &[1]);

    assert!(matches!(
        SegmentRecovery::verify(&path),
        Err(SegKvError::CorruptedSegment(_))
    ));
}
