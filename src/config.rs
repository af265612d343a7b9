//! Configuration for SegKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, SegKvError};

/// File name of the active (writable) segment inside the data directory
pub const ACTIVE_SEGMENT_NAME: &str = "current-data";

/// File name prefix for sealed segments: `segment-<id>.dat`
pub const SEALED_SEGMENT_PREFIX: &str = "segment-";

/// File extension for sealed segments
pub const SEALED_SEGMENT_EXTENSION: &str = "dat";

/// Main configuration for a SegKV store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding all segment files. Must already exist.
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── current-data           (active segment)
    ///     └── segment-<id>.dat       (sealed segments, zero or more)
    pub data_dir: PathBuf,

    /// Active segment size (in bytes) at which it is sealed and rotated
    pub max_segment_bytes: u64,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync the active segment
    pub sync_strategy: SyncStrategy,
}

/// Segment sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync after every append (safest, slowest)
    EveryWrite,

    /// fsync after N un-synced appends (balanced durability/performance)
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./segkv_data"),
            max_segment_bytes: 10 * 1024 * 1024, // 10 MB
            sync_strategy: SyncStrategy::EveryNEntries { count: 100 },
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the store cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_segment_bytes == 0 {
            return Err(SegKvError::Config(
                "max_segment_bytes must be greater than zero".to_string(),
            ));
        }

        if let SyncStrategy::EveryNEntries { count: 0 } = self.sync_strategy {
            return Err(SegKvError::Config(
                "sync batch size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Path of the active segment file
    pub fn active_segment_path(&self) -> PathBuf {
        self.data_dir.join(ACTIVE_SEGMENT_NAME)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the rotation threshold (in bytes)
    pub fn max_segment_bytes(mut self, bytes: u64) -> Self {
        self.config.max_segment_bytes = bytes;
        self
    }

    /// Set the segment sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
