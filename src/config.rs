//! Configuration for StegFS
//!
//! Centralized store configuration with sensible defaults.

use std::fs::File;

/// Configuration for an open store handle
#[derive(Debug, Clone)]
pub struct StoreConfig {
    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// Durability barrier issued after every directory rewrite
    pub sync_mode: SyncMode,

    // -------------------------------------------------------------------------
    // Access Configuration
    // -------------------------------------------------------------------------
    /// Open the container without write access; mutations fail with `ReadOnly`
    pub read_only: bool,

    /// Largest buffer a single `read` may allocate (in bytes)
    pub max_read_size: u64,
}

/// Durability barrier strategy
///
/// Both variants force data to stable storage; neither skips the barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// `fsync`: file data and metadata (safest)
    Full,

    /// `fdatasync`: file data only, metadata when required for retrieval
    DataOnly,
}

impl SyncMode {
    /// Issue the barrier on `file`
    pub(crate) fn sync(self, file: &File) -> std::io::Result<()> {
        match self {
            SyncMode::Full => file.sync_all(),
            SyncMode::DataOnly => file.sync_data(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sync_mode: SyncMode::Full,
            read_only: false,
            max_read_size: u64::MAX,
        }
    }
}

impl StoreConfig {
    /// Create a new config builder
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }
}

/// Builder for StoreConfig
#[derive(Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    /// Set the durability barrier strategy
    pub fn sync_mode(mut self, mode: SyncMode) -> Self {
        self.config.sync_mode = mode;
        self
    }

    /// Open the container read-only
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.config.read_only = read_only;
        self
    }

    /// Cap the size of a single read buffer (in bytes)
    pub fn max_read_size(mut self, bytes: u64) -> Self {
        self.config.max_read_size = bytes;
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}
