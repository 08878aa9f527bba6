//! Configuration structures for KestrelDB.

use serde::{Deserialize, Serialize};

/// Storage configuration for the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Enable fsync after page writes.
    pub fsync_enabled: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            fsync_enabled: true,
        }
    }
}
