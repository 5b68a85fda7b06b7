//! Store configuration.
//!
//! There is no config file; hosts build a `StoreConfig` in code and hand it to
//! `TaskStore::from_config` and `init_logging`.

use crate::logging::default_log_level;

/// Storage key the task collection is mirrored under.
pub const DEFAULT_STORAGE_KEY: &str = "todos";

/// Host-provided settings for one task store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Key-value key holding the serialized collection.
    pub storage_key: String,
    /// Level passed to `init_logging` by hosts that enable file logs.
    pub log_level: &'static str,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            log_level: default_log_level(),
        }
    }
}

impl StoreConfig {
    pub fn with_storage_key(mut self, storage_key: impl Into<String>) -> Self {
        self.storage_key = storage_key.into();
        self
    }

    pub fn with_log_level(mut self, log_level: &'static str) -> Self {
        self.log_level = log_level;
        self
    }

    /// Returns the trimmed storage key, or the default when blank.
    pub fn storage_key_or_default(&self) -> &str {
        let trimmed = self.storage_key.trim();
        if trimmed.is_empty() {
            DEFAULT_STORAGE_KEY
        } else {
            trimmed
        }
    }
}
