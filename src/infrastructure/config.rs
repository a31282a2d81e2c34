//! Icon cache configuration.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "cordicons";
const APP_QUALIFIER: &str = "dev";
const APP_ORGANIZATION: &str = "cordicons";

/// Configuration for an [`IconCache`](crate::infrastructure::IconCache).
///
/// Embeddable in a host application's config file; every field has a default
/// so an empty table deserializes to the stock tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IconCacheConfig {
    /// Maximum decoded icons held in memory.
    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,

    /// Maximum concurrent downloads.
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Per-download timeout in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Cooldown in seconds before a failed key may be fetched again.
    #[serde(default = "default_retry_cooldown_secs")]
    pub retry_cooldown_secs: u64,

    /// Square display size icons are resampled to.
    #[serde(default = "default_icon_size")]
    pub icon_size: u32,

    /// Disk cache directory. `None` resolves to the platform cache dir.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

const fn default_memory_capacity() -> usize {
    256
}

const fn default_max_concurrent_fetches() -> usize {
    4
}

const fn default_fetch_timeout_secs() -> u64 {
    8
}

const fn default_retry_cooldown_secs() -> u64 {
    300
}

const fn default_icon_size() -> u32 {
    18
}

impl Default for IconCacheConfig {
    fn default() -> Self {
        Self {
            memory_capacity: default_memory_capacity(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            retry_cooldown_secs: default_retry_cooldown_secs(),
            icon_size: default_icon_size(),
            cache_dir: None,
        }
    }
}

impl IconCacheConfig {
    /// Per-download timeout as a [`Duration`].
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Retry cooldown as a [`Duration`].
    #[must_use]
    pub const fn retry_cooldown(&self) -> Duration {
        Duration::from_secs(self.retry_cooldown_secs)
    }

    /// The directory the disk cache lives in.
    #[must_use]
    pub fn resolved_cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(default_cache_dir)
    }
}

/// Platform cache directory for icons, with a temp-dir fallback.
fn default_cache_dir() -> PathBuf {
    ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME).map_or_else(
        || std::env::temp_dir().join(APP_NAME).join("icons"),
        |dirs| dirs.cache_dir().join("icons"),
    )
}
