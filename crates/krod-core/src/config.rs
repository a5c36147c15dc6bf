//! Configuration loaded from `~/.krod/config.toml`
//!
//! Every section defaults, so a missing file or a partial file is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sources::COLLAPSED_SOURCE_LIMIT;

/// Default copy feedback window in milliseconds
pub const DEFAULT_COPY_FEEDBACK_MS: u64 = 2000;

/// Default number of cached messages before the cache is flushed
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KrodConfig {
    pub sources: SourcesConfig,
    pub clipboard: ClipboardConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Cards shown while the source list is collapsed
    pub collapsed_limit: usize,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            collapsed_limit: COLLAPSED_SOURCE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// How long a code block shows "Copied" after a successful copy
    pub feedback_ms: u64,
    /// Only one code block may show the indicator at a time
    pub exclusive_indicator: bool,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            feedback_ms: DEFAULT_COPY_FEEDBACK_MS,
            exclusive_indicator: false,
        }
    }
}

impl ClipboardConfig {
    pub fn feedback(&self) -> Duration {
        Duration::from_millis(self.feedback_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl KrodConfig {
    /// `~/.krod`, or `None` when no home directory can be determined
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".krod"))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        match Self::config_dir() {
            Some(dir) => Self::load_from(&dir.join("config.toml")),
            None => Ok(Self::default()),
        }
    }

    /// Load from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&raw).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}
