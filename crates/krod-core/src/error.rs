//! Error types for krod-core
//!
//! Rendering itself never fails; these cover loading inputs and talking to
//! the system clipboard.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid message or source list: {0}")]
    InvalidSources(#[from] serde_json::Error),

    #[error("duplicate source id: {0}")]
    DuplicateSourceId(String),

    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
}

pub type Result<T> = std::result::Result<T, Error>;
