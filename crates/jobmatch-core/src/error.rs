use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to read corpus {path}: {source}")]
    Corpus {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Malformed session details {path}: {source}")]
    SessionDetails {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Embedding cache {path}: {reason}")]
    Cache { path: PathBuf, reason: String },

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Operation failed: {0}")]
    Operation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
