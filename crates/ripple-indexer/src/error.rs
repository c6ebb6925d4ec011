//! Scanner and indexing errors

use thiserror::Error;

use ripple_core::{ConfigError, GraphError};

/// A single file that could not be turned into a node. Recovered: the file is skipped.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8")]
    Encoding { path: String },

    #[error("{path} is {size} bytes, over the {limit} byte limit")]
    TooLarge { path: String, size: u64, limit: u64 },

    #[error("no extractor handles {path}")]
    Unsupported { path: String },
}

impl ScanError {
    pub fn path(&self) -> &str {
        match self {
            ScanError::Read { path, .. }
            | ScanError::Encoding { path }
            | ScanError::TooLarge { path, .. }
            | ScanError::Unsupported { path } => path,
        }
    }
}

/// Failures that abort a whole indexing pass.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("invalid include pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("project root {0} is not a directory")]
    NotADirectory(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type Result<T> = std::result::Result<T, IndexError>;
