//! Patch application and history errors

use thiserror::Error;

/// Why a single patch was not applied.
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("{path}:{line}: expected `{expected}` within {window} lines but found `{found}`")]
    Drift {
        path: String,
        line: u32,
        expected: String,
        found: String,
        window: usize,
    },

    #[error("{0} does not exist")]
    FileMissing(String),

    #[error("{path}: line {line} is outside the file ({len} lines)")]
    LineOutOfRange { path: String, line: u32, len: usize },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt patch history in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
