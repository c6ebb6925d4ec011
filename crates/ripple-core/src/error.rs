//! Error types shared by the graph and configuration layers

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("edge {0} references unknown node {1}")]
    DanglingEdge(String, String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
