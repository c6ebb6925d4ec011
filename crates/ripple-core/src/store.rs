//! File read/write capability addressed by project-relative path

use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// The only way the analysis and patch layers touch file contents.
#[async_trait]
pub trait SourceStore: Send + Sync {
    /// Read a whole file as UTF-8.
    async fn read(&self, path: &str) -> std::io::Result<String>;

    /// Replace a whole file.
    async fn write(&self, path: &str, content: &str) -> std::io::Result<()>;

    async fn exists(&self, path: &str) -> bool;
}

/// [`SourceStore`] backed by the local filesystem under a project root.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

#[async_trait]
impl SourceStore for FsStore {
    async fn read(&self, path: &str) -> std::io::Result<String> {
        tokio::fs::read_to_string(self.resolve(path)).await
    }

    async fn write(&self, path: &str, content: &str) -> std::io::Result<()> {
        tokio::fs::write(self.resolve(path), content).await
    }

    async fn exists(&self, path: &str) -> bool {
        tokio::fs::try_exists(self.resolve(path))
            .await
            .unwrap_or(false)
    }
}
