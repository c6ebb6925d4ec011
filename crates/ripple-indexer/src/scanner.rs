//! Project discovery and per-file extraction

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use tracing::{debug, info, warn};

use ripple_core::{CodeNode, NodeId, RippleConfig};

use crate::error::{IndexError, Result, ScanError};
use crate::languages::get_extractor;

/// What one scan produced.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// One node per extracted file, ordered by path.
    pub nodes: Vec<CodeNode>,
    /// Files that matched but could not be extracted.
    pub skipped: Vec<ScanError>,
    /// Number of files that matched the include set.
    pub files_seen: usize,
}

/// Walks a project root and builds one [`CodeNode`] per matching source file.
pub struct SourceScanner {
    root: PathBuf,
    config: RippleConfig,
    include: GlobSet,
}

impl SourceScanner {
    pub fn new(root: impl AsRef<Path>, config: RippleConfig) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(IndexError::NotADirectory(root.display().to_string()));
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in &config.include {
            let glob = Glob::new(pattern).map_err(|source| IndexError::Pattern {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        let include = builder.build().map_err(|source| IndexError::Pattern {
            pattern: config.include.join(", "),
            source,
        })?;

        Ok(Self { root, config, include })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Matching files as project-relative `/`-separated paths, sorted.
    pub fn discover(&self) -> Vec<String> {
        let prune = self.config.clone();
        let walker = WalkBuilder::new(&self.root)
            .hidden(true)
            .git_ignore(true)
            .filter_entry(move |entry| entry.depth() == 0 || !prune.is_ignored(Path::new(entry.file_name())))
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Walker error: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            if self.include.is_match(relative) {
                files.push(NodeId::from_path(relative).0);
            }
        }

        files.sort();
        debug!("Discovered {} source files under {}", files.len(), self.root.display());
        files
    }

    /// Scan every matching file. Per-file failures are logged and skipped.
    pub async fn scan(&self) -> ScanOutcome {
        let files = self.discover();
        let mut outcome = ScanOutcome {
            files_seen: files.len(),
            ..ScanOutcome::default()
        };

        for path in files {
            match self.scan_file(&path).await {
                Ok(node) => outcome.nodes.push(node),
                Err(e) => {
                    warn!("Skipping {}: {}", path, e);
                    outcome.skipped.push(e);
                }
            }
        }

        info!(
            "Scanned {} files ({} nodes, {} skipped)",
            outcome.files_seen,
            outcome.nodes.len(),
            outcome.skipped.len()
        );
        outcome
    }

    /// Read and extract a single project-relative file.
    pub async fn scan_file(&self, relative: &str) -> std::result::Result<CodeNode, ScanError> {
        let full = self.root.join(relative);
        let read_error = |source| ScanError::Read {
            path: relative.to_string(),
            source,
        };

        let size = tokio::fs::metadata(&full).await.map_err(read_error)?.len();
        if size > self.config.max_file_bytes {
            return Err(ScanError::TooLarge {
                path: relative.to_string(),
                size,
                limit: self.config.max_file_bytes,
            });
        }

        let bytes = tokio::fs::read(&full).await.map_err(read_error)?;
        let content = String::from_utf8(bytes).map_err(|_| ScanError::Encoding {
            path: relative.to_string(),
        })?;

        let extractor = get_extractor(Path::new(relative)).ok_or_else(|| ScanError::Unsupported {
            path: relative.to_string(),
        })?;
        let extraction = extractor.extract(relative, &content);
        debug!("Extracted {} as {} '{}'", relative, extraction.kind, extraction.name);

        Ok(CodeNode {
            id: NodeId::from(relative),
            kind: extraction.kind,
            name: extraction.name,
            path: relative.to_string(),
            line_count: extraction.line_count,
            complexity: extraction.complexity,
            imports: extraction.imports,
            exports: extraction.exports,
            facts: extraction.facts,
        })
    }
}
