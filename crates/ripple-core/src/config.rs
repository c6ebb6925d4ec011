//! Project configuration, optionally overridden by `ripple.toml` at the project root

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Config file looked up at the project root.
pub const CONFIG_FILE: &str = "ripple.toml";

/// Source extensions covered by the default include set.
pub const SOURCE_EXTENSIONS: [&str; 4] = ["ts", "tsx", "js", "jsx"];

/// Suffixes tried, in order, when resolving an import specifier to a file.
pub const RESOLVE_SUFFIXES: [&str; 8] = [
    ".ts",
    ".tsx",
    ".js",
    ".jsx",
    "/index.ts",
    "/index.tsx",
    "/index.js",
    "/index.jsx",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RippleConfig {
    /// Glob patterns of files to scan, relative to the root.
    pub include: Vec<String>,
    /// Directory names skipped wherever they appear in a path.
    pub ignore_dirs: Vec<String>,
    /// The one recognised alias prefix, e.g. `@/`.
    pub alias_prefix: String,
    /// Root-relative directory the alias prefix maps to (empty = project root).
    pub alias_root: String,
    /// Edge count above which a node is reported as a god object.
    pub coupling_threshold: usize,
    /// How far (in lines) a drifted patch may be re-targeted.
    pub drift_window: usize,
    /// Maximum number of applied patches kept for rollback.
    pub history_limit: usize,
    /// Files larger than this are skipped as unparseable.
    pub max_file_bytes: u64,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            include: SOURCE_EXTENSIONS
                .iter()
                .map(|ext| format!("**/*.{ext}"))
                .collect(),
            ignore_dirs: [
                "node_modules",
                ".git",
                "dist",
                "build",
                "out",
                ".next",
                "coverage",
                "__tests__",
                "__fixtures__",
                "__mocks__",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            alias_prefix: "@/".to_string(),
            alias_root: String::new(),
            coupling_threshold: 15,
            drift_window: 5,
            history_limit: 500,
            max_file_bytes: 1024 * 1024,
        }
    }
}

impl RippleConfig {
    /// Load `ripple.toml` from `root` if present, otherwise the defaults.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        let config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Whether any component of a root-relative path is an ignored directory.
    pub fn is_ignored(&self, relative: &Path) -> bool {
        relative.components().any(|c| {
            c.as_os_str()
                .to_str()
                .is_some_and(|name| self.ignore_dirs.iter().any(|d| d == name))
        })
    }
}
