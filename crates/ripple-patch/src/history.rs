//! Persisted patch history under `.ripple/`

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ripple_core::Patch;

use crate::error::HistoryError;

/// State directory: .ripple/
pub const STATE_DIR: &str = ".ripple";

/// Applied-patch history file
pub const HISTORY_FILE: &str = "history.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryFile {
    pub version: String,
    pub saved_at: DateTime<Utc>,
    pub patches: Vec<Patch>,
}

pub fn state_dir(root: &Path) -> PathBuf {
    root.join(STATE_DIR)
}

pub fn history_path(root: &Path) -> PathBuf {
    state_dir(root).join(HISTORY_FILE)
}

/// Write `patches` (oldest first) to `.ripple/history.json`.
pub fn save_history(root: &Path, patches: &[Patch]) -> Result<(), HistoryError> {
    let dir = state_dir(root);
    std::fs::create_dir_all(&dir).map_err(|source| HistoryError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let path = history_path(root);
    let file = HistoryFile {
        version: env!("CARGO_PKG_VERSION").to_string(),
        saved_at: Utc::now(),
        patches: patches.to_vec(),
    };
    let json = serde_json::to_string_pretty(&file).map_err(|source| HistoryError::Json {
        path: path.display().to_string(),
        source,
    })?;
    std::fs::write(&path, json).map_err(|source| HistoryError::Io {
        path: path.display().to_string(),
        source,
    })?;

    tracing::debug!("Saved {} history entries to {}", patches.len(), path.display());
    Ok(())
}

/// Load the persisted history; a missing file is an empty history.
pub fn load_history(root: &Path) -> Result<Vec<Patch>, HistoryError> {
    let path = history_path(root);
    if !path.exists() {
        return Ok(Vec::new());
    }

    let json = std::fs::read_to_string(&path).map_err(|source| HistoryError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let file: HistoryFile = serde_json::from_str(&json).map_err(|source| HistoryError::Json {
        path: path.display().to_string(),
        source,
    })?;

    tracing::debug!("Loaded {} history entries saved at {}", file.patches.len(), file.saved_at);
    Ok(file.patches)
}

/// Remove the whole `.ripple/` directory.
pub fn clear_state(root: &Path) -> Result<(), HistoryError> {
    let dir = state_dir(root);
    if dir.exists() {
        std::fs::remove_dir_all(&dir).map_err(|source| HistoryError::Io {
            path: dir.display().to_string(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_history_survives_save_and_load() {
        let dir = TempDir::new().unwrap();
        assert!(load_history(dir.path()).unwrap().is_empty());

        let patches = vec![Patch::new("src/a.ts", 3, "old", "new", "rename", true)];
        save_history(dir.path(), &patches).unwrap();
        assert_eq!(load_history(dir.path()).unwrap(), patches);

        let raw = std::fs::read_to_string(history_path(dir.path())).unwrap();
        assert!(raw.contains("\"savedAt\""));

        clear_state(dir.path()).unwrap();
        assert!(!state_dir(dir.path()).exists());
    }

    #[test]
    fn test_corrupt_history_is_reported() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(state_dir(dir.path())).unwrap();
        std::fs::write(history_path(dir.path()), "{ not json").unwrap();
        assert!(matches!(load_history(dir.path()), Err(HistoryError::Json { .. })));
    }
}
