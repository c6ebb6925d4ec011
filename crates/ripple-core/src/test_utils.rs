//! Test utilities for Ripple

use crate::model::{CodeNode, ExportKind, ExportRef, NodeFacts, NodeId, NodeKind};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A bare file node for `path`.
pub fn node(path: &str) -> CodeNode {
    let stem = Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    CodeNode {
        id: NodeId::from_path(Path::new(path)),
        kind: NodeKind::File,
        name: stem,
        path: path.to_string(),
        line_count: 1,
        complexity: 1,
        imports: Vec::new(),
        exports: Vec::new(),
        facts: NodeFacts::None,
    }
}

/// A file node exporting the given names.
pub fn node_with_exports(path: &str, exports: &[(&str, ExportKind)]) -> CodeNode {
    let mut n = node(path);
    n.exports = exports
        .iter()
        .enumerate()
        .map(|(i, (name, kind))| ExportRef {
            name: name.to_string(),
            kind: *kind,
            line: i as u32 + 1,
        })
        .collect();
    n
}

/// Create a repository with a specific file structure
pub fn create_repo_with_structure(structure: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    for (path, content) in structure {
        let full_path = root.join(path);

        // Create parent directories if needed
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }

        fs::write(&full_path, content).unwrap();
    }

    temp_dir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_repo_with_structure() {
        let temp_dir = create_repo_with_structure(&[
            ("src/a.ts", "export const a = 1;"),
            ("src/ui/Button.tsx", "export default function Button() {}"),
        ]);
        assert!(temp_dir.path().join("src/a.ts").exists());
        assert!(temp_dir.path().join("src/ui/Button.tsx").exists());
    }

    #[test]
    fn test_node_ids_follow_paths() {
        assert_eq!(node("src/a.ts").id, NodeId::from("src/a.ts"));
        assert_eq!(node("src/a.ts").name, "a");
    }
}
