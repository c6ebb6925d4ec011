//! Project detection and naming

use std::path::Path;

/// Detect which kind of JavaScript project lives at `root`.
pub fn detect_workspace(root: &Path) -> Option<WorkspaceType> {
    if root.join("pnpm-workspace.yaml").exists() {
        Some(WorkspaceType::Pnpm)
    } else if root.join("package.json").exists() {
        Some(WorkspaceType::Npm)
    } else if root.join("deno.json").exists() {
        Some(WorkspaceType::Deno)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceType {
    Npm,
    Pnpm, // pnpm-workspace.yaml next to package.json
    Deno,
}

/// The `name` from `package.json`, falling back to the root directory name.
pub fn project_name(root: &Path) -> String {
    let from_manifest = match detect_workspace(root) {
        Some(WorkspaceType::Npm | WorkspaceType::Pnpm) => std::fs::read_to_string(root.join("package.json"))
            .ok()
            .and_then(|raw| serde_json::from_str::<serde_json::Value>(&raw).ok())
            .and_then(|json| json.get("name")?.as_str().map(str::to_string)),
        Some(WorkspaceType::Deno) | None => None,
    };

    from_manifest.unwrap_or_else(|| {
        let canonical = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        canonical
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string())
    })
}
