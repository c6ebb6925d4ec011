//! Integration tests for Ripple
//!
//! These drive scan, impact, apply and rollback together over a fixture project.

use std::fs;
use std::path::Path;
use std::process::Command;

use ripple_core::{ChangeDescriptor, ChangeKind, FsStore, RiskLevel, ValueDescriptor};
use ripple_impact::ImpactAnalyzer;
use ripple_indexer::Coordinator;
use ripple_patch::{PatchEngine, load_history, save_history};
use tempfile::TempDir;

const USER: &str = "export interface User {\n  id: string;\n  name: string;\n}\n";
const USER_NAME: &str = "import type { User } from '../types/user';\n\nexport function UserName({ user }: { user: User }) {\n  return <span>{user.name}</span>;\n}\n";
const USERS: &str = "import type { User } from '../types/user';\n\nexport function byId(users: User[], id: string) {\n  return users.find((u) => u.id === id);\n}\n";
const PROFILE: &str = "import { UserName } from '../components/UserName';\n\nexport default function Profile() {\n  return <UserName user={{ id: '1', name: 'x' }} />;\n}\n";

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    for (path, content) in [
        ("package.json", "{ \"name\": \"accounts\" }\n"),
        ("src/types/user.ts", USER),
        ("src/components/UserName.tsx", USER_NAME),
        ("src/services/users.ts", USERS),
        ("src/pages/Profile.tsx", PROFILE),
    ] {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
    dir
}

fn read(root: &Path, path: &str) -> String {
    fs::read_to_string(root.join(path)).unwrap()
}

#[tokio::test]
async fn test_rename_apply_and_rollback_across_invocations() {
    let repo = fixture();
    let root = repo.path();

    let analysis = Coordinator::for_root(root).unwrap().run_full_index().await.unwrap();
    assert_eq!(analysis.project_name, "accounts");
    assert_eq!(analysis.graph.node_count(), 4);

    let store = FsStore::new(root);
    let change = ChangeDescriptor::new("src/types/user.ts", ChangeKind::Rename)
        .after(ValueDescriptor::named("Account"));
    let report = ImpactAnalyzer::new(&analysis.graph, &store, analysis.resolver())
        .analyze_impact(&change)
        .await
        .unwrap();
    assert_eq!(report.direct_impact.len(), 2);
    assert_eq!(report.breaking_changes.len(), 4);
    assert_eq!(report.risk_level, RiskLevel::High);

    let mut engine = PatchEngine::with_config(FsStore::new(root), &analysis.config);
    let result = engine.apply_patches(&report.auto_fixes()).await;
    assert!(result.success, "{:?}", result.errors);
    assert_eq!(result.files_modified.len(), 2);
    assert!(read(root, "src/services/users.ts").contains("byId(users: Account[], id: string)"));
    assert!(read(root, "src/components/UserName.tsx").starts_with("import type { Account } from '../types/user';"));
    save_history(root, &engine.history().iter().cloned().collect::<Vec<_>>()).unwrap();

    // A later process only has the persisted history
    let mut later = PatchEngine::with_config(FsStore::new(root), &analysis.config);
    later.restore_history(load_history(root).unwrap());
    assert_eq!(later.history().len(), 4);
    let undone = later.rollback(None).await;
    assert!(undone.success, "{:?}", undone.errors);
    assert_eq!(read(root, "src/services/users.ts"), USERS);
    assert_eq!(read(root, "src/components/UserName.tsx"), USER_NAME);
}

#[tokio::test]
async fn test_reanalysis_sees_applied_fixes() {
    let repo = fixture();
    let root = repo.path();
    let store = FsStore::new(root);

    let analysis = Coordinator::for_root(root).unwrap().run_full_index().await.unwrap();
    let change = ChangeDescriptor::new("src/types/user.ts", ChangeKind::RemoveField)
        .before(ValueDescriptor::named("name"));
    let report = ImpactAnalyzer::new(&analysis.graph, &store, analysis.resolver())
        .analyze_impact(&change)
        .await
        .unwrap();
    let mut engine = PatchEngine::new(FsStore::new(root));
    assert!(engine.apply_patches(&report.auto_fixes()).await.success);

    let analysis = Coordinator::for_root(root).unwrap().run_full_index().await.unwrap();
    let report = ImpactAnalyzer::new(&analysis.graph, &store, analysis.resolver())
        .analyze_impact(&change)
        .await
        .unwrap();
    assert!(report.breaking_changes.is_empty());
    assert_eq!(report.risk_level, RiskLevel::Low);
}

/// The binary wires the same pipeline together and keeps JSON on stdout
#[test]
fn test_cli_impact_apply_then_rollback() {
    let repo = fixture();
    let root = repo.path().to_str().unwrap();
    let ripple = env!("CARGO_BIN_EXE_ripple");

    let output = Command::new(ripple)
        .args(["--root", root, "analyze", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["metadata"]["projectName"], "accounts");

    let output = Command::new(ripple)
        .args(["--root", root, "impact", "--node", "User", "--change", "rename", "--after-name", "Account", "--apply"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["riskLevel"], "high");
    assert!(read(repo.path(), "src/services/users.ts").contains("Account[]"));
    assert!(repo.path().join(".ripple/history.json").exists());

    let output = Command::new(ripple).args(["--root", root, "rollback"]).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(read(repo.path(), "src/services/users.ts"), USERS);

    let output = Command::new(ripple).args(["--root", root, "clear"]).output().unwrap();
    assert!(output.status.success());
    assert!(!repo.path().join(".ripple").exists());
}

#[test]
fn test_cli_rejects_unknown_change_kind() {
    let output = Command::new(env!("CARGO_BIN_EXE_ripple"))
        .args(["impact", "--node", "x", "--change", "explode"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown change type"));
}
