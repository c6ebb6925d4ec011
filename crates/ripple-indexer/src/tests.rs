//! Unit tests for ripple-indexer module

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::languages::get_extractor;
use crate::*;
use ripple_core::{EdgeKind, ImportResolver, IssueKind, NodeId, NodeKind, RippleConfig};

/// Create a repository with a specific file structure
fn create_repo_with_structure(structure: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for (path, content) in structure {
        let full_path = temp_dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full_path, content).unwrap();
    }
    temp_dir
}

#[test]
fn test_extractor_detection() {
    for file in ["a.ts", "a.tsx", "a.js", "a.jsx", "a.mjs"] {
        assert!(get_extractor(Path::new(file)).is_some(), "Should have extractor for {file}");
    }
    for file in ["main.rs", "README.md", "Makefile"] {
        assert!(get_extractor(Path::new(file)).is_none(), "Should not handle {file}");
    }
}

#[test]
fn test_discovery_respects_include_and_ignore_sets() {
    let repo = create_repo_with_structure(&[
        ("src/index.ts", "export const a = 1;"),
        ("src/App.tsx", "export default function App() { return <div />; }"),
        ("src/legacy.js", "module.exports = {};"),
        ("src/styles.css", "body {}"),
        ("node_modules/react/index.js", "export default {};"),
        ("dist/bundle.js", "var x;"),
        ("src/__tests__/app.test.ts", "test('x', () => {});"),
    ]);

    let scanner = SourceScanner::new(repo.path(), RippleConfig::default()).unwrap();
    assert_eq!(
        scanner.discover(),
        vec!["src/App.tsx", "src/index.ts", "src/legacy.js"]
    );
}

#[test]
fn test_custom_include_globs() {
    let repo = create_repo_with_structure(&[
        ("src/a.ts", ""),
        ("scripts/b.ts", ""),
    ]);
    let config = RippleConfig {
        include: vec!["src/**/*.ts".to_string()],
        ..RippleConfig::default()
    };
    let scanner = SourceScanner::new(repo.path(), config).unwrap();
    assert_eq!(scanner.discover(), vec!["src/a.ts"]);
}

#[test]
fn test_invalid_glob_is_an_error() {
    let repo = create_repo_with_structure(&[]);
    let config = RippleConfig {
        include: vec!["src/[".to_string()],
        ..RippleConfig::default()
    };
    assert!(matches!(
        SourceScanner::new(repo.path(), config),
        Err(IndexError::Pattern { .. })
    ));
}

#[tokio::test]
async fn test_unreadable_files_are_skipped() {
    let repo = create_repo_with_structure(&[("src/ok.ts", "export const ok = true;")]);
    fs::write(repo.path().join("src/binary.ts"), [0xff, 0xfe, 0x00, 0x80]).unwrap();
    fs::write(repo.path().join("src/huge.ts"), "x".repeat(64)).unwrap();

    let config = RippleConfig {
        max_file_bytes: 32,
        ..RippleConfig::default()
    };
    let scanner = SourceScanner::new(repo.path(), config).unwrap();
    let outcome = scanner.scan().await;

    assert_eq!(outcome.files_seen, 3);
    assert_eq!(outcome.nodes.len(), 1);
    assert_eq!(outcome.nodes[0].id, NodeId::from("src/ok.ts"));
    assert_eq!(outcome.skipped.len(), 2);
    assert!(outcome.skipped.iter().any(|e| matches!(e, ScanError::Encoding { .. })));
    assert!(outcome.skipped.iter().any(|e| matches!(e, ScanError::TooLarge { size: 64, .. })));
}

#[tokio::test]
async fn test_full_index_builds_edges_and_issues() {
    let repo = create_repo_with_structure(&[
        (
            "package.json",
            r#"{ "name": "shop" }"#,
        ),
        (
            "src/types/user.ts",
            "export interface User {\n  id: string;\n  name: string;\n}\n",
        ),
        (
            "src/components/UserCard.tsx",
            "import type { User } from '../types/user';\nimport { format } from '@/src/utils/format';\n\nexport function UserCard({ user }: { user: User }) {\n  return <div>{format(user.name)}</div>;\n}\n",
        ),
        (
            "src/utils/format.ts",
            "import { UserCard } from '../components/UserCard';\nexport const format = (s: string) => s.trim();\nexport const unused = 1;\n",
        ),
        ("src/lonely.ts", "const nothing = 0;\n"),
    ]);

    let analysis = Coordinator::for_root(repo.path()).unwrap().run_full_index().await.unwrap();
    let graph = &analysis.graph;

    assert_eq!(analysis.project_name, "shop");
    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.node(&"src/types/user.ts".into()).unwrap().kind, NodeKind::Interface);

    let card: NodeId = "src/components/UserCard.tsx".into();
    assert!(graph.has_edge_between(&card, &"src/types/user.ts".into(), EdgeKind::UsesType));
    assert!(graph.has_edge_between(&card, &"src/utils/format.ts".into(), EdgeKind::Imports));

    let kinds: Vec<IssueKind> = analysis.coherence.issues.iter().map(|i| i.kind).collect();
    assert!(kinds.contains(&IssueKind::CircularDependency));
    assert!(kinds.contains(&IssueKind::UnusedExport));
    assert!(kinds.contains(&IssueKind::OrphanedFile));
    assert!(analysis.coherence.score < 100);

    let result = analysis.to_result();
    assert_eq!(result.metadata.total_files, 4);
    assert_eq!(result.metadata.total_edges, graph.edge_count());
    assert_eq!(result.groups.len(), 4);
}

#[test]
fn test_build_graph_collapses_imports_per_target() {
    let scan = |path: &str, content: &str| {
        let extraction = get_extractor(Path::new(path)).unwrap().extract(path, content);
        ripple_core::CodeNode {
            id: path.into(),
            kind: extraction.kind,
            name: extraction.name,
            path: path.to_string(),
            line_count: extraction.line_count,
            complexity: extraction.complexity,
            imports: extraction.imports,
            exports: extraction.exports,
            facts: extraction.facts,
        }
    };
    let nodes = vec![
        scan("src/a.ts", "import { x, y } from './b';\nimport { z } from './b';\nimport lodash from 'lodash';\n"),
        scan("src/b.ts", "export const x = 1, y = 2, z = 3;\n"),
    ];

    let graph = build_graph(nodes, &ImportResolver::default()).unwrap();
    assert_eq!(graph.edge_count(), 1);
    let edge = graph.edges().next().unwrap();
    assert_eq!(edge.kind, EdgeKind::Imports);
    assert_eq!(edge.weight, 3.0);
}

#[tokio::test]
async fn test_side_effect_import_links_both_files() {
    let repo = create_repo_with_structure(&[
        ("src/main.ts", "import './setup';\n\nexport const ready = true;\n"),
        ("src/setup.ts", "globalThis.configured = true;\n"),
    ]);

    let analysis = Coordinator::for_root(repo.path()).unwrap().run_full_index().await.unwrap();
    let graph = &analysis.graph;

    assert_eq!(graph.edge_count(), 1);
    assert!(graph.has_edge_between(&"src/main.ts".into(), &"src/setup.ts".into(), EdgeKind::Imports));
    assert_eq!(graph.edges().next().unwrap().weight, 1.0);
    assert!(
        analysis.coherence.issues.iter().all(|i| i.kind != IssueKind::OrphanedFile),
        "{:?}",
        analysis.coherence.issues
    );
}
