//! Structural health checks over a built dependency graph
//!
//! Four checks run over the graph (cycles, unused exports, orphaned files,
//! god objects) and every finding deducts a fixed amount from a score of 100.
//! The score is flat and additive: it is not normalised by graph size, so a
//! large codebase bottoms out at zero faster than a small one.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::graph::DependencyGraph;
use crate::model::{ExportKind, NodeId, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    CircularDependency,
    UnusedExport,
    OrphanedFile,
    GodObject,
}

impl IssueKind {
    fn prefix(&self) -> &'static str {
        match self {
            IssueKind::CircularDependency => "cycle",
            IssueKind::UnusedExport => "unused-export",
            IssueKind::OrphanedFile => "orphan",
            IssueKind::GodObject => "god-object",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    /// Points deducted from the coherence score per issue.
    pub fn penalty(&self) -> u32 {
        match self {
            Severity::Critical => 15,
            Severity::High => 10,
            Severity::Medium => 5,
            Severity::Low => 2,
            Severity::Info => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoherenceIssue {
    pub id: String,
    pub kind: IssueKind,
    pub severity: Severity,
    pub node_ids: Vec<NodeId>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoherenceReport {
    pub score: u32,
    pub issues: Vec<CoherenceIssue>,
}

/// Default edge count above which a node is a god object.
pub const DEFAULT_COUPLING_THRESHOLD: usize = 15;

pub struct CoherenceAnalyzer {
    coupling_threshold: usize,
}

impl CoherenceAnalyzer {
    pub fn new(coupling_threshold: usize) -> Self {
        Self { coupling_threshold }
    }

    /// Run every check and score the result.
    pub fn analyze(&self, graph: &DependencyGraph) -> CoherenceReport {
        let mut issues = Vec::new();
        issues.extend(detect_cycles(graph).into_iter().map(|cycle| {
            let path = cycle
                .iter()
                .map(|id| id.as_str())
                .collect::<Vec<_>>()
                .join(" -> ");
            IssueDraft {
                kind: IssueKind::CircularDependency,
                severity: Severity::High,
                node_ids: cycle,
                message: format!("Circular dependency: {path}"),
                suggestion: Some("Extract the shared code into a module both sides can import".to_string()),
            }
        }));
        issues.extend(self.unused_exports(graph));
        issues.extend(self.orphans(graph));
        issues.extend(self.god_objects(graph));

        let mut counters: HashMap<IssueKind, usize> = HashMap::new();
        let issues: Vec<CoherenceIssue> = issues
            .into_iter()
            .map(|draft| {
                let n = counters.entry(draft.kind).or_insert(0);
                *n += 1;
                CoherenceIssue {
                    id: format!("{}-{}", draft.kind.prefix(), n),
                    kind: draft.kind,
                    severity: draft.severity,
                    node_ids: draft.node_ids,
                    message: draft.message,
                    suggestion: draft.suggestion,
                }
            })
            .collect();

        let score = score(&issues);
        tracing::info!("Coherence: {} issues, score {}", issues.len(), score);
        CoherenceReport { score, issues }
    }

    fn unused_exports(&self, graph: &DependencyGraph) -> Vec<IssueDraft> {
        let imported: HashSet<&str> = graph
            .nodes()
            .flat_map(|n| n.imports.iter().map(|i| i.name.as_str()))
            .collect();

        let mut drafts = Vec::new();
        for node in graph.nodes() {
            for export in &node.exports {
                if export.kind == ExportKind::Default || imported.contains(export.name.as_str()) {
                    continue;
                }
                drafts.push(IssueDraft {
                    kind: IssueKind::UnusedExport,
                    severity: Severity::Low,
                    node_ids: vec![node.id.clone()],
                    message: format!("'{}' is exported by {} but never imported", export.name, node.path),
                    suggestion: Some(format!("Remove the export of '{}' or make it private", export.name)),
                });
            }
        }
        drafts
    }

    fn orphans(&self, graph: &DependencyGraph) -> Vec<IssueDraft> {
        graph
            .nodes()
            .filter(|n| n.kind != NodeKind::Api && graph.degree(&n.id) == 0)
            .map(|n| IssueDraft {
                kind: IssueKind::OrphanedFile,
                severity: Severity::Medium,
                node_ids: vec![n.id.clone()],
                message: format!("{} neither imports nor is imported by any project file", n.path),
                suggestion: Some("Delete the file if it is dead code".to_string()),
            })
            .collect()
    }

    fn god_objects(&self, graph: &DependencyGraph) -> Vec<IssueDraft> {
        graph
            .nodes()
            .filter_map(|n| {
                let degree = graph.degree(&n.id);
                (degree > self.coupling_threshold).then(|| IssueDraft {
                    kind: IssueKind::GodObject,
                    severity: Severity::Medium,
                    node_ids: vec![n.id.clone()],
                    message: format!(
                        "{} has {} connections (threshold {})",
                        n.path, degree, self.coupling_threshold
                    ),
                    suggestion: Some("Split the module along its responsibilities".to_string()),
                })
            })
            .collect()
    }
}

impl Default for CoherenceAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_COUPLING_THRESHOLD)
    }
}

struct IssueDraft {
    kind: IssueKind,
    severity: Severity,
    node_ids: Vec<NodeId>,
    message: String,
    suggestion: Option<String>,
}

/// 100 minus the severity penalty of every issue, clamped to [0, 100].
pub fn score(issues: &[CoherenceIssue]) -> u32 {
    let deducted: u32 = issues
        .iter()
        .fold(0u32, |acc, issue| acc.saturating_add(issue.severity.penalty()));
    100u32.saturating_sub(deducted)
}

/// Find cycles with a depth-first walk tracking the active recursion stack.
///
/// Each edge into a node already on the stack yields one cycle: the stack slice
/// from that node to the current one, closed by repeating the first node.
pub fn detect_cycles(graph: &DependencyGraph) -> Vec<Vec<NodeId>> {
    let mut visited: HashSet<&NodeId> = HashSet::new();
    let mut cycles = Vec::new();

    for start in graph.nodes() {
        if visited.contains(&start.id) {
            continue;
        }
        // (node, next outgoing edge to look at)
        let mut stack: Vec<(&NodeId, usize)> = vec![(&start.id, 0)];
        let mut on_stack: HashSet<&NodeId> = HashSet::from([&start.id]);
        visited.insert(&start.id);

        while let Some(&(current, cursor)) = stack.last() {
            let outgoing = graph.edges_from(current);
            let Some(&edge) = outgoing.get(cursor) else {
                on_stack.remove(current);
                stack.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }
            let next = &edge.target;

            if on_stack.contains(next) {
                let from = stack.iter().position(|(id, _)| *id == next).unwrap_or(0);
                let mut cycle: Vec<NodeId> = stack[from..].iter().map(|(id, _)| (*id).clone()).collect();
                cycle.push(next.clone());
                cycles.push(cycle);
            } else if visited.insert(next) {
                on_stack.insert(next);
                stack.push((next, 0));
            }
        }
    }

    cycles
}
