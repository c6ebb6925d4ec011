//! Orchestrates a full analysis pass: scan, graph build, coherence and grouping

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use ripple_core::{
    AnalysisMetadata, CodeNode, CoherenceAnalyzer, CoherenceReport, DependencyGraph, Edge, EdgeKind,
    GraphAnalysisResult, GraphError, ImportResolver, NodeGroup, NodeId, RippleConfig, group_by_directory,
    project_name,
};

use crate::error::Result;
use crate::scanner::SourceScanner;

/// Everything one pass produced. Owned by the caller; the graph is rebuilt from scratch each pass.
#[derive(Debug)]
pub struct ProjectAnalysis {
    pub root: PathBuf,
    pub config: RippleConfig,
    pub project_name: String,
    pub graph: DependencyGraph,
    pub coherence: CoherenceReport,
    pub groups: Vec<NodeGroup>,
    pub total_files: usize,
    /// Paths that matched but could not be scanned.
    pub skipped: Vec<String>,
}

impl ProjectAnalysis {
    pub fn resolver(&self) -> ImportResolver {
        ImportResolver::from_config(&self.config)
    }

    /// The serialisable view of this pass.
    pub fn to_result(&self) -> GraphAnalysisResult {
        GraphAnalysisResult {
            nodes: self.graph.nodes().cloned().collect(),
            edges: self.graph.edges().cloned().collect(),
            groups: self.groups.clone(),
            metadata: AnalysisMetadata {
                project_name: self.project_name.clone(),
                total_files: self.total_files,
                total_nodes: self.graph.node_count(),
                total_edges: self.graph.edge_count(),
                coherence_score: self.coherence.score,
                issues: self.coherence.issues.clone(),
            },
        }
    }
}

pub struct Coordinator {
    root: PathBuf,
    config: RippleConfig,
}

impl Coordinator {
    pub fn new(root: impl AsRef<Path>, config: RippleConfig) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config,
        }
    }

    /// Load `ripple.toml` from `root` (or defaults) and build a coordinator.
    pub fn for_root(root: impl AsRef<Path>) -> Result<Self> {
        let config = RippleConfig::load(root.as_ref())?;
        Ok(Self::new(root, config))
    }

    pub async fn run_full_index(&self) -> Result<ProjectAnalysis> {
        info!("Analyzing {}", self.root.display());
        let scanner = SourceScanner::new(&self.root, self.config.clone())?;
        let outcome = scanner.scan().await;

        let resolver = ImportResolver::from_config(&self.config);
        let graph = build_graph(outcome.nodes, &resolver)?;
        let coherence = CoherenceAnalyzer::new(self.config.coupling_threshold).analyze(&graph);
        let groups = group_by_directory(&graph);

        info!(
            "Graph has {} nodes and {} edges; coherence score {} with {} issues",
            graph.node_count(),
            graph.edge_count(),
            coherence.score,
            coherence.issues.len()
        );

        Ok(ProjectAnalysis {
            root: self.root.clone(),
            config: self.config.clone(),
            project_name: project_name(&self.root),
            graph,
            coherence,
            groups,
            total_files: outcome.files_seen,
            skipped: outcome.skipped.iter().map(|e| e.path().to_string()).collect(),
        })
    }
}

/// Add every node, then one edge per (source, target, kind) for imports that resolve.
///
/// Type-only statements become `uses-type` edges, everything else `imports`.
/// The edge weight is the number of names carried.
pub fn build_graph(nodes: Vec<CodeNode>, resolver: &ImportResolver) -> std::result::Result<DependencyGraph, GraphError> {
    let mut graph = DependencyGraph::new();
    for node in nodes {
        graph.add_node(node);
    }

    let mut pending = Vec::new();
    for node in graph.nodes() {
        let mut collapsed: BTreeMap<(NodeId, EdgeKind), usize> = BTreeMap::new();
        for import in &node.imports {
            let Some(target) = resolver.resolve(&graph, &import.source, &node.path) else {
                continue;
            };
            if target == node.id {
                continue;
            }
            let kind = if import.is_type_only() {
                EdgeKind::UsesType
            } else {
                EdgeKind::Imports
            };
            *collapsed.entry((target, kind)).or_default() += 1;
        }
        for ((target, kind), names) in collapsed {
            pending.push(Edge::new(node.id.clone(), target, kind, names as f32));
        }
    }

    for edge in pending {
        debug!("Edge {}", edge.id.0);
        graph.add_edge(edge)?;
    }
    Ok(graph)
}
