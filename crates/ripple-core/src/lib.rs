//! Ripple Core: dependency graph model, coherence scoring and change/patch types

pub mod analysis;
pub mod change;
pub mod coherence;
pub mod config;
pub mod error;
pub mod graph;
pub mod grouping;
pub mod model;
pub mod resolve;
pub mod store;
pub mod workspace;


#[cfg(test)]
pub mod test_utils;

pub use analysis::{AnalysisMetadata, GraphAnalysisResult};
pub use change::{
    BreakingChange, ChangeDescriptor, ChangeKind, ImpactReport, ImpactedNode, Patch, PatchApplyResult,
    RiskLevel, ValueDescriptor,
};
pub use coherence::{CoherenceAnalyzer, CoherenceIssue, CoherenceReport, IssueKind, Severity, detect_cycles};
pub use config::RippleConfig;
pub use error::{ConfigError, GraphError};
pub use graph::DependencyGraph;
pub use grouping::group_by_directory;
pub use model::{
    CodeNode, Edge, EdgeId, EdgeKind, ExportKind, ExportRef, FieldDef, HttpMethod, ImportKind, ImportRef,
    NodeFacts, NodeGroup, NodeId, NodeKind, SourceLocation,
};
pub use resolve::ImportResolver;
pub use store::{FsStore, SourceStore};
pub use workspace::{WorkspaceType, detect_workspace, project_name};
