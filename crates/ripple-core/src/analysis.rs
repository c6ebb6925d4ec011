//! The serialisable result of one full analysis pass

use serde::{Deserialize, Serialize};

use crate::coherence::CoherenceIssue;
use crate::model::{CodeNode, Edge, NodeGroup};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub project_name: String,
    pub total_files: usize,
    pub total_nodes: usize,
    pub total_edges: usize,
    pub coherence_score: u32,
    pub issues: Vec<CoherenceIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphAnalysisResult {
    pub nodes: Vec<CodeNode>,
    pub edges: Vec<Edge>,
    pub groups: Vec<NodeGroup>,
    pub metadata: AnalysisMetadata,
}
