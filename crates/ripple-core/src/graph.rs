//! Graph wrapper using petgraph::StableDiGraph keyed by path-derived NodeIds

use crate::error::GraphError;
use crate::model::*;
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeSet, HashMap};

/// The dependency graph: an id-indexed arena of nodes and directed edges.
///
/// Nodes are only ever addressed by [`NodeId`]; petgraph indices never leave this type.
pub struct DependencyGraph {
    inner: StableDiGraph<CodeNode, Edge>,
    index: HashMap<NodeId, NodeIndex>,
}

impl std::fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl DependencyGraph {
    pub fn new() -> Self {
        DependencyGraph {
            inner: StableDiGraph::new(),
            index: HashMap::new(),
        }
    }

    /// Add a node. A node with the same id replaces the previous weight.
    pub fn add_node(&mut self, node: CodeNode) -> NodeId {
        let id = node.id.clone();
        match self.index.get(&id) {
            Some(&idx) => {
                if let Some(slot) = self.inner.node_weight_mut(idx) {
                    *slot = node;
                }
            }
            None => {
                let idx = self.inner.add_node(node);
                self.index.insert(id.clone(), idx);
            }
        }
        id
    }

    /// Add an edge. Both endpoints must already be in the graph.
    pub fn add_edge(&mut self, edge: Edge) -> Result<EdgeId, GraphError> {
        let source = self
            .index
            .get(&edge.source)
            .copied()
            .ok_or_else(|| GraphError::DanglingEdge(edge.id.0.clone(), edge.source.0.clone()))?;
        let target = self
            .index
            .get(&edge.target)
            .copied()
            .ok_or_else(|| GraphError::DanglingEdge(edge.id.0.clone(), edge.target.0.clone()))?;
        let id = edge.id.clone();
        self.inner.add_edge(source, target, edge);
        Ok(id)
    }

    /// Get a node by ID.
    pub fn node(&self, id: &NodeId) -> Option<&CodeNode> {
        self.index
            .get(id)
            .and_then(|&idx| self.inner.node_weight(idx))
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Iterate over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &CodeNode> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// Iterate over all edges.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.inner
            .edge_indices()
            .filter_map(move |idx| self.inner.edge_weight(idx))
    }

    /// Get all outgoing edges from a node.
    pub fn edges_from(&self, source: &NodeId) -> Vec<&Edge> {
        self.directed(source, Direction::Outgoing)
    }

    /// Get all incoming edges to a node.
    pub fn edges_to(&self, target: &NodeId) -> Vec<&Edge> {
        self.directed(target, Direction::Incoming)
    }

    fn directed(&self, id: &NodeId, direction: Direction) -> Vec<&Edge> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        self.inner
            .edges_directed(idx, direction)
            .map(|edge_ref| edge_ref.weight())
            .collect()
    }

    /// Nodes with an edge pointing at `id`, sorted by id and deduplicated.
    pub fn dependents(&self, id: &NodeId) -> Vec<&CodeNode> {
        let ids: BTreeSet<&NodeId> = self.edges_to(id).into_iter().map(|e| &e.source).collect();
        ids.into_iter().filter_map(|id| self.node(id)).collect()
    }

    /// Nodes `id` points at, sorted by id and deduplicated.
    pub fn dependencies(&self, id: &NodeId) -> Vec<&CodeNode> {
        let ids: BTreeSet<&NodeId> = self.edges_from(id).into_iter().map(|e| &e.target).collect();
        ids.into_iter().filter_map(|id| self.node(id)).collect()
    }

    /// Incoming plus outgoing edge count.
    pub fn degree(&self, id: &NodeId) -> usize {
        self.edges_to(id).len() + self.edges_from(id).len()
    }

    /// Check if an edge exists between two nodes of a specific kind.
    pub fn has_edge_between(&self, source: &NodeId, target: &NodeId, kind: EdgeKind) -> bool {
        self.edges_from(source)
            .into_iter()
            .any(|e| &e.target == target && e.kind == kind)
    }

    /// Find a node by primary construct name (first match).
    pub fn find_node_by_name(&self, name: &str) -> Option<&CodeNode> {
        self.nodes().find(|n| n.name == name)
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
