//! Impact analysis over the direct dependents of a changed node

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info, warn};

use ripple_core::{
    ChangeDescriptor, CodeNode, DependencyGraph, ImpactReport, ImpactedNode, ImportResolver, NodeId, SourceStore,
};

use crate::error::{ImpactError, Result};
use crate::risk::assess_risk;
use crate::rules::Rule;

/// Predicts what a proposed change breaks. Reads dependents through a [`SourceStore`]; never writes.
pub struct ImpactAnalyzer<'a> {
    graph: &'a DependencyGraph,
    store: &'a dyn SourceStore,
    resolver: ImportResolver,
}

impl<'a> ImpactAnalyzer<'a> {
    /// `resolver` must come from the same configuration the graph was built with,
    /// e.g. [`ImportResolver::from_config`].
    pub fn new(graph: &'a DependencyGraph, store: &'a dyn SourceStore, resolver: ImportResolver) -> Self {
        Self { graph, store, resolver }
    }

    /// Build the impact report for `change`.
    ///
    /// Only an unknown target is an error. Missing change details and
    /// unreadable dependents are reported as warnings.
    pub async fn analyze_impact(&self, change: &ChangeDescriptor) -> Result<ImpactReport> {
        let target = self
            .graph
            .node(&change.node_id)
            .ok_or_else(|| ImpactError::NodeNotFound(change.node_id.to_string()))?;
        info!("Analyzing {} of {}", change.change_type, target.id);

        let mut warnings = Vec::new();
        let mut direct_impact = Vec::new();
        let mut breaking_changes = Vec::new();
        let mut suggested_fixes = Vec::new();

        if let Some(rule) = Rule::for_change(change, target, &mut warnings) {
            for dependent in self.graph.dependents(&target.id) {
                let content = match self.store.read(&dependent.path).await {
                    Ok(content) => content,
                    Err(e) => {
                        warn!("Could not read {}: {}", dependent.path, e);
                        warnings.push(format!("could not read {}: {}", dependent.path, e));
                        continue;
                    }
                };

                let findings = rule.scan(dependent, &content, self.graph, &self.resolver);
                if findings.is_empty() {
                    debug!("{} is unaffected", dependent.path);
                    continue;
                }

                direct_impact.push(impacted(dependent, findings.lines, !findings.breaking.is_empty(), rule.reason()));
                breaking_changes.extend(findings.breaking);
                suggested_fixes.extend(findings.fixes);
            }
        }

        let transitive_impact = self.transitive(&target.id, &direct_impact);
        let risk_level = assess_risk(change.change_type, breaking_changes.len(), direct_impact.len());
        info!(
            "{} direct, {} transitive, {} breaking, risk {}",
            direct_impact.len(),
            transitive_impact.len(),
            breaking_changes.len(),
            risk_level
        );

        Ok(ImpactReport {
            target_node: target.id.clone(),
            change: change.clone(),
            direct_impact,
            transitive_impact,
            breaking_changes,
            suggested_fixes,
            risk_level,
            warnings,
        })
    }

    /// Dependents of the directly impacted nodes, one hop out, for the report only.
    fn transitive(&self, target: &NodeId, direct: &[ImpactedNode]) -> Vec<ImpactedNode> {
        let direct_ids: HashSet<&NodeId> = direct.iter().map(|n| &n.node_id).collect();
        let mut reached: BTreeMap<&NodeId, (&CodeNode, &str)> = BTreeMap::new();

        for via in direct {
            for dependent in self.graph.dependents(&via.node_id) {
                if dependent.id == *target || direct_ids.contains(&dependent.id) {
                    continue;
                }
                reached.entry(&dependent.id).or_insert((dependent, via.name.as_str()));
            }
        }

        reached
            .into_values()
            .map(|(node, via)| impacted(node, Vec::new(), false, format!("Depends on {via}, which is directly impacted")))
            .collect()
    }
}

fn impacted(node: &CodeNode, lines: Vec<u32>, breaking: bool, reason: String) -> ImpactedNode {
    ImpactedNode {
        node_id: node.id.clone(),
        path: node.path.clone(),
        name: node.name.clone(),
        kind: node.kind,
        lines,
        breaking,
        reason,
    }
}
