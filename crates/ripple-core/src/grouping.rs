//! Directory grouping for collapsed canvas views
//!
//! Presentation only: no analysis reads these groups.

use crate::graph::DependencyGraph;
use crate::model::{NodeGroup, NodeId};
use std::collections::BTreeMap;

/// Group every node under its parent directory. Files at the root share the `.` group.
pub fn group_by_directory(graph: &DependencyGraph) -> Vec<NodeGroup> {
    let mut by_dir: BTreeMap<String, Vec<NodeId>> = BTreeMap::new();

    for node in graph.nodes() {
        let dir = match node.path.rfind('/') {
            Some(pos) => node.path[..pos].to_string(),
            None => ".".to_string(),
        };
        by_dir.entry(dir).or_default().push(node.id.clone());
    }

    by_dir
        .into_iter()
        .map(|(dir, mut node_ids)| {
            node_ids.sort();
            let label = dir.rsplit('/').next().unwrap_or(&dir).to_string();
            NodeGroup {
                id: format!("group:{dir}"),
                label,
                node_ids,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::node;

    #[test]
    fn test_groups_by_parent_directory() {
        let mut graph = DependencyGraph::new();
        for p in ["src/a.ts", "src/b.ts", "src/ui/Button.tsx", "index.ts"] {
            graph.add_node(node(p));
        }

        let groups = group_by_directory(&graph);
        assert_eq!(groups.len(), 3);

        let src = groups.iter().find(|g| g.id == "group:src").unwrap();
        assert_eq!(src.node_ids.len(), 2);

        let ui = groups.iter().find(|g| g.id == "group:src/ui").unwrap();
        assert_eq!(ui.label, "ui");

        assert!(groups.iter().any(|g| g.id == "group:."));
    }
}
