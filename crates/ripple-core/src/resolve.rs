//! Import specifier resolution against the node ids of a graph

use crate::config::{RESOLVE_SUFFIXES, RippleConfig};
use crate::graph::DependencyGraph;
use crate::model::NodeId;

/// Resolves relative and aliased specifiers. Bare package specifiers never resolve.
#[derive(Debug, Clone)]
pub struct ImportResolver {
    alias_prefix: String,
    alias_root: String,
}

impl ImportResolver {
    pub fn new(alias_prefix: impl Into<String>, alias_root: impl Into<String>) -> Self {
        Self {
            alias_prefix: alias_prefix.into(),
            alias_root: alias_root.into(),
        }
    }

    pub fn from_config(config: &RippleConfig) -> Self {
        Self::new(config.alias_prefix.clone(), config.alias_root.clone())
    }

    /// Resolve `specifier` as written in the file at `containing_path` to a node id in `graph`.
    ///
    /// Tries the specifier verbatim and then with each of [`RESOLVE_SUFFIXES`]; first match wins.
    pub fn resolve(
        &self,
        graph: &DependencyGraph,
        specifier: &str,
        containing_path: &str,
    ) -> Option<NodeId> {
        let base = self.base_path(specifier, containing_path)?;
        std::iter::once(base.clone())
            .chain(RESOLVE_SUFFIXES.iter().map(|suffix| format!("{base}{suffix}")))
            .map(NodeId)
            .find(|candidate| graph.contains(candidate))
    }

    /// The root-relative path a specifier points at, before suffixes are tried.
    pub fn base_path(&self, specifier: &str, containing_path: &str) -> Option<String> {
        if specifier.starts_with("./") || specifier.starts_with("../") {
            let dir = match containing_path.rfind('/') {
                Some(pos) => &containing_path[..pos],
                None => "",
            };
            normalize(dir, specifier)
        } else if !self.alias_prefix.is_empty() && specifier.starts_with(&self.alias_prefix) {
            normalize(&self.alias_root, &specifier[self.alias_prefix.len()..])
        } else {
            None
        }
    }
}

impl Default for ImportResolver {
    fn default() -> Self {
        Self::from_config(&RippleConfig::default())
    }
}

/// Join `relative` onto `dir`, folding `.` and `..`. Escaping the root yields `None`.
fn normalize(dir: &str, relative: &str) -> Option<String> {
    let mut parts: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::node;

    fn graph_with(paths: &[&str]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for path in paths {
            graph.add_node(node(path));
        }
        graph
    }

    #[test]
    fn test_relative_with_extension_suffix() {
        let graph = graph_with(&["src/types/user.ts", "src/app.tsx"]);
        let resolver = ImportResolver::default();
        assert_eq!(
            resolver.resolve(&graph, "./types/user", "src/app.tsx"),
            Some(NodeId::from("src/types/user.ts"))
        );
    }

    #[test]
    fn test_parent_directory_and_index() {
        let graph = graph_with(&["src/lib/index.ts", "src/pages/home.tsx"]);
        let resolver = ImportResolver::default();
        assert_eq!(
            resolver.resolve(&graph, "../lib", "src/pages/home.tsx"),
            Some(NodeId::from("src/lib/index.ts"))
        );
    }

    #[test]
    fn test_verbatim_match_wins() {
        let graph = graph_with(&["src/util.js", "src/util.js.ts"]);
        let resolver = ImportResolver::default();
        assert_eq!(
            resolver.resolve(&graph, "./util.js", "src/a.ts"),
            Some(NodeId::from("src/util.js"))
        );
    }

    #[test]
    fn test_alias_root() {
        let graph = graph_with(&["src/components/Button.tsx"]);
        let resolver = ImportResolver::new("@/", "src");
        assert_eq!(
            resolver.resolve(&graph, "@/components/Button", "src/pages/a.tsx"),
            Some(NodeId::from("src/components/Button.tsx"))
        );
    }

    #[test]
    fn test_bare_packages_never_resolve() {
        let graph = graph_with(&["react.ts"]);
        let resolver = ImportResolver::default();
        assert_eq!(resolver.resolve(&graph, "react", "src/a.ts"), None);
    }

    #[test]
    fn test_escaping_root_does_not_resolve() {
        let resolver = ImportResolver::default();
        assert_eq!(resolver.base_path("../../x", "a.ts"), None);
    }
}
