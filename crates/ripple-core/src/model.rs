//! Core data structures for the dependency graph

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Unique, stable identifier for a node: the project-relative path with `/` separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Derive the id for a project-relative path. The same path always yields the same id.
    pub fn from_path(relative: &Path) -> Self {
        let parts: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                std::path::Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        NodeId(parts.join("/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId(s)
    }
}

/// Unique edge identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl EdgeId {
    pub fn new(source: &NodeId, target: &NodeId, kind: EdgeKind) -> Self {
        EdgeId(format!("{}->{}:{}", source, target, kind.as_str()))
    }
}

/// Discriminates what a file's primary construct is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    File,
    Component,
    Function,
    Type,
    Interface,
    Api,
    Hook,
    Context,
    Class,
    Enum,
    Constant,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Component => "component",
            NodeKind::Function => "function",
            NodeKind::Type => "type",
            NodeKind::Interface => "interface",
            NodeKind::Api => "api",
            NodeKind::Hook => "hook",
            NodeKind::Context => "context",
            NodeKind::Class => "class",
            NodeKind::Enum => "enum",
            NodeKind::Constant => "constant",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a name is brought into a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportKind {
    Default,
    Named,
    Namespace,
    TypeOnly,
    /// `import './x'`; the name is empty.
    SideEffect,
}

/// A single imported name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRef {
    /// The name as exported by the source module (`default` imports use the local binding).
    pub name: String,
    /// The module specifier exactly as written.
    pub source: String,
    pub kind: ImportKind,
    /// 1-based line of the `import` keyword.
    pub line: u32,
}

impl ImportRef {
    pub fn is_type_only(&self) -> bool {
        self.kind == ImportKind::TypeOnly
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportKind {
    Default,
    Named,
    Interface,
    Type,
}

/// A single exported name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRef {
    pub name: String,
    pub kind: ExportKind,
    pub line: u32,
}

/// A declared field of a type, interface, props type or class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub optional: bool,
}

/// HTTP verbs recognised as route handlers in api files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "PATCH" => Some(HttpMethod::Patch),
            "DELETE" => Some(HttpMethod::Delete),
            "HEAD" => Some(HttpMethod::Head),
            "OPTIONS" => Some(HttpMethod::Options),
            _ => None,
        }
    }
}

/// Facts that only make sense for one node kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NodeFacts {
    #[default]
    None,
    Component { props: Vec<FieldDef> },
    Shape { fields: Vec<FieldDef> },
    Api { handlers: Vec<HttpMethod> },
    Class { methods: Vec<String>, fields: Vec<FieldDef> },
    Enum { members: Vec<String> },
    Hook { hooks: Vec<String> },
    Context { contexts: Vec<String> },
}

impl NodeFacts {
    /// Declared fields, for kinds that have them.
    pub fn fields(&self) -> &[FieldDef] {
        match self {
            NodeFacts::Shape { fields } | NodeFacts::Class { fields, .. } => fields,
            NodeFacts::Component { props } => props,
            NodeFacts::None
            | NodeFacts::Api { .. }
            | NodeFacts::Enum { .. }
            | NodeFacts::Hook { .. }
            | NodeFacts::Context { .. } => &[],
        }
    }
}

/// One graph vertex: a source file's primary construct.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodeNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub name: String,
    /// Project-relative path with `/` separators.
    pub path: String,
    pub line_count: u32,
    pub complexity: u32,
    pub imports: Vec<ImportRef>,
    pub exports: Vec<ExportRef>,
    pub facts: NodeFacts,
}

impl CodeNode {
    /// Where a presentation layer should jump to for this node.
    pub fn location(&self) -> SourceLocation {
        let line = self
            .exports
            .iter()
            .find(|e| e.name == self.name)
            .map_or(1, |e| e.line);
        SourceLocation {
            path: self.path.clone(),
            line,
        }
    }
}

/// A file position handed to an "open file at location" capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub path: String,
    pub line: u32,
}

/// What kind of relationship an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    Imports,
    UsesType,
    Calls,
    Renders,
    ProvidesContext,
    ConsumesContext,
    HasField,
    References,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Imports => "imports",
            EdgeKind::UsesType => "uses-type",
            EdgeKind::Calls => "calls",
            EdgeKind::Renders => "renders",
            EdgeKind::ProvidesContext => "provides-context",
            EdgeKind::ConsumesContext => "consumes-context",
            EdgeKind::HasField => "has-field",
            EdgeKind::References => "references",
        }
    }
}

/// A directed edge in the dependency graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
    /// Presentation only: how many names travel along this edge.
    pub weight: f32,
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId, kind: EdgeKind, weight: f32) -> Self {
        Edge {
            id: EdgeId::new(&source, &target, kind),
            source,
            target,
            kind,
            weight,
        }
    }
}

/// Directory grouping shown by a canvas; never consulted by analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroup {
    pub id: String,
    pub label: String,
    pub node_ids: Vec<NodeId>,
}
