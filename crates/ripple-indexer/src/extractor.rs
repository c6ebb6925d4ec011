//! Source extractor trait definition

use ripple_core::{ExportRef, ImportRef, NodeFacts, NodeKind};

/// Everything an extractor learns about one file.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub kind: NodeKind,
    pub name: String,
    pub line_count: u32,
    pub complexity: u32,
    pub imports: Vec<ImportRef>,
    pub exports: Vec<ExportRef>,
    pub facts: NodeFacts,
}

/// Turns file contents into node facts.
///
/// The graph, impact and patch layers only see [`Extraction`], so a real
/// parser can replace the regex implementation behind this trait.
pub trait SourceExtractor: Send + Sync {
    /// Extract from `content`, the UTF-8 text of the file at project-relative `path`.
    fn extract(&self, path: &str, content: &str) -> Extraction;
}
