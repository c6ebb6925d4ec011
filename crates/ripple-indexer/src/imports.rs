//! Import and export statement parsing

use once_cell::sync::Lazy;
use regex::Regex;

use ripple_core::{DependencyGraph, ExportKind, ExportRef, ImportKind, ImportRef, ImportResolver, NodeId};

use crate::text::LineIndex;

static IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[ \t]*import\s+(type\s+)?([^'";]*?)\s*from\s*['"]([^'"]+)['"]"#)
        .expect("import pattern is valid")
});

static SIDE_EFFECT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[ \t]*import\s*['"]([^'"]+)['"]"#).expect("side-effect import pattern is valid")
});

static REEXPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[ \t]*export\s+(type\s+)?(\*(?:\s+as\s+[A-Za-z_$][\w$]*)?|\{[^}]*\})\s*from\s*['"]([^'"]+)['"]"#)
        .expect("re-export pattern is valid")
});

static EXPORT_DECL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*export\s+(default\s+)?(?:declare\s+)?(?:abstract\s+)?(?:async\s+)?(function\*?|class|interface|type|const\s+enum|enum|const|let|var)\s+([A-Za-z_$][\w$]*)",
    )
    .expect("export declaration pattern is valid")
});

static EXPORT_DEFAULT_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*export\s+default\s+([A-Za-z_$][\w$]*)\s*;?\s*$")
        .expect("default export pattern is valid")
});

static EXPORT_DEFAULT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*export\s+default\b").expect("default export pattern is valid"));

static EXPORT_LIST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[ \t]*export\s+(type\s+)?\{([^}]*)\}"#)
        .expect("export list pattern is valid")
});

/// One name inside `{ … }` of an import or re-export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedImport {
    /// Name as exported by the source module.
    pub name: String,
    /// Local binding when renamed with `as`.
    pub alias: Option<String>,
    pub type_only: bool,
}

impl NamedImport {
    pub fn local(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A parsed `import … from '…'` or `export … from '…'` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    /// 1-based line of the keyword.
    pub start_line: u32,
    /// 1-based line holding the specifier.
    pub end_line: u32,
    pub specifier: String,
    /// `import type …` / `export type …`
    pub type_only: bool,
    pub default: Option<String>,
    pub namespace: Option<String>,
    pub named: Vec<NamedImport>,
    /// `export { … } from` or `export * from`
    pub reexport: bool,
    /// `import './x'`: runs the module, binds nothing.
    pub side_effect: bool,
}

impl ImportStatement {
    /// Flatten into per-name import references.
    pub fn refs(&self) -> Vec<ImportRef> {
        let mut refs = Vec::new();
        let kind_for = |type_only: bool, fallback: ImportKind| {
            if self.type_only || type_only {
                ImportKind::TypeOnly
            } else {
                fallback
            }
        };

        if let Some(default) = &self.default {
            refs.push(self.make_ref(default, kind_for(false, ImportKind::Default)));
        }
        if let Some(namespace) = &self.namespace {
            refs.push(self.make_ref(namespace, kind_for(false, ImportKind::Namespace)));
        }
        for named in &self.named {
            refs.push(self.make_ref(&named.name, kind_for(named.type_only, ImportKind::Named)));
        }
        if self.side_effect {
            refs.push(self.make_ref("", ImportKind::SideEffect));
        }
        refs
    }

    /// True when every name in the statement is type-only.
    pub fn is_type_only(&self) -> bool {
        self.type_only
            || (self.default.is_none()
                && self.namespace.is_none()
                && !self.named.is_empty()
                && self.named.iter().all(|n| n.type_only))
    }

    /// Whether the statement binds `name` from its source module.
    pub fn imports_name(&self, name: &str) -> bool {
        self.named.iter().any(|n| n.name == name)
    }

    /// Whether the statement depends on the module as a whole (default, namespace or side effect).
    pub fn imports_module(&self) -> bool {
        self.default.is_some() || self.namespace.is_some() || self.side_effect
    }

    fn make_ref(&self, name: &str, kind: ImportKind) -> ImportRef {
        ImportRef {
            name: name.to_string(),
            source: self.specifier.clone(),
            kind,
            line: self.start_line,
        }
    }
}

/// All import, side-effect import and re-export statements in `content`, in source order.
pub fn import_statements(content: &str) -> Vec<ImportStatement> {
    let lines = LineIndex::new(content);
    let mut statements = Vec::new();

    for caps in IMPORT_RE.captures_iter(content) {
        let (Some(whole), Some(clause), Some(specifier)) = (caps.get(0), caps.get(2), caps.get(3)) else {
            continue;
        };
        let mut statement = ImportStatement {
            start_line: lines.line_of(whole.start() + leading_ws(whole.as_str())),
            end_line: lines.line_of(specifier.start()),
            specifier: specifier.as_str().to_string(),
            type_only: caps.get(1).is_some(),
            default: None,
            namespace: None,
            named: Vec::new(),
            reexport: false,
            side_effect: false,
        };
        parse_clause(clause.as_str(), &mut statement);
        statements.push(statement);
    }

    for caps in SIDE_EFFECT_RE.captures_iter(content) {
        let (Some(whole), Some(specifier)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        statements.push(ImportStatement {
            start_line: lines.line_of(whole.start() + leading_ws(whole.as_str())),
            end_line: lines.line_of(specifier.start()),
            specifier: specifier.as_str().to_string(),
            type_only: false,
            default: None,
            namespace: None,
            named: Vec::new(),
            reexport: false,
            side_effect: true,
        });
    }

    for caps in REEXPORT_RE.captures_iter(content) {
        let (Some(whole), Some(clause), Some(specifier)) = (caps.get(0), caps.get(2), caps.get(3)) else {
            continue;
        };
        let mut statement = ImportStatement {
            start_line: lines.line_of(whole.start() + leading_ws(whole.as_str())),
            end_line: lines.line_of(specifier.start()),
            specifier: specifier.as_str().to_string(),
            type_only: caps.get(1).is_some(),
            default: None,
            namespace: None,
            named: Vec::new(),
            reexport: true,
            side_effect: false,
        };
        let clause = clause.as_str();
        if clause.starts_with('*') {
            statement.namespace = Some("*".to_string());
        } else {
            parse_clause(clause, &mut statement);
        }
        statements.push(statement);
    }

    statements.sort_by_key(|s| s.start_line);
    statements
}

/// Import statements in `content` that resolve to `target` when read from `containing_path`.
pub fn statements_targeting(
    graph: &DependencyGraph,
    resolver: &ImportResolver,
    content: &str,
    containing_path: &str,
    target: &NodeId,
) -> Vec<ImportStatement> {
    import_statements(content)
        .into_iter()
        .filter(|s| resolver.resolve(graph, &s.specifier, containing_path).as_ref() == Some(target))
        .collect()
}

/// Per-name import references for a whole file.
pub fn parse_imports(content: &str) -> Vec<ImportRef> {
    import_statements(content).iter().flat_map(ImportStatement::refs).collect()
}

/// All names a file exports, ordered by line.
pub fn parse_exports(content: &str) -> Vec<ExportRef> {
    let lines = LineIndex::new(content);
    let mut exports: Vec<ExportRef> = Vec::new();

    for caps in EXPORT_DECL_RE.captures_iter(content) {
        let (Some(whole), Some(keyword), Some(name)) = (caps.get(0), caps.get(2), caps.get(3)) else {
            continue;
        };
        let is_default = caps.get(1).is_some();
        let kind = match keyword.as_str() {
            _ if is_default => ExportKind::Default,
            "interface" => ExportKind::Interface,
            "type" => ExportKind::Type,
            _ => ExportKind::Named,
        };
        exports.push(ExportRef {
            name: name.as_str().to_string(),
            kind,
            line: lines.line_of(whole.start() + leading_ws(whole.as_str())),
        });
    }

    for caps in EXPORT_DEFAULT_NAME_RE.captures_iter(content) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        exports.push(ExportRef {
            name: name.as_str().to_string(),
            kind: ExportKind::Default,
            line: lines.line_of(whole.start() + leading_ws(whole.as_str())),
        });
    }

    // Anonymous defaults: `export default function () {}`, `export default {…}`
    for m in EXPORT_DEFAULT_RE.find_iter(content) {
        let line = lines.line_of(m.start() + leading_ws(m.as_str()));
        if !exports.iter().any(|e| e.kind == ExportKind::Default && e.line == line) {
            exports.push(ExportRef {
                name: "default".to_string(),
                kind: ExportKind::Default,
                line,
            });
        }
    }

    for caps in EXPORT_LIST_RE.captures_iter(content) {
        let (Some(whole), Some(list)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let line = lines.line_of(whole.start() + leading_ws(whole.as_str()));
        let list_type_only = caps.get(1).is_some();
        for entry in list.as_str().split(',') {
            let Some(named) = parse_named(entry) else {
                continue;
            };
            let kind = if list_type_only || named.type_only {
                ExportKind::Type
            } else {
                ExportKind::Named
            };
            let name = named.alias.unwrap_or(named.name);
            exports.push(ExportRef { name, kind, line });
        }
    }

    exports.sort_by_key(|e| e.line);
    exports
}

fn parse_clause(clause: &str, statement: &mut ImportStatement) {
    let clause = clause.trim();
    let (head, braces) = match clause.find('{') {
        Some(open) => {
            let close = clause[open..].find('}').map_or(clause.len(), |c| open + c);
            (&clause[..open], Some(&clause[open + 1..close]))
        }
        None => (clause, None),
    };

    for part in head.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if let Some(rest) = part.strip_prefix('*') {
            let binding = rest.trim().trim_start_matches("as").trim();
            if !binding.is_empty() {
                statement.namespace = Some(binding.to_string());
            }
        } else {
            statement.default = Some(part.to_string());
        }
    }

    if let Some(braces) = braces {
        statement.named.extend(braces.split(',').filter_map(parse_named));
    }
}

fn parse_named(entry: &str) -> Option<NamedImport> {
    let mut entry = entry.trim();
    let mut type_only = false;
    if let Some(rest) = entry.strip_prefix("type ") {
        type_only = true;
        entry = rest.trim();
    }
    if entry.is_empty() {
        return None;
    }
    let (name, alias) = match entry.split_once(" as ") {
        Some((name, alias)) => (name.trim(), Some(alias.trim().to_string())),
        None => (entry, None),
    };
    Some(NamedImport {
        name: name.to_string(),
        alias,
        type_only,
    })
}

fn leading_ws(s: &str) -> usize {
    s.len() - s.trim_start().len()
}
