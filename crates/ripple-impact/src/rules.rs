//! Line rules per change kind, run against one dependent's source

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use ripple_core::{
    BreakingChange, ChangeDescriptor, ChangeKind, CodeNode, DependencyGraph, ImportResolver, NodeId, Patch,
};
use ripple_indexer::{import_statements, statements_targeting};

static NUMERIC_IDIOM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.toFixed\(|\bMath\.\w+\(|\b(?:parseInt|parseFloat|Number|isNaN)\(|[-+*/%]=|\+\+|--|\s[-*/%]\s|\s[<>]=?\s*\d")
        .expect("numeric idiom pattern is valid")
});

static STRING_IDIOM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.(?:toUpperCase|toLowerCase|trim|trimStart|trimEnd|split|substring|substr|startsWith|endsWith|padStart|padEnd|charAt|localeCompare|replace|replaceAll)\(|`")
        .expect("string idiom pattern is valid")
});

/// What one rule found in one dependent.
#[derive(Debug, Default)]
pub struct Findings {
    /// Matched lines, ascending.
    pub lines: Vec<u32>,
    pub breaking: Vec<BreakingChange>,
    pub fixes: Vec<Patch>,
}

impl Findings {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn record(&mut self, line: u32) {
        if !self.lines.contains(&line) {
            self.lines.push(line);
        }
    }

    fn breaking(&mut self, dependent: &CodeNode, line: u32, code: &str, reason: String) {
        self.record(line);
        self.breaking.push(BreakingChange {
            node_id: dependent.id.clone(),
            path: dependent.path.clone(),
            line,
            code: code.trim().to_string(),
            reason,
        });
    }

    /// A fix a human has to finish; the line is handed back unchanged.
    fn suggest(&mut self, dependent: &CodeNode, line: u32, code: &str, description: String) {
        self.record(line);
        self.fixes
            .push(Patch::new(&dependent.path, line, code, code, description, false));
    }
}

/// A change request compiled against its target node.
#[derive(Debug, Clone)]
pub enum Rule {
    Rename {
        old: String,
        new: Option<String>,
        pattern: Regex,
    },
    AddField {
        type_name: String,
        field: String,
        field_type: Option<String>,
        pattern: Regex,
    },
    RemoveField {
        field: String,
        access: Regex,
        destructure: Regex,
    },
    ChangeType {
        field: String,
        before: Option<String>,
        after: Option<String>,
        access: Regex,
    },
    Delete {
        target: NodeId,
        name: String,
        exports: Vec<String>,
    },
}

impl Rule {
    /// Compile `change` against `target`. Missing inputs are pushed onto `warnings`;
    /// `None` means nothing can be scanned.
    pub fn for_change(change: &ChangeDescriptor, target: &CodeNode, warnings: &mut Vec<String>) -> Option<Rule> {
        match change.change_type {
            ChangeKind::Rename => {
                let old = change.before_name().unwrap_or(&target.name).to_string();
                let new = change.after_name().map(str::to_string);
                if new.is_none() {
                    warnings.push(format!("rename of `{old}` has no new name; no fixes generated"));
                }
                let pattern = compile(&word(&old), warnings)?;
                Some(Rule::Rename { old, new, pattern })
            }
            ChangeKind::AddField => {
                let Some(field) = change.after_name() else {
                    warnings.push("add-field needs the new field's name".to_string());
                    return None;
                };
                let name = regex::escape(&target.name);
                let pattern = compile(
                    &format!(r":\s*{name}\s*=\s*\{{|:\s*{name}\[\]\s*=\s*\[|\bsatisfies\s+{name}\b"),
                    warnings,
                )?;
                Some(Rule::AddField {
                    type_name: target.name.clone(),
                    field: field.to_string(),
                    field_type: change.after_type().map(str::to_string),
                    pattern,
                })
            }
            ChangeKind::RemoveField => {
                let Some(field) = change.before_name() else {
                    warnings.push("remove-field needs the removed field's name".to_string());
                    return None;
                };
                let escaped = regex::escape(field);
                let access = compile(&access_pattern(field), warnings)?;
                let destructure = compile(&format!(r"\{{[^{{}}]*\b{escaped}\b[^{{}}]*\}}\s*[=:]"), warnings)?;
                Some(Rule::RemoveField {
                    field: field.to_string(),
                    access,
                    destructure,
                })
            }
            ChangeKind::ChangeType => {
                let Some(field) = change.before_name().or(change.after_name()) else {
                    warnings.push("change-type needs the field's name".to_string());
                    return None;
                };
                let (before, after) = (change.before_type(), change.after_type());
                if before.is_none() || after.is_none() {
                    warnings.push(format!(
                        "change-type of `{field}` is missing a before or after type; accesses are listed without a conflict check"
                    ));
                }
                let access = compile(&access_pattern(field), warnings)?;
                Some(Rule::ChangeType {
                    field: field.to_string(),
                    before: before.map(str::to_string),
                    after: after.map(str::to_string),
                    access,
                })
            }
            ChangeKind::Delete => Some(Rule::Delete {
                target: target.id.clone(),
                name: target.name.clone(),
                exports: target.exports.iter().map(|e| e.name.clone()).collect(),
            }),
        }
    }

    /// Why a dependent with findings is impacted.
    pub fn reason(&self) -> String {
        match self {
            Rule::Rename { old, .. } => format!("References `{old}`"),
            Rule::AddField { type_name, field, .. } => {
                format!("Builds `{type_name}` values that may need `{field}`")
            }
            Rule::RemoveField { field, .. } => format!("Uses field `{field}`"),
            Rule::ChangeType { field, .. } => format!("Uses field `{field}`, whose type changes"),
            Rule::Delete { name, .. } => format!("Imports from `{name}`"),
        }
    }

    /// Run the rule over `content`, the source of `dependent`.
    pub fn scan(
        &self,
        dependent: &CodeNode,
        content: &str,
        graph: &DependencyGraph,
        resolver: &ImportResolver,
    ) -> Findings {
        let mut findings = Findings::default();
        match self {
            Rule::Rename { old, new, pattern } => {
                for (number, line) in numbered(content) {
                    if !pattern.is_match(line) {
                        continue;
                    }
                    findings.breaking(dependent, number, line, format!("`{old}` no longer exists"));
                    if let Some(new) = new {
                        findings.fixes.push(Patch::new(
                            &dependent.path,
                            number,
                            line,
                            replace_word(line, old, new),
                            format!("Rename `{old}` to `{new}`"),
                            true,
                        ));
                    }
                }
            }
            Rule::AddField {
                type_name,
                field,
                field_type,
                pattern,
            } => {
                let declared = match field_type {
                    Some(t) => format!("{field}: {t}"),
                    None => field.clone(),
                };
                for (number, line) in numbered(content) {
                    if pattern.is_match(line) {
                        findings.suggest(
                            dependent,
                            number,
                            line,
                            format!("Add `{declared}` to this `{type_name}` value"),
                        );
                    }
                }
            }
            Rule::RemoveField {
                field,
                access,
                destructure,
            } => {
                let skip = import_lines(content);
                for (number, line) in numbered(content) {
                    if skip.contains(&number) {
                        continue;
                    }
                    if destructure.is_match(line) {
                        findings.breaking(dependent, number, line, format!("Destructures removed field `{field}`"));
                        findings.suggest(
                            dependent,
                            number,
                            line,
                            format!("Remove `{field}` from this destructuring"),
                        );
                    } else if let Some(stripped) = strip_accesses(access, line) {
                        findings.breaking(dependent, number, line, format!("Reads removed field `{field}`"));
                        findings.fixes.push(Patch::new(
                            &dependent.path,
                            number,
                            line,
                            stripped,
                            format!("Remove access to `.{field}`"),
                            true,
                        ));
                    }
                }
            }
            Rule::ChangeType {
                field,
                before,
                after,
                access,
            } => {
                let skip = import_lines(content);
                for (number, line) in numbered(content) {
                    if skip.contains(&number) || accesses(access, line).is_empty() {
                        continue;
                    }
                    let (from, to) = (before.as_deref().unwrap_or("?"), after.as_deref().unwrap_or("?"));
                    if let (Some(before), Some(after)) = (before, after) {
                        if type_conflict(line, before, after) {
                            findings.breaking(
                                dependent,
                                number,
                                line,
                                format!("`{field}` changes from `{before}` to `{after}`"),
                            );
                        }
                    }
                    findings.suggest(
                        dependent,
                        number,
                        line,
                        format!("Check this use of `{field}` against its new type (`{from}` → `{to}`)"),
                    );
                }
            }
            Rule::Delete { target, name, exports } => {
                let lines: Vec<&str> = content.lines().collect();
                let statements = statements_targeting(graph, resolver, content, &dependent.path, target);
                for statement in statements
                    .iter()
                    .filter(|s| s.imports_module() || exports.iter().any(|e| s.imports_name(e)))
                {
                    let first = line_at(&lines, statement.start_line);
                    findings.breaking(
                        dependent,
                        statement.start_line,
                        first,
                        format!("Imports from deleted `{name}`"),
                    );
                    for number in statement.start_line..=statement.end_line {
                        findings.record(number);
                        findings.fixes.push(Patch::new(
                            &dependent.path,
                            number,
                            line_at(&lines, number),
                            "",
                            format!("Remove import of deleted `{name}`"),
                            true,
                        ));
                    }
                }
            }
        }
        findings.lines.sort_unstable();
        findings
    }
}

/// Whether changing a field's type from `before` to `after` breaks the use on `line`.
///
/// Conservative: only unions and number/string swaps with a telltale idiom count.
pub fn type_conflict(line: &str, before: &str, after: &str) -> bool {
    if before.contains('|') || after.contains('|') {
        return true;
    }
    match (before.trim(), after.trim()) {
        ("number", "string") | ("string", "number") => NUMERIC_IDIOM.is_match(line) || STRING_IDIOM.is_match(line),
        _ => false,
    }
}

/// `line` with every access to the field removed, or `None` if there is none.
pub fn strip_accesses(access: &Regex, line: &str) -> Option<String> {
    let found = accesses(access, line);
    if found.is_empty() {
        return None;
    }
    let mut stripped = String::with_capacity(line.len());
    let mut last = 0;
    for (start, end) in found {
        stripped.push_str(&line[last..start]);
        last = end;
    }
    stripped.push_str(&line[last..]);
    Some(stripped)
}

/// Byte ranges of `.field` / `?.field` accesses, skipping spreads like `...field`.
fn accesses(access: &Regex, line: &str) -> Vec<(usize, usize)> {
    access
        .find_iter(line)
        .filter(|m| m.start() == 0 || line.as_bytes()[m.start() - 1] != b'.')
        .map(|m| (m.start(), m.end()))
        .collect()
}

fn access_pattern(field: &str) -> String {
    format!(r"\??\.{}\b", regex::escape(field))
}

/// Whole-identifier match. `\b` would treat `$` as a boundary, so the guards are explicit.
fn word(name: &str) -> String {
    format!(r"(?:^|[^\w$]){}(?:[^\w$]|$)", regex::escape(name))
}

fn is_ident(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Replace every whole-identifier occurrence of `old` in `line`.
fn replace_word(line: &str, old: &str, new: &str) -> String {
    if old.is_empty() {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for (start, _) in line.match_indices(old) {
        let end = start + old.len();
        let before = line[..start].chars().next_back();
        let after = line[end..].chars().next();
        if before.is_some_and(is_ident) || after.is_some_and(is_ident) {
            continue;
        }
        out.push_str(&line[last..start]);
        out.push_str(new);
        last = end;
    }
    out.push_str(&line[last..]);
    out
}

fn compile(pattern: &str, warnings: &mut Vec<String>) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warnings.push(format!("could not build a matcher: {e}"));
            None
        }
    }
}

fn numbered(content: &str) -> impl Iterator<Item = (u32, &str)> {
    content.lines().enumerate().map(|(i, line)| (i as u32 + 1, line))
}

fn line_at<'a>(lines: &[&'a str], number: u32) -> &'a str {
    lines.get(number as usize - 1).copied().unwrap_or_default()
}

/// Lines covered by import or re-export statements.
fn import_lines(content: &str) -> HashSet<u32> {
    import_statements(content)
        .iter()
        .flat_map(|s| s.start_line..=s.end_line)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_core::{NodeFacts, NodeKind, ValueDescriptor};

    fn dependent(path: &str) -> CodeNode {
        CodeNode {
            id: path.into(),
            kind: NodeKind::File,
            name: "dep".to_string(),
            path: path.to_string(),
            line_count: 0,
            complexity: 1,
            imports: Vec::new(),
            exports: Vec::new(),
            facts: NodeFacts::None,
        }
    }

    fn target(name: &str) -> CodeNode {
        CodeNode {
            kind: NodeKind::Interface,
            name: name.to_string(),
            ..dependent("src/types/user.ts")
        }
    }

    fn run(change: ChangeDescriptor, content: &str) -> (Findings, Vec<String>) {
        let mut warnings = Vec::new();
        let rule = Rule::for_change(&change, &target("User"), &mut warnings).unwrap();
        let findings = rule.scan(
            &dependent("src/app.ts"),
            content,
            &DependencyGraph::new(),
            &ImportResolver::default(),
        );
        (findings, warnings)
    }

    #[test]
    fn test_rename_is_whole_word() {
        let change = ChangeDescriptor::new("src/n.ts", ChangeKind::Rename)
            .before(ValueDescriptor::named("Foo"))
            .after(ValueDescriptor::named("Bar"));
        let content = "import { Foo } from './n';\nconst a: FooBar = new MyFoo();\n  const b = Foo.create(Foo);\n";
        let (findings, warnings) = run(change, content);

        assert!(warnings.is_empty());
        assert_eq!(findings.lines, vec![1, 3]);
        assert_eq!(findings.fixes[0].new_code, "import { Bar } from './n';");
        assert_eq!(findings.fixes[1].new_code, "  const b = Bar.create(Bar);");
        assert!(findings.fixes.iter().all(|p| p.auto_fixable));
    }

    #[test]
    fn test_rename_replacement_is_literal() {
        let change = ChangeDescriptor::new("src/n.ts", ChangeKind::Rename)
            .before(ValueDescriptor::named("price"))
            .after(ValueDescriptor::named("$price"));
        let (findings, _) = run(change, "total += item.price;\n");
        assert_eq!(findings.fixes[0].new_code, "total += item.$price;");
    }

    #[test]
    fn test_rename_dollar_identifier() {
        let change = ChangeDescriptor::new("src/n.ts", ChangeKind::Rename)
            .before(ValueDescriptor::named("$store"))
            .after(ValueDescriptor::named("$state"));
        let content = "import { $store } from './n';
const a = $storeKey;
use($store,$store);
";
        let (findings, _) = run(change, content);

        assert_eq!(findings.lines, vec![1, 3]);
        assert_eq!(findings.fixes[0].new_code, "import { $state } from './n';");
        assert_eq!(findings.fixes[1].new_code, "use($state,$state);");
    }

    #[test]
    fn test_rename_without_new_name_warns() {
        let change = ChangeDescriptor::new("src/n.ts", ChangeKind::Rename);
        let (findings, warnings) = run(change, "const u: User = load();\n");
        assert_eq!(warnings.len(), 1);
        assert_eq!(findings.breaking.len(), 1);
        assert!(findings.fixes.is_empty());
    }

    #[test]
    fn test_remove_field_strips_accesses_only() {
        let change = ChangeDescriptor::new("src/types/user.ts", ChangeKind::RemoveField)
            .before(ValueDescriptor::named("name"));
        let content = "import { name } from './config';\nconsole.log(user.name, other?.name);\nconst copy = { ...name };\nconst { id, name } = user;\nconst named = user.nameplate;\n";
        let (findings, _) = run(change, content);

        assert_eq!(findings.lines, vec![2, 4]);
        assert_eq!(findings.breaking.len(), 2);
        let auto: Vec<_> = findings.fixes.iter().filter(|p| p.auto_fixable).collect();
        assert_eq!(auto.len(), 1);
        assert_eq!(auto[0].new_code, "console.log(user, other);");
    }

    #[test]
    fn test_add_field_suggests_on_literals() {
        let change = ChangeDescriptor::new("src/types/user.ts", ChangeKind::AddField)
            .after(ValueDescriptor::typed("email", "string"));
        let content = "const a: User = {\nconst list: User[] = [\nconst b = { id: 1 } satisfies User;\nfunction f(u: User) {}\n";
        let (findings, _) = run(change, content);

        assert_eq!(findings.lines, vec![1, 2, 3]);
        assert!(findings.breaking.is_empty());
        assert!(findings.fixes.iter().all(|p| !p.auto_fixable));
        assert_eq!(findings.fixes[0].description, "Add `email: string` to this `User` value");
    }

    #[test]
    fn test_change_type_conflicts() {
        assert!(type_conflict("const n = user.age + 1;", "number", "number | null"));
        assert!(type_conflict("const n = user.age * 2;", "number", "string"));
        assert!(type_conflict("user.id.toUpperCase()", "string", "number"));
        assert!(!type_conflict("render(user.age)", "number", "string"));
        assert!(!type_conflict("const n = user.age * 2;", "number", "bigint"));
    }

    #[test]
    fn test_change_type_suggests_every_access() {
        let change = ChangeDescriptor::new("src/types/user.ts", ChangeKind::ChangeType)
            .before(ValueDescriptor::typed("age", "number"))
            .after(ValueDescriptor::typed("age", "string"));
        let content = "const next = user.age * 2;\nshow(user.age);\n";
        let (findings, _) = run(change, content);

        assert_eq!(findings.lines, vec![1, 2]);
        assert_eq!(findings.breaking.len(), 1);
        assert_eq!(findings.breaking[0].line, 1);
        assert_eq!(findings.fixes.len(), 2);
        assert!(findings.fixes.iter().all(|p| !p.auto_fixable));
    }

    #[test]
    fn test_missing_field_name_yields_no_rule() {
        let mut warnings = Vec::new();
        let change = ChangeDescriptor::new("src/types/user.ts", ChangeKind::RemoveField);
        assert!(Rule::for_change(&change, &target("User"), &mut warnings).is_none());
        assert_eq!(warnings.len(), 1);
    }
}
