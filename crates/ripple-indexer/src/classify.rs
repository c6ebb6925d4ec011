//! Node kind classification, naming, kind-specific facts and complexity

use once_cell::sync::Lazy;
use regex::Regex;

use ripple_core::{ExportKind, ExportRef, FieldDef, HttpMethod, NodeFacts, NodeKind};

use crate::text::{block_body, next_block, split_members};

const IDENT: &str = r"[A-Za-z_$][\w$]*";

/// Call-shaped class members that are not methods.
const NOT_METHODS: [&str; 8] = ["constructor", "if", "for", "while", "switch", "catch", "return", "super"];

fn compile(pattern: &str) -> Regex {
    Regex::new(&pattern.replace("{IDENT}", IDENT)).expect("classification pattern is valid")
}

static RENDER_RETURN: Lazy<Regex> = Lazy::new(|| compile(r"return\s*\(?\s*<[A-Za-z>]"));
static MARKUP: Lazy<Regex> = Lazy::new(|| compile(r"</[A-Za-z]|/>"));
static CREATE_CONTEXT: Lazy<Regex> = Lazy::new(|| compile(r"\bcreateContext\s*[<(]"));
static CONTEXT_BINDING: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?:const|let|var)\s+({IDENT})\s*(?::[^=]+)?=\s*(?:React\.)?createContext\b")
});
static CLASS_DECL: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?m)^[ \t]*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+({IDENT})")
});
static ENUM_DECL: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?m)^[ \t]*(?:export\s+)?(?:declare\s+)?(?:const\s+)?enum\s+({IDENT})\s*\{")
});
static INTERFACE_DECL: Lazy<Regex> =
    Lazy::new(|| compile(r"(?m)^[ \t]*(?:export\s+)?(?:declare\s+)?interface\s+({IDENT})"));
static TYPE_DECL: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?m)^[ \t]*(?:export\s+)?(?:declare\s+)?type\s+({IDENT})\s*(?:<[^=]*>)?\s*=")
});
static EXPORTED_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"(?m)^[ \t]*export\s+(?:default\s+)?(?:async\s+)?function\b|^[ \t]*export\s+const\s+{IDENT}\s*(?::[^=]+)?=\s*(?:async\s+)?(?:\([^)]*\)|{IDENT})\s*(?::[^=]+)?=>",
    )
});
static EXPORTED_CONST: Lazy<Regex> = Lazy::new(|| compile(r"(?m)^[ \t]*export\s+const\s+"));
static API_HANDLER: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?m)^[ \t]*export\s+(?:async\s+)?(?:function\s+|const\s+)(GET|POST|PUT|PATCH|DELETE|HEAD|OPTIONS)\b")
});
static HOOK_CALL: Lazy<Regex> = Lazy::new(|| compile(r"\b(use[A-Z][\w$]*)\s*(?:<[^>]*>)?\("));
static PROPERTY: Lazy<Regex> =
    Lazy::new(|| compile(r"^(?:readonly\s+)?({IDENT})(\?)?\s*:\s*(?s)(.+)$"));
static CLASS_FIELD: Lazy<Regex> = Lazy::new(|| {
    compile(r"^(?:(?:public|private|protected|readonly|static|declare)\s+)*({IDENT})([?!])?\s*:\s*(?s)(.+?)(?:\s*=[^>].*)?$")
});
static CLASS_METHOD: Lazy<Regex> = Lazy::new(|| {
    compile(r"^(?:(?:public|private|protected|static|async|get|set|override)\s+)*({IDENT})\s*(?:<[^>]*>)?\s*\(")
});
static ENUM_MEMBER: Lazy<Regex> = Lazy::new(|| compile(r#"^(?:({IDENT})|'([^']*)'|"([^"]*)")"#));
static BRANCH: Lazy<Regex> =
    Lazy::new(|| compile(r"\b(?:if|for|while|case|catch)\b|&&|\|\||\?\?|\s\?\s"));

/// Decide the primary construct of a file. First matching rule wins.
pub fn classify(path: &str, content: &str) -> NodeKind {
    let segments: Vec<&str> = path.split('/').collect();
    let (file_name, dirs) = segments.split_last().map_or(("", &[][..]), |(f, d)| (*f, d));

    if dirs.contains(&"api") {
        NodeKind::Api
    } else if is_hook_name(file_stem(file_name)) {
        NodeKind::Hook
    } else if CREATE_CONTEXT.is_match(content) {
        NodeKind::Context
    } else if RENDER_RETURN.is_match(content) && MARKUP.is_match(content) {
        NodeKind::Component
    } else if CLASS_DECL.is_match(content) {
        NodeKind::Class
    } else if ENUM_DECL.is_match(content) {
        NodeKind::Enum
    } else if INTERFACE_DECL.is_match(content) {
        NodeKind::Interface
    } else if TYPE_DECL.is_match(content) || dirs.contains(&"types") {
        NodeKind::Type
    } else if EXPORTED_FUNCTION.is_match(content) {
        NodeKind::Function
    } else if EXPORTED_CONST.is_match(content) {
        NodeKind::Constant
    } else {
        NodeKind::File
    }
}

/// Display name: the default export, else the kind's own declaration, else the first export, else the file stem.
pub fn primary_name(kind: NodeKind, path: &str, content: &str, exports: &[ExportRef]) -> String {
    if let Some(default) = exports
        .iter()
        .find(|e| e.kind == ExportKind::Default && e.name != "default")
    {
        return default.name.clone();
    }

    let declared = match kind {
        NodeKind::Class => first_capture(&CLASS_DECL, content),
        NodeKind::Enum => first_capture(&ENUM_DECL, content),
        NodeKind::Interface => first_capture(&INTERFACE_DECL, content),
        NodeKind::Type => first_capture(&TYPE_DECL, content),
        NodeKind::Context => first_capture(&CONTEXT_BINDING, content),
        NodeKind::Hook => exports.iter().find(|e| is_hook_name(&e.name)).map(|e| e.name.clone()),
        NodeKind::Component => exports
            .iter()
            .find(|e| e.name.starts_with(|c: char| c.is_ascii_uppercase()))
            .map(|e| e.name.clone()),
        NodeKind::File | NodeKind::Function | NodeKind::Constant | NodeKind::Api => None,
    };

    declared
        .or_else(|| exports.iter().find(|e| e.name != "default").map(|e| e.name.clone()))
        .unwrap_or_else(|| {
            let file_name = path.rsplit('/').next().unwrap_or(path);
            file_stem(file_name).to_string()
        })
}

/// Kind-specific facts for a classified file.
pub fn extract_facts(kind: NodeKind, name: &str, content: &str) -> NodeFacts {
    match kind {
        NodeKind::Component => NodeFacts::Component {
            props: props_fields(name, content),
        },
        NodeKind::Interface | NodeKind::Type => NodeFacts::Shape {
            fields: shape_fields(name, content),
        },
        NodeKind::Api => NodeFacts::Api {
            handlers: API_HANDLER
                .captures_iter(content)
                .filter_map(|c| HttpMethod::parse(c.get(1)?.as_str()))
                .collect(),
        },
        NodeKind::Class => {
            let (methods, fields) = class_members(name, content);
            NodeFacts::Class { methods, fields }
        }
        NodeKind::Enum => NodeFacts::Enum {
            members: enum_members(name, content),
        },
        NodeKind::Hook => {
            let mut hooks: Vec<String> = Vec::new();
            for caps in HOOK_CALL.captures_iter(content) {
                let Some(hook) = caps.get(1) else { continue };
                if hook.as_str() != name && !hooks.iter().any(|h| h == hook.as_str()) {
                    hooks.push(hook.as_str().to_string());
                }
            }
            NodeFacts::Hook { hooks }
        }
        NodeKind::Context => NodeFacts::Context {
            contexts: CONTEXT_BINDING
                .captures_iter(content)
                .filter_map(|c| Some(c.get(1)?.as_str().to_string()))
                .collect(),
        },
        NodeKind::File | NodeKind::Function | NodeKind::Constant => NodeFacts::None,
    }
}

/// One plus the number of branch points.
pub fn complexity(content: &str) -> u32 {
    1 + BRANCH.find_iter(content).count() as u32
}

fn is_hook_name(name: &str) -> bool {
    name.strip_prefix("use")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}

fn file_stem(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

fn first_capture(re: &Regex, content: &str) -> Option<String> {
    re.captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Body of the interface or object type alias called `name`, falling back to the first one.
fn shape_body<'a>(name: &str, content: &'a str, only: impl Fn(&str) -> bool) -> Option<&'a str> {
    let mut candidates: Vec<(String, usize)> = Vec::new();
    for re in [&*INTERFACE_DECL, &*TYPE_DECL] {
        for caps in re.captures_iter(content) {
            if let (Some(whole), Some(decl)) = (caps.get(0), caps.get(1)) {
                if only(decl.as_str()) {
                    candidates.push((decl.as_str().to_string(), whole.end()));
                }
            }
        }
    }
    candidates.sort_by_key(|(_, end)| *end);
    let (_, end) = candidates
        .iter()
        .find(|(decl, _)| decl == name)
        .or_else(|| candidates.first())?;
    next_block(content, *end)
}

fn shape_fields(name: &str, content: &str) -> Vec<FieldDef> {
    shape_body(name, content, |_| true).map(parse_properties).unwrap_or_default()
}

fn props_fields(name: &str, content: &str) -> Vec<FieldDef> {
    let wanted = format!("{name}Props");
    shape_body(&wanted, content, |decl| decl.ends_with("Props"))
        .map(parse_properties)
        .unwrap_or_default()
}

fn parse_properties(body: &str) -> Vec<FieldDef> {
    split_members(body)
        .into_iter()
        .filter_map(|member| {
            let caps = PROPERTY.captures(member)?;
            Some(FieldDef {
                name: caps.get(1)?.as_str().to_string(),
                type_name: caps.get(3)?.as_str().trim().to_string(),
                optional: caps.get(2).is_some(),
            })
        })
        .collect()
}

fn class_members(name: &str, content: &str) -> (Vec<String>, Vec<FieldDef>) {
    let decl = CLASS_DECL
        .captures_iter(content)
        .find(|c| c.get(1).is_some_and(|m| m.as_str() == name))
        .or_else(|| CLASS_DECL.captures(content));
    let Some(body) = decl
        .and_then(|c| c.get(0))
        .and_then(|whole| {
            let open = content[whole.end()..].find('{')? + whole.end();
            block_body(content, open)
        })
    else {
        return (Vec::new(), Vec::new());
    };

    let mut methods = Vec::new();
    let mut fields = Vec::new();
    for member in split_members(body) {
        if let Some(caps) = CLASS_METHOD.captures(member) {
            let Some(method) = caps.get(1) else { continue };
            if !NOT_METHODS.contains(&method.as_str()) {
                methods.push(method.as_str().to_string());
            }
        } else if let Some(caps) = CLASS_FIELD.captures(member) {
            let (Some(field), Some(type_name)) = (caps.get(1), caps.get(3)) else {
                continue;
            };
            fields.push(FieldDef {
                name: field.as_str().to_string(),
                type_name: type_name.as_str().trim().to_string(),
                optional: caps.get(2).is_some_and(|m| m.as_str() == "?"),
            });
        }
    }
    (methods, fields)
}

fn enum_members(name: &str, content: &str) -> Vec<String> {
    let decl = ENUM_DECL
        .captures_iter(content)
        .find(|c| c.get(1).is_some_and(|m| m.as_str() == name))
        .or_else(|| ENUM_DECL.captures(content));
    let Some(body) = decl
        .and_then(|c| c.get(0))
        .and_then(|whole| block_body(content, whole.end() - 1))
    else {
        return Vec::new();
    };

    split_members(body)
        .into_iter()
        .filter_map(|member| {
            let caps = ENUM_MEMBER.captures(member)?;
            caps.get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_order() {
        assert_eq!(classify("src/app/api/users/route.ts", "export function GET() {}"), NodeKind::Api);
        assert_eq!(classify("src/hooks/useCart.ts", "export const x = 1;"), NodeKind::Hook);
        assert_eq!(
            classify("src/auth.tsx", "export const AuthContext = createContext(null);"),
            NodeKind::Context
        );
        assert_eq!(
            classify("src/Button.tsx", "export function Button() {\n  return (\n    <button />\n  );\n}"),
            NodeKind::Component
        );
        assert_eq!(classify("src/store.ts", "export class Store {}"), NodeKind::Class);
        assert_eq!(classify("src/color.ts", "export enum Color { Red }"), NodeKind::Enum);
        assert_eq!(classify("src/user.ts", "export interface User { id: string }"), NodeKind::Interface);
        assert_eq!(classify("src/id.ts", "export type Id = string;"), NodeKind::Type);
        assert_eq!(classify("src/types/index.ts", "export {};"), NodeKind::Type);
        assert_eq!(classify("src/sum.ts", "export const sum = (a, b) => a + b;"), NodeKind::Function);
        assert_eq!(classify("src/limits.ts", "export const MAX = 3;"), NodeKind::Constant);
        assert_eq!(classify("src/main.ts", "console.log(1);"), NodeKind::File);
    }

    #[test]
    fn test_primary_name_prefers_default_export() {
        let exports = vec![
            ExportRef {
                name: "helper".to_string(),
                kind: ExportKind::Named,
                line: 1,
            },
            ExportRef {
                name: "Page".to_string(),
                kind: ExportKind::Default,
                line: 3,
            },
        ];
        assert_eq!(primary_name(NodeKind::Component, "src/page.tsx", "", &exports), "Page");
        assert_eq!(primary_name(NodeKind::File, "src/main.ts", "", &[]), "main");
    }

    #[test]
    fn test_shape_fields() {
        let content = "export interface User {\n  id: string;\n  nickname?: string;\n  tags: Array<string>;\n}\n";
        let facts = extract_facts(NodeKind::Interface, "User", content);
        let fields = facts.fields();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[1].name, "nickname");
        assert!(fields[1].optional);
        assert_eq!(fields[2].type_name, "Array<string>");
    }

    #[test]
    fn test_component_props() {
        let content = "interface ButtonProps { label: string; onClick?: () => void }\nexport function Button({ label }: ButtonProps) {\n  return <button>{label}</button>;\n}\n";
        let facts = extract_facts(NodeKind::Component, "Button", content);
        let names: Vec<_> = facts.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["label", "onClick"]);
    }

    #[test]
    fn test_class_members() {
        let content = "export class UserStore {\n  private users: User[] = [];\n  count = 0;\n  constructor() {}\n  add(user: User): void {\n    this.users.push(user);\n  }\n  async load() {}\n}\n";
        let NodeFacts::Class { methods, fields } = extract_facts(NodeKind::Class, "UserStore", content) else {
            panic!("expected class facts");
        };
        assert_eq!(methods, vec!["add", "load"]);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "users");
        assert_eq!(fields[0].type_name, "User[]");
    }

    #[test]
    fn test_enum_members_and_api_handlers() {
        let facts = extract_facts(NodeKind::Enum, "Color", "export enum Color {\n  Red = 'red',\n  Green,\n}\n");
        assert_eq!(
            facts,
            NodeFacts::Enum {
                members: vec!["Red".to_string(), "Green".to_string()]
            }
        );

        let facts = extract_facts(
            NodeKind::Api,
            "route",
            "export async function GET() {}\nexport const POST = async () => {};\n",
        );
        assert_eq!(
            facts,
            NodeFacts::Api {
                handlers: vec![HttpMethod::Get, HttpMethod::Post]
            }
        );
    }

    #[test]
    fn test_hook_facts_skip_self() {
        let content = "export function useCart() {\n  const [items] = useState<string[]>([]);\n  useEffect(() => {}, []);\n  return useCart;\n}\n";
        let facts = extract_facts(NodeKind::Hook, "useCart", content);
        assert_eq!(
            facts,
            NodeFacts::Hook {
                hooks: vec!["useState".to_string(), "useEffect".to_string()]
            }
        );
    }

    #[test]
    fn test_complexity_counts_branches() {
        assert_eq!(complexity("const a = 1;"), 1);
        assert_eq!(complexity("if (a && b) { x ?? y } else { c ? d : e }"), 5);
    }
}
