//! TypeScript / JavaScript extractor built on line-oriented patterns

use crate::classify::{classify, complexity, extract_facts, primary_name};
use crate::extractor::{Extraction, SourceExtractor};
use crate::imports::{parse_exports, parse_imports};

#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptExtractor;

impl SourceExtractor for TypeScriptExtractor {
    fn extract(&self, path: &str, content: &str) -> Extraction {
        let imports = parse_imports(content);
        let exports = parse_exports(content);
        let kind = classify(path, content);
        let name = primary_name(kind, path, content, &exports);
        let facts = extract_facts(kind, &name, content);

        Extraction {
            kind,
            name,
            line_count: content.lines().count() as u32,
            complexity: complexity(content),
            imports,
            exports,
            facts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_core::{ImportKind, NodeFacts, NodeKind};

    #[test]
    fn test_extracts_component_file() {
        let content = r#"import { useState } from 'react';
import type { User } from '../types/user';

interface UserCardProps {
  user: User;
  compact?: boolean;
}

export default function UserCard({ user, compact }: UserCardProps) {
  const [open, setOpen] = useState(false);
  if (compact && !open) {
    return <span>{user.name}</span>;
  }
  return (
    <div onClick={() => setOpen(!open)}>{user.name}</div>
  );
}
"#;
        let extraction = TypeScriptExtractor.extract("src/components/UserCard.tsx", content);

        assert_eq!(extraction.kind, NodeKind::Component);
        assert_eq!(extraction.name, "UserCard");
        assert_eq!(extraction.line_count, 17);
        assert_eq!(extraction.complexity, 3);
        assert_eq!(extraction.imports.len(), 2);
        assert_eq!(extraction.imports[1].kind, ImportKind::TypeOnly);
        let NodeFacts::Component { props } = &extraction.facts else {
            panic!("expected component facts");
        };
        assert_eq!(props.len(), 2);
        assert!(props[1].optional);
    }

    #[test]
    fn test_empty_file_is_plain_file() {
        let extraction = TypeScriptExtractor.extract("src/empty.ts", "");
        assert_eq!(extraction.kind, NodeKind::File);
        assert_eq!(extraction.name, "empty");
        assert_eq!(extraction.line_count, 0);
        assert_eq!(extraction.complexity, 1);
        assert_eq!(extraction.facts, NodeFacts::None);
    }
}
