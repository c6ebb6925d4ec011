//! Extractors per source language

pub mod typescript;

use std::path::Path;

use crate::extractor::SourceExtractor;

pub use typescript::TypeScriptExtractor;

/// Get the extractor for a file based on its extension.
pub fn get_extractor(path: &Path) -> Option<Box<dyn SourceExtractor>> {
    let ext = path.extension()?.to_str()?;

    match ext {
        // JavaScript is handled by the same patterns
        "ts" | "tsx" | "js" | "jsx" | "mts" | "cts" | "mjs" | "cjs" => Some(Box::new(TypeScriptExtractor)),
        _ => None,
    }
}
