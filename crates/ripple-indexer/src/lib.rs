//! Source scanning, fact extraction and graph construction

pub mod classify;
pub mod coordinator;
pub mod error;
pub mod extractor;
pub mod imports;
pub mod languages;
pub mod scanner;
pub mod text;

#[cfg(test)]
pub mod tests;

pub use coordinator::{Coordinator, ProjectAnalysis, build_graph};
pub use error::{IndexError, ScanError};
pub use extractor::{Extraction, SourceExtractor};
pub use imports::{ImportStatement, NamedImport, import_statements, parse_exports, parse_imports, statements_targeting};
pub use scanner::{ScanOutcome, SourceScanner};
