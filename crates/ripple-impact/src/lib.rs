//! Ripple Impact: blast-radius prediction and fix suggestions for proposed changes

pub mod analyzer;
pub mod error;
pub mod risk;
pub mod rules;


pub use analyzer::ImpactAnalyzer;
pub use error::ImpactError;
pub use risk::assess_risk;
pub use rules::{Findings, Rule, type_conflict};
