//! Risk classification of an impact report

use ripple_core::{ChangeKind, RiskLevel};

/// Grade a change by how many lines break and how many files it touches directly.
pub fn assess_risk(change: ChangeKind, breaking: usize, direct: usize) -> RiskLevel {
    if breaking > 5 || (change == ChangeKind::Delete && direct > 3) {
        RiskLevel::Critical
    } else if breaking > 2 || direct > 5 {
        RiskLevel::High
    } else if breaking > 0 || direct > 2 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}
