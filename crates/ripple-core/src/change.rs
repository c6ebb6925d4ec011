//! Change requests, impact reports and patches

use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::model::{NodeId, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeKind {
    Rename,
    AddField,
    RemoveField,
    ChangeType,
    Delete,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Rename => "rename",
            ChangeKind::AddField => "add-field",
            ChangeKind::RemoveField => "remove-field",
            ChangeKind::ChangeType => "change-type",
            ChangeKind::Delete => "delete",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChangeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rename" => Ok(ChangeKind::Rename),
            "add-field" => Ok(ChangeKind::AddField),
            "remove-field" => Ok(ChangeKind::RemoveField),
            "change-type" => Ok(ChangeKind::ChangeType),
            "delete" => Ok(ChangeKind::Delete),
            other => Err(format!("unknown change type '{other}'")),
        }
    }
}

/// A name and/or type on either side of a change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl ValueDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            type_name: None,
        }
    }

    pub fn typed(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            type_name: Some(type_name.into()),
        }
    }
}

/// A proposed change to one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDescriptor {
    pub node_id: NodeId,
    pub change_type: ChangeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<ValueDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<ValueDescriptor>,
}

impl ChangeDescriptor {
    pub fn new(node_id: impl Into<NodeId>, change_type: ChangeKind) -> Self {
        Self {
            node_id: node_id.into(),
            change_type,
            before: None,
            after: None,
        }
    }

    pub fn before(mut self, value: ValueDescriptor) -> Self {
        self.before = Some(value);
        self
    }

    pub fn after(mut self, value: ValueDescriptor) -> Self {
        self.after = Some(value);
        self
    }

    pub fn before_name(&self) -> Option<&str> {
        self.before.as_ref()?.name.as_deref()
    }

    pub fn after_name(&self) -> Option<&str> {
        self.after.as_ref()?.name.as_deref()
    }

    pub fn before_type(&self) -> Option<&str> {
        self.before.as_ref()?.type_name.as_deref()
    }

    pub fn after_type(&self) -> Option<&str> {
        self.after.as_ref()?.type_name.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        })
    }
}

/// A dependent the change reaches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactedNode {
    pub node_id: NodeId,
    pub path: String,
    pub name: String,
    pub kind: NodeKind,
    /// Matched lines (1-based); empty for transitive entries.
    pub lines: Vec<u32>,
    pub breaking: bool,
    pub reason: String,
}

/// One line that will stop compiling or behave differently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakingChange {
    pub node_id: NodeId,
    pub path: String,
    pub line: u32,
    pub code: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactReport {
    pub target_node: NodeId,
    pub change: ChangeDescriptor,
    pub direct_impact: Vec<ImpactedNode>,
    pub transitive_impact: Vec<ImpactedNode>,
    pub breaking_changes: Vec<BreakingChange>,
    pub suggested_fixes: Vec<Patch>,
    pub risk_level: RiskLevel,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ImpactReport {
    /// Fixes that can be applied without a human.
    pub fn auto_fixes(&self) -> Vec<Patch> {
        self.suggested_fixes
            .iter()
            .filter(|p| p.auto_fixable)
            .cloned()
            .collect()
    }

    pub fn requires_confirmation(&self) -> bool {
        self.risk_level == RiskLevel::Critical
    }
}

/// A single-line replacement, deletion or insertion against one file.
///
/// An empty `new_code` deletes the line. An empty `old_code` inserts `new_code`
/// as a new line at `line`; only rollback produces those.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    pub id: String,
    pub path: String,
    pub line: u32,
    pub old_code: String,
    pub new_code: String,
    pub description: String,
    pub auto_fixable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Patch {
    /// Build a patch whose id is derived from its location and content.
    pub fn new(
        path: impl Into<String>,
        line: u32,
        old_code: impl Into<String>,
        new_code: impl Into<String>,
        description: impl Into<String>,
        auto_fixable: bool,
    ) -> Self {
        let path = path.into();
        let old_code = old_code.into();
        let new_code = new_code.into();
        let mut hasher = DefaultHasher::new();
        path.hash(&mut hasher);
        line.hash(&mut hasher);
        old_code.hash(&mut hasher);
        new_code.hash(&mut hasher);
        Patch {
            id: format!("patch-{:016x}", hasher.finish()),
            path,
            line,
            old_code,
            new_code,
            description: description.into(),
            auto_fixable,
            applied: None,
            error: None,
        }
    }

    pub fn is_deletion(&self) -> bool {
        self.new_code.is_empty()
    }

    pub fn is_insertion(&self) -> bool {
        self.old_code.is_empty() && !self.new_code.is_empty()
    }

    /// The patch that undoes this one, keeping the same id.
    pub fn inverse(&self) -> Patch {
        Patch {
            id: self.id.clone(),
            path: self.path.clone(),
            line: self.line,
            old_code: self.new_code.clone(),
            new_code: self.old_code.clone(),
            description: format!("Revert: {}", self.description),
            auto_fixable: true,
            applied: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchApplyResult {
    pub success: bool,
    pub patches_applied: Vec<Patch>,
    pub patches_failed: Vec<Patch>,
    pub errors: Vec<String>,
    pub files_modified: Vec<String>,
}
