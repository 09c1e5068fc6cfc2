use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of a seed issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    InvalidInput,
    UnknownSchema,
    PluginLoad,
    Generation,
    Commit,
    PostSave,
}

/// Structured issue with the raw input key it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct SeedIssue {
    pub kind: IssueKind,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub message: String,
}

impl SeedIssue {
    pub fn new(kind: IssueKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            key: None,
            message: message.into(),
        }
    }

    pub fn invalid_input(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(IssueKind::InvalidInput, code, message)
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// Ordered, append-only list of issues for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorList {
    issues: Vec<SeedIssue>,
}

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when no issue was recorded.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn push(&mut self, issue: SeedIssue) {
        self.issues.push(issue);
    }

    /// Append every issue of another list, keeping order.
    pub fn merge(&mut self, other: ErrorList) {
        self.issues.extend(other.issues);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SeedIssue> {
        self.issues.iter()
    }

    pub fn has_kind(&self, kind: IssueKind) -> bool {
        self.issues.iter().any(|issue| issue.kind == kind)
    }

    /// Human-readable messages in recording order.
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(|issue| issue.message.clone()).collect()
    }
}

impl From<SeedIssue> for ErrorList {
    fn from(issue: SeedIssue) -> Self {
        Self {
            issues: vec![issue],
        }
    }
}

impl FromIterator<SeedIssue> for ErrorList {
    fn from_iter<I: IntoIterator<Item = SeedIssue>>(iter: I) -> Self {
        Self {
            issues: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ErrorList {
    type Item = SeedIssue;
    type IntoIter = std::vec::IntoIter<SeedIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a SeedIssue;
    type IntoIter = std::slice::Iter<'a, SeedIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.iter()
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}
