//! Validation issues.
//!
//! Validation never fails the process. Each problem found in a value tree is
//! an [`Issue`] attached to the exact [`FieldPath`] of the offending field;
//! a set of them is [`ValidationErrors`], which blocks submission and feeds
//! the per-field error display.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::path::FieldPath;

/// What kind of check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// No value where one is needed.
    Required,
    /// The value has the wrong type.
    InvalidType,
    /// Too short, too few, or below a minimum.
    TooSmall,
    /// Too long, too many, or above a maximum.
    TooBig,
    /// The text does not match the expected format.
    InvalidFormat,
    /// The value is not one of the allowed options.
    InvalidOption,
    /// A user-supplied check failed.
    Custom,
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Where the failure is attached, relative to whatever was validated.
    pub path: FieldPath,
    /// What kind of check failed.
    pub code: IssueCode,
    /// Human-readable message.
    pub message: String,
}

impl Issue {
    /// Creates an issue at the root of the validated value.
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path: FieldPath::root(),
            code,
            message: message.into(),
        }
    }

    /// Re-anchors this issue under `prefix`.
    pub fn under(mut self, prefix: &FieldPath) -> Self {
        self.path = prefix.join(&self.path);
        self
    }
}

/// The issues found in one validation pass, in discovery order.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{} invalid field value(s)", .issues.len())]
pub struct ValidationErrors {
    issues: Vec<Issue>,
}

impl ValidationErrors {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an issue.
    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Adds several issues, each re-anchored under `prefix`.
    pub fn extend_under(&mut self, prefix: &FieldPath, issues: impl IntoIterator<Item = Issue>) {
        self.issues
            .extend(issues.into_iter().map(|issue| issue.under(prefix)));
    }

    /// Returns true if there are no issues.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns the number of issues.
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Iterates over all issues.
    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter()
    }

    /// Returns the messages attached exactly at `path`.
    pub fn messages(&self, path: &FieldPath) -> Vec<&str> {
        self.issues
            .iter()
            .filter(|issue| &issue.path == path)
            .map(|issue| issue.message.as_str())
            .collect()
    }

    /// Returns the first message attached exactly at `path`.
    pub fn first(&self, path: &FieldPath) -> Option<&str> {
        self.issues
            .iter()
            .find(|issue| &issue.path == path)
            .map(|issue| issue.message.as_str())
    }

    /// Returns true if any issue is attached at `path` or below it.
    pub fn touches(&self, path: &FieldPath) -> bool {
        self.issues.iter().any(|issue| issue.path.starts_with(path))
    }

    /// Drops issues attached at `path` or below it.
    pub fn clear_under(&mut self, path: &FieldPath) {
        self.issues.retain(|issue| !issue.path.starts_with(path));
    }

    /// Rewrites issue paths, dropping those for which `f` returns `None`.
    pub(crate) fn remap(&mut self, mut f: impl FnMut(&FieldPath) -> Option<FieldPath>) {
        self.issues = std::mem::take(&mut self.issues)
            .into_iter()
            .filter_map(|mut issue| {
                issue.path = f(&issue.path)?;
                Some(issue)
            })
            .collect();
    }

    /// Returns the distinct paths carrying issues, in order.
    pub fn paths(&self) -> Vec<&FieldPath> {
        let mut paths: Vec<&FieldPath> = Vec::new();
        for issue in &self.issues {
            if !paths.contains(&&issue.path) {
                paths.push(&issue.path);
            }
        }
        paths
    }

    /// Groups messages by dotted path.
    pub fn by_path(&self) -> BTreeMap<String, Vec<String>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for issue in &self.issues {
            grouped
                .entry(issue.path.to_string())
                .or_default()
                .push(issue.message.clone());
        }
        grouped
    }
}

impl From<Vec<Issue>> for ValidationErrors {
    fn from(issues: Vec<Issue>) -> Self {
        Self { issues }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.by_path().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(text: &str) -> FieldPath {
        FieldPath::parse(text).unwrap()
    }

    #[test]
    fn test_issue_under_prefix() {
        let issue = Issue::new(IssueCode::TooSmall, "too short").under(&path("address.line1"));
        assert_eq!(issue.path, path("address.line1"));

        let mut nested = Issue::new(IssueCode::InvalidType, "expected string");
        nested.path = FieldPath::root().index(2);
        let nested = nested.under(&path("tags"));
        assert_eq!(nested.path.to_string(), "tags.2");
    }

    #[test]
    fn test_lookup_by_path() {
        let mut errors = ValidationErrors::new();
        errors.push(Issue::new(IssueCode::Required, "Required").under(&path("name")));
        errors.push(Issue::new(IssueCode::TooSmall, "too short").under(&path("name")));
        errors.push(Issue::new(IssueCode::Required, "Required").under(&path("address.state")));

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.first(&path("name")), Some("Required"));
        assert_eq!(errors.messages(&path("name")), vec!["Required", "too short"]);
        assert!(errors.touches(&path("address")));
        assert!(!errors.touches(&path("email")));
        assert_eq!(errors.paths().len(), 2);
    }

    #[test]
    fn test_clear_under() {
        let mut errors = ValidationErrors::new();
        errors.push(Issue::new(IssueCode::Required, "a").under(&path("address.state")));
        errors.push(Issue::new(IssueCode::Required, "b").under(&path("name")));
        errors.clear_under(&path("address"));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first(&path("name")), Some("b"));
    }

    #[test]
    fn test_serialize_groups_by_path() {
        let mut errors = ValidationErrors::new();
        errors.push(Issue::new(IssueCode::Required, "Required").under(&path("skills.0.skillName")));
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({"skills.0.skillName": ["Required"]}));
    }

    #[test]
    fn test_display() {
        let errors = ValidationErrors::from(vec![Issue::new(IssueCode::Custom, "x")]);
        assert_eq!(errors.to_string(), "1 invalid field value(s)");
    }
}
