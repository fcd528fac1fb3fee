//! Change log accumulated during a transform

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between a container path and the path of a nested entry
pub const NESTED_SEPARATOR: &str = "!/";

/// Nature of a single change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeKind {
    /// A package qualified reference was renamed
    PackageRenamed { from: String, to: String },
    /// A version attribute was attached to a renamed package
    VersionSet { package: String, version: String },
    /// A bundle identity header was updated
    BundleIdentity { field: String, value: String },
    /// A literal was substituted by a direct string rule
    DirectString { from: String, to: String },
    /// The entry itself was written under a new path
    EntryRenamed { from: String, to: String },
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PackageRenamed { from, to } => write!(f, "package [ {from} ] -> [ {to} ]"),
            Self::VersionSet { package, version } => {
                write!(f, "version [ {package} ] = [ {version} ]")
            }
            Self::BundleIdentity { field, value } => write!(f, "{field} = [ {value} ]"),
            Self::DirectString { from, to } => write!(f, "string [ {from} ] -> [ {to} ]"),
            Self::EntryRenamed { from, to } => write!(f, "entry [ {from} ] -> [ {to} ]"),
        }
    }
}

/// One logged change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Path of the changed entry, nested paths joined by `!/`
    pub path: String,
    #[serde(flatten)]
    pub kind: ChangeKind,
}

/// Ordered, append-only log of changes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<String>, kind: ChangeKind) {
        self.changes.push(Change {
            path: path.into(),
            kind,
        });
    }

    /// Record a change of the entry that owns this set. The owner's path is
    /// filled in when the set is nested into its container.
    pub fn record(&mut self, kind: ChangeKind) {
        self.push(String::new(), kind);
    }

    /// Append the changes of a nested entry, re-rooted under `container`
    pub fn extend_nested(&mut self, container: &str, nested: ChangeSet) {
        for change in nested.changes {
            let path = if change.path.is_empty() {
                container.to_string()
            } else if container.is_empty() {
                change.path
            } else {
                format!("{container}{NESTED_SEPARATOR}{}", change.path)
            };
            self.changes.push(Change {
                path,
                kind: change.kind,
            });
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }

    /// Number of distinct entry paths with at least one change
    #[must_use]
    pub fn changed_entries(&self) -> usize {
        let mut paths: Vec<&str> = self.changes.iter().map(|c| c.path.as_str()).collect();
        paths.sort_unstable();
        paths.dedup();
        paths.len()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

impl IntoIterator for ChangeSet {
    type Item = Change;
    type IntoIter = std::vec::IntoIter<Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}
