//! Report type definitions for transform runs

use crate::{ActionType, ChangeSet};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of transforming one top-level input
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransformReport {
    /// Action applied to the input
    pub action: ActionType,
    /// Input path
    pub input: PathBuf,
    /// Output path, `None` for a dry run
    pub output: Option<PathBuf>,
    /// Entries visited, counting nested entries
    pub entries_visited: usize,
    /// Changes made, in traversal order
    pub changes: ChangeSet,
    /// Total execution time
    pub duration_ms: u64,
}

impl TransformReport {
    /// Whether anything was rewritten
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Number of entries with at least one change
    #[must_use]
    pub fn entries_changed(&self) -> usize {
        self.changes.changed_entries()
    }
}
