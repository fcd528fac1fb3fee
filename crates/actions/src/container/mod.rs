//! Container actions: walk entries, dispatch each, reassemble the output

mod archive;
mod directory;

pub use archive::ArchiveAction;
pub use directory::DirectoryAction;

use crate::action::Applied;
use jtrans_types::{ChangeKind, ChangeSet};

/// Record the outcome of one entry under its output path
fn record_entry(
    changes: &mut ChangeSet,
    entry: &str,
    renamed: Option<&str>,
    applied: Applied,
) -> usize {
    if let Some(renamed) = renamed {
        changes.push(
            renamed,
            ChangeKind::EntryRenamed {
                from: entry.to_string(),
                to: renamed.to_string(),
            },
        );
    }
    changes.extend_nested(renamed.unwrap_or(entry), applied.changes);
    applied.entries
}
