//! Directory tree container action

use crate::action::{Action, Applied, Rules};
use crate::composite::Composite;
use crate::detect::PROBE_LEN;
use crate::paths;
use jtrans_errors::Error;
use jtrans_types::{ActionType, ChangeSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Rewrites every file below a directory into an output directory
///
/// Files are visited in file name order so the change log is stable.
#[derive(Debug)]
pub struct DirectoryAction {
    rules: Arc<Rules>,
}

impl DirectoryAction {
    #[must_use]
    pub fn new(rules: Arc<Rules>) -> Self {
        Self { rules }
    }

    fn write(output: Option<&Path>, relative: &str, bytes: &[u8]) -> Result<(), Error> {
        let Some(output) = output else {
            return Ok(());
        };
        let target = output.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io_with_path(&e, parent))?;
        }
        fs::write(&target, bytes).map_err(|e| Error::io_with_path(&e, &target))
    }
}

impl Action for DirectoryAction {
    fn action_type(&self) -> ActionType {
        ActionType::Directory
    }

    fn apply(&self, _composite: &Composite, name: &str, _input: &[u8]) -> Result<Applied, Error> {
        Err(Error::internal(format!(
            "directory action cannot rewrite in-memory content [ {name} ]"
        )))
    }

    fn apply_file(
        &self,
        composite: &Composite,
        input: &Path,
        output: Option<&Path>,
    ) -> Result<Applied, Error> {
        if let Some(output) = output {
            fs::create_dir_all(output).map_err(|e| Error::io_with_path(&e, output))?;
        }

        let mut changes = ChangeSet::new();
        let mut entries = 1;

        for entry in WalkDir::new(input).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::from(std::io::Error::from(e)))?;
            let Ok(relative) = entry.path().strip_prefix(input) else {
                continue;
            };
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let included = self.rules.selection.is_included(&relative);

            if entry.file_type().is_dir() {
                // Parents of files are created on write; only empty directories need copying.
                let is_empty = fs::read_dir(entry.path())
                    .map_err(|e| Error::io_with_path(&e, entry.path()))?
                    .next()
                    .is_none();
                if let (Some(output), true) = (output, is_empty) {
                    let renamed = included
                        .then(|| paths::rename_directory(&self.rules.signature, &relative))
                        .flatten();
                    let target = output.join(renamed.as_deref().unwrap_or(&relative));
                    fs::create_dir_all(&target).map_err(|e| Error::io_with_path(&e, &target))?;
                }
                continue;
            }
            if !entry.file_type().is_file() {
                trace!(entry = %relative, "skipping non-regular file");
                continue;
            }

            let bytes = fs::read(entry.path()).map_err(|e| Error::io_with_path(&e, entry.path()))?;
            if !included {
                trace!(entry = %relative, "copied unchanged");
                Self::write(output, &relative, &bytes)?;
                entries += 1;
                continue;
            }

            let probe = &bytes[..bytes.len().min(PROBE_LEN)];
            let action = composite.select_action(ActionType::Directory, &relative, Some(probe), None)?;
            let applied = action.apply(composite, &relative, &bytes)?;
            let renamed = action.renamed_path(&relative);

            Self::write(
                output,
                renamed.as_deref().unwrap_or(&relative),
                applied.bytes.as_deref().unwrap_or(&bytes),
            )?;
            entries += super::record_entry(&mut changes, &relative, renamed.as_deref(), applied);
        }

        debug!(
            directory = %input.display(),
            entries,
            changes = changes.len(),
            "directory transformed"
        );

        Ok(Applied {
            bytes: None,
            changes,
            entries,
        })
    }
}
