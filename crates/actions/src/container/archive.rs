//! Zip based container actions (jar, war, rar, ear and generic zip)

use crate::action::{Action, Applied, Rules};
use crate::composite::Composite;
use crate::detect::PROBE_LEN;
use crate::paths;
use jtrans_errors::{Error, TransformError};
use jtrans_types::{ActionType, ChangeSet};
use std::collections::HashSet;
use std::io::{Cursor, Read, Write};
use std::sync::Arc;
use tracing::{debug, trace};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Rewrites a zip archive entry by entry
///
/// Entries that come out unchanged are copied raw, keeping their compressed
/// bytes and metadata. Rewritten entries keep their compression method when
/// it is stored, and are deflated otherwise.
#[derive(Debug)]
pub struct ArchiveAction {
    rules: Arc<Rules>,
    action_type: ActionType,
}

impl ArchiveAction {
    /// # Panics
    ///
    /// Panics in debug builds if `action_type` is not a zip container type.
    #[must_use]
    pub fn new(rules: Arc<Rules>, action_type: ActionType) -> Self {
        debug_assert!(action_type.is_container() && action_type != ActionType::Directory);
        Self { rules, action_type }
    }
}

struct EntryOutcome {
    renamed: Option<String>,
    applied: Applied,
}

impl Action for ArchiveAction {
    fn action_type(&self) -> ActionType {
        self.action_type
    }

    fn apply(&self, composite: &Composite, name: &str, input: &[u8]) -> Result<Applied, Error> {
        let archive_error = |e: zip::result::ZipError| TransformError::archive(name, e);

        let mut archive = ZipArchive::new(Cursor::new(input)).map_err(archive_error)?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::with_capacity(input.len())));
        writer.set_raw_comment(archive.comment().into());

        debug!(
            archive = %name,
            action = %self.action_type,
            entries = archive.len(),
            "transforming archive"
        );

        let mut changes = ChangeSet::new();
        let mut entries = 1;
        let mut changed = false;
        let mut written: HashSet<String> = HashSet::new();

        for index in 0..archive.len() {
            let (entry_name, is_dir, content) = {
                let mut file = archive.by_index(index).map_err(archive_error)?;
                let entry_name = file.name().to_string();
                let is_dir = file.is_dir();
                let content = if is_dir || !self.rules.selection.is_included(&entry_name) {
                    None
                } else {
                    let mut buffer = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
                    file.read_to_end(&mut buffer)
                        .map_err(|e| TransformError::archive(format!("{name}!/{entry_name}"), e))?;
                    Some(buffer)
                };
                (entry_name, is_dir, content)
            };

            let outcome = match content {
                Some(bytes) => self.apply_entry(composite, &entry_name, bytes)?,
                None if is_dir && self.rules.selection.is_included(&entry_name) => EntryOutcome {
                    renamed: paths::rename_directory(&self.rules.signature, &entry_name),
                    applied: Applied::unchanged(),
                },
                None => {
                    trace!(entry = %entry_name, "copied unchanged");
                    EntryOutcome {
                        renamed: None,
                        applied: Applied::unchanged(),
                    }
                }
            };

            let output_name = outcome.renamed.as_deref().unwrap_or(&entry_name);
            if is_dir && written.contains(output_name) {
                trace!(entry = %entry_name, output = %output_name, "duplicate directory dropped");
                changed = true;
                continue;
            }
            let raw = archive.by_index_raw(index).map_err(archive_error)?;
            match (&outcome.applied.bytes, &outcome.renamed) {
                (None, None) => writer.raw_copy_file(raw).map_err(archive_error)?,
                (None, Some(renamed)) => {
                    trace!(from = %entry_name, to = %renamed, "entry renamed");
                    writer
                        .raw_copy_file_rename(raw, renamed.as_str())
                        .map_err(archive_error)?;
                }
                (Some(bytes), _) => {
                    let mut options = SimpleFileOptions::default()
                        .compression_method(match raw.compression() {
                            CompressionMethod::Stored => CompressionMethod::Stored,
                            _ => CompressionMethod::Deflated,
                        })
                        .large_file(bytes.len() > u32::MAX as usize);
                    if let Some(modified) = raw.last_modified() {
                        options = options.last_modified_time(modified);
                    }
                    if let Some(mode) = raw.unix_mode() {
                        options = options.unix_permissions(mode);
                    }
                    drop(raw);
                    writer
                        .start_file(output_name, options)
                        .map_err(archive_error)?;
                    writer
                        .write_all(bytes)
                        .map_err(|e| TransformError::archive(name, e))?;
                }
            }

            written.insert(output_name.to_string());
            changed |= outcome.applied.is_changed() || outcome.renamed.is_some();
            entries += super::record_entry(
                &mut changes,
                &entry_name,
                outcome.renamed.as_deref(),
                outcome.applied,
            );
        }

        if !changed {
            debug!(archive = %name, "archive unchanged");
            return Ok(Applied {
                bytes: None,
                changes,
                entries,
            });
        }

        let bytes = writer.finish().map_err(archive_error)?.into_inner();
        Ok(Applied {
            bytes: Some(bytes),
            changes,
            entries,
        })
    }
}

impl ArchiveAction {
    fn apply_entry(
        &self,
        composite: &Composite,
        entry_name: &str,
        bytes: Vec<u8>,
    ) -> Result<EntryOutcome, Error> {
        let probe = &bytes[..bytes.len().min(PROBE_LEN)];
        let action = composite.select_action(self.action_type, entry_name, Some(probe), None)?;
        let applied = action.apply(composite, entry_name, &bytes)?;
        Ok(EntryOutcome {
            renamed: action.renamed_path(entry_name),
            applied,
        })
    }
}
