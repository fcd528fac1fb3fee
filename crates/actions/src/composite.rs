//! Action registry and dispatcher

use crate::action::{Action, Rules};
use crate::container::{ArchiveAction, DirectoryAction};
use crate::detect::{self, PROBE_LEN};
use crate::graph;
use crate::leaf::{ClassAction, JavaAction, ManifestAction, NullAction, ServiceConfigAction};
use jtrans_errors::{ConfigError, DispatchError, Error};
use jtrans_types::{ActionType, ChangeSet, TransformReport};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Owns one action per type and selects among them
///
/// Built once per run from an immutable rule context which every action
/// shares.
pub struct Composite {
    rules: Arc<Rules>,
    actions: BTreeMap<ActionType, Box<dyn Action>>,
}

impl std::fmt::Debug for Composite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composite")
            .field("rules", &self.rules)
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Composite {
    #[must_use]
    pub fn new(rules: Rules) -> Self {
        let rules = Arc::new(rules);
        let actions = ActionType::ALL
            .into_iter()
            .map(|action_type| (action_type, build_action(&rules, action_type)))
            .collect();
        Self { rules, actions }
    }

    #[must_use]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Registered action for a type
    #[must_use]
    pub fn action(&self, action_type: ActionType) -> Option<&dyn Action> {
        self.actions.get(&action_type).map(|action| &**action)
    }

    /// Select the action for an entry of `container`
    ///
    /// A forced type is looked up directly. Otherwise the container's
    /// candidates are tried in order and the first that accepts the entry
    /// wins; the passthrough ends every list, so this only fails for a
    /// non-container or a forced type without an action.
    ///
    /// # Errors
    ///
    /// Returns a config error for an unregistered forced type and a dispatch
    /// error when no candidate accepts the entry.
    pub fn select_action(
        &self,
        container: ActionType,
        name: &str,
        probe: Option<&[u8]>,
        forced: Option<ActionType>,
    ) -> Result<&dyn Action, Error> {
        if let Some(forced) = forced {
            return self.action(forced).ok_or_else(|| {
                ConfigError::UnknownActionType {
                    name: forced.to_string(),
                }
                .into()
            });
        }

        let selected = graph::select_first(graph::candidates(container), |candidate| {
            self.action(candidate)
                .is_some_and(|action| action.accepts(name, probe))
        })
        .and_then(|action_type| self.action(action_type))
        .ok_or_else(|| DispatchError::NoAction {
            path: name.to_string(),
        })?;

        debug!(entry = %name, action = %selected.action_type(), "selected action");
        Ok(selected)
    }

    /// Select the action type for a top-level input
    ///
    /// # Errors
    ///
    /// Returns a dispatch error when the input is missing, when nothing
    /// recognises it, or when a forced type does not fit a file or directory.
    pub fn select_root(&self, input: &Path, forced: Option<ActionType>) -> Result<ActionType, Error> {
        let no_action = || DispatchError::NoAction {
            path: input.display().to_string(),
        };

        if !input.exists() {
            return Err(DispatchError::InputMissing {
                path: input.display().to_string(),
            }
            .into());
        }

        let is_dir = input.is_dir();
        if let Some(forced) = forced {
            self.action(forced)
                .ok_or_else(|| ConfigError::UnknownActionType {
                    name: forced.to_string(),
                })?;
            if is_dir != (forced == ActionType::Directory) {
                return Err(no_action().into());
            }
            return Ok(forced);
        }

        if is_dir {
            return Ok(ActionType::Directory);
        }

        let probe = read_probe(input)?;
        let name = input.to_string_lossy().replace('\\', "/");
        graph::select_first(graph::root_candidates(), |candidate| {
            detect::accepts_root(candidate, &name, Some(probe.as_slice()))
        })
        .ok_or_else(|| no_action().into())
    }

    /// Transform one top-level input
    ///
    /// With `output` set to `None` nothing is written and only the report is
    /// produced.
    ///
    /// # Errors
    ///
    /// Config and dispatch errors are returned before anything is written.
    /// A transform error leaves the output in an undefined state.
    pub fn transform(
        &self,
        input: &Path,
        output: Option<&Path>,
        forced: Option<ActionType>,
    ) -> Result<TransformReport, Error> {
        let start = Instant::now();
        let root = self.select_root(input, forced)?;
        let action = self.action(root).ok_or_else(|| ConfigError::UnknownActionType {
            name: root.to_string(),
        })?;

        info!(
            input = %input.display(),
            action = %root,
            dry_run = output.is_none(),
            "transforming"
        );

        let applied = action.apply_file(self, input, output)?;

        let changes = if root == ActionType::Directory {
            applied.changes
        } else {
            let display = input
                .file_name()
                .map_or_else(|| input.display().to_string(), |n| n.to_string_lossy().into_owned());
            let mut nested = ChangeSet::new();
            nested.extend_nested(&display, applied.changes);
            nested
        };

        let report = TransformReport {
            action: root,
            input: input.to_path_buf(),
            output: output.map(Path::to_path_buf),
            entries_visited: applied.entries,
            changes,
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        info!(
            input = %input.display(),
            entries = report.entries_visited,
            changed = report.entries_changed(),
            duration_ms = report.duration_ms,
            "transform complete"
        );
        Ok(report)
    }
}

fn build_action(rules: &Arc<Rules>, action_type: ActionType) -> Box<dyn Action> {
    let rules = Arc::clone(rules);
    match action_type {
        ActionType::Directory => Box::new(DirectoryAction::new(rules)),
        ActionType::Class => Box::new(ClassAction::new(rules)),
        ActionType::Java => Box::new(JavaAction::new(rules)),
        ActionType::ServiceConfig => Box::new(ServiceConfigAction::new(rules)),
        ActionType::Manifest => Box::new(ManifestAction::manifest(rules)),
        ActionType::Feature => Box::new(ManifestAction::feature(rules)),
        ActionType::Jar | ActionType::War | ActionType::Rar | ActionType::Ear | ActionType::Zip => {
            Box::new(ArchiveAction::new(rules, action_type))
        }
        ActionType::Null => Box::new(NullAction),
    }
}

fn read_probe(path: &Path) -> Result<Vec<u8>, Error> {
    let mut probe = Vec::with_capacity(PROBE_LEN);
    File::open(path)
        .and_then(|file| file.take(PROBE_LEN as u64).read_to_end(&mut probe))
        .map_err(|e| Error::io_with_path(&e, path))?;
    Ok(probe)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composite() -> Composite {
        Composite::new(Rules::default())
    }

    #[test]
    fn test_registry_is_complete() {
        let composite = composite();
        for action_type in ActionType::ALL {
            assert_eq!(
                composite.action(action_type).unwrap().action_type(),
                action_type
            );
        }
    }

    #[test]
    fn test_dispatch_is_total_in_containers() {
        let composite = composite();
        let names = ["", "README", "a/b/Foo.class", "x.bin", "META-INF/MANIFEST.MF"];
        let probes: [Option<&[u8]>; 3] = [None, Some(b"\0\0\0\0".as_slice()), Some(detect::ZIP_MAGIC)];
        for container in ActionType::ALL.into_iter().filter(|t| t.is_container()) {
            for name in names {
                for probe in probes {
                    assert!(composite.select_action(container, name, probe, None).is_ok());
                }
            }
        }
    }

    #[test]
    fn test_first_match_wins() {
        let composite = composite();
        let selected = composite
            .select_action(ActionType::Jar, "a/b/Foo.class", Some(detect::CLASS_MAGIC), None)
            .unwrap();
        assert_eq!(selected.action_type(), ActionType::Class);

        let selected = composite
            .select_action(ActionType::Jar, "a/b/Foo.class", Some(b"junk".as_slice()), None)
            .unwrap();
        assert_eq!(selected.action_type(), ActionType::Null);
    }

    #[test]
    fn test_forced_type() {
        let composite = composite();
        let selected = composite
            .select_action(ActionType::Jar, "notes.txt", None, Some(ActionType::Manifest))
            .unwrap();
        assert_eq!(selected.action_type(), ActionType::Manifest);
    }

    #[test]
    fn test_leaf_has_no_candidates() {
        let err = composite()
            .select_action(ActionType::Class, "a/b/Foo.class", None, None)
            .err()
            .unwrap();
        assert!(matches!(err, Error::Dispatch(DispatchError::NoAction { .. })));
    }
}
