//! The action trait shared by leaf and container actions

use crate::composite::Composite;
use crate::detect;
use jtrans_errors::Error;
use jtrans_rules::{SelectionRule, SignatureRule};
use jtrans_types::{ActionType, ChangeSet};
use std::path::Path;

/// Immutable rule context handed to every action
#[derive(Debug, Clone, Default)]
pub struct Rules {
    pub selection: SelectionRule,
    pub signature: SignatureRule,
}

impl Rules {
    #[must_use]
    pub fn new(selection: SelectionRule, signature: SignatureRule) -> Self {
        Self {
            selection,
            signature,
        }
    }
}

/// Outcome of applying an action to one artifact
#[derive(Debug, Default)]
pub struct Applied {
    /// Rewritten bytes, `None` when the artifact is unchanged
    pub bytes: Option<Vec<u8>>,
    /// Changes relative to the artifact; paths are empty for leaves
    pub changes: ChangeSet,
    /// Artifacts visited, the artifact itself included
    pub entries: usize,
}

impl Applied {
    /// An artifact that was looked at and left alone
    #[must_use]
    pub fn unchanged() -> Self {
        Self {
            bytes: None,
            changes: ChangeSet::new(),
            entries: 1,
        }
    }

    /// A rewritten leaf artifact
    #[must_use]
    pub fn rewritten(bytes: Vec<u8>, changes: ChangeSet) -> Self {
        Self {
            bytes: Some(bytes),
            changes,
            entries: 1,
        }
    }

    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.bytes.is_some()
    }
}

/// A transformation for one artifact format
pub trait Action: Send + Sync {
    fn action_type(&self) -> ActionType;

    /// Whether this action handles an artifact with the given name and
    /// leading bytes
    fn accepts(&self, name: &str, probe: Option<&[u8]>) -> bool {
        detect::accepts(self.action_type(), name, probe)
    }

    /// Path the artifact is written under, when it differs from `name`
    fn renamed_path(&self, _name: &str) -> Option<String> {
        None
    }

    /// Rewrite the artifact `name` held in `input`
    ///
    /// Containers use `composite` to dispatch their entries.
    ///
    /// # Errors
    ///
    /// Returns a transform error when the content cannot be parsed or a
    /// nested archive cannot be read or written.
    fn apply(&self, composite: &Composite, name: &str, input: &[u8]) -> Result<Applied, Error>;

    /// Rewrite the file at `input`, writing the result to `output` unless this
    /// is a dry run
    ///
    /// The whole input path is used as the artifact name. Unchanged content
    /// is copied as is.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the input cannot be read or the output cannot
    /// be written, and any error of [`Action::apply`].
    fn apply_file(
        &self,
        composite: &Composite,
        input: &Path,
        output: Option<&Path>,
    ) -> Result<Applied, Error> {
        let bytes = std::fs::read(input).map_err(|e| Error::io_with_path(&e, input))?;
        let name = input.to_string_lossy().replace('\\', "/");
        let applied = self.apply(composite, &name, &bytes)?;

        if let Some(output) = output {
            let content = applied.bytes.as_deref().unwrap_or(&bytes);
            std::fs::write(output, content).map_err(|e| Error::io_with_path(&e, output))?;
        }
        Ok(applied)
    }
}
