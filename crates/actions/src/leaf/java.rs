//! Java source action

use super::decode_text;
use crate::action::{Action, Applied, Rules};
use crate::composite::Composite;
use crate::paths;
use jtrans_errors::Error;
use jtrans_types::{ActionType, ChangeSet};
use std::sync::Arc;

/// Rewrites package references in source text, line by line
#[derive(Debug)]
pub struct JavaAction {
    rules: Arc<Rules>,
}

impl JavaAction {
    #[must_use]
    pub fn new(rules: Arc<Rules>) -> Self {
        Self { rules }
    }
}

impl Action for JavaAction {
    fn action_type(&self) -> ActionType {
        ActionType::Java
    }

    fn renamed_path(&self, name: &str) -> Option<String> {
        paths::rename_file_path(&self.rules.signature, name)
    }

    fn apply(&self, _composite: &Composite, name: &str, input: &[u8]) -> Result<Applied, Error> {
        let text = decode_text(name, input)?;
        let mut changes = ChangeSet::new();
        let mut out = String::with_capacity(text.len());

        for line in text.split_inclusive('\n') {
            match self.rules.signature.replace_text(line) {
                Some(rewrite) => {
                    out.push_str(&rewrite.text);
                    for change in rewrite.changes {
                        changes.record(change);
                    }
                }
                None => out.push_str(line),
            }
        }

        if changes.is_empty() {
            Ok(Applied::unchanged())
        } else {
            Ok(Applied::rewritten(out.into_bytes(), changes))
        }
    }
}
