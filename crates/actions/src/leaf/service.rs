//! Service loader descriptor action

use super::decode_text;
use crate::action::{Action, Applied, Rules};
use crate::composite::Composite;
use crate::detect;
use jtrans_errors::Error;
use jtrans_types::{ActionType, ChangeKind, ChangeSet};
use std::sync::Arc;

/// Renames the provider classes listed in a `META-INF/services` file, and the
/// file itself
#[derive(Debug)]
pub struct ServiceConfigAction {
    rules: Arc<Rules>,
}

impl ServiceConfigAction {
    #[must_use]
    pub fn new(rules: Arc<Rules>) -> Self {
        Self { rules }
    }
}

impl Action for ServiceConfigAction {
    fn action_type(&self) -> ActionType {
        ActionType::ServiceConfig
    }

    fn renamed_path(&self, name: &str) -> Option<String> {
        let service = detect::service_name(name)?;
        let matched = self.rules.signature.replace_package(service)?;
        Some(format!(
            "{}{}",
            &name[..name.len() - service.len()],
            matched.replaced
        ))
    }

    fn apply(&self, _composite: &Composite, name: &str, input: &[u8]) -> Result<Applied, Error> {
        let text = decode_text(name, input)?;
        let mut changes = ChangeSet::new();
        let mut out = String::with_capacity(text.len());

        for line in text.split_inclusive('\n') {
            let (code, comment) = match line.find('#') {
                Some(index) => line.split_at(index),
                None => (line, ""),
            };
            let provider = code.trim();
            let matched = (!provider.is_empty())
                .then(|| self.rules.signature.replace_package(provider))
                .flatten();

            match matched {
                Some(matched) => {
                    let start = code.len() - code.trim_start().len();
                    out.push_str(&code[..start]);
                    out.push_str(&matched.replaced);
                    out.push_str(&code[start + provider.len()..]);
                    out.push_str(comment);
                    changes.record(ChangeKind::PackageRenamed {
                        from: matched.from,
                        to: matched.to,
                    });
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
