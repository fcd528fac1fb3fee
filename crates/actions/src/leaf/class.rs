//! Compiled class file action

use super::classfile::{ConstantPool, Utf8Role};
use crate::action::{Action, Applied, Rules};
use crate::composite::Composite;
use crate::paths;
use jtrans_errors::{Error, TransformError};
use jtrans_rules::{SignatureRule, TextRewrite};
use jtrans_types::{ActionType, ChangeKind, ChangeSet};
use std::sync::Arc;
use tracing::trace;

/// Rewrites the constant pool of a class file
#[derive(Debug)]
pub struct ClassAction {
    rules: Arc<Rules>,
}

impl ClassAction {
    #[must_use]
    pub fn new(rules: Arc<Rules>) -> Self {
        Self { rules }
    }
}

impl Action for ClassAction {
    fn action_type(&self) -> ActionType {
        ActionType::Class
    }

    fn renamed_path(&self, name: &str) -> Option<String> {
        paths::rename_file_path(&self.rules.signature, name)
    }

    fn apply(&self, _composite: &Composite, name: &str, input: &[u8]) -> Result<Applied, Error> {
        let pool = ConstantPool::parse(input)
            .map_err(|e| TransformError::malformed(name, "class", e.to_string()))?;

        let signature = &self.rules.signature;
        let mut changes = ChangeSet::new();
        let rewritten = pool
            .rewrite(|role, text| {
                let rewrite = rewrite_constant(signature, role, text)?;
                trace!(entry = %name, from = %text, to = %rewrite.text, "constant rewritten");
                for change in rewrite.changes {
                    changes.record(change);
                }
                Some(rewrite.text)
            })
            .map_err(|e| TransformError::Encoding {
                path: name.to_string(),
                message: e.to_string(),
            })?;

        Ok(match rewritten {
            Some(bytes) => Applied::rewritten(bytes, changes),
            None => Applied::unchanged(),
        })
    }
}

fn rewrite_constant(signature: &SignatureRule, role: Utf8Role, text: &str) -> Option<TextRewrite> {
    match role {
        Utf8Role::ClassName if text.starts_with('[') => rewrite_descriptor(signature, text),
        Utf8Role::ClassName | Utf8Role::PackageName => {
            let matched = signature.replace_package_with(text, '/')?;
            Some(TextRewrite {
                text: matched.replaced,
                changes: vec![ChangeKind::PackageRenamed {
                    from: matched.from,
                    to: matched.to,
                }],
            })
        }
        Utf8Role::StringLiteral => signature.replace_text(text),
        Utf8Role::Other => rewrite_descriptor(signature, text),
    }
}

/// Rename the `Lpkg/Name;` class references of a descriptor or generic
/// signature
///
/// Type variables (`TName;`) and formal parameters (`Name:`) are skipped.
fn rewrite_descriptor(signature: &SignatureRule, text: &str) -> Option<TextRewrite> {
    if !text.contains(';') {
        return None;
    }

    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut changes = Vec::new();
    let mut last = 0;
    let mut i = 0;

    while i < bytes.len() {
        let marker = bytes[i];
        if marker != b'L' && marker != b'T' {
            i += 1;
            continue;
        }

        let start = i + 1;
        let Some(len) = text[start..].find([';', '<', '.', ':']) else {
            break;
        };
        let end = start + len;

        if marker == b'L' && bytes[end] != b':' {
            if let Some(matched) = signature.replace_package_with(&text[start..end], '/') {
                out.push_str(&text[last..start]);
                out.push_str(&matched.replaced);
                last = end;
                changes.push(ChangeKind::PackageRenamed {
                    from: matched.from,
                    to: matched.to,
                });
            }
        }
        i = end + 1;
    }

    if changes.is_empty() {
        return None;
    }
    out.push_str(&text[last..]);
    Some(TextRewrite { text: out, changes })
}
