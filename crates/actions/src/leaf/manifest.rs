//! Manifest and feature manifest actions

use super::decode_text;
use super::headers::{Header, HeaderFile};
use crate::action::{Action, Applied, Rules};
use crate::composite::Composite;
use jtrans_errors::Error;
use jtrans_rules::SignatureRule;
use jtrans_types::{ActionType, BundleUpdate, ChangeKind, ChangeSet};
use std::sync::Arc;
use tracing::debug;

const PACKAGE_HEADERS: [&str; 3] = ["Export-Package", "Import-Package", "DynamicImport-Package"];

const SYMBOLIC_NAME: &str = "Bundle-SymbolicName";
const BUNDLE_VERSION: &str = "Bundle-Version";
const BUNDLE_NAME: &str = "Bundle-Name";
const BUNDLE_DESCRIPTION: &str = "Bundle-Description";

/// Rewrites header values. The bundle manifest flavour also injects package
/// versions and updates the bundle identity.
#[derive(Debug)]
pub struct ManifestAction {
    rules: Arc<Rules>,
    action_type: ActionType,
}

impl ManifestAction {
    #[must_use]
    pub fn manifest(rules: Arc<Rules>) -> Self {
        Self {
            rules,
            action_type: ActionType::Manifest,
        }
    }

    #[must_use]
    pub fn feature(rules: Arc<Rules>) -> Self {
        Self {
            rules,
            action_type: ActionType::Feature,
        }
    }

    fn is_bundle_manifest(&self) -> bool {
        self.action_type == ActionType::Manifest
    }
}

impl Action for ManifestAction {
    fn action_type(&self) -> ActionType {
        self.action_type
    }

    fn apply(&self, _composite: &Composite, name: &str, input: &[u8]) -> Result<Applied, Error> {
        let text = decode_text(name, input)?;
        let signature = &self.rules.signature;
        let mut file = HeaderFile::parse(text);
        let mut changes = ChangeSet::new();

        // Identity is keyed by the symbolic name as found, before renaming.
        let symbolic_name = file
            .main_header(SYMBOLIC_NAME)
            .map(|header| strip_directives(header.value()).to_string());

        for header in file.headers_mut() {
            let is_package_header = self.is_bundle_manifest()
                && PACKAGE_HEADERS
                    .iter()
                    .any(|h| h.eq_ignore_ascii_case(header.name()));
            if is_package_header {
                rewrite_package_header(signature, header, &mut changes);
            } else if let Some(rewrite) = signature.replace_text(header.value()) {
                header.set_value(rewrite.text);
                for change in rewrite.changes {
                    changes.record(change);
                }
            }
        }

        if self.is_bundle_manifest() {
            if let Some(update) = symbolic_name
                .as_deref()
                .and_then(|s| signature.bundle_update_for(s))
            {
                debug!(entry = %name, bundle = %update.symbolic_name, "updating bundle identity");
                update_identity(&mut file, update, &mut changes);
            }
        }

        if file.is_changed() {
            Ok(Applied::rewritten(file.render().into_bytes(), changes))
        } else {
            Ok(Applied::unchanged())
        }
    }
}

/// Rename the packages of each clause and set the version attribute of
/// renamed packages that have a version token
fn rewrite_package_header(signature: &SignatureRule, header: &mut Header, changes: &mut ChangeSet) {
    let mut clauses = Vec::new();
    let mut changed = false;

    for clause in split_unquoted(header.value(), ',') {
        let mut parts: Vec<String> = Vec::new();
        let mut versions: Vec<(String, String)> = Vec::new();

        for part in split_unquoted(clause, ';') {
            if part.contains('=') {
                match signature.replace_text(part) {
                    Some(rewrite) => {
                        for change in rewrite.changes {
                            changes.record(change);
                        }
                        parts.push(rewrite.text);
                        changed = true;
                    }
                    None => parts.push(part.to_string()),
                }
                continue;
            }

            let package = part.trim();
            match signature.replace_package(package) {
                Some(matched) if !package.is_empty() => {
                    let start = part.len() - part.trim_start().len();
                    parts.push(format!(
                        "{}{}{}",
                        &part[..start],
                        matched.replaced,
                        &part[start + package.len()..]
                    ));
                    if let Some(version) = matched.version {
                        versions.push((matched.to.clone(), version));
                    }
                    changes.record(ChangeKind::PackageRenamed {
                        from: matched.from,
                        to: matched.to,
                    });
                    changed = true;
                }
                _ => parts.push(part.to_string()),
            }
        }

        // A clause sharing attributes between packages gets one version.
        if let Some((package, version)) = versions.into_iter().next() {
            let attribute = format!("version=\"{version}\"");
            match parts.iter_mut().find(|part| is_version_attribute(part)) {
                Some(part) => {
                    let start = part.len() - part.trim_start().len();
                    *part = format!("{}{attribute}", &part[..start]);
                }
                None => parts.push(attribute),
            }
            changes.record(ChangeKind::VersionSet { package, version });
        }

        clauses.push(parts.join(";"));
    }

    if changed {
        header.set_value(clauses.join(","));
    }
}

fn update_identity(file: &mut HeaderFile, update: &BundleUpdate, changes: &mut ChangeSet) {
    let mut set = |file: &mut HeaderFile, field: &str, value: String| {
        if file.set_main_header(field, &value) {
            changes.record(ChangeKind::BundleIdentity {
                field: field.to_string(),
                value,
            });
        }
    };

    if !update.symbolic_name.is_empty() {
        let directives = file
            .main_header(SYMBOLIC_NAME)
            .and_then(|header| header.value().find(';').map(|i| header.value()[i..].to_string()))
            .unwrap_or_default();
        set(file, SYMBOLIC_NAME, format!("{}{directives}", update.symbolic_name));
    }
    if !update.version.is_empty() {
        set(file, BUNDLE_VERSION, update.version.clone());
    }
    if !update.name.is_empty() {
        let existing = file.main_header(BUNDLE_NAME).map(|h| h.value().to_string());
        set(file, BUNDLE_NAME, update.updated_name(existing.as_deref()));
    }
    if !update.description.is_empty() {
        let existing = file
            .main_header(BUNDLE_DESCRIPTION)
            .map(|h| h.value().to_string());
        set(
            file,
            BUNDLE_DESCRIPTION,
            update.updated_description(existing.as_deref()),
        );
    }
}

fn strip_directives(value: &str) -> &str {
    value.split(';').next().unwrap_or(value).trim()
}

fn is_version_attribute(part: &str) -> bool {
    part.split_once('=')
        .is_some_and(|(key, _)| key.trim() == "version")
}

/// Split on `separator` outside double quotes
fn split_unquoted(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quoted = false;
    let mut start = 0;
    for (index, c) in text.char_indices() {
        if c == '"' {
            quoted = !quoted;
        } else if c == separator && !quoted {
            parts.push(&text[start..index]);
            start = index + c.len_utf8();
        }
    }
    parts.push(&text[start..]);
    parts
}
