//! Loading rule files into rule maps

use crate::properties;
use jtrans_errors::{ConfigError, Error};
use jtrans_rules::{SelectionRule, SignatureRule};
use jtrans_types::BundleUpdate;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Value (or key prefix) that marks a selection entry as an exclude
pub const EXCLUDE_MARKER: &str = "!";

/// Locations of the rule files for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleFiles {
    pub selections: Option<PathBuf>,
    pub renames: Option<PathBuf>,
    pub versions: Option<PathBuf>,
    pub bundles: Option<PathBuf>,
    pub direct: Option<PathBuf>,
}

/// Parsed rule maps, ready to build the rule objects from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleMaps {
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
    pub renames: BTreeMap<String, String>,
    pub versions: BTreeMap<String, String>,
    pub bundles: BTreeMap<String, BundleUpdate>,
    pub direct: BTreeMap<String, String>,
}

impl RuleMaps {
    /// Read every configured rule file
    ///
    /// # Errors
    ///
    /// Returns an error if a configured file cannot be read or a bundle
    /// update value is malformed.
    pub async fn load(files: &RuleFiles) -> Result<Self, Error> {
        let mut maps = Self::default();

        if let Some(text) = read_optional("selections", files.selections.as_deref()).await? {
            maps.add_selections(&properties::parse(&text));
        }
        if let Some(text) = read_optional("renames", files.renames.as_deref()).await? {
            maps.renames = properties::parse(&text);
        }
        if let Some(text) = read_optional("versions", files.versions.as_deref()).await? {
            maps.versions = properties::parse(&text);
        }
        if let Some(text) = read_optional("bundles", files.bundles.as_deref()).await? {
            maps.bundles = parse_bundles(&properties::parse(&text))?;
        }
        if let Some(text) = read_optional("direct", files.direct.as_deref()).await? {
            maps.direct = properties::parse(&text);
        }

        debug!(
            includes = maps.includes.len(),
            excludes = maps.excludes.len(),
            renames = maps.renames.len(),
            versions = maps.versions.len(),
            bundles = maps.bundles.len(),
            direct = maps.direct.len(),
            "rule maps loaded"
        );
        Ok(maps)
    }

    /// Add selection properties: each key is a pattern, excluded when its
    /// value or its first character is `!`. A leading `!` on a key must be
    /// escaped as `\!` in the file, otherwise the line is a comment.
    pub fn add_selections(&mut self, selections: &BTreeMap<String, String>) {
        for (key, value) in selections {
            if let Some(pattern) = key.strip_prefix(EXCLUDE_MARKER) {
                self.excludes.push(pattern.trim().to_string());
            } else if value.trim() == EXCLUDE_MARKER {
                self.excludes.push(key.clone());
            } else {
                self.includes.push(key.clone());
            }
        }
    }

    /// Add comma separated include and exclude lists
    pub fn add_selection_lists(&mut self, includes: Option<&str>, excludes: Option<&str>) {
        self.includes.extend(split_list(includes));
        self.excludes.extend(split_list(excludes));
    }

    #[must_use]
    pub fn selection_rule(&self) -> SelectionRule {
        if self.includes.is_empty() && self.excludes.is_empty() {
            info!("all resources will be selected");
        }
        SelectionRule::new(&self.includes, &self.excludes)
    }

    /// Build the signature rule, resolving inversion
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRenames`] when there are no package
    /// renames, or [`ConfigError::RuleInconsistency`] when a version key is
    /// not a rename target.
    pub fn signature_rule(&self, invert: bool) -> Result<SignatureRule, ConfigError> {
        if self.renames.is_empty() {
            return Err(ConfigError::MissingRenames);
        }
        SignatureRule::builder()
            .renames(self.renames.clone())
            .versions(self.versions.clone())
            .bundles(self.bundles.clone())
            .direct(self.direct.clone())
            .invert(invert)
            .build()
    }
}

/// Parse every bundle update value
///
/// # Errors
///
/// Returns the first malformed entry as [`ConfigError::InvalidBundleUpdate`].
pub fn parse_bundles(
    raw: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, BundleUpdate>, ConfigError> {
    raw.iter()
        .map(|(key, value)| BundleUpdate::parse(key, value).map(|update| (key.clone(), update)))
        .collect()
}

fn split_list(list: Option<&str>) -> impl Iterator<Item = String> + '_ {
    list.into_iter()
        .flat_map(|list| list.split(','))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
}

async fn read_optional(kind: &str, path: Option<&Path>) -> Result<Option<String>, Error> {
    let Some(path) = path else {
        info!(rules = kind, "skipping rules, none supplied");
        return Ok(None);
    };

    info!(rules = kind, path = %path.display(), "loading rules");
    let text = fs::read_to_string(path)
        .await
        .map_err(|_| ConfigError::NotFound {
            path: path.display().to_string(),
        })?;
    Ok(Some(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_markers() {
        let mut maps = RuleMaps::default();
        maps.add_selections(&properties::parse("*.jar=\n\\!*Test.class=\nlib/*=!\n"));
        assert_eq!(maps.includes, vec!["*.jar".to_string()]);
        assert_eq!(
            maps.excludes,
            vec!["*Test.class".to_string(), "lib/*".to_string()]
        );
    }

    #[test]
    fn test_selection_lists() {
        let mut maps = RuleMaps::default();
        maps.add_selection_lists(Some("*.class, *.jar,"), Some("*Test.class"));
        assert_eq!(maps.includes, vec!["*.class", "*.jar"]);
        assert_eq!(maps.excludes, vec!["*Test.class"]);
    }

    #[test]
    fn test_missing_renames() {
        let maps = RuleMaps::default();
        assert!(matches!(
            maps.signature_rule(false),
            Err(ConfigError::MissingRenames)
        ));
    }

    #[test]
    fn test_bundle_parse_error() {
        let raw = properties::parse("com.old=too,few\n");
        let err = parse_bundles(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBundleUpdate { key, .. } if key == "com.old"));
    }
}
