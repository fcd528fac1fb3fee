//! Bundle identity updates

use jtrans_errors::ConfigError;
use serde::{Deserialize, Serialize};

/// Replacement identity for a bundle, keyed by its current symbolic name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleUpdate {
    pub symbolic_name: String,
    pub version: String,
    pub name: String,
    /// Append `name` to the existing value instead of replacing it
    pub add_name: bool,
    pub description: String,
    /// Append `description` to the existing value instead of replacing it
    pub add_description: bool,
}

impl BundleUpdate {
    /// Marker on a raw name or description value selecting additive update
    pub const ADDITIVE_CHAR: char = '+';

    /// Key applied to every bundle without an exact entry
    pub const WILDCARD_KEY: &'static str = "*";

    /// Parse a rule value of the form `symbolic-name,version,name,description`
    ///
    /// Commas inside double quotes do not split fields and the quotes are
    /// removed. A leading `+` on the name or description marks it additive.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not have exactly four fields.
    pub fn parse(key: &str, value: &str) -> Result<Self, ConfigError> {
        let fields = split_fields(value);
        let [symbolic_name, version, name, description] = fields.as_slice() else {
            return Err(ConfigError::InvalidBundleUpdate {
                key: key.to_string(),
                value: value.to_string(),
            });
        };

        let (name, add_name) = strip_additive(name);
        let (description, add_description) = strip_additive(description);

        Ok(Self {
            symbolic_name: symbolic_name.clone(),
            version: version.clone(),
            name,
            add_name,
            description,
            add_description,
        })
    }

    /// Compute the new bundle name from the existing one
    #[must_use]
    pub fn updated_name(&self, existing: Option<&str>) -> String {
        merge(existing, &self.name, self.add_name)
    }

    /// Compute the new bundle description from the existing one
    #[must_use]
    pub fn updated_description(&self, existing: Option<&str>) -> String {
        merge(existing, &self.description, self.add_description)
    }

    /// Render back into rule value syntax
    #[must_use]
    pub fn to_rule_value(&self) -> String {
        let marker = |additive: bool| {
            if additive {
                Self::ADDITIVE_CHAR.to_string()
            } else {
                String::new()
            }
        };
        format!(
            "{},{},{}{},{}{}",
            self.symbolic_name,
            self.version,
            marker(self.add_name),
            quote_if_needed(&self.name),
            marker(self.add_description),
            quote_if_needed(&self.description)
        )
    }
}

fn merge(existing: Option<&str>, value: &str, additive: bool) -> String {
    match existing {
        Some(existing) if additive => format!("{existing}{value}"),
        _ => value.to_string(),
    }
}

fn strip_additive(raw: &str) -> (String, bool) {
    match raw.strip_prefix(BundleUpdate::ADDITIVE_CHAR) {
        Some(rest) => (rest.to_string(), true),
        None => (raw.to_string(), false),
    }
}

fn quote_if_needed(value: &str) -> String {
    if value.contains(',') {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

fn split_fields(value: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for ch in value.chars() {
        match ch {
            '"' => quoted = !quoted,
            ',' if !quoted => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current.trim().to_string());
    fields
}
