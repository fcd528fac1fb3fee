#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the jtrans rewriting engine
//!
//! This crate provides the types shared between the rule engine, the actions
//! and the command line front end: the closed set of action types, bundle
//! identity updates, and the change log produced by a transform.

pub mod bundle;
pub mod changes;
pub mod reports;

pub use bundle::BundleUpdate;
pub use changes::{Change, ChangeKind, ChangeSet};
pub use reports::TransformReport;

use jtrans_errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported artifact formats
///
/// Used both to dispatch entries to actions and to let the user force the
/// type of the top-level input by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionType {
    /// Plain directory tree
    Directory,
    /// Compiled class file
    Class,
    /// Java source file
    Java,
    /// `META-INF/services` descriptor list
    ServiceConfig,
    /// `META-INF/MANIFEST.MF` header file
    Manifest,
    /// Feature manifest, a header file variant
    Feature,
    /// Module archive (jar)
    Jar,
    /// Web module archive (war)
    War,
    /// Resource adapter archive (rar)
    Rar,
    /// Enterprise archive (ear)
    Ear,
    /// Generic zip archive
    Zip,
    /// Passthrough copy
    Null,
}

impl ActionType {
    /// Every action type, in registration order
    pub const ALL: [Self; 12] = [
        Self::Directory,
        Self::Class,
        Self::Java,
        Self::ServiceConfig,
        Self::Manifest,
        Self::Feature,
        Self::Jar,
        Self::War,
        Self::Rar,
        Self::Ear,
        Self::Zip,
        Self::Null,
    ];

    /// Tag used on the command line and in reports
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::Class => "class",
            Self::Java => "java",
            Self::ServiceConfig => "service-config",
            Self::Manifest => "manifest",
            Self::Feature => "feature",
            Self::Jar => "jar",
            Self::War => "war",
            Self::Rar => "rar",
            Self::Ear => "ear",
            Self::Zip => "zip",
            Self::Null => "null",
        }
    }

    /// Short human readable description
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Directory => "directory of artifacts",
            Self::Class => "compiled class file (.class)",
            Self::Java => "java source file (.java)",
            Self::ServiceConfig => "service loader descriptor (META-INF/services/*)",
            Self::Manifest => "bundle manifest (META-INF/MANIFEST.MF)",
            Self::Feature => "feature manifest (.mf)",
            Self::Jar => "module archive (.jar)",
            Self::War => "web module archive (.war)",
            Self::Rar => "resource adapter archive (.rar)",
            Self::Ear => "enterprise archive (.ear)",
            Self::Zip => "generic zip archive (.zip)",
            Self::Null => "unchanged copy",
        }
    }

    /// Whether this type iterates nested entries
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(
            self,
            Self::Directory | Self::Jar | Self::War | Self::Rar | Self::Ear | Self::Zip
        )
    }

    /// Case-insensitive match against a user supplied tag
    #[must_use]
    pub fn matches(self, tag: &str) -> bool {
        let tag = tag.trim();
        self.name().eq_ignore_ascii_case(tag)
            || (self == Self::ServiceConfig && tag.eq_ignore_ascii_case("service_config"))
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActionType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action_type| action_type.matches(s))
            .ok_or_else(|| ConfigError::UnknownActionType {
                name: s.to_string(),
            })
    }
}

// Implement clap::ValueEnum for ActionType
impl clap::ValueEnum for ActionType {
    fn value_variants<'a>() -> &'a [Self] {
        &Self::ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.name()).help(self.description()))
    }
}
