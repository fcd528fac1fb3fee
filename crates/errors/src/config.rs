//! Configuration and rule error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ConfigError {
    #[error("version rule key [ {key} ] is not the target of any package rename")]
    RuleInconsistency { key: String },

    #[error("no action registered for forced type [ {name} ]")]
    UnknownActionType { name: String },

    #[error("invalid bundle update for [ {key} ]: {value}")]
    InvalidBundleUpdate { key: String, value: String },

    #[error("package renames are required but none were supplied")]
    MissingRenames,

    #[error("rules file not found: {path}")]
    NotFound { path: String },

    #[error("parse error: {message}")]
    ParseError { message: String },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("output already exists: {path}")]
    OutputExists { path: String },
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::RuleInconsistency { .. } => {
                Some("Every key of the versions file must be a value in the renames file.")
            }
            Self::UnknownActionType { .. } => {
                Some("Run with --list-actions to see the accepted type names.")
            }
            Self::InvalidBundleUpdate { .. } => Some(
                "Bundle values take the form symbolic-name,version,name,description; prefix name or description with '+' to append.",
            ),
            Self::MissingRenames => Some("Pass a renames file with --renames."),
            Self::NotFound { .. } => Some("Check the rules file path and retry."),
            Self::OutputExists { .. } => Some("Pass --overwrite or choose another output path."),
            Self::ParseError { .. } | Self::InvalidValue { .. } => {
                Some("Fix the configuration value and retry the command.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::RuleInconsistency { .. } => "config.rule_inconsistency",
            Self::UnknownActionType { .. } => "config.unknown_action_type",
            Self::InvalidBundleUpdate { .. } => "config.invalid_bundle_update",
            Self::MissingRenames => "config.missing_renames",
            Self::NotFound { .. } => "config.not_found",
            Self::ParseError { .. } => "config.parse_error",
            Self::InvalidValue { .. } => "config.invalid_value",
            Self::OutputExists { .. } => "config.output_exists",
        })
    }
}
