//! Dispatch error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DispatchError {
    #[error("no action selected for input [ {path} ]")]
    NoAction { path: String },

    #[error("input does not exist: {path}")]
    InputMissing { path: String },
}

impl UserFacingError for DispatchError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NoAction { .. } => Some("Force a type with --type if the input has an unusual name."),
            Self::InputMissing { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::NoAction { .. } => "dispatch.no_action",
            Self::InputMissing { .. } => "dispatch.input_missing",
        })
    }
}
