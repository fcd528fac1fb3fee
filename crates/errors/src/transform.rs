//! Transform error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransformError {
    #[error("archive failure in {path}: {message}")]
    Archive { path: String, message: String },

    #[error("malformed {format} content in {path}: {message}")]
    MalformedContent {
        path: String,
        format: String,
        message: String,
    },

    #[error("cannot encode {path}: {message}")]
    Encoding { path: String, message: String },
}

impl TransformError {
    pub fn malformed(
        path: impl Into<String>,
        format: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedContent {
            path: path.into(),
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn archive(path: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Archive {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

impl UserFacingError for TransformError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        Some("The output is incomplete and should be discarded.")
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::Archive { .. } => "transform.archive",
            Self::MalformedContent { .. } => "transform.malformed_content",
            Self::Encoding { .. } => "transform.encoding",
        })
    }
}
