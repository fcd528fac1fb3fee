//! CLI error handling

use std::fmt;

use jtrans_errors::{ConfigError, DispatchError, ErrorCategory, UserFacingError};

/// Exit status for each failure class
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const ARGUMENTS: i32 = 1;
    pub const RULES: i32 = 2;
    pub const TRANSFORM: i32 = 3;
    pub const FILE_TYPE: i32 = 4;
}

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration or rules error
    Config(ConfigError),
    /// Error raised while dispatching or transforming
    Run(jtrans_errors::Error),
    /// Invalid command arguments
    InvalidArguments(String),
    /// I/O error
    Io(std::io::Error),
}

impl CliError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // An existing output or a missing input is reported like a failed write.
            CliError::Config(ConfigError::OutputExists { .. })
            | CliError::Run(jtrans_errors::Error::Config(ConfigError::OutputExists { .. }))
            | CliError::Run(jtrans_errors::Error::Dispatch(DispatchError::InputMissing { .. }))
            | CliError::Io(_) => exit_code::TRANSFORM,
            CliError::Config(_) => exit_code::RULES,
            CliError::Run(e) => match e.category() {
                ErrorCategory::Config => exit_code::RULES,
                ErrorCategory::Dispatch => exit_code::FILE_TYPE,
                ErrorCategory::Transform => exit_code::TRANSFORM,
            },
            CliError::InvalidArguments(_) => exit_code::ARGUMENTS,
        }
    }

    /// Machine readable code, when the underlying error has one
    pub fn code(&self) -> Option<&'static str> {
        match self {
            CliError::Config(e) => e.user_code(),
            CliError::Run(e) => e.user_code(),
            CliError::InvalidArguments(_) | CliError::Io(_) => None,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => {
                write!(f, "Rules error: {}", e.user_message())?;
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                Ok(())
            }
            CliError::Run(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                Ok(())
            }
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Run(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::InvalidArguments(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<jtrans_errors::Error> for CliError {
    fn from(e: jtrans_errors::Error) -> Self {
        match e {
            jtrans_errors::Error::Config(e) => CliError::Config(e),
            other => CliError::Run(other),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
