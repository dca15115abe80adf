//! CLI-specific error types and mappings.
//!
//! Maps repository errors to exit codes and user-facing messages.

use aibot_core::RepositoryError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// A referenced row does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The request collides with existing state.
    #[error("{0}")]
    Conflict(String),

    /// Argument parsing or validation error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    #[error("Interrupted")]
    Cancelled,
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow `sysexits.h` where one fits.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound(_) => 66,  // EX_NOINPUT
            Self::Conflict(_) => 65,  // EX_DATAERR
            Self::Arguments(_) => 2,  // EX_USAGE
            Self::Io(_) => 74,        // EX_IOERR
            Self::Database(_) => 73,  // EX_CANTCREAT
            Self::Cancelled => 130,   // 128 + SIGINT
        }
    }
}

impl From<RepositoryError> for CliError {
    fn from(err: RepositoryError) -> Self {
        if err.is_not_found() {
            Self::NotFound(err.to_string())
        } else if err.is_already_exists()
            || err.is_toggle_state()
            || matches!(err, RepositoryError::UserHasAnsweredQuestion { .. })
        {
            Self::Conflict(err.to_string())
        } else if err.is_length_exceeded() || matches!(err, RepositoryError::InvalidParameter(_)) {
            Self::Arguments(err.to_string())
        } else if err == RepositoryError::Cancelled {
            Self::Cancelled
        } else {
            Self::Database(err.to_string())
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Io(err.to_string())
    }
}
