use thiserror::Error;

/// Unified error type for rn-publish operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Git command `{command}` failed: {stderr}")]
    Command { command: String, stderr: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed version '{version}': {reason}")]
    MalformedVersion { version: String, reason: String },

    #[error("Native project error: {0}")]
    NativeFile(String),

    #[error("AppCenter request failed with status {status}: {message}")]
    AppCenter { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in rn-publish
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a malformed version error for `version`
    pub fn malformed_version(version: impl Into<String>, reason: impl Into<String>) -> Self {
        ReleaseError::MalformedVersion {
            version: version.into(),
            reason: reason.into(),
        }
    }

    pub fn native_file(msg: impl Into<String>) -> Self {
        ReleaseError::NativeFile(msg.into())
    }

    /// Create a failed-command error from a git invocation
    pub fn command(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        ReleaseError::Command {
            command: command.into(),
            stderr: stderr.into(),
        }
    }
}
