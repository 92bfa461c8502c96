//! Error types for ansible-data.
//!
//! Library crates use [`AnsibleDataError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all ansible-data operations.
#[derive(Debug, thiserror::Error)]
pub enum AnsibleDataError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Plugin path resolution or lookup enumeration error.
    #[error("discovery error: {0}")]
    Discovery(String),

    /// Documentation block parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Dataset validation or serialization error.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AnsibleDataError>;

impl AnsibleDataError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = AnsibleDataError::config("unknown key");
        assert_eq!(err.to_string(), "config error: unknown key");

        let err = AnsibleDataError::parse("no DOCUMENTATION block");
        assert!(err.to_string().starts_with("parse error:"));

        let err = AnsibleDataError::Discovery("walk failed".into());
        assert_eq!(err.to_string(), "discovery error: walk failed");
    }

    #[test]
    fn io_error_keeps_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = AnsibleDataError::io("/tmp/missing.json", source);
        let msg = err.to_string();
        assert!(msg.contains("missing.json"));
        assert!(msg.contains("gone"));
    }
}
