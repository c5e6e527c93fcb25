//! Error types for blob store backends

use thiserror::Error;

/// Message used when a backend reports a conflict without one of its own
pub const ALREADY_EXISTS_MESSAGE: &str = "The resource already exists";

/// Errors that can occur while talking to a blob store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend answered with an error; `message` is relayed to callers as-is
    #[error("{message}")]
    Backend { status: u16, message: String },

    /// A no-overwrite write hit an existing object; `message` comes from the backend
    #[error("{message}")]
    AlreadyExists { path: String, message: String },

    #[error("Connection failed: {0}")]
    Transport(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl StoreError {
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    pub fn already_exists(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AlreadyExists {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_displays_message_only() {
        let err = StoreError::backend(400, "Bucket not found");
        assert_eq!(err.to_string(), "Bucket not found");
    }

    #[test]
    fn test_already_exists_displays_backend_message() {
        let err = StoreError::already_exists("cat-1-1000.png", "The resource already exists");
        assert_eq!(err.to_string(), "The resource already exists");
        assert!(
            matches!(err, StoreError::AlreadyExists { ref path, .. } if path == "cat-1-1000.png")
        );
    }
}
