//! Error types for the LDS file service.

use thiserror::Error;

/// Result type alias using the service's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for file service operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// File record not found
    #[error("File not found: {0}")]
    FileNotFound(uuid::Uuid),

    /// Object store operation failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Thumbnail could not be decoded or encoded
    #[error("Thumbnail error: {0}")]
    Thumbnail(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("test resource".to_string());
        assert_eq!(err.to_string(), "Not found: test resource");
    }

    #[test]
    fn test_error_display_file_not_found() {
        let id = Uuid::nil();
        let err = Error::FileNotFound(id);
        assert_eq!(err.to_string(), format!("File not found: {}", id));
    }

    #[test]
    fn test_error_display_storage() {
        let err = Error::Storage("bucket unavailable".to_string());
        assert_eq!(err.to_string(), "Storage error: bucket unavailable");
    }

    #[test]
    fn test_error_display_thumbnail() {
        let err = Error::Thumbnail("unsupported format".to_string());
        assert_eq!(err.to_string(), "Thumbnail error: unsupported format");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("empty key".to_string());
        assert_eq!(err.to_string(), "Invalid input: empty key");
    }

    #[test]
    fn test_error_display_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.to_string().contains("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
