//! Error types for the posture crates

use thiserror::Error;

/// Result type for posture operations
pub type PostureResult<T> = std::result::Result<T, PostureError>;

/// Posture error types
#[derive(Debug, Clone, Error)]
pub enum PostureError {
    /// The upstream data service answered with a non-success status
    #[error("Upstream posture service returned status {status}")]
    Upstream { status: u16 },

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body was not a valid snapshot
    #[error("Failed to decode posture snapshot: {0}")]
    Decode(String),

    /// Reading a local snapshot failed
    #[error("I/O error: {0}")]
    Io(String),
}

impl PostureError {
    /// Get an error code for status reporting
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Upstream { .. } => "UPSTREAM_ERROR",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }
}

impl From<serde_json::Error> for PostureError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<std::io::Error> for PostureError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = PostureError::Upstream { status: 503 };
        assert_eq!(err.error_code(), "UPSTREAM_ERROR");
        assert_eq!(err.to_string(), "Upstream posture service returned status 503");
    }

    #[test]
    fn test_io_conversion() {
        let err: PostureError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.error_code(), "IO_ERROR");
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_decode_conversion() {
        let err: PostureError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.error_code(), "DECODE_ERROR");
    }
}
