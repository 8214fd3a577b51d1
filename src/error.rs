//! Unified error handling for the out&abt core.
//!
//! Only the backend data-access path produces errors. The filter pipeline
//! degrades to empty results instead, so nothing in `filter`, `geo_utils` or
//! `explore` returns this type.

use thiserror::Error;

/// Unified error type for out&abt operations.
#[derive(Debug, Clone, Error)]
pub enum OutAbtError {
    /// HTTP/API error
    #[error("HTTP error{}: {message}", status_suffix(.status_code))]
    Http {
        message: String,
        status_code: Option<u16>,
    },
    /// Response body could not be decoded into activity rows
    #[error("Decode error: {message}")]
    Decode { message: String },
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },
}

fn status_suffix(status_code: &Option<u16>) -> String {
    status_code.map(|code| format!(" ({})", code)).unwrap_or_default()
}

/// Result type alias for out&abt operations.
pub type Result<T> = std::result::Result<T, OutAbtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OutAbtError::Http {
            message: "bad gateway".to_string(),
            status_code: Some(502),
        };
        assert_eq!(err.to_string(), "HTTP error (502): bad gateway");

        let err = OutAbtError::Http {
            message: "connection reset".to_string(),
            status_code: None,
        };
        assert_eq!(err.to_string(), "HTTP error: connection reset");
    }
}
