//! Error types for the FEY dashboard.
//!
//! One `thiserror` hierarchy shared by the fetchers, the stores and the API.
//! Cache failures never surface through it: the cache layer reports them as
//! misses instead.

use thiserror::Error;

/// Result type alias using `FeyError`.
pub type Result<T> = std::result::Result<T, FeyError>;

/// Main error type for all FEY operations.
#[derive(Debug, Error)]
pub enum FeyError {
    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// A required credential or URL is absent or invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // NETWORK ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// HTTP request failed before a response was received.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Remote endpoint answered with a non-success status.
    #[error("{service} returned HTTP {status}")]
    HttpStatus { service: String, status: u16 },

    /// Request did not complete within the configured timeout.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// JSON-RPC call returned an error member.
    #[error("RPC call failed: {0}")]
    RpcError(String),

    /// GraphQL endpoint returned an `errors` array.
    #[error("GraphQL errors: {0}")]
    GraphqlError(String),

    /// Block explorer returned a non-success envelope.
    #[error("Block explorer error: {0}")]
    ExplorerError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // DECODING ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Response payload did not have the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Decoded integer does not fit the target type.
    #[error("Value overflows {target}: {value}")]
    Overflow { target: &'static str, value: String },

    /// Requested record does not exist upstream.
    #[error("Not found: {0}")]
    NotFound(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // STORAGE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Persistent store operation failed.
    #[error("Storage error: {0}")]
    StorageError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Input validation failed.
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl FeyError {
    /// Returns true if this error is transient (another attempt might succeed).
    pub fn is_recoverable(&self) -> bool {
        match self {
            FeyError::HttpError(_) | FeyError::Timeout(_) | FeyError::RpcError(_) => true,
            FeyError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns true if this error is caused by missing or invalid configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(self, FeyError::ConfigError(_))
    }

    /// Returns true if this error came from the persistent store.
    pub fn is_storage_error(&self) -> bool {
        matches!(self, FeyError::StorageError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FeyError::HttpStatus {
            service: "Dune".into(),
            status: 503,
        };
        assert_eq!(err.to_string(), "Dune returned HTTP 503");

        let err = FeyError::Overflow {
            target: "u64",
            value: "0x1ffffffffffffffff".into(),
        };
        assert!(err.to_string().contains("u64"));
    }

    #[test]
    fn test_error_classification() {
        assert!(FeyError::HttpError("reset".into()).is_recoverable());
        assert!(FeyError::Timeout("rpc".into()).is_recoverable());
        assert!(FeyError::HttpStatus { service: "x".into(), status: 502 }.is_recoverable());
        assert!(!FeyError::HttpStatus { service: "x".into(), status: 404 }.is_recoverable());
        assert!(!FeyError::ConfigError("missing".into()).is_recoverable());

        assert!(FeyError::ConfigError("DUNE_API_KEY".into()).is_config_error());
        assert!(!FeyError::StorageError("locked".into()).is_config_error());
        assert!(FeyError::StorageError("locked".into()).is_storage_error());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_result: std::result::Result<serde_json::Value, _> = serde_json::from_str("invalid");
        let fey_result: Result<serde_json::Value> = json_result.map_err(FeyError::from);
        assert!(matches!(fey_result, Err(FeyError::JsonError(_))));
    }
}
