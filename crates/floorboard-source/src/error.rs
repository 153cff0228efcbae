//! # Fetch Error Types
//!
//! Error types for the remote-source boundary.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Fetch Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Query               │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Connection     │  │  QueryFailed            │ │
//! │  │  Io / Parse     │  │  Timeout        │  │  Decode                 │ │
//! │  │                 │  │  Auth           │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  A failed fetch of one record set is recoverable: callers use the      │
//! │  documented empty-default fallback (`source::or_empty`) and the        │
//! │  aggregators tolerate empty collections.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors from the remote-source boundary.
#[derive(Debug, Error)]
pub enum FetchError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid source configuration.
    #[error("Invalid source configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read the config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the config file.
    #[error("Invalid config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Failed to reach the remote source.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The remote source rejected the credentials.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Request timed out.
    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    // =========================================================================
    // Query Errors
    // =========================================================================
    /// A record-set query failed.
    #[error("Query for {record_set} failed: {reason}")]
    QueryFailed { record_set: String, reason: String },

    /// The remote source returned records the schema cannot decode.
    #[error("Failed to decode {record_set} records: {reason}")]
    Decode { record_set: String, reason: String },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = FetchError::QueryFailed {
            record_set: "transactions".to_string(),
            reason: "model not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Query for transactions failed: model not found"
        );

        let err = FetchError::Timeout(30);
        assert_eq!(err.to_string(), "Request timeout after 30 seconds");
    }
}
