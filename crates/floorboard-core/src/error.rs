//! # Error Types
//!
//! The aggregation engine has very few fallible surfaces: missing
//! references resolve to defaults, empty inputs produce zeroed documents,
//! and division guards coerce to zero. What remains is request parsing at
//! the engine's edge.
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (the offending input)
//! 3. Errors are enum variants, never String

use thiserror::Error;

/// Errors from the aggregation engine's fallible surfaces.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A drilldown request named a dimension the engine does not know.
    #[error("Unknown drilldown dimension: {0}")]
    InvalidDimension(String),
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidDimension("bogus".to_string());
        assert_eq!(err.to_string(), "Unknown drilldown dimension: bogus");
    }
}
