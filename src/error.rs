//! Error types for the reference store.
//!
//! Every error here is a synchronous validation failure: the store is left
//! exactly as it was before the call. A missing or expired key is not an
//! error, it is reported as `None` by the read operations.

use thiserror::Error;

/// Errors returned by [`Store`](crate::Store) operations and configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The value passed to `set` was [`Value::Nil`](crate::Value::Nil).
    #[error("value can not be nil")]
    InvalidValue,

    /// A negative TTL was passed to `set`.
    #[error("invalid ttl: {0} (must be >= 0)")]
    InvalidTtl(i64),

    /// The value does not carry reference semantics.
    #[error("unsupported value type: {0} (only pointer, slice and map values are stored)")]
    UnsupportedType(&'static str),

    /// A [`StoreConfig`](crate::StoreConfig) failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(StoreError::InvalidValue.to_string(), "value can not be nil");
        assert_eq!(
            StoreError::InvalidTtl(-3).to_string(),
            "invalid ttl: -3 (must be >= 0)"
        );
        assert!(StoreError::UnsupportedType("integer")
            .to_string()
            .contains("integer"));
    }
}
