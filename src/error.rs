//! Error types for structkit
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Struct Error Enum ==
/// Unified error type for caches and structural algorithms.
#[derive(Error, Debug)]
pub enum StructError {
    /// Invalid constructor or configuration argument
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A traversal reached a node that is already on its own path
    #[error("Circular reference detected at {0}")]
    CircularReference(String),

    /// Value of a type the algorithm cannot represent
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Value has no canonical serialization
    #[error("Value cannot be hashed: {0}")]
    Unhashable(String),

    /// Unsafe or unusable property path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Malformed JSON input
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl StructError {
    /// Display form of a traversal location, `<root>` for the top level.
    pub(crate) fn location(path: &str) -> String {
        if path.is_empty() {
            "<root>".to_string()
        } else {
            path.to_string()
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for structkit.
pub type Result<T> = std::result::Result<T, StructError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = StructError::Configuration("capacity must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: capacity must be at least 1"
        );

        let err = StructError::CircularReference(StructError::location(""));
        assert_eq!(err.to_string(), "Circular reference detected at <root>");
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: StructError = parse_err.into();
        assert!(matches!(err, StructError::Json(_)));
    }
}
