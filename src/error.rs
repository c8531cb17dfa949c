//! Error types for sqlweave.

use thiserror::Error;

use crate::executor::ConnectionState;

/// The main error type for mapper operations.
#[derive(Debug, Error)]
pub enum MapperError {
    /// The operation is not valid for the result it produced.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// The requested command shape is not supported.
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    /// The connection cannot be brought to an open state.
    #[error("Connection is in an invalid state: {state}")]
    InvalidState { state: ConnectionState },

    /// A column could not be converted into the requested type.
    #[error("Cannot decode column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed TOML input.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MapperError {
    /// Create a decode error for the given column.
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// A single-row fetch produced more than one row.
    pub fn ambiguous(count: usize) -> Self {
        Self::InvalidOperation(format!(
            "Sequence contains more than one element ({count} rows)"
        ))
    }
}

/// Result type alias for mapper operations.
pub type MapperResult<T> = Result<T, MapperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MapperError::InvalidState {
            state: ConnectionState::Broken,
        };
        assert_eq!(err.to_string(), "Connection is in an invalid state: Broken");
    }

    #[test]
    fn test_ambiguous_display() {
        let err = MapperError::ambiguous(2);
        assert_eq!(
            err.to_string(),
            "Invalid operation: Sequence contains more than one element (2 rows)"
        );
    }
}
