//! Error types for fluentql

use thiserror::Error;

/// Result type alias for fluentql operations
pub type QbResult<T> = Result<T, QbError>;

/// Error types for statement building and execution
#[derive(Debug, Error)]
pub enum QbError {
    /// A statement was compiled before `table()` was called
    #[error("No table configured: call `table()` before a terminal operation")]
    MissingTable,

    /// The same bind key was registered twice
    #[error("Bind key collision: {0}")]
    BindingCollision(String),

    /// Invalid builder input (operator, direction, empty value map, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Row value could not be converted to the requested type
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Row or column not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// SQLite driver error
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection error reported by a collaborator
    #[error("Connection error: {0}")]
    Connection(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl QbError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a bind key collision
    pub fn is_binding_collision(&self) -> bool {
        matches!(self, Self::BindingCollision(_))
    }

    /// Check if this error came from misusing the builder rather than from the database
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            Self::MissingTable | Self::BindingCollision(_) | Self::Validation(_)
        )
    }
}
