//! Error types shared across the engine.

use thiserror::Error;

/// Errors that can occur while defining schemas, loading tables, or
/// compiling and running queries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DbError {
    #[error("duplicate attribute name: {name}")]
    DuplicateAttribute { name: String },

    #[error("duplicate key: {key}")]
    DuplicateKey { key: String },

    #[error("record has {actual} values but schema has {expected} attributes")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("unbound variable: {name}")]
    UnboundVariable { name: String },

    #[error("not a number: {text}")]
    NumberFormat { text: String },

    #[error("parse error: {message}")]
    Parsing { message: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("unsupported operation: {message}")]
    UnsupportedOperation { message: String },

    #[error("unknown table: {name}")]
    UnknownTable { name: String },
}

impl DbError {
    pub fn parsing(message: impl Into<String>) -> Self {
        DbError::Parsing {
            message: message.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        DbError::UnsupportedOperation {
            message: message.into(),
        }
    }
}

/// Result type for engine operations.
pub type DbResult<T> = Result<T, DbError>;
