//! Error types for KestrelDB.

use thiserror::Error;

/// Result type alias using KestrelError.
pub type Result<T> = std::result::Result<T, KestrelError>;

/// Errors that can occur in KestrelDB operations.
#[derive(Debug, Error)]
pub enum KestrelError {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Schema errors
    #[error("Duplicate field name: {0}")]
    DuplicateField(String),

    #[error("Schema has {types} types but {names} names")]
    FieldCountMismatch { types: usize, names: usize },

    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("Field index {index} out of range for schema of {len} fields")]
    FieldIndexOutOfRange { index: usize, len: usize },

    // Tuple errors
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("String too long: {len} bytes (max {max})")]
    StringTooLong { len: usize, max: usize },

    #[error("Invalid UTF-8 in stored string: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Tuple too large: {size} bytes (max {max})")]
    TupleTooLarge { size: usize, max: usize },

    // Page errors
    #[error("Slot {slot} is already empty")]
    SlotAlreadyEmpty { slot: usize },
}
