use crate::DType;
use thiserror::Error;

/// Common error type for feature schema and dataset operations.
///
/// Provides structured error handling for schema lookups, record validation,
/// image coding and mod function resolution across the dataset modification pipeline.
///
/// # Examples
/// ```
/// use rlds_structures::{RldsDataError, RldsResult};
///
/// fn validate_resolution(resolution: usize) -> RldsResult<()> {
///     if resolution == 0 {
///         return Err(RldsDataError::BadParameters("Resolution must be > 0".into()));
///     }
///     Ok(())
/// }
///
/// assert!(validate_resolution(0).is_err());
/// assert!(validate_resolution(256).is_ok());
/// ```
#[derive(Debug, Error)]
pub enum RldsDataError {
    /// A schema or record lacks a key the operation requires
    #[error("Missing key: {path}")]
    MissingKey { path: String },
    /// A value does not have the shape its feature declares
    #[error("Shape mismatch for '{key}': expected {expected}, got {actual}")]
    ShapeMismatch {
        key: String,
        expected: String,
        actual: String,
    },
    /// A value does not have the element type its feature declares
    #[error("Dtype mismatch for '{key}': expected {expected}, got {actual}")]
    DtypeMismatch {
        key: String,
        expected: DType,
        actual: DType,
    },
    /// A value or feature cannot be handled by the requested operation
    #[error("Unsupported value for '{key}': {reason}")]
    UnsupportedValue { key: String, reason: String },
    /// No mod function is registered under this name
    #[error("Unknown mod function '{0}'")]
    UnknownModFunction(String),
    /// Invalid parameters provided to a function
    #[error("Bad Parameters: {0}")]
    BadParameters(String),
    /// Failed to deserialize a schema
    #[error("Failed to Deserialize: {0}")]
    DeserializationError(String),
    /// Failed to serialize a schema
    #[error("Failed to Serialize: {0}")]
    SerializationError(String),
    /// Image encoding or decoding failed
    #[error("Codec error: {0}")]
    Codec(String),
    /// Internal error indicating a bug (please report)
    #[error("Internal Error, please raise an issue on Github: {0}")]
    InternalError(String),
}

impl RldsDataError {
    pub fn missing_key(path: impl Into<String>) -> Self {
        RldsDataError::MissingKey { path: path.into() }
    }

    pub fn unsupported(key: impl Into<String>, reason: impl Into<String>) -> Self {
        RldsDataError::UnsupportedValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for schema and dataset operations
pub type RldsResult<T> = Result<T, RldsDataError>;
