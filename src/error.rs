//! Error types shared by the configuration model, the aggregator and the session.

use thiserror::Error;

/// Failure reported by the external decoding engine.
///
/// The engine is opaque, so the message and code are carried through as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("engine error {code}: {message}")]
pub struct EngineError {
    /// Engine-specific status code (0 when the engine does not provide one)
    pub code: i32,
    /// Engine-provided description
    pub message: String,
}

impl EngineError {
    /// Create an engine error with a code and message
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Errors returned by every fallible operation in this crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A configuration or decode operation ran before a successful initialization.
    #[error("SDK not initialized")]
    NotInitialized,

    /// Malformed configuration value or decode argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A value could not be represented in (or read back from) the exchange format.
    #[error("serialization error in field '{field}': {reason}")]
    Serialization {
        /// Name of the offending field
        field: String,
        /// What went wrong
        reason: String,
    },

    /// The license subsystem rejected the key.
    #[error("license initialization failed: {0}")]
    Licensing(String),

    /// Opaque failure surfaced by the decoding engine.
    #[error(transparent)]
    EngineFailure(#[from] EngineError),

    /// The decode call was cancelled through its cancel token.
    #[error("decode cancelled")]
    Cancelled,

    /// The decode call ran past its deadline.
    #[error("decode deadline exceeded")]
    DeadlineExceeded,
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub(crate) fn serialization(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Serialization {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether this is a caller-correctable argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_is_transparent() {
        let err: Error = EngineError::new(7, "license expired").into();
        assert_eq!(err.to_string(), "engine error 7: license expired");
        assert!(matches!(err, Error::EngineFailure(_)));
    }

    #[test]
    fn test_serialization_names_field() {
        let err = Error::serialization("textualData", "not valid UTF-8");
        assert!(err.to_string().contains("'textualData'"));
        assert!(!err.is_invalid_argument());
    }
}
