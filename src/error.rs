//! # Codec Error Handling
//!
//! This module defines the `CodecError` enum, which represents the different error
//! types that can occur while decoding uplinks, encoding frames or loading schemas.
//!
//! Decode and encode entry points never return these directly to the caller: they
//! are rendered into the `errors` list of a `DecodeResult` (or collapse into an
//! empty downlink frame). The variants stay public so schema construction, the
//! registry and the CLI can propagate them with `?`.

use crate::util::hex::HexError;
use thiserror::Error;

/// Represents the different error types that can occur in the codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The buffer was absent or not a byte sequence.
    #[error("Invalid input format")]
    InvalidInputFormat,

    /// The buffer length differs from the schema's declared frame length.
    #[error("Invalid payload length. Expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A field read past the end of the buffer. Only reachable with a malformed schema.
    #[error("Out of range access: {width} byte(s) at offset {offset} in a {len} byte buffer")]
    OutOfRange {
        offset: usize,
        width: usize,
        len: usize,
    },

    /// A bit index outside a single byte.
    #[error("Invalid bit position {0}, expected 0-7")]
    InvalidBitPosition(u8),

    /// A schema violated one of its construction invariants.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// No schema is registered under the requested name.
    #[error("Unknown schema: {0}")]
    UnknownSchema(String),

    /// A reading referenced a field the schema does not declare.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Hex input could not be parsed.
    #[error("Hex error: {0}")]
    Hex(#[from] HexError),

    /// Schema JSON could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Schema file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch_message() {
        let err = CodecError::LengthMismatch {
            expected: 8,
            actual: 5,
        };
        assert_eq!(
            err.to_string(),
            "Invalid payload length. Expected 8 bytes, got 5"
        );
    }

    #[test]
    fn test_invalid_input_message() {
        assert_eq!(
            CodecError::InvalidInputFormat.to_string(),
            "Invalid input format"
        );
    }

    #[test]
    fn test_hex_error_converts() {
        let err: CodecError = HexError::OddLength(3).into();
        assert!(matches!(err, CodecError::Hex(HexError::OddLength(3))));
    }
}
