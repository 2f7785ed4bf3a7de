//! Unit tests for the `CodecError` enum and its `Display` implementation.

use lora_sensor_codec::error::CodecError;
use lora_sensor_codec::util::hex::HexError;

/// Tests that the `InvalidInputFormat` variant is correctly formatted.
#[test]
fn test_invalid_input_format_error() {
    assert_eq!(
        CodecError::InvalidInputFormat.to_string(),
        "Invalid input format"
    );
}

/// Tests that the `LengthMismatch` variant is correctly formatted.
#[test]
fn test_length_mismatch_error() {
    let err = CodecError::LengthMismatch {
        expected: 6,
        actual: 8,
    };
    assert_eq!(
        err.to_string(),
        "Invalid payload length. Expected 6 bytes, got 8"
    );
}

/// Tests that the `OutOfRange` variant is correctly formatted.
#[test]
fn test_out_of_range_error() {
    let err = CodecError::OutOfRange {
        offset: 7,
        width: 2,
        len: 8,
    };
    assert_eq!(
        err.to_string(),
        "Out of range access: 2 byte(s) at offset 7 in a 8 byte buffer"
    );
}

/// Tests that the `InvalidBitPosition` variant names the bit, not a byte offset.
#[test]
fn test_invalid_bit_position_error() {
    assert_eq!(
        CodecError::InvalidBitPosition(9).to_string(),
        "Invalid bit position 9, expected 0-7"
    );
}

/// Tests that the `InvalidSchema` variant is correctly formatted.
#[test]
fn test_invalid_schema_error() {
    let err = CodecError::InvalidSchema("duplicate field 'rssi'".to_string());
    assert_eq!(err.to_string(), "Invalid schema: duplicate field 'rssi'");
}

/// Tests that the `UnknownSchema` and `UnknownField` variants are correctly formatted.
#[test]
fn test_unknown_lookups() {
    assert_eq!(
        CodecError::UnknownSchema("rev-z".into()).to_string(),
        "Unknown schema: rev-z"
    );
    assert_eq!(
        CodecError::UnknownField("lux".into()).to_string(),
        "Unknown field: lux"
    );
}

/// Tests the `From` conversions used with `?`.
#[test]
fn test_conversions() {
    let err: CodecError = HexError::EmptyString.into();
    assert_eq!(err.to_string(), "Hex error: Empty hex string");

    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: CodecError = json_err.into();
    assert!(matches!(err, CodecError::Json(_)));

    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err: CodecError = io_err.into();
    assert_eq!(err.to_string(), "I/O error: gone");
}
