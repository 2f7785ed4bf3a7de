//! # Hex Encoding/Decoding Utilities
//!
//! Hex helpers shared by the CLI (payloads arrive as hex strings copied out of a
//! network console) and the uplink decoder (`raw_payload` debug string).
//!
//! ```rust
//! use lora_sensor_codec::util::hex::{decode_hex, format_hex_compact};
//!
//! let frame = decode_hex("01 0F 01 E2 00 62 01 00").unwrap();
//! assert_eq!(frame.len(), 8);
//! assert_eq!(format_hex_compact(&frame), "01 0f 01 e2 00 62 01 00");
//! ```

use thiserror::Error;

/// Errors that can occur during hex operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HexError {
    #[error("Odd number of hex characters: {0}")]
    OddLength(usize),

    #[error("Empty hex string")]
    EmptyString,

    #[error("Hex decoding error: {0}")]
    DecodeError(String),
}

/// Encode bytes to lowercase hex string
pub fn encode_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decode a hex string to bytes
///
/// Whitespace, `:`/`-` separators and a leading `0x` are stripped first, so
/// `"010F01E2"`, `"01 0f 01 e2"` and `"0x01:0F:01:E2"` all decode the same.
pub fn decode_hex(hex_str: &str) -> Result<Vec<u8>, HexError> {
    let trimmed = hex_str.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let cleaned: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':' && *c != '-')
        .collect();

    if cleaned.is_empty() {
        return Err(HexError::EmptyString);
    }

    if cleaned.len() % 2 != 0 {
        return Err(HexError::OddLength(cleaned.len()));
    }

    hex::decode(&cleaned).map_err(|e| HexError::DecodeError(e.to_string()))
}

/// Format bytes as "01 0f 01 e2", lowercase with single spaces
pub fn format_hex_compact(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_and_spaced() {
        let expected = vec![0x01, 0x0F, 0x01, 0xE2];
        assert_eq!(decode_hex("010F01E2").unwrap(), expected);
        assert_eq!(decode_hex("01 0f 01 e2").unwrap(), expected);
        assert_eq!(decode_hex("0x01:0F:01:E2").unwrap(), expected);
    }

    #[test]
    fn test_encode_lowercase() {
        assert_eq!(encode_hex(&[0xAB, 0xCD, 0xEF]), "abcdef");
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_hex_compact(&[0x01, 0x0F, 0x62]), "01 0f 62");
        assert_eq!(format_hex_compact(&[]), "");
    }

    #[test]
    fn test_errors() {
        assert_eq!(decode_hex(""), Err(HexError::EmptyString));
        assert_eq!(decode_hex("  "), Err(HexError::EmptyString));
        assert_eq!(decode_hex("123"), Err(HexError::OddLength(3)));
        assert!(matches!(decode_hex("GG"), Err(HexError::DecodeError(_))));
    }
}
