//! Primitive big-endian field extraction from an uplink buffer.
//!
//! All functions are pure and bounds-checked: a read that would run past the end
//! of the buffer returns [`CodecError::OutOfRange`] instead of panicking.

use crate::error::CodecError;

fn check_bounds(buf: &[u8], offset: usize, width: usize) -> Result<(), CodecError> {
    match offset.checked_add(width) {
        Some(end) if end <= buf.len() => Ok(()),
        _ => Err(CodecError::OutOfRange {
            offset,
            width,
            len: buf.len(),
        }),
    }
}

/// Read a single unsigned byte (0-255)
pub fn read_u8(buf: &[u8], offset: usize) -> Result<u8, CodecError> {
    check_bounds(buf, offset, 1)?;
    Ok(buf[offset])
}

/// Read two bytes as a big-endian unsigned integer (0-65535)
pub fn read_u16_be(buf: &[u8], offset: usize) -> Result<u16, CodecError> {
    check_bounds(buf, offset, 2)?;
    Ok(u16::from_be_bytes([buf[offset], buf[offset + 1]]))
}

/// Read two bytes as a big-endian two's-complement integer
///
/// Raw values at or above `0x8000` come back as `value - 0x10000`.
pub fn read_i16_be(buf: &[u8], offset: usize) -> Result<i16, CodecError> {
    read_u16_be(buf, offset).map(|raw| raw as i16)
}

/// Extract bit `pos` (0 = least significant) of `byte` as 0 or 1
pub fn read_bit(byte: u8, pos: u8) -> Result<u8, CodecError> {
    if pos > 7 {
        return Err(CodecError::InvalidBitPosition(pos));
    }
    Ok((byte >> pos) & 1)
}

/// Read a 1- or 2-byte field and widen it to `i32`, sign-extending when `signed`
pub fn read_raw(buf: &[u8], offset: usize, width: usize, signed: bool) -> Result<i32, CodecError> {
    match (width, signed) {
        (1, false) => read_u8(buf, offset).map(i32::from),
        (1, true) => read_u8(buf, offset).map(|b| i32::from(b as i8)),
        (2, false) => read_u16_be(buf, offset).map(i32::from),
        (2, true) => read_i16_be(buf, offset).map(i32::from),
        _ => Err(CodecError::OutOfRange {
            offset,
            width,
            len: buf.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_read_u16_be() {
        let buf = [0x01, 0x0F, 0xFF, 0xFF];
        assert_eq!(read_u16_be(&buf, 0).unwrap(), 271);
        assert_eq!(read_u16_be(&buf, 2).unwrap(), 65535);
    }

    #[test]
    fn test_read_i16_be_negative() {
        // -5.0 °C at scale 1/10
        let buf = [0xFF, 0xCE];
        assert_eq!(read_i16_be(&buf, 0).unwrap(), -50);
        assert_eq!(read_i16_be(&[0x80, 0x00], 0).unwrap(), i16::MIN);
    }

    #[test]
    fn test_read_bit() {
        assert_eq!(read_bit(0b0000_0001, 0).unwrap(), 1);
        assert_eq!(read_bit(0b0000_0001, 1).unwrap(), 0);
        assert_eq!(read_bit(0b1000_0000, 7).unwrap(), 1);
        assert!(matches!(
            read_bit(0xFF, 8),
            Err(CodecError::InvalidBitPosition(8))
        ));
    }

    #[test]
    fn test_out_of_range() {
        let buf = [0x00, 0x01, 0x02];
        assert!(matches!(
            read_u16_be(&buf, 2),
            Err(CodecError::OutOfRange {
                offset: 2,
                width: 2,
                len: 3
            })
        ));
        assert!(read_u8(&buf, 3).is_err());
        assert!(read_u8(&[], 0).is_err());
        assert!(read_u16_be(&buf, usize::MAX).is_err());
    }

    #[test]
    fn test_read_raw_widths() {
        let buf = [0xFE, 0xFF, 0xCE];
        assert_eq!(read_raw(&buf, 0, 1, false).unwrap(), 254);
        assert_eq!(read_raw(&buf, 0, 1, true).unwrap(), -2);
        assert_eq!(read_raw(&buf, 1, 2, true).unwrap(), -50);
        assert_eq!(read_raw(&buf, 1, 2, false).unwrap(), 0xFFCE);
        assert!(read_raw(&buf, 0, 3, false).is_err());
    }

    proptest! {
        #[test]
        fn prop_signed_and_unsigned_agree(raw in any::<u16>()) {
            let buf = raw.to_be_bytes();
            let unsigned = i32::from(read_u16_be(&buf, 0).unwrap());
            let signed = i32::from(read_i16_be(&buf, 0).unwrap());
            if raw < 0x8000 {
                prop_assert_eq!(signed, unsigned);
            } else {
                prop_assert_eq!(signed, unsigned - 0x10000);
            }
        }

        #[test]
        fn prop_reads_never_panic(buf in proptest::collection::vec(any::<u8>(), 0..8), offset in 0usize..10) {
            let ok = offset + 2 <= buf.len();
            prop_assert_eq!(read_u16_be(&buf, offset).is_ok(), ok);
        }
    }
}
