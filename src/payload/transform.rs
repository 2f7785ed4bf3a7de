//! Transform engine: raw field integer to physical value and back.
//!
//! `v = (r * num / den) + offset`. The scale is an exact rational so "divide by 100"
//! stays a division by 100 rather than a multiplication by a rounded `0.01`.
//! Packed flags skip the linear step: a bit or mask is extracted and the field
//! becomes a boolean.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A decoded field value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Flag(bool),
}

impl Value {
    /// Numeric view; flags map to 1.0 / 0.0
    pub fn as_f64(&self) -> f64 {
        match self {
            Value::Number(v) => *v,
            Value::Flag(true) => 1.0,
            Value::Flag(false) => 0.0,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Flag(b) => Some(*b),
            Value::Number(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{v}"),
            Value::Flag(b) => write!(f, "{b}"),
        }
    }
}

/// Exact rational scale factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    pub num: i64,
    pub den: i64,
}

impl Scale {
    pub const fn new(num: i64, den: i64) -> Self {
        Self { num, den }
    }

    pub const fn unit() -> Self {
        Self::new(1, 1)
    }

    /// `raw / divisor`
    pub const fn divide_by(divisor: i64) -> Self {
        Self::new(1, divisor)
    }

    /// `raw * factor`
    pub const fn multiply_by(factor: i64) -> Self {
        Self::new(factor, 1)
    }

    pub fn is_valid(&self) -> bool {
        self.num != 0 && self.den != 0
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::unit()
    }
}

/// Sub-field extraction for flags packed into a spare byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extract {
    /// Single bit, 0 = least significant
    Bit(u8),
    /// Any bit of the mask set
    Mask(u16),
}

/// Per-field transform rule
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    #[serde(default)]
    pub scale: Scale,
    #[serde(default)]
    pub offset: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<Extract>,
}

impl Transform {
    pub fn linear(scale: Scale, offset: f64) -> Self {
        Self {
            scale,
            offset,
            extract: None,
        }
    }

    pub fn flag(extract: Extract) -> Self {
        Self {
            scale: Scale::unit(),
            offset: 0.0,
            extract: Some(extract),
        }
    }

    pub fn is_flag(&self) -> bool {
        self.extract.is_some()
    }

    /// Map a raw field integer to its physical value
    pub fn apply(&self, raw: i32) -> Value {
        match self.extract {
            Some(Extract::Bit(pos)) => Value::Flag((raw >> u32::from(pos)) & 1 == 1),
            Some(Extract::Mask(mask)) => Value::Flag(raw & i32::from(mask) != 0),
            None => {
                // in f64 so extreme scale terms cannot overflow
                let scaled = f64::from(raw) * self.scale.num as f64 / self.scale.den as f64;
                Value::Number(scaled + self.offset)
            }
        }
    }

    /// Inverse of [`Transform::apply`], saturated to `[min_raw, max_raw]`
    pub fn invert(&self, value: Value, min_raw: i32, max_raw: i32) -> i32 {
        let raw = match self.extract {
            Some(Extract::Bit(pos)) => {
                if value.as_f64() != 0.0 {
                    1i64 << pos
                } else {
                    0
                }
            }
            Some(Extract::Mask(mask)) => {
                if value.as_f64() != 0.0 {
                    // lowest bit of the mask, so a 0xFF mask encodes as 0x01
                    i64::from(mask & mask.wrapping_neg())
                } else {
                    0
                }
            }
            None => {
                let physical = value.as_f64() - self.offset;
                let raw = (physical * self.scale.den as f64 / self.scale.num as f64).round();
                if raw.is_nan() {
                    0
                } else {
                    raw as i64
                }
            }
        };
        raw.clamp(i64::from(min_raw), i64::from(max_raw)) as i32
    }
}

/// Fahrenheit from Celsius
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divide_is_exact_division() {
        let t = Transform::linear(Scale::divide_by(10), 0.0);
        assert_eq!(t.apply(271), Value::Number(27.1));
        assert_eq!(t.apply(-50), Value::Number(-5.0));
    }

    #[test]
    fn test_offset_and_multiply() {
        let offset = Transform::linear(Scale::divide_by(10), 900.0);
        let absolute = Transform::linear(Scale::multiply_by(10), 0.0);
        assert!((offset.apply(98).as_f64() - 909.8).abs() < 1e-9);
        assert_eq!(absolute.apply(98), Value::Number(980.0));
    }

    #[test]
    fn test_extreme_scale_terms() {
        let huge = Transform::linear(Scale::multiply_by(i64::MAX), 0.0);
        let v = huge.apply(i32::from(i16::MIN)).as_f64();
        assert!(v.is_finite() && v < 0.0);

        let tiny = Transform::linear(Scale::new(1, i64::MAX), 0.0);
        assert!(tiny.apply(i32::MAX).as_f64() < 1e-9);
        assert_eq!(huge.invert(Value::Number(1.0e30), 0, 65535), 65535);
    }

    #[test]
    fn test_flags() {
        let bit0 = Transform::flag(Extract::Bit(0));
        assert_eq!(bit0.apply(0x01), Value::Flag(true));
        assert_eq!(bit0.apply(0x02), Value::Flag(false));

        let mask = Transform::flag(Extract::Mask(0xFF));
        assert_eq!(mask.apply(0x00), Value::Flag(false));
        assert_eq!(mask.apply(0x40), Value::Flag(true));
    }

    #[test]
    fn test_invert() {
        let t = Transform::linear(Scale::divide_by(10), 0.0);
        assert_eq!(t.invert(Value::Number(27.1), i16::MIN.into(), i16::MAX.into()), 271);
        assert_eq!(t.invert(Value::Number(-5.0), i16::MIN.into(), i16::MAX.into()), -50);
        // saturates instead of wrapping
        assert_eq!(t.invert(Value::Number(1.0e9), 0, 65535), 65535);

        let p = Transform::linear(Scale::divide_by(10), 900.0);
        assert_eq!(p.invert(Value::Number(909.8), 0, 65535), 98);

        let mask = Transform::flag(Extract::Mask(0xFF));
        assert_eq!(mask.invert(Value::Flag(true), 0, 255), 1);
        let bit = Transform::flag(Extract::Bit(3));
        assert_eq!(bit.invert(Value::Flag(true), 0, 255), 8);
    }

    #[test]
    fn test_fahrenheit() {
        assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
    }

    #[test]
    fn test_transform_json_shape() {
        let t: Transform = serde_json::from_str(r#"{"scale":{"num":1,"den":100}}"#).unwrap();
        assert_eq!(t.scale, Scale::divide_by(100));
        assert_eq!(t.offset, 0.0);
        assert!(t.extract.is_none());

        let f: Transform = serde_json::from_str(r#"{"extract":{"bit":0}}"#).unwrap();
        assert_eq!(f.extract, Some(Extract::Bit(0)));
    }
}
