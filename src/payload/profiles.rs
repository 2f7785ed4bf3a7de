//! Built-in payload schemas per node firmware revision, and a registry that maps
//! schema names and device EUIs to layouts.
//!
//! Field revisions in the wild disagree on byte positions and on the pressure
//! encoding, so every revision is its own schema. Which one applies is decided by
//! the caller (usually from the firmware version recorded at provisioning), never
//! by looking at payload bytes.
//!
//! | Name | Len | Pressure |
//! |------|-----|----------|
//! | `rev-a` | 6 | `raw / 10 + 900` |
//! | `rev-b` | 8 | `raw * 10` (absolute hPa sent divided by 10) |
//! | `rev-b-offset` | 8 | `raw / 10 + 900` |
//! | `rev-c-rssi` | 8 | `raw / 10 + 900`, plus RSSI |

use crate::constants::*;
use crate::error::{CodecError, CodecResult};
use crate::payload::schema::{DerivedField, FieldSpec, PayloadSchema};
use crate::payload::transform::{Extract, Scale};
use crate::payload::validator::Range;
use std::collections::{BTreeMap, HashMap};

pub const REV_A: &str = "rev-a";
pub const REV_B: &str = "rev-b";
pub const REV_B_OFFSET: &str = "rev-b-offset";
pub const REV_C_RSSI: &str = "rev-c-rssi";

/// Names of every built-in schema
pub const BUILTIN_NAMES: [&str; 4] = [REV_A, REV_B, REV_B_OFFSET, REV_C_RSSI];

fn temperature(scale: Scale) -> FieldSpec {
    FieldSpec::new("temperature", 0, 2)
        .signed()
        .scaled(scale, 0.0)
        .range(Range::new(TEMPERATURE_MIN, TEMPERATURE_MAX))
        .unit("°C")
}

fn humidity(offset: usize, width: usize, scale: Scale) -> FieldSpec {
    FieldSpec::new("humidity", offset, width)
        .scaled(scale, 0.0)
        .range(Range::new(HUMIDITY_MIN, HUMIDITY_MAX))
        .unit("%")
}

fn pressure(offset: usize, scale: Scale, add: f64) -> FieldSpec {
    FieldSpec::new("pressure", offset, 2)
        .scaled(scale, add)
        .range(Range::new(PRESSURE_MIN, PRESSURE_MAX))
        .unit("hPa")
}

fn fahrenheit() -> Vec<DerivedField> {
    vec![DerivedField::Fahrenheit {
        from: "temperature".into(),
    }]
}

/// First-generation 6-byte frame: centi-degrees, half-percent humidity byte, motion byte
pub fn rev_a() -> PayloadSchema {
    PayloadSchema::builtin(
        REV_A,
        6,
        vec![
            temperature(Scale::divide_by(100)),
            humidity(2, 1, Scale::divide_by(2)),
            pressure(3, Scale::divide_by(10), 900.0),
            FieldSpec::new("motion", 5, 1).flag(Extract::Mask(0xFF)),
        ],
        fahrenheit(),
    )
}

/// 8-byte frame of the current firmware: deci-degrees, deci-percent, pressure/10,
/// motion in bit 0 of byte 6, byte 7 reserved
pub fn rev_b() -> PayloadSchema {
    PayloadSchema::builtin(
        REV_B,
        8,
        vec![
            temperature(Scale::divide_by(10)),
            humidity(2, 2, Scale::divide_by(10)),
            pressure(4, Scale::multiply_by(10), 0.0),
            FieldSpec::new("motion", 6, 1).flag(Extract::Bit(0)),
        ],
        fahrenheit(),
    )
}

/// Same layout as `rev-b` with the older offset pressure encoding
pub fn rev_b_offset() -> PayloadSchema {
    PayloadSchema::builtin(
        REV_B_OFFSET,
        8,
        vec![
            temperature(Scale::divide_by(10)),
            humidity(2, 2, Scale::divide_by(10)),
            pressure(4, Scale::divide_by(10), 900.0),
            FieldSpec::new("motion", 6, 1).flag(Extract::Bit(0)),
        ],
        fahrenheit(),
    )
}

/// `rev-a` layout followed by the node's last received RSSI as an i16
pub fn rev_c_rssi() -> PayloadSchema {
    PayloadSchema::builtin(
        REV_C_RSSI,
        8,
        vec![
            temperature(Scale::divide_by(100)),
            humidity(2, 1, Scale::divide_by(2)),
            pressure(3, Scale::divide_by(10), 900.0),
            FieldSpec::new("motion", 5, 1).flag(Extract::Mask(0xFF)),
            FieldSpec::new("rssi", 6, 2)
                .signed()
                .range(Range::new(RSSI_MIN, RSSI_MAX))
                .unit("dBm"),
        ],
        fahrenheit(),
    )
}

/// Look up a built-in schema by name
pub fn builtin(name: &str) -> Option<PayloadSchema> {
    match name {
        REV_A => Some(rev_a()),
        REV_B => Some(rev_b()),
        REV_B_OFFSET => Some(rev_b_offset()),
        REV_C_RSSI => Some(rev_c_rssi()),
        _ => None,
    }
}

/// Caller-owned set of named schemas plus a device-to-schema assignment table
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, PayloadSchema>,
    devices: HashMap<String, String>,
    default_schema: Option<String>,
}

impl SchemaRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with every built-in revision
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for schema in [rev_a(), rev_b(), rev_b_offset(), rev_c_rssi()] {
            registry.register(schema);
        }
        registry
    }

    /// Add or replace a schema under its own name
    pub fn register(&mut self, schema: PayloadSchema) {
        self.schemas.insert(schema.name().to_string(), schema);
    }

    pub fn get(&self, name: &str) -> CodecResult<&PayloadSchema> {
        self.schemas
            .get(name)
            .ok_or_else(|| CodecError::UnknownSchema(name.to_string()))
    }

    /// Sorted schema names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Bind a device to a registered schema
    pub fn assign_device(
        &mut self,
        device: impl Into<String>,
        schema_name: &str,
    ) -> CodecResult<()> {
        self.get(schema_name)?;
        self.devices.insert(device.into(), schema_name.to_string());
        Ok(())
    }

    /// Schema used for devices without an assignment
    pub fn set_default(&mut self, schema_name: &str) -> CodecResult<()> {
        self.get(schema_name)?;
        self.default_schema = Some(schema_name.to_string());
        Ok(())
    }

    /// The device's assigned schema, else the default
    pub fn for_device(&self, device: &str) -> CodecResult<&PayloadSchema> {
        match self.devices.get(device).or(self.default_schema.as_ref()) {
            Some(name) => self.get(name),
            None => Err(CodecError::UnknownSchema(format!(
                "no schema assigned to device {device}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_pass_schema_checks() {
        for name in BUILTIN_NAMES {
            let schema = builtin(name).unwrap();
            let checked = PayloadSchema::new(
                schema.name(),
                schema.total_length(),
                schema.fields().to_vec(),
                schema.derived().to_vec(),
            )
            .unwrap();
            assert_eq!(checked, schema);
        }
        assert!(builtin("rev-z").is_none());
    }

    #[test]
    fn test_pressure_revisions_differ() {
        let absolute = rev_b();
        let offset = rev_b_offset();
        assert_eq!(
            absolute.field("pressure").unwrap().offset,
            offset.field("pressure").unwrap().offset
        );
        assert_ne!(
            absolute.field("pressure").unwrap().transform,
            offset.field("pressure").unwrap().transform
        );
    }

    #[test]
    fn test_registry_lookup() {
        let registry = SchemaRegistry::with_builtin();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec![REV_A, REV_B, REV_B_OFFSET, REV_C_RSSI]);
        assert_eq!(registry.get(REV_A).unwrap().total_length(), 6);
        assert!(matches!(
            registry.get("nope"),
            Err(CodecError::UnknownSchema(_))
        ));
    }

    #[test]
    fn test_device_assignment() {
        let mut registry = SchemaRegistry::with_builtin();
        assert!(registry.for_device("70B3D57ED0000001").is_err());

        registry.assign_device("70B3D57ED0000001", REV_A).unwrap();
        registry.set_default(REV_B).unwrap();
        assert_eq!(registry.for_device("70B3D57ED0000001").unwrap().name(), REV_A);
        assert_eq!(registry.for_device("other").unwrap().name(), REV_B);

        assert!(registry.assign_device("x", "missing").is_err());
    }
}
