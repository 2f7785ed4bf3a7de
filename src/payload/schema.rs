//! Declarative uplink layouts.
//!
//! A [`PayloadSchema`] describes one device revision's frame: its exact length and
//! an ordered list of [`FieldSpec`]s. Schemas are checked once at construction
//! (or deserialisation) and are immutable afterwards, so a decoder can trust every
//! field to lie inside the frame.

use crate::error::{CodecError, CodecResult};
use crate::payload::transform::{Extract, Scale, Transform};
use crate::payload::validator::Range;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// One field of an uplink frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub offset: usize,
    /// Width in bytes, 1 or 2
    pub width: usize,
    #[serde(default)]
    pub signed: bool,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl FieldSpec {
    /// Unsigned field with an identity transform and no range
    pub fn new(name: impl Into<String>, offset: usize, width: usize) -> Self {
        Self {
            name: name.into(),
            offset,
            width,
            signed: false,
            transform: Transform::default(),
            range: None,
            unit: None,
        }
    }

    pub fn signed(mut self) -> Self {
        self.signed = true;
        self
    }

    pub fn scaled(mut self, scale: Scale, offset: f64) -> Self {
        self.transform = Transform::linear(scale, offset);
        self
    }

    pub fn flag(mut self, extract: Extract) -> Self {
        self.transform = Transform::flag(extract);
        self
    }

    pub fn range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Smallest and largest raw integer the field can hold
    pub fn raw_bounds(&self) -> (i32, i32) {
        match (self.width, self.signed) {
            (1, false) => (0, u8::MAX.into()),
            (1, true) => (i8::MIN.into(), i8::MAX.into()),
            (_, false) => (0, u16::MAX.into()),
            (_, true) => (i16::MIN.into(), i16::MAX.into()),
        }
    }

    fn check(&self, total_length: usize) -> CodecResult<()> {
        if self.name.is_empty() {
            return Err(CodecError::InvalidSchema("field with empty name".into()));
        }
        if self.width != 1 && self.width != 2 {
            return Err(CodecError::InvalidSchema(format!(
                "field '{}' has width {}, expected 1 or 2",
                self.name, self.width
            )));
        }
        let end = self.offset.checked_add(self.width);
        if end.map_or(true, |end| end > total_length) {
            return Err(CodecError::InvalidSchema(format!(
                "field '{}' at offset {} does not fit a {} byte frame",
                self.name, self.offset, total_length
            )));
        }
        if !self.transform.scale.is_valid() {
            return Err(CodecError::InvalidSchema(format!(
                "field '{}' has a zero scale term",
                self.name
            )));
        }
        match self.transform.extract {
            Some(Extract::Bit(pos)) if usize::from(pos) >= self.width * 8 => {
                return Err(CodecError::InvalidSchema(format!(
                    "field '{}' extracts bit {} of a {}-byte field",
                    self.name, pos, self.width
                )));
            }
            // a mask must have at least one bit inside the field and none beyond it
            Some(Extract::Mask(mask)) if mask == 0 || u32::from(mask) >> (self.width * 8) != 0 => {
                return Err(CodecError::InvalidSchema(format!(
                    "field '{}' has mask 0x{:04X} outside its {}-byte width",
                    self.name, mask, self.width
                )));
            }
            _ => {}
        }
        if let Some(Range {
            min: Some(min),
            max: Some(max),
        }) = self.range
        {
            if min > max {
                return Err(CodecError::InvalidSchema(format!(
                    "field '{}' has range min {} above max {}",
                    self.name, min, max
                )));
            }
        }
        Ok(())
    }
}

/// Fields computed from other decoded fields rather than from raw bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DerivedField {
    /// `<from>_fahrenheit` from a Celsius field
    Fahrenheit { from: String },
}

impl DerivedField {
    pub fn source(&self) -> &str {
        match self {
            DerivedField::Fahrenheit { from } => from,
        }
    }

    pub fn output_name(&self) -> String {
        match self {
            DerivedField::Fahrenheit { from } => format!("{from}_fahrenheit"),
        }
    }
}

#[derive(Deserialize)]
struct SchemaDef {
    name: String,
    total_length: usize,
    fields: Vec<FieldSpec>,
    #[serde(default)]
    derived: Vec<DerivedField>,
}

impl TryFrom<SchemaDef> for PayloadSchema {
    type Error = CodecError;

    fn try_from(def: SchemaDef) -> Result<Self, Self::Error> {
        PayloadSchema::new(def.name, def.total_length, def.fields, def.derived)
    }
}

fn check_layout(
    total_length: usize,
    fields: &[FieldSpec],
    derived: &[DerivedField],
) -> CodecResult<()> {
    let mut seen = HashSet::new();
    for field in fields {
        field.check(total_length)?;
        if !seen.insert(field.name.as_str()) {
            return Err(CodecError::InvalidSchema(format!(
                "duplicate field '{}'",
                field.name
            )));
        }
    }

    for d in derived {
        let source = fields.iter().find(|f| f.name == d.source());
        match source {
            Some(f) if !f.transform.is_flag() => {}
            _ => {
                return Err(CodecError::InvalidSchema(format!(
                    "derived field '{}' needs a numeric source '{}'",
                    d.output_name(),
                    d.source()
                )))
            }
        }
        if seen.contains(d.output_name().as_str()) {
            return Err(CodecError::InvalidSchema(format!(
                "derived field '{}' shadows a declared field",
                d.output_name()
            )));
        }
    }
    Ok(())
}

/// Immutable layout of one uplink frame revision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SchemaDef")]
pub struct PayloadSchema {
    name: String,
    total_length: usize,
    fields: Vec<FieldSpec>,
    derived: Vec<DerivedField>,
}

impl PayloadSchema {
    /// Build a schema, rejecting fields that fall outside the frame, zero scales,
    /// duplicate names and derived fields without a numeric source.
    pub fn new(
        name: impl Into<String>,
        total_length: usize,
        fields: Vec<FieldSpec>,
        derived: Vec<DerivedField>,
    ) -> CodecResult<Self> {
        check_layout(total_length, &fields, &derived)?;

        Ok(Self {
            name: name.into(),
            total_length,
            fields,
            derived,
        })
    }

    /// Built-in layouts skip the checks; `profiles` tests run them through `new`.
    pub(crate) fn builtin(
        name: &str,
        total_length: usize,
        fields: Vec<FieldSpec>,
        derived: Vec<DerivedField>,
    ) -> Self {
        Self {
            name: name.to_string(),
            total_length,
            fields,
            derived,
        }
    }

    pub fn from_json_str(json: &str) -> CodecResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> CodecResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> CodecResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total_length(&self) -> usize {
        self.total_length
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn derived(&self) -> &[DerivedField] {
        &self.derived
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}
