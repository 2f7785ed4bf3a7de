//! Uplink frame decoding
//!
//! [`UplinkDecoder`] turns one sensor frame into readings, derived values and
//! per-field validity flags, following the schema it is handed. Decoding is
//! all-or-nothing: any failure yields empty data and a human readable entry in
//! `errors`, never a partially filled result.
//!
//! ```rust
//! use lora_sensor_codec::payload::profiles;
//! use lora_sensor_codec::uplink::UplinkDecoder;
//!
//! let schema = profiles::rev_b();
//! let result = UplinkDecoder::new().decode_bytes(&[0x01, 0x0F, 0x01, 0xE2, 0x00, 0x62, 0x01, 0x00], &schema);
//! assert!(result.is_ok());
//! assert_eq!(result.data.number("temperature"), Some(27.1));
//! assert_eq!(result.data.flag("motion"), Some(true));
//! ```

use crate::error::{CodecError, CodecResult};
use crate::logging::{log_frame_hex, log_warn};
use crate::payload::reader::read_raw;
use crate::payload::schema::{DerivedField, PayloadSchema};
use crate::payload::transform::{celsius_to_fahrenheit, Value};
use crate::payload::validator::validate;
use crate::util::hex::format_hex_compact;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Gateway-side values copied into the result without interpretation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UplinkMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rssi: Option<f64>,
}

impl UplinkMetadata {
    fn is_empty(&self) -> bool {
        self.gateway_id.is_none() && self.snr.is_none() && self.rssi.is_none()
    }
}

/// Decoded readings and validity of one frame, in schema order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedData {
    /// Field and derived-field values
    pub readings: Vec<(String, Value)>,
    /// `<field>_valid` for every field declaring a range
    pub status: Vec<(String, bool)>,
    /// Space separated lowercase hex of the frame
    pub raw_payload: Option<String>,
    pub metadata: Option<UplinkMetadata>,
}

impl DecodedData {
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
            && self.status.is_empty()
            && self.raw_payload.is_none()
            && self.metadata.is_none()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.readings
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            Value::Number(v) => Some(v),
            Value::Flag(_) => None,
        }
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name)?.as_bool()
    }

    /// Validity of a ranged field, looked up by field name
    pub fn is_valid(&self, field: &str) -> Option<bool> {
        let key = format!("{field}_valid");
        self.status.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }
}

impl Serialize for DecodedData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (name, value) in &self.readings {
            map.serialize_entry(name, value)?;
        }
        if !self.status.is_empty() {
            let status: serde_json::Map<String, serde_json::Value> = self
                .status
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::Bool(*v)))
                .collect();
            map.serialize_entry("status", &status)?;
        }
        if let Some(raw) = &self.raw_payload {
            map.serialize_entry("raw_payload", raw)?;
        }
        if let Some(meta) = &self.metadata {
            map.serialize_entry("metadata", meta)?;
        }
        map.end()
    }
}

/// Dashboard name of a reading: upper-case, with `_FAHRENHEIT` shortened to `_F`
pub fn flat_field_name(name: &str) -> String {
    match name.strip_suffix("_fahrenheit") {
        Some(base) => format!("{base}_f").to_uppercase(),
        None => name.to_uppercase(),
    }
}

/// One entry of the flat dashboard representation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValue {
    pub field: String,
    pub value: serde_json::Value,
}

/// Outcome of one decode call. Exactly one of `data` and `errors` is populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecodeResult {
    pub data: DecodedData,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl DecodeResult {
    fn success(data: DecodedData) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn failure(error: CodecError) -> Self {
        Self {
            data: DecodedData::default(),
            warnings: Vec::new(),
            errors: vec![error.to_string()],
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Flat `{field, value}` list named by [`flat_field_name`], flags as 1/0.
    /// Empty on failure.
    pub fn to_fields(&self) -> Vec<FieldValue> {
        if !self.is_ok() {
            return Vec::new();
        }
        let entry = |field: &str, value: serde_json::Value| FieldValue {
            field: flat_field_name(field),
            value,
        };
        let flag = |b: bool| serde_json::Value::from(u8::from(b));

        let mut fields = Vec::new();
        for (name, value) in &self.data.readings {
            let v = match value {
                Value::Number(n) => serde_json::Value::from(*n),
                Value::Flag(b) => flag(*b),
            };
            fields.push(entry(name, v));
        }
        for (name, valid) in &self.data.status {
            fields.push(entry(name, flag(*valid)));
        }
        if let Some(raw) = &self.data.raw_payload {
            fields.push(entry("raw_payload", raw.clone().into()));
        }
        if let Some(meta) = &self.data.metadata {
            if let Some(id) = &meta.gateway_id {
                fields.push(entry("gateway_id", id.clone().into()));
            }
            if let Some(snr) = meta.snr {
                fields.push(entry("snr", snr.into()));
            }
            if let Some(rssi) = meta.rssi {
                fields.push(entry("gateway_rssi", rssi.into()));
            }
        }
        fields
    }
}

/// Stateless uplink decoder
#[derive(Debug, Clone, Copy)]
pub struct UplinkDecoder {
    include_raw_payload: bool,
}

impl Default for UplinkDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl UplinkDecoder {
    pub fn new() -> Self {
        Self {
            include_raw_payload: true,
        }
    }

    /// Toggle the `raw_payload` debug string
    pub fn with_raw_payload(mut self, enabled: bool) -> Self {
        self.include_raw_payload = enabled;
        self
    }

    /// Decode a frame; `None` models input that is not a byte sequence at all
    pub fn decode(&self, buf: Option<&[u8]>, schema: &PayloadSchema) -> DecodeResult {
        self.finish(schema, buf.ok_or(CodecError::InvalidInputFormat), None)
    }

    pub fn decode_bytes(&self, buf: &[u8], schema: &PayloadSchema) -> DecodeResult {
        self.finish(schema, Ok(buf), None)
    }

    /// Decode and attach gateway metadata to a successful result
    pub fn decode_with_metadata(
        &self,
        buf: &[u8],
        schema: &PayloadSchema,
        metadata: UplinkMetadata,
    ) -> DecodeResult {
        self.finish(schema, Ok(buf), Some(metadata))
    }

    fn finish(
        &self,
        schema: &PayloadSchema,
        buf: CodecResult<&[u8]>,
        metadata: Option<UplinkMetadata>,
    ) -> DecodeResult {
        match buf.and_then(|b| self.try_decode(b, schema)) {
            Ok(mut data) => {
                data.metadata = metadata.filter(|m| !m.is_empty());
                DecodeResult::success(data)
            }
            Err(e) => {
                log_warn(&format!("rejected {} uplink: {}", schema.name(), e));
                DecodeResult::failure(e)
            }
        }
    }

    fn try_decode(&self, buf: &[u8], schema: &PayloadSchema) -> CodecResult<DecodedData> {
        if buf.len() != schema.total_length() {
            return Err(CodecError::LengthMismatch {
                expected: schema.total_length(),
                actual: buf.len(),
            });
        }
        log_frame_hex(schema.name(), buf);

        let mut readings = Vec::with_capacity(schema.fields().len() + schema.derived().len());
        for field in schema.fields() {
            let raw = read_raw(buf, field.offset, field.width, field.signed)?;
            readings.push((field.name.clone(), field.transform.apply(raw)));
        }

        for derived in schema.derived() {
            let source = readings
                .iter()
                .find(|(n, _)| n == derived.source())
                .map(|(_, v)| *v);
            let Some(Value::Number(celsius)) = source else {
                return Err(CodecError::InvalidSchema(format!(
                    "derived field '{}' has no numeric source",
                    derived.output_name()
                )));
            };
            let value = match derived {
                DerivedField::Fahrenheit { .. } => celsius_to_fahrenheit(celsius),
            };
            readings.push((derived.output_name(), Value::Number(value)));
        }

        // primary readings line up with schema fields; derived ones follow and are skipped
        let status = schema
            .fields()
            .iter()
            .zip(&readings)
            .filter_map(|(field, (_, value))| {
                let range = field.range.as_ref()?;
                Some((
                    format!("{}_valid", field.name),
                    validate(value.as_f64(), Some(range)),
                ))
            })
            .collect();

        log::debug!(
            "decoded {} uplink: {} readings",
            schema.name(),
            readings.len()
        );

        Ok(DecodedData {
            readings,
            status,
            raw_payload: self.include_raw_payload.then(|| format_hex_compact(buf)),
            metadata: None,
        })
    }
}

/// Decode with the default decoder
pub fn decode_uplink(buf: &[u8], schema: &PayloadSchema) -> DecodeResult {
    UplinkDecoder::new().decode_bytes(buf, schema)
}

/// Pack physical values into a frame, the way the node firmware does
///
/// Fields not named in `values` stay zero. Values outside a field's raw range
/// saturate. Flags sharing a byte are OR-ed together.
pub fn encode_uplink(schema: &PayloadSchema, values: &[(&str, Value)]) -> CodecResult<Vec<u8>> {
    let mut frame = vec![0u8; schema.total_length()];
    for (name, value) in values {
        let field = schema
            .field(name)
            .ok_or_else(|| CodecError::UnknownField(name.to_string()))?;
        let (lo, hi) = field.raw_bounds();
        let raw = field.transform.invert(*value, lo, hi);
        let bytes = frame
            .get_mut(field.offset..field.offset + field.width)
            .ok_or(CodecError::OutOfRange {
                offset: field.offset,
                width: field.width,
                len: schema.total_length(),
            })?;
        let encoded: Vec<u8> = match field.width {
            1 => vec![raw as u8],
            _ => (raw as u16).to_be_bytes().to_vec(),
        };
        for (dst, src) in bytes.iter_mut().zip(encoded) {
            if field.transform.is_flag() {
                *dst |= src;
            } else {
                *dst = src;
            }
        }
    }
    Ok(frame)
}
