//! # lora-sensor-codec - Payload Codec for a LoRaWAN Environmental Sensor Node
//!
//! The node reports temperature, humidity, pressure and motion (and, on some
//! revisions, its last RSSI) in a fixed-size big-endian frame, and accepts a small
//! set of downlink commands. This crate translates between those bytes and
//! structured, validated values. It holds no state and performs no I/O.
//!
//! ## Features
//!
//! - Declarative [`PayloadSchema`]s, one per firmware revision, loadable from JSON
//! - Exact rational scaling, signed/unsigned fields and packed flag bits
//! - Inclusive range validation per field, reported alongside the readings
//! - All-or-nothing uplink decoding into a [`DecodeResult`]
//! - Downlink reset / force-read / set-interval encoding and lenient decoding
//!
//! ## Usage
//!
//! ```rust
//! use lora_sensor_codec::{decode_uplink, profiles, DownlinkCodec, DownlinkCommand};
//!
//! let result = decode_uplink(&[0x01, 0x0F, 0x01, 0xE2, 0x00, 0x62, 0x01, 0x00], &profiles::rev_b());
//! assert!(result.errors.is_empty());
//! assert_eq!(result.data.number("humidity"), Some(48.2));
//!
//! let frame = DownlinkCodec::encode(&DownlinkCommand::SetInterval(600));
//! assert_eq!(DownlinkCodec::decode(&frame), DownlinkCommand::SetInterval(600));
//! ```

pub mod constants;
pub mod downlink;
pub mod error;
pub mod logging;
pub mod payload;
pub mod uplink;
pub mod util;

pub use crate::error::{CodecError, CodecResult};
pub use crate::logging::{init_logger, init_logger_with_level, log_info};

pub use downlink::{
    DecodedDownlink, DownlinkCodec, DownlinkCommand, EncodeRequest, EncodedDownlink, MessageClass,
};
pub use payload::profiles;
pub use payload::{
    DerivedField, Extract, FieldSpec, PayloadSchema, Range, Scale, SchemaRegistry, Transform,
    Value,
};
pub use uplink::{
    decode_uplink, encode_uplink, flat_field_name, DecodeResult, DecodedData, FieldValue,
    UplinkDecoder, UplinkMetadata,
};
