//! The payload module contains the layout-driven pieces of uplink decoding: byte
//! extraction, schemas, the transform engine and range validation.

pub mod profiles;
pub mod reader;
pub mod schema;
pub mod transform;
pub mod validator;

pub use profiles::SchemaRegistry;
pub use reader::{read_bit, read_i16_be, read_raw, read_u16_be, read_u8};
pub use schema::{DerivedField, FieldSpec, PayloadSchema};
pub use transform::{celsius_to_fahrenheit, Extract, Scale, Transform, Value};
pub use validator::{is_in_range, validate, Range};
