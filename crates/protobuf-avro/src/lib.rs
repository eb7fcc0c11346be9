//! Conversion between protobuf messages and the avro data model.
//!
//! Three operations, all driven by a message descriptor:
//!
//! - [`infer_schema`] builds the avro [`Schema`] for a message type.
//! - [`encode`] walks a [`DynamicMessage`] into an avro [`Value`] conforming to that schema.
//! - [`decode`] writes such a value back into a message.
//!
//! The free functions use [`SchemaOptions::default`]. Build a [`SchemaOptions`] to change how
//! nullable values are tagged, or how recursive message types are cut off.
//!
//! Nothing here reads or writes avro bytes. Values are handed to (or taken from) an
//! `apache_avro` writer or reader along with the inferred schema.
//!
//! [`Schema`]: apache_avro::Schema
//! [`Value`]: apache_avro::types::Value
//! [`DynamicMessage`]: prost_reflect::DynamicMessage
use apache_avro::Schema;
use apache_avro::types::Value;
use prost_reflect::{DynamicMessage, MessageDescriptor};

pub mod avro;
mod decode;
mod encode;
mod error;
mod map;
mod options;
mod schema;
pub mod wkt;

pub use error::{DecodeError, EncodeError, Error, SchemaInferenceError};
pub use options::{RecursionLimit, SchemaOptions};
pub use wkt::WellKnownType;

pub type Result<T> = core::result::Result<T, Error>;

/// Infers the avro schema for `descriptor` with the default options.
pub fn infer_schema(descriptor: &MessageDescriptor) -> Result<Schema> {
    SchemaOptions::default()
        .infer_schema(descriptor)
        .map_err(Error::from)
}

/// Encodes `message` with the default options.
pub fn encode(message: &DynamicMessage) -> Result<Value> {
    SchemaOptions::default().encode(message).map_err(Error::from)
}

/// Decodes `value` into `message` with the default options.
pub fn decode(value: &Value, message: &mut DynamicMessage) -> Result<()> {
    SchemaOptions::default()
        .decode(value, message)
        .map_err(Error::from)
}
