//! Message types with a canonical, non-record avro representation.
//!
//! Each well-known type is mapped to a nullable primitive or logical avro type, instead of the
//! record its descriptor would otherwise infer to. Wrappers become their wrapped primitive, the
//! time-like types become avro logical types, and `Any`, `Struct` and `Value` are carried as
//! their protobuf JSON text.
use apache_avro::Schema;
use apache_avro::types::Value;
use prost_reflect::{DynamicMessage, MessageDescriptor};

use crate::avro::{self, value::is_null};
use crate::error::{DecodeError, EncodeError, SchemaInferenceError};
use crate::options::SchemaOptions;

mod payload;
pub mod time;

pub use payload::{Date, Payload, TimeOfDay};

macro_rules! well_known_types {
    ($($variant:ident => $full_name:literal),* $(,)?) => {
        /// A message type handled by this module, keyed by its protobuf full name.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum WellKnownType {
            $($variant,)*
        }

        impl WellKnownType {
            pub const ALL: &'static [Self] = &[$(Self::$variant,)*];

            pub const fn full_name(self) -> &'static str {
                match self {
                    $(Self::$variant => $full_name,)*
                }
            }

            pub fn from_full_name(full_name: &str) -> Option<Self> {
                match full_name {
                    $($full_name => Some(Self::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

well_known_types! {
    Any => "google.protobuf.Any",
    Struct => "google.protobuf.Struct",
    Value => "google.protobuf.Value",
    DoubleValue => "google.protobuf.DoubleValue",
    FloatValue => "google.protobuf.FloatValue",
    Int32Value => "google.protobuf.Int32Value",
    Int64Value => "google.protobuf.Int64Value",
    UInt32Value => "google.protobuf.UInt32Value",
    UInt64Value => "google.protobuf.UInt64Value",
    BoolValue => "google.protobuf.BoolValue",
    StringValue => "google.protobuf.StringValue",
    BytesValue => "google.protobuf.BytesValue",
    Timestamp => "google.protobuf.Timestamp",
    Duration => "google.protobuf.Duration",
    Date => "google.type.Date",
    TimeOfDay => "google.type.TimeOfDay",
}

impl WellKnownType {
    pub fn from_descriptor(descriptor: &MessageDescriptor) -> Option<Self> {
        Self::from_full_name(descriptor.full_name())
    }

    /// The non-null avro type a present value of this type is encoded as.
    pub fn avro_type(self) -> Schema {
        match self {
            Self::Any | Self::Struct | Self::Value | Self::StringValue => Schema::String,
            Self::DoubleValue => Schema::Double,
            Self::FloatValue | Self::Duration => Schema::Float,
            Self::Int32Value | Self::UInt32Value => Schema::Int,
            Self::Int64Value | Self::UInt64Value => Schema::Long,
            Self::BoolValue => Schema::Boolean,
            Self::BytesValue => Schema::Bytes,
            Self::Timestamp => Schema::TimestampMicros,
            Self::Date => Schema::Date,
            Self::TimeOfDay => Schema::TimeMicros,
        }
    }

    /// Schema of a field of this type. Always nullable, since a message field can be unset.
    pub fn schema(self) -> Result<Schema, SchemaInferenceError> {
        avro::nullable(self.avro_type())
    }

    /// Encodes a present message of this type, wrapped for its nullable schema.
    pub fn encode(
        self,
        options: &SchemaOptions,
        message: &DynamicMessage,
    ) -> Result<Value, EncodeError> {
        let value = Payload::from_message(self, message)?.into_avro(self)?;
        Ok(options.union_value(value))
    }

    /// Decodes `value` into a new message of type `descriptor`. Null decodes to `None`, leaving
    /// the field it was read for unset.
    pub fn decode(
        self,
        value: &Value,
        descriptor: MessageDescriptor,
        context: &str,
    ) -> Result<Option<DynamicMessage>, DecodeError> {
        if is_null(value) {
            return Ok(None);
        }

        let message = Payload::from_avro(self, value, context)?.into_message(self, descriptor)?;
        Ok(Some(message))
    }
}
