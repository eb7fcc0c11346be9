//! Typed payloads of the well-known types, between a [`DynamicMessage`] and an avro [`Value`].
use apache_avro::types::Value;
use prost::Message;
use prost_reflect::{DynamicMessage, MessageDescriptor};

use super::WellKnownType;
use super::time::{self, RangeError};
use crate::avro::value::flatten_union;
use crate::decode as scalar;
use crate::error::{DecodeError, EncodeError};

/// `google.type.Date`
#[derive(Clone, Copy, PartialEq, Eq, Message)]
pub struct Date {
    #[prost(int32, tag = "1")]
    pub year: i32,
    #[prost(int32, tag = "2")]
    pub month: i32,
    #[prost(int32, tag = "3")]
    pub day: i32,
}

/// `google.type.TimeOfDay`
#[derive(Clone, Copy, PartialEq, Eq, Message)]
pub struct TimeOfDay {
    #[prost(int32, tag = "1")]
    pub hours: i32,
    #[prost(int32, tag = "2")]
    pub minutes: i32,
    #[prost(int32, tag = "3")]
    pub seconds: i32,
    #[prost(int32, tag = "4")]
    pub nanos: i32,
}

/// The content of a well-known message, in the one shape each type allows.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Double(f64),
    Float(f32),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    Timestamp(prost_types::Timestamp),
    Duration(prost_types::Duration),
    Date(Date),
    TimeOfDay(TimeOfDay),
    /// Canonical protobuf JSON, for `Any`, `Struct` and `Value`.
    Json(String),
}

impl Payload {
    pub fn from_message(wkt: WellKnownType, message: &DynamicMessage) -> Result<Self, EncodeError> {
        let type_name = wkt.full_name();

        macro_rules! transcode {
            ($ty:ty) => {
                message
                    .transcode_to::<$ty>()
                    .map_err(|source| EncodeError::WellKnownType { type_name, source })?
            };
        }

        Ok(match wkt {
            WellKnownType::DoubleValue => Self::Double(transcode!(f64)),
            WellKnownType::FloatValue => Self::Float(transcode!(f32)),
            WellKnownType::Int32Value => Self::Int32(transcode!(i32)),
            WellKnownType::UInt32Value => Self::UInt32(transcode!(u32)),
            WellKnownType::Int64Value => Self::Int64(transcode!(i64)),
            WellKnownType::UInt64Value => Self::UInt64(transcode!(u64)),
            WellKnownType::BoolValue => Self::Bool(transcode!(bool)),
            WellKnownType::StringValue => Self::String(transcode!(String)),
            WellKnownType::BytesValue => Self::Bytes(transcode!(Vec<u8>)),
            WellKnownType::Timestamp => Self::Timestamp(transcode!(prost_types::Timestamp)),
            WellKnownType::Duration => Self::Duration(transcode!(prost_types::Duration)),
            WellKnownType::Date => Self::Date(transcode!(Date)),
            WellKnownType::TimeOfDay => Self::TimeOfDay(transcode!(TimeOfDay)),
            WellKnownType::Any | WellKnownType::Struct | WellKnownType::Value => {
                let json = serde_json::to_string(message)
                    .map_err(|source| EncodeError::Json { type_name, source })?;
                Self::Json(json)
            }
        })
    }

    pub fn into_avro(self, wkt: WellKnownType) -> Result<Value, EncodeError> {
        let out_of_range = |RangeError(reason): RangeError| EncodeError::OutOfRange {
            type_name: wkt.full_name(),
            reason,
        };

        Ok(match self {
            Self::Double(v) => Value::Double(v),
            Self::Float(v) => Value::Float(v),
            Self::Int32(v) => Value::Int(v),
            Self::UInt32(v) => Value::Int(v as i32),
            Self::Int64(v) => Value::Long(v),
            Self::UInt64(v) => Value::Long(v as i64),
            Self::Bool(v) => Value::Boolean(v),
            Self::String(v) | Self::Json(v) => Value::String(v),
            Self::Bytes(v) => Value::Bytes(v),
            Self::Timestamp(ts) => {
                Value::TimestampMicros(time::timestamp_to_micros(&ts).map_err(out_of_range)?)
            }
            Self::Duration(d) => Value::Float(time::duration_to_seconds(&d).map_err(out_of_range)?),
            Self::Date(d) => Value::Date(time::date_to_days(&d).map_err(out_of_range)?),
            Self::TimeOfDay(t) => Value::TimeMicros(time::time_of_day_to_micros(&t)),
        })
    }

    /// Reads the payload of `wkt` out of a non-null avro value. `context` names the field
    /// being decoded, for errors.
    pub fn from_avro(wkt: WellKnownType, value: &Value, context: &str) -> Result<Self, DecodeError> {
        let out_of_range = |RangeError(reason): RangeError| DecodeError::OutOfRange {
            type_name: wkt.full_name(),
            reason,
        };

        let value = flatten_union(value);

        Ok(match wkt {
            WellKnownType::DoubleValue => Self::Double(scalar::double_value(value, context)?),
            WellKnownType::FloatValue => Self::Float(scalar::float_value(value, context)?),
            WellKnownType::Int32Value => Self::Int32(scalar::int_value(value, context)?),
            WellKnownType::UInt32Value => Self::UInt32(scalar::uint_value(value, context)?),
            WellKnownType::Int64Value => Self::Int64(scalar::long_value(value, context)?),
            WellKnownType::UInt64Value => Self::UInt64(scalar::ulong_value(value, context)?),
            WellKnownType::BoolValue => Self::Bool(scalar::bool_value(value, context)?),
            WellKnownType::StringValue => Self::String(scalar::string_value(value, context)?),
            WellKnownType::BytesValue => Self::Bytes(scalar::bytes_value(value, context)?),
            WellKnownType::Any | WellKnownType::Struct | WellKnownType::Value => {
                Self::Json(scalar::string_value(value, context)?)
            }
            WellKnownType::Timestamp => Self::Timestamp(match *value {
                Value::TimestampMicros(micros) | Value::Long(micros) => {
                    time::micros_to_timestamp(micros)
                }
                Value::TimestampMillis(millis) => {
                    let micros = millis
                        .checked_mul(1_000)
                        .ok_or_else(|| DecodeError::overflow(context, millis, "timestamp-micros"))?;
                    time::micros_to_timestamp(micros)
                }
                Value::TimestampNanos(nanos) => time::nanos_to_timestamp(nanos),
                _ => return Err(DecodeError::mismatch(context, "timestamp-micros", value)),
            }),
            WellKnownType::Duration => {
                let seconds = match *value {
                    Value::Float(seconds) => seconds as f64,
                    Value::Double(seconds) => seconds,
                    _ => return Err(DecodeError::mismatch(context, "float", value)),
                };
                Self::Duration(time::seconds_to_duration(seconds).map_err(out_of_range)?)
            }
            WellKnownType::Date => match *value {
                Value::Date(days) | Value::Int(days) => {
                    Self::Date(time::days_to_date(days).map_err(out_of_range)?)
                }
                _ => return Err(DecodeError::mismatch(context, "date", value)),
            },
            WellKnownType::TimeOfDay => {
                let micros = match *value {
                    Value::TimeMicros(micros) | Value::Long(micros) => micros,
                    Value::TimeMillis(millis) => millis as i64 * 1_000,
                    _ => return Err(DecodeError::mismatch(context, "time-micros", value)),
                };
                Self::TimeOfDay(time::micros_to_time_of_day(micros).map_err(out_of_range)?)
            }
        })
    }

    /// Builds a message of type `descriptor` holding this payload.
    pub fn into_message(
        self,
        wkt: WellKnownType,
        descriptor: MessageDescriptor,
    ) -> Result<DynamicMessage, DecodeError> {
        let type_name = wkt.full_name();

        let encoded = match self {
            Self::Json(json) => {
                let mut deserializer = serde_json::Deserializer::from_str(&json);
                let message = DynamicMessage::deserialize(descriptor, &mut deserializer)
                    .and_then(|message| deserializer.end().map(|()| message))
                    .map_err(|source| DecodeError::Json { type_name, source })?;
                return Ok(message);
            }
            Self::Double(v) => v.encode_to_vec(),
            Self::Float(v) => v.encode_to_vec(),
            Self::Int32(v) => v.encode_to_vec(),
            Self::UInt32(v) => v.encode_to_vec(),
            Self::Int64(v) => v.encode_to_vec(),
            Self::UInt64(v) => v.encode_to_vec(),
            Self::Bool(v) => v.encode_to_vec(),
            Self::String(v) => v.encode_to_vec(),
            Self::Bytes(v) => v.encode_to_vec(),
            Self::Timestamp(v) => v.encode_to_vec(),
            Self::Duration(v) => v.encode_to_vec(),
            Self::Date(v) => v.encode_to_vec(),
            Self::TimeOfDay(v) => v.encode_to_vec(),
        };

        DynamicMessage::decode(descriptor, encoded.as_slice())
            .map_err(|source| DecodeError::WellKnownType { type_name, source })
    }
}
