//! Decoding of avro values back into messages.
//!
//! Decoding is lenient about representation. Union tagging is optional, numeric types widen
//! where no precision can be lost, and enums can be given by symbol as a plain string.
use apache_avro::types::Value;
use bytes::Bytes;
use prost_reflect::{
    DynamicMessage, EnumDescriptor, FieldDescriptor, Kind, ReflectMessage, Value as ReflectValue,
};

use crate::avro::value::flatten_union;
use crate::error::DecodeError;
use crate::options::SchemaOptions;
use crate::wkt::{Payload, WellKnownType};

impl SchemaOptions {
    pub(crate) fn decode_root(
        &self,
        value: &Value,
        message: &mut DynamicMessage,
    ) -> Result<(), DecodeError> {
        let descriptor = message.descriptor();

        match WellKnownType::from_descriptor(&descriptor) {
            Some(wkt) => {
                if let Some(decoded) = wkt.decode(value, descriptor, wkt.full_name())? {
                    *message = decoded;
                }
                Ok(())
            }
            None => self.decode_record(value, message),
        }
    }

    /// Decodes record entries into the fields of the same name. Entries without a matching
    /// field are skipped, fields without an entry are left as they are.
    pub(crate) fn decode_record(
        &self,
        value: &Value,
        message: &mut DynamicMessage,
    ) -> Result<(), DecodeError> {
        let descriptor = message.descriptor();

        let Value::Record(entries) = flatten_union(value) else {
            return Err(DecodeError::mismatch(descriptor.full_name(), "record", value));
        };

        for (name, entry) in entries {
            match descriptor.get_field_by_name(name) {
                Some(field) => self.decode_field(message, &field, entry)?,
                None => tracing::debug!(
                    type_name = descriptor.full_name(),
                    entry = name.as_str(),
                    "skipping record entry with no matching field"
                ),
            }
        }

        Ok(())
    }

    fn decode_field(
        &self,
        message: &mut DynamicMessage,
        field: &FieldDescriptor,
        value: &Value,
    ) -> Result<(), DecodeError> {
        if field.is_map() {
            return self.decode_map(message, field, value);
        }

        let value = flatten_union(value);
        if matches!(value, Value::Null) {
            return Ok(());
        }

        let kind = field.kind();

        let decoded = if field.is_list() {
            let Value::Array(items) = value else {
                return Err(DecodeError::mismatch(field.full_name(), "array", value));
            };

            let items = items
                .iter()
                .map(|item| match flatten_union(item) {
                    Value::Null => Err(DecodeError::NullElement(field.full_name().into())),
                    item => self.decode_kind(&kind, item, field.full_name()),
                })
                .collect::<Result<Vec<_>, _>>()?;

            ReflectValue::List(items)
        } else {
            self.decode_kind(&kind, value, field.full_name())?
        };

        set_field(message, field, decoded)
    }

    /// Decodes a single non-null value of `kind`. `context` names the field, for errors.
    pub(crate) fn decode_kind(
        &self,
        kind: &Kind,
        value: &Value,
        context: &str,
    ) -> Result<ReflectValue, DecodeError> {
        let value = flatten_union(value);

        Ok(match kind {
            Kind::Double => ReflectValue::F64(double_value(value, context)?),
            Kind::Float => ReflectValue::F32(float_value(value, context)?),
            Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => {
                ReflectValue::I32(int_value(value, context)?)
            }
            Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => {
                ReflectValue::I64(long_value(value, context)?)
            }
            Kind::Uint32 | Kind::Fixed32 => ReflectValue::U32(uint_value(value, context)?),
            Kind::Uint64 | Kind::Fixed64 => ReflectValue::U64(ulong_value(value, context)?),
            Kind::Bool => ReflectValue::Bool(bool_value(value, context)?),
            Kind::String => ReflectValue::String(string_value(value, context)?),
            Kind::Bytes => ReflectValue::Bytes(Bytes::from(bytes_value(value, context)?)),
            Kind::Enum(descriptor) => {
                ReflectValue::EnumNumber(enum_value(descriptor, value, context)?)
            }
            Kind::Message(descriptor) => match WellKnownType::from_descriptor(descriptor) {
                Some(wkt) => ReflectValue::Message(
                    Payload::from_avro(wkt, value, context)?.into_message(wkt, descriptor.clone())?,
                ),
                None => {
                    let mut message = DynamicMessage::new(descriptor.clone());
                    self.decode_record(value, &mut message)?;
                    ReflectValue::Message(message)
                }
            },
        })
    }
}

pub(crate) fn set_field(
    message: &mut DynamicMessage,
    field: &FieldDescriptor,
    value: ReflectValue,
) -> Result<(), DecodeError> {
    message
        .try_set_field(field, value)
        .map_err(|source| DecodeError::SetField {
            field: field.full_name().into(),
            source,
        })
}

pub(crate) fn double_value(value: &Value, context: &str) -> Result<f64, DecodeError> {
    match *value {
        Value::Double(v) => Ok(v),
        Value::Float(v) => Ok(v as f64),
        _ => Err(DecodeError::mismatch(context, "double", value)),
    }
}

/// A `double` is only accepted when it converts to `f32` exactly.
pub(crate) fn float_value(value: &Value, context: &str) -> Result<f32, DecodeError> {
    match *value {
        Value::Float(v) => Ok(v),
        Value::Double(v) if v.is_nan() || f64::from(v as f32) == v => Ok(v as f32),
        _ => Err(DecodeError::mismatch(context, "float", value)),
    }
}

pub(crate) fn int_value(value: &Value, context: &str) -> Result<i32, DecodeError> {
    match *value {
        Value::Int(v) => Ok(v),
        Value::Long(v) => i32::try_from(v).map_err(|_| DecodeError::overflow(context, v, "int")),
        _ => Err(DecodeError::mismatch(context, "int", value)),
    }
}

/// Reverses the reinterpretation of `uint32` as a signed avro `int`.
pub(crate) fn uint_value(value: &Value, context: &str) -> Result<u32, DecodeError> {
    match *value {
        Value::Int(v) => Ok(v as u32),
        Value::Long(v) => u32::try_from(v).map_err(|_| DecodeError::overflow(context, v, "uint32")),
        _ => Err(DecodeError::mismatch(context, "int", value)),
    }
}

pub(crate) fn long_value(value: &Value, context: &str) -> Result<i64, DecodeError> {
    match *value {
        Value::Long(v) => Ok(v),
        Value::Int(v) => Ok(v as i64),
        _ => Err(DecodeError::mismatch(context, "long", value)),
    }
}

/// Reverses the reinterpretation of `uint64` as a signed avro `long`.
pub(crate) fn ulong_value(value: &Value, context: &str) -> Result<u64, DecodeError> {
    long_value(value, context).map(|v| v as u64)
}

pub(crate) fn bool_value(value: &Value, context: &str) -> Result<bool, DecodeError> {
    match *value {
        Value::Boolean(v) => Ok(v),
        _ => Err(DecodeError::mismatch(context, "boolean", value)),
    }
}

pub(crate) fn string_value(value: &Value, context: &str) -> Result<String, DecodeError> {
    match value {
        Value::String(v) => Ok(v.clone()),
        _ => Err(DecodeError::mismatch(context, "string", value)),
    }
}

pub(crate) fn bytes_value(value: &Value, context: &str) -> Result<Vec<u8>, DecodeError> {
    match value {
        Value::Bytes(v) | Value::Fixed(_, v) => Ok(v.clone()),
        _ => Err(DecodeError::mismatch(context, "bytes", value)),
    }
}

fn enum_value(
    descriptor: &EnumDescriptor,
    value: &Value,
    context: &str,
) -> Result<i32, DecodeError> {
    let symbol = match value {
        Value::Enum(_, symbol) | Value::String(symbol) => symbol,
        _ => return Err(DecodeError::mismatch(context, "enum", value)),
    };

    descriptor
        .get_value_by_name(symbol)
        .map(|value| value.number())
        .ok_or_else(|| DecodeError::UnknownEnumSymbol {
            field: context.into(),
            enum_name: descriptor.full_name().into(),
            symbol: symbol.as_str().into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_widening() {
        assert_eq!(long_value(&Value::Int(-3), "f").unwrap(), -3);
        assert_eq!(double_value(&Value::Float(0.5), "f").unwrap(), 0.5);
        assert_eq!(int_value(&Value::Long(42), "f").unwrap(), 42);
        assert_eq!(uint_value(&Value::Int(-1), "f").unwrap(), u32::MAX);
        assert_eq!(ulong_value(&Value::Long(-1), "f").unwrap(), u64::MAX);
    }

    #[test]
    fn test_float_from_double_must_be_exact() {
        assert_eq!(float_value(&Value::Double(-0.25), "f").unwrap(), -0.25);
        assert!(float_value(&Value::Double(f64::NAN), "f").unwrap().is_nan());
        assert_eq!(
            float_value(&Value::Double(f64::INFINITY), "f").unwrap(),
            f32::INFINITY
        );

        let err = float_value(&Value::Double(0.1), "pkg.M.ratio").unwrap_err();
        assert!(
            matches!(err, DecodeError::Mismatch { expected: "float", found: "double", .. }),
            "{err:?}"
        );
    }

    #[test]
    fn test_narrowing_overflow() {
        let err = int_value(&Value::Long(i64::from(i32::MAX) + 1), "pkg.M.count").unwrap_err();

        assert!(
            matches!(
                err,
                DecodeError::Overflow { ref field, value: 2_147_483_648, target: "int" }
                    if &**field == "pkg.M.count"
            ),
            "{err:?}"
        );
        assert!(uint_value(&Value::Long(-1), "f").is_err());
    }

    #[test]
    fn test_scalar_mismatch() {
        let err = bool_value(&Value::String("true".to_owned()), "pkg.M.flag").unwrap_err();

        assert!(matches!(
            err,
            DecodeError::Mismatch { expected: "boolean", found: "string", .. }
        ));
    }
}
