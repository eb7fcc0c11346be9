//! Encoding of live messages into avro values.
use apache_avro::types::Value;
use prost_reflect::{
    DynamicMessage, EnumDescriptor, FieldDescriptor, Kind, ReflectMessage, Value as ReflectValue,
};

use crate::error::EncodeError;
use crate::options::SchemaOptions;
use crate::wkt::WellKnownType;

impl SchemaOptions {
    pub(crate) fn encode_root(&self, message: &DynamicMessage) -> Result<Value, EncodeError> {
        match WellKnownType::from_descriptor(&message.descriptor()) {
            Some(wkt) => wkt.encode(self, message),
            None => self.encode_record(message),
        }
    }

    /// Encodes every field of `message`, set or not, in declaration order.
    pub(crate) fn encode_record(&self, message: &DynamicMessage) -> Result<Value, EncodeError> {
        let descriptor = message.descriptor();
        let mut entries = Vec::new();

        for field in descriptor.fields() {
            let value = self.encode_field(message, &field)?;
            entries.push((field.name().to_owned(), value));
        }

        Ok(Value::Record(entries))
    }

    fn encode_field(
        &self,
        message: &DynamicMessage,
        field: &FieldDescriptor,
    ) -> Result<Value, EncodeError> {
        if field.is_map() {
            return self.encode_map(message, field);
        }

        let kind = field.kind();
        let has_presence = !field.is_list() && field.supports_presence();
        let is_message = matches!(kind, Kind::Message(_));

        if has_presence && !message.has_field(field) {
            return Ok(self.null_value());
        }

        let value = message.get_field(field);

        if field.is_list() {
            let items = value.as_list().ok_or_else(|| EncodeError::KindMismatch {
                field: field.full_name().into(),
                expected: "list",
                found: reflect_value_name(&value),
            })?;

            return items
                .iter()
                .map(|item| self.encode_kind(field, &kind, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array);
        }

        let encoded = self.encode_kind(field, &kind, &value)?;

        // message kinds come back already wrapped for their nullable schema
        if has_presence && !is_message {
            Ok(self.union_value(encoded))
        } else {
            Ok(encoded)
        }
    }

    /// Encodes a single value of `kind`. `field` is only used to name errors.
    pub(crate) fn encode_kind(
        &self,
        field: &FieldDescriptor,
        kind: &Kind,
        value: &ReflectValue,
    ) -> Result<Value, EncodeError> {
        Ok(match (kind, value) {
            (Kind::Double, ReflectValue::F64(v)) => Value::Double(*v),
            (Kind::Float, ReflectValue::F32(v)) => Value::Float(*v),
            (Kind::Int32 | Kind::Sint32 | Kind::Sfixed32, ReflectValue::I32(v)) => Value::Int(*v),
            (Kind::Int64 | Kind::Sint64 | Kind::Sfixed64, ReflectValue::I64(v)) => Value::Long(*v),
            (Kind::Uint32 | Kind::Fixed32, ReflectValue::U32(v)) => Value::Int(*v as i32),
            (Kind::Uint64 | Kind::Fixed64, ReflectValue::U64(v)) => Value::Long(*v as i64),
            (Kind::Bool, ReflectValue::Bool(v)) => Value::Boolean(*v),
            (Kind::String, ReflectValue::String(v)) => Value::String(v.clone()),
            (Kind::Bytes, ReflectValue::Bytes(v)) => Value::Bytes(v.to_vec()),
            (Kind::Enum(descriptor), ReflectValue::EnumNumber(number)) => {
                encode_enum(field, descriptor, *number)?
            }
            (Kind::Message(descriptor), ReflectValue::Message(message)) => {
                match WellKnownType::from_descriptor(descriptor) {
                    Some(wkt) => wkt.encode(self, message)?,
                    None => self.union_value(self.encode_record(message)?),
                }
            }
            (kind, value) => {
                return Err(EncodeError::KindMismatch {
                    field: field.full_name().into(),
                    expected: kind_name(kind),
                    found: reflect_value_name(value),
                });
            }
        })
    }
}

fn encode_enum(
    field: &FieldDescriptor,
    descriptor: &EnumDescriptor,
    number: i32,
) -> Result<Value, EncodeError> {
    descriptor
        .values()
        .enumerate()
        .find(|(_, value)| value.number() == number)
        .map(|(index, value)| Value::Enum(index as u32, value.name().to_owned()))
        .ok_or_else(|| EncodeError::UnknownEnumValue {
            field: field.full_name().into(),
            enum_name: descriptor.full_name().into(),
            number,
        })
}

pub(crate) fn kind_name(kind: &Kind) -> &'static str {
    match kind {
        Kind::Double => "double",
        Kind::Float => "float",
        Kind::Int32 => "int32",
        Kind::Int64 => "int64",
        Kind::Uint32 => "uint32",
        Kind::Uint64 => "uint64",
        Kind::Sint32 => "sint32",
        Kind::Sint64 => "sint64",
        Kind::Fixed32 => "fixed32",
        Kind::Fixed64 => "fixed64",
        Kind::Sfixed32 => "sfixed32",
        Kind::Sfixed64 => "sfixed64",
        Kind::Bool => "bool",
        Kind::String => "string",
        Kind::Bytes => "bytes",
        Kind::Message(_) => "message",
        Kind::Enum(_) => "enum",
    }
}

pub(crate) fn reflect_value_name(value: &ReflectValue) -> &'static str {
    match value {
        ReflectValue::Bool(_) => "bool",
        ReflectValue::I32(_) => "i32",
        ReflectValue::I64(_) => "i64",
        ReflectValue::U32(_) => "u32",
        ReflectValue::U64(_) => "u64",
        ReflectValue::F32(_) => "f32",
        ReflectValue::F64(_) => "f64",
        ReflectValue::String(_) => "string",
        ReflectValue::Bytes(_) => "bytes",
        ReflectValue::EnumNumber(_) => "enum number",
        ReflectValue::Message(_) => "message",
        ReflectValue::List(_) => "list",
        ReflectValue::Map(_) => "map",
    }
}
