//! Map fields, carried as a nullable array of `{key, value}` entry records.
//!
//! Entries are sorted by the text of their key, so the same map always encodes to the same
//! array regardless of hash order. The sort is by text for every key type, so `10` sorts
//! before `2`.
use std::collections::HashMap;

use apache_avro::Schema;
use apache_avro::types::Value;
use prost_reflect::{
    DynamicMessage, FieldDescriptor, Kind, MapKey, MessageDescriptor, Value as ReflectValue,
};

use crate::avro::value::{Shape, flatten_union, record_entry};
use crate::avro::{self, MAP_KEY, MAP_VALUE};
use crate::decode::set_field;
use crate::encode::reflect_value_name;
use crate::error::{DecodeError, EncodeError, SchemaInferenceError};
use crate::options::SchemaOptions;

/// The synthetic entry message of a map field.
pub(crate) fn entry_descriptor(field: &FieldDescriptor) -> MessageDescriptor {
    match field.kind() {
        Kind::Message(entry) => entry,
        kind => unreachable!("map field {} has non-message kind {kind:?}", field.full_name()),
    }
}

/// `[null, array<record name {key, value}>]`
pub(crate) fn schema(
    entry_name: &str,
    key: Schema,
    value: Schema,
) -> Result<Schema, SchemaInferenceError> {
    let entry = avro::record(
        avro::name(entry_name)?,
        [(MAP_KEY.to_owned(), key), (MAP_VALUE.to_owned(), value)],
    );

    avro::nullable(avro::array(entry))
}

/// Canonical text of a key, which entries are ordered by.
pub(crate) fn key_text(key: &MapKey) -> String {
    match key {
        MapKey::Bool(v) => v.to_string(),
        MapKey::I32(v) => v.to_string(),
        MapKey::I64(v) => v.to_string(),
        MapKey::U32(v) => v.to_string(),
        MapKey::U64(v) => v.to_string(),
        MapKey::String(v) => v.clone(),
    }
}

fn key_value(key: &MapKey) -> ReflectValue {
    match key {
        MapKey::Bool(v) => ReflectValue::Bool(*v),
        MapKey::I32(v) => ReflectValue::I32(*v),
        MapKey::I64(v) => ReflectValue::I64(*v),
        MapKey::U32(v) => ReflectValue::U32(*v),
        MapKey::U64(v) => ReflectValue::U64(*v),
        MapKey::String(v) => ReflectValue::String(v.clone()),
    }
}

fn to_map_key(value: ReflectValue) -> Option<MapKey> {
    Some(match value {
        ReflectValue::Bool(v) => MapKey::Bool(v),
        ReflectValue::I32(v) => MapKey::I32(v),
        ReflectValue::I64(v) => MapKey::I64(v),
        ReflectValue::U32(v) => MapKey::U32(v),
        ReflectValue::U64(v) => MapKey::U64(v),
        ReflectValue::String(v) => MapKey::String(v),
        _ => return None,
    })
}

/// Returns the entries of `map`, ordered by [`key_text`].
pub(crate) fn sorted_entries(
    map: &HashMap<MapKey, ReflectValue>,
) -> Vec<(&MapKey, &ReflectValue)> {
    let mut entries = map
        .iter()
        .map(|(key, value)| (key_text(key), key, value))
        .collect::<Vec<_>>();

    entries.sort_by(|(a, _, _), (b, _, _)| a.cmp(b));

    entries
        .into_iter()
        .map(|(_, key, value)| (key, value))
        .collect()
}

impl SchemaOptions {
    pub(crate) fn encode_map(
        &self,
        message: &DynamicMessage,
        field: &FieldDescriptor,
    ) -> Result<Value, EncodeError> {
        let entry = entry_descriptor(field);
        let key_field = entry.map_entry_key_field();
        let value_field = entry.map_entry_value_field();
        let (key_kind, value_kind) = (key_field.kind(), value_field.kind());

        let value = message.get_field(field);
        let map = value.as_map().ok_or_else(|| EncodeError::KindMismatch {
            field: field.full_name().into(),
            expected: "map",
            found: reflect_value_name(&value),
        })?;

        let mut entries = Vec::with_capacity(map.len());

        for (key, value) in sorted_entries(map) {
            let key = self.encode_kind(&key_field, &key_kind, &key_value(key))?;
            let value = self.encode_kind(&value_field, &value_kind, value)?;

            entries.push(Value::Record(vec![
                (MAP_KEY.to_owned(), key),
                (MAP_VALUE.to_owned(), value),
            ]));
        }

        Ok(self.union_value(Value::Array(entries)))
    }

    pub(crate) fn decode_map(
        &self,
        message: &mut DynamicMessage,
        field: &FieldDescriptor,
        value: &Value,
    ) -> Result<(), DecodeError> {
        let value = flatten_union(value);

        let items = match value {
            Value::Null => return Ok(()),
            Value::Array(items) => items,
            _ => return Err(DecodeError::mismatch(field.full_name(), "array", value)),
        };

        let entry = entry_descriptor(field);
        let (key_kind, value_kind) = (
            entry.map_entry_key_field().kind(),
            entry.map_entry_value_field().kind(),
        );

        let mut map = HashMap::with_capacity(items.len());

        for item in items {
            let Value::Record(entries) = flatten_union(item) else {
                return Err(DecodeError::MalformedMapEntry {
                    field: field.full_name().into(),
                    found: item.shape(),
                });
            };

            let entry_field = |key: &'static str| {
                record_entry(entries, key)
                    .map(flatten_union)
                    .ok_or_else(|| DecodeError::MissingMapEntryKey {
                        field: field.full_name().into(),
                        key,
                    })
            };

            let (key, value) = (entry_field(MAP_KEY)?, entry_field(MAP_VALUE)?);

            if matches!(key, Value::Null) || matches!(value, Value::Null) {
                return Err(DecodeError::NullElement(field.full_name().into()));
            }

            let decoded_key = self.decode_kind(&key_kind, key, field.full_name())?;
            let map_key = to_map_key(decoded_key)
                .ok_or_else(|| DecodeError::mismatch(field.full_name(), "map key", key))?;

            let decoded_value = self.decode_kind(&value_kind, value, field.full_name())?;
            map.insert(map_key, decoded_value);
        }

        set_field(message, field, ReflectValue::Map(map))
    }
}
