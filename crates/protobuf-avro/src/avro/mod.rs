//! Constructors over [`apache_avro::Schema`], the schema model produced by inference.
use std::collections::BTreeMap;

use apache_avro::schema::{
    ArraySchema, EnumSchema, Name, RecordField, RecordFieldOrder, RecordSchema, UnionSchema,
};
use apache_avro::Schema;

use crate::error::SchemaInferenceError;

pub mod value;

/// Name of the key field in a map entry record.
pub const MAP_KEY: &str = "key";
/// Name of the value field in a map entry record.
pub const MAP_VALUE: &str = "value";

/// Parses a dotted full name (`pkg.Outer.Inner`) into an avro [`Name`], namespace included.
pub fn name(full_name: &str) -> Result<Name, SchemaInferenceError> {
    Name::new(full_name).map_err(|source| SchemaInferenceError::InvalidName {
        name: full_name.into(),
        source,
    })
}

/// Returns true if `schema` is a two branch union with `null` as its first branch.
pub fn is_nullable(schema: &Schema) -> bool {
    match schema {
        Schema::Union(union) => {
            let variants = union.variants();
            variants.len() == 2 && matches!(variants[0], Schema::Null)
        }
        _ => false,
    }
}

/// Wraps `schema` as `[null, schema]`. Already nullable schemas are returned as is, since
/// avro does not allow a union to directly contain another union.
pub fn nullable(schema: Schema) -> Result<Schema, SchemaInferenceError> {
    if is_nullable(&schema) {
        return Ok(schema);
    }

    let name = schema_name(&schema);

    UnionSchema::new(vec![Schema::Null, schema])
        .map(Schema::Union)
        .map_err(|source| SchemaInferenceError::InvalidUnion {
            name: name.into(),
            source,
        })
}

pub fn array(items: Schema) -> Schema {
    Schema::Array(ArraySchema {
        items: Box::new(items),
        attributes: BTreeMap::new(),
    })
}

pub fn reference(name: Name) -> Schema {
    Schema::Ref { name }
}

pub fn enumeration(name: Name, symbols: Vec<String>) -> Schema {
    Schema::Enum(EnumSchema {
        name,
        aliases: None,
        doc: None,
        symbols,
        default: None,
        attributes: BTreeMap::new(),
    })
}

/// Builds a record from `(field name, schema)` pairs, keeping their order. Nullable fields
/// default to `null`.
pub fn record<I>(name: Name, fields: I) -> Schema
where
    I: IntoIterator<Item = (String, Schema)>,
{
    let fields = fields
        .into_iter()
        .enumerate()
        .map(|(position, (name, schema))| record_field(position, name, schema))
        .collect::<Vec<_>>();

    let lookup = fields
        .iter()
        .map(|field| (field.name.clone(), field.position))
        .collect();

    Schema::Record(RecordSchema {
        name,
        aliases: None,
        doc: None,
        fields,
        lookup,
        attributes: BTreeMap::new(),
    })
}

fn record_field(position: usize, name: String, schema: Schema) -> RecordField {
    let default = is_nullable(&schema).then_some(serde_json::Value::Null);

    RecordField {
        name,
        doc: None,
        aliases: None,
        default,
        schema,
        order: RecordFieldOrder::Ascending,
        position,
        custom_attributes: BTreeMap::new(),
    }
}

/// Short human readable name for a schema, used in errors.
fn schema_name(schema: &Schema) -> String {
    match schema {
        Schema::Record(record) => record.name.fullname(None),
        Schema::Enum(enumeration) => enumeration.name.fullname(None),
        Schema::Ref { name } => name.fullname(None),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullable_is_idempotent() {
        let once = nullable(Schema::Long).unwrap();
        let twice = nullable(once.clone()).unwrap();

        assert_eq!(once, twice);
        assert!(is_nullable(&twice));

        let Schema::Union(union) = twice else {
            panic!("expected a union");
        };
        assert_eq!(union.variants(), &[Schema::Null, Schema::Long]);
    }

    #[test]
    fn test_record_defaults_nullable_fields() {
        let schema = record(
            name("test.v1.Thing").unwrap(),
            [
                ("id".to_owned(), Schema::Long),
                ("label".to_owned(), nullable(Schema::String).unwrap()),
            ],
        );

        let Schema::Record(record) = schema else {
            panic!("expected a record");
        };

        assert_eq!(record.name.namespace.as_deref(), Some("test.v1"));
        assert_eq!(record.name.name, "Thing");
        assert_eq!(record.lookup.get("label"), Some(&1));
        assert_eq!(record.fields[0].default, None);
        assert_eq!(record.fields[1].default, Some(serde_json::Value::Null));
    }

    #[test]
    fn test_invalid_name() {
        assert!(matches!(
            name("not a name"),
            Err(SchemaInferenceError::InvalidName { .. })
        ));
    }
}
