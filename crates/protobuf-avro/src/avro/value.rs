//! Helpers over [`apache_avro::types::Value`], the generic value tree produced by encoding and
//! consumed by decoding.
use apache_avro::types::Value;

/// Union branch index of `null` in a nullable schema.
pub const NULL_BRANCH: u32 = 0;
/// Union branch index of the non-null type in a nullable schema.
pub const VALUE_BRANCH: u32 = 1;

/// Names the variant of a value, for error messages.
pub trait Shape {
    fn shape(&self) -> &'static str;
}

impl Shape for Value {
    fn shape(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Fixed(_, _) => "fixed",
            Value::Enum(_, _) => "enum",
            Value::Union(_, inner) => inner.shape(),
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
            Value::Date(_) => "date",
            Value::Decimal(_) => "decimal",
            Value::TimeMillis(_) => "time-millis",
            Value::TimeMicros(_) => "time-micros",
            Value::TimestampMillis(_) => "timestamp-millis",
            Value::TimestampMicros(_) => "timestamp-micros",
            Value::TimestampNanos(_) => "timestamp-nanos",
            Value::Duration(_) => "duration",
            Value::Uuid(_) => "uuid",
            Value::BigDecimal(_) => "big-decimal",
            Value::LocalTimestampMicros(_) => "local-timestamp-micros",
            Value::LocalTimestampMillis(_) => "local-timestamp-millis",
            Value::LocalTimestampNanos(_) => "local-timestamp-nanos",
        }
    }
}

/// Strips any union tagging, returning the branch value. Bare values are returned as is, so
/// decoding accepts both tagged and untagged input.
pub fn flatten_union(mut value: &Value) -> &Value {
    while let Value::Union(_, inner) = value {
        value = inner;
    }
    value
}

pub fn is_null(value: &Value) -> bool {
    matches!(flatten_union(value), Value::Null)
}

/// Looks up a record entry by field name.
pub fn record_entry<'a>(entries: &'a [(String, Value)], name: &str) -> Option<&'a Value> {
    entries
        .iter()
        .find(|(entry_name, _)| entry_name == name)
        .map(|(_, value)| value)
}
