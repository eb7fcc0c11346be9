//! Error types for schema inference, encoding and decoding.

/// Umbrella error, for callers that drive all three operations and want a single type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaInferenceError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaInferenceError {
    #[error("'{name}' is not a valid avro name: {source}")]
    InvalidName {
        name: Box<str>,
        #[source]
        source: apache_avro::Error,
    },
    #[error("could not build a nullable union for '{name}': {source}")]
    InvalidUnion {
        name: Box<str>,
        #[source]
        source: apache_avro::Error,
    },
    #[error("enum '{0}' declares no values")]
    EmptyEnum(Box<str>),
    #[error(
        "field '{field}' re-enters message '{message}' past the maximum recursion depth of {max_depth}"
    )]
    RecursionLimitExceeded {
        field: Box<str>,
        message: Box<str>,
        max_depth: usize,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("field '{field}' expected a {expected} value, found {found}")]
    KindMismatch {
        field: Box<str>,
        expected: &'static str,
        found: &'static str,
    },
    #[error("field '{field}' holds enum number {number}, which '{enum_name}' does not declare")]
    UnknownEnumValue {
        field: Box<str>,
        enum_name: Box<str>,
        number: i32,
    },
    #[error("{type_name}: {source}")]
    WellKnownType {
        type_name: &'static str,
        #[source]
        source: prost::DecodeError,
    },
    #[error("{type_name}: marshal: {source}")]
    Json {
        type_name: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{type_name}: {reason}")]
    OutOfRange {
        type_name: &'static str,
        reason: Box<str>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("field '{field}' expected {expected}, found {found}")]
    Mismatch {
        field: Box<str>,
        expected: &'static str,
        found: &'static str,
    },
    #[error("field '{field}': {value} does not fit in {target}")]
    Overflow {
        field: Box<str>,
        value: i64,
        target: &'static str,
    },
    #[error("missing '{key}' in map entry for '{field}'")]
    MissingMapEntryKey { field: Box<str>, key: &'static str },
    #[error("expected a map entry record for '{field}', found {found}")]
    MalformedMapEntry {
        field: Box<str>,
        found: &'static str,
    },
    #[error("field '{0}' cannot hold null elements")]
    NullElement(Box<str>),
    #[error("field '{field}': '{symbol}' is not a symbol of '{enum_name}'")]
    UnknownEnumSymbol {
        field: Box<str>,
        enum_name: Box<str>,
        symbol: Box<str>,
    },
    #[error("{type_name}: {source}")]
    WellKnownType {
        type_name: &'static str,
        #[source]
        source: prost::DecodeError,
    },
    #[error("{type_name}: unmarshal: {source}")]
    Json {
        type_name: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{type_name}: {reason}")]
    OutOfRange {
        type_name: &'static str,
        reason: Box<str>,
    },
    #[error("could not set field '{field}': {source}")]
    SetField {
        field: Box<str>,
        #[source]
        source: prost_reflect::SetFieldError,
    },
}

impl DecodeError {
    /// `context` is the full name of the field (or root message) being decoded.
    pub(crate) fn mismatch(
        context: &str,
        expected: &'static str,
        found: &apache_avro::types::Value,
    ) -> Self {
        use crate::avro::value::Shape;

        Self::Mismatch {
            field: context.into(),
            expected,
            found: found.shape(),
        }
    }

    pub(crate) fn overflow(context: &str, value: i64, target: &'static str) -> Self {
        Self::Overflow {
            field: context.into(),
            value,
            target,
        }
    }
}
