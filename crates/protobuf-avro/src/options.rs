use apache_avro::Schema;
use apache_avro::types::Value;
use prost_reflect::{DynamicMessage, MessageDescriptor, ReflectMessage};
use serde::{Deserialize, Serialize};

use crate::avro::value::{NULL_BRANCH, VALUE_BRANCH};
use crate::error::{DecodeError, EncodeError, SchemaInferenceError};
use crate::schema::SchemaInferrer;

/// What schema inference does once a message type has been re-entered more than
/// [`SchemaOptions::max_recursion_depth`] times along one path.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecursionLimit {
    /// Refer back to the nearest enclosing definition of the message, with a named reference.
    #[default]
    Reference,
    /// Fail with [`SchemaInferenceError::RecursionLimitExceeded`].
    Error,
}

/// Configuration for converting between protobuf messages and avro.
///
/// Read only once built, so a single instance can be shared between any number of concurrent
/// [`infer_schema`], [`encode`] and [`decode`] calls.
///
/// Deserializes from camelCase keys, with every key optional:
///
/// ```
/// let options: protobuf_avro::SchemaOptions =
///     serde_json::from_str(r#"{ "maxRecursionDepth": 2 }"#).unwrap();
///
/// assert!(options.use_union);
/// assert_eq!(options.max_recursion_depth, 2);
/// ```
///
/// [`infer_schema`]: SchemaOptions::infer_schema
/// [`encode`]: SchemaOptions::encode
/// [`decode`]: SchemaOptions::decode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchemaOptions {
    /// Tag values in nullable positions with their union branch. When false, bare values are
    /// emitted and branch resolution is left to the avro writer.
    pub use_union: bool,
    /// Number of times a message type can be re-entered along a single path and still be
    /// expanded inline.
    pub max_recursion_depth: usize,
    pub recursion_limit: RecursionLimit,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            use_union: true,
            max_recursion_depth: 0,
            recursion_limit: RecursionLimit::default(),
        }
    }
}

impl SchemaOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn use_union(mut self, use_union: bool) -> Self {
        self.use_union = use_union;
        self
    }

    pub fn max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    pub fn recursion_limit(mut self, limit: RecursionLimit) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Infers the avro schema for messages of type `descriptor`.
    #[tracing::instrument(level = "trace", skip_all, fields(type_name = descriptor.full_name()))]
    pub fn infer_schema(
        &self,
        descriptor: &MessageDescriptor,
    ) -> Result<Schema, SchemaInferenceError> {
        SchemaInferrer::new(self).infer(descriptor)
    }

    /// Encodes `message` into a value conforming to the schema inferred for its descriptor.
    #[tracing::instrument(
        level = "trace",
        skip_all,
        fields(type_name = message.descriptor().full_name())
    )]
    pub fn encode(&self, message: &DynamicMessage) -> Result<Value, EncodeError> {
        self.encode_root(message)
    }

    /// Decodes `value` into `message`, which should be freshly built from the descriptor the
    /// value's schema was inferred from.
    #[tracing::instrument(
        level = "trace",
        skip_all,
        fields(type_name = message.descriptor().full_name())
    )]
    pub fn decode(&self, value: &Value, message: &mut DynamicMessage) -> Result<(), DecodeError> {
        self.decode_root(value, message)
    }

    /// Wraps a present value for a nullable position.
    pub(crate) fn union_value(&self, value: Value) -> Value {
        if self.use_union {
            Value::Union(VALUE_BRANCH, Box::new(value))
        } else {
            value
        }
    }

    /// The value of an absent nullable position.
    pub(crate) fn null_value(&self) -> Value {
        if self.use_union {
            Value::Union(NULL_BRANCH, Box::new(Value::Null))
        } else {
            Value::Null
        }
    }
}
