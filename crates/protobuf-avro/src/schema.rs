//! Avro schema inference over message descriptors.
use std::collections::HashSet;

use apache_avro::Schema;
use prost_reflect::{EnumDescriptor, FieldDescriptor, Kind, MessageDescriptor};

use crate::avro;
use crate::error::SchemaInferenceError;
use crate::map;
use crate::options::{RecursionLimit, SchemaOptions};
use crate::wkt::WellKnownType;

/// Per-call state of a single schema inference.
pub(crate) struct SchemaInferrer<'a> {
    options: &'a SchemaOptions,
    /// Avro names already defined. Any later occurrence becomes a reference, since avro
    /// requires each named type to be defined exactly once.
    defined: HashSet<String>,
    /// Messages currently being expanded, outermost first, as `(protobuf full name, avro name)`.
    path: Vec<(String, String)>,
}

impl<'a> SchemaInferrer<'a> {
    pub(crate) fn new(options: &'a SchemaOptions) -> Self {
        Self {
            options,
            defined: HashSet::new(),
            path: Vec::new(),
        }
    }

    pub(crate) fn infer(
        mut self,
        descriptor: &MessageDescriptor,
    ) -> Result<Schema, SchemaInferenceError> {
        match WellKnownType::from_descriptor(descriptor) {
            Some(wkt) => wkt.schema(),
            None => self.infer_message(descriptor, 0),
        }
    }

    /// Infers the record for `descriptor`, expanded at `recursion_index`.
    fn infer_message(
        &mut self,
        descriptor: &MessageDescriptor,
        recursion_index: usize,
    ) -> Result<Schema, SchemaInferenceError> {
        let full_name = descriptor.full_name();
        let avro_name = indexed_name(full_name, recursion_index);

        if !self.defined.insert(avro_name.clone()) {
            return Ok(avro::reference(avro::name(&avro_name)?));
        }

        let name = avro::name(&avro_name)?;
        tracing::trace!(type_name = full_name, record = avro_name.as_str(), "inferring record");

        self.path.push((full_name.to_owned(), avro_name));
        let fields = self.infer_fields(descriptor, recursion_index);
        self.path.pop();

        Ok(avro::record(name, fields?))
    }

    fn infer_fields(
        &mut self,
        descriptor: &MessageDescriptor,
        recursion_index: usize,
    ) -> Result<Vec<(String, Schema)>, SchemaInferenceError> {
        let mut fields = Vec::new();

        for field in descriptor.fields() {
            let schema = self.infer_field(&field, recursion_index)?;
            fields.push((field.name().to_owned(), schema));
        }

        Ok(fields)
    }

    fn infer_field(
        &mut self,
        field: &FieldDescriptor,
        recursion_index: usize,
    ) -> Result<Schema, SchemaInferenceError> {
        if field.is_map() {
            return self.infer_map(field, recursion_index);
        }

        let kind = self.infer_kind(field, recursion_index)?;

        // proto2 optionals, oneof members and proto3 `optional` can all be absent
        if field.is_list() {
            Ok(avro::array(kind))
        } else if field.supports_presence() {
            avro::nullable(kind)
        } else {
            Ok(kind)
        }
    }

    fn infer_map(
        &mut self,
        field: &FieldDescriptor,
        recursion_index: usize,
    ) -> Result<Schema, SchemaInferenceError> {
        let entry = map::entry_descriptor(field);
        let entry_name = indexed_name(entry.full_name(), recursion_index);

        if !self.defined.insert(entry_name.clone()) {
            let reference = avro::reference(avro::name(&entry_name)?);
            return avro::nullable(avro::array(reference));
        }

        let key = self.infer_kind(&entry.map_entry_key_field(), recursion_index)?;
        let value = self.infer_kind(&entry.map_entry_value_field(), recursion_index)?;

        map::schema(&entry_name, key, value)
    }

    fn infer_kind(
        &mut self,
        field: &FieldDescriptor,
        recursion_index: usize,
    ) -> Result<Schema, SchemaInferenceError> {
        Ok(match field.kind() {
            Kind::Double => Schema::Double,
            Kind::Float => Schema::Float,
            Kind::Int32
            | Kind::Sint32
            | Kind::Sfixed32
            | Kind::Uint32
            | Kind::Fixed32 => Schema::Int,
            Kind::Int64
            | Kind::Sint64
            | Kind::Sfixed64
            | Kind::Uint64
            | Kind::Fixed64 => Schema::Long,
            Kind::Bool => Schema::Boolean,
            Kind::String => Schema::String,
            Kind::Bytes => Schema::Bytes,
            Kind::Enum(descriptor) => self.infer_enum(&descriptor)?,
            Kind::Message(descriptor) => {
                return self.infer_message_kind(field, &descriptor, recursion_index);
            }
        })
    }

    fn infer_enum(&mut self, descriptor: &EnumDescriptor) -> Result<Schema, SchemaInferenceError> {
        let full_name = descriptor.full_name();
        let name = avro::name(full_name)?;

        if !self.defined.insert(full_name.to_owned()) {
            return Ok(avro::reference(name));
        }

        let symbols = descriptor
            .values()
            .map(|value| value.name().to_owned())
            .collect::<Vec<_>>();

        if symbols.is_empty() {
            return Err(SchemaInferenceError::EmptyEnum(full_name.into()));
        }

        Ok(avro::enumeration(name, symbols))
    }

    /// A message typed field: the well-known schema, or a nullable record, or past the
    /// recursion bound a nullable reference to the nearest enclosing expansion.
    fn infer_message_kind(
        &mut self,
        field: &FieldDescriptor,
        descriptor: &MessageDescriptor,
        recursion_index: usize,
    ) -> Result<Schema, SchemaInferenceError> {
        if let Some(wkt) = WellKnownType::from_descriptor(descriptor) {
            return wkt.schema();
        }

        let full_name = descriptor.full_name();
        let enclosing = self
            .path
            .iter()
            .rev()
            .find(|(proto_name, _)| proto_name == full_name)
            .map(|(_, avro_name)| avro_name.clone());

        let Some(enclosing) = enclosing else {
            return avro::nullable(self.infer_message(descriptor, recursion_index)?);
        };

        let recursion_index = recursion_index + 1;
        let max_depth = self.options.max_recursion_depth;

        if recursion_index <= max_depth {
            return avro::nullable(self.infer_message(descriptor, recursion_index)?);
        }

        match self.options.recursion_limit {
            RecursionLimit::Reference => {
                tracing::debug!(
                    field = field.full_name(),
                    reference = enclosing.as_str(),
                    max_depth,
                    "recursion limit reached, referencing enclosing record"
                );
                avro::nullable(avro::reference(avro::name(&enclosing)?))
            }
            RecursionLimit::Error => Err(SchemaInferenceError::RecursionLimitExceeded {
                field: field.full_name().into(),
                message: full_name.into(),
                max_depth,
            }),
        }
    }
}

/// Records expanded below a recursion get the depth as a suffix, to keep avro names unique.
fn indexed_name(full_name: &str, recursion_index: usize) -> String {
    match recursion_index {
        0 => full_name.to_owned(),
        n => format!("{full_name}_{n}"),
    }
}
