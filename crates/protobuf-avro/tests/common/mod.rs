#![allow(dead_code)]
use std::sync::LazyLock;

use apache_avro::types::Value;
use prost::Message;
use prost_reflect::{DescriptorPool, DynamicMessage, MessageDescriptor, ReflectMessage};
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, MessageOptions, OneofDescriptorProto,
};

pub const PACKAGE: &str = "test.v1";

static POOL: LazyLock<DescriptorPool> = LazyLock::new(|| {
    let mut pool = DescriptorPool::global();

    for file in [date_file(), time_of_day_file(), fixtures_file(), legacy_file()] {
        pool.add_file_descriptor_proto(file)
            .expect("fixture descriptors should be valid");
    }

    pool
});

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn pool() -> &'static DescriptorPool {
    &POOL
}

/// Looks up `name` in the fixture package, or by full name if it contains a dot.
pub fn message(name: &str) -> MessageDescriptor {
    let full_name = if name.contains('.') {
        name.to_owned()
    } else {
        format!("{PACKAGE}.{name}")
    };

    pool()
        .get_message_by_name(&full_name)
        .unwrap_or_else(|| panic!("no message named {full_name}"))
}

/// Messages compared by their canonical JSON, which ignores map ordering and fields
/// explicitly set to their default value.
#[track_caller]
pub fn assert_same_message(left: &DynamicMessage, right: &DynamicMessage) {
    assert_eq!(left.descriptor(), right.descriptor());
    assert_eq!(
        serde_json::to_value(left).unwrap(),
        serde_json::to_value(right).unwrap()
    );
}

/// Builds a well-known message of type `name` from its typed prost counterpart.
pub fn typed_message<T: Message>(name: &str, value: &T) -> DynamicMessage {
    DynamicMessage::decode(message(name), value.encode_to_vec().as_slice()).unwrap()
}

/// Returns the entry `name` of an encoded record.
#[track_caller]
pub fn entry<'a>(record: &'a Value, name: &str) -> &'a Value {
    let Value::Record(entries) = record else {
        panic!("expected a record, found {record:?}");
    };

    entries
        .iter()
        .find(|(entry_name, _)| entry_name == name)
        .map(|(_, value)| value)
        .unwrap_or_else(|| panic!("record has no entry {name}"))
}

fn field(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_owned()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(ty as i32),
        ..Default::default()
    }
}

fn typed_field(name: &str, number: i32, ty: Type, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        type_name: Some(format!(".{type_name}")),
        ..field(name, number, ty)
    }
}

fn message_field(name: &str, number: i32, type_name: &str) -> FieldDescriptorProto {
    typed_field(name, number, Type::Message, type_name)
}

fn repeated(field: FieldDescriptorProto) -> FieldDescriptorProto {
    FieldDescriptorProto {
        label: Some(Label::Repeated as i32),
        ..field
    }
}

fn in_oneof(field: FieldDescriptorProto, index: i32) -> FieldDescriptorProto {
    FieldDescriptorProto {
        oneof_index: Some(index),
        ..field
    }
}

fn proto3_optional(field: FieldDescriptorProto, index: i32) -> FieldDescriptorProto {
    FieldDescriptorProto {
        proto3_optional: Some(true),
        ..in_oneof(field, index)
    }
}

fn oneof(name: &str) -> OneofDescriptorProto {
    OneofDescriptorProto {
        name: Some(name.to_owned()),
        options: None,
    }
}

fn message_type(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_owned()),
        field: fields,
        ..Default::default()
    }
}

/// The nested entry message of a map field, named the way protoc names them.
fn map_entry(name: &str, key: Type, value: FieldDescriptorProto) -> DescriptorProto {
    DescriptorProto {
        options: Some(MessageOptions {
            map_entry: Some(true),
            ..Default::default()
        }),
        ..message_type(name, vec![field("key", 1, key), value])
    }
}

fn proto3_file(
    name: &str,
    package: &str,
    dependency: &[&str],
    message_type: Vec<DescriptorProto>,
    enum_type: Vec<EnumDescriptorProto>,
) -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(name.to_owned()),
        package: Some(package.to_owned()),
        dependency: dependency.iter().map(|dep| (*dep).to_owned()).collect(),
        message_type,
        enum_type,
        syntax: Some("proto3".to_owned()),
        ..Default::default()
    }
}

fn date_file() -> FileDescriptorProto {
    proto3_file(
        "google/type/date.proto",
        "google.type",
        &[],
        vec![message_type(
            "Date",
            vec![
                field("year", 1, Type::Int32),
                field("month", 2, Type::Int32),
                field("day", 3, Type::Int32),
            ],
        )],
        vec![],
    )
}

fn time_of_day_file() -> FileDescriptorProto {
    proto3_file(
        "google/type/timeofday.proto",
        "google.type",
        &[],
        vec![message_type(
            "TimeOfDay",
            vec![
                field("hours", 1, Type::Int32),
                field("minutes", 2, Type::Int32),
                field("seconds", 3, Type::Int32),
                field("nanos", 4, Type::Int32),
            ],
        )],
        vec![],
    )
}

fn color_enum() -> EnumDescriptorProto {
    let value = |name: &str, number: i32| EnumValueDescriptorProto {
        name: Some(name.to_owned()),
        number: Some(number),
        options: None,
    };

    EnumDescriptorProto {
        name: Some("Color".to_owned()),
        value: vec![
            value("COLOR_UNSPECIFIED", 0),
            value("RED", 1),
            value("GREEN", 2),
        ],
        ..Default::default()
    }
}

fn fixtures_file() -> FileDescriptorProto {
    let scalars = message_type(
        "Scalars",
        vec![
            field("double_field", 1, Type::Double),
            field("float_field", 2, Type::Float),
            field("int32_field", 3, Type::Int32),
            field("int64_field", 4, Type::Int64),
            field("uint32_field", 5, Type::Uint32),
            field("uint64_field", 6, Type::Uint64),
            field("sint32_field", 7, Type::Sint32),
            field("sint64_field", 8, Type::Sint64),
            field("fixed32_field", 9, Type::Fixed32),
            field("fixed64_field", 10, Type::Fixed64),
            field("sfixed32_field", 11, Type::Sfixed32),
            field("sfixed64_field", 12, Type::Sfixed64),
            field("bool_field", 13, Type::Bool),
            field("string_field", 14, Type::String),
            field("bytes_field", 15, Type::Bytes),
            typed_field("color", 16, Type::Enum, "test.v1.Color"),
        ],
    );

    let address = message_type(
        "Address",
        vec![field("street", 1, Type::String), field("city", 2, Type::String)],
    );

    let person = DescriptorProto {
        nested_type: vec![
            map_entry("CountsEntry", Type::String, field("value", 2, Type::Int64)),
            map_entry("LabelsEntry", Type::Int32, field("value", 2, Type::String)),
        ],
        oneof_decl: vec![oneof("contact"), oneof("_nickname")],
        ..message_type(
            "Person",
            vec![
                field("name", 1, Type::String),
                proto3_optional(field("nickname", 2, Type::String), 1),
                message_field("address", 3, "test.v1.Address"),
                repeated(field("tags", 4, Type::String)),
                repeated(message_field("counts", 5, "test.v1.Person.CountsEntry")),
                repeated(message_field("labels", 6, "test.v1.Person.LabelsEntry")),
                in_oneof(field("email", 7, Type::String), 0),
                in_oneof(field("phone", 8, Type::Int64), 0),
                repeated(message_field("addresses", 9, "test.v1.Address")),
                typed_field("favorite", 10, Type::Enum, "test.v1.Color"),
            ],
        )
    };

    let node = message_type(
        "Node",
        vec![
            field("value", 1, Type::Int32),
            message_field("next", 2, "test.v1.Node"),
            repeated(message_field("children", 3, "test.v1.Node")),
        ],
    );

    let directory = DescriptorProto {
        nested_type: vec![map_entry(
            "EntriesEntry",
            Type::String,
            message_field("value", 2, "test.v1.Address"),
        )],
        ..message_type(
            "Directory",
            vec![
                repeated(message_field("entries", 1, "test.v1.Directory.EntriesEntry")),
                message_field("head", 2, "test.v1.Address"),
            ],
        )
    };

    let well_known = message_type(
        "WellKnown",
        vec![
            message_field("ts", 1, "google.protobuf.Timestamp"),
            message_field("duration", 2, "google.protobuf.Duration"),
            message_field("date", 3, "google.type.Date"),
            message_field("time", 4, "google.type.TimeOfDay"),
            message_field("int32_wrapper", 5, "google.protobuf.Int32Value"),
            message_field("uint64_wrapper", 6, "google.protobuf.UInt64Value"),
            message_field("string_wrapper", 7, "google.protobuf.StringValue"),
            message_field("bytes_wrapper", 8, "google.protobuf.BytesValue"),
            message_field("double_wrapper", 9, "google.protobuf.DoubleValue"),
            message_field("bool_wrapper", 10, "google.protobuf.BoolValue"),
            message_field("struct_field", 11, "google.protobuf.Struct"),
            message_field("value_field", 12, "google.protobuf.Value"),
            message_field("any_field", 13, "google.protobuf.Any"),
            repeated(message_field("timestamps", 14, "google.protobuf.Timestamp")),
        ],
    );

    let event = DescriptorProto {
        oneof_decl: vec![oneof("payload")],
        ..message_type(
            "Event",
            vec![
                in_oneof(message_field("address", 1, "test.v1.Address"), 0),
                in_oneof(message_field("at", 2, "google.protobuf.Timestamp"), 0),
                in_oneof(field("note", 3, Type::String), 0),
            ],
        )
    };

    let tree = DescriptorProto {
        nested_type: vec![map_entry(
            "KidsEntry",
            Type::String,
            message_field("value", 2, "test.v1.Tree"),
        )],
        ..message_type(
            "Tree",
            vec![
                field("label", 1, Type::String),
                repeated(message_field("kids", 2, "test.v1.Tree.KidsEntry")),
            ],
        )
    };

    proto3_file(
        "test/v1/fixtures.proto",
        PACKAGE,
        &[
            "google/protobuf/any.proto",
            "google/protobuf/duration.proto",
            "google/protobuf/struct.proto",
            "google/protobuf/timestamp.proto",
            "google/protobuf/wrappers.proto",
            "google/type/date.proto",
            "google/type/timeofday.proto",
        ],
        vec![
            scalars, address, person, node, directory, well_known, event, tree,
        ],
        vec![color_enum()],
    )
}

/// A proto2 file, where singular scalars track presence.
fn legacy_file() -> FileDescriptorProto {
    let legacy = message_type(
        "Legacy",
        vec![
            field("count", 1, Type::Int32),
            field("label", 2, Type::String),
            repeated(field("samples", 3, Type::Int32)),
            message_field("home", 4, "test.v1.Address"),
        ],
    );

    FileDescriptorProto {
        syntax: Some("proto2".to_owned()),
        ..proto3_file(
            "test/v1/legacy.proto",
            PACKAGE,
            &["test/v1/fixtures.proto"],
            vec![legacy],
            vec![],
        )
    }
}
