// crates/protomcp-schema/src/descriptor/proto.rs
// ============================================================================
// Module: Protobuf Descriptor Adapter
// Description: Conversion from prost-types file descriptors to the owned model.
// Purpose: Accept protoc/buf descriptor sets as compiler input.
// Dependencies: prost, prost-types
// ============================================================================

//! ## Overview
//! Converts `FileDescriptorSet`/`FileDescriptorProto` values into a
//! [`DescriptorSet`]. Map fields are recognised through their synthetic
//! `*Entry` messages, proto3 `optional` fields lose their synthetic oneof, and
//! comments are recovered from `SourceCodeInfo` by source path.
//!
//! A field is annotated as required either by the proto2 `required` label or
//! by the `google.api.field_behavior = REQUIRED` option. `prost_types` drops
//! extension fields, so the option is only visible when the raw bytes are
//! available: [`DescriptorSet::decode`] re-reads them through a narrow overlay
//! of the descriptor messages that keeps extension 1052 of `FieldOptions`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::collections::HashSet;

use prost::Message;
use prost_types::DescriptorProto;
use prost_types::EnumDescriptorProto;
use prost_types::FieldDescriptorProto;
use prost_types::FileDescriptorProto;
use prost_types::FileDescriptorSet;
use prost_types::ServiceDescriptorProto;
use prost_types::field_descriptor_proto::Label;
use prost_types::field_descriptor_proto::Type;

use super::Cardinality;
use super::DescriptorSet;
use super::EnumDescriptor;
use super::FieldDescriptor;
use super::FieldKind;
use super::MessageDescriptor;
use super::MethodDescriptor;
use super::ServiceDescriptor;
use super::normalize_name;
use crate::SchemaError;

// ============================================================================
// SECTION: Source Paths
// ============================================================================

/// `FileDescriptorProto.message_type` field number.
const FILE_MESSAGE_TYPE: i32 = 4;
/// `FileDescriptorProto.enum_type` field number.
const FILE_ENUM_TYPE: i32 = 5;
/// `FileDescriptorProto.service` field number.
const FILE_SERVICE: i32 = 6;
/// `DescriptorProto.field` field number.
const MESSAGE_FIELD: i32 = 2;
/// `DescriptorProto.nested_type` field number.
const MESSAGE_NESTED_TYPE: i32 = 3;
/// `DescriptorProto.enum_type` field number.
const MESSAGE_ENUM_TYPE: i32 = 4;
/// `ServiceDescriptorProto.method` field number.
const SERVICE_METHOD: i32 = 2;
/// `google.api.FieldBehavior.REQUIRED`.
const FIELD_BEHAVIOR_REQUIRED: i32 = 2;

/// Comment text indexed by source path.
struct Comments(HashMap<Vec<i32>, String>);

impl Comments {
    /// Indexes the leading (or trailing) comments of a file.
    fn from_file(file: &FileDescriptorProto) -> Self {
        let mut comments = HashMap::new();
        for location in file.source_code_info.iter().flat_map(|info| info.location.iter()) {
            let text = location
                .leading_comments
                .as_deref()
                .or(location.trailing_comments.as_deref())
                .map(clean_comment)
                .filter(|text| !text.is_empty());
            if let Some(text) = text {
                comments.entry(location.path.clone()).or_insert(text);
            }
        }
        Self(comments)
    }

    /// Returns the comment recorded at `path`.
    fn at(&self, path: &[i32]) -> Option<String> {
        self.0.get(path).cloned()
    }
}

/// Trims comment markers' leftover whitespace line by line.
fn clean_comment(raw: &str) -> String {
    raw.lines().map(str::trim).collect::<Vec<_>>().join("\n").trim().to_string()
}

// ============================================================================
// SECTION: Field Behavior Overlay
// ============================================================================

/// `FileDescriptorSet` reduced to the path leading to field options.
#[derive(Clone, PartialEq, Message)]
struct FileSetOverlay {
    /// `FileDescriptorSet.file`.
    #[prost(message, repeated, tag = "1")]
    file: Vec<FileOverlay>,
}

/// `FileDescriptorProto` reduced to its top-level messages.
#[derive(Clone, PartialEq, Message)]
struct FileOverlay {
    /// `FileDescriptorProto.message_type`.
    #[prost(message, repeated, tag = "4")]
    message_type: Vec<MessageOverlay>,
}

/// `DescriptorProto` reduced to fields and nested messages.
#[derive(Clone, PartialEq, Message)]
struct MessageOverlay {
    /// `DescriptorProto.field`.
    #[prost(message, repeated, tag = "2")]
    field: Vec<FieldOverlay>,
    /// `DescriptorProto.nested_type`.
    #[prost(message, repeated, tag = "3")]
    nested_type: Vec<MessageOverlay>,
}

/// `FieldDescriptorProto` reduced to its options.
#[derive(Clone, PartialEq, Message)]
struct FieldOverlay {
    /// `FieldDescriptorProto.options`.
    #[prost(message, optional, tag = "8")]
    options: Option<FieldOptionsOverlay>,
}

/// `FieldOptions` reduced to the `google.api.field_behavior` extension.
#[derive(Clone, PartialEq, Message)]
struct FieldOptionsOverlay {
    /// `google.api.field_behavior` values.
    #[prost(int32, repeated, tag = "1052")]
    field_behavior: Vec<i32>,
}

/// Source paths of fields carrying `field_behavior = REQUIRED`, per file.
#[derive(Debug, Default)]
struct RequiredFields(HashSet<Vec<i32>>);

impl RequiredFields {
    /// Collects required field paths from one overlay file.
    fn from_overlay(file: &FileOverlay) -> Result<Self, SchemaError> {
        let mut paths = HashSet::new();
        for (index, message) in file.message_type.iter().enumerate() {
            let path = child_path(&[], FILE_MESSAGE_TYPE, index)?;
            collect_required(message, &path, &mut paths)?;
        }
        Ok(Self(paths))
    }

    /// Returns true when the field at `path` is marked required.
    fn contains(&self, path: &[i32]) -> bool {
        self.0.contains(path)
    }
}

/// Walks one overlay message and its nested messages.
fn collect_required(
    message: &MessageOverlay,
    path: &[i32],
    paths: &mut HashSet<Vec<i32>>,
) -> Result<(), SchemaError> {
    for (index, field) in message.field.iter().enumerate() {
        let required = field
            .options
            .as_ref()
            .is_some_and(|options| options.field_behavior.contains(&FIELD_BEHAVIOR_REQUIRED));
        if required {
            paths.insert(child_path(path, MESSAGE_FIELD, index)?);
        }
    }
    for (index, nested) in message.nested_type.iter().enumerate() {
        collect_required(nested, &child_path(path, MESSAGE_NESTED_TYPE, index)?, paths)?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Path Helpers
// ============================================================================

/// Appends child path segments to a parent source path.
fn child_path(parent: &[i32], field: i32, index: usize) -> Result<Vec<i32>, SchemaError> {
    let index = i32::try_from(index)
        .map_err(|_| SchemaError::Descriptor("descriptor index out of range".to_string()))?;
    let mut path = parent.to_vec();
    path.push(field);
    path.push(index);
    Ok(path)
}

/// Joins a scope and a short name into a fully-qualified name.
fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() { name.to_string() } else { format!("{scope}.{name}") }
}

// ============================================================================
// SECTION: Conversion Entry Points
// ============================================================================

impl DescriptorSet {
    /// Decodes a binary `FileDescriptorSet` (as written by `protoc -o` or `buf build`).
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Descriptor`] when the bytes are not a valid descriptor set.
    pub fn decode(bytes: &[u8]) -> Result<Self, SchemaError> {
        let set = FileDescriptorSet::decode(bytes)
            .map_err(|err| SchemaError::Descriptor(err.to_string()))?;
        let overlay = FileSetOverlay::decode(bytes)
            .map_err(|err| SchemaError::Descriptor(err.to_string()))?;
        let mut descriptors = Self::new();
        for (index, file) in set.file.iter().enumerate() {
            let required = match overlay.file.get(index) {
                Some(file_overlay) => RequiredFields::from_overlay(file_overlay)?,
                None => RequiredFields::default(),
            };
            descriptors.convert_file(file, &required)?;
        }
        Ok(descriptors)
    }

    /// Converts every file of a `FileDescriptorSet`.
    ///
    /// Decoded `prost_types` values no longer carry option extensions, so only
    /// the proto2 `required` label marks fields as required here; use
    /// [`DescriptorSet::decode`] to honour `google.api.field_behavior`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Descriptor`] when a descriptor is structurally inconsistent.
    pub fn from_file_descriptor_set(set: &FileDescriptorSet) -> Result<Self, SchemaError> {
        let mut descriptors = Self::new();
        for file in &set.file {
            descriptors.add_file(file)?;
        }
        Ok(descriptors)
    }

    /// Registers the messages, enums, and services declared in one file.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Descriptor`] when a descriptor is structurally inconsistent.
    pub fn add_file(&mut self, file: &FileDescriptorProto) -> Result<(), SchemaError> {
        self.convert_file(file, &RequiredFields::default())
    }

    /// Registers one file, marking the fields listed in `required` as annotated.
    fn convert_file(
        &mut self,
        file: &FileDescriptorProto,
        required: &RequiredFields,
    ) -> Result<(), SchemaError> {
        let comments = Comments::from_file(file);
        let package = file.package();
        for (index, message) in file.message_type.iter().enumerate() {
            let path = child_path(&[], FILE_MESSAGE_TYPE, index)?;
            self.add_proto_message(message, package, &path, &comments, required)?;
        }
        for (index, enumeration) in file.enum_type.iter().enumerate() {
            let path = child_path(&[], FILE_ENUM_TYPE, index)?;
            self.add_enum(convert_enum(enumeration, package, &path, &comments));
        }
        for (index, service) in file.service.iter().enumerate() {
            let path = child_path(&[], FILE_SERVICE, index)?;
            self.add_service(convert_service(service, package, &path, &comments)?);
        }
        Ok(())
    }

    /// Registers a message and, recursively, its nested types.
    fn add_proto_message(
        &mut self,
        message: &DescriptorProto,
        scope: &str,
        path: &[i32],
        comments: &Comments,
        required: &RequiredFields,
    ) -> Result<(), SchemaError> {
        let full_name = qualify(scope, message.name());
        let map_entries = map_entries(message, &full_name);

        for (index, nested) in message.nested_type.iter().enumerate() {
            if is_map_entry(nested) {
                continue;
            }
            let nested_path = child_path(path, MESSAGE_NESTED_TYPE, index)?;
            self.add_proto_message(nested, &full_name, &nested_path, comments, required)?;
        }
        for (index, enumeration) in message.enum_type.iter().enumerate() {
            let enum_path = child_path(path, MESSAGE_ENUM_TYPE, index)?;
            self.add_enum(convert_enum(enumeration, &full_name, &enum_path, comments));
        }

        let mut converted = MessageDescriptor::new(&full_name);
        converted.comment = comments.at(path);
        for (index, field) in message.field.iter().enumerate() {
            let field_path = child_path(path, MESSAGE_FIELD, index)?;
            let mut converted_field =
                convert_field(field, message, &map_entries, comments.at(&field_path))?;
            converted_field.required_annotation |= required.contains(&field_path);
            converted.fields.push(converted_field);
        }
        self.add_message(converted);
        Ok(())
    }
}

// ============================================================================
// SECTION: Field Conversion
// ============================================================================

/// Returns true when a nested message is a synthetic map entry.
fn is_map_entry(message: &DescriptorProto) -> bool {
    message.options.as_ref().is_some_and(prost_types::MessageOptions::map_entry)
}

/// Collects `(key kind, value kind)` for every map entry nested in `message`.
fn map_entries(message: &DescriptorProto, full_name: &str) -> HashMap<String, (FieldKind, FieldKind)> {
    let mut entries = HashMap::new();
    for nested in message.nested_type.iter().filter(|nested| is_map_entry(nested)) {
        let key = nested.field.iter().find(|field| field.number() == 1);
        let value = nested.field.iter().find(|field| field.number() == 2);
        if let (Some(key), Some(value)) = (key, value) {
            entries.insert(qualify(full_name, nested.name()), (field_kind(key), field_kind(value)));
        }
    }
    entries
}

/// Maps a descriptor type onto [`FieldKind`].
fn field_kind(field: &FieldDescriptorProto) -> FieldKind {
    let type_name = normalize_name(field.type_name());
    match field.r#type() {
        Type::Double => FieldKind::Double,
        Type::Float => FieldKind::Float,
        Type::Int64 => FieldKind::Int64,
        Type::Uint64 => FieldKind::Uint64,
        Type::Int32 => FieldKind::Int32,
        Type::Fixed64 => FieldKind::Fixed64,
        Type::Fixed32 => FieldKind::Fixed32,
        Type::Bool => FieldKind::Bool,
        Type::String => FieldKind::String,
        Type::Group => FieldKind::Group(type_name),
        Type::Message => FieldKind::Message(type_name),
        Type::Bytes => FieldKind::Bytes,
        Type::Uint32 => FieldKind::Uint32,
        Type::Enum => FieldKind::Enum(type_name),
        Type::Sfixed32 => FieldKind::Sfixed32,
        Type::Sfixed64 => FieldKind::Sfixed64,
        Type::Sint32 => FieldKind::Sint32,
        Type::Sint64 => FieldKind::Sint64,
    }
}

/// Converts one field, resolving map entries and real oneof membership.
fn convert_field(
    field: &FieldDescriptorProto,
    owner: &DescriptorProto,
    map_entries: &HashMap<String, (FieldKind, FieldKind)>,
    comment: Option<String>,
) -> Result<FieldDescriptor, SchemaError> {
    let repeated = field.label() == Label::Repeated;
    let entry = match field.r#type() {
        Type::Message if repeated => map_entries.get(&normalize_name(field.type_name())),
        _ => None,
    };
    let (kind, cardinality) = match entry {
        Some((key, value)) => (
            value.clone(),
            Cardinality::Map {
                key: key.clone(),
            },
        ),
        None if repeated => (field_kind(field), Cardinality::Repeated),
        None => (field_kind(field), Cardinality::Singular),
    };

    let proto3_optional = field.proto3_optional();
    let oneof = match field.oneof_index {
        Some(index) if !proto3_optional => {
            let decl = usize::try_from(index).ok().and_then(|index| owner.oneof_decl.get(index));
            let decl = decl.ok_or_else(|| {
                SchemaError::Descriptor(format!(
                    "field {} references missing oneof {index}",
                    field.name()
                ))
            })?;
            Some(decl.name().to_string())
        }
        _ => None,
    };

    Ok(FieldDescriptor {
        name: field.name().to_string(),
        kind,
        cardinality,
        proto3_optional,
        required_annotation: field.label() == Label::Required,
        oneof,
        comment,
    })
}

// ============================================================================
// SECTION: Enum and Service Conversion
// ============================================================================

/// Converts an enum declared under `scope`.
fn convert_enum(
    enumeration: &EnumDescriptorProto,
    scope: &str,
    path: &[i32],
    comments: &Comments,
) -> EnumDescriptor {
    let values = enumeration.value.iter().map(|value| (value.name().to_string(), value.number()));
    let mut converted = EnumDescriptor::new(&qualify(scope, enumeration.name()), values);
    converted.comment = comments.at(path);
    converted
}

/// Converts a service declared in `package`.
fn convert_service(
    service: &ServiceDescriptorProto,
    package: &str,
    path: &[i32],
    comments: &Comments,
) -> Result<ServiceDescriptor, SchemaError> {
    let mut converted = ServiceDescriptor::new(&qualify(package, service.name()));
    converted.comment = comments.at(path);
    for (index, method) in service.method.iter().enumerate() {
        let method_path = child_path(path, SERVICE_METHOD, index)?;
        converted.methods.push(MethodDescriptor {
            name: method.name().to_string(),
            input_type: normalize_name(method.input_type()),
            output_type: normalize_name(method.output_type()),
            comment: comments.at(&method_path),
            client_streaming: method.client_streaming(),
            server_streaming: method.server_streaming(),
        });
    }
    Ok(converted)
}
