// crates/protomcp-schema/src/descriptor.rs
// ============================================================================
// Module: Descriptor Model
// Description: Owned, resolved view of protobuf messages, enums, and services.
// Purpose: Give the schema compiler an immutable type graph keyed by full name.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The compiler never reads `.proto` sources. It consumes a [`DescriptorSet`]
//! that a descriptor provider has already resolved, either built directly with
//! the builder methods below or converted from a `prost_types`
//! `FileDescriptorSet` (see [`DescriptorSet::from_file_descriptor_set`]).
//!
//! Message-typed fields reference their target by fully-qualified name, so
//! self-referential and mutually recursive message graphs are representable
//! without shared ownership.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod proto;


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// SECTION: Field Types
// ============================================================================

/// Protobuf field kind.
///
/// # Invariants
/// - `Enum`, `Message`, and `Group` carry a fully-qualified name without a leading dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// `double`.
    Double,
    /// `float`.
    Float,
    /// `int32`.
    Int32,
    /// `int64`.
    Int64,
    /// `uint32`.
    Uint32,
    /// `uint64`.
    Uint64,
    /// `sint32`.
    Sint32,
    /// `sint64`.
    Sint64,
    /// `fixed32`.
    Fixed32,
    /// `fixed64`.
    Fixed64,
    /// `sfixed32`.
    Sfixed32,
    /// `sfixed64`.
    Sfixed64,
    /// `bool`.
    Bool,
    /// `string`.
    String,
    /// `bytes`.
    Bytes,
    /// Enum type reference.
    Enum(String),
    /// Message type reference.
    Message(String),
    /// Legacy proto2 group reference.
    Group(String),
}

impl FieldKind {
    /// Builds an enum kind, normalizing the type name.
    #[must_use]
    pub fn enumeration(full_name: &str) -> Self {
        Self::Enum(normalize_name(full_name))
    }

    /// Builds a message kind, normalizing the type name.
    #[must_use]
    pub fn message(full_name: &str) -> Self {
        Self::Message(normalize_name(full_name))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Double => "double",
            Self::Float => "float",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Sint32 => "sint32",
            Self::Sint64 => "sint64",
            Self::Fixed32 => "fixed32",
            Self::Fixed64 => "fixed64",
            Self::Sfixed32 => "sfixed32",
            Self::Sfixed64 => "sfixed64",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Enum(name) => return write!(f, "enum {name}"),
            Self::Message(name) => return write!(f, "message {name}"),
            Self::Group(name) => return write!(f, "group {name}"),
        };
        f.write_str(label)
    }
}

/// Field cardinality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// Single value (implicit or explicit presence).
    Singular,
    /// `repeated` list field.
    Repeated,
    /// `map<key, value>` field; the value kind is the field's own [`FieldKind`].
    Map {
        /// Map key kind.
        key: FieldKind,
    },
}

/// Resolved field descriptor.
///
/// # Invariants
/// - For map fields, `kind` is the map value kind.
/// - `oneof` is only set for real oneof groups, never for proto3 `optional` fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name as declared in the schema.
    pub name: String,
    /// Field kind (map value kind for map fields).
    pub kind: FieldKind,
    /// Field cardinality.
    pub cardinality: Cardinality,
    /// Declared with the proto3 `optional` keyword.
    pub proto3_optional: bool,
    /// Carries an explicit "required" annotation.
    pub required_annotation: bool,
    /// Name of the owning oneof group, if any.
    pub oneof: Option<String>,
    /// Declared comment text.
    pub comment: Option<String>,
}

impl FieldDescriptor {
    /// Creates a singular field with no annotations.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            cardinality: Cardinality::Singular,
            proto3_optional: false,
            required_annotation: false,
            oneof: None,
            comment: None,
        }
    }

    /// Marks the field as `repeated`.
    #[must_use]
    pub fn repeated(mut self) -> Self {
        self.cardinality = Cardinality::Repeated;
        self
    }

    /// Turns the field into a map keyed by `key`; the current kind becomes the value kind.
    #[must_use]
    pub fn map(mut self, key: FieldKind) -> Self {
        self.cardinality = Cardinality::Map {
            key,
        };
        self
    }

    /// Marks the field with the proto3 `optional` keyword.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.proto3_optional = true;
        self
    }

    /// Marks the field with an explicit required annotation.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required_annotation = true;
        self
    }

    /// Places the field inside the named oneof group.
    #[must_use]
    pub fn in_oneof(mut self, oneof: impl Into<String>) -> Self {
        self.oneof = Some(oneof.into());
        self
    }

    /// Attaches declared comment text.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Returns true for `repeated` (non-map) fields.
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self.cardinality, Cardinality::Repeated)
    }

    /// Returns true for map fields.
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self.cardinality, Cardinality::Map { .. })
    }
}

// ============================================================================
// SECTION: Type Descriptors
// ============================================================================

/// Resolved message descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDescriptor {
    /// Fully-qualified message name without a leading dot.
    pub full_name: String,
    /// Declared comment text.
    pub comment: Option<String>,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
}

impl MessageDescriptor {
    /// Creates an empty message descriptor.
    #[must_use]
    pub fn new(full_name: &str) -> Self {
        Self {
            full_name: normalize_name(full_name),
            comment: None,
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    #[must_use]
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Attaches declared comment text.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Returns the short (unqualified) message name.
    #[must_use]
    pub fn name(&self) -> &str {
        short_name(&self.full_name)
    }

    /// Returns oneof group names in order of first appearance.
    #[must_use]
    pub fn oneof_groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for oneof in self.fields.iter().filter_map(|field| field.oneof.as_deref()) {
            if !groups.contains(&oneof) {
                groups.push(oneof);
            }
        }
        groups
    }

    /// Returns the member fields of a oneof group in declaration order.
    pub fn oneof_fields<'a>(&'a self, oneof: &'a str) -> impl Iterator<Item = &'a FieldDescriptor> {
        self.fields.iter().filter(move |field| field.oneof.as_deref() == Some(oneof))
    }
}

/// Resolved enum descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    /// Fully-qualified enum name without a leading dot.
    pub full_name: String,
    /// Declared comment text.
    pub comment: Option<String>,
    /// Enum values as `(name, number)` in declaration order.
    pub values: Vec<(String, i32)>,
}

impl EnumDescriptor {
    /// Creates an enum descriptor from its values.
    #[must_use]
    pub fn new<I, S>(full_name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = (S, i32)>,
        S: Into<String>,
    {
        Self {
            full_name: normalize_name(full_name),
            comment: None,
            values: values.into_iter().map(|(name, number)| (name.into(), number)).collect(),
        }
    }

    /// Returns the short (unqualified) enum name.
    #[must_use]
    pub fn name(&self) -> &str {
        short_name(&self.full_name)
    }
}

/// Resolved RPC method descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// Method name.
    pub name: String,
    /// Fully-qualified request message name.
    pub input_type: String,
    /// Fully-qualified response message name.
    pub output_type: String,
    /// Declared comment text.
    pub comment: Option<String>,
    /// Client streams requests.
    pub client_streaming: bool,
    /// Server streams responses.
    pub server_streaming: bool,
}

impl MethodDescriptor {
    /// Creates a unary method descriptor.
    #[must_use]
    pub fn unary(name: impl Into<String>, input_type: &str, output_type: &str) -> Self {
        Self {
            name: name.into(),
            input_type: normalize_name(input_type),
            output_type: normalize_name(output_type),
            comment: None,
            client_streaming: false,
            server_streaming: false,
        }
    }

    /// Attaches declared comment text.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Returns true when either side of the call streams.
    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        self.client_streaming || self.server_streaming
    }
}

/// Resolved service descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Fully-qualified service name without a leading dot.
    pub full_name: String,
    /// Declared comment text.
    pub comment: Option<String>,
    /// Methods in declaration order.
    pub methods: Vec<MethodDescriptor>,
}

impl ServiceDescriptor {
    /// Creates an empty service descriptor.
    #[must_use]
    pub fn new(full_name: &str) -> Self {
        Self {
            full_name: normalize_name(full_name),
            comment: None,
            methods: Vec::new(),
        }
    }

    /// Appends a method.
    #[must_use]
    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// Returns the short (unqualified) service name.
    #[must_use]
    pub fn name(&self) -> &str {
        short_name(&self.full_name)
    }
}

// ============================================================================
// SECTION: Descriptor Set
// ============================================================================

/// Registry of resolved descriptors keyed by fully-qualified name.
///
/// # Invariants
/// - Keys and stored `full_name`s never carry a leading dot.
/// - Registering a name twice replaces the earlier descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorSet {
    /// Message descriptors by full name.
    messages: BTreeMap<String, MessageDescriptor>,
    /// Enum descriptors by full name.
    enums: BTreeMap<String, EnumDescriptor>,
    /// Service descriptors by full name.
    services: BTreeMap<String, ServiceDescriptor>,
}

impl DescriptorSet {
    /// Creates an empty descriptor set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a message descriptor.
    pub fn add_message(&mut self, mut message: MessageDescriptor) -> &mut Self {
        message.full_name = normalize_name(&message.full_name);
        self.messages.insert(message.full_name.clone(), message);
        self
    }

    /// Registers an enum descriptor.
    pub fn add_enum(&mut self, mut enumeration: EnumDescriptor) -> &mut Self {
        enumeration.full_name = normalize_name(&enumeration.full_name);
        self.enums.insert(enumeration.full_name.clone(), enumeration);
        self
    }

    /// Registers a service descriptor.
    pub fn add_service(&mut self, mut service: ServiceDescriptor) -> &mut Self {
        service.full_name = normalize_name(&service.full_name);
        self.services.insert(service.full_name.clone(), service);
        self
    }

    /// Looks up a message by fully-qualified name.
    #[must_use]
    pub fn message(&self, full_name: &str) -> Option<&MessageDescriptor> {
        self.messages.get(full_name.trim_start_matches('.'))
    }

    /// Looks up an enum by fully-qualified name.
    #[must_use]
    pub fn enumeration(&self, full_name: &str) -> Option<&EnumDescriptor> {
        self.enums.get(full_name.trim_start_matches('.'))
    }

    /// Looks up a service by fully-qualified name.
    #[must_use]
    pub fn service(&self, full_name: &str) -> Option<&ServiceDescriptor> {
        self.services.get(full_name.trim_start_matches('.'))
    }

    /// Returns all messages ordered by name.
    pub fn messages(&self) -> impl Iterator<Item = &MessageDescriptor> {
        self.messages.values()
    }

    /// Returns all services ordered by name.
    pub fn services(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.services.values()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Strips the leading dot protobuf uses for absolute type references.
pub(crate) fn normalize_name(name: &str) -> String {
    name.trim_start_matches('.').to_string()
}

/// Returns the last dotted segment of a fully-qualified name.
fn short_name(full_name: &str) -> &str {
    full_name.rsplit('.').next().unwrap_or(full_name)
}
