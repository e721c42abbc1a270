// crates/protomcp-schema/src/compiler.rs
// ============================================================================
// Module: Schema Compiler
// Description: Descriptor to JSON Schema (2020-12 subset) compilation.
// Purpose: Produce tool input schemas with shared, cycle-safe `$defs`.
// Dependencies: serde_json, tracing, crate::{definitions, descriptor, policy, well_known}
// ============================================================================

//! ## Overview
//! [`SchemaCompiler`] maps one field at a time onto a schema node
//! ([`SchemaCompiler::field_schema`]) and assembles message object schemas
//! ([`SchemaCompiler::message_schema`]). Message-typed fields compile their
//! target into the [`Definitions`] table on first sight and reference it by
//! `$ref` afterwards, so diamond-shaped graphs compile each type once and
//! recursive graphs terminate.
//!
//! ### Oneof encoding
//! A oneof group `kind` becomes one `kindOneOfType` property holding
//! `{ "oneOf": [...] }`. Each variant is a closed object carrying a `const`
//! `object_type` discriminator equal to the member field name:
//! - message members inline the member message's properties next to the
//!   discriminator;
//! - every other member (and message members whose definition is still being
//!   compiled, i.e. recursive variants) nests its value under the field name.
//!
//! `protomcp-runtime` rewrites both shapes back into plain protobuf JSON.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use tracing::trace;

use crate::SchemaError;
use crate::definitions::Definitions;
use crate::descriptor::Cardinality;
use crate::descriptor::DescriptorSet;
use crate::descriptor::FieldDescriptor;
use crate::descriptor::FieldKind;
use crate::descriptor::MessageDescriptor;
use crate::policy::is_field_required;
use crate::policy::is_oneof_required;
use crate::well_known::WellKnownType;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Suffix appended to a oneof group name to form its property name.
pub const ONEOF_SUFFIX: &str = "OneOfType";

/// Discriminator key carried by every oneof variant object.
pub const DISCRIMINATOR_KEY: &str = "object_type";

/// Description attached to `bytes` fields.
const BYTES_DESCRIPTION: &str = "Base64-encoded bytes.";

// ============================================================================
// SECTION: Options
// ============================================================================

/// Compilation switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Read presence from the proto3 `optional` keyword when computing `required`.
    pub optional_keyword_support: bool,
}

// ============================================================================
// SECTION: Scalar Mapping
// ============================================================================

/// Returns the JSON Schema `type` for scalar and enum kinds.
///
/// 64-bit integers map to `"string"` so JSON-number consumers never lose
/// precision. Message and group kinds have no scalar type.
#[must_use]
pub const fn kind_to_type(kind: &FieldKind) -> Option<&'static str> {
    match kind {
        FieldKind::Bool => Some("boolean"),
        FieldKind::String | FieldKind::Bytes => Some("string"),
        FieldKind::Int32
        | FieldKind::Uint32
        | FieldKind::Sint32
        | FieldKind::Fixed32
        | FieldKind::Sfixed32
        | FieldKind::Enum(_) => Some("integer"),
        FieldKind::Int64
        | FieldKind::Uint64
        | FieldKind::Sint64
        | FieldKind::Fixed64
        | FieldKind::Sfixed64 => Some("string"),
        FieldKind::Float | FieldKind::Double => Some("number"),
        FieldKind::Message(_) | FieldKind::Group(_) => None,
    }
}

// ============================================================================
// SECTION: Schema Compiler
// ============================================================================

/// Compiles descriptors from a [`DescriptorSet`] into JSON Schema values.
///
/// # Invariants
/// - Compilation is pure apart from the caller-supplied [`Definitions`] table.
/// - Errors propagate to the caller; a failed message leaves no reservation behind.
#[derive(Debug, Clone, Copy)]
pub struct SchemaCompiler<'a> {
    /// Resolved descriptor registry.
    descriptors: &'a DescriptorSet,
    /// Compilation switches.
    options: CompileOptions,
}

impl<'a> SchemaCompiler<'a> {
    /// Creates a compiler over `descriptors`.
    #[must_use]
    pub const fn new(descriptors: &'a DescriptorSet, options: CompileOptions) -> Self {
        Self {
            descriptors,
            options,
        }
    }

    /// Returns the descriptor registry.
    #[must_use]
    pub const fn descriptors(&self) -> &'a DescriptorSet {
        self.descriptors
    }

    /// Compiles a message into a standalone schema document with `$defs` attached.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the message or any reachable type cannot be compiled.
    pub fn root_schema(&self, full_name: &str) -> Result<Value, SchemaError> {
        let message = self.lookup_message(full_name)?;
        let mut definitions = Definitions::new();
        let mut schema = self.message_schema(message, &mut definitions)?;
        if let Value::Object(map) = &mut schema {
            map.insert("$defs".to_string(), definitions.into_value());
        }
        Ok(schema)
    }

    /// Compiles a message into its inline object schema.
    ///
    /// The message name is reserved in `definitions` before its fields are
    /// walked and completed afterwards, so the table ends up holding every
    /// reachable message type, this one included.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when a field cannot be compiled.
    pub fn message_schema(
        &self,
        message: &MessageDescriptor,
        definitions: &mut Definitions,
    ) -> Result<Value, SchemaError> {
        let reserved = definitions.reserve(&message.full_name);
        match self.message_body(message, definitions) {
            Ok(schema) => {
                if reserved {
                    definitions.complete(&message.full_name, schema.clone());
                }
                Ok(schema)
            }
            Err(err) => {
                if reserved {
                    definitions.abandon(&message.full_name);
                }
                Err(err)
            }
        }
    }

    /// Compiles one field into its schema node.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] for unknown referenced types, groups, or invalid map keys.
    pub fn field_schema(
        &self,
        field: &FieldDescriptor,
        definitions: &mut Definitions,
    ) -> Result<Value, SchemaError> {
        trace!(field = %field.name, "compiling field schema");
        let mut schema = match &field.cardinality {
            Cardinality::Singular => self.kind_schema(&field.kind, definitions)?,
            Cardinality::Repeated => json!({
                "type": "array",
                "items": self.kind_schema(&field.kind, definitions)?,
            }),
            Cardinality::Map {
                key,
            } => json!({
                "type": "object",
                "additionalProperties": self.kind_schema(&field.kind, definitions)?,
                "propertyNames": map_key_schema(&field.name, key)?,
            }),
        };
        if let Some(comment) = &field.comment {
            attach_description(&mut schema, comment);
        }
        Ok(schema)
    }

    /// Ensures a message type has an entry in `definitions`.
    ///
    /// Returns the normalized name the entry is stored under.
    fn ensure_definition(
        &self,
        full_name: &str,
        definitions: &mut Definitions,
    ) -> Result<&'a str, SchemaError> {
        let message = self.lookup_message(full_name)?;
        if !definitions.contains(&message.full_name) {
            self.message_schema(message, definitions)?;
        }
        Ok(message.full_name.as_str())
    }

    /// Looks up a message or reports it as unknown.
    fn lookup_message(&self, full_name: &str) -> Result<&'a MessageDescriptor, SchemaError> {
        self.descriptors
            .message(full_name)
            .ok_or_else(|| SchemaError::UnknownType(full_name.to_string()))
    }

    /// Builds the object schema of a message without touching its own reservation.
    fn message_body(
        &self,
        message: &MessageDescriptor,
        definitions: &mut Definitions,
    ) -> Result<Value, SchemaError> {
        let optional_support = self.options.optional_keyword_support;
        let mut properties = Map::new();
        let mut required = Vec::new();
        let mut emitted_groups: Vec<&str> = Vec::new();

        for field in &message.fields {
            match field.oneof.as_deref() {
                None => {
                    let schema = self.field_schema(field, definitions)?;
                    insert_property(&mut properties, &message.full_name, &field.name, schema)?;
                    if is_field_required(field, optional_support) {
                        required.push(Value::String(field.name.clone()));
                    }
                }
                Some(group) if !emitted_groups.contains(&group) => {
                    emitted_groups.push(group);
                    let members: Vec<&FieldDescriptor> = message.oneof_fields(group).collect();
                    let property = format!("{group}{ONEOF_SUFFIX}");
                    let schema = self.oneof_schema(&members, definitions)?;
                    insert_property(&mut properties, &message.full_name, &property, schema)?;
                    if is_oneof_required(&members, optional_support) {
                        required.push(Value::String(property));
                    }
                }
                Some(_) => {}
            }
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        schema.insert("required".to_string(), Value::Array(required));
        schema.insert("additionalProperties".to_string(), Value::Bool(false));
        if let Some(comment) = &message.comment {
            schema.insert("description".to_string(), Value::String(comment.clone()));
        }
        Ok(Value::Object(schema))
    }

    /// Compiles a field kind as a singular value.
    fn kind_schema(
        &self,
        kind: &FieldKind,
        definitions: &mut Definitions,
    ) -> Result<Value, SchemaError> {
        match kind {
            FieldKind::Message(name) => {
                if let Some(wkt) = WellKnownType::from_name(name) {
                    return Ok(wkt.schema());
                }
                let name = self.ensure_definition(name, definitions)?;
                Ok(json!({ "$ref": definition_ref(name) }))
            }
            FieldKind::Enum(name) => self.enum_schema(name),
            FieldKind::Group(name) => {
                Err(SchemaError::Unsupported(format!("group field type {name}")))
            }
            FieldKind::Bytes => Ok(json!({ "type": "string", "description": BYTES_DESCRIPTION })),
            scalar => match kind_to_type(scalar) {
                Some(json_type) => Ok(json!({ "type": json_type })),
                None => Err(SchemaError::Unsupported(format!("field kind {scalar}"))),
            },
        }
    }

    /// Compiles an enum reference as an integer with the legal values described.
    fn enum_schema(&self, full_name: &str) -> Result<Value, SchemaError> {
        let enumeration = self
            .descriptors
            .enumeration(full_name)
            .ok_or_else(|| SchemaError::UnknownType(full_name.to_string()))?;
        let values = enumeration
            .values
            .iter()
            .map(|(name, number)| format!("{name} ({number})"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut description = format!("Enum {}. Allowed values: {values}.", enumeration.name());
        if let Some(comment) = &enumeration.comment {
            description = format!("{comment}\n\n{description}");
        }
        Ok(json!({ "type": "integer", "description": description }))
    }

    /// Compiles a oneof group into `{ "oneOf": [variants] }`.
    fn oneof_schema(
        &self,
        members: &[&FieldDescriptor],
        definitions: &mut Definitions,
    ) -> Result<Value, SchemaError> {
        let mut variants = Vec::with_capacity(members.len());
        for member in members {
            variants.push(self.oneof_variant(member, definitions)?);
        }
        Ok(json!({ "oneOf": variants }))
    }

    /// Compiles one oneof member into a discriminated variant object.
    fn oneof_variant(
        &self,
        field: &FieldDescriptor,
        definitions: &mut Definitions,
    ) -> Result<Value, SchemaError> {
        let discriminator = json!({ "type": "string", "const": field.name });
        if let Some(inlined) = self.inline_message_variant(field, &discriminator, definitions)? {
            return Ok(inlined);
        }
        let payload = self.field_schema(field, definitions)?;
        let mut properties = Map::new();
        properties.insert(DISCRIMINATOR_KEY.to_string(), discriminator);
        properties.insert(field.name.clone(), payload);
        Ok(json!({
            "type": "object",
            "properties": properties,
            "required": [DISCRIMINATOR_KEY, field.name],
            "additionalProperties": false,
        }))
    }

    /// Inlines a message member's properties next to the discriminator.
    ///
    /// Returns `None` when the member is not a plain message, when its
    /// definition is still in progress, or when its properties would collide
    /// with the discriminator or the member name.
    fn inline_message_variant(
        &self,
        field: &FieldDescriptor,
        discriminator: &Value,
        definitions: &mut Definitions,
    ) -> Result<Option<Value>, SchemaError> {
        let FieldKind::Message(name) = &field.kind else {
            return Ok(None);
        };
        if field.cardinality != Cardinality::Singular || WellKnownType::from_name(name).is_some() {
            return Ok(None);
        }
        let name = self.ensure_definition(name, definitions)?;
        let Some(Value::Object(definition)) = definitions.get(name) else {
            return Ok(None);
        };
        let Some(Value::Object(member_properties)) = definition.get("properties") else {
            return Ok(None);
        };
        if member_properties.contains_key(DISCRIMINATOR_KEY)
            || member_properties.contains_key(&field.name)
        {
            return Ok(None);
        }

        let mut properties = Map::new();
        properties.insert(DISCRIMINATOR_KEY.to_string(), discriminator.clone());
        properties.extend(member_properties.iter().map(|(key, value)| (key.clone(), value.clone())));
        let mut required = vec![json!(DISCRIMINATOR_KEY)];
        if let Some(Value::Array(member_required)) = definition.get("required") {
            required.extend(member_required.iter().cloned());
        }

        let mut variant = Map::new();
        variant.insert("type".to_string(), json!("object"));
        variant.insert("properties".to_string(), Value::Object(properties));
        variant.insert("required".to_string(), Value::Array(required));
        variant.insert("additionalProperties".to_string(), Value::Bool(false));
        let description = field.comment.clone().or_else(|| {
            definition.get("description").and_then(Value::as_str).map(str::to_string)
        });
        if let Some(description) = description {
            variant.insert("description".to_string(), Value::String(description));
        }
        Ok(Some(Value::Object(variant)))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the `$ref` pointer for a definition name.
fn definition_ref(full_name: &str) -> String {
    format!("#/$defs/{full_name}")
}

/// Compiles the `propertyNames` schema for a map key kind.
fn map_key_schema(field_name: &str, key: &FieldKind) -> Result<Value, SchemaError> {
    match key {
        FieldKind::String => Ok(json!({ "type": "string" })),
        FieldKind::Bool => Ok(json!({
            "type": "string",
            "description": "Boolean map key: \"true\" or \"false\"."
        })),
        FieldKind::Int32
        | FieldKind::Int64
        | FieldKind::Uint32
        | FieldKind::Uint64
        | FieldKind::Sint32
        | FieldKind::Sint64
        | FieldKind::Fixed32
        | FieldKind::Fixed64
        | FieldKind::Sfixed32
        | FieldKind::Sfixed64 => Ok(json!({
            "type": "string",
            "description": "Decimal integer map key."
        })),
        FieldKind::Double
        | FieldKind::Float
        | FieldKind::Bytes
        | FieldKind::Enum(_)
        | FieldKind::Message(_)
        | FieldKind::Group(_) => Err(SchemaError::Unsupported(format!(
            "map field {field_name} has invalid key kind {key}"
        ))),
    }
}

/// Inserts a property, rejecting duplicates.
fn insert_property(
    properties: &mut Map<String, Value>,
    owner: &str,
    name: &str,
    schema: Value,
) -> Result<(), SchemaError> {
    if properties.contains_key(name) {
        return Err(SchemaError::Conflict(format!("{owner} declares property {name} twice")));
    }
    properties.insert(name.to_string(), schema);
    Ok(())
}

/// Sets `description`, keeping any generated description after the comment.
fn attach_description(schema: &mut Value, comment: &str) {
    let Value::Object(map) = schema else {
        return;
    };
    let description = match map.get("description").and_then(Value::as_str) {
        Some(existing) => format!("{comment}\n\n{existing}"),
        None => comment.to_string(),
    };
    map.insert("description".to_string(), Value::String(description));
}
