// crates/protomcp-schema/src/tooling.rs
// ============================================================================
// Module: MCP Tool Contracts
// Description: Tool definitions compiled from protobuf service descriptors.
// Purpose: Provide `tools/list` entries with strict, deterministic input schemas.
// Dependencies: serde, serde_json, crate::{compiler, descriptor, naming}
// ============================================================================

//! ## Overview
//! Each unary RPC method becomes one MCP tool: the name is derived from the
//! fully-qualified method name, the description from the method comment, and
//! the input schema from the request message. Caller-declared
//! [`ExtraProperty`] entries are merged into the top-level input schema; they
//! do not correspond to protobuf fields and are stripped again at call time.
//!
//! Streaming methods are skipped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::SchemaError;
use crate::compiler::CompileOptions;
use crate::compiler::SchemaCompiler;
use crate::descriptor::DescriptorSet;
use crate::descriptor::MethodDescriptor;
use crate::descriptor::ServiceDescriptor;
use crate::naming::DEFAULT_MAX_TOOL_NAME_LEN;
use crate::naming::mangle_head_if_too_long;
use crate::naming::tool_name;

// ============================================================================
// SECTION: Contract Types
// ============================================================================

/// Tool input property that is not backed by a protobuf field.
///
/// # Invariants
/// - `context_key` identifies where the runtime stores the extracted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtraProperty {
    /// Property name in the tool input object.
    pub name: String,
    /// Property description for clients.
    pub description: String,
    /// Whether the property must be supplied.
    #[serde(default)]
    pub required: bool,
    /// Key under which the runtime propagates the value.
    pub context_key: String,
}

/// Tool definition used by MCP tool listing.
///
/// # Invariants
/// - `name` is within the configured length limit.
/// - `input_schema` is a JSON Schema object with its `$defs` attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// MCP tool name.
    pub name: String,
    /// Tool description for clients.
    pub description: String,
    /// JSON schema for tool input.
    pub input_schema: Value,
}

// ============================================================================
// SECTION: Tool Compiler
// ============================================================================

/// Builds [`ToolDefinition`]s for the services of a [`DescriptorSet`].
#[derive(Debug, Clone)]
pub struct ToolCompiler<'a> {
    /// Schema compiler used for request messages.
    compiler: SchemaCompiler<'a>,
    /// Extra properties merged into every input schema.
    extra_properties: Vec<ExtraProperty>,
    /// Maximum tool name length.
    max_name_len: usize,
}

impl<'a> ToolCompiler<'a> {
    /// Creates a tool compiler with no extra properties and the default name limit.
    #[must_use]
    pub const fn new(descriptors: &'a DescriptorSet, options: CompileOptions) -> Self {
        Self {
            compiler: SchemaCompiler::new(descriptors, options),
            extra_properties: Vec::new(),
            max_name_len: DEFAULT_MAX_TOOL_NAME_LEN,
        }
    }

    /// Sets the extra properties merged into every input schema.
    #[must_use]
    pub fn with_extra_properties(mut self, extra_properties: Vec<ExtraProperty>) -> Self {
        self.extra_properties = extra_properties;
        self
    }

    /// Sets the maximum tool name length.
    #[must_use]
    pub const fn with_max_name_len(mut self, max_name_len: usize) -> Self {
        self.max_name_len = max_name_len;
        self
    }

    /// Compiles tools for every service, ordered by service name.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when a request schema fails to compile or two
    /// tools end up with the same name.
    pub fn all_tools(&self) -> Result<Vec<ToolDefinition>, SchemaError> {
        let mut tools = Vec::new();
        for service in self.compiler.descriptors().services() {
            tools.extend(self.tools_for(service)?);
        }
        ensure_unique_names(&tools)?;
        Ok(tools)
    }

    /// Compiles tools for one service in method declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the service is unknown or a request schema fails.
    pub fn service_tools(&self, service_name: &str) -> Result<Vec<ToolDefinition>, SchemaError> {
        let service = self
            .compiler
            .descriptors()
            .service(service_name)
            .ok_or_else(|| SchemaError::UnknownType(service_name.to_string()))?;
        let tools = self.tools_for(service)?;
        ensure_unique_names(&tools)?;
        Ok(tools)
    }

    /// Compiles the tool for a single method.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the method streams or its request schema fails.
    pub fn method_tool(
        &self,
        service: &ServiceDescriptor,
        method: &MethodDescriptor,
    ) -> Result<ToolDefinition, SchemaError> {
        if method.is_streaming() {
            return Err(SchemaError::Unsupported(format!(
                "streaming method {}.{}",
                service.full_name, method.name
            )));
        }
        let full_name = format!("{}.{}", service.full_name, method.name);
        let description = method
            .comment
            .clone()
            .unwrap_or_else(|| format!("Calls {}.{}.", service.name(), method.name));
        Ok(ToolDefinition {
            name: mangle_head_if_too_long(&tool_name(&full_name), self.max_name_len),
            description,
            input_schema: self.input_schema(&method.input_type)?,
        })
    }

    /// Compiles a request message schema with the extra properties merged in.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Conflict`] when an extra property shadows a field
    /// or two extra properties share a name.
    pub fn input_schema(&self, message_name: &str) -> Result<Value, SchemaError> {
        let mut schema = self.compiler.root_schema(message_name)?;
        if self.extra_properties.is_empty() {
            return Ok(schema);
        }
        ensure_unique_extra_properties(&self.extra_properties)?;
        let Value::Object(root) = &mut schema else {
            return Ok(schema);
        };
        if let Some(Value::Object(properties)) = root.get_mut("properties") {
            for extra in &self.extra_properties {
                if properties.contains_key(&extra.name) {
                    return Err(SchemaError::Conflict(format!(
                        "extra property {} shadows a field of {message_name}",
                        extra.name
                    )));
                }
                properties.insert(
                    extra.name.clone(),
                    json!({ "type": "string", "description": extra.description }),
                );
            }
        }
        if let Some(Value::Array(required)) = root.get_mut("required") {
            required.extend(
                self.extra_properties
                    .iter()
                    .filter(|extra| extra.required)
                    .map(|extra| Value::String(extra.name.clone())),
            );
        }
        Ok(schema)
    }

    /// Compiles every unary method of `service`.
    fn tools_for(&self, service: &ServiceDescriptor) -> Result<Vec<ToolDefinition>, SchemaError> {
        service
            .methods
            .iter()
            .filter(|method| !method.is_streaming())
            .map(|method| self.method_tool(service, method))
            .collect()
    }
}

/// Rejects extra property lists that declare one name twice.
fn ensure_unique_extra_properties(extra_properties: &[ExtraProperty]) -> Result<(), SchemaError> {
    let mut seen = BTreeSet::new();
    for extra in extra_properties {
        if !seen.insert(extra.name.as_str()) {
            return Err(SchemaError::Conflict(format!("duplicate extra property {}", extra.name)));
        }
    }
    Ok(())
}

/// Rejects tool lists where two methods collapse onto one name.
fn ensure_unique_names(tools: &[ToolDefinition]) -> Result<(), SchemaError> {
    let mut seen = BTreeSet::new();
    for tool in tools {
        if !seen.insert(tool.name.as_str()) {
            return Err(SchemaError::Conflict(format!("duplicate tool name {}", tool.name)));
        }
    }
    Ok(())
}
