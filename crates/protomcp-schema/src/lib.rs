// crates/protomcp-schema/src/lib.rs
// ============================================================================
// Module: protomcp Schema Library
// Description: Protobuf descriptor to JSON Schema compiler for MCP tools.
// Purpose: Produce deterministic tool-call contracts from message descriptors.
// Dependencies: prost, prost-types, serde, serde_json, sha2, thiserror, tracing
// ============================================================================

//! ## Overview
//! `protomcp-schema` walks resolved protobuf descriptors and compiles them into
//! JSON Schema (2020-12 subset) documents usable as MCP tool input contracts.
//! Every distinct message type is emitted once into a shared `$defs` table and
//! referenced by `$ref` elsewhere, which keeps recursive type graphs finite.
//!
//! Oneof groups are exposed as `<oneof>OneOfType` properties holding a
//! discriminated `oneOf`; `protomcp-runtime` reverses that encoding at call
//! time before the payload reaches a strict decoder.
//!
//! ## Index
//! - Descriptors: [`DescriptorSet`], [`MessageDescriptor`], [`FieldDescriptor`]
//! - Compilation: [`SchemaCompiler`], [`Definitions`], [`CompileOptions`]
//! - Policy: [`is_field_required`]
//! - Tools: [`ToolCompiler`], [`ToolDefinition`], [`ExtraProperty`]
//! - Naming: [`tool_name`], [`mangle_head_if_too_long`]

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod compiler;
pub mod definitions;
pub mod descriptor;
pub mod naming;
pub mod policy;
pub mod tooling;
pub mod well_known;

// ============================================================================
// SECTION: Errors
// ============================================================================

use thiserror::Error;

/// Errors raised while compiling descriptors into schemas.
///
/// # Invariants
/// - Variants carry human-readable context naming the offending type or field.
/// - A failed compilation never leaves a half-built entry in [`Definitions`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A referenced message, enum, or service is not present in the descriptor set.
    #[error("unknown type: {0}")]
    UnknownType(String),
    /// Descriptor shape the compiler cannot express as JSON Schema.
    #[error("unsupported descriptor: {0}")]
    Unsupported(String),
    /// Two schema properties would share the same name.
    #[error("property conflict: {0}")]
    Conflict(String),
    /// Raw descriptor input could not be decoded.
    #[error("descriptor error: {0}")]
    Descriptor(String),
}

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use compiler::CompileOptions;
pub use compiler::DISCRIMINATOR_KEY;
pub use compiler::ONEOF_SUFFIX;
pub use compiler::SchemaCompiler;
pub use compiler::kind_to_type;
pub use definitions::Definitions;
pub use descriptor::Cardinality;
pub use descriptor::DescriptorSet;
pub use descriptor::EnumDescriptor;
pub use descriptor::FieldDescriptor;
pub use descriptor::FieldKind;
pub use descriptor::MessageDescriptor;
pub use descriptor::MethodDescriptor;
pub use descriptor::ServiceDescriptor;
pub use naming::DEFAULT_MAX_TOOL_NAME_LEN;
pub use naming::mangle_head_if_too_long;
pub use naming::tool_name;
pub use policy::is_field_required;
pub use policy::is_oneof_required;
pub use tooling::ExtraProperty;
pub use tooling::ToolCompiler;
pub use tooling::ToolDefinition;
pub use well_known::WellKnownType;
