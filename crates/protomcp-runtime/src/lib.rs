// crates/protomcp-runtime/src/lib.rs
// ============================================================================
// Module: protomcp Runtime Library
// Description: Request-time handling of protobuf-backed MCP tool calls.
// Purpose: Turn schema-shaped tool arguments into strictly decodable payloads.
// Dependencies: protomcp-schema, serde, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! Tool arguments arrive in the shape described by the compiled input schema:
//! oneof groups are wrapped in `<oneof>OneOfType` objects and caller-declared
//! extra properties sit beside the protobuf fields. This crate undoes both
//! before the payload reaches a strict decoder:
//! - [`flatten_oneofs`] rewrites oneof wrappers into plain protobuf JSON;
//! - [`extract_extra_properties`] lifts extra properties into an [`ExtraContext`];
//! - [`PreparedCall`] runs both steps and decodes the result into a request type.
//!
//! Everything here is pure and synchronous; independent requests can be
//! prepared concurrently.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod call;
pub mod extras;
pub mod flatten;

// ============================================================================
// SECTION: Errors
// ============================================================================

use thiserror::Error;

/// Errors raised while preparing a tool call.
///
/// # Invariants
/// - The flattener never produces these; malformed oneof wrappers surface as
///   [`RuntimeError::InvalidParams`] from strict decoding instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Arguments are not an object or do not decode into the request type.
    #[error("invalid params: {0}")]
    InvalidParams(String),
    /// A required extra property was not supplied.
    #[error("missing extra property: {0}")]
    MissingExtraProperty(String),
}

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use call::PreparedCall;
pub use extras::ExtraContext;
pub use extras::extract_extra_properties;
pub use flatten::flatten_oneofs;
pub use flatten::flattened;
