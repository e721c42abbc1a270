// crates/protomcp-runtime/src/call.rs
// ============================================================================
// Module: Prepared Tool Calls
// Description: Argument normalisation ahead of strict request decoding.
// Purpose: Run extra-property extraction and oneof flattening in one step.
// Dependencies: protomcp-schema, serde, serde_json
// ============================================================================

//! ## Overview
//! [`PreparedCall::prepare`] takes the raw `arguments` of an MCP tool call,
//! lifts the extra properties out, flattens oneof wrappers, and keeps the
//! resulting protobuf JSON ready for [`PreparedCall::decode`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use protomcp_schema::ExtraProperty;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;

use crate::RuntimeError;
use crate::extras::ExtraContext;
use crate::extras::extract_extra_properties;
use crate::flatten::flatten_oneofs;

// ============================================================================
// SECTION: Prepared Call
// ============================================================================

/// Tool arguments rewritten into protobuf JSON plus extracted extra values.
///
/// # Invariants
/// - `payload` is an object with no oneof wrappers and no extra properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCall {
    /// Flattened request payload.
    payload: Value,
    /// Extra property values by context key.
    context: ExtraContext,
}

impl PreparedCall {
    /// Normalises raw tool arguments.
    ///
    /// Absent (`null`) arguments are treated as an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::InvalidParams`] when the arguments are not an
    /// object, or any error from [`extract_extra_properties`].
    pub fn prepare(
        arguments: Value,
        extra_properties: &[ExtraProperty],
    ) -> Result<Self, RuntimeError> {
        let mut payload = match arguments {
            Value::Null => Value::Object(Map::new()),
            Value::Object(map) => Value::Object(map),
            Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_) => {
                return Err(RuntimeError::InvalidParams(
                    "tool arguments must be a JSON object".to_string(),
                ));
            }
        };
        let context = extract_extra_properties(&mut payload, extra_properties)?;
        flatten_oneofs(&mut payload);
        Ok(Self {
            payload,
            context,
        })
    }

    /// Returns the flattened payload.
    #[must_use]
    pub const fn payload(&self) -> &Value {
        &self.payload
    }

    /// Returns the extracted extra property values.
    #[must_use]
    pub const fn context(&self) -> &ExtraContext {
        &self.context
    }

    /// Decodes the payload into a request type.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::InvalidParams`] when the payload does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, RuntimeError> {
        serde_json::from_value(self.payload.clone())
            .map_err(|err| RuntimeError::InvalidParams(err.to_string()))
    }

    /// Splits the call into its payload and extra context.
    #[must_use]
    pub fn into_parts(self) -> (Value, ExtraContext) {
        (self.payload, self.context)
    }
}
