// crates/protomcp-runtime/src/extras.rs
// ============================================================================
// Module: Extra Property Extraction
// Description: Lifts caller-declared extra properties out of tool arguments.
// Purpose: Keep non-protobuf inputs away from strict request decoding.
// Dependencies: protomcp-schema, serde_json, tracing
// ============================================================================

//! ## Overview
//! Extra properties are advertised in the tool input schema as top-level
//! strings but have no protobuf field behind them. They are removed from the
//! argument object here and handed to the caller keyed by their context key.

use std::collections::BTreeMap;

use protomcp_schema::ExtraProperty;
use serde_json::Value;
use tracing::debug;

use crate::RuntimeError;

/// Extra property values keyed by context key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraContext {
    /// Values by context key.
    values: BTreeMap<String, String>,
}

impl ExtraContext {
    /// Returns the value stored under `context_key`.
    #[must_use]
    pub fn get(&self, context_key: &str) -> Option<&str> {
        self.values.get(context_key).map(String::as_str)
    }

    /// Number of extracted values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when nothing was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Removes the declared extra properties from the root of `arguments`.
///
/// A `null` value counts as absent. Non-object arguments carry no extra
/// properties.
///
/// # Errors
///
/// Returns [`RuntimeError::MissingExtraProperty`] when a required property is
/// absent and [`RuntimeError::InvalidParams`] when a value is not a string.
pub fn extract_extra_properties(
    arguments: &mut Value,
    extra_properties: &[ExtraProperty],
) -> Result<ExtraContext, RuntimeError> {
    let mut context = ExtraContext::default();
    let mut root = arguments.as_object_mut();
    for extra in extra_properties {
        let value = root.as_mut().and_then(|map| map.shift_remove(&extra.name));
        match value {
            None | Some(Value::Null) if extra.required => {
                return Err(RuntimeError::MissingExtraProperty(extra.name.clone()));
            }
            None | Some(Value::Null) => {}
            Some(Value::String(text)) => {
                debug!(property = %extra.name, context_key = %extra.context_key, "extracted extra property");
                context.values.insert(extra.context_key.clone(), text);
            }
            Some(_) => {
                return Err(RuntimeError::InvalidParams(format!(
                    "extra property {} must be a string",
                    extra.name
                )));
            }
        }
    }
    Ok(context)
}
