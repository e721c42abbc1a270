// crates/protomcp-runtime/src/flatten.rs
// ============================================================================
// Module: Oneof Flattener
// Description: Rewrites discriminated oneof wrappers into protobuf JSON.
// Purpose: Bridge the schema's oneof encoding and strict protobuf decoding.
// Dependencies: protomcp-schema, serde_json, tracing
// ============================================================================

//! ## Overview
//! A wrapper is an object stored under a key ending in `OneOfType` that holds
//! a string `object_type` discriminator `T`. It is replaced, at the same
//! position in its parent, by a key `T` holding:
//! - the wrapper's value at key `T`, when that key exists (nested variant);
//! - otherwise the wrapper without `object_type` (inlined variant).
//!
//! When the parent already has a sibling named `T`, the promoted value
//! replaces it. Malformed wrappers (no discriminator, non-string
//! discriminator, non-object wrapper) are left as they are; strict decoding
//! rejects them later. Every value of every object and every array element
//! is visited, so wrappers nested at any depth are rewritten. Input without
//! wrappers is returned unchanged, and flattening twice equals flattening once.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use protomcp_schema::DISCRIMINATOR_KEY;
use protomcp_schema::ONEOF_SUFFIX;
use serde_json::Map;
use serde_json::Value;
use tracing::trace;

// ============================================================================
// SECTION: Flattening
// ============================================================================

/// Rewrites every oneof wrapper in `value`, in place.
pub fn flatten_oneofs(value: &mut Value) {
    match value {
        Value::Object(map) => flatten_object(map),
        Value::Array(items) => items.iter_mut().for_each(flatten_oneofs),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}

/// Returns `value` with every oneof wrapper rewritten.
#[must_use]
pub fn flattened(mut value: Value) -> Value {
    flatten_oneofs(&mut value);
    value
}

/// Rewrites the wrappers of one object, then recurses into its values.
///
/// Flattening a child can turn it into a well-shaped wrapper, so the level is
/// checked again afterwards and the pass repeats until it is stable.
fn flatten_object(map: &mut Map<String, Value>) {
    loop {
        rewrite_wrappers(map);
        map.values_mut().for_each(flatten_oneofs);
        if !map.iter().any(|(key, value)| wrapper_target(key, value).is_some()) {
            return;
        }
    }
}

/// Replaces every wrapper key of one object with its promoted variant.
///
/// A promoted key may itself name a wrapper, so rounds repeat until none
/// remains; each round removes at least one discriminator.
fn rewrite_wrappers(map: &mut Map<String, Value>) {
    loop {
        let targets: Vec<String> = map
            .iter()
            .filter_map(|(key, value)| wrapper_target(key, value).map(str::to_string))
            .collect();
        if targets.is_empty() {
            return;
        }
        let entries = std::mem::take(map);
        for (key, value) in entries {
            if let Some(target) = wrapper_target(&key, &value).map(str::to_string) {
                trace!(wrapper = %key, variant = %target, "flattening oneof wrapper");
                let promoted = promote(value, &target);
                map.shift_remove(&target);
                map.insert(target, promoted);
            } else if !targets.contains(&key) {
                map.insert(key, value);
            }
        }
    }
}

/// Returns the discriminator when `key`/`value` form a well-shaped wrapper.
fn wrapper_target<'a>(key: &str, value: &'a Value) -> Option<&'a str> {
    if !key.ends_with(ONEOF_SUFFIX) {
        return None;
    }
    value.as_object()?.get(DISCRIMINATOR_KEY)?.as_str()
}

/// Extracts the variant payload from a wrapper.
fn promote(wrapper: Value, target: &str) -> Value {
    let Value::Object(mut wrapper) = wrapper else {
        return wrapper;
    };
    if let Some(nested) = wrapper.shift_remove(target) {
        return nested;
    }
    wrapper.shift_remove(DISCRIMINATOR_KEY);
    Value::Object(wrapper)
}
