// crates/protomcp-schema/src/policy.rs
// ============================================================================
// Module: Required-Field Policy
// Description: Decides which properties land in a schema's `required` list.
// Purpose: Keep the required computation pure and independent of compilation.
// Dependencies: crate::descriptor
// ============================================================================

//! ## Overview
//! Without explicit-optional support every plain proto3 field may be omitted,
//! so only annotated fields are required. With support enabled, presence is
//! read from the proto3 `optional` keyword: unmarked fields become required.
//! Repeated and map fields are never required because an empty collection is
//! indistinguishable from an absent one on the wire.

use crate::descriptor::FieldDescriptor;

/// Returns true when `field` belongs in the message schema's `required` list.
#[must_use]
pub const fn is_field_required(field: &FieldDescriptor, optional_keyword_support: bool) -> bool {
    if field.is_list() || field.is_map() {
        return false;
    }
    if field.required_annotation {
        return true;
    }
    optional_keyword_support && !field.proto3_optional
}

/// Returns true when a oneof group's `<oneof>OneOfType` property is required.
#[must_use]
pub fn is_oneof_required(members: &[&FieldDescriptor], optional_keyword_support: bool) -> bool {
    optional_keyword_support || members.iter().any(|field| field.required_annotation)
}
