// crates/protomcp-schema/src/well_known.rs
// ============================================================================
// Module: Well-Known Types
// Description: JSON Schema shapes for google.protobuf well-known types.
// Purpose: Follow the canonical protobuf JSON mapping instead of message shapes.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Well-known types have conventional JSON encodings that differ from the
//! generic message encoding (a `Timestamp` is an RFC 3339 string, a `Struct`
//! is an arbitrary object). Recognition is by fully-qualified name; any other
//! `google.protobuf.*` message falls through to generic message handling.

use serde_json::Value;
use serde_json::json;

/// Well-known types with a dedicated schema.
///
/// # Invariants
/// - [`WellKnownType::from_name`] and [`WellKnownType::full_name`] are inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownType {
    /// `google.protobuf.Struct`.
    Struct,
    /// `google.protobuf.Value`.
    Value,
    /// `google.protobuf.ListValue`.
    ListValue,
    /// `google.protobuf.Timestamp`.
    Timestamp,
    /// `google.protobuf.Duration`.
    Duration,
    /// `google.protobuf.Empty`.
    Empty,
    /// `google.protobuf.FieldMask`.
    FieldMask,
    /// `google.protobuf.DoubleValue`.
    DoubleValue,
    /// `google.protobuf.FloatValue`.
    FloatValue,
    /// `google.protobuf.Int64Value`.
    Int64Value,
    /// `google.protobuf.UInt64Value`.
    UInt64Value,
    /// `google.protobuf.Int32Value`.
    Int32Value,
    /// `google.protobuf.UInt32Value`.
    UInt32Value,
    /// `google.protobuf.BoolValue`.
    BoolValue,
    /// `google.protobuf.StringValue`.
    StringValue,
    /// `google.protobuf.BytesValue`.
    BytesValue,
}

impl WellKnownType {
    /// Every recognised well-known type.
    pub const ALL: [Self; 16] = [
        Self::Struct,
        Self::Value,
        Self::ListValue,
        Self::Timestamp,
        Self::Duration,
        Self::Empty,
        Self::FieldMask,
        Self::DoubleValue,
        Self::FloatValue,
        Self::Int64Value,
        Self::UInt64Value,
        Self::Int32Value,
        Self::UInt32Value,
        Self::BoolValue,
        Self::StringValue,
        Self::BytesValue,
    ];

    /// Resolves a fully-qualified message name.
    #[must_use]
    pub fn from_name(full_name: &str) -> Option<Self> {
        let full_name = full_name.trim_start_matches('.');
        Self::ALL.into_iter().find(|wkt| wkt.full_name() == full_name)
    }

    /// Returns the fully-qualified message name.
    #[must_use]
    pub const fn full_name(self) -> &'static str {
        match self {
            Self::Struct => "google.protobuf.Struct",
            Self::Value => "google.protobuf.Value",
            Self::ListValue => "google.protobuf.ListValue",
            Self::Timestamp => "google.protobuf.Timestamp",
            Self::Duration => "google.protobuf.Duration",
            Self::Empty => "google.protobuf.Empty",
            Self::FieldMask => "google.protobuf.FieldMask",
            Self::DoubleValue => "google.protobuf.DoubleValue",
            Self::FloatValue => "google.protobuf.FloatValue",
            Self::Int64Value => "google.protobuf.Int64Value",
            Self::UInt64Value => "google.protobuf.UInt64Value",
            Self::Int32Value => "google.protobuf.Int32Value",
            Self::UInt32Value => "google.protobuf.UInt32Value",
            Self::BoolValue => "google.protobuf.BoolValue",
            Self::StringValue => "google.protobuf.StringValue",
            Self::BytesValue => "google.protobuf.BytesValue",
        }
    }

    /// Returns the schema for a field of this type.
    #[must_use]
    pub fn schema(self) -> Value {
        match self {
            Self::Struct => json!({ "type": "object", "additionalProperties": true }),
            Self::Value => json!({
                "description": "Accepts any dynamic JSON value: object, array, string, number, boolean, or null."
            }),
            Self::ListValue => json!({
                "type": "array",
                "items": {},
                "description": "A JSON array whose elements may be any dynamic JSON value."
            }),
            Self::Timestamp => json!({ "type": ["string", "null"], "format": "date-time" }),
            Self::Duration => json!({
                "type": "string",
                "description": "Duration in seconds with an \"s\" suffix, for example \"1.5s\"."
            }),
            Self::Empty => json!({ "type": "object", "properties": {}, "additionalProperties": false }),
            Self::FieldMask => json!({
                "type": "string",
                "description": "Comma-separated field paths in lowerCamelCase."
            }),
            Self::DoubleValue | Self::FloatValue => nullable("number"),
            Self::Int64Value | Self::UInt64Value | Self::StringValue | Self::BytesValue => {
                nullable("string")
            }
            Self::Int32Value | Self::UInt32Value => nullable("integer"),
            Self::BoolValue => nullable("boolean"),
        }
    }
}

/// Builds a `[type, null]` schema for wrapper types.
fn nullable(json_type: &str) -> Value {
    json!({ "type": [json_type, "null"] })
}
