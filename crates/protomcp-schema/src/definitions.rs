// crates/protomcp-schema/src/definitions.rs
// ============================================================================
// Module: Schema Definitions Table
// Description: Shared `$defs` pool for one compilation run.
// Purpose: Emit each message type once and make recursive references finite.
// Dependencies: serde_json, tracing
// ============================================================================

//! ## Overview
//! A [`Definitions`] table maps fully-qualified message names to their compiled
//! object schemas. A name is reserved *before* the compiler walks the message's
//! fields, so a self-reference (direct or mutual) finds the reservation and
//! resolves to a `$ref` instead of re-entering compilation.
//!
//! The table is an explicit context object: one instance per compilation run,
//! passed by `&mut` through every recursive call. Sharing one table across
//! concurrent compilations needs external synchronisation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde_json::Map;
use serde_json::Value;
use tracing::debug;

// ============================================================================
// SECTION: Definitions Table
// ============================================================================

/// `$defs` table shared across one compilation run.
///
/// # Invariants
/// - A name is inserted at most once; reservation precedes field compilation.
/// - Entries keep reservation order, so parents precede the types they reference.
/// - [`Definitions::into_value`] only ever sees completed entries when the run succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definitions {
    /// Compiled schemas by full name; reserved entries hold `null`.
    entries: Map<String, Value>,
    /// Names reserved but not yet completed.
    in_progress: BTreeSet<String>,
}

impl Definitions {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the name is reserved or completed.
    #[must_use]
    pub fn contains(&self, full_name: &str) -> bool {
        self.entries.contains_key(full_name)
    }

    /// Returns true when the name is reserved and still being compiled.
    #[must_use]
    pub fn is_in_progress(&self, full_name: &str) -> bool {
        self.in_progress.contains(full_name)
    }

    /// Returns a completed schema.
    #[must_use]
    pub fn get(&self, full_name: &str) -> Option<&Value> {
        if self.is_in_progress(full_name) {
            return None;
        }
        self.entries.get(full_name)
    }

    /// Number of reserved or completed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no entry exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the table into a `$defs` JSON object.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.entries)
    }

    /// Reserves a name; returns false when it was already present.
    pub(crate) fn reserve(&mut self, full_name: &str) -> bool {
        if self.contains(full_name) {
            return false;
        }
        debug!(definition = full_name, "reserved schema definition");
        self.entries.insert(full_name.to_string(), Value::Null);
        self.in_progress.insert(full_name.to_string());
        true
    }

    /// Stores the compiled schema for a reserved name.
    pub(crate) fn complete(&mut self, full_name: &str, schema: Value) {
        self.in_progress.remove(full_name);
        if let Some(slot) = self.entries.get_mut(full_name) {
            *slot = schema;
            debug!(definition = full_name, "completed schema definition");
        }
    }

    /// Drops a reservation whose compilation failed.
    pub(crate) fn abandon(&mut self, full_name: &str) {
        if self.in_progress.remove(full_name) {
            self.entries.shift_remove(full_name);
            debug!(definition = full_name, "abandoned schema definition");
        }
    }
}
