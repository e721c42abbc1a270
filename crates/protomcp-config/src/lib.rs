// crates/protomcp-config/src/lib.rs
// ============================================================================
// Module: protomcp Config Library
// Description: Generator configuration model and validation.
// Purpose: Single source of truth for protomcp.toml semantics.
// Dependencies: protomcp-schema, serde, toml
// ============================================================================

//! ## Overview
//! `protomcp-config` defines the configuration read by the tool generator:
//! schema compilation switches, tool naming limits, and extra tool input
//! properties. Validation is strict and fail-closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
