// crates/protomcp-config/src/config.rs
// ============================================================================
// Module: protomcp Generator Configuration
// Description: Loading and validation of protomcp.toml.
// Purpose: Provide strict, fail-closed generator settings with hard limits.
// Dependencies: protomcp-schema, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file no larger than 1 MiB. Unknown keys,
//! out-of-range limits, and malformed extra properties are rejected rather than
//! ignored, so a typo never silently changes the generated contracts.
//!
//! Path resolution: an explicit path wins, then the `PROTOMCP_CONFIG`
//! environment variable, then `protomcp.toml` in the working directory.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use protomcp_schema::CompileOptions;
use protomcp_schema::DEFAULT_MAX_TOOL_NAME_LEN;
use protomcp_schema::DescriptorSet;
use protomcp_schema::ExtraProperty;
use protomcp_schema::ToolCompiler;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "protomcp.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "PROTOMCP_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Smallest accepted tool name limit.
pub const MIN_TOOL_NAME_LEN: usize = 16;
/// Largest accepted tool name limit.
pub const MAX_TOOL_NAME_LEN: usize = 256;
/// Maximum number of extra properties.
pub const MAX_EXTRA_PROPERTIES: usize = 32;
/// Maximum length of an extra property name or context key.
const MAX_EXTRA_NAME_LENGTH: usize = 128;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Configuration Model
// ============================================================================

/// Generator configuration.
///
/// # Invariants
/// - A value returned by [`GeneratorConfig::load`] has passed [`GeneratorConfig::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Schema compilation settings.
    #[serde(default)]
    pub schema: SchemaConfig,
    /// Tool naming settings.
    #[serde(default)]
    pub naming: NamingConfig,
    /// Extra tool input properties.
    #[serde(default)]
    pub extra_properties: Vec<ExtraProperty>,
}

/// `[schema]` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    /// Read presence from the proto3 `optional` keyword.
    #[serde(default)]
    pub optional_keyword_support: bool,
}

/// `[naming]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamingConfig {
    /// Maximum tool name length.
    #[serde(default = "default_max_tool_name_len")]
    pub max_tool_name_len: usize,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            max_tool_name_len: DEFAULT_MAX_TOOL_NAME_LEN,
        }
    }
}

/// Serde default for [`NamingConfig::max_tool_name_len`].
const fn default_max_tool_name_len() -> usize {
    DEFAULT_MAX_TOOL_NAME_LEN
}

impl GeneratorConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.naming.validate()?;
        validate_extra_properties(&self.extra_properties)
    }

    /// Returns the schema compiler options.
    #[must_use]
    pub const fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            optional_keyword_support: self.schema.optional_keyword_support,
        }
    }

    /// Builds a tool compiler over `descriptors` with these settings.
    #[must_use]
    pub fn tool_compiler<'a>(&self, descriptors: &'a DescriptorSet) -> ToolCompiler<'a> {
        ToolCompiler::new(descriptors, self.compile_options())
            .with_extra_properties(self.extra_properties.clone())
            .with_max_name_len(self.naming.max_tool_name_len)
    }
}

impl NamingConfig {
    /// Validates naming limits.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_TOOL_NAME_LEN..=MAX_TOOL_NAME_LEN).contains(&self.max_tool_name_len) {
            return Err(ConfigError::Invalid(format!(
                "naming.max_tool_name_len must be between {MIN_TOOL_NAME_LEN} and \
                 {MAX_TOOL_NAME_LEN}"
            )));
        }
        Ok(())
    }
}

/// Validates extra property entries.
fn validate_extra_properties(extra_properties: &[ExtraProperty]) -> Result<(), ConfigError> {
    if extra_properties.len() > MAX_EXTRA_PROPERTIES {
        return Err(ConfigError::Invalid(format!(
            "extra_properties exceeds max entries ({MAX_EXTRA_PROPERTIES})"
        )));
    }
    let mut names = BTreeSet::new();
    let mut context_keys = BTreeSet::new();
    for extra in extra_properties {
        validate_identifier("extra_properties.name", &extra.name)?;
        let context_key = extra.context_key.trim();
        if context_key.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "extra_properties.context_key for {} must be non-empty",
                extra.name
            )));
        }
        if context_key.len() > MAX_EXTRA_NAME_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "extra_properties.context_key for {} exceeds max length",
                extra.name
            )));
        }
        if !names.insert(extra.name.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "duplicate extra property name: {}",
                extra.name
            )));
        }
        if !context_keys.insert(context_key) {
            return Err(ConfigError::Invalid(format!(
                "duplicate extra property context_key: {context_key}"
            )));
        }
    }
    Ok(())
}

/// Requires an ASCII identifier (`[A-Za-z_][A-Za-z0-9_]*`).
fn validate_identifier(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if value.len() > MAX_EXTRA_NAME_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let mut chars = value.chars();
    let leading_ok = chars.next().is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_');
    if !leading_ok || !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
        return Err(ConfigError::Invalid(format!("{field} must be an identifier: {value}")));
    }
    Ok(())
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the caller or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}
