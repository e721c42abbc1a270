// crates/protomcp-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for generator config tests.
// Purpose: Reduce duplication across integration tests for protomcp-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::fs;
use std::path::PathBuf;

use protomcp_config::ConfigError;
use protomcp_config::GeneratorConfig;
use protomcp_schema::ExtraProperty;
use tempfile::TempDir;

/// Result type used by config tests.
pub type TestResult = Result<(), String>;

/// Parses a TOML string into a `GeneratorConfig` without validating it.
pub fn config_from_toml(toml_str: &str) -> Result<GeneratorConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a config with all defaults applied.
pub fn minimal_config() -> Result<GeneratorConfig, toml::de::Error> {
    config_from_toml("")
}

/// Builds an extra property with the given name and context key.
pub fn extra_property(name: &str, context_key: &str) -> ExtraProperty {
    ExtraProperty {
        name: name.to_string(),
        description: format!("{name} value"),
        required: false,
        context_key: context_key.to_string(),
    }
}

/// Writes `contents` to `protomcp.toml` in a fresh temporary directory.
pub fn write_config(contents: &[u8]) -> Result<(TempDir, PathBuf), String> {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("protomcp.toml");
    fs::write(&path, contents).map_err(|err| err.to_string())?;
    Ok((dir, path))
}

/// Asserts that a result is an error whose message contains `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
