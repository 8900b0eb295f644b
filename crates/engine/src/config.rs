//! Engine configuration
//!
//! Configuration is plain data with builder-style setters. Defaults are
//! embedded from `defaults.toml`; a user file only needs the keys it changes.
//!
//! # Example
//!
//! ```rust,ignore
//! use curry_engine::{Curry, EngineConfig};
//!
//! let config = EngineConfig::from_toml("max_arity = 8\nlog_invocations = true")?;
//! let vol = Curry::new(3, volume).with_config(&config).build()?;
//! ```

use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Embedded default configuration
pub static DEFAULT_CONFIG: &str = include_str!("defaults.toml");

/// Largest arity accepted unless configured otherwise.
/// Keeps accumulated argument lists bounded.
pub const DEFAULT_MAX_ARITY: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Largest declared arity accepted when wrapping a target
    pub max_arity: usize,

    /// Entries a new memo cache reserves up front
    pub memo_initial_capacity: usize,

    /// Emit target invocations at `debug` level instead of `trace`
    pub log_invocations: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_arity: DEFAULT_MAX_ARITY,
            memo_initial_capacity: 0,
            log_invocations: false,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        EngineConfig::default()
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        let config: EngineConfig = toml::from_str(toml_str)
            .map_err(|e| format!("Failed to parse engine config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read engine config {}: {}", path.display(), e))?;
        let config = Self::from_toml(&content)?;
        debug!(path = %path.display(), ?config, "loaded engine config");
        Ok(config)
    }

    /// Load the embedded default configuration
    pub fn default_config() -> Result<Self, String> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    fn validate(&self) -> Result<(), String> {
        if self.max_arity == 0 {
            return Err("max_arity must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn with_max_arity(mut self, max_arity: usize) -> Self {
        self.max_arity = max_arity;
        self
    }

    pub fn with_memo_initial_capacity(mut self, capacity: usize) -> Self {
        self.memo_initial_capacity = capacity;
        self
    }

    pub fn with_log_invocations(mut self, enabled: bool) -> Self {
        self.log_invocations = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_defaults_match_default_impl() {
        let config = EngineConfig::default_config().unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.max_arity, DEFAULT_MAX_ARITY);
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_toml("max_arity = 8").unwrap();
        assert_eq!(config.max_arity, 8);
        assert_eq!(config.memo_initial_capacity, 0);
        assert!(!config.log_invocations);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = EngineConfig::from_toml("max_arty = 8").unwrap_err();
        assert!(err.contains("Failed to parse engine config"), "{}", err);
    }

    #[test]
    fn test_zero_max_arity_rejected() {
        let err = EngineConfig::from_toml("max_arity = 0").unwrap_err();
        assert!(err.contains("max_arity"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "memo_initial_capacity = 64").unwrap();
        writeln!(file, "log_invocations = true").unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.memo_initial_capacity, 64);
        assert!(config.log_invocations);
        assert_eq!(config.max_arity, DEFAULT_MAX_ARITY);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = EngineConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.contains("Failed to read engine config"));
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .with_max_arity(4)
            .with_memo_initial_capacity(16)
            .with_log_invocations(true);
        assert_eq!(config.max_arity, 4);
        assert_eq!(config.memo_initial_capacity, 16);
        assert!(config.log_invocations);
    }
}
