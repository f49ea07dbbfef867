//! Configuration for the Braze runtime.
//!
//! Configuration is assembled with figment in three layers, later layers
//! overriding earlier ones:
//!
//! 1. built-in defaults,
//! 2. an optional TOML file (`braze.toml` in the working directory, or an
//!    explicit path),
//! 3. environment variables prefixed with `BRAZE_` (nested keys separated
//!    by `__`, e.g. `BRAZE_LOGGING__LEVEL=debug`).

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::error::ConfigResult;

/// The default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "braze.toml";

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrazeConfig {
    /// Logging setup.
    pub logging: LoggingConfig,
    /// Runtime tuning.
    pub runtime: RuntimeConfig,
}

impl BrazeConfig {
    /// Loads configuration from defaults, `braze.toml` (if present), and
    /// `BRAZE_`-prefixed environment variables.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(None)
    }

    /// Loads configuration with an explicit file path.
    pub fn load_from(path: Option<&Path>) -> ConfigResult<Self> {
        let file = path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        let config = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed("BRAZE_").split("__"))
            .extract()?;
        Ok(config)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line human-friendly output.
    Pretty,
    /// Single-line output.
    Compact,
    /// Newline-delimited JSON (requires the `json-log` feature).
    #[cfg(feature = "json-log")]
    Json,
}

impl Default for LogFormat {
    fn default() -> Self {
        Self::Compact
    }
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (same syntax as `RUST_LOG`, e.g. "info,braze=debug").
    pub level: String,
    /// Output format.
    pub format: LogFormat,
    /// Optional log file; stdout when unset.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

/// Runtime section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Capacity of the inbound activity queue.
    pub queue_capacity: usize,
    /// How long `run()` waits for in-flight dispatches before cancelling
    /// them on shutdown.
    pub shutdown_grace_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 128,
            shutdown_grace_ms: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = BrazeConfig::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert_eq!(config.logging.file, None);
        assert_eq!(config.runtime.queue_capacity, 128);
        assert_eq!(config.runtime.shutdown_grace_ms, 3000);
    }

    #[test]
    fn toml_layers_over_defaults() {
        let config: BrazeConfig = Figment::from(Serialized::defaults(BrazeConfig::default()))
            .merge(Toml::string(
                r#"
                [logging]
                level = "debug"
                format = "pretty"

                [runtime]
                queue_capacity = 8
                "#,
            ))
            .extract()
            .unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        // Untouched keys keep their defaults.
        assert_eq!(config.runtime.shutdown_grace_ms, 3000);
        assert_eq!(config.runtime.queue_capacity, 8);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = BrazeConfig::load_from(Some(Path::new("does-not-exist.toml"))).unwrap();
        assert_eq!(config.logging.level, "info");
    }
}
