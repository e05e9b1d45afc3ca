#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! rrgen Configuration
//!
//! This crate provides configuration management for rrgen.
//! It handles loading, saving, and managing configuration files that specify:
//! - Generation inputs, output directory and plugin options
//! - The plugin command lines, in pipeline order
//! - Logging configuration
//! - Timeouts for the plugin handshake and for generation
//!
//! Configuration is stored in TOML format. Every section is optional, so a
//! file only needs to name what differs from the defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use plugins::GenerationOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    /// Failed to parse the TOML configuration file
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize configuration to TOML format
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// A generation option has a value that cannot be passed to plugins
    #[error("Unsupported value for option {0}: tables are not allowed")]
    UnsupportedOptionValue(String),
    /// Could not locate the user's configuration directory
    #[error("Could not find user config directory")]
    ConfigDirUnavailable,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generation inputs, output and plugin options
    pub generation: GenerationConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Plugins to run
    pub plugins: PluginsConfig,
    /// Timeouts
    pub timeouts: TimeoutsConfig,
}

/// Generation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Schema IR document produced by the schema loader
    pub schema: Option<PathBuf>,
    /// Root directory for generated code
    pub gen_output: Option<PathBuf>,
    /// Allow cyclic package dependencies
    pub permit_package_cycles: bool,
    /// Schema sources to generate code for
    pub source_inputs: Vec<PathBuf>,
    /// Schema sources used for resolution only
    pub context_inputs: Vec<PathBuf>,
    /// Plugin options keyed `"<plugin>:<key>"`. Values may be scalars or
    /// arrays of scalars.
    pub options: BTreeMap<String, toml::Value>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level of internal diagnostics (trace, debug, info, warn, error)
    pub level: String,
    /// Surface debug records emitted by plugins
    pub debug: bool,
}

/// Plugin configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    /// Plugin command lines in pipeline order, e.g. `"rrgen-json-generator"`
    pub commands: Vec<String>,
    /// Keep going when a plugin reports an error
    pub ignore_errors: bool,
}

/// Timeout configuration, in seconds. Absent values mean no timeout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutsConfig {
    /// Limit for spawning a plugin and receiving its metadata
    pub handshake_secs: Option<u64>,
    /// Limit for one plugin's generation step
    pub generation_secs: Option<u64>,
}

impl Default for LoggingConfig {
    fn default() -> Self { Self { level: "info".to_string(), debug: false } }
}

impl TimeoutsConfig {
    /// Handshake timeout
    pub fn handshake(&self) -> Option<Duration> { self.handshake_secs.map(Duration::from_secs) }

    /// Generation timeout
    pub fn generation(&self) -> Option<Duration> { self.generation_secs.map(Duration::from_secs) }
}

/// Splits a plugin command line on whitespace.
pub fn split_command(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}

fn option_values(key: &str, value: &toml::Value) -> Result<Vec<String>, ConfigError> {
    match value {
        toml::Value::String(text) => Ok(vec![text.clone()]),
        toml::Value::Integer(number) => Ok(vec![number.to_string()]),
        toml::Value::Float(number) => Ok(vec![number.to_string()]),
        toml::Value::Boolean(flag) => Ok(vec![flag.to_string()]),
        toml::Value::Datetime(datetime) => Ok(vec![datetime.to_string()]),
        toml::Value::Array(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                if item.is_array() {
                    return Err(ConfigError::UnsupportedOptionValue(key.to_string()));
                }
                values.extend(option_values(key, item)?);
            }
            Ok(values)
        }
        toml::Value::Table(_) => Err(ConfigError::UnsupportedOptionValue(key.to_string())),
    }
}

impl Config {
    /// Load configuration from a TOML file at `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load `path` if given, otherwise the default file if it exists,
    /// otherwise the defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Ok(path) if path.is_file() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    /// Save this configuration as a pretty-printed TOML file at `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Returns the default config file path:
    /// `{config_dir()}/rrgen/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::ConfigDirUnavailable)?.join("rrgen");
        Ok(config_dir.join("config.toml"))
    }

    /// Plugin command lines split into program and arguments
    pub fn plugin_commands(&self) -> Vec<Vec<String>> {
        self.plugins
            .commands
            .iter()
            .map(|command| split_command(command))
            .filter(|command| !command.is_empty())
            .collect()
    }

    /// Generation options described by this configuration
    pub fn generation_options(&self) -> Result<GenerationOptions, ConfigError> {
        let generation = &self.generation;
        let mut options = GenerationOptions::new();
        for (key, value) in &generation.options {
            for value in option_values(key, value)? {
                options.append(key.as_str(), value);
            }
        }
        for input in &generation.source_inputs {
            options.append(GenerationOptions::SOURCE_INPUT.name, input.to_string_lossy());
        }
        for input in &generation.context_inputs {
            options.append(GenerationOptions::CONTEXT_INPUT.name, input.to_string_lossy());
        }
        options.set(
            GenerationOptions::PERMIT_PACKAGE_CYCLES.name,
            generation.permit_package_cycles.to_string(),
        );
        if let Some(gen_output) = &generation.gen_output {
            options.set_gen_output(gen_output);
        }
        Ok(options)
    }
}
