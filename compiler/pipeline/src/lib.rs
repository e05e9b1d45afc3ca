#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Orchestrates a generation run.
//!
//! The pipeline loads the plugin processes, checks the options against what
//! they declare and folds the schema through them in order.
//!
//! ## Module Organization
//!
//! - `generator` - [`CodeGenerator`], the plugin fold
//! - `policy` - reaction to plugin error records

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use plugins::{HostedPlugin, RLogger};
use thiserror::Error;

pub mod generator;
pub mod policy;

pub use generator::{CodeGenerator, GenerationReport, LoggerFactory, PluginReport};
pub use policy::{ErrorCountingLogger, ErrorPolicy};

/// Convenient result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Stage of a run bounded by a timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Spawning plugins and exchanging metadata.
    Handshake,
    /// A plugin working on its request.
    Generation,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Handshake => f.write_str("handshake"),
            Phase::Generation => f.write_str("generation"),
        }
    }
}

/// Errors that can occur while running the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No output directory was configured.
    #[error("No generation output folder is provided (option gen_output)")]
    MissingGenOutput,

    /// An option key matches no declared option.
    #[error("Unknown option: {0}")]
    UnknownOption(String),

    /// A single-valued option was given several values.
    #[error("Option {0} does not accept several values")]
    NotRepeatable(String),

    /// An option value does not match its kind.
    #[error("Invalid value {value:?} for option {key}, expected {expected}")]
    InvalidOption {
        /// Option key.
        key: String,
        /// Rejected value.
        value: String,
        /// Expected kind.
        expected: String,
    },

    /// A plugin process could not be started.
    #[error(transparent)]
    Load(#[from] loader::LoaderError),

    /// A plugin failed its request.
    #[error("Plugin {plugin} failed: {source}")]
    Plugin {
        /// Plugin name.
        plugin: String,
        /// Cause.
        #[source]
        source: plugins::PluginError,
    },

    /// A plugin logged errors and the policy is to abort.
    #[error("Plugin {plugin} reported {count} error(s), finishing the generation")]
    PluginReportedErrors {
        /// Plugin name.
        plugin: String,
        /// Number of error records.
        count: usize,
    },

    /// A phase took longer than allowed.
    #[error("{phase} timed out after {after:?}{}", in_plugin(.plugin))]
    Timeout {
        /// Phase that timed out.
        phase: Phase,
        /// Plugin involved, if known.
        plugin: Option<String>,
        /// Configured limit.
        after: Duration,
    },
}

fn in_plugin(plugin: &Option<String>) -> String {
    plugin.as_ref().map(|name| format!(" in plugin {}", name)).unwrap_or_default()
}

/// Starts all plugin commands concurrently, bounded by `handshake_timeout`.
///
/// Plugins are returned in the order of `commands`.
pub async fn load_plugins(
    commands: &[Vec<String>],
    logger: Arc<dyn RLogger>,
    handshake_timeout: Option<Duration>,
) -> Result<Vec<HostedPlugin>> {
    let loading = loader::load_all(commands, logger);
    let plugins = match handshake_timeout {
        Some(after) => tokio::time::timeout(after, loading)
            .await
            .map_err(|_| PipelineError::Timeout { phase: Phase::Handshake, plugin: None, after })??,
        None => loading.await?,
    };
    tracing::debug!(count = plugins.len(), "Plugins loaded");
    Ok(plugins)
}
