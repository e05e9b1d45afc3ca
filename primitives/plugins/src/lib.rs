#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! rrgen Plugins
//!
//! This crate defines what a plugin is: a [`GenerationPluginService`] that
//! writes code or a [`ProcessorPluginService`] that rewrites the schema for
//! the plugins after it. It also provides the logging interface both sides
//! share and the runtime a plugin binary uses to serve the orchestrator.
//!
//! A plugin binary is a few lines:
//!
//! ```no_run
//! use plugins::{run_stdio, HostedPlugin};
//! # fn service() -> Box<dyn plugins::GenerationPluginService> { unimplemented!() }
//!
//! #[tokio::main]
//! async fn main() -> plugins::Result<()> {
//!     run_stdio(&HostedPlugin::Generator(service())).await
//! }
//! ```

pub mod logger;
pub mod runtime;
pub mod service;

pub use logger::{IpcRLogger, RLogger};
pub use runtime::{debug_from_env, run_plugin, run_stdio, DEBUG_ENV};
pub use service::{GenerationPluginService, HostedPlugin, PluginService, ProcessorPluginService};
pub use transport::{
    GenerationOption, GenerationOptions, Level, MetaInformation, OptionDescriptor, OptionTypeKind, PluginRole,
};

/// Result alias for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;

/// Errors raised by plugin implementations and the plugin runtime.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// The channel to the orchestrator failed.
    #[error("Transport error: {0}")]
    Transport(#[from] transport::TransportError),

    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Reading or writing schema files failed.
    #[error("Schema error: {0}")]
    Schema(#[from] schema::SchemaError),

    /// The orchestrator sent an unexpected signal.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A required option is absent.
    #[error("Missing option: {0}")]
    MissingOption(String),

    /// An option value does not match its descriptor.
    #[error("Invalid value {value:?} for option {name}")]
    InvalidOption {
        /// Option key.
        name: String,
        /// Rejected value.
        value: String,
    },

    /// The plugin already served its single request or was shut down.
    #[error("Plugin {0} has already finished")]
    AlreadyFinished(String),

    /// The plugin could not complete its work.
    #[error("Generation failed: {0}")]
    Failed(String),

    /// Any other error raised by a plugin implementation.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
