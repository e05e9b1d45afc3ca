#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Starts plugin executables and speaks the plugin protocol with them.
//!
//! [`load`] spawns the command with piped stdin and stdout, inherits
//! stderr, asks the process for its metadata and wraps it according to the
//! announced role. The returned [`HostedPlugin`] behaves like an in-process
//! plugin: one generation request, after which the process is shut down.

pub mod process;

use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use plugins::{HostedPlugin, PluginRole, RLogger, DEBUG_ENV};
pub use process::{ProcessGenerator, ProcessProcessor, EXIT_GRACE};
use process::{PluginProcess, ProcessPlugin};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::debug;
use transport::{
    GeneratorCommunication, GeneratorMessage, GeneratorSignal, PluginSignal, SignalIdGenerator, TransportError,
};

/// Result alias for loading plugins.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Errors raised while starting a plugin process.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// The command line has no program.
    #[error("Empty plugin command")]
    EmptyCommand,

    /// The program could not be started.
    #[error("Failed to start plugin `{command}`: {source}")]
    Spawn {
        /// Command line.
        command: String,
        /// Cause.
        #[source]
        source: std::io::Error,
    },

    /// The process exited before completing the handshake.
    #[error("Plugin `{command}` exited with {status} during the handshake: {reason}")]
    Exited {
        /// Command line.
        command: String,
        /// Exit status of the process.
        status: ExitStatus,
        /// What was going on when it exited.
        reason: String,
    },

    /// The process answered the metadata request with something else.
    #[error("Plugin `{command}` failed the handshake: {reason}")]
    Handshake {
        /// Command line.
        command: String,
        /// What went wrong.
        reason: String,
    },
}

impl LoaderError {
    /// Command line of the failing plugin, if one was given.
    pub fn command(&self) -> Option<&str> {
        match self {
            LoaderError::EmptyCommand => None,
            LoaderError::Spawn { command, .. }
            | LoaderError::Exited { command, .. }
            | LoaderError::Handshake { command, .. } => Some(command),
        }
    }
}

/// Starts `command` and performs the metadata handshake.
///
/// `logger` receives debug records about the process and any records the
/// plugin logs before its metadata. It also decides whether the plugin runs
/// with debug logging enabled.
pub async fn load(command: &[String], logger: Arc<dyn RLogger>) -> Result<HostedPlugin> {
    let (program, args) = command.split_first().ok_or(LoaderError::EmptyCommand)?;
    let command_line = command.join(" ");

    let mut cmd = Command::new(program);
    cmd.args(args).stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::inherit()).kill_on_drop(true);
    if logger.is_debug_enabled() {
        cmd.env(DEBUG_ENV, "1");
    }
    let mut child =
        cmd.spawn().map_err(|source| LoaderError::Spawn { command: command_line.clone(), source })?;
    let pid = child.id();
    logger.debug(&format!("Process for `{}` started with PID {:?}.", command_line, pid)).await;

    let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
        (Some(stdin), Some(stdout)) => (stdin, stdout),
        _ => {
            return Err(LoaderError::Handshake {
                command: command_line,
                reason: "process stdio is not piped".to_string(),
            })
        }
    };
    let mut channel = GeneratorCommunication::new(stdout, stdin, command_line.clone());
    let ids = SignalIdGenerator::new();

    let request = GeneratorMessage { id: ids.next_id(), signal: GeneratorSignal::FetchMetadata };
    if let Err(err) = channel.send(&request).await {
        let closed = matches!(err, TransportError::Io(_));
        return Err(handshake_failure(&mut child, &command_line, err.to_string(), closed).await);
    }
    let meta = loop {
        match channel.receive().await {
            Ok(Some(message)) => match message.signal {
                PluginSignal::SendMetaInformation(meta) => break meta,
                PluginSignal::LogMessage { message, level } => logger.log(level, &message).await,
                other => {
                    let reason = format!("expected SendMetaInformation, got {}", other.kind());
                    return Err(handshake_failure(&mut child, &command_line, reason, false).await);
                }
            },
            Ok(None) => {
                let reason = "output closed before metadata was sent".to_string();
                return Err(handshake_failure(&mut child, &command_line, reason, true).await);
            }
            Err(err) => return Err(handshake_failure(&mut child, &command_line, err.to_string(), false).await),
        }
    };
    debug!(plugin = %meta.name, role = ?meta.role, command = %command_line, "Plugin loaded");

    let role = meta.role;
    let plugin = ProcessPlugin {
        meta,
        command: command_line,
        pid,
        ids,
        system_logger: logger,
        process: Mutex::new(Some(PluginProcess { child, channel })),
    };
    Ok(match role {
        PluginRole::Generator => HostedPlugin::Generator(Box::new(ProcessGenerator(plugin))),
        PluginRole::Processor => HostedPlugin::Processor(Box::new(ProcessProcessor(plugin))),
    })
}

/// Starts every command concurrently. Fails with the first error; the
/// processes already started are killed when their handles drop.
pub async fn load_all(commands: &[Vec<String>], logger: Arc<dyn RLogger>) -> Result<Vec<HostedPlugin>> {
    futures::future::try_join_all(commands.iter().map(|command| load(command, Arc::clone(&logger)))).await
}

async fn handshake_failure(child: &mut Child, command: &str, reason: String, closed: bool) -> LoaderError {
    let status = if closed {
        tokio::time::timeout(EXIT_GRACE, child.wait()).await.ok().and_then(|status| status.ok())
    } else {
        child.try_wait().ok().flatten()
    };
    match status {
        Some(status) => LoaderError::Exited { command: command.to_string(), status, reason },
        None => LoaderError::Handshake { command: command.to_string(), reason },
    }
}
