//! Plugin side of the wire protocol.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};
use transport::{GeneratorSignal, PluginCommunication, PluginMessage, PluginSignal};

use crate::logger::{IpcRLogger, RLogger};
use crate::service::HostedPlugin;
use crate::{PluginError, Result};

/// Environment variable the orchestrator sets when debug logging is on.
pub const DEBUG_ENV: &str = "RRGEN_PLUGIN_DEBUG";

/// Whether [`DEBUG_ENV`] asks for debug records.
pub fn debug_from_env() -> bool {
    std::env::var(DEBUG_ENV).map(|value| value == "1" || value == "true").unwrap_or(false)
}

/// Serves one orchestrator conversation over `reader` / `writer`.
///
/// Answers `FetchMetadata`, then runs the plugin on the received input and
/// replies with the terminal signal of its role. A stream closed before
/// either request ends the conversation without error, so an orchestrator
/// can fetch metadata only.
pub async fn run_plugin<R, W>(plugin: &HostedPlugin, reader: R, writer: W, debug_enabled: bool) -> Result<()>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (mut incoming, outgoing) =
        PluginCommunication::new(reader, writer, "orchestrator").split();
    let meta = plugin.meta();

    let Some(request) = incoming.receive().await? else {
        debug!(plugin = %meta.name, "Orchestrator closed the channel before the handshake");
        return Ok(());
    };
    if request.signal != GeneratorSignal::FetchMetadata {
        return Err(PluginError::Protocol(format!(
            "expected FetchMetadata, got {}",
            request.signal.kind()
        )));
    }
    let plugin_name = meta.name.clone();
    outgoing
        .send(&PluginMessage { id: request.id, signal: PluginSignal::SendMetaInformation(meta) })
        .await?;

    let Some(input) = incoming.receive().await? else {
        debug!(plugin = %plugin_name, "Orchestrator closed the channel after the handshake");
        return Ok(());
    };
    let (files, options) = match input.signal {
        GeneratorSignal::SendInput { files, options } => (files, options),
        other => {
            return Err(PluginError::Protocol(format!("expected SendInput, got {}", other.kind())));
        }
    };
    info!(plugin = %plugin_name, files = files.len(), "Input received");

    let logger = IpcRLogger::new(Arc::new(outgoing.clone()), debug_enabled);
    let result = match plugin {
        HostedPlugin::Generator(service) => service
            .generate_code(&options, &files, &logger)
            .await
            .map(|()| PluginSignal::CodeGenerated),
        HostedPlugin::Processor(service) => service
            .process(&options, &files, &logger)
            .await
            .map(|files| PluginSignal::ChangedInput { files }),
    };
    let signal = match result {
        Ok(signal) => signal,
        Err(err) => {
            logger.error(&err.to_string()).await;
            return Err(err);
        }
    };

    outgoing.send(&PluginMessage { id: input.id, signal }).await?;
    outgoing.close().await?;
    Ok(())
}

/// Serves the orchestrator over the process's stdin and stdout.
pub async fn run_stdio(plugin: &HostedPlugin) -> Result<()> {
    run_plugin(plugin, tokio::io::stdin(), tokio::io::stdout(), debug_from_env()).await
}
