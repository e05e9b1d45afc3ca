//! Logging interface shared by the orchestrator and plugins.

use async_trait::async_trait;
use tracing::warn;
use transport::{DynTransport, Level, PluginMessage};

/// Sink for log records emitted during generation.
#[async_trait]
pub trait RLogger: Send + Sync {
    /// Whether [`Level::Debug`] records are surfaced.
    fn is_debug_enabled(&self) -> bool;

    /// Records `message` at `level`.
    async fn log(&self, level: Level, message: &str);

    /// Records a debug message if debug output is enabled.
    async fn debug(&self, message: &str) {
        if self.is_debug_enabled() {
            self.log(Level::Debug, message).await;
        }
    }

    /// Records a progress message.
    async fn lifecycle(&self, message: &str) { self.log(Level::Lifecycle, message).await }

    /// Records a warning.
    async fn warning(&self, message: &str) { self.log(Level::Warn, message).await }

    /// Records an error.
    async fn error(&self, message: &str) { self.log(Level::Error, message).await }
}

/// Plugin side logger forwarding records to the orchestrator as
/// `LogMessage` signals.
pub struct IpcRLogger {
    sender: DynTransport<PluginMessage>,
    debug: bool,
}

impl IpcRLogger {
    /// Logger sending through `sender`. Debug records are dropped unless
    /// `debug` is set.
    pub fn new(sender: DynTransport<PluginMessage>, debug: bool) -> Self { Self { sender, debug } }
}

#[async_trait]
impl RLogger for IpcRLogger {
    fn is_debug_enabled(&self) -> bool { self.debug }

    async fn log(&self, level: Level, message: &str) {
        if level == Level::Debug && !self.debug {
            return;
        }
        if let Err(err) = self.sender.send(PluginMessage::log(level, message)).await {
            warn!(endpoint = self.sender.endpoint(), %level, "Failed to forward log record: {}", err);
        }
    }
}
