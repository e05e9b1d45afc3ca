//! Messages exchanged between the orchestrator and a plugin.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use schema::RSFile;
use serde::{Deserialize, Serialize};

use crate::descriptor::OptionDescriptor;
use crate::options::GenerationOptions;

/// Correlation id carried by every message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct SignalId(pub String);

impl SignalId {
    /// Id of messages that do not answer a request, e.g. log records.
    pub const EMPTY: Self = Self(String::new());

    /// Whether this is [`SignalId::EMPTY`].
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Hands out increasing ids for outgoing requests.
#[derive(Debug, Default)]
pub struct SignalIdGenerator {
    next: AtomicU64,
}

impl SignalIdGenerator {
    /// Creates a generator starting at `1`.
    pub fn new() -> Self { Self::default() }

    /// Next unused id.
    pub fn next_id(&self) -> SignalId {
        let id = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        SignalId(id.to_string())
    }
}

/// Severity of a plugin log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    /// Diagnostic detail, surfaced only in debug mode.
    Debug,
    /// Progress information.
    Lifecycle,
    /// Something looks wrong but generation continues.
    Warn,
    /// Generation produced an error.
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Debug => "DEBUG",
            Level::Lifecycle => "LIFECYCLE",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// What a plugin does with its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PluginRole {
    /// Produces output files; its input is not changed.
    Generator,
    /// Returns a transformed schema for the plugins after it.
    Processor,
}

/// Self-description a plugin sends during the handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaInformation {
    /// Plugin name, also the prefix of its scoped options.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// Options the plugin understands.
    pub options: Vec<OptionDescriptor>,
    /// Role the plugin plays in the pipeline.
    pub role: PluginRole,
}

/// Orchestrator to plugin signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneratorSignal {
    /// Ask the plugin to describe itself.
    FetchMetadata,
    /// Hand over the schema and the plugin's scoped options.
    SendInput {
        /// Schema files.
        files: Vec<RSFile>,
        /// Options scoped to the receiving plugin.
        options: GenerationOptions,
    },
}

/// Plugin to orchestrator signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PluginSignal {
    /// Handshake answer.
    SendMetaInformation(MetaInformation),
    /// Log record, may be sent at any point.
    LogMessage {
        /// Text of the record.
        message: String,
        /// Severity.
        level: Level,
    },
    /// A generator finished.
    CodeGenerated,
    /// A processor finished with its transformed schema.
    ChangedInput {
        /// Transformed schema files.
        files: Vec<RSFile>,
    },
}

impl PluginSignal {
    /// Short name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            PluginSignal::SendMetaInformation(_) => "SendMetaInformation",
            PluginSignal::LogMessage { .. } => "LogMessage",
            PluginSignal::CodeGenerated => "CodeGenerated",
            PluginSignal::ChangedInput { .. } => "ChangedInput",
        }
    }
}

impl GeneratorSignal {
    /// Short name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            GeneratorSignal::FetchMetadata => "FetchMetadata",
            GeneratorSignal::SendInput { .. } => "SendInput",
        }
    }
}

/// Message sent by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorMessage {
    /// Correlation id.
    pub id: SignalId,
    /// Payload.
    pub signal: GeneratorSignal,
}

/// Message sent by a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMessage {
    /// Correlation id, echoing the request it answers.
    pub id: SignalId,
    /// Payload.
    pub signal: PluginSignal,
}

impl PluginMessage {
    /// Log record outside of any request.
    pub fn log(level: Level, message: impl Into<String>) -> Self {
        Self { id: SignalId::EMPTY, signal: PluginSignal::LogMessage { message: message.into(), level } }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_ids_increase() {
        let ids = SignalIdGenerator::new();
        assert_eq!(ids.next_id(), SignalId("1".to_string()));
        assert_eq!(ids.next_id(), SignalId("2".to_string()));
        assert!(SignalId::EMPTY.is_empty());
    }

    #[test]
    fn test_log_message_has_empty_id() {
        let message = PluginMessage::log(Level::Warn, "careful");
        assert!(message.id.is_empty());
        assert_eq!(message.signal.kind(), "LogMessage");
        assert!(Level::Error > Level::Warn);
    }
}
