//! Plugin with scripted behaviour, used to exercise the orchestrator's
//! handling of misbehaving processes.

use async_trait::async_trait;
use clap::ValueEnum;
use plugins::{
    GenerationOptions, GenerationPluginService, HostedPlugin, MetaInformation, PluginRole, PluginService, RLogger,
};
use schema::RSFile;
use tokio::io::{AsyncRead, AsyncWrite};
use transport::{GeneratorSignal, Level, PluginCommunication, PluginMessage, PluginSignal};

/// Exit code of [`Mode::Exit`].
pub const EXIT_CODE: i32 = 2;

/// How the plugin behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Follows the protocol and logs what it received.
    WellBehaved,
    /// Answers the metadata request with `CodeGenerated`.
    WrongHandshake,
    /// Announces the generator role but answers with `ChangedInput`.
    WrongTerminal,
    /// Exits before reading anything.
    Exit,
    /// Follows the protocol but logs an error.
    LogError,
    /// Completes the handshake and never answers the input.
    Hang,
    /// Logs a record before answering the metadata request, then follows
    /// the protocol.
    LogBeforeMeta,
}

impl Mode {
    /// Whether the mode is served by the regular plugin runtime.
    pub fn follows_protocol(self) -> bool { matches!(self, Mode::WellBehaved | Mode::LogError) }
}

/// Generator that writes nothing and reports what it received.
#[derive(Debug)]
pub struct ScriptedGenerator {
    /// Name announced in the handshake.
    pub name: String,
    /// Emit an error record before finishing.
    pub log_error: bool,
}

impl PluginService for ScriptedGenerator {
    fn name(&self) -> &str { &self.name }

    fn description(&self) -> &str { "Scripted test plugin" }
}

#[async_trait]
impl GenerationPluginService for ScriptedGenerator {
    async fn generate_code(
        &self,
        options: &GenerationOptions,
        files: &[RSFile],
        logger: &dyn RLogger,
    ) -> plugins::Result<()> {
        logger.debug(&format!("options: {:?}", options)).await;
        logger.lifecycle(&format!("received {} file(s)", files.len())).await;
        if self.log_error {
            logger.error("something broke").await;
        }
        Ok(())
    }
}

/// Plugin served by the regular runtime for the protocol-following modes.
pub fn hosted(name: &str, mode: Mode) -> HostedPlugin {
    HostedPlugin::Generator(Box::new(ScriptedGenerator { name: name.to_string(), log_error: mode == Mode::LogError }))
}

/// Record sent by [`Mode::LogBeforeMeta`] ahead of the metadata.
pub const STARTUP_RECORD: &str = "starting up";

/// Serves one conversation breaking the protocol as `mode` dictates.
pub async fn run_misbehaving<R, W>(name: &str, mode: Mode, reader: R, writer: W) -> transport::Result<()>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    let mut channel = PluginCommunication::new(reader, writer, "orchestrator");
    let Some(request) = channel.receive().await? else { return Ok(()) };

    if mode == Mode::WrongHandshake {
        channel.send(&PluginMessage { id: request.id, signal: PluginSignal::CodeGenerated }).await?;
        return channel.close().await;
    }

    if mode == Mode::LogBeforeMeta {
        channel.send(&PluginMessage::log(Level::Lifecycle, STARTUP_RECORD)).await?;
    }

    let meta = MetaInformation {
        name: name.to_string(),
        description: "Scripted test plugin".to_string(),
        options: Vec::new(),
        role: PluginRole::Generator,
    };
    channel.send(&PluginMessage { id: request.id, signal: PluginSignal::SendMetaInformation(meta) }).await?;

    let Some(input) = channel.receive().await? else { return Ok(()) };
    if mode == Mode::Hang {
        std::future::pending::<()>().await;
    }
    let signal = match (mode, input.signal) {
        (Mode::LogBeforeMeta, _) => PluginSignal::CodeGenerated,
        (_, GeneratorSignal::SendInput { files, .. }) => PluginSignal::ChangedInput { files },
        (_, GeneratorSignal::FetchMetadata) => PluginSignal::ChangedInput { files: Vec::new() },
    };
    channel.send(&PluginMessage { id: input.id, signal }).await?;
    channel.close().await
}
