//! Plugins running as child processes.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use plugins::{
    GenerationOptions, GenerationPluginService, MetaInformation, OptionDescriptor, PluginError, PluginService,
    ProcessorPluginService, RLogger,
};
use schema::RSFile;
use tokio::process::{Child, ChildStdin, ChildStdout};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use transport::{
    GeneratorCommunication, GeneratorMessage, GeneratorSignal, PluginSignal, SignalIdGenerator, TransportError,
};

/// Time a plugin gets to exit on its own once its work is done.
pub const EXIT_GRACE: Duration = Duration::from_secs(5);

/// Child process together with the channel over its stdio.
pub(crate) struct PluginProcess {
    pub(crate) child: Child,
    pub(crate) channel: GeneratorCommunication<ChildStdout, ChildStdin>,
}

/// A loaded plugin process ready for its single generation request.
pub(crate) struct ProcessPlugin {
    pub(crate) meta: MetaInformation,
    pub(crate) command: String,
    pub(crate) pid: Option<u32>,
    pub(crate) ids: SignalIdGenerator,
    pub(crate) system_logger: Arc<dyn RLogger>,
    pub(crate) process: Mutex<Option<PluginProcess>>,
}

impl ProcessPlugin {
    /// Sends the input, forwards log records to `logger` and returns the
    /// first other signal. The process is torn down afterwards whatever the
    /// outcome.
    async fn run(
        &self,
        options: &GenerationOptions,
        files: &[RSFile],
        logger: &dyn RLogger,
    ) -> plugins::Result<PluginSignal> {
        let mut process = self
            .process
            .lock()
            .await
            .take()
            .ok_or_else(|| PluginError::AlreadyFinished(self.meta.name.clone()))?;
        let result = self.exchange(&mut process, options, files, logger).await;
        self.finish(process).await;
        result
    }

    async fn exchange(
        &self,
        process: &mut PluginProcess,
        options: &GenerationOptions,
        files: &[RSFile],
        logger: &dyn RLogger,
    ) -> plugins::Result<PluginSignal> {
        self.system_logger
            .debug(&format!("Sending {} files to `{}`.", files.len(), self.meta.name))
            .await;
        let request = GeneratorMessage {
            id: self.ids.next_id(),
            signal: GeneratorSignal::SendInput { files: files.to_vec(), options: options.clone() },
        };
        process.channel.send(&request).await?;

        loop {
            let message = process
                .channel
                .incoming
                .receive_or(|| TransportError::Closed(format!("`{}` exited before reporting a result", self.command)))
                .await?;
            match message.signal {
                PluginSignal::LogMessage { message, level } => logger.log(level, &message).await,
                other => {
                    if message.id != request.id {
                        debug!(plugin = %self.meta.name, expected = %request.id, got = %message.id, "Result id differs from request id");
                    }
                    self.system_logger
                        .debug(&format!("`{}` answered with {}.", self.meta.name, other.kind()))
                        .await;
                    return Ok(other);
                }
            }
        }
    }

    async fn finish(&self, mut process: PluginProcess) {
        self.system_logger
            .debug(&format!("Finishing `{}` (PID {:?}).", self.meta.name, self.pid))
            .await;
        if let Err(err) = process.channel.close().await {
            debug!(plugin = %self.meta.name, "Closing plugin stdin failed: {}", err);
        }
        match tokio::time::timeout(EXIT_GRACE, process.child.wait()).await {
            Ok(Ok(status)) => debug!(plugin = %self.meta.name, %status, "Plugin exited"),
            Ok(Err(err)) => warn!(plugin = %self.meta.name, "Waiting for plugin failed: {}", err),
            Err(_) => {
                warn!(plugin = %self.meta.name, "Plugin did not exit in time, killing it");
                if let Err(err) = process.child.kill().await {
                    warn!(plugin = %self.meta.name, "Killing plugin failed: {}", err);
                }
            }
        }
    }

    /// Releases the process without a generation request.
    async fn shutdown(&self) {
        if let Some(process) = self.process.lock().await.take() {
            self.finish(process).await;
        }
    }
}

fn unexpected(plugin: &ProcessPlugin, expected: &str, got: &PluginSignal) -> PluginError {
    PluginError::Protocol(format!("`{}` answered {} instead of {}", plugin.meta.name, got.kind(), expected))
}

/// Generator plugin running in a child process.
pub struct ProcessGenerator(pub(crate) ProcessPlugin);

/// Processor plugin running in a child process.
pub struct ProcessProcessor(pub(crate) ProcessPlugin);

macro_rules! process_plugin_common {
    ($ty:ident, $role:literal) => {
        impl $ty {
            /// Command line the process was started with.
            pub fn command(&self) -> &str { &self.0.command }

            /// Process id, if the platform reported one.
            pub fn pid(&self) -> Option<u32> { self.0.pid }

            /// Metadata received during the handshake.
            pub fn meta(&self) -> &MetaInformation { &self.0.meta }

            /// Ends the process without generating. Later requests fail.
            pub async fn finish(&self) { self.0.shutdown().await }
        }

        impl PluginService for $ty {
            fn name(&self) -> &str { &self.0.meta.name }

            fn description(&self) -> &str { &self.0.meta.description }

            fn options(&self) -> Vec<OptionDescriptor> { self.0.meta.options.clone() }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} plugin '{}' (PID {:?})", $role, self.0.meta.name, self.0.pid)
            }
        }
    };
}

process_plugin_common!(ProcessGenerator, "Generation");
process_plugin_common!(ProcessProcessor, "Processor");

#[async_trait]
impl GenerationPluginService for ProcessGenerator {
    async fn generate_code(
        &self,
        options: &GenerationOptions,
        files: &[RSFile],
        logger: &dyn RLogger,
    ) -> plugins::Result<()> {
        if options.gen_output().is_none() {
            return Err(PluginError::MissingOption(GenerationOptions::GEN_OUTPUT.name.to_string()));
        }
        match self.0.run(options, files, logger).await? {
            PluginSignal::CodeGenerated => Ok(()),
            other => Err(unexpected(&self.0, "CodeGenerated", &other)),
        }
    }
}

#[async_trait]
impl ProcessorPluginService for ProcessProcessor {
    async fn process(
        &self,
        options: &GenerationOptions,
        files: &[RSFile],
        logger: &dyn RLogger,
    ) -> plugins::Result<Vec<RSFile>> {
        match self.0.run(options, files, logger).await? {
            PluginSignal::ChangedInput { files } => Ok(files),
            other => Err(unexpected(&self.0, "ChangedInput", &other)),
        }
    }
}
