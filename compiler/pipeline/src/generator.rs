//! The plugin fold.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use plugins::{GenerationOptions, HostedPlugin, OptionDescriptor, PluginRole, RLogger};
use schema::RSFile;
use tracing::{debug, info, warn};

use crate::policy::{ErrorCountingLogger, ErrorPolicy};
use crate::{Phase, PipelineError, Result};

/// Builds the logger handed to the plugin with the given name.
pub type LoggerFactory<'a> = &'a (dyn Fn(&str) -> Arc<dyn RLogger> + Send + Sync);

/// Outcome of one plugin in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginReport {
    /// Plugin name.
    pub name: String,
    /// Plugin role.
    pub role: PluginRole,
    /// `ERROR` records the plugin logged.
    pub errors: usize,
}

/// Outcome of a whole run.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// Schema after the last processor.
    pub files: Vec<RSFile>,
    /// One entry per plugin, in run order.
    pub plugins: Vec<PluginReport>,
}

impl GenerationReport {
    /// Sum of the errors reported by all plugins.
    pub fn total_errors(&self) -> usize { self.plugins.iter().map(|plugin| plugin.errors).sum() }
}

/// Runs a schema through an ordered list of plugins.
///
/// Processors replace the schema seen by the plugins after them; generators
/// only produce output. Each plugin gets the options scoped to its name.
#[derive(Debug)]
pub struct CodeGenerator {
    plugins: Vec<HostedPlugin>,
    policy: ErrorPolicy,
    generation_timeout: Option<Duration>,
}

impl CodeGenerator {
    /// Generator running `plugins` in the given order.
    pub fn new(plugins: Vec<HostedPlugin>) -> Self {
        Self { plugins, policy: ErrorPolicy::default(), generation_timeout: None }
    }

    /// Sets the reaction to plugin error records.
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Bounds the time each plugin gets for its request.
    pub fn with_generation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.generation_timeout = timeout;
        self
    }

    /// Plugins in run order.
    pub fn plugins(&self) -> &[HostedPlugin] { &self.plugins }

    /// Base options followed by the options of every plugin.
    pub fn options(&self) -> Vec<OptionDescriptor> {
        let mut options = GenerationOptions::base_options();
        options.extend(self.plugins.iter().flat_map(|plugin| plugin.meta().options));
        options
    }

    /// Checks `options` against the declared descriptors.
    ///
    /// Unprefixed keys must be base options. A key `<plugin>:<name>` must
    /// name an option of a loaded plugin. Values must match the option kind
    /// and only repeatable options may carry several values.
    pub fn validate_options(&self, options: &GenerationOptions) -> Result<()> {
        let base = GenerationOptions::base_options();
        let metas: Vec<_> = self.plugins.iter().map(HostedPlugin::meta).collect();

        for (key, values) in options.raw() {
            let descriptor = match key.split_once(':') {
                Some((plugin, name)) => metas
                    .iter()
                    .find(|meta| meta.name == plugin)
                    .and_then(|meta| meta.options.iter().find(|option| option.name == name)),
                None => base.iter().find(|option| option.name == key),
            }
            .ok_or_else(|| PipelineError::UnknownOption(key.to_string()))?;

            if !descriptor.is_repeatable && values.len() > 1 {
                return Err(PipelineError::NotRepeatable(key.to_string()));
            }
            if let Some(value) = values.iter().find(|value| !descriptor.kind.accepts(value)) {
                return Err(PipelineError::InvalidOption {
                    key: key.to_string(),
                    value: value.clone(),
                    expected: descriptor.kind.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Folds `files` through every plugin.
    ///
    /// `options` must contain `gen_output`. `logger_factory` is called once
    /// per plugin with its name.
    pub async fn generate(
        &self,
        files: Vec<RSFile>,
        options: &GenerationOptions,
        logger_factory: LoggerFactory<'_>,
    ) -> Result<GenerationReport> {
        if options.gen_output().is_none() {
            return Err(PipelineError::MissingGenOutput);
        }
        self.validate_options(options)?;

        let mut current = files;
        let mut reports = Vec::with_capacity(self.plugins.len());
        for plugin in &self.plugins {
            let meta = plugin.meta();
            let scoped = options.scoped_for(&meta.name);
            let logger = ErrorCountingLogger::new(logger_factory(&meta.name));
            debug!(plugin = %meta.name, role = ?meta.role, files = current.len(), "Running plugin");

            let changed = match plugin {
                HostedPlugin::Generator(service) => self
                    .bounded(&meta.name, service.generate_code(&scoped, &current, &logger))
                    .await?
                    .map(|()| None),
                HostedPlugin::Processor(service) => {
                    self.bounded(&meta.name, service.process(&scoped, &current, &logger)).await?.map(Some)
                }
            }
            .map_err(|source| PipelineError::Plugin { plugin: meta.name.clone(), source })?;

            if let Some(files) = changed {
                debug!(plugin = %meta.name, before = current.len(), after = files.len(), "Schema replaced");
                current = files;
            }

            let errors = logger.error_count();
            reports.push(PluginReport { name: meta.name.clone(), role: meta.role, errors });
            if errors > 0 {
                match self.policy {
                    ErrorPolicy::Abort => {
                        return Err(PipelineError::PluginReportedErrors { plugin: meta.name, count: errors })
                    }
                    ErrorPolicy::Ignore => warn!(plugin = %meta.name, errors, "Plugin reported errors, continuing"),
                }
            }
        }

        info!(plugins = reports.len(), files = current.len(), "Generation finished");
        Ok(GenerationReport { files: current, plugins: reports })
    }

    async fn bounded<T>(&self, plugin: &str, work: impl Future<Output = T>) -> Result<T> {
        match self.generation_timeout {
            Some(after) => tokio::time::timeout(after, work).await.map_err(|_| PipelineError::Timeout {
                phase: Phase::Generation,
                plugin: Some(plugin.to_string()),
                after,
            }),
            None => Ok(work.await),
        }
    }
}
