//! Plugin service traits.

use async_trait::async_trait;
use schema::RSFile;
use transport::{GenerationOptions, MetaInformation, OptionDescriptor, PluginRole};

use crate::logger::RLogger;
use crate::Result;

/// Identity of a plugin.
pub trait PluginService: Send + Sync {
    /// Plugin name. Options addressed as `<name>:<key>` reach this plugin.
    fn name(&self) -> &str;

    /// One-line description.
    fn description(&self) -> &str { "" }

    /// Options the plugin understands.
    fn options(&self) -> Vec<OptionDescriptor> { Vec::new() }
}

/// Plugin that writes generated code.
#[async_trait]
pub trait GenerationPluginService: PluginService {
    /// Generates code for `files`. Output goes below the `gen_output`
    /// option.
    async fn generate_code(
        &self,
        options: &GenerationOptions,
        files: &[RSFile],
        logger: &dyn RLogger,
    ) -> Result<()>;
}

/// Plugin that transforms the schema for the plugins after it.
#[async_trait]
pub trait ProcessorPluginService: PluginService {
    /// Returns the transformed schema.
    async fn process(
        &self,
        options: &GenerationOptions,
        files: &[RSFile],
        logger: &dyn RLogger,
    ) -> Result<Vec<RSFile>>;
}

/// An in-process plugin implementation of either role.
pub enum HostedPlugin {
    /// A generator.
    Generator(Box<dyn GenerationPluginService>),
    /// A processor.
    Processor(Box<dyn ProcessorPluginService>),
}

impl HostedPlugin {
    /// Role announced during the handshake.
    pub fn role(&self) -> PluginRole {
        match self {
            HostedPlugin::Generator(_) => PluginRole::Generator,
            HostedPlugin::Processor(_) => PluginRole::Processor,
        }
    }

    /// Handshake answer describing the plugin.
    pub fn meta(&self) -> MetaInformation {
        let (name, description, options) = match self {
            HostedPlugin::Generator(service) => (service.name(), service.description(), service.options()),
            HostedPlugin::Processor(service) => (service.name(), service.description(), service.options()),
        };
        MetaInformation {
            name: name.to_string(),
            description: description.to_string(),
            options,
            role: self.role(),
        }
    }
}

impl std::fmt::Debug for HostedPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let meta = self.meta();
        f.debug_struct("HostedPlugin").field("name", &meta.name).field("role", &meta.role).finish()
    }
}
