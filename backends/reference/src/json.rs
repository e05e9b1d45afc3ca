//! Generator writing the received schema as JSON.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use plugins::{
    GenerationOptions, GenerationPluginService, OptionDescriptor, OptionTypeKind, PluginError, PluginService,
    RLogger,
};
use schema::{RSFile, SchemaError};

/// Writes every file to `<gen_output>/<file name>.json`.
///
/// The output mirrors the file's relative path with the `.proto` extension
/// replaced. Option `pretty` selects indented output.
#[derive(Debug, Default)]
pub struct JsonGenerator;

impl JsonGenerator {
    /// Option selecting indented output.
    pub const PRETTY: &'static str = "pretty";
}

/// Output path of `file_name` below `root`. Absolute names and names
/// leaving the root are rejected.
pub fn output_path(root: &Path, file_name: &str) -> Option<PathBuf> {
    let relative = Path::new(file_name).with_extension("json");
    if relative.components().all(|component| matches!(component, Component::Normal(_))) {
        Some(root.join(relative))
    } else {
        None
    }
}

impl PluginService for JsonGenerator {
    fn name(&self) -> &str { "json" }

    fn description(&self) -> &str { "Writes the schema each plugin receives as JSON documents." }

    fn options(&self) -> Vec<OptionDescriptor> {
        vec![OptionDescriptor::new(Self::PRETTY, "Indent the written JSON.", OptionTypeKind::Boolean)]
    }
}

#[async_trait]
impl GenerationPluginService for JsonGenerator {
    async fn generate_code(
        &self,
        options: &GenerationOptions,
        files: &[RSFile],
        logger: &dyn RLogger,
    ) -> plugins::Result<()> {
        let root = options
            .gen_output()
            .ok_or_else(|| PluginError::MissingOption(GenerationOptions::GEN_OUTPUT.name.to_string()))?;
        let pretty = options.get_bool(Self::PRETTY).unwrap_or(false);

        for file in files {
            let path = output_path(&root, &file.name)
                .ok_or_else(|| PluginError::Failed(format!("file name {:?} leaves the output folder", file.name)))?;
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let content = if pretty { serde_json::to_string_pretty(file) } else { serde_json::to_string(file) }
                .map_err(SchemaError::from)?;
            tokio::fs::write(&path, content).await?;
            logger.debug(&format!("Wrote {}", path.display())).await;
        }

        logger.lifecycle(&format!("Wrote {} file(s) to {}", files.len(), root.display())).await;
        Ok(())
    }
}
