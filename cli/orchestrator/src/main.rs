//! rrgen CLI orchestrator
//!
//! Loads a schema, starts the plugin processes and runs them in order.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use pipeline::{load_plugins, CodeGenerator};
use plugins::{GenerationOptions, HostedPlugin, OptionDescriptor, RLogger};
use rrgen_cli::{plugin_commands, tracing_level, Cli, CliError, Commands, GenerateSettings, PluginArgs};
use rrgen_config::Config;
use rrgen_logging::{init_tracing, ConsoleRLogger};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("rrgen: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = Config::load_or_default(cli.config.as_deref())?;
    init_tracing(tracing_level(&cli, &config));
    let debug = cli.debug || config.logging.debug;
    let system: Arc<dyn RLogger> = Arc::new(ConsoleRLogger::new("rrgen", debug));

    match &cli.cmd {
        Commands::Generate(args) => {
            let settings = GenerateSettings::resolve(args, &config)?;
            generate(settings, system, debug).await
        }
        Commands::Describe(args) => describe(args, &config, system).await,
    }
}

async fn generate(settings: GenerateSettings, system: Arc<dyn RLogger>, debug: bool) -> Result<(), CliError> {
    let files = schema::load_files(&settings.schema)?;
    debug!(schema = %settings.schema.display(), files = files.len(), "Schema loaded");

    let plugins = load_plugins(&settings.commands, Arc::clone(&system), settings.handshake_timeout).await?;
    let generator = CodeGenerator::new(plugins)
        .with_error_policy(settings.policy)
        .with_generation_timeout(settings.generation_timeout);

    let factory = move |name: &str| -> Arc<dyn RLogger> { Arc::new(ConsoleRLogger::new(name, debug)) };
    let report = generator.generate(files, &settings.options, &factory).await?;

    info!(plugins = report.plugins.len(), errors = report.total_errors(), "Run complete");
    if report.total_errors() > 0 {
        for plugin in report.plugins.iter().filter(|plugin| plugin.errors > 0) {
            system.warning(&format!("{} reported {} error(s), ignored", plugin.name, plugin.errors)).await;
        }
    }
    system.lifecycle(&format!("Generated with {} plugin(s).", report.plugins.len())).await;
    Ok(())
}

async fn describe(args: &PluginArgs, config: &Config, system: Arc<dyn RLogger>) -> Result<(), CliError> {
    let commands = plugin_commands(args, config)?;
    let plugins = load_plugins(&commands, system, config.timeouts.handshake()).await?;

    println!("Options:");
    for option in GenerationOptions::base_options() {
        println!("{}", option_line(None, &option));
    }
    for plugin in &plugins {
        println!();
        print_plugin(plugin);
    }
    Ok(())
}

fn print_plugin(plugin: &HostedPlugin) {
    let meta = plugin.meta();
    if meta.description.is_empty() {
        println!("{} ({:?})", meta.name, meta.role);
    } else {
        println!("{} ({:?}): {}", meta.name, meta.role, meta.description);
    }
    for option in &meta.options {
        println!("{}", option_line(Some(&meta.name), option));
    }
}

fn option_line(plugin: Option<&str>, option: &OptionDescriptor) -> String {
    let key = match plugin {
        Some(plugin) => format!("{}:{}", plugin, option.name),
        None => option.name.clone(),
    };
    let repeatable = if option.is_repeatable { ", repeatable" } else { "" };
    format!("  {} <{}{}>  {}", key, option.kind, repeatable, option.description)
}
