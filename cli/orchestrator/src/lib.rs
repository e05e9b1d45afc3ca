#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
//! Command line of the `rrgen` orchestrator.
//!
//! Arguments are merged over the configuration file: command line values
//! win, and plugin commands given on the command line replace the
//! configured ones.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use pipeline::ErrorPolicy;
use plugins::GenerationOptions;
use rrgen_config::{split_command, Config, ConfigError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Loading the configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Reading the schema failed.
    #[error("Failed to read schema: {0}")]
    Schema(#[from] schema::SchemaError),
    /// The pipeline failed.
    #[error(transparent)]
    Pipeline(#[from] pipeline::PipelineError),
    /// Neither the arguments nor the configuration name a schema.
    #[error("No schema given, use --schema or [generation] schema")]
    MissingSchema,
    /// No plugin command was given.
    #[error("No plugins given, use --plugin or [plugins] commands")]
    NoPlugins,
    /// An `--option` argument is not `key=value`.
    #[error("Invalid option argument {0:?}, expected <plugin>:<key>=<value>")]
    InvalidOptionArgument(String),
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Command-line interface of the orchestrator.
#[derive(Parser, Debug)]
#[command(name = "rrgen", about = "Runs schema code generation plugins", version)]
pub struct Cli {
    /// Command to run.
    #[command(subcommand)]
    pub cmd: Commands,
    /// Configuration file. Defaults to the user configuration if present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Show debug records of plugins and the orchestrator.
    #[arg(long, global = true)]
    pub debug: bool,
    /// Level of internal diagnostics (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the plugins over a schema.
    Generate(GenerateArgs),
    /// Print the options every plugin understands.
    Describe(PluginArgs),
}

/// Plugin selection.
#[derive(Args, Debug, Default)]
pub struct PluginArgs {
    /// Plugin command line, split on whitespace. Repeat for every plugin,
    /// in pipeline order.
    #[arg(long = "plugin", value_name = "COMMAND")]
    pub plugins: Vec<String>,
}

/// Arguments of `generate`.
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Schema IR document.
    #[arg(long)]
    pub schema: Option<PathBuf>,
    /// Plugins to run.
    #[command(flatten)]
    pub plugins: PluginArgs,
    /// Root directory for generated code.
    #[arg(long)]
    pub gen_output: Option<PathBuf>,
    /// Schema sources to generate code for.
    #[arg(long = "source-input")]
    pub source_inputs: Vec<PathBuf>,
    /// Schema sources used for resolution only.
    #[arg(long = "context-input")]
    pub context_inputs: Vec<PathBuf>,
    /// Allow cyclic package dependencies.
    #[arg(long)]
    pub permit_package_cycles: bool,
    /// Plugin option as `<plugin>:<key>=<value>`. Repeat for repeatable
    /// options.
    #[arg(long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,
    /// Continue when a plugin reports errors.
    #[arg(long)]
    pub ignore_errors: bool,
}

/// Everything a generation run needs, merged from config and arguments.
#[derive(Debug, Clone)]
pub struct GenerateSettings {
    /// Schema IR document.
    pub schema: PathBuf,
    /// Plugin command lines in pipeline order.
    pub commands: Vec<Vec<String>>,
    /// Options for the whole run.
    pub options: GenerationOptions,
    /// Reaction to plugin error records.
    pub policy: ErrorPolicy,
    /// Limit for starting all plugins.
    pub handshake_timeout: Option<Duration>,
    /// Limit for each plugin's request.
    pub generation_timeout: Option<Duration>,
}

/// Splits `key=value`.
pub fn parse_option_argument(argument: &str) -> Result<(String, String)> {
    match argument.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(CliError::InvalidOptionArgument(argument.to_string())),
    }
}

/// Plugin commands from the arguments, or from the config if none were
/// given.
pub fn plugin_commands(args: &PluginArgs, config: &Config) -> Result<Vec<Vec<String>>> {
    let commands: Vec<Vec<String>> = if args.plugins.is_empty() {
        config.plugin_commands()
    } else {
        args.plugins.iter().map(|command| split_command(command)).filter(|command| !command.is_empty()).collect()
    };
    if commands.is_empty() {
        return Err(CliError::NoPlugins);
    }
    Ok(commands)
}

impl GenerateSettings {
    /// Merges `args` over `config`.
    pub fn resolve(args: &GenerateArgs, config: &Config) -> Result<Self> {
        let schema = args.schema.clone().or_else(|| config.generation.schema.clone()).ok_or(CliError::MissingSchema)?;
        let commands = plugin_commands(&args.plugins, config)?;

        let mut options = config.generation_options()?;
        let overrides: GenerationOptions =
            args.options.iter().map(|argument| parse_option_argument(argument)).collect::<Result<_>>()?;
        for (key, values) in overrides.raw() {
            options.remove(key);
            for value in values {
                options.append(key, value.as_str());
            }
        }
        for input in &args.source_inputs {
            options.append(GenerationOptions::SOURCE_INPUT.name, input.to_string_lossy());
        }
        for input in &args.context_inputs {
            options.append(GenerationOptions::CONTEXT_INPUT.name, input.to_string_lossy());
        }
        if args.permit_package_cycles {
            options.set(GenerationOptions::PERMIT_PACKAGE_CYCLES.name, "true");
        }
        if let Some(gen_output) = &args.gen_output {
            options.set_gen_output(gen_output);
        }

        Ok(Self {
            schema,
            commands,
            options,
            policy: ErrorPolicy::from_ignore_errors(args.ignore_errors || config.plugins.ignore_errors),
            handshake_timeout: config.timeouts.handshake(),
            generation_timeout: config.timeouts.generation(),
        })
    }
}

/// Level of internal diagnostics: `debug` wins, then the argument, then
/// the config. Unknown names fall back to `info`.
pub fn tracing_level(cli: &Cli, config: &Config) -> tracing::Level {
    if cli.debug || config.logging.debug {
        return tracing::Level::DEBUG;
    }
    let name = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    rrgen_logging::parse_level(name).unwrap_or(tracing::Level::INFO)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn parse(args: &[&str]) -> Cli { Cli::try_parse_from(args).expect("arguments should parse") }

    fn generate_args(cli: Cli) -> GenerateArgs {
        match cli.cmd {
            Commands::Generate(args) => args,
            other => panic!("Expected generate, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_option_argument() {
        assert_eq!(
            parse_option_argument("json:pretty=true").expect("should parse"),
            ("json:pretty".to_string(), "true".to_string())
        );
        assert_eq!(parse_option_argument("a=b=c").expect("should parse"), ("a".to_string(), "b=c".to_string()));
        match parse_option_argument("=x") {
            Err(CliError::InvalidOptionArgument(argument)) => assert_eq!(argument, "=x"),
            other => panic!("Expected InvalidOptionArgument, got {:?}", other),
        }
        assert!(parse_option_argument("novalue").is_err());
    }

    #[test]
    fn test_arguments_override_config() {
        let config: Config = toml_config(
            r#"
            [generation]
            schema = "from-config.json"
            gen_output = "config-out"
            [generation.options]
            "json:pretty" = false
            "json:header" = ["a", "b"]
            [plugins]
            commands = ["rrgen-json-generator"]
            [timeouts]
            generation_secs = 30
            "#,
        );
        let cli = parse(&[
            "rrgen",
            "generate",
            "--plugin",
            "rrgen-prune-processor --quiet",
            "--plugin",
            "rrgen-json-generator",
            "--gen-output",
            "cli-out",
            "--option",
            "json:pretty=true",
            "--ignore-errors",
        ]);
        let settings = GenerateSettings::resolve(&generate_args(cli), &config).expect("settings should resolve");

        assert_eq!(settings.schema, PathBuf::from("from-config.json"));
        assert_eq!(settings.commands, vec![
            vec!["rrgen-prune-processor".to_string(), "--quiet".to_string()],
            vec!["rrgen-json-generator".to_string()],
        ]);
        assert_eq!(settings.options.get_all("json:pretty"), ["true".to_string()]);
        assert_eq!(settings.options.get_all("json:header").len(), 2);
        assert_eq!(settings.options.gen_output().as_deref(), Some(Path::new("cli-out")));
        assert_eq!(settings.policy, ErrorPolicy::Ignore);
        assert_eq!(settings.generation_timeout, Some(Duration::from_secs(30)));
        assert_eq!(settings.handshake_timeout, None);
    }

    #[test]
    fn test_missing_schema_and_plugins() {
        let config = Config::default();
        let cli = parse(&["rrgen", "generate", "--plugin", "rrgen-json-generator"]);
        match GenerateSettings::resolve(&generate_args(cli), &config) {
            Err(CliError::MissingSchema) => {}
            other => panic!("Expected MissingSchema, got {:?}", other),
        }

        let cli = parse(&["rrgen", "generate", "--schema", "ir.json"]);
        match GenerateSettings::resolve(&generate_args(cli), &config) {
            Err(CliError::NoPlugins) => {}
            other => panic!("Expected NoPlugins, got {:?}", other),
        }
    }

    #[test]
    fn test_tracing_level() {
        let config = Config::default();
        assert_eq!(tracing_level(&parse(&["rrgen", "describe"]), &config), tracing::Level::INFO);
        assert_eq!(tracing_level(&parse(&["rrgen", "describe", "--log-level", "warn"]), &config), tracing::Level::WARN);
        assert_eq!(tracing_level(&parse(&["rrgen", "--debug", "describe"]), &config), tracing::Level::DEBUG);
    }

    fn toml_config(content: &str) -> Config {
        let file = tempfile::NamedTempFile::new().expect("Failed to create temporary file");
        std::fs::write(file.path(), content).expect("Failed to write config");
        Config::from_file(file.path()).expect("config should parse")
    }
}
