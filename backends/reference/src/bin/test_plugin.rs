use clap::Parser;
use reference::scripted::{hosted, run_misbehaving, Mode, EXIT_CODE};

#[derive(Parser, Debug)]
#[command(name = "rrgen-test-plugin")]
#[command(about = "Plugin that follows or breaks the rrgen protocol on request")]
struct Cli {
    /// Behaviour to script.
    #[arg(long, value_enum, default_value_t = Mode::WellBehaved)]
    mode: Mode,

    /// Name announced in the handshake.
    #[arg(long, default_value = "scripted")]
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    rrgen_logging::init_tracing(tracing::Level::WARN);

    match cli.mode {
        Mode::Exit => std::process::exit(EXIT_CODE),
        mode if mode.follows_protocol() => plugins::run_stdio(&hosted(&cli.name, mode)).await?,
        mode => run_misbehaving(&cli.name, mode, tokio::io::stdin(), tokio::io::stdout()).await?,
    }
    Ok(())
}
