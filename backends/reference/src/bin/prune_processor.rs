use plugins::{debug_from_env, run_stdio, HostedPlugin};
use reference::PruneProcessor;

#[tokio::main]
async fn main() -> plugins::Result<()> {
    let debug = debug_from_env();
    rrgen_logging::init_tracing(if debug { tracing::Level::DEBUG } else { tracing::Level::WARN });
    run_stdio(&HostedPlugin::Processor(Box::new(PruneProcessor))).await
}
