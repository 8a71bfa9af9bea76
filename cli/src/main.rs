mod args;
mod commands;
mod duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::args::Cli;

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("Log system initialization failed: {e}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    commands::run(Cli::parse()).await
}
