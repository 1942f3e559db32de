use clap::Parser;
use diamond_scripts::{cli::Cli, constants::DEFAULT_LOG_FILTER, errors::ScriptError};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    // Values from `.env` back the env-aware flags, a missing file is fine
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let Cli { config, command } = Cli::parse();
    command.run(&config).await
}
