use std::sync::Arc;

use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use venn::cli::{parse_args, run_cli_command, CliCommand};
use venn::config::AppConfig;
use venn::server::start_server;
use venn::storage::MemStorage;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // RUST_LOG overrides the default filter
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("venn=info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    match parse_args(std::env::args()) {
        CliCommand::Serve => serve(&config).await,
        command => run_cli_command(command, &config).await,
    }
}

async fn serve(config: &AppConfig) -> Result<()> {
    let storage = Arc::new(MemStorage::new());
    let (handle, _addr) = start_server(&config.server, storage).await?;

    tokio::select! {
        result = handle => {
            if let Err(e) = result {
                tracing::error!("Server task failed: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
        }
    }
    Ok(())
}
