//! inkdash entry point.

use clap::Parser;
use inkdash_server::cli::{Cli, Command};
use inkdash_server::config_handlers::handle_config_command;
use inkdash_server::{InkdashConfig, serve};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,inkdash=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let config = InkdashConfig::load(cli.config.as_deref())?;
            if let Err(e) = serve(&config).await {
                tracing::error!("Server failed: {e}");
                return Err(e.into());
            }
        }
        Command::Config { action } => handle_config_command(cli.config.as_deref(), action)?,
    }
    Ok(())
}
