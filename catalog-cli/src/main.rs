//! Catalog CLI
//!
//! Fetches the product catalog as the signed-in user (or anonymously) and
//! prints it. Session tokens come from `--id-token` or a session file.

#![allow(clippy::print_stdout, reason = "CLI tool outputs to stdout")]

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use catalog_client::{
    ClientConfig, FileSessionProvider, ProductClient, RestTransport, SessionProvider,
    StaticSessionProvider,
};
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    let sessions = session_provider(&cli);

    match cli.command {
        Commands::Products { json } => {
            let client = build_client(&config, sessions)?;
            commands::list_products(&client, json).await
        }
        Commands::Whoami { json } => commands::whoami(sessions.as_ref(), json).await,
        Commands::Headers => {
            let client = build_client(&config, sessions)?;
            commands::show_headers(&client).await
        }
    }
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    ClientConfig::from_sources(cli.config.as_deref(), cli.endpoint.as_deref())
        .context("Failed to load client config")
}

fn session_provider(cli: &Cli) -> Arc<dyn SessionProvider> {
    if let Some(token) = &cli.id_token {
        return Arc::new(StaticSessionProvider::from_id_token(token.clone()));
    }
    match &cli.session_file {
        Some(path) => Arc::new(FileSessionProvider::new(path.clone())),
        None => Arc::new(StaticSessionProvider::anonymous()),
    }
}

fn build_client(
    config: &ClientConfig,
    sessions: Arc<dyn SessionProvider>,
) -> Result<ProductClient> {
    let transport = RestTransport::new(config).context("Failed to build HTTP transport")?;
    Ok(ProductClient::new(
        sessions,
        Arc::new(transport),
        config.product.clone(),
    ))
}
