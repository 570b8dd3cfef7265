use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "catalog-cli",
    about = "Browse the bookstore product catalog",
    version = env!("CARGO_PKG_VERSION"),
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short,
        long,
        env = "CATALOG_CONFIG",
        help = "Path to client config JSON"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        short,
        long,
        env = "CATALOG_API_ENDPOINT",
        help = "Base URL of the product API"
    )]
    pub endpoint: Option<String>,

    #[arg(
        short,
        long,
        env = "CATALOG_SESSION_FILE",
        conflicts_with = "id_token",
        help = "Session JSON file holding the signed-in user's tokens"
    )]
    pub session_file: Option<PathBuf>,

    #[arg(
        long,
        env = "CATALOG_ID_TOKEN",
        hide_env_values = true,
        help = "ID token to send"
    )]
    pub id_token: Option<String>,

    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List products visible to the current user")]
    Products {
        #[arg(short, long, help = "Output raw JSON")]
        json: bool,
    },

    #[command(about = "Show the claims of the current session")]
    Whoami {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Show the headers the next request would carry")]
    Headers,
}
