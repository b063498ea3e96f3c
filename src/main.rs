use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

mod app;
mod client;
mod commands;
mod config;
mod error;
mod events;
mod logging;
mod tui;
mod ui;

use client::QueryClient;
use config::Config;
use logging::LogTarget;
use ui::conversation::ConversationManager;

#[derive(Parser)]
#[command(name = "soch")]
#[command(version)]
#[command(about = "Chat with your SochGPT private LLM backend", long_about = None)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Origin that relative requests resolve against
    #[arg(long, global = true)]
    origin: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question and print the answer
    Ask {
        /// The question; multiple words are joined with spaces
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Check that the backend is reachable
    Health,
    /// Show where chat requests will be sent
    Endpoint,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(origin) = cli.origin {
        config.origin = origin;
    }

    let log_target = match cli.command {
        None => LogTarget::File(config.log_path()),
        Some(_) => LogTarget::Stderr,
    };
    logging::init(log_target)?;

    // Resolved once; every request reuses it
    let endpoint = config.endpoint();
    tracing::info!(chat_target = %endpoint.chat_target(), origin = %endpoint.origin(), "backend endpoint resolved");

    match cli.command {
        // Shows the setting even when it does not parse
        Some(Commands::Endpoint) => commands::endpoint(&endpoint),
        None => {
            let client = QueryClient::new(endpoint)?;
            let manager =
                ConversationManager::new(client.endpoint().chat_target(), config.ui.show_timestamps);
            app::run(manager, Arc::new(client)).await
        }
        Some(Commands::Ask { query }) => {
            commands::ask(&QueryClient::new(endpoint)?, &query.join(" ")).await
        }
        Some(Commands::Health) => commands::health(&QueryClient::new(endpoint)?).await,
    }
}
