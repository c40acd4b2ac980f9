//! Main entry point for the Ladino translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ladino_translator::cli::commands::{self, Commands};

/// Ladino Translator - Claude-backed translation endpoint
#[derive(Parser, Debug)]
#[command(name = "ladino-translator", version, about, long_about = None)]
struct Args {
    /// API key for Claude (optional, defaults to CLAUDE_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let default_filter = if args.verbose {
        "ladino_translator=debug,tower_http=debug"
    } else {
        "ladino_translator=info,tower_http=info"
    };

    let env_filter = if args.verbose {
        tracing_subscriber::EnvFilter::new(default_filter)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| default_filter.into())
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Override config with CLI args if provided
    if let Some(api_key) = args.api_key {
        std::env::set_var("CLAUDE_API_KEY", api_key);
    }

    // Execute command
    match args.command {
        Some(Commands::Server { host, port, debug }) => {
            commands::handle_server(host, port, debug).await?;
        }
        Some(Commands::Translate { text, from, to }) => {
            commands::handle_translate(text, from, to).await?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
