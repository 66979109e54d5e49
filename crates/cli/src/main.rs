//! Concierge CLI: the main entry point.
//!
//! Commands:
//! - `init`    : Write a default config file
//! - `serve`   : Start the HTTP gateway
//! - `chat`    : Interactive or single-message chat
//! - `history` : Print a session's history
//! - `clear`   : Delete a session's history

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "concierge",
    about = "Concierge — session memory and intent routing for chat agents",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Chat with the orchestrator
    Chat {
        /// Session to continue (a new one is created otherwise)
        #[arg(short, long)]
        session: Option<String>,

        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Print the history of a session
    History {
        session_id: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete the history of a session
    Clear { session_id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Chat { session, message } => commands::chat::run(session, message).await?,
        Commands::History { session_id, json } => commands::history::show(&session_id, json).await?,
        Commands::Clear { session_id } => commands::history::clear(&session_id).await?,
    }

    Ok(())
}
