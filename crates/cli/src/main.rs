//! Room-service CLI - database migrations and demo data.
//!
//! # Usage
//!
//! ```bash
//! # Apply migrations from crates/server/migrations
//! rs-cli migrate
//!
//! # Create the demo restaurant and menu (no-op if a restaurant exists)
//! rs-cli seed
//! ```
//!
//! Both commands read `ROOMSERVICE_DATABASE_URL`, falling back to `DATABASE_URL`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "rs-cli")]
#[command(author, version, about = "Room-service CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the demo restaurant and menu
    Seed,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Seed => commands::seed::demo_catalog().await,
    }
}
