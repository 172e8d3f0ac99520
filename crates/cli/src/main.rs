//! CRM CLI - Database migrations and maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! crm-cli migrate
//!
//! # Replace all data with the records in a YAML file
//! crm-cli seed --file crates/cli/seed/customers.yaml
//!
//! # Add records without clearing first
//! crm-cli seed --file extra.yaml --keep-existing
//!
//! # Bulk delete
//! crm-cli clear addresses
//! crm-cli clear all
//!
//! # Show totals
//! crm-cli stats
//! ```
//!
//! The database is located the same way the server does it
//! (`CRM_DATABASE_URL`, then `DATABASE_URL`, then `sqlite://crm.db`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(name = "crm-cli")]
#[command(author, version, about = "CRM CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load customers and addresses from a YAML file
    Seed {
        /// Path to the YAML file
        #[arg(short, long)]
        file: String,

        /// Keep existing rows instead of clearing them first
        #[arg(long)]
        keep_existing: bool,
    },
    /// Delete rows in bulk
    Clear {
        #[arg(value_enum)]
        target: ClearTarget,
    },
    /// Show row counts and address partitions
    Stats,
}

#[derive(Clone, Copy, ValueEnum)]
enum ClearTarget {
    /// Every address (customers are kept)
    Addresses,
    /// Every customer, and with them every address
    Customers,
    /// Everything
    All,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed {
            file,
            keep_existing,
        } => commands::seed::run(&file, keep_existing).await?,
        Commands::Clear { target } => match target {
            ClearTarget::Addresses => commands::clear::addresses().await?,
            ClearTarget::Customers => commands::clear::customers().await?,
            ClearTarget::All => {
                commands::clear::addresses().await?;
                commands::clear::customers().await?;
            }
        },
        Commands::Stats => commands::stats::run().await?,
    }
    Ok(())
}
