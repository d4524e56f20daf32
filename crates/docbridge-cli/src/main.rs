//! docbridge CLI
//!
//! Command-line interface for the document bridge

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use docbridge_core::config::BridgeConfig;
use docbridge_core::logging_facility::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "docbridge")]
#[command(about = "docbridge - JSON command bridge for hierarchical documents", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log profile: development, production or test
    #[arg(long, global = true)]
    log: Option<Profile>,

    /// Name of the in-memory document (overrides config file)
    #[arg(long, global = true)]
    document_name: Option<String>,

    /// Key of the in-memory document (overrides config file)
    #[arg(long, global = true)]
    document_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve line-delimited JSON requests on stdin/stdout
    Serve(commands::serve::ServeArgs),
    /// Apply an operation plan
    Apply(commands::apply::ApplyArgs),
    /// Generate an operation plan from a UI markdown document
    Plan(commands::plan::PlanArgs),
    /// Print the status report of a fresh document
    Status(commands::status::StatusArgs),
}

impl Cli {
    fn resolve_config(&self) -> anyhow::Result<BridgeConfig> {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::load(path)?,
            None => BridgeConfig::default(),
        };
        if let Some(profile) = self.log {
            config.log_profile = profile;
        }
        if let Some(name) = &self.document_name {
            config.document.name = name.clone();
        }
        if let Some(key) = &self.document_key {
            config.document.key = Some(key.clone());
        }
        Ok(config)
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.resolve_config()?;
    logging_facility::init(config.log_profile);

    match cli.command {
        Commands::Serve(args) => commands::serve::execute(args, &config).await,
        Commands::Apply(args) => commands::apply::execute(args, &config).await,
        Commands::Plan(args) => commands::plan::execute(args, &config).await,
        Commands::Status(args) => commands::status::execute(args, &config).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
