//! Status command
//!
//! Usage: docbridge status

use clap::Args;
use docbridge_core::commands::Command;
use docbridge_core::config::BridgeConfig;
use docbridge_core::dispatch::dispatch;

#[derive(Debug, Args)]
pub struct StatusArgs {}

/// Execute status command
pub async fn execute(_args: StatusArgs, config: &BridgeConfig) -> anyhow::Result<()> {
    let mut document = config.build_document();
    let output = dispatch(&mut document, &Command::Status).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
