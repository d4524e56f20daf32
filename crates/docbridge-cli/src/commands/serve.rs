//! Serve command
//!
//! Usage: docbridge serve [--dump-on-exit]

use clap::Args;
use docbridge_core::config::BridgeConfig;
use docbridge_core::transport::serve_lines;
use tokio::io::BufReader;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Print the document tree to stderr once input closes
    #[arg(long)]
    pub dump_on_exit: bool,
}

/// Execute serve command
pub async fn execute(args: ServeArgs, config: &BridgeConfig) -> anyhow::Result<()> {
    let mut document = config.build_document();
    tracing::info!(document = %config.document.name, "serving bridge on stdio");

    let reader = BufReader::new(tokio::io::stdin());
    let served = serve_lines(&mut document, reader, tokio::io::stdout()).await?;
    tracing::info!(served, "bridge closed");

    if args.dump_on_exit {
        eprintln!("{}", serde_json::to_string_pretty(&document.to_tree()?)?);
    }
    Ok(())
}
