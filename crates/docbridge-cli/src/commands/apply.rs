//! Apply command
//!
//! Usage: docbridge apply --plan <FILE> [--dry-run] [--captures-out <FILE>]
//!        [--expected-document-name <NAME>] [--expected-document-key <KEY>] [--dump]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;
use docbridge_core::config::BridgeConfig;
use docbridge_core::plan::{dry_run, Plan, PlanRunner, RunnerOptions};
use docbridge_core::transport::LocalChannel;

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Path to the operation plan JSON
    #[arg(long)]
    pub plan: PathBuf,

    /// Print mapped bridge commands only
    #[arg(long)]
    pub dry_run: bool,

    /// Write the capture map to this file
    #[arg(long)]
    pub captures_out: Option<PathBuf>,

    /// Fail unless the connected document has exactly this name
    #[arg(long)]
    pub expected_document_name: Option<String>,

    /// Fail unless the connected document has exactly this key
    #[arg(long)]
    pub expected_document_key: Option<String>,

    /// Per-command timeout in milliseconds (overrides config file)
    #[arg(long)]
    pub op_timeout_ms: Option<u64>,

    /// Print the resulting document tree
    #[arg(long)]
    pub dump: bool,
}

/// Execute apply command
pub async fn execute(args: ApplyArgs, config: &BridgeConfig) -> anyhow::Result<()> {
    let plan = Plan::load(&args.plan)?;
    if let Some(project) = &plan.meta.project_name {
        println!("Project: {}", project);
    }
    if let Some(task) = &plan.meta.task_id {
        println!("Task ID: {}", task);
    }

    if args.dry_run {
        let (steps, captures) = dry_run(&plan)?;
        println!("Dry-run mapping:");
        for step in &steps {
            println!("{}", step);
        }
        println!("Dry-run captures:");
        println!("{}", serde_json::to_string_pretty(&captures)?);
        return Ok(());
    }

    let options = RunnerOptions {
        op_timeout: args
            .op_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| config.op_timeout()),
        expected_document_name: args.expected_document_name,
        expected_document_key: args.expected_document_key,
    };
    let mut runner = PlanRunner::new(LocalChannel::new(config.build_document()), options);
    let report = runner.run(&plan).await?;

    println!("Connected file: {}", report.status.file_name);
    if !report.status.file_key.is_empty() {
        println!("Connected fileKey: {}", report.status.file_key);
    }
    for step in &report.steps {
        println!("[{:02}] {} -> {}", step.index, step.name, step.command);
        if let Some(error) = &step.error {
            println!("ignored error: {}", error);
        }
        let capture = plan
            .operations
            .get(step.index - 1)
            .and_then(|op| op.capture_name());
        if let (Some(name), Some(id)) = (capture, &step.captured) {
            println!("captured {}={}", name, id);
        }
    }
    println!("Execution completed.");
    println!("{}", serde_json::to_string_pretty(&report.captures)?);

    if let Some(path) = &args.captures_out {
        write_captures(path, &report.captures)?;
        println!("Capture map written: {}", path.display());
    }

    if args.dump {
        let document = runner.into_channel().into_host();
        println!("{}", serde_json::to_string_pretty(&document.to_tree()?)?);
    }
    Ok(())
}

fn write_captures(path: &Path, captures: &BTreeMap<String, String>) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(captures)?)?;
    Ok(())
}
