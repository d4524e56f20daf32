//! Plan command
//!
//! Usage: docbridge plan --doc <FILE> (--full-refresh | --changed-headings <LIST>)
//!        [--device <PRESET>] [--project-name <NAME>] [--task-id <ID>]
//!        [--page-name <NAME>] [--max-screens <N>] [--x-gap <PX>]
//!        [--temp-root <DIR>] [--output <FILE>]

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Args;
use docbridge_core::config::BridgeConfig;
use docbridge_core::plan::generate::{
    parse_changed_headings, DEFAULT_MAX_SCREENS, DEFAULT_X_GAP,
};
use docbridge_core::plan::{generate_plan, Device, GeneratorOptions};

/// Default temp subdirectory holding generated plans
const TEMP_DIR_NAME: &str = "auto-figma";

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Path to the UI markdown document
    #[arg(long, alias = "input")]
    pub doc: PathBuf,

    /// Output plan path; must be under the temp root
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Frame size preset: android, ios, ipad or web
    #[arg(long, default_value = "ios")]
    pub device: Device,

    /// Project name used for the output file prefix
    #[arg(long, default_value = "")]
    pub project_name: String,

    /// Task id used to avoid collisions within a project
    #[arg(long, default_value = "")]
    pub task_id: String,

    /// Temp root directory (defaults to the system temp dir + auto-figma)
    #[arg(long)]
    pub temp_root: Option<PathBuf>,

    /// Target page name (defaults to AUTO-<project slug>)
    #[arg(long, default_value = "")]
    pub page_name: String,

    #[arg(long, default_value_t = DEFAULT_MAX_SCREENS)]
    pub max_screens: usize,

    /// Horizontal gap between generated frames
    #[arg(long, default_value_t = DEFAULT_X_GAP)]
    pub x_gap: i64,

    /// Comma-separated changed screen headings for incremental updates
    #[arg(long, default_value = "")]
    pub changed_headings: String,

    /// Regenerate every screen (initial build or global refactor)
    #[arg(long)]
    pub full_refresh: bool,
}

/// Execute plan command
pub async fn execute(args: PlanArgs, _config: &BridgeConfig) -> anyhow::Result<()> {
    let input = std::path::absolute(&args.doc)?;
    if !input.exists() {
        bail!("Input not found: {}", input.display());
    }
    let markdown = std::fs::read_to_string(&input)
        .with_context(|| format!("reading {}", input.display()))?;

    let project_name = match args.project_name.trim() {
        "" => default_project_name(&input),
        name => name.to_string(),
    };
    let options = GeneratorOptions {
        project_name,
        task_id: args.task_id,
        page_name: args.page_name,
        device: args.device,
        max_screens: args.max_screens,
        x_gap: args.x_gap,
        changed_headings: parse_changed_headings(&args.changed_headings),
        full_refresh: args.full_refresh,
        source_doc: Some(input.display().to_string()),
    };
    let plan = generate_plan(&markdown, &options)?;

    let temp_root = match &args.temp_root {
        Some(root) => std::path::absolute(root)?,
        None => std::env::temp_dir().join(TEMP_DIR_NAME),
    };
    std::fs::create_dir_all(&temp_root)?;

    let meta = &plan.meta;
    let project_slug = meta.project_slug.clone().unwrap_or_default();
    let task_id = meta.task_id.clone().unwrap_or_default();
    let output = match &args.output {
        Some(path) => std::path::absolute(path)?,
        None => temp_root.join(format!("{}_{}_plan.json", project_slug, task_id)),
    };
    if !output.starts_with(&temp_root) {
        bail!("Output path must be under temp root: {}", temp_root.display());
    }

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output, serde_json::to_string_pretty(&plan)?)?;
    tracing::info!(path = %output.display(), operations = plan.operations.len(), "plan written");

    println!("Generated plan: {}", output.display());
    println!("Temp root: {}", temp_root.display());
    println!(
        "Project: {} ({})",
        meta.project_name.as_deref().unwrap_or_default(),
        project_slug
    );
    println!("Task ID: {}", task_id);
    if let Some(mode) = meta.mode {
        println!("Mode: {}", mode);
    }
    println!("Page name: {}", meta.page_name.as_deref().unwrap_or_default());
    let screens: Vec<&str> = plan
        .operations
        .iter()
        .filter(|op| op.name.starts_with("create-frame-"))
        .filter_map(|op| frame_name(&op.run))
        .collect();
    println!("Screens: {}", screens.len());
    for (idx, screen) in screens.iter().enumerate() {
        println!("  {:02}. {}", idx + 1, screen);
    }
    Ok(())
}

fn default_project_name(input: &Path) -> String {
    input
        .parent()
        .and_then(Path::file_name)
        .or_else(|| input.file_stem())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Screen name from a frame's `--name S01-<screen>` token
fn frame_name(run: &[String]) -> Option<&str> {
    let pos = run.iter().position(|t| t == "--name")?;
    let name = run.get(pos + 1)?;
    Some(name.split_once('-').map_or(name.as_str(), |(_, screen)| screen))
}
