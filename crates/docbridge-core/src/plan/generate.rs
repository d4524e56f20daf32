//! Plan generation from a UI markdown document
//!
//! Section headings (`##` to `####`) that look like screens become one frame
//! each, laid out left to right on a dedicated page, with a title text inside
//! every frame. Incremental runs keep only the screens whose headings changed.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use docbridge_core_types::RequestId;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{Plan, PlanMeta, PlanOperation};
use crate::errors::{BridgeError, Result};

pub const DEFAULT_MAX_SCREENS: usize = 12;
pub const DEFAULT_X_GAP: i64 = 120;
pub const MAX_SCREEN_NAME_CHARS: usize = 80;
pub const FALLBACK_SCREEN: &str = "Main Screen";
pub const GENERATOR_NAME: &str = "docbridge plan";

/// Headings containing any of these never become screens
const EXCLUDE_HINTS: &[&str] = &[
    "acceptance",
    "non-functional",
    "nfr",
    "appendix",
    "changelog",
    "base",
    "update",
    "验收",
    "附录",
    "变更",
    "非功能",
];

/// Headings containing any of these are preferred as screens
const SCREEN_HINTS: &[&str] = &[
    "screen",
    "page",
    "flow",
    "module",
    "home",
    "login",
    "setting",
    "profile",
    "detail",
    "dashboard",
    "页面",
    "页",
    "流程",
    "模块",
    "登录",
    "首页",
    "详情",
    "设置",
];

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#{2,4}\s+(.+)$").expect("heading pattern"))
}

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[(.*?)\]\(.*?\)").expect("link pattern"))
}

fn markup_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[*_>#]+").expect("markup pattern"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern"))
}

fn non_slug_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_-]+").expect("slug pattern"))
}

fn dash_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-{2,}").expect("dash pattern"))
}

/// Frame size preset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Ios,
    Android,
    Web,
    Ipad,
}

impl Device {
    pub fn frame_size(&self) -> FrameSize {
        let (width, height) = match self {
            Device::Ios => (390, 844),
            Device::Android => (412, 915),
            Device::Web => (1440, 1024),
            Device::Ipad => (1024, 1366),
        };
        FrameSize { width, height }
    }
}

impl FromStr for Device {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ios" => Ok(Device::Ios),
            "android" => Ok(Device::Android),
            "web" => Ok(Device::Web),
            "ipad" => Ok(Device::Ipad),
            other => Err(BridgeError::plan(format!(
                "Unknown device preset: {} (expected android, ios, ipad or web)",
                other
            ))),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Device::Ios => "ios",
            Device::Android => "android",
            Device::Web => "web",
            Device::Ipad => "ipad",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerateMode {
    /// Regenerate every screen (initial build or global refactor)
    FullRefresh,
    /// Regenerate only screens matching the changed headings
    Incremental,
}

impl fmt::Display for GenerateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateMode::FullRefresh => f.write_str("full-refresh"),
            GenerateMode::Incremental => f.write_str("incremental"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub project_name: String,
    /// Normalized before use; empty generates a fresh id
    pub task_id: String,
    /// Empty means `AUTO-<project slug>`
    pub page_name: String,
    pub device: Device,
    pub max_screens: usize,
    pub x_gap: i64,
    pub changed_headings: Vec<String>,
    pub full_refresh: bool,
    pub source_doc: Option<String>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            project_name: String::new(),
            task_id: String::new(),
            page_name: String::new(),
            device: Device::default(),
            max_screens: DEFAULT_MAX_SCREENS,
            x_gap: DEFAULT_X_GAP,
            changed_headings: Vec::new(),
            full_refresh: false,
            source_doc: None,
        }
    }
}

/// Strip inline markdown from a heading: code ticks, links, emphasis marks
pub fn clean_heading(text: &str) -> String {
    let text = text.replace('`', "");
    let text = link_re().replace_all(&text, "$1");
    let text = markup_re().replace_all(&text, " ");
    whitespace_re().replace_all(&text, " ").trim().to_string()
}

fn contains_hint(title: &str, hints: &[&str]) -> bool {
    let lower = title.to_lowercase();
    hints.iter().any(|hint| lower.contains(hint))
}

/// Candidate screen titles, in document order and without case-insensitive
/// duplicates
///
/// Headings with a screen hint win; when none has one, every non-excluded
/// heading is used.
pub fn extract_headings(markdown: &str) -> Vec<String> {
    let mut hinted = Vec::new();
    let mut all = Vec::new();

    for line in markdown.lines() {
        let Some(caps) = heading_re().captures(line) else {
            continue;
        };
        let title = clean_heading(&caps[1]);
        if title.is_empty() || contains_hint(&title, EXCLUDE_HINTS) {
            continue;
        }
        if contains_hint(&title, SCREEN_HINTS) {
            hinted.push(title.clone());
        }
        all.push(title);
    }

    let chosen = if hinted.is_empty() { all } else { hinted };
    let mut seen = std::collections::HashSet::new();
    chosen
        .into_iter()
        .filter(|title| seen.insert(title.to_lowercase()))
        .collect()
}

/// Cap each name and the count; an empty list becomes one fallback screen
pub fn trim_screens<I, S>(screens: I, max_screens: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let trimmed: Vec<String> = screens
        .into_iter()
        .map(|s| s.as_ref().chars().take(MAX_SCREEN_NAME_CHARS).collect())
        .collect();
    if trimmed.is_empty() {
        return vec![FALLBACK_SCREEN.to_string()];
    }
    trimmed.into_iter().take(max_screens).collect()
}

/// Split a comma-separated heading list, cleaning each entry
pub fn parse_changed_headings(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(clean_heading)
        .filter(|item| !item.is_empty())
        .collect()
}

/// Screens whose name contains, or is contained in, any changed heading
///
/// No changed headings keeps every screen.
pub fn filter_incremental_screens(screens: &[String], changed: &[String]) -> Vec<String> {
    if changed.is_empty() {
        return screens.to_vec();
    }
    let changed: Vec<String> = changed.iter().map(|c| c.to_lowercase()).collect();
    screens
        .iter()
        .filter(|screen| {
            let lower = screen.to_lowercase();
            changed
                .iter()
                .any(|token| lower.contains(token.as_str()) || token.contains(lower.as_str()))
        })
        .cloned()
        .collect()
}

fn collapse_slug(raw: &str) -> String {
    let value = non_slug_re().replace_all(raw.trim(), "-");
    let value = dash_run_re().replace_all(&value, "-");
    value.trim_matches(|c| c == '-' || c == '_').to_string()
}

pub fn slugify_project_name(name: &str) -> String {
    let slug = collapse_slug(name).to_lowercase();
    if slug.is_empty() {
        "project".to_string()
    } else {
        slug
    }
}

pub fn normalize_task_id(task_id: &str) -> String {
    collapse_slug(task_id)
}

/// `task-<time-ordered hex>-<random hex>`
pub fn generate_task_id() -> String {
    let raw: String = RequestId::new()
        .as_str()
        .chars()
        .filter(|c| *c != '-')
        .collect();
    let stamp = raw.get(..12).unwrap_or(&raw);
    let tail = raw.get(raw.len().saturating_sub(4)..).unwrap_or_default();
    format!("task-{}-{}", stamp, tail)
}

pub fn frame_alias(index: usize) -> String {
    format!("screen_{:02}", index)
}

fn run(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

/// Page creation, then one frame and one title text per screen
///
/// Frames sit on one row starting at x = 0, `x_gap` apart. Each frame is
/// captured as `screen_NN` and its title as `screen_NN_title`.
pub fn build_operations(
    screen_names: &[String],
    page_name: &str,
    size: FrameSize,
    x_gap: i64,
) -> Vec<PlanOperation> {
    let mut ops = vec![
        PlanOperation {
            name: "create-page".to_string(),
            run: run(&["create", "page", page_name, "--json"]),
            capture: Some("page_id".to_string()),
            ignore_error: false,
        },
        PlanOperation {
            name: "set-page".to_string(),
            run: run(&["page", "set", page_name]),
            capture: None,
            ignore_error: false,
        },
    ];

    let mut cursor_x = 0;
    for (idx, screen) in screen_names.iter().enumerate() {
        let idx = idx + 1;
        let alias = frame_alias(idx);
        let frame_name = format!("S{:02}-{}", idx, screen);
        let (x, width, height) = (
            cursor_x.to_string(),
            size.width.to_string(),
            size.height.to_string(),
        );

        ops.push(PlanOperation {
            name: format!("create-frame-{:02}", idx),
            run: run(&[
                "create", "frame", "--name", &frame_name, "--x", &x, "--y", "0", "--width",
                &width, "--height", &height, "--fill", "#FFFFFF", "--layout", "VERTICAL",
                "--gap", "16", "--padding", "24", "--json",
            ]),
            capture: Some(alias.clone()),
            ignore_error: false,
        });

        let parent = format!("{{{{{}}}}}", alias);
        ops.push(PlanOperation {
            name: format!("create-title-{:02}", idx),
            run: run(&[
                "create", "text", "--name", "ScreenTitle", "--x", "24", "--y", "24", "--text",
                &frame_name, "--font-size", "24", "--fill", "#111111", "--parent", &parent,
                "--json",
            ]),
            capture: Some(format!("{}_title", alias)),
            ignore_error: false,
        });

        cursor_x += size.width + x_gap;
    }
    ops
}

/// Build a plan for the screens of `markdown`
///
/// # Errors
///
/// Fails when an incremental run has no changed headings, or when none of
/// them matches a screen.
pub fn generate_plan(markdown: &str, options: &GeneratorOptions) -> Result<Plan> {
    let candidates = extract_headings(markdown);
    let mode = if options.full_refresh {
        GenerateMode::FullRefresh
    } else {
        GenerateMode::Incremental
    };

    let pool = match mode {
        GenerateMode::FullRefresh => candidates,
        GenerateMode::Incremental => {
            if options.changed_headings.is_empty() {
                return Err(BridgeError::plan(
                    "Incremental mode requires --changed-headings. \
                     Use --full-refresh only for initial build or global refactor.",
                ));
            }
            let matched = filter_incremental_screens(&candidates, &options.changed_headings);
            if matched.is_empty() {
                return Err(BridgeError::plan(
                    "No matching screens found for incremental update. Check --changed-headings.",
                ));
            }
            matched
        }
    };
    let screens = trim_screens(&pool, options.max_screens);

    let project_slug = slugify_project_name(&options.project_name);
    let task_id = match normalize_task_id(&options.task_id) {
        id if id.is_empty() => generate_task_id(),
        id => id,
    };
    let page_name = match options.page_name.trim() {
        "" => format!("AUTO-{}", project_slug),
        name => name.to_string(),
    };
    let size = options.device.frame_size();

    tracing::debug!(
        screens = screens.len(),
        mode = ?mode,
        page = %page_name,
        "generated plan"
    );

    Ok(Plan {
        meta: PlanMeta {
            project_name: Some(options.project_name.clone()),
            task_id: Some(task_id),
            generator: Some(GENERATOR_NAME.to_string()),
            source_doc: options.source_doc.clone(),
            project_slug: Some(project_slug),
            mode: Some(mode),
            changed_headings: options.changed_headings.clone(),
            page_name: Some(page_name.clone()),
            screen_count: Some(screens.len()),
            frame_size: Some(size),
        },
        operations: build_operations(&screens, &page_name, size, options.x_gap),
    })
}
