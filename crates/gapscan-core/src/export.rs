use crate::error::{GapscanError, Result};
use crate::roadmap::{Roadmap, RoadmapItem};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ExportFormat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Markdown,
    Csv,
    Json,
    Github,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "markdown",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Github => "github",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = GapscanError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "github" => Ok(ExportFormat::Github),
            _ => Err(GapscanError::Export {
                format: s.to_string(),
                reason: "unknown export format".to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Table columns
// ---------------------------------------------------------------------------

const COLUMNS: &[&str] = &[
    "Priority",
    "Phase",
    "Title",
    "Type",
    "Effort(hours)",
    "Status",
    "Tags",
    "Dependencies",
];

fn row_values(item: &RoadmapItem) -> Vec<String> {
    vec![
        item.priority.to_string(),
        item.phase.to_string(),
        item.title.clone(),
        item.item_type.to_string(),
        format!("{}", item.effort.hours),
        item.status.to_string(),
        item.tags.join(", "),
        item.dependencies.join(", "),
    ]
}

// ---------------------------------------------------------------------------
// Markdown
// ---------------------------------------------------------------------------

pub fn to_markdown(roadmap: &Roadmap) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Roadmap: {}\n\n", roadmap.metadata.project));
    out.push_str(&format!(
        "Generated {} using the `{}` phasing strategy.\n\n",
        roadmap.metadata.generated_at.format("%Y-%m-%d"),
        roadmap.metadata.strategy
    ));

    if !roadmap.metadata.warnings.is_empty() {
        out.push_str("## Warnings\n\n");
        for warning in &roadmap.metadata.warnings {
            out.push_str(&format!("- {warning}\n"));
        }
        out.push('\n');
    }

    out.push_str("## Phases\n\n");
    for phase in &roadmap.phases {
        out.push_str(&format!(
            "- Phase {}: {} items, ~{} weeks\n",
            phase.number,
            phase.items.len(),
            phase.estimated_weeks
        ));
    }
    out.push('\n');

    out.push_str("## Items\n\n");
    out.push_str(&format!("| {} |\n", COLUMNS.join(" | ")));
    out.push_str(&format!("|{}\n", "---|".repeat(COLUMNS.len())));
    for item in &roadmap.all_items {
        let cells: Vec<String> = row_values(item)
            .into_iter()
            .map(|v| v.replace('|', "\\|"))
            .collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    out
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// RFC 4180: quote fields with embedded commas, quotes, or newlines;
/// double any embedded quote.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn to_csv(roadmap: &Roadmap) -> String {
    let mut out = String::new();
    out.push_str(&COLUMNS.join(","));
    out.push_str("\r\n");
    for item in &roadmap.all_items {
        let cells: Vec<String> = row_values(item).iter().map(|v| csv_field(v)).collect();
        out.push_str(&cells.join(","));
        out.push_str("\r\n");
    }
    out
}

// ---------------------------------------------------------------------------
// GitHub issues
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<String>,
}

pub fn to_github_issues(roadmap: &Roadmap) -> Vec<GithubIssue> {
    roadmap
        .all_items
        .iter()
        .map(|item| {
            let mut body = String::new();
            body.push_str(&format!("Estimated effort: {}h", item.effort.hours));
            body.push_str(&format!(
                " (range {}-{}h)\n",
                item.effort.range.optimistic, item.effort.range.pessimistic
            ));
            body.push_str(&format!("Status: {}\n", item.status));
            if !item.dependencies.is_empty() {
                body.push_str(&format!("Depends on: {}\n", item.dependencies.join(", ")));
            }

            let mut labels: Vec<String> = Vec::new();
            for label in [item.priority.to_string().to_lowercase(), item.item_type.to_string()]
                .into_iter()
                .chain(item.tags.iter().cloned())
            {
                if !labels.contains(&label) {
                    labels.push(label);
                }
            }

            GithubIssue {
                title: item.title.clone(),
                body,
                labels,
                milestone: Some(format!(
                    "{} - Phase {}",
                    roadmap.metadata.project, item.phase
                )),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn export(roadmap: &Roadmap, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Markdown => Ok(to_markdown(roadmap)),
        ExportFormat::Csv => Ok(to_csv(roadmap)),
        ExportFormat::Json => {
            serde_json::to_string_pretty(roadmap).map_err(|e| GapscanError::Export {
                format: "json".to_string(),
                reason: e.to_string(),
            })
        }
        ExportFormat::Github => {
            let issues = to_github_issues(roadmap);
            serde_json::to_string_pretty(&issues).map_err(|e| GapscanError::Export {
                format: "github".to_string(),
                reason: e.to_string(),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
