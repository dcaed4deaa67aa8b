//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::plan::{Action, DiffCategory, DiffEntry, DiffModel};
use crate::reporter::ReportOutcome;
use crate::report::short_digest;

use super::commands::OutputFormat;

/// Categories in display order.
const CATEGORIES: [DiffCategory; 5] = [
    DiffCategory::Resource,
    DiffCategory::Drift,
    DiffCategory::Output,
    DiffCategory::Move,
    DiffCategory::Import,
];

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Diff entry row for table display.
#[derive(Tabled)]
struct DiffRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a correlated diff for display.
    #[must_use]
    pub fn format_diff_model(&self, model: &DiffModel) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(model).unwrap_or_default(),
            OutputFormat::Text => Self::format_diff_model_text(model),
        }
    }

    /// Formats a diff as a table followed by the textual diffs.
    fn format_diff_model_text(model: &DiffModel) -> String {
        if model.is_empty() {
            return format!("{} No changes.\n", "✓".green());
        }

        let mut output = String::new();
        let _ = write!(output, "\n📋 Plan summary\n\n");

        let rows: Vec<DiffRow> = CATEGORIES
            .iter()
            .flat_map(|&category| {
                model
                    .entries(category)
                    .iter()
                    .map(move |entry| (category, entry))
            })
            .enumerate()
            .map(|(i, (category, entry))| DiffRow {
                index: i + 1,
                kind: Self::format_category(category),
                address: entry.address.clone(),
                detail: Self::detail(category, entry),
            })
            .collect();

        output.push_str(&Table::new(rows).to_string());
        output.push('\n');

        for category in [DiffCategory::Resource, DiffCategory::Drift, DiffCategory::Output] {
            for entry in model.entries(category) {
                if let Some(diff) = &entry.diff {
                    let _ = write!(
                        output,
                        "\n{} {}\n{diff}\n",
                        format!("[{category}]").dimmed(),
                        entry.address.bold()
                    );
                }
            }
        }

        let _ = write!(output, "\n{model}\n");
        output
    }

    /// Formats the outcome of a `convert` run.
    #[must_use]
    pub fn format_outcome(&self, outcome: &ReportOutcome) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(outcome).unwrap_or_default(),
            OutputFormat::Text => {
                let status = if outcome.errored_stacks == 0 {
                    format!("{} Report written", "✓".green())
                } else {
                    format!("{} Report written with plan errors", "⚠".yellow())
                };

                let mut output = format!("{status}\n\n");
                let _ = writeln!(output, "   Pull: {}#{}", outcome.repo, outcome.pull);
                let _ = writeln!(output, "   Digest: {}", short_digest(&outcome.digest));
                let _ = writeln!(output, "   Stacks: {}", outcome.stacks);
                let _ = writeln!(output, "   Errored: {}", outcome.errored_stacks);
                let _ = writeln!(output, "   Latest: {}", outcome.latest_path.display());
                let _ = writeln!(output, "   Permalink: {}", outcome.permalink_path.display());
                let _ = writeln!(
                    output,
                    "   Comment: {}",
                    if outcome.comment_posted { "posted" } else { "skipped" }
                );
                output
            }
        }
    }

    /// Formats a category with color.
    fn format_category(category: DiffCategory) -> String {
        match category {
            DiffCategory::Resource => "resource".bold().to_string(),
            DiffCategory::Drift => "drift".magenta().to_string(),
            DiffCategory::Output => "output".cyan().to_string(),
            DiffCategory::Move => "move".blue().to_string(),
            DiffCategory::Import => "import".green().to_string(),
        }
    }

    /// Describes an entry in one short cell.
    fn detail(category: DiffCategory, entry: &DiffEntry) -> String {
        match category {
            DiffCategory::Resource if entry.is_replace() => "replace".red().bold().to_string(),
            DiffCategory::Resource => Self::format_actions(&entry.actions),
            DiffCategory::Drift | DiffCategory::Output => String::from("changed"),
            DiffCategory::Move => {
                format!("from {}", entry.previous_address.as_deref().unwrap_or_default())
            }
            DiffCategory::Import => format!("id {}", entry.import_id.as_deref().unwrap_or_default()),
        }
    }

    /// Formats an action list with color.
    fn format_actions(actions: &[Action]) -> String {
        let text = actions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");

        if actions.contains(&Action::Delete) {
            text.red().to_string()
        } else if actions.contains(&Action::Update) {
            text.yellow().to_string()
        } else if actions.contains(&Action::Create) {
            text.green().to_string()
        } else {
            text.dimmed().to_string()
        }
    }
}
