//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Plan UI - Addressable Terraform plan summaries for Atlantis pull requests.
#[derive(Parser, Debug)]
#[command(name = "plan-ui")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the settings file.
    #[arg(short, long, global = true, env = "PLAN_UI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the report of a pull request and post the summary comment.
    Convert {
        /// Repository full name (owner/name).
        #[arg(long)]
        repo: String,

        /// Pull request number.
        #[arg(long)]
        pull: u64,

        /// Skip posting the summary comment.
        #[arg(long)]
        no_comment: bool,
    },

    /// Correlate a single plan and print its diff.
    Show {
        /// Structured plan (`terraform show -json` output).
        plan_json: PathBuf,

        /// Textual plan (`terraform show` output).
        plan_txt: PathBuf,
    },

    /// Serve the viewer and the generated reports.
    Serve {
        /// Listen address, overrides the settings file.
        #[arg(long)]
        address: Option<String>,

        /// Path prefix to serve under, overrides the settings file.
        #[arg(long)]
        path: Option<String>,

        /// Viewer bundle directory, overrides the settings file.
        #[arg(long)]
        ui_dir: Option<PathBuf>,
    },
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}
