//! Settings types for the plan UI.
//!
//! This module defines the structs that map to the `plan-ui.yaml` file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::plan::{DEFAULT_APPLY_MARKER, ScanOptions};

/// The root settings structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Atlantis server settings.
    pub atlantis: AtlantisSettings,
    /// Directory holding `{repo}/{pull}/{path}/plan.{json,txt}`.
    pub plans_dir: PathBuf,
    /// Directory receiving the generated report files.
    pub output_dir: PathBuf,
    /// Comment posting settings.
    #[serde(default)]
    pub comment: CommentSettings,
    /// Textual report wording.
    #[serde(default)]
    pub scan: ScanSettings,
    /// Static server settings.
    #[serde(default)]
    pub serve: ServeSettings,
    /// Abort the whole pull on the first failing project.
    #[serde(default)]
    pub fail_fast: bool,
    /// Timeout for outgoing HTTP requests, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Atlantis server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AtlantisSettings {
    /// Public URL of the Atlantis server.
    pub url: String,
    /// Name Atlantis answers to in comments (e.g. `atlantis plan`).
    #[serde(default = "default_executable_name")]
    pub executable_name: String,
    /// JSON snapshot of the Atlantis database.
    pub records_path: PathBuf,
}

/// Comment posting settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommentSettings {
    /// Post a summary comment after conversion.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Public URL of the plan viewer.
    #[serde(default)]
    pub ui_url: Option<String>,
    /// Base URL of the GitHub REST API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

/// Textual report wording.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanSettings {
    /// Line prefix closing the outputs section.
    #[serde(default = "default_apply_marker")]
    pub apply_marker: String,
}

/// Static server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServeSettings {
    /// Listen address.
    #[serde(default = "default_address")]
    pub address: String,
    /// Path prefix every route is nested under.
    #[serde(default = "default_serve_path")]
    pub path: String,
    /// Directory holding the viewer bundle, relative to the working directory.
    ///
    /// The bundle is not shipped with the binary; `serve` refuses to start
    /// without it.
    #[serde(default = "default_ui_dir")]
    pub ui_dir: PathBuf,
}

fn default_request_timeout() -> u64 {
    30
}

fn default_executable_name() -> String {
    String::from("atlantis")
}

const fn default_true() -> bool {
    true
}

fn default_api_url() -> String {
    String::from("https://api.github.com")
}

fn default_apply_marker() -> String {
    String::from(DEFAULT_APPLY_MARKER)
}

fn default_address() -> String {
    String::from("0.0.0.0:8080")
}

fn default_serve_path() -> String {
    String::from("/")
}

fn default_ui_dir() -> PathBuf {
    PathBuf::from("ui")
}

impl Default for CommentSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            ui_url: None,
            api_url: default_api_url(),
        }
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            apply_marker: default_apply_marker(),
        }
    }
}

impl Default for ServeSettings {
    fn default() -> Self {
        Self {
            address: default_address(),
            path: default_serve_path(),
            ui_dir: default_ui_dir(),
        }
    }
}

impl ScanSettings {
    /// Returns the scanner options for these settings.
    #[must_use]
    pub fn options(&self) -> ScanOptions {
        ScanOptions {
            apply_marker: self.apply_marker.clone(),
        }
    }
}

impl Settings {
    /// Returns the plan directory of one project of a pull.
    #[must_use]
    pub fn project_plan_dir(&self, repo: &str, pull: u64, project_path: &str) -> PathBuf {
        self.plans_dir
            .join(repo)
            .join(pull.to_string())
            .join(project_path)
    }

    /// Returns true if a comment should be posted.
    #[must_use]
    pub const fn posts_comment(&self) -> bool {
        self.comment.enabled
    }
}
