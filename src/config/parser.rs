//! Settings parser for loading and merging configuration files.
//!
//! This module handles loading settings from YAML files and environment
//! variables, with proper precedence and error handling.

use crate::error::{ConfigError, PlanUiError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::settings::Settings;

/// Environment variable holding the VCS token.
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Settings parser.
#[derive(Debug, Default)]
pub struct SettingsParser {
    /// Base path for resolving `.env`.
    base_path: Option<PathBuf>,
}

impl SettingsParser {
    /// Creates a new settings parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Settings> {
        let path = path.as_ref();
        info!("Loading settings from: {}", path.display());

        if !path.exists() {
            return Err(PlanUiError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            PlanUiError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses settings from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<Settings> {
        debug!("Parsing YAML settings");

        let settings: Settings = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            PlanUiError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })?;

        debug!("Parsed settings for Atlantis at {}", settings.atlantis.url);
        Ok(settings)
    }

    /// Loads settings with environment variable overrides.
    ///
    /// Variables use the `PLAN_UI_<KEY>` format (e.g. `PLAN_UI_PLANS_DIR`).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_with_env(&self, path: impl AsRef<Path>) -> Result<Settings> {
        let mut settings = self.load_file(path)?;
        Self::apply_env_overrides(&mut settings);
        Ok(settings)
    }

    /// Applies environment variable overrides to the settings.
    pub fn apply_env_overrides(settings: &mut Settings) {
        if let Ok(url) = std::env::var("PLAN_UI_ATLANTIS_URL") {
            debug!("Overriding atlantis.url from environment");
            settings.atlantis.url = url;
        }

        if let Ok(path) = std::env::var("PLAN_UI_RECORDS_PATH") {
            debug!("Overriding atlantis.records_path from environment");
            settings.atlantis.records_path = PathBuf::from(path);
        }

        if let Ok(dir) = std::env::var("PLAN_UI_PLANS_DIR") {
            debug!("Overriding plans_dir from environment");
            settings.plans_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("PLAN_UI_OUTPUT_DIR") {
            debug!("Overriding output_dir from environment");
            settings.output_dir = PathBuf::from(dir);
        }

        if let Ok(url) = std::env::var("PLAN_UI_UI_URL") {
            debug!("Overriding comment.ui_url from environment");
            settings.comment.ui_url = Some(url);
        }

        if let Ok(value) = std::env::var("PLAN_UI_FAIL_FAST") {
            debug!("Overriding fail_fast from environment");
            settings.fail_fast = matches!(value.as_str(), "1" | "true" | "yes");
        }
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                PlanUiError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }

    /// Gets the GitHub token from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not set.
    pub fn github_token() -> Result<String> {
        std::env::var(GITHUB_TOKEN_VAR).map_err(|_| {
            PlanUiError::Config(ConfigError::MissingEnvVar {
                name: String::from(GITHUB_TOKEN_VAR),
            })
        })
    }
}

/// Default settings file names to search for.
pub const DEFAULT_SETTINGS_FILES: &[&str] = &["plan-ui.yaml", "plan-ui.yml"];

/// Finds the settings file in the given directory, its parents, or the user
/// config directory.
///
/// # Errors
///
/// Returns an error if no settings file is found.
pub fn find_settings_file(start_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let start = start_dir.as_ref();
    let mut current = start.to_path_buf();

    loop {
        if let Some(found) = find_in(&current) {
            return Ok(found);
        }
        if !current.pop() {
            break;
        }
    }

    if let Some(found) = dirs::config_dir().and_then(|dir| find_in(&dir.join("plan-ui"))) {
        return Ok(found);
    }

    Err(PlanUiError::Config(ConfigError::FileNotFound {
        path: start.join(DEFAULT_SETTINGS_FILES[0]),
    }))
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    DEFAULT_SETTINGS_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
        .inspect(|path| info!("Found settings file: {}", path.display()))
}
