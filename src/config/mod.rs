//! Settings module for the plan UI.
//!
//! This module handles all configuration-related functionality:
//! - Parsing and deserializing `plan-ui.yaml`
//! - Environment and `.env` overrides
//! - Validation of settings values

mod parser;
mod settings;
mod validator;

pub use parser::{DEFAULT_SETTINGS_FILES, GITHUB_TOKEN_VAR, SettingsParser, find_settings_file};
pub use settings::{AtlantisSettings, CommentSettings, ScanSettings, ServeSettings, Settings};
pub use validator::{SettingsValidator, ValidationError, ValidationResult};
