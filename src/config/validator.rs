//! Settings validation.
//!
//! Collects every problem in one pass so the user can fix them together; the
//! first error is surfaced as a [`ConfigError::ValidationError`].

use crate::error::{ConfigError, PlanUiError, Result};
use tracing::debug;
use url::Url;

use super::settings::Settings;

/// Validator for plan UI settings.
#[derive(Debug, Default)]
pub struct SettingsValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl SettingsValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates settings.
    ///
    /// # Errors
    ///
    /// Returns the first validation error if any rule fails.
    pub fn validate(&self, settings: &Settings) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        Self::validate_atlantis(settings, &mut result);
        Self::validate_dirs(settings, &mut result);
        Self::validate_comment(settings, &mut result);
        Self::validate_serve(settings, &mut result);
        Self::validate_scan(settings, &mut result);

        if settings.request_timeout_secs == 0 {
            result.errors.push(ValidationError {
                field: String::from("request_timeout_secs"),
                message: String::from("Request timeout must be at least 1 second"),
            });
        }

        if result.errors.is_empty() {
            debug!("Settings validation passed");
            Ok(result)
        } else {
            let first_error = &result.errors[0];
            Err(PlanUiError::Config(ConfigError::validation(
                first_error.message.clone(),
                first_error.field.clone(),
            )))
        }
    }

    fn validate_atlantis(settings: &Settings, result: &mut ValidationResult) {
        let url = &settings.atlantis.url;
        if let Err(e) = Url::parse(url) {
            result.errors.push(ValidationError {
                field: String::from("atlantis.url"),
                message: format!("Atlantis URL '{url}' is invalid: {e}"),
            });
        } else if url.ends_with('/') {
            // Job links on the status page are absolute paths.
            result.warnings.push(String::from(
                "atlantis.url: Trailing '/' produces double slashes in log and lock links",
            ));
        }

        if settings.atlantis.records_path.as_os_str().is_empty() {
            result.errors.push(ValidationError {
                field: String::from("atlantis.records_path"),
                message: String::from("Record snapshot path cannot be empty"),
            });
        }
    }

    fn validate_dirs(settings: &Settings, result: &mut ValidationResult) {
        if settings.plans_dir.as_os_str().is_empty() {
            result.errors.push(ValidationError {
                field: String::from("plans_dir"),
                message: String::from("Plans directory cannot be empty"),
            });
        }

        if settings.output_dir.as_os_str().is_empty() {
            result.errors.push(ValidationError {
                field: String::from("output_dir"),
                message: String::from("Output directory cannot be empty"),
            });
        }
    }

    fn validate_comment(settings: &Settings, result: &mut ValidationResult) {
        if !settings.comment.enabled {
            return;
        }

        match settings.comment.ui_url.as_deref() {
            None | Some("") => result.errors.push(ValidationError {
                field: String::from("comment.ui_url"),
                message: String::from(
                    "Viewer URL is required to post comments; disable comment posting otherwise",
                ),
            }),
            Some(ui_url) => {
                if let Err(e) = Url::parse(ui_url) {
                    result.errors.push(ValidationError {
                        field: String::from("comment.ui_url"),
                        message: format!("Viewer URL '{ui_url}' is invalid: {e}"),
                    });
                }
            }
        }

        if let Err(e) = Url::parse(&settings.comment.api_url) {
            result.errors.push(ValidationError {
                field: String::from("comment.api_url"),
                message: format!("API URL '{}' is invalid: {e}", settings.comment.api_url),
            });
        }
    }

    fn validate_scan(settings: &Settings, result: &mut ValidationResult) {
        // An empty marker would end the outputs section on its first line.
        if settings.scan.apply_marker.trim().is_empty() {
            result.errors.push(ValidationError {
                field: String::from("scan.apply_marker"),
                message: String::from("Apply marker cannot be empty"),
            });
        }
    }

    fn validate_serve(settings: &Settings, result: &mut ValidationResult) {
        if !settings.serve.path.starts_with('/') {
            result.errors.push(ValidationError {
                field: String::from("serve.path"),
                message: format!("Serve path must start with '/': {}", settings.serve.path),
            });
        }
    }
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of warnings.
    #[must_use]
    pub const fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
