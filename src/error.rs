//! Error types for the plan UI.
//!
//! The hierarchy mirrors the lifecycle of a pull-request conversion:
//! configuration, record store access, plan parsing, and publishing the
//! result back to the VCS.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the plan UI.
#[derive(Debug, Error)]
pub enum PlanUiError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Plan parsing errors.
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// Record store errors.
    #[error("Record store error: {0}")]
    Record(#[from] RecordError),

    /// Publishing errors (status page, comments, report files).
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file was not found.
    #[error("Settings file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The settings file could not be parsed.
    #[error("Failed to parse settings: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Settings validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// Environment variable is missing.
    #[error("Missing environment variable: {name}")]
    MissingEnvVar {
        /// Name of the missing variable.
        name: String,
    },
}

/// Errors raised while reading plan artifacts.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The structured plan uses a schema version this tool does not understand.
    #[error("Unsupported plan format version: {version}")]
    UnsupportedVersion {
        /// The offending `format_version` value.
        version: String,
    },

    /// The structured plan could not be decoded.
    #[error("Failed to decode plan {source_name}: {message}")]
    Decode {
        /// File or label of the failing source.
        source_name: String,
        /// Decoder message.
        message: String,
    },

    /// A plan file could not be opened or read.
    #[error("Failed to read plan file {path}: {source}")]
    Io {
        /// Path of the plan file.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// Record store errors.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The record snapshot file was not found.
    #[error("Record snapshot not found: {path}")]
    NotFound {
        /// Path to the missing snapshot.
        path: PathBuf,
    },

    /// The snapshot or one of its records is malformed.
    #[error("Failed to decode {bucket} record: {message}")]
    Decode {
        /// Bucket holding the bad record.
        bucket: String,
        /// Decoder message.
        message: String,
    },

    /// A bucket is missing from the snapshot.
    #[error("Bucket not found in record snapshot: {bucket}")]
    MissingBucket {
        /// Name of the missing bucket.
        bucket: String,
    },

    /// No pull matches the requested repository and number.
    #[error("Pull {repo}#{num} not found")]
    PullNotFound {
        /// Repository full name.
        repo: String,
        /// Pull request number.
        num: u64,
    },
}

/// Errors raised while publishing a report.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The VCS rejected our credentials.
    #[error("VCS authentication failed: {message}")]
    AuthenticationFailed {
        /// Description of the auth failure.
        message: String,
    },

    /// An HTTP request returned a non-success status.
    #[error("Request failed: {status} - {message}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// Rate limited by the VCS.
    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Transport failure.
    #[error("Network error: {message}")]
    NetworkError {
        /// Description of the network error.
        message: String,
    },

    /// The report could not be serialized or written.
    #[error("Failed to write report {path}: {message}")]
    WriteFailed {
        /// Target path.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },
}

/// Result type alias for plan UI operations.
pub type Result<T> = std::result::Result<T, PlanUiError>;

impl PlanUiError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Publish(PublishError::RateLimited { .. } | PublishError::NetworkError { .. })
        )
    }

    /// Returns the delay the server asked for before retrying, if any.
    #[must_use]
    pub const fn retry_delay_secs(&self) -> Option<u64> {
        match self {
            Self::Publish(PublishError::RateLimited { retry_after_secs }) => {
                Some(*retry_after_secs)
            }
            _ => None,
        }
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl PlanError {
    /// Creates a decode error for the named source.
    #[must_use]
    pub fn decode(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Wraps an IO error with the path that produced it.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl RecordError {
    /// Creates a decode error for a bucket.
    #[must_use]
    pub fn decode(bucket: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            bucket: bucket.into(),
            message: message.into(),
        }
    }
}

impl PublishError {
    /// Creates a request error.
    #[must_use]
    pub fn request(status: u16, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            message: message.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_version_display() {
        let err = PlanUiError::from(PlanError::UnsupportedVersion {
            version: String::from("0.9"),
        });
        assert_eq!(
            err.to_string(),
            "Plan error: Unsupported plan format version: 0.9"
        );
    }

    #[test]
    fn test_plan_io_error_names_path() {
        let err = PlanError::io(
            "/plans/acme/infra/7/vpc/plan.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("/plans/acme/infra/7/vpc/plan.json"));
    }

    #[test]
    fn test_retryable() {
        assert!(PlanUiError::from(PublishError::network("reset")).is_retryable());
        assert!(!PlanUiError::internal("boom").is_retryable());
        assert_eq!(
            PlanUiError::from(PublishError::RateLimited {
                retry_after_secs: 30
            })
            .retry_delay_secs(),
            Some(30)
        );
    }
}
