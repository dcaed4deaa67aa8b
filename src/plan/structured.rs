//! Reader for the machine-readable plan (`terraform show -json`).
//!
//! Only the parts of the document the correlator needs are modelled; all
//! other fields are ignored during decoding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

use crate::error::{PlanError, Result};

/// Schema version prefix this reader understands.
pub const SUPPORTED_VERSION_PREFIX: &str = "1.";

/// The decoded structured plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StructuredPlan {
    /// Schema version of the document.
    pub format_version: String,
    /// Changes to real infrastructure detected outside of Terraform.
    #[serde(default)]
    pub resource_drift: Vec<ResourceChange>,
    /// Planned resource changes.
    #[serde(default)]
    pub resource_changes: Vec<ResourceChange>,
    /// Planned output changes keyed by output name.
    #[serde(default)]
    pub output_changes: BTreeMap<String, Change>,
    /// When the plan was produced.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A change record for a single resource instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceChange {
    /// Full resource address.
    pub address: String,
    /// Address before a `moved` block took effect.
    #[serde(default)]
    pub previous_address: Option<String>,
    /// Managed resource or data source.
    pub mode: ResourceMode,
    /// The planned change.
    pub change: Change,
}

/// Resource mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResourceMode {
    /// A resource managed by Terraform.
    Managed,
    /// A data source.
    Data,
}

/// A planned change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Change {
    /// Ordered action tokens.
    ///
    /// Valid combinations are `[no-op]`, `[create]`, `[read]`, `[update]`,
    /// `[delete]`, `[forget]`, and the replacements `[delete, create]`,
    /// `[create, delete]` and `[create, forget]`.
    pub actions: Vec<Action>,
    /// Import descriptor, present when the resource is being imported.
    #[serde(default)]
    pub importing: Option<Importing>,
}

/// A single action token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Nothing to do.
    #[serde(rename = "no-op")]
    NoOp,
    /// Create the object.
    Create,
    /// Read a data source.
    Read,
    /// Update in place.
    Update,
    /// Destroy the object.
    Delete,
    /// Remove from state without destroying.
    Forget,
}

/// Import descriptor of a change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Importing {
    /// Import identifier.
    #[serde(default)]
    pub id: String,
    /// True when the identifier is only known after apply.
    #[serde(default)]
    pub unknown: bool,
}

impl Change {
    /// Returns true if the action list is exactly `[no-op]`.
    #[must_use]
    pub fn is_no_op(&self) -> bool {
        self.actions == [Action::NoOp]
    }
}

impl ResourceChange {
    /// Returns true for managed resources.
    #[must_use]
    pub const fn is_managed(&self) -> bool {
        matches!(self.mode, ResourceMode::Managed)
    }

    /// Returns the previous address if the resource was moved.
    #[must_use]
    pub fn moved_from(&self) -> Option<&str> {
        self.previous_address.as_deref().filter(|p| !p.is_empty())
    }
}

/// Reader for structured plan documents.
#[derive(Debug, Default)]
pub struct StructuredPlanReader;

impl StructuredPlanReader {
    /// Creates a new reader.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Reads and validates a structured plan file.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be opened, a decode error if the
    /// content is malformed, or an unsupported-version error.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<StructuredPlan> {
        let path = path.as_ref();
        debug!("Reading structured plan: {}", path.display());

        let file = File::open(path).map_err(|e| PlanError::io(path, e))?;
        self.read_from(BufReader::new(file), &path.display().to_string())
    }

    /// Reads and validates a structured plan from any reader.
    ///
    /// # Errors
    ///
    /// Returns a decode error naming `source_name` or an unsupported-version error.
    pub fn read_from<R: Read>(&self, reader: R, source_name: &str) -> Result<StructuredPlan> {
        let plan: StructuredPlan = serde_json::from_reader(reader)
            .map_err(|e| PlanError::decode(source_name, e.to_string()))?;
        Self::validate(plan, source_name)
    }

    /// Parses and validates a structured plan held in memory.
    ///
    /// # Errors
    ///
    /// Returns a decode error or an unsupported-version error.
    pub fn parse_str(&self, content: &str) -> Result<StructuredPlan> {
        let plan: StructuredPlan = serde_json::from_str(content)
            .map_err(|e| PlanError::decode("<memory>", e.to_string()))?;
        Self::validate(plan, "<memory>")
    }

    fn validate(plan: StructuredPlan, source_name: &str) -> Result<StructuredPlan> {
        if !plan.format_version.starts_with(SUPPORTED_VERSION_PREFIX) {
            return Err(PlanError::UnsupportedVersion {
                version: plan.format_version,
            }
            .into());
        }

        let empty_actions = plan
            .resource_changes
            .iter()
            .chain(&plan.resource_drift)
            .map(|rc| (rc.address.as_str(), &rc.change))
            .chain(plan.output_changes.iter().map(|(k, v)| (k.as_str(), v)))
            .find(|(_, change)| change.actions.is_empty());

        if let Some((address, _)) = empty_actions {
            return Err(PlanError::decode(
                source_name,
                format!("change for {address} has no actions"),
            )
            .into());
        }

        debug!(
            "Structured plan {}: {} changes, {} drifts, {} outputs",
            plan.format_version,
            plan.resource_changes.len(),
            plan.resource_drift.len(),
            plan.output_changes.len()
        );
        Ok(plan)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NoOp => "no-op",
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Forget => "forget",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlanUiError;

    fn plan_with_version(version: &str) -> String {
        format!(r#"{{"format_version": "{version}", "resource_changes": []}}"#)
    }

    #[test]
    fn test_version_gating() {
        let reader = StructuredPlanReader::new();

        assert!(reader.parse_str(&plan_with_version("1.0")).is_ok());
        assert!(reader.parse_str(&plan_with_version("1.2")).is_ok());

        let err = reader.parse_str(&plan_with_version("0.9")).unwrap_err();
        assert!(matches!(
            err,
            PlanUiError::Plan(PlanError::UnsupportedVersion { ref version }) if version == "0.9"
        ));
    }

    #[test]
    fn test_short_version_is_unsupported() {
        let reader = StructuredPlanReader::new();
        let err = reader.parse_str(&plan_with_version("1")).unwrap_err();
        assert!(matches!(
            err,
            PlanUiError::Plan(PlanError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_malformed_json_is_decode_error() {
        let reader = StructuredPlanReader::new();
        let err = reader.parse_str("{not json").unwrap_err();
        assert!(matches!(err, PlanUiError::Plan(PlanError::Decode { .. })));
    }

    #[test]
    fn test_unknown_action_is_decode_error() {
        let reader = StructuredPlanReader::new();
        let doc = r#"{
            "format_version": "1.2",
            "resource_changes": [
                {"address": "a.b", "mode": "managed", "change": {"actions": ["explode"]}}
            ]
        }"#;
        assert!(matches!(
            reader.parse_str(doc),
            Err(PlanUiError::Plan(PlanError::Decode { .. }))
        ));
    }

    #[test]
    fn test_empty_actions_rejected() {
        let reader = StructuredPlanReader::new();
        let doc = r#"{
            "format_version": "1.2",
            "output_changes": {"name": {"actions": []}}
        }"#;
        assert!(matches!(
            reader.parse_str(doc),
            Err(PlanUiError::Plan(PlanError::Decode { .. }))
        ));
    }

    #[test]
    fn test_full_document() {
        let doc = r#"{
            "format_version": "1.2",
            "terraform_version": "1.7.5",
            "timestamp": "2024-03-01T10:00:00Z",
            "resource_drift": [
                {"address": "aws_s3_bucket.logs", "mode": "managed", "type": "aws_s3_bucket",
                 "change": {"actions": ["update"], "before": {}, "after": {}}}
            ],
            "resource_changes": [
                {"address": "aws_vpc.this", "previous_address": "aws_vpc.main", "mode": "managed",
                 "change": {"actions": ["no-op"]}},
                {"address": "aws_iam_role.ci", "mode": "managed",
                 "change": {"actions": ["delete", "create"],
                            "importing": {"id": "ci-role"}}},
                {"address": "data.aws_caller_identity.me", "mode": "data",
                 "change": {"actions": ["read"]}}
            ],
            "output_changes": {
                "vpc_id": {"actions": ["create"], "after_unknown": true}
            }
        }"#;

        let plan = StructuredPlanReader::new().parse_str(doc).unwrap();

        assert_eq!(plan.resource_changes.len(), 3);
        assert_eq!(plan.resource_changes[0].moved_from(), Some("aws_vpc.main"));
        assert!(plan.resource_changes[0].change.is_no_op());
        assert_eq!(
            plan.resource_changes[1].change.actions,
            vec![Action::Delete, Action::Create]
        );
        assert_eq!(
            plan.resource_changes[1].change.importing,
            Some(Importing {
                id: String::from("ci-role"),
                unknown: false
            })
        );
        assert!(!plan.resource_changes[2].is_managed());
        assert_eq!(plan.resource_drift.len(), 1);
        assert_eq!(plan.output_changes["vpc_id"].actions, vec![Action::Create]);
        assert!(plan.timestamp.is_some());
    }

    #[test]
    fn test_read_file_missing() {
        let err = StructuredPlanReader::new()
            .read_file("/nonexistent/plan.json")
            .unwrap_err();
        assert!(matches!(err, PlanUiError::Plan(PlanError::Io { .. })));
    }

    #[test]
    fn test_read_file() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("plan.json");
        std::fs::write(&path, plan_with_version("1.1")).expect("Failed to write plan");

        let plan = StructuredPlanReader::new().read_file(&path).unwrap();
        assert_eq!(plan.format_version, "1.1");
    }
}
