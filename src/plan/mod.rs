//! Plan correlation engine.
//!
//! This module reconciles the structured plan (`terraform show -json`) with
//! the textual report (`terraform show`) into a single [`DiffModel`] keyed by
//! resource or output address.

mod address;
mod correlator;
mod model;
mod scanner;
mod structured;

pub use address::{MARKER_LEN, extract_address};
pub use correlator::{DiffCorrelator, MISSING_DIFF_TEXT, MISSING_DRIFT_TEXT, UNKNOWN_IMPORT_ID};
pub use model::{DiffCategory, DiffEntry, DiffModel};
pub use scanner::{DEFAULT_APPLY_MARKER, ScanOptions, ScanState, TextPlanScanner, TextualBodies};
pub use structured::{
    Action, Change, Importing, ResourceChange, ResourceMode, StructuredPlan, StructuredPlanReader,
    SUPPORTED_VERSION_PREFIX,
};

use std::path::Path;

/// Reads both renderings of a plan and correlates them.
///
/// # Errors
///
/// Returns an error if either file cannot be read, the structured plan is
/// malformed, or its schema version is unsupported.
pub fn correlate_files(
    structured_path: impl AsRef<Path>,
    textual_path: impl AsRef<Path>,
    options: &ScanOptions,
) -> crate::error::Result<DiffModel> {
    let plan = StructuredPlanReader::new().read_file(structured_path)?;
    let bodies = TextPlanScanner::with_options(options.clone()).scan_file(textual_path)?;
    Ok(DiffCorrelator::new().correlate(&plan, &bodies))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_correlate_files() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let json = dir.path().join("plan.json");
        let txt = dir.path().join("plan.txt");

        std::fs::write(
            &json,
            r#"{"format_version": "1.2", "resource_changes": [
                {"address": "null_resource.x", "mode": "managed", "change": {"actions": ["create"]}}
            ]}"#,
        )
        .unwrap();
        std::fs::write(
            &txt,
            "  # null_resource.x will be created\n  + resource \"null_resource\" \"x\" {\n      + id = (known after apply)\n    }\n",
        )
        .unwrap();

        let model = correlate_files(&json, &txt, &ScanOptions::default()).unwrap();

        assert_eq!(model.resource_diffs.len(), 1);
        assert!(
            model.resource_diffs[0]
                .diff
                .as_deref()
                .is_some_and(|d| d.ends_with("    }"))
        );
    }

    #[test]
    fn test_correlate_files_missing_text_report() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let json = dir.path().join("plan.json");
        std::fs::write(&json, r#"{"format_version": "1.0"}"#).unwrap();

        let result = correlate_files(&json, dir.path().join("plan.txt"), &ScanOptions::default());
        assert!(result.is_err());
    }
}
