//! Correlation of structured change records with textual diff bodies.
//!
//! The structured plan decides *what* is shown; the textual report only
//! supplies the human-readable body for each address.

use std::collections::HashSet;
use tracing::debug;

use super::model::{DiffEntry, DiffModel};
use super::scanner::TextualBodies;
use super::structured::StructuredPlan;

/// Body used when a changed resource or output has no textual diff.
pub const MISSING_DIFF_TEXT: &str =
    "No textual diff available, please file an issue. You can check full stack log in the meantime.";

/// Body used when a drift record has no textual diff.
pub const MISSING_DRIFT_TEXT: &str =
    "No textual diff available for this drift. Most likely terraform did not include it in the plan.";

/// Import identifier shown when the id is only known after apply.
pub const UNKNOWN_IMPORT_ID: &str = "(unknown)";

/// Engine joining a [`StructuredPlan`] with [`TextualBodies`].
#[derive(Debug, Default)]
pub struct DiffCorrelator;

impl DiffCorrelator {
    /// Creates a new correlator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds the diff model for one plan.
    #[must_use]
    pub fn correlate(&self, plan: &StructuredPlan, bodies: &TextualBodies) -> DiffModel {
        let mut model = DiffModel::default();
        let mut changed: HashSet<&str> = HashSet::new();

        for resource in plan.resource_changes.iter().filter(|r| r.is_managed()) {
            if let Some(previous) = resource.moved_from() {
                model.moves.push(DiffEntry::moved(&resource.address, previous));
            }

            let change = &resource.change;
            if !change.is_no_op() {
                changed.insert(resource.address.as_str());
                let diff = lookup(&bodies.diffs, &resource.address).unwrap_or(MISSING_DIFF_TEXT);
                model.resource_diffs.push(DiffEntry::resource(
                    &resource.address,
                    change.actions.clone(),
                    diff,
                ));
            }

            if let Some(importing) = &change.importing {
                let id = if importing.unknown {
                    UNKNOWN_IMPORT_ID
                } else {
                    importing.id.as_str()
                };
                model.imports.push(DiffEntry::import(&resource.address, id));
            }
        }

        // Terraform only reports drift for objects the plan also changes.
        for drift in &plan.resource_drift {
            if !changed.contains(drift.address.as_str()) {
                continue;
            }
            let diff = lookup(&bodies.drifts, &drift.address).unwrap_or(MISSING_DRIFT_TEXT);
            model.drift_diffs.push(DiffEntry::drift(&drift.address, diff));
        }

        for (name, change) in &plan.output_changes {
            if change.is_no_op() {
                continue;
            }
            let diff = lookup(&bodies.outputs, name).unwrap_or(MISSING_DIFF_TEXT);
            model.output_diffs.push(DiffEntry::output(name, diff));
        }

        debug!("Correlated plan: {model}");
        model
    }
}

fn lookup<'a>(
    bodies: &'a std::collections::HashMap<String, String>,
    address: &str,
) -> Option<&'a str> {
    bodies
        .get(address)
        .map(String::as_str)
        .filter(|body| !body.is_empty())
}
