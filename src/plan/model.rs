//! The categorized diff model produced by the correlator.
//!
//! Each [`DiffEntry`] belongs to exactly one category and only carries the
//! fields that category uses. The constructors below are the only intended
//! way to build entries; empty fields are omitted from the JSON encoding.

use serde::{Deserialize, Serialize};

use super::structured::Action;

/// A single entry of the diff model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEntry {
    /// Resource address or output name.
    pub address: String,
    /// Planned actions (resource diffs only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
    /// Textual diff (resource, output and drift diffs only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
    /// Address before the move (moves only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_address: Option<String>,
    /// Import identifier (imports only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_id: Option<String>,
}

/// Category of a [`DiffEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffCategory {
    /// Planned resource change.
    Resource,
    /// Drift of a resource that is also changed by the plan.
    Drift,
    /// Output value change.
    Output,
    /// Resource moved to a new address.
    Move,
    /// Resource being imported.
    Import,
}

/// The categorized diff of one plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffModel {
    /// Planned resource changes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_diffs: Vec<DiffEntry>,
    /// Output changes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_diffs: Vec<DiffEntry>,
    /// Drift of changed resources.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drift_diffs: Vec<DiffEntry>,
    /// Moved resources.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub moves: Vec<DiffEntry>,
    /// Imported resources.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<DiffEntry>,
}

impl DiffEntry {
    /// Creates a resource diff entry.
    #[must_use]
    pub fn resource(address: impl Into<String>, actions: Vec<Action>, diff: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            actions,
            diff: Some(diff.into()),
            previous_address: None,
            import_id: None,
        }
    }

    /// Creates a drift diff entry.
    #[must_use]
    pub fn drift(address: impl Into<String>, diff: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            actions: Vec::new(),
            diff: Some(diff.into()),
            previous_address: None,
            import_id: None,
        }
    }

    /// Creates an output diff entry.
    #[must_use]
    pub fn output(name: impl Into<String>, diff: impl Into<String>) -> Self {
        Self::drift(name, diff)
    }

    /// Creates a move entry.
    #[must_use]
    pub fn moved(address: impl Into<String>, previous_address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            actions: Vec::new(),
            diff: None,
            previous_address: Some(previous_address.into()),
            import_id: None,
        }
    }

    /// Creates an import entry.
    #[must_use]
    pub fn import(address: impl Into<String>, import_id: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            actions: Vec::new(),
            diff: None,
            previous_address: None,
            import_id: Some(import_id.into()),
        }
    }

    /// Returns true if the actions destroy and recreate the object, in either order.
    #[must_use]
    pub fn is_replace(&self) -> bool {
        matches!(
            self.actions.as_slice(),
            [Action::Delete, Action::Create]
                | [Action::Create, Action::Delete]
                | [Action::Create, Action::Forget]
        )
    }

    /// Returns true if any of the entry's actions equals `action`.
    #[must_use]
    pub fn has_action(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }
}

impl DiffModel {
    /// Returns true if the model has no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resource_diffs.is_empty()
            && self.output_diffs.is_empty()
            && self.drift_diffs.is_empty()
            && self.moves.is_empty()
            && self.imports.is_empty()
    }

    /// Returns true if any resource diff contains `action`.
    #[must_use]
    pub fn has_resource_action(&self, action: Action) -> bool {
        self.resource_diffs.iter().any(|d| d.has_action(action))
    }

    /// Returns the entries of one category.
    #[must_use]
    pub fn entries(&self, category: DiffCategory) -> &[DiffEntry] {
        match category {
            DiffCategory::Resource => &self.resource_diffs,
            DiffCategory::Drift => &self.drift_diffs,
            DiffCategory::Output => &self.output_diffs,
            DiffCategory::Move => &self.moves,
            DiffCategory::Import => &self.imports,
        }
    }
}

impl std::fmt::Display for DiffCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Resource => "resource",
            Self::Drift => "drift",
            Self::Output => "output",
            Self::Move => "move",
            Self::Import => "import",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for DiffModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "No changes");
        }

        write!(
            f,
            "{} resource changes, {} output changes, {} drifts, {} moves, {} imports",
            self.resource_diffs.len(),
            self.output_diffs.len(),
            self.drift_diffs.len(),
            self.moves.len(),
            self.imports.len()
        )
    }
}
