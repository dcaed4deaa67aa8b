//! The report document consumed by the plan viewer.

use serde::{Deserialize, Serialize};

use crate::plan::DiffModel;

/// Report for one pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiData {
    /// Name Atlantis answers to in comments.
    pub executable_name: String,
    /// Repository full name.
    pub pr_repo: String,
    /// Pull request number.
    pub pr_num: u64,
    /// Web URL of the pull request.
    pub pr_url: String,
    /// One entry per Atlantis project, in record order.
    pub stacks: Vec<UiStack>,
}

/// Report entry for one Atlantis project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiStack {
    /// Project name, possibly empty.
    pub name: String,
    /// Project directory relative to the repository root.
    pub path: String,
    /// The plan failed or was refused because of a lock.
    pub plan_error: bool,
    /// Job log URL, empty when the status page had no row for the project.
    pub log_url: String,
    /// Link to release the lock held by another pull.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_url: Option<String>,
    /// URL of the pull holding the lock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_pr_url: Option<String>,
    /// Author of the pull holding the lock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_pr_author: Option<String>,
    /// Why the plan files of this project could not be converted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_error: Option<String>,
    /// Categorized diff.
    #[serde(flatten)]
    pub diffs: DiffModel,
}

impl UiStack {
    /// Returns true if the project is blocked by another pull's lock.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.lock_url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Action, DiffEntry};

    #[test]
    fn test_stack_flattens_diffs() {
        let stack = UiStack {
            name: String::from("vpc"),
            path: String::from("stacks/vpc"),
            diffs: DiffModel {
                resource_diffs: vec![DiffEntry::resource("a.b", vec![Action::Create], "+")],
                ..DiffModel::default()
            },
            ..UiStack::default()
        };

        let json = serde_json::to_value(&stack).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "name": "vpc",
                "path": "stacks/vpc",
                "plan_error": false,
                "log_url": "",
                "resource_diffs": [{"address": "a.b", "actions": ["create"], "diff": "+"}]
            })
        );
    }

    #[test]
    fn test_locked_stack_round_trips() {
        let stack = UiStack {
            plan_error: true,
            lock_url: Some(String::from("http://a/lock?id=x")),
            lock_pr_author: Some(String::from("bob")),
            ..UiStack::default()
        };

        let json = serde_json::to_string(&stack).unwrap();
        let back: UiStack = serde_json::from_str(&json).unwrap();

        assert!(back.is_locked());
        assert_eq!(back, stack);
    }
}
