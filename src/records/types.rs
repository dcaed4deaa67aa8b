//! Atlantis record types.
//!
//! These mirror the records Atlantis persists for pull requests and project
//! locks. Atlantis encodes them without field tags, so JSON keys are
//! PascalCase. Fields this tool does not read are ignored on decode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of every project planned in a pull request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PullStatus {
    /// Projects touched by the pull, in plan order.
    #[serde(default)]
    pub projects: Vec<ProjectStatus>,
    /// The pull request itself.
    pub pull: PullRequest,
}

/// Plan status of a single project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectStatus {
    /// Terraform workspace.
    #[serde(default)]
    pub workspace: String,
    /// Project directory relative to the repository root.
    #[serde(default)]
    pub repo_rel_dir: String,
    /// Project name from `atlantis.yaml`, possibly empty.
    #[serde(default)]
    pub project_name: String,
    /// Latest plan status.
    #[serde(default)]
    pub status: PlanStatus,
}

/// A pull request as recorded by Atlantis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct PullRequest {
    /// Pull request number.
    pub num: u64,
    /// Web URL of the pull request.
    #[serde(rename = "URL", default)]
    pub url: String,
    /// Login of the author.
    #[serde(default)]
    pub author: String,
    /// Head commit SHA.
    #[serde(default)]
    pub head_commit: String,
    /// Repository the pull targets.
    #[serde(default)]
    pub base_repo: Repo,
}

/// A VCS repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct Repo {
    /// `owner/name`.
    #[serde(default)]
    pub full_name: String,
    /// Owner login.
    #[serde(default)]
    pub owner: String,
    /// Repository name.
    #[serde(default)]
    pub name: String,
}

/// A lock held on a project directory and workspace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectLock {
    /// Pull request holding the lock.
    pub pull: PullRequest,
    /// User who triggered the locking plan.
    #[serde(default)]
    pub user: LockUser,
    /// Locked workspace.
    #[serde(default)]
    pub workspace: String,
    /// When the lock was taken.
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
}

/// User recorded on a lock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct LockUser {
    /// VCS login.
    #[serde(default)]
    pub username: String,
}

/// Plan status codes as stored by Atlantis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(from = "u8", into = "u8")]
pub enum PlanStatus {
    /// Plan failed, including plans refused because of a lock.
    #[default]
    Errored,
    /// Plan succeeded with changes.
    Planned,
    /// Plan was applied.
    Applied,
    /// Apply failed.
    ErroredApply,
    /// Plan was discarded.
    Discarded,
    /// Plan succeeded without changes.
    PlannedNoChanges,
    /// Policy check failed.
    ErroredPolicyCheck,
    /// Policy check passed.
    PassedPolicyCheck,
    /// A code this tool does not know about.
    Unknown(u8),
}

impl From<u8> for PlanStatus {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::Errored,
            1 => Self::Planned,
            2 => Self::Applied,
            3 => Self::ErroredApply,
            4 => Self::Discarded,
            5 => Self::PlannedNoChanges,
            6 => Self::ErroredPolicyCheck,
            7 => Self::PassedPolicyCheck,
            other => Self::Unknown(other),
        }
    }
}

impl From<PlanStatus> for u8 {
    fn from(status: PlanStatus) -> Self {
        match status {
            PlanStatus::Errored => 0,
            PlanStatus::Planned => 1,
            PlanStatus::Applied => 2,
            PlanStatus::ErroredApply => 3,
            PlanStatus::Discarded => 4,
            PlanStatus::PlannedNoChanges => 5,
            PlanStatus::ErroredPolicyCheck => 6,
            PlanStatus::PassedPolicyCheck => 7,
            PlanStatus::Unknown(code) => code,
        }
    }
}

impl PlanStatus {
    /// Returns true for statuses whose plan files are expected to be current.
    #[must_use]
    pub const fn is_planned(self) -> bool {
        matches!(self, Self::Planned | Self::PlannedNoChanges)
    }
}

impl std::fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Errored => write!(f, "errored"),
            Self::Planned => write!(f, "planned"),
            Self::Applied => write!(f, "applied"),
            Self::ErroredApply => write!(f, "apply_errored"),
            Self::Discarded => write!(f, "plan_discarded"),
            Self::PlannedNoChanges => write!(f, "planned_no_changes"),
            Self::ErroredPolicyCheck => write!(f, "policy_check_errored"),
            Self::PassedPolicyCheck => write!(f, "policy_check_passed"),
            Self::Unknown(code) => write!(f, "unknown({code})"),
        }
    }
}

impl PullRequest {
    /// Returns true if both records refer to the same pull request.
    #[must_use]
    pub fn same_pull(&self, other: &Self) -> bool {
        self.num == other.num && self.base_repo.full_name == other.base_repo.full_name
    }
}

impl ProjectStatus {
    /// Id of the lock guarding this project within `repo`.
    #[must_use]
    pub fn lock_id(&self, repo: &str) -> String {
        format!("{repo}/{}/{}", self.repo_rel_dir, self.workspace)
    }

    /// Key of this project's job row on the Atlantis status page.
    #[must_use]
    pub fn log_key(&self, pull: &PullRequest) -> String {
        format!(
            "{} #{} {} {}",
            pull.base_repo.full_name, pull.num, self.repo_rel_dir, self.workspace
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_pull_status() {
        let json = r#"{
            "Projects": [
                {"Workspace": "default", "RepoRelDir": "stacks/vpc", "ProjectName": "vpc",
                 "PolicyStatus": null, "Status": 1},
                {"Workspace": "prod", "RepoRelDir": "stacks/db", "ProjectName": "", "Status": 42}
            ],
            "Pull": {
                "Num": 42, "HeadCommit": "abc", "URL": "https://github.com/acme/infra/pull/42",
                "HeadBranch": "feature", "BaseBranch": "main", "Author": "alice", "State": 0,
                "BaseRepo": {"FullName": "acme/infra", "Owner": "acme", "Name": "infra",
                             "CloneURL": "", "SanitizedCloneURL": "", "VCSHost": {"Hostname": "github.com", "Type": 0}}
            }
        }"#;

        let status: PullStatus = serde_json::from_str(json).unwrap();

        assert_eq!(status.pull.num, 42);
        assert_eq!(status.pull.url, "https://github.com/acme/infra/pull/42");
        assert_eq!(status.pull.base_repo.full_name, "acme/infra");
        assert_eq!(status.projects[0].status, PlanStatus::Planned);
        assert_eq!(status.projects[1].status, PlanStatus::Unknown(42));
        assert_eq!(status.projects[0].lock_id("acme/infra"), "acme/infra/stacks/vpc/default");
        assert_eq!(
            status.projects[1].log_key(&status.pull),
            "acme/infra #42 stacks/db prod"
        );
    }

    #[test]
    fn test_plan_status_codes() {
        assert_eq!(PlanStatus::from(0), PlanStatus::Errored);
        assert_eq!(PlanStatus::from(5), PlanStatus::PlannedNoChanges);
        assert_eq!(u8::from(PlanStatus::Unknown(9)), 9);
        assert!(PlanStatus::PlannedNoChanges.is_planned());
        assert!(!PlanStatus::Applied.is_planned());
        assert_eq!(serde_json::to_string(&PlanStatus::Discarded).unwrap(), "4");
    }

    #[test]
    fn test_same_pull() {
        let mut a = PullRequest {
            num: 1,
            ..PullRequest::default()
        };
        a.base_repo.full_name = String::from("acme/infra");
        let mut b = a.clone();
        assert!(a.same_pull(&b));

        b.num = 2;
        assert!(!a.same_pull(&b));
    }
}
