//! Atlantis record access.
//!
//! This module provides read-only access to the pull-status and lock records
//! Atlantis keeps in its database.

mod local;
mod store;
mod types;

pub use local::{JsonRecordStore, LOCKS_BUCKET, PULLS_BUCKET};
pub use store::RecordStore;
pub use types::{LockUser, PlanStatus, ProjectLock, ProjectStatus, PullRequest, PullStatus, Repo};
