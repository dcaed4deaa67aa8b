//! Record store trait definition.
//!
//! This module defines the common interface for reading Atlantis records.

use async_trait::async_trait;
use std::collections::HashMap;

use super::types::{ProjectLock, PullStatus};
use crate::error::Result;

/// Trait for read-only Atlantis record backends.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Loads the status of a pull request.
    ///
    /// Fails with `RecordError::PullNotFound` if no record matches.
    async fn load_pull(&self, repo: &str, num: u64) -> Result<PullStatus>;

    /// Loads every project lock, keyed by lock id (`{repo}/{path}/{workspace}`).
    async fn load_locks(&self) -> Result<HashMap<String, ProjectLock>>;

    /// Gets the backend type name.
    fn backend_type(&self) -> &'static str;
}

#[async_trait]
impl RecordStore for Box<dyn RecordStore> {
    async fn load_pull(&self, repo: &str, num: u64) -> Result<PullStatus> {
        (**self).load_pull(repo, num).await
    }

    async fn load_locks(&self) -> Result<HashMap<String, ProjectLock>> {
        (**self).load_locks().await
    }

    fn backend_type(&self) -> &'static str {
        (**self).backend_type()
    }
}
