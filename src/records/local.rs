//! Local JSON snapshot record backend.
//!
//! The snapshot is a JSON object of buckets, each mapping a record key to the
//! record Atlantis stored under it:
//!
//! ```json
//! {
//!   "pulls":    { "github.com::acme/infra::42": { "Projects": [...], "Pull": {...} } },
//!   "runLocks": { "acme/infra/stacks/vpc/default": { "Pull": {...}, "Workspace": "default" } }
//! }
//! ```
//!
//! The file is re-read on every call and never written.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::error::{PlanUiError, RecordError, Result};

use super::store::RecordStore;
use super::types::{ProjectLock, PullStatus};

/// Bucket holding pull statuses.
pub const PULLS_BUCKET: &str = "pulls";

/// Bucket holding project locks.
pub const LOCKS_BUCKET: &str = "runLocks";

type Snapshot = BTreeMap<String, BTreeMap<String, Value>>;

/// Record store reading a JSON snapshot of the Atlantis database.
#[derive(Debug, Clone)]
pub struct JsonRecordStore {
    /// Path to the snapshot file.
    path: PathBuf,
}

impl JsonRecordStore {
    /// Creates a store reading the given snapshot file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the snapshot path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_snapshot(&self) -> Result<Snapshot> {
        if !self.path.exists() {
            return Err(PlanUiError::Record(RecordError::NotFound {
                path: self.path.clone(),
            }));
        }

        debug!("Reading record snapshot: {}", self.path.display());
        let content = fs::read_to_string(&self.path).await?;

        serde_json::from_str(&content)
            .map_err(|e| RecordError::decode("<snapshot>", e.to_string()).into())
    }
}

fn decode<T: DeserializeOwned>(bucket: &str, key: &str, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| RecordError::decode(bucket, format!("{key}: {e}")).into())
}

#[async_trait]
impl RecordStore for JsonRecordStore {
    async fn load_pull(&self, repo: &str, num: u64) -> Result<PullStatus> {
        let mut snapshot = self.read_snapshot().await?;
        let pulls = snapshot.remove(PULLS_BUCKET).ok_or_else(|| {
            PlanUiError::Record(RecordError::MissingBucket {
                bucket: String::from(PULLS_BUCKET),
            })
        })?;

        // Keys carry the VCS host as prefix; matching on the suffix avoids needing it.
        let suffix = format!("::{repo}::{num}");
        let (key, value) = pulls
            .into_iter()
            .rev()
            .find(|(key, _)| key.ends_with(&suffix))
            .ok_or_else(|| {
                PlanUiError::Record(RecordError::PullNotFound {
                    repo: repo.to_string(),
                    num,
                })
            })?;

        let pull: PullStatus = decode(PULLS_BUCKET, &key, value)?;
        info!(
            "Loaded pull {}#{} with {} projects",
            pull.pull.base_repo.full_name,
            pull.pull.num,
            pull.projects.len()
        );
        Ok(pull)
    }

    async fn load_locks(&self) -> Result<HashMap<String, ProjectLock>> {
        let mut snapshot = self.read_snapshot().await?;
        let Some(bucket) = snapshot.remove(LOCKS_BUCKET) else {
            debug!("No {LOCKS_BUCKET} bucket in snapshot, assuming no locks");
            return Ok(HashMap::new());
        };

        let locks = bucket
            .into_iter()
            .map(|(key, value)| {
                let lock: ProjectLock = decode(LOCKS_BUCKET, &key, value)?;
                Ok((key, lock))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        debug!("Loaded {} project locks", locks.len());
        Ok(locks)
    }

    fn backend_type(&self) -> &'static str {
        "json"
    }
}
