//! Report files and their content digest.
//!
//! Every report is written twice with identical bytes: `{pull}.json` always
//! holds the latest report, `{pull}_{digest}.json` is a permanent copy the
//! comment links to.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{PublishError, Result};

use super::ui::UiData;

/// Length of the digest prefix shown to users.
const SHORT_DIGEST_LEN: usize = 8;

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn content_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// First characters of a digest, for display.
#[must_use]
pub fn short_digest(digest: &str) -> &str {
    digest.get(..SHORT_DIGEST_LEN).unwrap_or(digest)
}

/// Paths and digest of a written report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenReport {
    /// Digest of the report bytes.
    pub digest: String,
    /// `{output_dir}/{pull}.json`.
    pub latest_path: PathBuf,
    /// `{output_dir}/{pull}_{digest}.json`.
    pub permalink_path: PathBuf,
}

/// Writes reports into the output directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    /// Output directory.
    output_dir: PathBuf,
}

impl ReportWriter {
    /// Creates a writer for the given directory.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Serializes and writes the report of pull `pull`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any file operation fails.
    pub async fn write(&self, pull: u64, data: &UiData) -> Result<WrittenReport> {
        let bytes = serde_json::to_vec(data).map_err(|e| PublishError::WriteFailed {
            path: self.output_dir.clone(),
            message: format!("Failed to serialize report: {e}"),
        })?;
        let digest = content_digest(&bytes);

        debug!("Ensuring output directory: {}", self.output_dir.display());
        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| write_failed(&self.output_dir, &e))?;

        let latest_path = self.output_dir.join(format!("{pull}.json"));
        let permalink_path = self.output_dir.join(format!("{pull}_{digest}.json"));

        write_atomic(&latest_path, &bytes).await?;
        write_atomic(&permalink_path, &bytes).await?;

        info!(
            "Wrote report for #{pull} ({} bytes, digest {})",
            bytes.len(),
            short_digest(&digest)
        );

        Ok(WrittenReport {
            digest,
            latest_path,
            permalink_path,
        })
    }
}

fn write_failed(path: &Path, e: &std::io::Error) -> PublishError {
    PublishError::WriteFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Writes to a temporary sibling, then renames over the target.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("tmp");

    let mut file = fs::File::create(&temp_path)
        .await
        .map_err(|e| write_failed(&temp_path, &e))?;
    file.write_all(bytes)
        .await
        .map_err(|e| write_failed(&temp_path, &e))?;
    file.sync_all()
        .await
        .map_err(|e| write_failed(&temp_path, &e))?;

    fs::rename(&temp_path, path)
        .await
        .map_err(|e| write_failed(path, &e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::UiStack;
    use tempfile::TempDir;

    fn sample() -> UiData {
        UiData {
            executable_name: String::from("atlantis"),
            pr_repo: String::from("acme/infra"),
            pr_num: 42,
            pr_url: String::from("https://github.com/acme/infra/pull/42"),
            stacks: vec![UiStack {
                name: String::from("vpc"),
                path: String::from("stacks/vpc"),
                ..UiStack::default()
            }],
        }
    }

    #[test]
    fn test_content_digest() {
        assert_eq!(
            content_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(short_digest("abcdef1234567890"), "abcdef12");
        assert_eq!(short_digest("abc"), "abc");
    }

    #[tokio::test]
    async fn test_write_report() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let writer = ReportWriter::new(temp.path().join("plans"));

        let written = writer.write(42, &sample()).await.expect("Failed to write report");

        let latest = std::fs::read(&written.latest_path).unwrap();
        let permalink = std::fs::read(&written.permalink_path).unwrap();
        assert_eq!(latest, permalink);
        assert_eq!(content_digest(&latest), written.digest);
        assert_eq!(written.latest_path, temp.path().join("plans/42.json"));
        assert_eq!(
            written.permalink_path,
            temp.path().join(format!("plans/42_{}.json", written.digest))
        );

        let back: UiData = serde_json::from_slice(&latest).unwrap();
        assert_eq!(back, sample());
    }

    #[tokio::test]
    async fn test_write_into_nested_missing_dir() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let writer = ReportWriter::new(temp.path().join("a/b/c"));

        let written = writer.write(7, &sample()).await.unwrap();
        assert!(written.latest_path.exists());
        assert!(!temp.path().join("a/b/c/7.tmp").exists());
    }

    #[tokio::test]
    async fn test_same_report_same_digest() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let writer = ReportWriter::new(temp.path());

        let first = writer.write(1, &sample()).await.unwrap();
        let second = writer.write(1, &sample()).await.unwrap();
        assert_eq!(first.digest, second.digest);

        let mut changed = sample();
        changed.stacks[0].plan_error = true;
        let third = writer.write(1, &changed).await.unwrap();
        assert_ne!(first.digest, third.digest);
    }
}
