//! End-to-end report pipeline for one pull request.
//!
//! Loads the pull and lock records, crawls job log links, converts every
//! project, writes the report files and finally posts the summary comment.

use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::{ConfigError, PlanUiError, Result};
use crate::publish::{CommentPoster, LogUrlCrawler};
use crate::records::RecordStore;
use crate::report::{PullConverter, ReportWriter, render_comment, short_digest};

/// Runs the report pipeline.
pub struct PullReporter<'a, S: RecordStore> {
    /// Settings.
    settings: &'a Settings,
    /// Record store.
    store: &'a S,
    /// Status page crawler.
    crawler: &'a LogUrlCrawler,
    /// Comment poster; no comment is posted without one.
    poster: Option<&'a dyn CommentPoster>,
    /// Report writer.
    writer: ReportWriter,
}

/// Result of a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutcome {
    /// Repository full name.
    pub repo: String,
    /// Pull request number.
    pub pull: u64,
    /// Digest of the written report.
    pub digest: String,
    /// Path of the latest report.
    pub latest_path: PathBuf,
    /// Path of the permanent copy.
    pub permalink_path: PathBuf,
    /// Number of stacks in the report.
    pub stacks: usize,
    /// Number of stacks with `plan_error` set.
    pub errored_stacks: usize,
    /// Whether the summary comment was posted.
    pub comment_posted: bool,
}

impl<'a, S: RecordStore> PullReporter<'a, S> {
    /// Creates a reporter that does not post comments.
    #[must_use]
    pub fn new(settings: &'a Settings, store: &'a S, crawler: &'a LogUrlCrawler) -> Self {
        Self {
            settings,
            store,
            crawler,
            poster: None,
            writer: ReportWriter::new(&settings.output_dir),
        }
    }

    /// Posts the summary comment through `poster` after writing the report.
    #[must_use]
    pub fn with_poster(mut self, poster: &'a dyn CommentPoster) -> Self {
        self.poster = Some(poster);
        self
    }

    /// Runs the pipeline for pull `pull` of `repo`.
    ///
    /// # Errors
    ///
    /// Returns an error if the records cannot be loaded, a project fails while
    /// `fail_fast` is set, the report cannot be written, or the comment cannot
    /// be posted.
    pub async fn run(&self, repo: &str, pull: u64) -> Result<ReportOutcome> {
        info!("Building report for {repo}#{pull}");

        let status = self.store.load_pull(repo, pull).await?;
        let locks = self.store.load_locks().await?;

        // Log links are cosmetic; a down status page must not block the report.
        let log_urls = match self.crawler.crawl().await {
            Ok(urls) => urls,
            Err(e) => {
                warn!("Failed to crawl job log links: {e}");
                HashMap::new()
            }
        };

        // Plan files are read with blocking IO.
        let settings = self.settings.clone();
        let data = tokio::task::spawn_blocking(move || {
            PullConverter::new(&settings).convert(&status, &locks, &log_urls)
        })
        .await
        .map_err(|e| PlanUiError::internal(format!("Conversion task failed: {e}")))??;
        let written = self.writer.write(pull, &data).await?;

        let mut comment_posted = false;
        if let Some(poster) = self.poster {
            let ui_url = self.settings.comment.ui_url.as_deref().ok_or_else(|| {
                PlanUiError::Config(ConfigError::validation(
                    "Viewer URL is required to post comments",
                    "comment.ui_url",
                ))
            })?;

            let body = render_comment(&data, ui_url, &written.digest);
            poster.post_comment(&data.pr_repo, pull, &body).await?;
            comment_posted = true;
        } else {
            info!("Skipping comment posting");
        }

        let outcome = ReportOutcome {
            repo: data.pr_repo.clone(),
            pull,
            stacks: data.stacks.len(),
            errored_stacks: data.stacks.iter().filter(|s| s.plan_error).count(),
            digest: written.digest,
            latest_path: written.latest_path,
            permalink_path: written.permalink_path,
            comment_posted,
        };
        info!("{outcome}");
        Ok(outcome)
    }
}

impl std::fmt::Display for ReportOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Report {}#{} ({}): {} stacks, {} errored, comment {}",
            self.repo,
            self.pull,
            short_digest(&self.digest),
            self.stacks,
            self.errored_stacks,
            if self.comment_posted { "posted" } else { "skipped" }
        )
    }
}
