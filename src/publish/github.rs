//! Pull request comments.
//!
//! [`CommentPoster`] is the seam the pipeline talks to; the GitHub REST
//! implementation is the only production backend.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, trace};

use crate::error::{PlanUiError, PublishError, Result};

/// Maximum number of attempts for transient failures.
const MAX_RETRIES: u32 = 3;

/// Delay between retries in milliseconds.
const RETRY_DELAY_MS: u64 = 1000;

/// User agent sent with every request; GitHub rejects requests without one.
const USER_AGENT: &str = concat!("atlantis-plan-ui/", env!("CARGO_PKG_VERSION"));

/// Posts a comment on a pull request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentPoster: Send + Sync {
    /// Posts `body` as a new comment on pull `pull` of `repo` (`owner/name`).
    async fn post_comment(&self, repo: &str, pull: u64, body: &str) -> Result<()>;
}

/// GitHub REST API comment poster.
#[derive(Debug, Clone)]
pub struct GitHubCommentPoster {
    /// HTTP client.
    client: Client,
    /// API base URL, without trailing slash.
    api_url: String,
    /// Bearer token.
    token: String,
}

#[derive(Debug, Serialize)]
struct CommentRequest<'a> {
    body: &'a str,
}

impl GitHubCommentPoster {
    /// Creates a new poster.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_url: &str, token: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PublishError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    async fn post_once(&self, url: &str, request: &CommentRequest<'_>) -> Result<()> {
        trace!("POST {url}");

        let response = self
            .client
            .post(url)
            .header(header::ACCEPT, "application/vnd.github+json")
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .json(request)
            .send()
            .await
            .map_err(|e| PublishError::network(format!("Request failed: {e}")))?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or_default();
            let retry_after = if retry_after == 0 { 60 } else { retry_after };

            return Err(PublishError::RateLimited {
                retry_after_secs: retry_after,
            }
            .into());
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(PublishError::AuthenticationFailed {
                message: format!("GitHub rejected the token ({status})"),
            }
            .into());
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::request(status.as_u16(), body).into());
        }

        Ok(())
    }
}

#[async_trait]
impl CommentPoster for GitHubCommentPoster {
    async fn post_comment(&self, repo: &str, pull: u64, body: &str) -> Result<()> {
        let url = format!("{}/repos/{repo}/issues/{pull}/comments", self.api_url);
        let request = CommentRequest { body };

        let mut last_error = None;
        let mut delay = Duration::ZERO;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                debug!("Retry attempt {attempt} of {MAX_RETRIES} in {delay:?}");
                tokio::time::sleep(delay).await;
            }

            match self.post_once(&url, &request).await {
                Ok(()) => {
                    info!("Posted comment on {repo}#{pull}");
                    return Ok(());
                }
                Err(e) if e.is_retryable() => {
                    let backoff = Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt + 1));
                    delay = e
                        .retry_delay_secs()
                        .map_or(backoff, |secs| backoff.max(Duration::from_secs(secs)));
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            PlanUiError::Publish(PublishError::network("Max retries exceeded"))
        }))
    }
}
