//! Job log links scraped from the Atlantis status page.
//!
//! Atlantis exposes no API for job URLs, so the index page is fetched and its
//! `pulls-row` blocks are matched with regular expressions. Each row renders
//! as:
//!
//! ```html
//! <div class="pulls-row">
//!   <span class="pulls-element">acme/infra #42</span>
//!   <span class="pulls-element"><code>stacks/vpc</code></span>
//!   <span class="pulls-element"><code>default</code></span>
//!   <span class="pulls-element">...time...</span>
//!   <span class="pulls-element"><a href="/jobs/0b1c...">plan</a></span>
//! </div>
//! ```
//!
//! Rows of pre/post workflow hooks have an empty path cell and are skipped.

use regex::Regex;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{PlanUiError, PublishError, Result};

/// Extracts job links from the status page HTML.
#[derive(Debug, Clone)]
pub struct StatusPageParser {
    row_pattern: Regex,
    cell_pattern: Regex,
    tag_pattern: Regex,
    href_pattern: Regex,
}

impl StatusPageParser {
    /// Creates a parser with compiled patterns.
    ///
    /// # Errors
    ///
    /// Returns an internal error if a pattern fails to compile.
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| PlanUiError::internal(format!("Invalid status page pattern: {e}")))
        };

        Ok(Self {
            row_pattern: compile(r#"(?s)<div\s+class="pulls-row"\s*>(.*?)</div>"#)?,
            cell_pattern: compile(r"(?s)<span[^>]*>(.*?)</span>")?,
            tag_pattern: compile(r"<[^>]*>")?,
            href_pattern: compile(r#"href="([^"]*)""#)?,
        })
    }

    /// Returns `"{repo} #{pull} {path} {workspace}"` mapped to `base_url + href`.
    #[must_use]
    pub fn parse(&self, html: &str, base_url: &str) -> HashMap<String, String> {
        let mut links = HashMap::new();

        for row in self.row_pattern.captures_iter(html) {
            let row = &row[1];

            let cells: Vec<String> = self
                .cell_pattern
                .captures_iter(row)
                .map(|cell| unescape(self.tag_pattern.replace_all(&cell[1], "").trim()))
                .collect();

            let [pull, path, workspace, ..] = cells.as_slice() else {
                continue;
            };
            if path.is_empty() {
                continue;
            }

            let Some(href) = self.href_pattern.captures(row) else {
                continue;
            };

            let key = format!("{pull} {path} {workspace}");
            let url = format!("{base_url}{}", unescape(&href[1]));
            debug!("Found job log for {key}: {url}");
            links.insert(key, url);
        }

        links
    }
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Fetches the Atlantis status page and maps projects to job log URLs.
#[derive(Debug, Clone)]
pub struct LogUrlCrawler {
    /// HTTP client.
    client: Client,
    /// Atlantis base URL.
    atlantis_url: String,
    /// Row parser.
    parser: StatusPageParser,
}

impl LogUrlCrawler {
    /// Creates a crawler for the given Atlantis server.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(atlantis_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PublishError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            atlantis_url: atlantis_url.into(),
            parser: StatusPageParser::new()?,
        })
    }

    /// Crawls the status page.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched.
    pub async fn crawl(&self) -> Result<HashMap<String, String>> {
        debug!("Fetching Atlantis status page: {}", self.atlantis_url);

        let response = self
            .client
            .get(&self.atlantis_url)
            .send()
            .await
            .map_err(|e| PublishError::network(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::request(status.as_u16(), body).into());
        }

        let html = response
            .text()
            .await
            .map_err(|e| PublishError::network(format!("Failed to read status page: {e}")))?;

        let links = self.parser.parse(&html, &self.atlantis_url);
        info!("Found {} job log links", links.len());
        Ok(links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const STATUS_PAGE: &str = r#"<html><body>
<div class="lock-row"><span>ignored</span></div>
<div class="pulls-row">
  <span class="pulls-element">acme/infra #42</span>
  <span class="pulls-element"><code>stacks/vpc</code></span>
  <span class="pulls-element"><code>default</code></span>
  <span class="pulls-element"><code>Mar 01 10:00</code></span>
  <span class="pulls-element">
    <a href="/jobs/abc-123" target="_blank">plan</a>
  </span>
</div>
<div class="pulls-row">
  <span class="pulls-element">acme/infra #42</span>
  <span class="pulls-element"></span>
  <span class="pulls-element"></span>
  <span class="pulls-element"><code>Mar 01 09:59</code></span>
  <span class="pulls-element"><a href="/jobs/hook">hook</a></span>
</div>
<div class="pulls-row">
  <span class="pulls-element">acme/infra #43</span>
  <span class="pulls-element"><code>stacks/db</code></span>
  <span class="pulls-element"><code>prod</code></span>
  <span class="pulls-element"><code>Mar 01 10:01</code></span>
  <span class="pulls-element"></span>
</div>
<div class="pulls-row">
  <span class="pulls-element">acme/infra #44</span>
  <span class="pulls-element"><code>a&amp;b</code></span>
  <span class="pulls-element"><code>default</code></span>
  <span class="pulls-element"></span>
  <span class="pulls-element"><a href="/jobs/x?y=1&amp;z=2">plan</a></span>
</div>
</body></html>"#;

    #[test]
    fn test_parse_status_page() {
        let parser = StatusPageParser::new().unwrap();
        let links = parser.parse(STATUS_PAGE, "https://atlantis.example.com");

        assert_eq!(links.len(), 2);
        assert_eq!(
            links["acme/infra #42 stacks/vpc default"],
            "https://atlantis.example.com/jobs/abc-123"
        );
        assert_eq!(
            links["acme/infra #44 a&b default"],
            "https://atlantis.example.com/jobs/x?y=1&z=2"
        );
    }

    #[test]
    fn test_parse_page_without_rows() {
        let parser = StatusPageParser::new().unwrap();
        assert!(parser.parse("<html></html>", "http://a").is_empty());
    }

    #[tokio::test]
    async fn test_crawl() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(STATUS_PAGE))
            .mount(&server)
            .await;

        let crawler = LogUrlCrawler::new(server.uri(), 5).unwrap();
        let links = crawler.crawl().await.unwrap();

        assert_eq!(
            links["acme/infra #42 stacks/vpc default"],
            format!("{}/jobs/abc-123", server.uri())
        );
    }

    #[tokio::test]
    async fn test_crawl_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let crawler = LogUrlCrawler::new(server.uri(), 5).unwrap();
        let err = crawler.crawl().await.unwrap_err();

        assert!(matches!(
            err,
            PlanUiError::Publish(PublishError::RequestFailed { status: 502, .. })
        ));
    }
}
