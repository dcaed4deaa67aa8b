//! Collaborators that talk to Atlantis and the VCS.
//!
//! - [`LogUrlCrawler`]: job log links from the Atlantis status page
//! - [`CommentPoster`]: summary comments on the pull request

mod github;
mod logs;

pub use github::{CommentPoster, GitHubCommentPoster};
pub use logs::{LogUrlCrawler, StatusPageParser};

#[cfg(test)]
pub use github::MockCommentPoster;
