//! Pull request reports.
//!
//! This module turns Atlantis records and plan files into the JSON document
//! the viewer loads, writes it to disk, and renders the summary comment.

mod comment;
mod converter;
mod ui;
mod writer;

pub use comment::{CommentStats, render_comment};
pub use converter::{PullConverter, STRUCTURED_PLAN_FILE, TEXTUAL_PLAN_FILE};
pub use ui::{UiData, UiStack};
pub use writer::{ReportWriter, WrittenReport, content_digest, short_digest};
