// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// Tests assert with unwrap/expect freely
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Atlantis Plan UI
//!
//! Addressable, human-friendly Terraform plan summaries for Atlantis pull
//! requests.
//!
//! ## Overview
//!
//! Atlantis posts plans as one long terminal dump per project. This crate
//! turns them into a per-resource report a browser viewer can render:
//!
//! - Correlate the structured plan (`terraform show -json`) with the textual
//!   report (`terraform show`) so every change carries its human-readable diff
//! - Collect every project of a pull, including lock and log information
//! - Write the report under a content digest so links stay stable
//! - Post a summary comment linking to the viewer
//!
//! ## Architecture
//!
//! 1. **Engine**: [`plan`] reads both plan renderings and builds a
//!    [`plan::DiffModel`]
//! 2. **Records**: [`records`] reads pull and lock state from Atlantis
//! 3. **Report**: [`report`] converts a pull and writes its JSON document
//! 4. **Pipeline**: [`reporter`] runs the whole flow and posts the comment
//!
//! ## Modules
//!
//! - [`config`]: Settings parsing and validation
//! - [`plan`]: Plan correlation engine
//! - [`records`]: Atlantis record store
//! - [`publish`]: Status page crawler and comment poster
//! - [`report`]: Report model, conversion and output files
//! - [`reporter`]: End-to-end pipeline
//! - [`server`]: Static viewer server
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! atlantis:
//!   url: https://atlantis.example.com
//!   records_path: /var/lib/atlantis/atlantis.json
//! plans_dir: /var/lib/atlantis/plans
//! output_dir: /var/lib/plan-ui/plans
//! comment:
//!   ui_url: https://plans.example.com/
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod plan;
pub mod publish;
pub mod records;
pub mod report;
pub mod reporter;
pub mod server;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{Settings, SettingsParser, SettingsValidator};
pub use error::{PlanUiError, Result};
pub use plan::{DiffCorrelator, DiffModel, StructuredPlanReader, TextPlanScanner, correlate_files};
pub use publish::{CommentPoster, GitHubCommentPoster, LogUrlCrawler};
pub use records::{JsonRecordStore, RecordStore};
pub use report::{PullConverter, ReportWriter, UiData, UiStack};
pub use reporter::{PullReporter, ReportOutcome};
