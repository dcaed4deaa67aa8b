//! Scanner for the human-readable `terraform show` report.
//!
//! Terraform keeps its plan renderer internal, so the textual diff for each
//! resource is recovered by segmenting the report line by line. The scanner is
//! lenient: a block that never reaches its closing line produces no entry, and
//! the correlator substitutes a fallback text for it.

use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

use crate::error::{PlanError, Result};

use super::address::extract_address;

/// Phrase Terraform prints after an outputs-only plan.
///
/// Present since Terraform 0.15; older releases word it differently.
pub const DEFAULT_APPLY_MARKER: &str = "You can apply this plan";

const RESOURCE_HEADER_PREFIX: &str = "  # ";
const OUTPUTS_HEADER: &str = "Changes to Outputs:";
const BLOCK_END: &str = "    }";
const DRIFT_SUFFIXES: &[&str] = &["has changed", "has been deleted"];

/// Tunables for version-specific report wording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Line prefix that terminates the outputs section.
    pub apply_marker: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            apply_marker: String::from(DEFAULT_APPLY_MARKER),
        }
    }
}

/// Current position of the scanner within the report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanState {
    /// Between blocks.
    #[default]
    Main,
    /// Inside a resource (or drift) block that has not been closed yet.
    InResourceBlock {
        /// Lines accumulated so far, header first.
        lines: Vec<String>,
    },
    /// Inside the "Changes to Outputs:" section.
    InOutputsSection {
        /// Lines of the output block being accumulated; empty before the first one.
        lines: Vec<String>,
    },
}

/// Verbatim textual bodies keyed by address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextualBodies {
    /// Planned change bodies per resource address.
    pub diffs: HashMap<String, String>,
    /// Drift bodies per resource address.
    pub drifts: HashMap<String, String>,
    /// Change bodies per output name.
    pub outputs: HashMap<String, String>,
}

/// Line-oriented scanner turning a textual report into [`TextualBodies`].
#[derive(Debug, Default)]
pub struct TextPlanScanner {
    /// Wording options.
    options: ScanOptions,
    /// Current state.
    state: ScanState,
    /// Bodies collected so far.
    bodies: TextualBodies,
}

impl TextPlanScanner {
    /// Creates a scanner with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scanner with custom options.
    #[must_use]
    pub fn with_options(options: ScanOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Returns the current scanner state.
    #[must_use]
    pub const fn state(&self) -> &ScanState {
        &self.state
    }

    /// Returns the bodies collected so far.
    #[must_use]
    pub const fn bodies(&self) -> &TextualBodies {
        &self.bodies
    }

    /// Feeds a single report line to the scanner.
    pub fn feed_line(&mut self, raw: &str) {
        let line = raw.trim_end();

        self.state = match std::mem::take(&mut self.state) {
            ScanState::Main => Self::on_main(line),
            ScanState::InResourceBlock { lines } => self.on_resource_block(lines, line),
            ScanState::InOutputsSection { lines } => self.on_outputs_section(lines, line),
        };
    }

    /// Finishes scanning and returns the collected bodies.
    ///
    /// An output block still open at the end of input is kept; reports are
    /// sometimes truncated before the closing apply marker.
    #[must_use]
    pub fn finish(mut self) -> TextualBodies {
        if let ScanState::InOutputsSection { lines } = std::mem::take(&mut self.state)
            && lines.first().is_some_and(|first| !first.trim().is_empty())
        {
            self.store_output(lines);
        }
        self.bodies
    }

    /// Scans a whole report held in memory.
    #[must_use]
    pub fn scan_str(mut self, report: &str) -> TextualBodies {
        for line in report.lines() {
            self.feed_line(line);
        }
        self.finish()
    }

    /// Scans a report from a buffered reader.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns an IO error naming `source` if reading fails.
    pub fn scan_reader<R: BufRead>(mut self, mut reader: R, source: &Path) -> Result<TextualBodies> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| PlanError::io(source, e))?;
            if read == 0 {
                break;
            }
            self.feed_line(&String::from_utf8_lossy(&buf));
        }
        Ok(self.finish())
    }

    /// Scans a report file.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be opened or read.
    pub fn scan_file(self, path: impl AsRef<Path>) -> Result<TextualBodies> {
        let path = path.as_ref();
        debug!("Scanning textual plan: {}", path.display());

        let file = File::open(path).map_err(|e| PlanError::io(path, e))?;
        let bodies = self.scan_reader(BufReader::new(file), path)?;

        debug!(
            "Scanned {} diffs, {} drifts, {} outputs from {}",
            bodies.diffs.len(),
            bodies.drifts.len(),
            bodies.outputs.len(),
            path.display()
        );
        Ok(bodies)
    }

    fn on_main(line: &str) -> ScanState {
        if line.starts_with(RESOURCE_HEADER_PREFIX) {
            ScanState::InResourceBlock {
                lines: vec![line.to_string()],
            }
        } else if line == OUTPUTS_HEADER {
            ScanState::InOutputsSection { lines: Vec::new() }
        } else {
            ScanState::Main
        }
    }

    fn on_resource_block(&mut self, mut lines: Vec<String>, line: &str) -> ScanState {
        lines.push(line.to_string());
        if line != BLOCK_END {
            return ScanState::InResourceBlock { lines };
        }

        let header = &lines[0];
        let address = extract_address(header).to_string();
        let is_drift = DRIFT_SUFFIXES.iter().any(|suffix| header.ends_with(suffix));
        let body = lines.join("\n");

        if is_drift {
            self.bodies.drifts.insert(address, body);
        } else {
            self.bodies.diffs.insert(address, body);
        }
        ScanState::Main
    }

    fn on_outputs_section(&mut self, mut lines: Vec<String>, line: &str) -> ScanState {
        if line.starts_with(self.options.apply_marker.as_str()) {
            // The blank line right before the marker separates it from the block.
            if lines.len() > 1 && lines.last().is_some_and(String::is_empty) {
                lines.pop();
            }
            if !lines.is_empty() {
                self.store_output(lines);
            }
            return ScanState::Main;
        }

        if is_output_header(line) {
            if !lines.is_empty() {
                self.store_output(lines);
            }
            return ScanState::InOutputsSection {
                lines: vec![line.to_string()],
            };
        }

        // Blank lines between the section header and the first output belong to no block.
        if !lines.is_empty() {
            lines.push(line.to_string());
        }
        ScanState::InOutputsSection { lines }
    }

    fn store_output(&mut self, lines: Vec<String>) {
        let address = extract_address(&lines[0]).to_string();
        self.bodies.outputs.insert(address, lines.join("\n"));
    }
}

/// Matches `^  [-+~] `, the header of an output change.
fn is_output_header(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.len() >= 4
        && bytes[0] == b' '
        && bytes[1] == b' '
        && matches!(bytes[2], b'-' | b'+' | b'~')
        && bytes[3] == b' '
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREATE_BLOCK: &str = r#"  # aws_vpc.this["main"] will be created
  + resource "aws_vpc" "this" {
      + cidr_block = "10.0.0.0/16"
      + id         = (known after apply)
    }"#;

    #[test]
    fn test_single_resource_block_round_trip() {
        let report = format!("Terraform will perform the following actions:\n\n{CREATE_BLOCK}\n\nPlan: 1 to add, 0 to change, 0 to destroy.\n");
        let bodies = TextPlanScanner::new().scan_str(&report);

        assert_eq!(bodies.diffs.len(), 1);
        assert_eq!(bodies.diffs[r#"aws_vpc.this["main"]"#], CREATE_BLOCK);
        assert!(bodies.drifts.is_empty());
        assert!(bodies.outputs.is_empty());
    }

    #[test]
    fn test_drift_blocks_are_separated() {
        let report = r#"Note: Objects have changed outside of Terraform

  # aws_s3_bucket.logs has changed
  ~ resource "aws_s3_bucket" "logs" {
      ~ tags = {
          + "owner" = "ops"
        }
    }

  # aws_instance.old has been deleted
  - resource "aws_instance" "old" {
      - id = "i-123"
    }

Terraform will perform the following actions:

  # aws_s3_bucket.logs will be updated in-place
  ~ resource "aws_s3_bucket" "logs" {
      ~ tags = {
          - "owner" = "ops"
        }
    }
"#;
        let bodies = TextPlanScanner::new().scan_str(report);

        assert_eq!(bodies.drifts.len(), 2);
        assert!(bodies.drifts["aws_s3_bucket.logs"].ends_with("    }"));
        assert!(bodies.drifts["aws_s3_bucket.logs"].contains("has changed"));
        assert!(bodies.drifts.contains_key("aws_instance.old"));
        assert_eq!(bodies.diffs.len(), 1);
        assert!(bodies.diffs["aws_s3_bucket.logs"].contains("updated in-place"));
    }

    #[test]
    fn test_outputs_closed_by_apply_marker() {
        let report = r#"Changes to Outputs:
  + endpoint = "https://example.com"
  ~ ids      = [
      - "a",
      + "b",
    ]

You can apply this plan to save these new output values to the Terraform
state, without changing any real infrastructure.
"#;
        let bodies = TextPlanScanner::new().scan_str(report);

        assert_eq!(bodies.outputs.len(), 2);
        assert_eq!(bodies.outputs["endpoint"], r#"  + endpoint = "https://example.com""#);
        assert_eq!(
            bodies.outputs["ids"],
            "  ~ ids      = [\n      - \"a\",\n      + \"b\",\n    ]"
        );
    }

    #[test]
    fn test_only_one_blank_line_dropped_before_marker() {
        let report = "Changes to Outputs:\n  + a = 1\n\n\nYou can apply this plan to save these new output values\n";
        let bodies = TextPlanScanner::new().scan_str(report);

        assert_eq!(bodies.outputs["a"], "  + a = 1\n");
    }

    #[test]
    fn test_truncated_outputs_tail_is_verbatim() {
        let report = "Changes to Outputs:\n  + a = [\n      1,\n    ]\n\n";
        let bodies = TextPlanScanner::new().scan_str(report);

        assert_eq!(bodies.outputs["a"], "  + a = [\n      1,\n    ]\n");
    }

    #[test]
    fn test_blank_line_kept_when_next_output_closes_block() {
        let report = "Changes to Outputs:\n  + a = 1\n\n  + b = 2\n";
        let bodies = TextPlanScanner::new().scan_str(report);

        assert_eq!(bodies.outputs["a"], "  + a = 1\n");
        assert_eq!(bodies.outputs["b"], "  + b = 2");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut report = b"  # null_resource.x will be created\n  + resource \"null_resource\" \"x\" {\n      + name = \"".to_vec();
        report.extend_from_slice(&[0xff, 0xfe]);
        report.extend_from_slice(b"\"\n    }\n");

        let bodies = TextPlanScanner::new()
            .scan_reader(report.as_slice(), Path::new("plan.txt"))
            .expect("Scan should tolerate invalid UTF-8");

        let body = &bodies.diffs["null_resource.x"];
        assert!(body.contains("+ name = \"\u{fffd}\u{fffd}\""));
        assert!(body.ends_with("    }"));
    }

    #[test]
    fn test_crlf_line_endings() {
        let report = b"  # null_resource.x will be created\r\n  + resource \"null_resource\" \"x\" {}\r\n    }\r\n";
        let bodies = TextPlanScanner::new()
            .scan_reader(&report[..], Path::new("plan.txt"))
            .unwrap();

        assert!(bodies.diffs["null_resource.x"].ends_with("{}\n    }"));
    }

    #[test]
    fn test_truncated_outputs_section_keeps_last_block() {
        let report = "Changes to Outputs:\n  - legacy = \"x\"\n  + fresh  = 42\n";
        let bodies = TextPlanScanner::new().scan_str(report);

        assert_eq!(bodies.outputs.len(), 2);
        assert_eq!(bodies.outputs["fresh"], "  + fresh  = 42");
        assert_eq!(bodies.outputs["legacy"], "  - legacy = \"x\"");
    }

    #[test]
    fn test_unclosed_block_is_dropped() {
        let report = "  # aws_vpc.this will be created\n  + resource \"aws_vpc\" \"this\" {\n      + id = (known after apply)\n";
        let mut scanner = TextPlanScanner::new();
        for line in report.lines() {
            scanner.feed_line(line);
        }

        assert!(matches!(
            scanner.state(),
            ScanState::InResourceBlock { lines } if lines.len() == 3
        ));
        let bodies = scanner.finish();
        assert!(bodies.diffs.is_empty());
    }

    #[test]
    fn test_state_transitions() {
        let mut scanner = TextPlanScanner::new();
        assert_eq!(scanner.state(), &ScanState::Main);

        scanner.feed_line("Changes to Outputs:   ");
        assert_eq!(scanner.state(), &ScanState::InOutputsSection { lines: vec![] });

        scanner.feed_line("");
        assert_eq!(scanner.state(), &ScanState::InOutputsSection { lines: vec![] });

        scanner.feed_line("  + name = \"x\"");
        assert_eq!(
            scanner.state(),
            &ScanState::InOutputsSection {
                lines: vec![String::from("  + name = \"x\"")]
            }
        );

        scanner.feed_line("You can apply this plan to save these new output values");
        assert_eq!(scanner.state(), &ScanState::Main);
        assert_eq!(scanner.bodies().outputs["name"], "  + name = \"x\"");
    }

    #[test]
    fn test_custom_apply_marker() {
        let options = ScanOptions {
            apply_marker: String::from("You can apply this configuration"),
        };
        let report = "Changes to Outputs:\n  + a = 1\n\nYou can apply this configuration now\n  # not.a.block will be created\n";
        let mut scanner = TextPlanScanner::with_options(options);
        for line in report.lines() {
            scanner.feed_line(line);
        }

        assert!(matches!(scanner.state(), ScanState::InResourceBlock { .. }));
        assert_eq!(scanner.bodies().outputs["a"], "  + a = 1");
    }

    #[test]
    fn test_default_marker_matches_current_terraform_wording() {
        let tail = "You can apply this plan to save these new output values to the Terraform state, without changing any real infrastructure.";
        assert!(tail.starts_with(DEFAULT_APPLY_MARKER));
    }

    #[test]
    fn test_trailing_whitespace_is_trimmed() {
        let report = "  # null_resource.x will be created   \n  + resource \"null_resource\" \"x\" {}\t\n    }   \n";
        let bodies = TextPlanScanner::new().scan_str(report);

        assert_eq!(
            bodies.diffs["null_resource.x"],
            "  # null_resource.x will be created\n  + resource \"null_resource\" \"x\" {}\n    }"
        );
    }

    #[test]
    fn test_scan_missing_file() {
        let result = TextPlanScanner::new().scan_file("/nonexistent/plan.txt");
        assert!(matches!(
            result,
            Err(crate::error::PlanUiError::Plan(PlanError::Io { .. }))
        ));
    }
}
