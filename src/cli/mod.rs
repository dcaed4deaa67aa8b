//! CLI module for the plan viewer.
//!
//! This module provides the command-line interface for converting,
//! inspecting and serving plan reports.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use output::OutputFormatter;
