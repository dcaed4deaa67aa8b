//! Plan UI CLI entrypoint.
//!
//! This is the main entrypoint for the plan-ui command-line tool.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use atlantis_plan_ui::cli::{Cli, Commands, OutputFormatter};
use atlantis_plan_ui::config::{Settings, SettingsParser, SettingsValidator, find_settings_file};
use atlantis_plan_ui::error::Result;
use atlantis_plan_ui::plan::{ScanOptions, correlate_files};
use atlantis_plan_ui::publish::{GitHubCommentPoster, LogUrlCrawler};
use atlantis_plan_ui::records::{JsonRecordStore, RecordStore};
use atlantis_plan_ui::reporter::PullReporter;
use atlantis_plan_ui::server;

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
///
/// `RUST_LOG` wins over the `--verbose` default.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);

    match cli.command {
        Commands::Convert {
            repo,
            pull,
            no_comment,
        } => cmd_convert(cli.config.as_ref(), &repo, pull, no_comment, &formatter).await,
        Commands::Show {
            plan_json,
            plan_txt,
        } => cmd_show(cli.config.as_ref(), &plan_json, &plan_txt, &formatter),
        Commands::Serve {
            address,
            path,
            ui_dir,
        } => cmd_serve(cli.config.as_ref(), address, path, ui_dir).await,
    }
}

/// Build the report of a pull request.
async fn cmd_convert(
    config_path: Option<&PathBuf>,
    repo: &str,
    pull: u64,
    no_comment: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let settings = load_settings(config_path, |settings| {
        if no_comment {
            settings.comment.enabled = false;
        }
    })?;

    let store = JsonRecordStore::new(&settings.atlantis.records_path);
    debug!(
        "Using {} record store: {}",
        store.backend_type(),
        store.path().display()
    );

    let crawler = LogUrlCrawler::new(&settings.atlantis.url, settings.request_timeout_secs)?;
    let reporter = PullReporter::new(&settings, &store, &crawler);

    let outcome = if settings.posts_comment() {
        let token = SettingsParser::github_token()?;
        let poster = GitHubCommentPoster::new(
            &settings.comment.api_url,
            &token,
            settings.request_timeout_secs,
        )?;
        reporter.with_poster(&poster).run(repo, pull).await?
    } else {
        reporter.run(repo, pull).await?
    };

    write_stdout(&formatter.format_outcome(&outcome))
}

/// Correlate a single plan and print it.
fn cmd_show(
    config_path: Option<&PathBuf>,
    plan_json: &Path,
    plan_txt: &Path,
    formatter: &OutputFormatter,
) -> Result<()> {
    let options = scan_options(config_path)?;
    let model = correlate_files(plan_json, plan_txt, &options)?;

    write_stdout(&formatter.format_diff_model(&model))
}

/// Serve the viewer.
async fn cmd_serve(
    config_path: Option<&PathBuf>,
    address: Option<String>,
    path: Option<String>,
    ui_dir: Option<PathBuf>,
) -> Result<()> {
    let settings = load_settings(config_path, |settings| {
        // Serving never posts, so the viewer URL is not required.
        settings.comment.enabled = false;
        if let Some(address) = address {
            settings.serve.address = address;
        }
        if let Some(path) = path {
            settings.serve.path = path;
        }
        if let Some(ui_dir) = ui_dir {
            settings.serve.ui_dir = ui_dir;
        }
    })?;

    server::serve(&settings).await
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolves the settings file path.
fn resolve_config_path(config_path: Option<&PathBuf>) -> Result<PathBuf> {
    config_path.map_or_else(|| find_settings_file("."), |path| Ok(path.clone()))
}

/// Loads, adjusts and validates settings.
fn load_settings(
    config_path: Option<&PathBuf>,
    adjust: impl FnOnce(&mut Settings),
) -> Result<Settings> {
    let config_file = resolve_config_path(config_path)?;
    debug!("Loading settings from: {}", config_file.display());

    let parser = SettingsParser::new()
        .with_base_path(config_file.parent().unwrap_or_else(|| Path::new(".")));
    parser.load_dotenv()?;

    let mut settings = parser.load_with_env(&config_file)?;
    adjust(&mut settings);

    let result = SettingsValidator::new().validate(&settings)?;
    for warning in &result.warnings {
        warn!("{warning}");
    }

    Ok(settings)
}

/// Scanner options from the settings file, or the defaults without one.
fn scan_options(config_path: Option<&PathBuf>) -> Result<ScanOptions> {
    let config_file = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(_) if config_path.is_none() => {
            info!("No settings file found, using default scanner options");
            return Ok(ScanOptions::default());
        }
        Err(e) => return Err(e),
    };

    let settings = SettingsParser::new().load_with_env(&config_file)?;
    Ok(settings.scan.options())
}

/// Writes command output to stdout.
fn write_stdout(output: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    if !output.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}
