//! Static server for the viewer bundle and the generated reports.
//!
//! `/` serves the UI bundle and `/plans/` the output directory, both nested
//! under the configured path prefix.

use axum::Router;
use std::path::Path;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Settings;
use crate::error::{ConfigError, PlanUiError, Result};

/// Builds the router.
///
/// A trailing `/` on `prefix` is ignored, so `"/"` and `""` both serve at the
/// root.
pub fn build_router(prefix: &str, ui_dir: &Path, output_dir: &Path) -> Router {
    let app = Router::new()
        .nest_service("/plans", ServeDir::new(output_dir))
        .fallback_service(ServeDir::new(ui_dir));

    let prefix = prefix.trim_end_matches('/');
    let app = if prefix.is_empty() {
        app
    } else {
        Router::new().nest(prefix, app)
    };

    app.layer(TraceLayer::new_for_http())
}

/// Serves until the process is stopped.
///
/// # Errors
///
/// Returns an error if the viewer bundle directory is missing, the address
/// cannot be bound, or the server fails.
pub async fn serve(settings: &Settings) -> Result<()> {
    let ui_dir = &settings.serve.ui_dir;
    let is_dir = tokio::fs::metadata(ui_dir)
        .await
        .is_ok_and(|meta| meta.is_dir());
    if !is_dir {
        return Err(PlanUiError::Config(ConfigError::validation(
            format!("Viewer bundle directory not found: {}", ui_dir.display()),
            "serve.ui_dir",
        )));
    }

    let app = build_router(
        &settings.serve.path,
        &settings.serve.ui_dir,
        &settings.output_dir,
    );

    let listener = TcpListener::bind(&settings.serve.address).await?;
    info!(
        "Serving plans viewer on http://{}{}",
        settings.serve.address, settings.serve.path
    );

    axum::serve(listener, app).await?;
    Ok(())
}
