//! Appointment scheduler binary.
//!
//! Loads `.env` and configuration, schedules the configured appointments
//! and prints those falling in the upcoming window. Any error is logged and
//! ends the process with exit code 1.

use std::fmt::Display;

use sched_app::config::{self, LoggingConfig};
use tracing_subscriber::EnvFilter;

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("SCHED_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

/// Logs go to stderr; stdout carries only the listing.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// For failures before the configured subscriber exists.
fn fail_early(context: &str, error: impl Display) -> ! {
    init_tracing(&LoggingConfig::default());
    tracing::error!(error = %error, "{context}");
    std::process::exit(1);
}

fn main() {
    // Variables already set in the process environment win over `.env`.
    let env_file = match dotenvy::dotenv() {
        Ok(path) => Some(path),
        Err(e) if e.not_found() => None,
        Err(e) => fail_early("error loading .env file", e),
    };

    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    let config = match config::load_config(selected_config_path) {
        Ok(config) => config,
        Err(e) => fail_early("error loading configuration", e),
    };

    init_tracing(&config.logging);

    if let Some(path) = &env_file {
        tracing::info!(path = %path.display(), "loaded environment file");
    }
    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match sched_app::run(&config, chrono::Utc::now(), &mut out) {
        Ok(listed) => tracing::debug!(listed, "done"),
        Err(e) => {
            tracing::error!(error = %e, "fatal");
            std::process::exit(1);
        }
    }
}
