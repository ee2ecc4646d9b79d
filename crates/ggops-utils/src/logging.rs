//! Logging infrastructure for ggops
//!
//! Every run logs to stderr and, unless disabled, to a per-run file under the
//! logs directory named `<%Y%m%dT%H%M%S>_<command>.log`.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::io::IsTerminal;
use std::sync::Mutex;
use tracing::{Level, span};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Check if colored output should be used on stderr.
fn use_color() -> bool {
    std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Build the per-run log file path.
#[must_use]
pub fn log_file_path(logs_dir: &Utf8Path, command: &str, started: DateTime<Local>) -> Utf8PathBuf {
    logs_dir.join(format!("{}_{command}.log", started.format("%Y%m%dT%H%M%S")))
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("ggops=debug,info")
            } else {
                EnvFilter::try_new("ggops=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the tracing subscriber.
///
/// When `log_file` is given the parent directory is created and a second,
/// non-ANSI layer appends to that file. Returns an error if a global
/// subscriber is already installed.
pub fn init_tracing(verbose: bool, log_file: Option<&Utf8Path>) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(use_color())
        .with_target(verbose)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_span_events(if verbose { FmtSpan::CLOSE } else { FmtSpan::NONE })
        .compact();

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create logs directory: {parent}"))?;
            }
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file: {path}"))?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

/// Span wrapping all work done for one replication process.
pub fn process_span(env: &str, process: &str) -> tracing::Span {
    span!(Level::INFO, "process", env = %env, process = %process)
}
