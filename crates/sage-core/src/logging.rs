//! File-based logging setup.
//!
//! The TUI owns the terminal, so logs go to ${SAGE_HOME}/logs/ instead of
//! stderr. Filtering is controlled by the SAGE_LOG env var (default "info").

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::paths;

static SAGE_LOG_ENV_VAR: &str = "SAGE_LOG";

/// Initializes the global tracing subscriber, writing to a daily rolling
/// log file.
///
/// The returned guard must be held for the lifetime of the process;
/// dropping it flushes and stops the background writer.
pub fn init() -> Result<WorkerGuard> {
    let dir = paths::logs_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(&dir, "sage.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let env_filter = EnvFilter::try_from_env(SAGE_LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}
