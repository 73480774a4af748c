//! File logging for the hook binary.
//!
//! Hooks run with their stdout/stderr captured by the agent, so diagnostics
//! go to a rolling file under the Beacon log directory instead. Logging is
//! strictly optional: if the directory cannot be created the hook still
//! does its job, silently.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILTER_ENV: &str = "BEACON_LOG";

/// Initializes file logging; the returned guard must live until exit so
/// buffered lines are flushed.
pub fn init() -> Option<WorkerGuard> {
    let log_dir = beacon_core::config::log_dir().ok()?;
    fs_err::create_dir_all(&log_dir).ok()?;

    let appender = tracing_appender::rolling::daily(&log_dir, "beacon-hook.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Some(guard)
}
