use std::fs;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::http_cache::app_cache_dir;

/// Sends `tracing` output to a daily rolling file, since the terminal is
/// owned by the UI. Keep the guard alive for the life of the process.
pub fn init_file_logging(file_prefix: &str) -> Option<WorkerGuard> {
    let logs_dir = log_dir()?;
    fs::create_dir_all(&logs_dir).ok()?;
    let file_appender = tracing_appender::rolling::daily(&logs_dir, file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(non_blocking)
        .with_ansi(false)
        .try_init()
        .is_ok();
    installed.then_some(guard)
}

/// Plain stderr logging for the command-line tools.
pub fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn log_dir() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join("logs"))
}
