use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::model::LogConfig;

/// `RUST_LOG` if set, else the configured directive, else `fallback`
fn filter(directive: Option<&str>, fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive.unwrap_or(fallback)))
        .unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Log to a file in the board directory. The TUI owns the terminal, so
/// nothing may go to stderr while it runs. Keep the guard alive until exit
/// or buffered lines are lost.
pub fn init_file_logging(board_dir: &Path, config: &LogConfig) -> Option<WorkerGuard> {
    let appender = tracing_appender::rolling::never(board_dir, &config.file);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter(Some(&config.level), "info"))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()
        .map(|_| guard)
}

/// Log warnings to stderr for CLI runs
pub fn init_cli_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(None, "warn"))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
