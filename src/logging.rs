/// Log sinks: an info-level run log and a debug-level trace log under the
/// configured directory, plus warnings and above on the console.
use crate::error::Result;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt as _, EnvFilter,
    Layer,
};

/// Keeps the non-blocking file writers alive; dropping this flushes and
/// stops the log sinks, so it must live for the whole run.
pub struct LogGuards {
    _info: WorkerGuard,
    _debug: WorkerGuard,
}

pub fn init(log_dir: &Path, level: &str) -> Result<LogGuards> {
    std::fs::create_dir_all(log_dir)?;

    let info_file = tracing_appender::rolling::never(log_dir, "log.txt");
    let (info_writer, info_guard) = tracing_appender::non_blocking(info_file);

    let debug_file = tracing_appender::rolling::never(log_dir, "debug.txt");
    let (debug_writer, debug_guard) = tracing_appender::non_blocking(debug_file);

    let debug_level: LevelFilter = level.parse().unwrap_or(LevelFilter::DEBUG);

    // RUST_LOG overrides the console sink only; the file sinks keep their
    // fixed levels so the run log stays complete.
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(info_writer)
                .with_ansi(false)
                .with_filter(LevelFilter::INFO),
        )
        .with(
            fmt::layer()
                .with_writer(debug_writer)
                .with_ansi(false)
                .with_filter(debug_level),
        )
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .try_init()
        .map_err(anyhow::Error::from)?;

    Ok(LogGuards {
        _info: info_guard,
        _debug: debug_guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn second_init_reports_an_error_instead_of_panicking() {
        let dir = tempfile::tempdir().unwrap();
        let _guards = init(dir.path(), "debug").unwrap();

        let result = init(dir.path(), "debug");
        assert!(matches!(result, Err(AppError::Other(_))));
    }
}
