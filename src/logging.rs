//! Tracing subscriber setup.
//!
//! CLI commands log to stderr. The TUI owns the terminal, so it logs to a file
//! instead. `RUST_LOG` overrides the default `info` filter.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

pub const LOG_FILE_NAME: &str = "stock-insight.log";

#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    Stderr,
    /// Append to `LOG_FILE_NAME` inside this directory.
    File(&'a Path),
}

pub fn init(target: LogTarget<'_>) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let result = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(dir) => {
            std::fs::create_dir_all(dir)
                .map_err(|e| AppError::new(2, format!("Failed to create log dir '{}': {e}", dir.display())))?;
            let path = dir.join(LOG_FILE_NAME);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| AppError::new(2, format!("Failed to open log file '{}': {e}", path.display())))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
    };

    match result {
        Ok(()) => Ok(()),
        // A global subscriber installed earlier (tests, embedding) stays in place.
        Err(_) if tracing::dispatcher::has_been_set() => Ok(()),
        Err(e) => Err(AppError::new(4, format!("Failed to initialize logging: {e}"))),
    }
}
