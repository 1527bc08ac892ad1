//! Logger setup.
//!
//! Log records go to stderr in batch mode. The TUI owns the terminal, so in
//! interactive mode they are appended to a log file instead.

use std::fs::OpenOptions;
use std::path::PathBuf;

use env_logger::{Builder, Env, Target};

use crate::error::AppError;

/// Where log records should end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// Default log file used while the TUI is running.
pub fn default_log_file() -> PathBuf {
    std::env::temp_dir().join("folio.log")
}

/// Install the global logger. `RUST_LOG` overrides the default `info` filter.
///
/// Calling this twice is harmless; the second call keeps the first logger.
pub fn init(target: LogTarget) -> Result<(), AppError> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));

    match &target {
        LogTarget::Stderr => {
            builder.target(Target::Stderr);
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| AppError::runtime(format!("Failed to open log file '{}': {e}", path.display())))?;
            builder.target(Target::Pipe(Box::new(file)));
        }
    }

    if builder.try_init().is_ok() {
        log::debug!("logger initialized: {target:?}");
    }
    Ok(())
}
