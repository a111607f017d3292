//! File logging for the example binary.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming the log file.
pub const LOG_ENV: &str = "DATASTORE_EXAMPLE_LOG";

/// Per-process log file derived from the configured base path:
/// `{base}.{unix seconds}.{pid}`.
pub fn log_file_path(base: &str, started: SystemTime, pid: u32) -> PathBuf {
    let secs = started
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    PathBuf::from(format!("{}.{}.{}", base, secs, pid))
}

/// Initialize tracing with optional file output.
///
/// Logging is off unless `DATASTORE_EXAMPLE_LOG` is set, since the form owns
/// the terminal. Each process writes its own file (see [`log_file_path`]), so
/// two instances started against the same base path never interleave lines.
/// The level comes from `RUST_LOG` (default `info`).
///
/// Returns the file being written, if any.
pub fn init_tracing() -> Option<PathBuf> {
    let base = std::env::var(LOG_ENV).ok()?;
    let path = log_file_path(&base, SystemTime::now(), std::process::id());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file = match std::fs::File::create(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: Failed to create log file {}: {}", path.display(), e);
            return None;
        }
    };

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();
    Some(path)
}
