use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `traker=debug`)
pub const LOG_ENV: &str = "TRAKER_LOG";

/// Log file name, kept next to the task record
pub const LOG_FILE: &str = "traker.log";

/// Route `tracing` output to a log file in `dir`.
///
/// The terminal belongs to the UI, so nothing is written to stdout or
/// stderr. Returns the log file path.
pub fn init(dir: &Path) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    // Ignore a second initialisation (tests, embedding)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();

    Ok(path)
}
