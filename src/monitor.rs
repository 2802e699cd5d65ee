//! The log monitor daemon.
//!
//! Every poll, each regular file below the log directory that does not start
//! with [`BANNER`] is rewritten with the banner and a blank line prepended.
//! Errors on individual files are ignored so one unreadable file never stops
//! the daemon.
use std::{path::Path, time::Duration};

use walkdir::WalkDir;

/// Warning prepended to every log file.
pub const BANNER: &str = "WARNING: This log file may contain personal or sensitive information. Review and redact it before sharing it with anyone.";

/// Default time between two scans.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Scrubs one file. Returns whether it was rewritten.
pub fn scrub_file(path: &Path) -> std::io::Result<bool> {
    let bytes = std::fs::read(path)?;

    if bytes.starts_with(BANNER.as_bytes()) {
        return Ok(false);
    }

    let mut output = Vec::with_capacity(BANNER.len() + 2 + bytes.len());
    output.extend_from_slice(BANNER.as_bytes());
    output.extend_from_slice(b"\n\n");
    output.extend_from_slice(&bytes);

    std::fs::write(path, output)?;

    Ok(true)
}

/// Scrubs every regular file below `log_dir` once.
///
/// Returns the number of files rewritten. A missing directory counts as empty.
pub fn scrub_once(log_dir: &Path) -> usize {
    if !log_dir.is_dir() {
        tracing::trace!(?log_dir, "log directory not present");
        return 0;
    }

    let mut count = 0;

    for entry in WalkDir::new(log_dir).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }

        match scrub_file(entry.path()) {
            Ok(true) => {
                tracing::debug!(path = ?entry.path(), "added banner");
                count += 1;
            }
            Ok(false) => {}
            Err(error) => {
                tracing::debug!(path = ?entry.path(), %error, "skipping file");
            }
        }
    }

    count
}

/// Scans `log_dir` forever, sleeping `interval` between scans.
pub fn run(log_dir: &Path, interval: Duration) -> ! {
    tracing::info!(?log_dir, ?interval, "log monitor started");

    loop {
        let count = scrub_once(log_dir);

        if count > 0 {
            tracing::info!(count, "scrubbed log files");
        }

        std::thread::sleep(interval);
    }
}
