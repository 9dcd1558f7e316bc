//! Logging initialization
//!
//! The codebase logs through the `log` facade. At startup the records are
//! bridged into a `tracing` subscriber that writes to stderr and to a log
//! file at the same time.

use anyhow::Result;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Default filter when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "info";

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file (opened in append mode)
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to open the file or a global logger is already set
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file {}: {}", log_file_path, e))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = Registry::default()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(log_file)));

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;
    tracing_log::LogTracer::init().map_err(|e| anyhow::anyhow!("Failed to bridge log records: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_init_logger_creates_log_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("portalbot.log");

        // A global logger may already be installed by another test in this
        // binary; only the file side effect is asserted.
        let _ = init_logger(path.to_str().unwrap());

        assert!(path.exists());
    }

    #[test]
    #[serial]
    fn test_init_logger_rejects_bad_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("portalbot.log");

        assert!(init_logger(path.to_str().unwrap()).is_err());
    }
}
