//! Logging setup
//!
//! Diagnostics go to an append-only local file, never to the terminal the
//! chat runs in. The level can be overridden with `RUST_LOG`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_DIRECTIVE: &str = "multiroom_chat=info";

/// Install the global subscriber writing to `path`
///
/// Fails if the file cannot be opened for appending.
pub fn init_file_logging(path: &Path, default_directive: &str) -> Result<(), AppError> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
