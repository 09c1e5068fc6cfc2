mod logging;
mod run;

pub use logging::init_run_logging;
pub use run::{RunContext, start_run, write_errors, write_report};

use thiserror::Error;

/// Registry-level errors for run artifacts.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("artifact write failed: {0}")]
    Write(#[from] crate::config::ConfigError),
    #[error("logging error: {0}")]
    Logging(String),
}

/// Result type for registry operations.
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
