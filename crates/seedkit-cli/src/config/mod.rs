mod atomic;
mod settings;

pub use atomic::write_json_atomic;
pub use settings::{OutputFormat, load_or_create_settings};

use thiserror::Error;

/// Errors raised while reading or writing local configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid settings file: {0}")]
    TomlDecode(#[from] toml::de::Error),
    #[error("settings encoding failed: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("{0}")]
    Invalid(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
