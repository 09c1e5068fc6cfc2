use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use seedkit_generate::SeedOptions;

use super::atomic::write_bytes_atomic;
use super::{ConfigError, ConfigResult};

/// Record file format written by `seedkit seed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Jsonl,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jsonl => "jsonl",
            OutputFormat::Csv => "csv",
        }
    }
}

/// Contents of `seedkit.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliSettings {
    /// Directory receiving run directories.
    pub out_dir: PathBuf,
    pub format: OutputFormat,
    /// Mirror logs to stderr in addition to `logs.ndjson`.
    pub log_to_stderr: bool,
    /// Identity given to the first committed record.
    pub first_record_id: u64,
    pub seed: SeedOptions,
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("runs"),
            format: OutputFormat::Jsonl,
            log_to_stderr: true,
            first_record_id: 1,
            seed: SeedOptions::default(),
        }
    }
}

pub fn load_or_create_settings(path: &Path) -> ConfigResult<CliSettings> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let settings: CliSettings = toml::from_str(&content)?;
        if settings.first_record_id == 0 {
            return Err(ConfigError::Invalid(
                "first_record_id must be greater than zero".to_string(),
            ));
        }
        return Ok(settings);
    }

    let settings = CliSettings::default();
    save_settings(path, &settings)?;
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &CliSettings) -> ConfigResult<()> {
    let encoded = toml::to_string_pretty(settings)?;
    write_bytes_atomic(path, encoded.as_bytes())
}
