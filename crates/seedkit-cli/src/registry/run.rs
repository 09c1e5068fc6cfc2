use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Serialize;

use seedkit_generate::{SeedOptions, SeedReport};
use seedkit_request::ErrorList;

use crate::config::{OutputFormat, write_json_atomic};

use super::{RegistryError, RegistryResult};

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub out_dir: PathBuf,
    pub format: OutputFormat,
    pub schemas_path: PathBuf,
    pub input_path: Option<PathBuf>,
    pub options: SeedOptions,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
pub struct RunConfig {
    pub run_id: String,
    pub started_at: String,
    pub schema_version: String,
    pub format: OutputFormat,
    pub schemas_path: String,
    pub input_path: Option<String>,
    pub options: SeedOptions,
    pub git: GitInfo,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub dirty: Option<bool>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub records_path: PathBuf,
    pub report_path: PathBuf,
    pub errors_path: PathBuf,
    pub logs_path: PathBuf,
}

/// Create `{timestamp}__run_{run_id}` under the output dir and write `config.json`.
pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let root = ctx.out_dir.join(format!("{timestamp}__run_{}", ctx.run_id));

    create_dir_all(&root)?;

    let config_path = root.join("config.json");
    let logs_path = root.join("logs.ndjson");
    let report_path = root.join("report.json");
    let errors_path = root.join("errors.json");
    let records_path = root.join(format!("records.{}", ctx.format.extension()));

    let config = RunConfig {
        run_id: ctx.run_id.clone(),
        started_at: ctx.started_at.to_rfc3339(),
        schema_version: seedkit_core::SCHEMA_VERSION.to_string(),
        format: ctx.format,
        schemas_path: ctx.schemas_path.display().to_string(),
        input_path: ctx
            .input_path
            .as_ref()
            .map(|path| path.display().to_string()),
        options: ctx.options.clone(),
        git: collect_git_info(),
    };

    write_json(&config_path, &config)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logs_path)?;

    Ok(RunPaths {
        root,
        records_path,
        report_path,
        errors_path,
        logs_path,
    })
}

pub fn write_report(paths: &RunPaths, report: &SeedReport) -> RegistryResult<()> {
    write_json(&paths.report_path, report)
}

/// Issues of a failed run, in the order they were raised.
pub fn write_errors(paths: &RunPaths, errors: &ErrorList) -> RegistryResult<()> {
    write_json(&paths.errors_path, errors)
}

pub fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
            } else {
                None
            }
        })
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> RegistryResult<()> {
    write_json_atomic(path, value).map_err(RegistryError::from)
}
