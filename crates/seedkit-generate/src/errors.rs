use thiserror::Error;

use seedkit_core::PluginError;
use seedkit_request::{ErrorList, IssueKind, SeedIssue};

use crate::model::SeedReport;

/// Errors emitted by the generation engine.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("invalid configuration: {0}")]
    Config(#[from] seedkit_core::Error),
    /// Setup found problems with the request; nothing was generated.
    #[error("seed request rejected: {0}")]
    Rejected(ErrorList),
    #[error("plugin load failed: {0}")]
    PluginLoad(String),
    #[error("generation failed at iteration {iteration}: {source}")]
    Generation {
        iteration: u64,
        source: PluginError,
        report: Box<SeedReport>,
    },
    /// The persistence writer rejected a record. Records committed before
    /// the failure are listed in the report and are not rolled back.
    #[error("commit failed at iteration {iteration}: {errors}")]
    Commit {
        iteration: u64,
        errors: ErrorList,
        report: Box<SeedReport>,
    },
}

impl SeedError {
    /// Flatten this error into the list of issues reported to the caller.
    pub fn errors(&self) -> ErrorList {
        match self {
            SeedError::Rejected(errors) | SeedError::Commit { errors, .. } => errors.clone(),
            SeedError::Config(err) => ErrorList::from(SeedIssue::new(
                IssueKind::InvalidInput,
                "invalid_config",
                err.to_string(),
            )),
            SeedError::PluginLoad(message) => ErrorList::from(SeedIssue::new(
                IssueKind::PluginLoad,
                "plugin_load_failed",
                message.clone(),
            )),
            SeedError::Generation { source, .. } => ErrorList::from(SeedIssue::new(
                IssueKind::Generation,
                "generation_failed",
                source.to_string(),
            )),
        }
    }

    /// Diagnostic state of an aborted run.
    pub fn report(&self) -> Option<&SeedReport> {
        match self {
            SeedError::Generation { report, .. } | SeedError::Commit { report, .. } => {
                Some(report.as_ref())
            }
            _ => None,
        }
    }
}
