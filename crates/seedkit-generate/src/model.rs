use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use seedkit_core::{Error, RecordId, SchemaId, TypeCatalog};
use seedkit_request::{ErrorList, SeedIssue};

/// Options for the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedOptions {
    /// Seed for the run's random generator; random when absent.
    pub rng_seed: Option<u64>,
    /// Probability that a `sparse` field is generated for a record.
    pub sparse_rate: f64,
    /// Author recorded on every draft.
    pub author_id: u64,
    /// Known field types, overrides, fallback, and record options.
    pub catalog: TypeCatalog,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            rng_seed: None,
            sparse_rate: 0.5,
            author_id: 1,
            catalog: TypeCatalog::default(),
        }
    }
}

impl SeedOptions {
    pub fn validate(&self) -> Result<(), Error> {
        if !(0.0..=1.0).contains(&self.sparse_rate) {
            return Err(Error::InvalidConfig(format!(
                "sparse_rate must be between 0 and 1, got {}",
                self.sparse_rate
            )));
        }
        self.catalog.validate()
    }
}

/// Report for a seed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedReport {
    pub run_id: String,
    pub schema_id: SchemaId,
    pub requested: u64,
    /// Seed the run's random generator was created from.
    pub rng_seed: u64,
    /// Record ids in commit order.
    pub committed: Vec<RecordId>,
    pub option_usage: BTreeMap<String, u64>,
    pub generator_usage: BTreeMap<String, u64>,
    pub sparse_skipped: u64,
    pub post_save_failures: ErrorList,
    pub duration_ms: u64,
}

impl SeedReport {
    pub fn new(run_id: String, schema_id: SchemaId, requested: u64) -> Self {
        Self {
            run_id,
            schema_id,
            requested,
            rng_seed: 0,
            committed: Vec::new(),
            option_usage: BTreeMap::new(),
            generator_usage: BTreeMap::new(),
            sparse_skipped: 0,
            post_save_failures: ErrorList::new(),
            duration_ms: 0,
        }
    }

    pub fn record_option_usage(&mut self, name: &str) {
        *self.option_usage.entry(name.to_string()).or_insert(0) += 1;
    }

    pub fn record_generator_usage(&mut self, id: &str) {
        *self.generator_usage.entry(id.to_string()).or_insert(0) += 1;
    }

    pub fn record_sparse_skip(&mut self) {
        self.sparse_skipped += 1;
    }

    pub fn record_post_save_failure(&mut self, issue: SeedIssue) {
        self.post_save_failures.push(issue);
    }

    pub fn is_complete(&self) -> bool {
        self.committed.len() as u64 == self.requested
    }
}
