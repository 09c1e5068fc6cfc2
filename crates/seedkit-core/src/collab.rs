use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::{RecordId, Schema, SchemaDefinition, SchemaId};
use crate::value::RecordDraft;

/// Source of schema documents.
pub trait SchemaProvider {
    fn get_schema(&self, id: SchemaId) -> Option<SchemaDefinition>;
}

/// Rejection reported by a persistence writer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("commit rejected: {}", .errors.join("; "))]
pub struct CommitError {
    pub errors: Vec<String>,
}

impl CommitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
        }
    }
}

/// Record store that assigns identities to committed drafts.
pub trait PersistenceWriter {
    /// Called once per run before the first commit.
    fn prepare(&mut self, schema: &Schema) -> Result<(), CommitError> {
        let _ = schema;
        Ok(())
    }

    fn commit(&mut self, schema_id: SchemaId, draft: &RecordDraft)
    -> Result<RecordId, CommitError>;
}

/// Already-parsed request values addressed by key.
pub trait RawInput {
    fn get(&self, key: &str) -> Option<&str>;

    /// Value with surrounding whitespace removed, treating empty as absent.
    fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

impl RawInput for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<&str> {
        BTreeMap::get(self, key).map(String::as_str)
    }
}

impl RawInput for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<&str> {
        HashMap::get(self, key).map(String::as_str)
    }
}

/// Schema provider backed by an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct MemorySchemaProvider {
    schemas: BTreeMap<SchemaId, SchemaDefinition>,
}

impl MemorySchemaProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, schema: SchemaDefinition) {
        self.schemas.insert(schema.id, schema);
    }

    pub fn ids(&self) -> impl Iterator<Item = SchemaId> + '_ {
        self.schemas.keys().copied()
    }
}

impl FromIterator<SchemaDefinition> for MemorySchemaProvider {
    fn from_iter<I: IntoIterator<Item = SchemaDefinition>>(iter: I) -> Self {
        let mut provider = Self::new();
        for schema in iter {
            provider.insert(schema);
        }
        provider
    }
}

impl SchemaProvider for MemorySchemaProvider {
    fn get_schema(&self, id: SchemaId) -> Option<SchemaDefinition> {
        self.schemas.get(&id).cloned()
    }
}

/// Record accepted by a [`MemoryWriter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommittedRecord {
    pub record_id: RecordId,
    pub schema_id: SchemaId,
    pub values: serde_json::Value,
}

/// Persistence writer keeping committed records in memory.
///
/// Record ids are assigned sequentially starting at `first_id`.
#[derive(Debug, Clone)]
pub struct MemoryWriter {
    next_id: RecordId,
    records: Vec<CommittedRecord>,
    prepared: Vec<SchemaId>,
}

impl Default for MemoryWriter {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(first_id: RecordId) -> Self {
        Self {
            next_id: first_id,
            records: Vec::new(),
            prepared: Vec::new(),
        }
    }

    pub fn records(&self) -> &[CommittedRecord] {
        &self.records
    }

    pub fn prepared(&self) -> &[SchemaId] {
        &self.prepared
    }
}

impl PersistenceWriter for MemoryWriter {
    fn prepare(&mut self, schema: &Schema) -> Result<(), CommitError> {
        self.prepared.push(schema.id);
        Ok(())
    }

    fn commit(
        &mut self,
        schema_id: SchemaId,
        draft: &RecordDraft,
    ) -> Result<RecordId, CommitError> {
        let values = serde_json::to_value(draft)
            .map_err(|err| CommitError::new(format!("draft serialization failed: {err}")))?;
        let record_id = self.next_id;
        self.next_id += 1;
        self.records.push(CommittedRecord {
            record_id,
            schema_id,
            values,
        });
        Ok(record_id)
    }
}
