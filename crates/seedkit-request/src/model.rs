use serde::{Deserialize, Serialize};

use seedkit_core::{FieldId, FieldOptions, SchemaId};

/// Raw values of the record options enabled for a run, in insertion order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelOptions {
    entries: Vec<(String, String)>,
}

impl ChannelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an option value, keeping its first position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fully validated unit of work handed to the generation engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeedRequest {
    schema_id: SchemaId,
    seed_count: u64,
    field_options: Vec<FieldOptions>,
    channel_options: ChannelOptions,
}

impl SeedRequest {
    /// `field_options` must be in schema order.
    pub fn new(
        schema_id: SchemaId,
        seed_count: u64,
        field_options: Vec<FieldOptions>,
        channel_options: ChannelOptions,
    ) -> Self {
        Self {
            schema_id,
            seed_count,
            field_options,
            channel_options,
        }
    }

    pub fn schema_id(&self) -> SchemaId {
        self.schema_id
    }

    pub fn seed_count(&self) -> u64 {
        self.seed_count
    }

    pub fn field_options(&self) -> &[FieldOptions] {
        &self.field_options
    }

    pub fn field(&self, field_id: FieldId) -> Option<&FieldOptions> {
        self.field_options
            .iter()
            .find(|options| options.field_id == field_id)
    }

    pub fn channel_options(&self) -> &ChannelOptions {
        &self.channel_options
    }
}
