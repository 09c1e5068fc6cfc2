use rand::RngCore;
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::collab::RawInput;
use crate::options::FieldOptions;
use crate::schema::{Field, FieldId, RecordId, Schema, SchemaId};
use crate::types::TypeCatalog;
use crate::value::{FieldValue, RecordDraft};

/// Errors raised by field-type and option plugins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("generation failed: {0}")]
    Generation(String),
    #[error("post-save failed: {0}")]
    PostSave(String),
}

/// Configuration value declared by a field-type plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Setting {
    pub name: &'static str,
    pub required: bool,
    /// Count propagated into [`FieldOptions::count`] whenever this setting is declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

impl Setting {
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
            count: None,
        }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            required: false,
            count: None,
        }
    }

    pub const fn with_count(self, count: u32) -> Self {
        Self {
            count: Some(count),
            ..self
        }
    }
}

/// Per-call context handed to a field-type plugin.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    /// Zero-based index of the record being generated.
    pub iteration: u64,
    pub field_id: FieldId,
    pub schema_id: SchemaId,
    pub field: &'a Field,
    pub options: &'a FieldOptions,
}

/// Data available to a plugin when building its configuration view.
#[derive(Debug, Clone, Copy)]
pub struct SettingsScope<'a> {
    pub schema: &'a Schema,
    pub catalog: &'a TypeCatalog,
}

/// Generator, post-save hook, and settings provider for one field type.
pub trait FieldTypePlugin {
    /// Type name this plugin generates.
    fn id(&self) -> &'static str;

    /// Declared settings, in the order they are validated.
    fn settings(&self) -> &'static [Setting] {
        &[]
    }

    /// Settings data for a configuration view of `field_id`.
    fn get_settings(&self, field_id: FieldId, scope: &SettingsScope<'_>) -> Value {
        let _ = (field_id, scope);
        json!({ "settings": self.settings() })
    }

    /// Parse raw input beyond the declared settings into opaque extra data.
    fn handle_extra(
        &self,
        field: &Field,
        schema_id: SchemaId,
        input: &dyn RawInput,
    ) -> Result<Value, PluginError> {
        let _ = (field, schema_id, input);
        Ok(Value::Null)
    }

    fn generate(
        &mut self,
        ctx: &FieldContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<FieldValue, PluginError>;

    /// Follow-up work once the record has its identity.
    fn post_save(
        &mut self,
        record_id: RecordId,
        draft: &RecordDraft,
        ctx: &FieldContext<'_>,
    ) -> Result<(), PluginError> {
        let _ = (record_id, draft, ctx);
        Ok(())
    }
}

/// Generator and post-save hook for one record-level option.
pub trait OptionPlugin {
    fn id(&self) -> &'static str;

    /// Produce the option value, or `None` to leave the draft untouched.
    fn generate(
        &mut self,
        raw_value: &str,
        rng: &mut dyn RngCore,
    ) -> Result<Option<FieldValue>, PluginError>;

    fn post_save(
        &mut self,
        record_id: RecordId,
        draft: &RecordDraft,
        raw_value: &str,
    ) -> Result<(), PluginError> {
        let _ = (record_id, draft, raw_value);
        Ok(())
    }
}

/// Lookup of loaded field-type plugins by resolved type name.
pub trait PluginSource {
    fn field_plugin(&self, type_name: &str) -> Option<&dyn FieldTypePlugin>;
}
