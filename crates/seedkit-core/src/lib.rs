//! Core contracts and helpers for seedkit.
//!
//! This crate defines the schema types, the field-type catalog, the plugin
//! capability traits, and the collaborator contracts shared by the request
//! validator, the generation engine, and the CLI.

pub mod collab;
pub mod error;
pub mod keys;
pub mod options;
pub mod plugin;
pub mod schema;
pub mod types;
pub mod validation;
pub mod value;

pub use collab::{
    CommitError, CommittedRecord, MemorySchemaProvider, MemoryWriter, PersistenceWriter, RawInput,
    SchemaProvider,
};
pub use error::{Error, Result};
pub use options::{FieldOptions, Populate};
pub use plugin::{
    FieldContext, FieldTypePlugin, OptionPlugin, PluginError, PluginSource, Setting, SettingsScope,
};
pub use schema::{
    Cell, Field, FieldDefinition, FieldId, FieldKey, RecordId, Schema, SchemaDefinition, SchemaId,
};
pub use types::{ResolvedType, TypeCatalog};
pub use validation::validate_definition;
pub use value::{FieldValue, RecordDraft};

/// Current contract version for schema documents.
pub const SCHEMA_VERSION: &str = "0.1";
