//! Data handed to configuration views of fields and options.

use serde::Serialize;
use serde_json::Value;

use seedkit_core::{Cell, Field, FieldId, SchemaId, SchemaProvider, SettingsScope};
use seedkit_request::ErrorList;

use crate::engine::SeedEngine;
use crate::errors::SeedError;
use crate::resolve::resolve_schema;

/// View data for one field, or one cell of a grid field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldViewContext {
    pub schema_id: SchemaId,
    pub field_id: FieldId,
    pub field: Field,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell: Option<Cell>,
    pub resolved_type: String,
    pub is_unknown: bool,
    pub is_overridden: bool,
    pub is_cell: bool,
    /// Plugin settings data; an empty array unless the type needs settings.
    pub settings: Value,
}

/// View data for one record option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionViewContext {
    pub schema_id: SchemaId,
    pub option: String,
}

impl SeedEngine {
    /// Resolve `field_type` and, for settings-bearing types, ask the plugin
    /// for its settings view.
    pub fn field_view_context(
        &self,
        schemas: &dyn SchemaProvider,
        field_type: &str,
        schema_id: SchemaId,
        field_id: FieldId,
        field: &Field,
        cell: Option<&Cell>,
    ) -> Result<FieldViewContext, SeedError> {
        let catalog = self.catalog();
        let resolved = catalog.resolve(field_type);

        let settings = if catalog.needs_settings(&resolved.name) {
            let schema = resolve_schema(schemas, schema_id)
                .map_err(|issue| SeedError::Rejected(ErrorList::from(issue)))?;
            let plugin = self.factory().create_field(&resolved.name).ok_or_else(|| {
                SeedError::PluginLoad(format!(
                    "no field plugin registered for type '{}'",
                    resolved.name
                ))
            })?;
            plugin.get_settings(
                field_id,
                &SettingsScope {
                    schema: &schema,
                    catalog,
                },
            )
        } else {
            Value::Array(Vec::new())
        };

        Ok(FieldViewContext {
            schema_id,
            field_id,
            field: field.clone(),
            cell: cell.cloned(),
            resolved_type: resolved.name,
            is_unknown: resolved.is_unknown,
            is_overridden: resolved.is_overridden,
            is_cell: cell.is_some(),
            settings,
        })
    }

    /// `None` when no option type is given.
    pub fn option_view_context(
        &self,
        option_type: Option<&str>,
        schema_id: SchemaId,
        option: &str,
    ) -> Option<OptionViewContext> {
        option_type
            .map(str::trim)
            .filter(|ty| !ty.is_empty())
            .map(|_| OptionViewContext {
                schema_id,
                option: option.to_string(),
            })
    }
}
