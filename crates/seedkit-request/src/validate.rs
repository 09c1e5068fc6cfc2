use std::collections::BTreeMap;

use seedkit_core::keys::{COUNT_KEY, SCHEMA_KEY, option_key, populate_key, setting_key};
use seedkit_core::{
    Field, FieldOptions, FieldTypePlugin, PluginSource, Populate, RawInput, ResolvedType, Schema,
    SchemaId, TypeCatalog,
};

use crate::errors::{ErrorList, IssueKind, SeedIssue};
use crate::model::ChannelOptions;

/// Read the target schema id.
pub fn parse_schema_id(input: &dyn RawInput) -> Result<SchemaId, SeedIssue> {
    let Some(raw) = input.get_non_empty(SCHEMA_KEY) else {
        return Err(
            SeedIssue::invalid_input("schema_id_missing", "no schema selected").with_key(SCHEMA_KEY),
        );
    };

    raw.parse::<SchemaId>().map_err(|_| {
        SeedIssue::invalid_input(
            "schema_id_invalid",
            format!("schema id '{raw}' is not a valid identifier"),
        )
        .with_key(SCHEMA_KEY)
    })
}

/// Read the number of records to generate; it must be a positive integer.
pub fn parse_seed_count(input: &dyn RawInput) -> Result<u64, SeedIssue> {
    let raw = input.get_non_empty(COUNT_KEY).unwrap_or_default();

    match raw.parse::<u64>() {
        Ok(0) => Err(SeedIssue::invalid_input(
            "seed_count_not_positive",
            "seed count must be greater than zero",
        )
        .with_key(COUNT_KEY)),
        Ok(count) => Ok(count),
        Err(_) if raw.parse::<f64>().is_ok_and(f64::is_finite) => Err(SeedIssue::invalid_input(
            "seed_count_not_positive",
            format!("seed count '{raw}' must be a positive whole number"),
        )
        .with_key(COUNT_KEY)),
        Err(_) => Err(SeedIssue::invalid_input(
            "seed_count_not_numeric",
            "seed count must be numeric",
        )
        .with_key(COUNT_KEY)),
    }
}

/// Collect the raw values of enabled record options.
///
/// Options with an absent or empty value are skipped; this stage never fails.
pub fn collect_options(
    schema_id: SchemaId,
    known_options: &[String],
    input: &dyn RawInput,
) -> ChannelOptions {
    let mut options = ChannelOptions::new();
    for name in known_options {
        if let Some(value) = input.get_non_empty(&option_key(schema_id, name)) {
            options.insert(name.as_str(), value);
        }
    }
    options
}

/// Build validated options for one populated field.
///
/// Every declared setting is copied whether valid or not; a required setting
/// with an empty value adds one issue.
pub fn validate_field(
    schema_id: SchemaId,
    field: &Field,
    resolved: &ResolvedType,
    populate: Populate,
    plugin: &dyn FieldTypePlugin,
    input: &dyn RawInput,
) -> (FieldOptions, ErrorList) {
    let mut errors = ErrorList::new();
    let mut settings = BTreeMap::new();
    let mut count = None;

    for setting in plugin.settings() {
        let key = setting_key(schema_id, field.id, setting.name);
        let value = input.get(&key).unwrap_or_default();

        if setting.required && value.trim().is_empty() {
            errors.push(
                SeedIssue::invalid_input(
                    "missing_required_value",
                    format!(
                        "missing required value '{}' for field '{}'",
                        setting.name, field.label
                    ),
                )
                .with_key(key),
            );
        }

        settings.insert(setting.name.to_string(), value.to_string());
        if let Some(declared) = setting.count {
            count = Some(declared);
        }
    }

    let extra = match plugin.handle_extra(field, schema_id, input) {
        Ok(extra) => extra,
        Err(err) => {
            errors.push(
                SeedIssue::invalid_input(
                    "invalid_field_config",
                    format!("field '{}': {err}", field.label),
                )
                .with_key(populate_key(schema_id, field.id)),
            );
            serde_json::Value::Null
        }
    };

    let options = FieldOptions {
        field_id: field.id,
        key: field.key(),
        field_type: resolved.name.clone(),
        field_name: field.name.clone(),
        populate,
        settings,
        count,
        extra,
    };

    (options, errors)
}

/// Validate every field the request populates, in schema order.
pub fn collect_field_options(
    schema: &Schema,
    catalog: &TypeCatalog,
    plugins: &dyn PluginSource,
    input: &dyn RawInput,
) -> (Vec<FieldOptions>, ErrorList) {
    let mut errors = ErrorList::new();
    let mut fields = Vec::new();

    for field in &schema.fields {
        let key = populate_key(schema.id, field.id);
        let populate = match Populate::parse(input.get(&key)) {
            Ok(populate) => populate,
            Err(message) => {
                errors.push(
                    SeedIssue::invalid_input(
                        "invalid_populate_mode",
                        format!("field '{}': {message}", field.label),
                    )
                    .with_key(key),
                );
                continue;
            }
        };

        if !populate.is_populated() {
            continue;
        }

        let resolved = catalog.resolve(&field.field_type);
        let Some(plugin) = plugins.field_plugin(&resolved.name) else {
            errors.push(SeedIssue::new(
                IssueKind::PluginLoad,
                "plugin_missing",
                format!(
                    "no plugin loaded for type '{}' of field '{}'",
                    resolved.name, field.label
                ),
            ));
            continue;
        };

        let (options, field_errors) =
            validate_field(schema.id, field, &resolved, populate, plugin, input);
        errors.merge(field_errors);
        fields.push(options);
    }

    (fields, errors)
}
