use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use jsonschema::JSONSchema;
use serde_json::Value;

use seedkit_core::{MemorySchemaProvider, SchemaDefinition};

use crate::CliError;

/// JSON Schema of a schema document file.
pub fn schema_document_schema() -> Result<Value, CliError> {
    let schema = schemars::schema_for!(Vec<SchemaDefinition>);
    Ok(serde_json::to_value(schema)?)
}

pub fn load_schemas(path: &Path) -> Result<MemorySchemaProvider, CliError> {
    let content = std::fs::read_to_string(path)?;
    parse_schemas(&content)
}

/// Parse a schema document: one schema object or an array of them.
pub fn parse_schemas(content: &str) -> Result<MemorySchemaProvider, CliError> {
    let document = match serde_json::from_str::<Value>(content)? {
        Value::Array(items) => Value::Array(items),
        single => Value::Array(vec![single]),
    };

    let json_schema = schema_document_schema()?;
    let compiled = JSONSchema::compile(&json_schema)
        .map_err(|err| CliError::InvalidSchemas(vec![err.to_string()]))?;
    if let Err(errors) = compiled.validate(&document) {
        let issues = errors
            .map(|error| format!("{}: {error}", pointer_or_root(&error.instance_path.to_string())))
            .collect();
        return Err(CliError::InvalidSchemas(issues));
    }

    let definitions: Vec<SchemaDefinition> = serde_json::from_value(document)?;
    let mut seen = BTreeSet::new();
    for definition in &definitions {
        if !seen.insert(definition.id) {
            return Err(CliError::InvalidSchemas(vec![format!(
                "schema id {} is defined more than once",
                definition.id
            )]));
        }
    }
    Ok(definitions.into_iter().collect())
}

fn pointer_or_root(pointer: &str) -> &str {
    if pointer.is_empty() { "/" } else { pointer }
}

/// Load raw request values, then apply `key=value` overrides in order.
pub fn load_input(
    path: Option<&Path>,
    overrides: &[String],
) -> Result<BTreeMap<String, String>, CliError> {
    let mut input = match path {
        Some(path) => parse_input(&std::fs::read_to_string(path)?)?,
        None => BTreeMap::new(),
    };
    for raw in overrides {
        let (key, value) = parse_assignment(raw).ok_or_else(|| {
            CliError::InvalidInput(format!("--set expects key=value, got '{raw}'"))
        })?;
        input.insert(key, value);
    }
    Ok(input)
}

/// Parse a flat JSON object or `key=value` lines (`#` starts a comment line).
pub fn parse_input(content: &str) -> Result<BTreeMap<String, String>, CliError> {
    if content.trim_start().starts_with('{') {
        return parse_json_input(content);
    }

    let mut input = BTreeMap::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = parse_assignment(line).ok_or_else(|| {
            CliError::InvalidInput(format!("line {}: expected key=value", idx + 1))
        })?;
        input.insert(key, value);
    }
    Ok(input)
}

fn parse_json_input(content: &str) -> Result<BTreeMap<String, String>, CliError> {
    let Value::Object(map) = serde_json::from_str::<Value>(content)? else {
        return Err(CliError::InvalidInput(
            "input must be a JSON object".to_string(),
        ));
    };

    let mut input = BTreeMap::new();
    for (key, value) in map {
        let value = match value {
            Value::Null => continue,
            Value::String(value) => value,
            Value::Bool(value) => value.to_string(),
            Value::Number(value) => value.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(CliError::InvalidInput(format!(
                    "input value for '{key}' must be a string, number, or boolean"
                )));
            }
        };
        input.insert(key, value);
    }
    Ok(input)
}

fn parse_assignment(raw: &str) -> Option<(String, String)> {
    let (key, value) = raw.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), value.trim().to_string()))
}
