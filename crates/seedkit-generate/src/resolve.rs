use std::collections::BTreeSet;

use seedkit_core::{ResolvedType, Schema, SchemaId, SchemaProvider, TypeCatalog};
use seedkit_request::{IssueKind, SeedIssue};

/// Fetch a schema document and resolve it, title field included.
pub fn resolve_schema(
    provider: &dyn SchemaProvider,
    schema_id: SchemaId,
) -> Result<Schema, SeedIssue> {
    let definition = provider.get_schema(schema_id).ok_or_else(|| {
        SeedIssue::new(
            IssueKind::UnknownSchema,
            "unknown_schema",
            format!("schema {schema_id} not found"),
        )
    })?;

    Schema::from_definition(definition).map_err(|err| {
        SeedIssue::invalid_input("invalid_schema", format!("schema {schema_id}: {err}"))
    })
}

/// Resolve the effective type of every field of a schema, in schema order.
pub fn resolve_field_types(schema: &Schema, catalog: &TypeCatalog) -> Vec<ResolvedType> {
    schema
        .fields
        .iter()
        .map(|field| catalog.resolve(&field.field_type))
        .collect()
}

/// Distinct resolved types referenced by a schema.
pub fn referenced_types(resolved: &[ResolvedType]) -> BTreeSet<String> {
    resolved.iter().map(|ty| ty.name.clone()).collect()
}
