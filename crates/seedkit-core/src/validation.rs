use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::schema::{SchemaDefinition, TITLE_FIELD_ID, TITLE_FIELD_NAME};

/// Validate internal consistency of a schema document.
///
/// This checks:
/// - the reserved title id and name are not reused by custom fields
/// - duplicate field ids and names
/// - empty field types
/// - duplicate cell ids and names within a grid field
pub fn validate_definition(schema: &SchemaDefinition) -> Result<()> {
    let mut ids = BTreeSet::new();
    let mut names = BTreeSet::new();

    for field in &schema.fields {
        if field.id == TITLE_FIELD_ID {
            return Err(Error::InvalidSchema(format!(
                "field id {TITLE_FIELD_ID} is reserved for the title: {}.{}",
                schema.id, field.name
            )));
        }

        if field.name == TITLE_FIELD_NAME {
            return Err(Error::InvalidSchema(format!(
                "field name '{TITLE_FIELD_NAME}' is reserved: {}.{}",
                schema.id, field.id
            )));
        }

        if !ids.insert(field.id) {
            return Err(Error::InvalidSchema(format!(
                "duplicate field id: {}.{}",
                schema.id, field.id
            )));
        }

        if !names.insert(field.name.as_str()) {
            return Err(Error::InvalidSchema(format!(
                "duplicate field name: {}.{}",
                schema.id, field.name
            )));
        }

        if field.field_type.trim().is_empty() {
            return Err(Error::InvalidSchema(format!(
                "field type is empty: {}.{}",
                schema.id, field.name
            )));
        }

        let mut cell_ids = BTreeSet::new();
        let mut cell_names = BTreeSet::new();
        for cell in &field.cells {
            if !cell_ids.insert(cell.id) {
                return Err(Error::InvalidSchema(format!(
                    "duplicate cell id: {}.{}.{}",
                    schema.id, field.name, cell.id
                )));
            }
            if !cell_names.insert(cell.name.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "duplicate cell name: {}.{}.{}",
                    schema.id, field.name, cell.name
                )));
            }
        }
    }

    Ok(())
}
