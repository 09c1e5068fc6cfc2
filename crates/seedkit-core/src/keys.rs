//! Raw input key composition.
//!
//! Every value the engine reads from a [`RawInput`](crate::RawInput) is
//! addressed by one of these keys.

use crate::schema::{FieldId, SchemaId};

/// Key holding the target schema id.
pub const SCHEMA_KEY: &str = "seed_channel";
/// Key holding the number of records to generate.
pub const COUNT_KEY: &str = "seed_count";

/// Raw value of a record option.
pub fn option_key(schema_id: SchemaId, option: &str) -> String {
    format!("seed_option_{schema_id}_{option}")
}

/// Population mode of a field.
pub fn populate_key(schema_id: SchemaId, field_id: FieldId) -> String {
    format!("seed_field_{schema_id}_{field_id}")
}

/// Raw value of a declared plugin setting.
pub fn setting_key(schema_id: SchemaId, field_id: FieldId, setting: &str) -> String {
    format!("{}_{setting}", populate_key(schema_id, field_id))
}

/// Population mode of a grid cell.
pub fn cell_key(schema_id: SchemaId, field_id: FieldId, cell_id: u32) -> String {
    setting_key(schema_id, field_id, &format!("cell_{cell_id}"))
}
