use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::validation::validate_definition;

/// Identifier of a schema (one record shape).
pub type SchemaId = u64;
/// Identifier of a field within a schema. `0` is reserved for the title.
pub type FieldId = u32;
/// Identity assigned to a record by the persistence collaborator.
pub type RecordId = u64;

pub const TITLE_FIELD_ID: FieldId = 0;
pub const TITLE_FIELD_NAME: &str = "title";
pub const TITLE_FIELD_LABEL: &str = "Title";
pub const TITLE_MAX_LENGTH: u32 = 100;
pub const TITLE_FIELD_TYPE: &str = "text";

/// Schema document as stored by a schema provider.
///
/// Only custom fields are listed; the title field is synthesized when the
/// document is resolved into a [`Schema`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SchemaDefinition {
    pub id: SchemaId,
    pub title: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

/// Custom field as stored by a schema provider.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FieldDefinition {
    pub id: FieldId,
    pub label: String,
    pub name: String,
    /// Declared field type, before catalog resolution.
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub max_length: Option<u32>,
    /// Caller-visible sort order.
    #[serde(default)]
    pub order: i32,
    /// Column definitions for grid field types.
    #[serde(default)]
    pub cells: Vec<Cell>,
}

/// Column of a grid field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Cell {
    pub id: u32,
    pub name: String,
    pub label: String,
    pub cell_type: String,
}

/// Resolved schema: ordered fields with the title at position 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub id: SchemaId,
    pub title: String,
    pub fields: Vec<Field>,
}

/// Field of a resolved schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    pub label: String,
    pub name: String,
    pub field_type: String,
    pub required: bool,
    pub max_length: Option<u32>,
    pub is_title: bool,
    #[serde(default)]
    pub cells: Vec<Cell>,
}

impl Field {
    /// The implicit title field every schema carries.
    pub fn title() -> Self {
        Self {
            id: TITLE_FIELD_ID,
            label: TITLE_FIELD_LABEL.to_string(),
            name: TITLE_FIELD_NAME.to_string(),
            field_type: TITLE_FIELD_TYPE.to_string(),
            required: true,
            max_length: Some(TITLE_MAX_LENGTH),
            is_title: true,
            cells: Vec::new(),
        }
    }

    pub fn key(&self) -> FieldKey {
        FieldKey::for_id(self.id)
    }
}

impl From<FieldDefinition> for Field {
    fn from(definition: FieldDefinition) -> Self {
        Self {
            id: definition.id,
            label: definition.label,
            name: definition.name,
            field_type: definition.field_type,
            required: definition.required,
            max_length: definition.max_length,
            is_title: false,
            cells: definition.cells,
        }
    }
}

impl Schema {
    /// Validate a schema document and resolve it into an ordered schema.
    ///
    /// Custom fields are sorted by their sort order (ties keep document
    /// order) and the title field is inserted at position 0.
    pub fn from_definition(definition: SchemaDefinition) -> Result<Self> {
        validate_definition(&definition)?;

        let mut definitions = definition.fields;
        definitions.sort_by_key(|field| field.order);

        let mut fields = Vec::with_capacity(definitions.len() + 1);
        fields.push(Field::title());
        fields.extend(definitions.into_iter().map(Field::from));

        Ok(Self {
            id: definition.id,
            title: definition.title,
            fields,
        })
    }

    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|field| field.id == id)
    }

    pub fn title_field(&self) -> Result<&Field> {
        self.fields
            .first()
            .filter(|field| field.is_title)
            .ok_or_else(|| Error::InvalidSchema(format!("schema {} has no title field", self.id)))
    }
}

/// Draft key of a field: the title or a custom field id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    Title,
    Custom(FieldId),
}

impl FieldKey {
    pub fn for_id(id: FieldId) -> Self {
        if id == TITLE_FIELD_ID {
            FieldKey::Title
        } else {
            FieldKey::Custom(id)
        }
    }

    pub fn field_id(&self) -> FieldId {
        match self {
            FieldKey::Title => TITLE_FIELD_ID,
            FieldKey::Custom(id) => *id,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Title => f.write_str(TITLE_FIELD_NAME),
            FieldKey::Custom(id) => write!(f, "field_id_{id}"),
        }
    }
}

impl FromStr for FieldKey {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        if value == TITLE_FIELD_NAME {
            return Ok(FieldKey::Title);
        }
        value
            .strip_prefix("field_id_")
            .and_then(|id| id.parse::<FieldId>().ok())
            .filter(|id| *id != TITLE_FIELD_ID)
            .map(FieldKey::Custom)
            .ok_or_else(|| Error::InvalidSchema(format!("invalid field key '{value}'")))
    }
}

impl Serialize for FieldKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
