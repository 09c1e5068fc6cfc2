use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{FieldId, FieldKey};

/// Whether a field is generated for every record, some records, or none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Populate {
    #[default]
    Off,
    Always,
    Sparse,
}

impl Populate {
    /// Parse a raw population mode; absent or empty input means `off`.
    pub fn parse(raw: Option<&str>) -> Result<Self, String> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Populate::Off),
            Some(value) => value.parse(),
        }
    }

    pub fn is_populated(&self) -> bool {
        !matches!(self, Populate::Off)
    }
}

impl FromStr for Populate {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "off" => Ok(Populate::Off),
            "always" => Ok(Populate::Always),
            "sparse" => Ok(Populate::Sparse),
            other => Err(format!("unknown population mode '{other}'")),
        }
    }
}

impl fmt::Display for Populate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Populate::Off => "off",
            Populate::Always => "always",
            Populate::Sparse => "sparse",
        };
        f.write_str(value)
    }
}

/// Validated configuration of one populated field, reused across iterations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOptions {
    pub field_id: FieldId,
    pub key: FieldKey,
    /// Resolved field type.
    pub field_type: String,
    pub field_name: String,
    pub populate: Populate,
    /// Raw setting values by setting name, copied whether valid or not.
    pub settings: BTreeMap<String, String>,
    /// Count declared by the plugin's settings, if any.
    pub count: Option<u32>,
    /// Plugin-specific configuration parsed from additional raw input.
    pub extra: Value,
}

impl FieldOptions {
    /// Setting value, treating empty strings as absent.
    pub fn setting(&self, name: &str) -> Option<&str> {
        self.settings
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}
