use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{FieldKey, RecordId};

/// Generated value for a field or option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    /// Identities of related records.
    Ids(Vec<RecordId>),
    /// Grid rows keyed by cell name.
    Rows(Vec<BTreeMap<String, String>>),
}

impl FieldValue {
    pub fn empty() -> Self {
        FieldValue::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(value) => value.is_empty(),
            FieldValue::Int(_) => false,
            FieldValue::Ids(ids) => ids.is_empty(),
            FieldValue::Rows(rows) => rows.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_ids(&self) -> Option<&[RecordId]> {
        match self {
            FieldValue::Ids(ids) => Some(ids.as_slice()),
            _ => None,
        }
    }

    /// Flat text rendering used by tabular outputs.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(value) => value.clone(),
            FieldValue::Int(value) => value.to_string(),
            FieldValue::Ids(ids) => ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join("|"),
            FieldValue::Rows(rows) => serde_json::to_string(rows).unwrap_or_default(),
        }
    }
}

/// In-progress record for one iteration, submitted to the persistence writer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordDraft {
    pub author_id: u64,
    pub entry_date: DateTime<Utc>,
    #[serde(flatten)]
    options: BTreeMap<String, FieldValue>,
    #[serde(flatten)]
    fields: BTreeMap<FieldKey, FieldValue>,
}

impl RecordDraft {
    pub fn new(author_id: u64, entry_date: DateTime<Utc>) -> Self {
        Self {
            author_id,
            entry_date,
            options: BTreeMap::new(),
            fields: BTreeMap::new(),
        }
    }

    pub fn set_option(&mut self, name: &str, value: FieldValue) {
        self.options.insert(name.to_string(), value);
    }

    pub fn set_field(&mut self, key: FieldKey, value: FieldValue) {
        self.fields.insert(key, value);
    }

    pub fn option(&self, name: &str) -> Option<&FieldValue> {
        self.options.get(name)
    }

    pub fn field(&self, key: FieldKey) -> Option<&FieldValue> {
        self.fields.get(&key)
    }

    pub fn has_option(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    pub fn options(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.options.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn fields(&self) -> impl Iterator<Item = (FieldKey, &FieldValue)> {
        self.fields.iter().map(|(key, value)| (*key, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_serializes_flat_with_field_keys() {
        let mut draft = RecordDraft::new(1, DateTime::<Utc>::default());
        draft.set_option("status", FieldValue::Text("open".to_string()));
        draft.set_field(FieldKey::Title, FieldValue::Text("Hello".to_string()));
        draft.set_field(FieldKey::Custom(4), FieldValue::Ids(vec![7, 9]));

        let value = serde_json::to_value(&draft).expect("serialize draft");
        assert_eq!(value["status"], "open");
        assert_eq!(value["title"], "Hello");
        assert_eq!(value["field_id_4"], serde_json::json!([7, 9]));
        assert_eq!(value["author_id"], 1);
    }

    #[test]
    fn ids_render_pipe_separated() {
        assert_eq!(FieldValue::Ids(vec![3, 5]).render(), "3|5");
        assert!(FieldValue::empty().is_empty());
    }
}
