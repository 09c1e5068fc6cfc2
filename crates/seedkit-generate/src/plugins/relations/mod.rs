//! Plugins that link generated records to other records.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use serde_json::{Value, json};
use tracing::debug;

use seedkit_core::keys::setting_key;
use seedkit_core::{
    Field, FieldContext, FieldId, FieldTypePlugin, FieldValue, PluginError, RawInput, RecordDraft,
    RecordId, SchemaId, Setting, SettingsScope,
};

use crate::plugins::{PluginFactory, count_setting, parse_positive};

const DEFAULT_MAX_RELATIONS: u32 = 3;

const PLAYA_SETTINGS: &[Setting] = &[
    Setting::required("related_ids"),
    Setting::optional("max_relations").with_count(DEFAULT_MAX_RELATIONS),
];

pub fn register(factory: &mut PluginFactory) {
    factory.register_field("playa", || Box::new(PlayaPlugin::default()));
    factory.register_field("structure", || Box::new(StructureFieldPlugin::default()));
}

/// Links between a committed record and its related records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationLinks {
    pub record_id: RecordId,
    pub field_id: FieldId,
    pub related: Vec<RecordId>,
}

/// Relationship field: picks related records from a candidate id list.
#[derive(Debug, Default)]
pub struct PlayaPlugin {
    links: Vec<RelationLinks>,
}

impl PlayaPlugin {
    pub fn links(&self) -> &[RelationLinks] {
        &self.links
    }
}

fn parse_related_ids(raw: Option<&str>) -> Result<Vec<RecordId>, PluginError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    let mut ids = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        let id = part.parse::<RecordId>().map_err(|_| {
            PluginError::InvalidConfig(format!("related_ids contains invalid record id '{part}'"))
        })?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

fn related_ids(extra: &Value) -> Vec<RecordId> {
    extra
        .get("related_ids")
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(Value::as_u64).collect())
        .unwrap_or_default()
}

impl FieldTypePlugin for PlayaPlugin {
    fn id(&self) -> &'static str {
        "playa"
    }

    fn settings(&self) -> &'static [Setting] {
        PLAYA_SETTINGS
    }

    fn get_settings(&self, field_id: FieldId, scope: &SettingsScope<'_>) -> Value {
        json!({
            "settings": self.settings(),
            "schema_id": scope.schema.id,
            "field": scope.schema.field(field_id).map(|field| field.name.as_str()),
        })
    }

    /// Parses the candidate ids; an empty value is reported as a missing setting.
    fn handle_extra(
        &self,
        field: &Field,
        schema_id: SchemaId,
        input: &dyn RawInput,
    ) -> Result<Value, PluginError> {
        parse_positive(
            input.get(&setting_key(schema_id, field.id, "max_relations")),
            "max_relations",
        )?;
        let ids = parse_related_ids(input.get_non_empty(&setting_key(
            schema_id,
            field.id,
            "related_ids",
        )))?;
        Ok(json!({ "related_ids": ids }))
    }

    fn generate(
        &mut self,
        ctx: &FieldContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<FieldValue, PluginError> {
        let mut candidates = related_ids(&ctx.options.extra);
        if candidates.is_empty() {
            return Ok(FieldValue::Ids(Vec::new()));
        }
        let max = count_setting(ctx.options, "max_relations", DEFAULT_MAX_RELATIONS)? as usize;
        let take = rng.random_range(1..=max.min(candidates.len()));
        candidates.shuffle(rng);
        candidates.truncate(take);
        Ok(FieldValue::Ids(candidates))
    }

    fn post_save(
        &mut self,
        record_id: RecordId,
        draft: &RecordDraft,
        ctx: &FieldContext<'_>,
    ) -> Result<(), PluginError> {
        let Some(value) = draft.field(ctx.field.key()) else {
            return Ok(());
        };
        if value.is_empty() {
            return Ok(());
        }
        let related = value.as_ids().ok_or_else(|| {
            PluginError::PostSave(format!(
                "field '{}' does not hold record ids",
                ctx.field.name
            ))
        })?;
        debug!(
            record_id,
            field_id = ctx.field_id,
            related = related.len(),
            "relations linked"
        );
        self.links.push(RelationLinks {
            record_id,
            field_id: ctx.field_id,
            related: related.to_vec(),
        });
        Ok(())
    }
}

/// Page link to a record committed earlier in the same run.
#[derive(Debug, Default)]
pub struct StructureFieldPlugin {
    committed: Vec<RecordId>,
}

impl FieldTypePlugin for StructureFieldPlugin {
    fn id(&self) -> &'static str {
        "structure"
    }

    fn generate(
        &mut self,
        _ctx: &FieldContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<FieldValue, PluginError> {
        if self.committed.is_empty() {
            return Ok(FieldValue::Ids(Vec::new()));
        }
        let idx = rng.random_range(0..self.committed.len());
        Ok(FieldValue::Ids(vec![self.committed[idx]]))
    }

    fn post_save(
        &mut self,
        record_id: RecordId,
        _draft: &RecordDraft,
        _ctx: &FieldContext<'_>,
    ) -> Result<(), PluginError> {
        self.committed.push(record_id);
        Ok(())
    }
}
