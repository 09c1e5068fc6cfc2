use std::collections::BTreeMap;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use seedkit_core::keys::{cell_key, setting_key};
use seedkit_core::{
    Field, FieldContext, FieldId, FieldTypePlugin, FieldValue, PluginError, Populate, RawInput,
    SchemaId, Setting, SettingsScope,
};

use crate::plugins::lorem;
use crate::plugins::{PluginFactory, count_setting, parse_positive};

const DEFAULT_ROWS: u32 = 3;
const CELL_MAX_WORDS: usize = 4;
const SPARSE_CELL_RATE: f64 = 0.5;

const MATRIX_SETTINGS: &[Setting] = &[Setting::optional("rows").with_count(DEFAULT_ROWS)];

pub fn register(factory: &mut PluginFactory) {
    factory.register_field("matrix", || Box::new(MatrixPlugin));
}

/// Column of the grid selected for generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellPlan {
    pub id: u32,
    pub name: String,
    pub populate: Populate,
}

/// Grid field: rows of text keyed by cell name.
///
/// Every cell holds a short line of plain text whatever its declared type;
/// the resolved cell type only feeds the configuration view.
pub struct MatrixPlugin;

impl FieldTypePlugin for MatrixPlugin {
    fn id(&self) -> &'static str {
        "matrix"
    }

    fn settings(&self) -> &'static [Setting] {
        MATRIX_SETTINGS
    }

    fn get_settings(&self, field_id: FieldId, scope: &SettingsScope<'_>) -> Value {
        let cells = scope
            .schema
            .field(field_id)
            .map(|field| {
                field
                    .cells
                    .iter()
                    .map(|cell| {
                        let resolved = scope.catalog.resolve(&cell.cell_type);
                        json!({
                            "id": cell.id,
                            "name": cell.name,
                            "label": cell.label,
                            "cell_type": cell.cell_type,
                            "resolved_type": resolved.name,
                            "is_unknown": resolved.is_unknown,
                        })
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        json!({ "settings": self.settings(), "cells": cells })
    }

    /// Cell modes come from `..._cell_{id}` keys; an absent mode populates the cell.
    fn handle_extra(
        &self,
        field: &Field,
        schema_id: SchemaId,
        input: &dyn RawInput,
    ) -> Result<Value, PluginError> {
        parse_positive(
            input.get(&setting_key(schema_id, field.id, "rows")),
            "rows",
        )?;
        let mut cells = Vec::new();
        for cell in &field.cells {
            let populate = match input.get_non_empty(&cell_key(schema_id, field.id, cell.id)) {
                None => Populate::Always,
                Some(raw) => Populate::parse(Some(raw)).map_err(|err| {
                    PluginError::InvalidConfig(format!("cell '{}': {err}", cell.name))
                })?,
            };
            if populate.is_populated() {
                cells.push(CellPlan {
                    id: cell.id,
                    name: cell.name.clone(),
                    populate,
                });
            }
        }
        Ok(json!({ "cells": cells }))
    }

    fn generate(
        &mut self,
        ctx: &FieldContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<FieldValue, PluginError> {
        let cells: Vec<CellPlan> = match ctx.options.extra.get("cells") {
            Some(cells) => serde_json::from_value(cells.clone())
                .map_err(|err| PluginError::Generation(format!("invalid cell plan: {err}")))?,
            None => Vec::new(),
        };
        if cells.is_empty() {
            return Ok(FieldValue::Rows(Vec::new()));
        }

        let rows = count_setting(ctx.options, "rows", DEFAULT_ROWS)?;
        let mut out = Vec::new();
        for _ in 0..rows {
            let mut row = BTreeMap::new();
            for cell in &cells {
                let value = if cell.populate == Populate::Sparse
                    && !rng.random_bool(SPARSE_CELL_RATE)
                {
                    String::new()
                } else {
                    let count = rng.random_range(1..=CELL_MAX_WORDS);
                    lorem::words(count, rng).join(" ")
                };
                row.insert(cell.name.clone(), value);
            }
            out.push(row);
        }
        Ok(FieldValue::Rows(out))
    }
}
