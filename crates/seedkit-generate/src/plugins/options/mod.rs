//! Record-level option plugins.

use rand::{Rng, RngCore};
use tracing::debug;

use seedkit_core::{FieldValue, OptionPlugin, PluginError, RecordDraft, RecordId};

use crate::plugins::PluginFactory;

const STATUS_OPEN: &str = "open";
const STATUS_CLOSED: &str = "closed";

pub fn register(factory: &mut PluginFactory) {
    factory.register_option("status", || Box::new(StatusOption));
    factory.register_option("structure", || Box::new(StructureOption::default()));
}

/// Entry status: a literal value, `random` (open or closed), or `default` (left unset).
pub struct StatusOption;

impl OptionPlugin for StatusOption {
    fn id(&self) -> &'static str {
        "status"
    }

    fn generate(
        &mut self,
        raw_value: &str,
        rng: &mut dyn RngCore,
    ) -> Result<Option<FieldValue>, PluginError> {
        let status = match raw_value.trim() {
            "" | "default" => return Ok(None),
            "random" => {
                if rng.random_bool(0.5) {
                    STATUS_OPEN
                } else {
                    STATUS_CLOSED
                }
            }
            literal => literal,
        };
        Ok(Some(FieldValue::Text(status.to_string())))
    }
}

/// Where a committed record was placed in the page tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub record_id: RecordId,
    pub parent_id: Option<RecordId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParentMode {
    Fixed(RecordId),
    Nested,
}

impl ParentMode {
    fn parse(raw: &str) -> Result<Self, PluginError> {
        match raw.trim() {
            "nested" => Ok(ParentMode::Nested),
            other => other.parse::<RecordId>().map(ParentMode::Fixed).map_err(|_| {
                PluginError::PostSave(format!(
                    "structure parent must be a record id or 'nested', got '{other}'"
                ))
            }),
        }
    }
}

/// Page-tree placement. Needs the record id, so all work happens after commit.
#[derive(Debug, Default)]
pub struct StructureOption {
    last_committed: Option<RecordId>,
    placements: Vec<Placement>,
}

impl StructureOption {
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }
}

impl OptionPlugin for StructureOption {
    fn id(&self) -> &'static str {
        "structure"
    }

    fn generate(
        &mut self,
        _raw_value: &str,
        _rng: &mut dyn RngCore,
    ) -> Result<Option<FieldValue>, PluginError> {
        Ok(None)
    }

    fn post_save(
        &mut self,
        record_id: RecordId,
        _draft: &RecordDraft,
        raw_value: &str,
    ) -> Result<(), PluginError> {
        let parent_id = match ParentMode::parse(raw_value)? {
            ParentMode::Fixed(parent) => Some(parent),
            ParentMode::Nested => self.last_committed,
        };
        debug!(record_id, parent_id = ?parent_id, "record placed");
        self.placements.push(Placement {
            record_id,
            parent_id,
        });
        self.last_committed = Some(record_id);
        Ok(())
    }
}
