use rand::{Rng, RngCore};
use serde_json::Value;

use seedkit_core::keys::setting_key;
use seedkit_core::{
    Field, FieldContext, FieldTypePlugin, FieldValue, PluginError, RawInput, SchemaId, Setting,
};

use crate::plugins::lorem;
use crate::plugins::{PluginFactory, count_setting, parse_positive};

const DEFAULT_MIN_WORDS: u32 = 3;
const DEFAULT_MAX_WORDS: u32 = 8;
const DEFAULT_PARAGRAPHS: u32 = 3;

const TEXT_SETTINGS: &[Setting] = &[Setting::optional("min_words"), Setting::optional("max_words")];
const PARAGRAPH_SETTINGS: &[Setting] = &[Setting::optional("paragraphs").with_count(DEFAULT_PARAGRAPHS)];

pub fn register(factory: &mut PluginFactory) {
    factory.register_field("text", || Box::new(TextPlugin));
    factory.register_field("textarea", || {
        Box::new(ParagraphsPlugin {
            id: "textarea",
            markup: Markup::Plain,
        })
    });
    factory.register_field("wygwam", || {
        Box::new(ParagraphsPlugin {
            id: "wygwam",
            markup: Markup::Html,
        })
    });
}

/// Single-line lorem text.
pub struct TextPlugin;

impl TextPlugin {
    fn word_bounds(min: Option<u32>, max: Option<u32>) -> Result<(u32, u32), PluginError> {
        let min = min.unwrap_or(DEFAULT_MIN_WORDS.min(max.unwrap_or(DEFAULT_MIN_WORDS)));
        let max = max.unwrap_or(DEFAULT_MAX_WORDS.max(min));
        if min > max {
            return Err(PluginError::InvalidConfig(format!(
                "min_words ({min}) must be <= max_words ({max})"
            )));
        }
        Ok((min, max))
    }
}

impl FieldTypePlugin for TextPlugin {
    fn id(&self) -> &'static str {
        "text"
    }

    fn settings(&self) -> &'static [Setting] {
        TEXT_SETTINGS
    }

    fn handle_extra(
        &self,
        field: &Field,
        schema_id: SchemaId,
        input: &dyn RawInput,
    ) -> Result<Value, PluginError> {
        let min = parse_positive(
            input.get(&setting_key(schema_id, field.id, "min_words")),
            "min_words",
        )?;
        let max = parse_positive(
            input.get(&setting_key(schema_id, field.id, "max_words")),
            "max_words",
        )?;
        Self::word_bounds(min, max)?;
        Ok(Value::Null)
    }

    fn generate(
        &mut self,
        ctx: &FieldContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<FieldValue, PluginError> {
        let (min, max) = Self::word_bounds(
            parse_positive(ctx.options.setting("min_words"), "min_words")?,
            parse_positive(ctx.options.setting("max_words"), "max_words")?,
        )?;
        let count = rng.random_range(min..=max) as usize;
        let value = lorem::words(count, rng).join(" ");
        let value = match ctx.field.max_length {
            Some(max_length) => lorem::truncate_chars(&value, max_length as usize),
            None => value,
        };
        Ok(FieldValue::Text(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    Plain,
    Html,
}

/// Multi-paragraph text, plain or wrapped in `<p>` elements.
pub struct ParagraphsPlugin {
    pub id: &'static str,
    pub markup: Markup,
}

impl FieldTypePlugin for ParagraphsPlugin {
    fn id(&self) -> &'static str {
        self.id
    }

    fn settings(&self) -> &'static [Setting] {
        PARAGRAPH_SETTINGS
    }

    fn handle_extra(
        &self,
        field: &Field,
        schema_id: SchemaId,
        input: &dyn RawInput,
    ) -> Result<Value, PluginError> {
        parse_positive(
            input.get(&setting_key(schema_id, field.id, "paragraphs")),
            "paragraphs",
        )?;
        Ok(Value::Null)
    }

    fn generate(
        &mut self,
        ctx: &FieldContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<FieldValue, PluginError> {
        let count = count_setting(ctx.options, "paragraphs", DEFAULT_PARAGRAPHS)?;
        let paragraphs = (0..count).map(|_| lorem::paragraph(rng));
        let value = match self.markup {
            Markup::Plain => {
                let value = paragraphs.collect::<Vec<_>>().join("\n\n");
                match ctx.field.max_length {
                    Some(max_length) => lorem::truncate_chars(&value, max_length as usize),
                    None => value,
                }
            }
            Markup::Html => paragraphs
                .map(|paragraph| format!("<p>{paragraph}</p>"))
                .collect::<Vec<_>>()
                .join("\n"),
        };
        Ok(FieldValue::Text(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_bounds_default_and_reject_inverted() {
        assert_eq!(TextPlugin::word_bounds(None, None), Ok((3, 8)));
        assert_eq!(TextPlugin::word_bounds(Some(10), None), Ok((10, 10)));
        assert_eq!(TextPlugin::word_bounds(None, Some(1)), Ok((1, 1)));
        assert_eq!(TextPlugin::word_bounds(None, Some(5)), Ok((3, 5)));
        assert!(TextPlugin::word_bounds(Some(5), Some(2)).is_err());
    }
}
