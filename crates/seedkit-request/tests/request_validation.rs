use std::collections::BTreeMap;

use rand::RngCore;
use serde_json::{Value, json};

use seedkit_core::keys::setting_key;
use seedkit_core::{
    Field, FieldContext, FieldDefinition, FieldTypePlugin, FieldValue, PluginError, PluginSource,
    Populate, RawInput, Schema, SchemaDefinition, SchemaId, Setting, TypeCatalog,
};
use seedkit_request::{
    IssueKind, collect_field_options, collect_options, parse_schema_id, parse_seed_count,
    validate_field,
};

const FEED_SETTINGS: &[Setting] = &[
    Setting::required("source"),
    Setting::required("format"),
    Setting::optional("limit").with_count(5),
];

struct FeedPlugin;

impl FieldTypePlugin for FeedPlugin {
    fn id(&self) -> &'static str {
        "text"
    }

    fn settings(&self) -> &'static [Setting] {
        FEED_SETTINGS
    }

    fn handle_extra(
        &self,
        field: &Field,
        schema_id: SchemaId,
        input: &dyn RawInput,
    ) -> Result<Value, PluginError> {
        match input.get(&setting_key(schema_id, field.id, "mirror")) {
            Some("broken") => Err(PluginError::InvalidConfig("mirror is broken".to_string())),
            Some(mirror) => Ok(json!({ "mirror": mirror })),
            None => Ok(Value::Null),
        }
    }

    fn generate(
        &mut self,
        _ctx: &FieldContext<'_>,
        _rng: &mut dyn RngCore,
    ) -> Result<FieldValue, PluginError> {
        Ok(FieldValue::empty())
    }
}

struct Plugins {
    feed: FeedPlugin,
}

impl PluginSource for Plugins {
    fn field_plugin(&self, type_name: &str) -> Option<&dyn FieldTypePlugin> {
        (type_name == "text").then_some(&self.feed as &dyn FieldTypePlugin)
    }
}

fn input(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn schema() -> Schema {
    Schema::from_definition(SchemaDefinition {
        id: 2,
        title: "News".to_string(),
        fields: vec![FieldDefinition {
            id: 5,
            label: "Feed".to_string(),
            name: "feed".to_string(),
            field_type: "text".to_string(),
            required: false,
            max_length: None,
            order: 0,
            cells: Vec::new(),
        }],
    })
    .expect("resolve schema")
}

#[test]
fn seed_count_must_be_numeric() {
    let issue = parse_seed_count(&input(&[("seed_count", "lots")])).expect_err("not numeric");
    assert_eq!(issue.kind, IssueKind::InvalidInput);
    assert_eq!(issue.code, "seed_count_not_numeric");

    let missing = parse_seed_count(&input(&[])).expect_err("missing");
    assert_eq!(missing.code, "seed_count_not_numeric");
}

#[test]
fn seed_count_must_be_positive() {
    for raw in ["0", "-2", "1.5"] {
        let issue = parse_seed_count(&input(&[("seed_count", raw)])).expect_err("not positive");
        assert_eq!(issue.code, "seed_count_not_positive", "raw value {raw}");
    }
    assert_eq!(parse_seed_count(&input(&[("seed_count", " 12 ")])), Ok(12));
}

#[test]
fn schema_id_is_required() {
    assert!(parse_schema_id(&input(&[])).is_err());
    assert!(parse_schema_id(&input(&[("seed_channel", "blog")])).is_err());
    assert_eq!(parse_schema_id(&input(&[("seed_channel", "7")])), Ok(7));
}

#[test]
fn one_error_per_missing_required_setting() {
    let schema = schema();
    let field = schema.field(5).expect("field");
    let resolved = TypeCatalog::default().resolve(&field.field_type);

    let (options, errors) =
        validate_field(2, field, &resolved, Populate::Always, &FeedPlugin, &input(&[]));

    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|issue| issue.code == "missing_required_value"));
    assert_eq!(options.settings.len(), 3);
    assert_eq!(options.count, Some(5));
}

#[test]
fn blank_required_settings_count_as_missing() {
    let schema = schema();
    let field = schema.field(5).expect("field");
    let resolved = TypeCatalog::default().resolve(&field.field_type);
    let raw = input(&[
        ("seed_field_2_5_source", "   "),
        ("seed_field_2_5_format", "atom"),
    ]);

    let (_, errors) = validate_field(2, field, &resolved, Populate::Always, &FeedPlugin, &raw);

    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors.iter().next().and_then(|issue| issue.key.as_deref()),
        Some("seed_field_2_5_source")
    );
}

#[test]
fn present_required_settings_pass_regardless_of_content() {
    let schema = schema();
    let field = schema.field(5).expect("field");
    let resolved = TypeCatalog::default().resolve(&field.field_type);
    let raw = input(&[
        ("seed_field_2_5_source", "???"),
        ("seed_field_2_5_format", "not-a-format"),
        ("seed_field_2_5_mirror", "backup"),
    ]);

    let (options, errors) =
        validate_field(2, field, &resolved, Populate::Sparse, &FeedPlugin, &raw);

    assert!(errors.is_empty());
    assert_eq!(options.setting("source"), Some("???"));
    assert_eq!(options.setting("limit"), None);
    assert_eq!(options.populate, Populate::Sparse);
    assert_eq!(options.extra, json!({ "mirror": "backup" }));
    assert_eq!(options.field_name, "feed");
}

#[test]
fn extra_parse_failures_are_reported() {
    let schema = schema();
    let field = schema.field(5).expect("field");
    let resolved = TypeCatalog::default().resolve(&field.field_type);
    let raw = input(&[
        ("seed_field_2_5_source", "rss"),
        ("seed_field_2_5_format", "xml"),
        ("seed_field_2_5_mirror", "broken"),
    ]);

    let (_, errors) = validate_field(2, field, &resolved, Populate::Always, &FeedPlugin, &raw);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.iter().next().map(|i| i.code.as_str()), Some("invalid_field_config"));
}

#[test]
fn only_populated_fields_produce_options() {
    let schema = schema();
    let plugins = Plugins { feed: FeedPlugin };
    let raw = input(&[
        ("seed_field_2_0", "always"),
        ("seed_field_2_5", "off"),
        ("seed_field_2_0_source", "rss"),
        ("seed_field_2_0_format", "xml"),
    ]);

    let (fields, errors) =
        collect_field_options(&schema, &TypeCatalog::default(), &plugins, &raw);

    assert!(errors.is_empty(), "unexpected errors: {errors}");
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].field_id, 0);
    assert_eq!(fields[0].key.to_string(), "title");
}

#[test]
fn field_errors_are_aggregated_across_fields() {
    let schema = schema();
    let plugins = Plugins { feed: FeedPlugin };
    let raw = input(&[("seed_field_2_0", "always"), ("seed_field_2_5", "sometimes")]);

    let (_, errors) = collect_field_options(&schema, &TypeCatalog::default(), &plugins, &raw);

    let codes: Vec<&str> = errors.iter().map(|issue| issue.code.as_str()).collect();
    assert_eq!(
        codes,
        vec![
            "missing_required_value",
            "missing_required_value",
            "invalid_populate_mode"
        ]
    );
}

#[test]
fn empty_options_are_omitted() {
    let known = vec!["status".to_string(), "structure".to_string()];
    let raw = input(&[("seed_option_2_status", "open"), ("seed_option_2_structure", "")]);

    let options = collect_options(2, &known, &raw);
    assert_eq!(options.len(), 1);
    assert_eq!(options.get("status"), Some("open"));
    assert_eq!(options.get("structure"), None);
}
