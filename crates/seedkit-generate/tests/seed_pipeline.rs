use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use rand::RngCore;

use seedkit_core::{
    CommitError, FieldContext, FieldDefinition, FieldTypePlugin, FieldValue, MemorySchemaProvider,
    MemoryWriter, OptionPlugin, PersistenceWriter, PluginError, RecordDraft, RecordId,
    SchemaDefinition, SchemaId,
};
use seedkit_generate::{PluginFactory, SeedEngine, SeedError, SeedOptions};
use seedkit_request::IssueKind;

type Log = Rc<RefCell<Vec<String>>>;

/// Title generator returning `x{iteration}`, logging every call.
struct EchoPlugin {
    log: Log,
    fail_generate_at: Option<u64>,
    fail_post_save: bool,
}

impl FieldTypePlugin for EchoPlugin {
    fn id(&self) -> &'static str {
        "text"
    }

    fn generate(
        &mut self,
        ctx: &FieldContext<'_>,
        _rng: &mut dyn RngCore,
    ) -> Result<FieldValue, PluginError> {
        if self.fail_generate_at == Some(ctx.iteration) {
            return Err(PluginError::Generation("echo exhausted".to_string()));
        }
        self.log
            .borrow_mut()
            .push(format!("generate:{}:{}", ctx.field.name, ctx.iteration));
        Ok(FieldValue::Text(format!("x{}", ctx.iteration)))
    }

    fn post_save(
        &mut self,
        record_id: RecordId,
        _draft: &RecordDraft,
        ctx: &FieldContext<'_>,
    ) -> Result<(), PluginError> {
        self.log
            .borrow_mut()
            .push(format!("post_save:{}:{record_id}", ctx.field.name));
        if self.fail_post_save {
            return Err(PluginError::PostSave("link table missing".to_string()));
        }
        Ok(())
    }
}

/// Status option writing the raw value, or nothing for `skip`.
struct EchoOption {
    log: Log,
}

impl OptionPlugin for EchoOption {
    fn id(&self) -> &'static str {
        "status"
    }

    fn generate(
        &mut self,
        raw_value: &str,
        _rng: &mut dyn RngCore,
    ) -> Result<Option<FieldValue>, PluginError> {
        self.log.borrow_mut().push(format!("option:{raw_value}"));
        match raw_value {
            "skip" => Ok(None),
            "blank" => Ok(Some(FieldValue::Text(String::new()))),
            _ => Ok(Some(FieldValue::Text(raw_value.to_string()))),
        }
    }

    fn post_save(
        &mut self,
        record_id: RecordId,
        _draft: &RecordDraft,
        _raw_value: &str,
    ) -> Result<(), PluginError> {
        self.log
            .borrow_mut()
            .push(format!("option_post_save:{record_id}"));
        Ok(())
    }
}

/// Writer that rejects the commit once `fail_at` records were accepted.
struct FailingWriter {
    inner: MemoryWriter,
    fail_at: usize,
    log: Log,
}

impl PersistenceWriter for FailingWriter {
    fn commit(
        &mut self,
        schema_id: SchemaId,
        draft: &RecordDraft,
    ) -> Result<RecordId, CommitError> {
        if self.inner.records().len() == self.fail_at {
            self.log.borrow_mut().push("commit_failed".to_string());
            return Err(CommitError::new("disk full"));
        }
        let record_id = self.inner.commit(schema_id, draft)?;
        self.log.borrow_mut().push(format!("commit:{record_id}"));
        Ok(record_id)
    }
}

fn schemas() -> MemorySchemaProvider {
    [
        SchemaDefinition {
            id: 1,
            title: "News".to_string(),
            fields: Vec::new(),
        },
        SchemaDefinition {
            id: 2,
            title: "Notes".to_string(),
            fields: vec![FieldDefinition {
                id: 5,
                label: "Summary".to_string(),
                name: "summary".to_string(),
                field_type: "text".to_string(),
                required: false,
                max_length: None,
                order: 1,
                cells: Vec::new(),
            }],
        },
    ]
    .into_iter()
    .collect()
}

fn input(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn engine_with(log: &Log, fail_generate_at: Option<u64>, fail_post_save: bool) -> SeedEngine {
    let mut factory = PluginFactory::builtin();
    let field_log = log.clone();
    factory.register_field("text", move || {
        Box::new(EchoPlugin {
            log: field_log.clone(),
            fail_generate_at,
            fail_post_save,
        })
    });
    let option_log = log.clone();
    factory.register_option("status", move || {
        Box::new(EchoOption {
            log: option_log.clone(),
        })
    });
    let options = SeedOptions {
        rng_seed: Some(11),
        ..SeedOptions::default()
    };
    SeedEngine::with_factory(options, factory).expect("engine")
}

fn engine(log: &Log) -> SeedEngine {
    engine_with(log, None, false)
}

#[test]
fn three_records_commit_in_order_with_post_save_after_each() {
    let log = Log::default();
    let engine = engine(&log);
    let mut writer = MemoryWriter::new();
    let input = input(&[
        ("seed_channel", "1"),
        ("seed_count", "3"),
        ("seed_field_1_0", "always"),
    ]);

    let report = engine
        .seed(&input, &schemas(), &mut writer)
        .expect("seed run");

    let titles: Vec<&str> = writer
        .records()
        .iter()
        .map(|record| record.values["title"].as_str().expect("title"))
        .collect();
    assert_eq!(titles, vec!["x0", "x1", "x2"]);
    assert_eq!(report.committed, vec![1, 2, 3]);
    assert!(report.is_complete());
    assert_eq!(
        *log.borrow(),
        vec![
            "generate:title:0",
            "post_save:title:1",
            "generate:title:1",
            "post_save:title:2",
            "generate:title:2",
            "post_save:title:3",
        ]
    );
    assert_eq!(writer.prepared(), &[1]);
}

#[test]
fn commit_failure_stops_the_run_after_two_post_save_cycles() {
    let log = Log::default();
    let engine = engine(&log);
    let mut writer = FailingWriter {
        inner: MemoryWriter::new(),
        fail_at: 2,
        log: log.clone(),
    };
    let input = input(&[
        ("seed_channel", "1"),
        ("seed_count", "5"),
        ("seed_field_1_0", "always"),
    ]);

    let err = engine
        .seed(&input, &schemas(), &mut writer)
        .expect_err("commit failure");

    let SeedError::Commit {
        iteration,
        ref errors,
        ..
    } = err
    else {
        panic!("expected commit failure, got {err:?}");
    };
    assert_eq!(iteration, 2);
    assert!(errors.has_kind(IssueKind::Commit));
    assert_eq!(errors.messages(), vec!["disk full".to_string()]);
    assert_eq!(
        err.report().expect("report").committed,
        vec![1, 2]
    );
    assert_eq!(
        *log.borrow(),
        vec![
            "generate:title:0",
            "commit:1",
            "post_save:title:1",
            "generate:title:1",
            "commit:2",
            "post_save:title:2",
            "generate:title:2",
            "commit_failed",
        ]
    );
}

#[test]
fn non_numeric_count_commits_nothing() {
    let log = Log::default();
    let engine = engine(&log);
    let mut writer = MemoryWriter::new();
    let input = input(&[
        ("seed_channel", "1"),
        ("seed_count", "lots"),
        ("seed_field_1_0", "always"),
    ]);

    let err = engine
        .seed(&input, &schemas(), &mut writer)
        .expect_err("invalid count");

    assert!(matches!(err, SeedError::Rejected(_)));
    let errors = err.errors();
    assert!(!errors.is_empty());
    assert!(errors.iter().any(|issue| issue.code == "seed_count_not_numeric"));
    assert!(writer.records().is_empty());
    assert!(writer.prepared().is_empty());
    assert!(log.borrow().is_empty());
}

#[test]
fn count_and_schema_issues_are_reported_together() {
    let log = Log::default();
    let engine = engine(&log);
    let mut writer = MemoryWriter::new();
    let input = input(&[("seed_channel", "abc"), ("seed_count", "0")]);

    let errors = engine
        .seed(&input, &schemas(), &mut writer)
        .expect_err("rejected")
        .errors();

    let codes: Vec<&str> = errors.iter().map(|issue| issue.code.as_str()).collect();
    assert_eq!(codes, vec!["schema_id_invalid", "seed_count_not_positive"]);
}

#[test]
fn unknown_schema_stops_before_field_validation() {
    let log = Log::default();
    let engine = engine(&log);
    let mut writer = MemoryWriter::new();
    let input = input(&[
        ("seed_channel", "99"),
        ("seed_count", "2"),
        ("seed_field_99_0", "sometimes"),
    ]);

    let errors = engine
        .seed(&input, &schemas(), &mut writer)
        .expect_err("unknown schema")
        .errors();

    assert_eq!(errors.len(), 1);
    assert!(errors.has_kind(IssueKind::UnknownSchema));
}

#[test]
fn missing_field_plugin_is_fatal() {
    let engine =
        SeedEngine::with_factory(SeedOptions::default(), PluginFactory::empty()).expect("engine");
    let mut writer = MemoryWriter::new();
    let input = input(&[("seed_channel", "1"), ("seed_count", "2")]);

    let err = engine
        .seed(&input, &schemas(), &mut writer)
        .expect_err("plugin load");

    assert!(matches!(err, SeedError::PluginLoad(_)));
    assert!(err.errors().has_kind(IssueKind::PluginLoad));
    assert!(writer.records().is_empty());
}

#[test]
fn absent_option_results_never_write_a_key() {
    let log = Log::default();
    let engine = engine(&log);
    let schemas = schemas();

    let mut skipped = MemoryWriter::new();
    engine
        .seed(
            &input(&[
                ("seed_channel", "1"),
                ("seed_count", "1"),
                ("seed_option_1_status", "skip"),
            ]),
            &schemas,
            &mut skipped,
        )
        .expect("seed run");
    let values = &skipped.records()[0].values;
    assert!(values.get("status").is_none());
    assert!(values.get("title").is_none());

    let mut written = MemoryWriter::new();
    let report = engine
        .seed(
            &input(&[
                ("seed_channel", "1"),
                ("seed_count", "1"),
                ("seed_option_1_status", "closed"),
            ]),
            &schemas,
            &mut written,
        )
        .expect("seed run");
    assert_eq!(written.records()[0].values["status"], "closed");
    assert_eq!(report.option_usage.get("status"), Some(&1));

    let mut blank = MemoryWriter::new();
    engine
        .seed(
            &input(&[
                ("seed_channel", "1"),
                ("seed_count", "1"),
                ("seed_option_1_status", "blank"),
            ]),
            &schemas,
            &mut blank,
        )
        .expect("seed run");
    let values = &blank.records()[0].values;
    assert_eq!(values.get("status"), Some(&serde_json::json!("")));
}

#[test]
fn option_hooks_run_before_field_hooks() {
    let log = Log::default();
    let engine = engine(&log);
    let mut writer = MemoryWriter::new();
    let input = input(&[
        ("seed_channel", "1"),
        ("seed_count", "1"),
        ("seed_option_1_status", "open"),
        ("seed_field_1_0", "always"),
    ]);

    engine
        .seed(&input, &schemas(), &mut writer)
        .expect("seed run");

    assert_eq!(
        *log.borrow(),
        vec![
            "option:open",
            "generate:title:0",
            "option_post_save:1",
            "post_save:title:1",
        ]
    );
}

#[test]
fn sparse_fields_can_be_written_empty() {
    let log = Log::default();
    let mut factory = PluginFactory::builtin();
    let field_log = log.clone();
    factory.register_field("text", move || {
        Box::new(EchoPlugin {
            log: field_log.clone(),
            fail_generate_at: None,
            fail_post_save: false,
        })
    });
    let options = SeedOptions {
        rng_seed: Some(5),
        sparse_rate: 0.0,
        ..SeedOptions::default()
    };
    let engine = SeedEngine::with_factory(options, factory).expect("engine");
    let mut writer = MemoryWriter::new();
    let input = input(&[
        ("seed_channel", "2"),
        ("seed_count", "2"),
        ("seed_field_2_0", "always"),
        ("seed_field_2_5", "sparse"),
    ]);

    let report = engine
        .seed(&input, &schemas(), &mut writer)
        .expect("seed run");

    assert_eq!(report.sparse_skipped, 2);
    assert_eq!(report.generator_usage.get("text"), Some(&2));
    for record in writer.records() {
        assert_eq!(record.values["field_id_5"], "");
    }
}

#[test]
fn generation_failure_keeps_earlier_commits() {
    let log = Log::default();
    let engine = engine_with(&log, Some(1), false);
    let mut writer = MemoryWriter::new();
    let input = input(&[
        ("seed_channel", "1"),
        ("seed_count", "3"),
        ("seed_field_1_0", "always"),
    ]);

    let err = engine
        .seed(&input, &schemas(), &mut writer)
        .expect_err("generation failure");

    assert!(matches!(err, SeedError::Generation { iteration: 1, .. }));
    assert!(err.errors().has_kind(IssueKind::Generation));
    assert_eq!(err.report().expect("report").committed, vec![1]);
    assert_eq!(writer.records().len(), 1);
}

#[test]
fn post_save_failures_are_reported_without_aborting() {
    let log = Log::default();
    let engine = engine_with(&log, None, true);
    let mut writer = MemoryWriter::new();
    let input = input(&[
        ("seed_channel", "1"),
        ("seed_count", "3"),
        ("seed_field_1_0", "always"),
    ]);

    let report = engine
        .seed(&input, &schemas(), &mut writer)
        .expect("seed run");

    assert_eq!(report.committed.len(), 3);
    assert_eq!(report.post_save_failures.len(), 3);
    assert!(report.post_save_failures.has_kind(IssueKind::PostSave));
}

#[test]
fn drafts_carry_author_and_entry_date() {
    let log = Log::default();
    let mut factory = PluginFactory::builtin();
    let field_log = log.clone();
    factory.register_field("text", move || {
        Box::new(EchoPlugin {
            log: field_log.clone(),
            fail_generate_at: None,
            fail_post_save: false,
        })
    });
    let options = SeedOptions {
        author_id: 7,
        ..SeedOptions::default()
    };
    let engine = SeedEngine::with_factory(options, factory).expect("engine");
    let mut writer = MemoryWriter::new();
    let input = input(&[("seed_channel", "1"), ("seed_count", "2")]);

    engine
        .seed(&input, &schemas(), &mut writer)
        .expect("seed run");

    let records = writer.records();
    assert_eq!(records[0].values["author_id"], 7);
    assert!(records[0].values["entry_date"].is_string());
    assert_eq!(
        records[0].values["entry_date"],
        records[1].values["entry_date"]
    );
}

#[test]
fn invalid_sparse_rate_is_a_config_error() {
    let options = SeedOptions {
        sparse_rate: 1.5,
        ..SeedOptions::default()
    };
    assert!(matches!(SeedEngine::new(options), Err(SeedError::Config(_))));
}
