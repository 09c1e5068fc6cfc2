use std::time::Instant;

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use seedkit_core::{
    CommitError, FieldContext, FieldValue, PersistenceWriter, PluginError, Populate, RawInput,
    RecordDraft, RecordId, Schema, SchemaProvider, TypeCatalog,
};
use seedkit_request::{
    ErrorList, IssueKind, SeedIssue, SeedRequest, collect_field_options, collect_options,
    parse_schema_id, parse_seed_count,
};

use crate::errors::SeedError;
use crate::model::{SeedOptions, SeedReport};
use crate::plugins::{PluginFactory, PluginRegistry};
use crate::resolve::{referenced_types, resolve_field_types, resolve_schema};

/// Entry point for seeding records from raw request input.
#[derive(Debug)]
pub struct SeedEngine {
    options: SeedOptions,
    factory: PluginFactory,
}

/// Validated request with the plugins loaded for it.
struct PreparedRun {
    schema: Schema,
    request: SeedRequest,
    plugins: PluginRegistry,
}

/// State owned by one run while it iterates.
struct Run {
    schema: Schema,
    request: SeedRequest,
    plugins: PluginRegistry,
    rng: ChaCha8Rng,
    report: SeedReport,
    author_id: u64,
    entry_date: DateTime<Utc>,
    sparse_rate: f64,
}

impl SeedEngine {
    pub fn new(options: SeedOptions) -> Result<Self, SeedError> {
        Self::with_factory(options, PluginFactory::builtin())
    }

    pub fn with_factory(options: SeedOptions, factory: PluginFactory) -> Result<Self, SeedError> {
        options.validate()?;
        Ok(Self { options, factory })
    }

    pub fn options(&self) -> &SeedOptions {
        &self.options
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.options.catalog
    }

    pub fn factory(&self) -> &PluginFactory {
        &self.factory
    }

    /// Validate the request, then generate, commit, and post-save each record.
    ///
    /// Nothing is generated when validation reports any issue. A commit
    /// failure stops the run; records committed before it stay committed.
    pub fn seed(
        &self,
        input: &dyn RawInput,
        schemas: &dyn SchemaProvider,
        writer: &mut dyn PersistenceWriter,
    ) -> Result<SeedReport, SeedError> {
        let run_id = uuid::Uuid::new_v4().to_string();
        self.seed_run(&run_id, input, schemas, writer)
    }

    /// Same as [`SeedEngine::seed`], reporting under a caller-chosen run id.
    pub fn seed_run(
        &self,
        run_id: &str,
        input: &dyn RawInput,
        schemas: &dyn SchemaProvider,
        writer: &mut dyn PersistenceWriter,
    ) -> Result<SeedReport, SeedError> {
        let start = Instant::now();

        let prepared = match self.prepare(input, schemas) {
            Ok(prepared) => prepared,
            Err(err) => {
                warn!(run_id = %run_id, error = %err, "seed request rejected");
                return Err(err);
            }
        };

        let schema_id = prepared.request.schema_id();
        let seed_count = prepared.request.seed_count();
        let rng_seed = self.options.rng_seed.unwrap_or_else(rand::random);

        info!(
            run_id = %run_id,
            schema_id,
            iterations = seed_count,
            fields = prepared.request.field_options().len(),
            options = prepared.request.channel_options().len(),
            rng_seed,
            "seed started"
        );

        let mut run = Run {
            schema: prepared.schema,
            request: prepared.request,
            plugins: prepared.plugins,
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
            report: SeedReport::new(run_id.to_string(), schema_id, seed_count),
            author_id: self.options.author_id,
            entry_date: Utc::now(),
            sparse_rate: self.options.sparse_rate,
        };
        run.report.rng_seed = rng_seed;

        if let Err(err) = writer.prepare(&run.schema) {
            warn!(run_id = %run_id, error = %err, "writer preparation failed");
            return Err(SeedError::Commit {
                iteration: 0,
                errors: commit_issues(err),
                report: finish(run.report, start),
            });
        }

        for iteration in 0..seed_count {
            let draft = match run.build_draft(iteration) {
                Ok(draft) => draft,
                Err(source) => {
                    warn!(run_id = %run_id, iteration, error = %source, "generation failed");
                    return Err(SeedError::Generation {
                        iteration,
                        source,
                        report: finish(run.report, start),
                    });
                }
            };

            let record_id = match writer.commit(schema_id, &draft) {
                Ok(record_id) => record_id,
                Err(err) => {
                    warn!(
                        run_id = %run_id,
                        iteration,
                        committed = run.report.committed.len(),
                        error = %err,
                        "commit failed, aborting run"
                    );
                    return Err(SeedError::Commit {
                        iteration,
                        errors: commit_issues(err),
                        report: finish(run.report, start),
                    });
                }
            };
            run.report.committed.push(record_id);
            debug!(run_id = %run_id, iteration, record_id, "record committed");

            run.post_save(iteration, record_id, &draft);
        }

        let report = finish(run.report, start);
        info!(
            run_id = %run_id,
            committed = report.committed.len(),
            sparse_skipped = report.sparse_skipped,
            post_save_failures = report.post_save_failures.len(),
            duration_ms = report.duration_ms,
            "seed completed"
        );
        Ok(*report)
    }

    /// Setup: parse and resolve, load plugins, then validate fields and options.
    fn prepare(
        &self,
        input: &dyn RawInput,
        schemas: &dyn SchemaProvider,
    ) -> Result<PreparedRun, SeedError> {
        let catalog = &self.options.catalog;
        let mut errors = ErrorList::new();

        let schema_id = parse_schema_id(input)
            .map_err(|issue| errors.push(issue))
            .ok();
        let seed_count = parse_seed_count(input)
            .map_err(|issue| errors.push(issue))
            .ok();
        let schema = match schema_id {
            Some(id) => resolve_schema(schemas, id)
                .map_err(|issue| errors.push(issue))
                .ok(),
            None => None,
        };

        let (Some(schema), Some(seed_count)) = (schema, seed_count) else {
            return Err(SeedError::Rejected(errors));
        };

        let resolved = resolve_field_types(&schema, catalog);
        for ty in resolved.iter().filter(|ty| ty.is_unknown) {
            debug!(
                schema_id = schema.id,
                declared = %ty.declared,
                fallback = %ty.name,
                "unknown field type, using fallback"
            );
        }
        let plugins = PluginRegistry::load(
            &self.factory,
            &referenced_types(&resolved),
            &catalog.known_options,
        )?;

        let (field_options, field_errors) =
            collect_field_options(&schema, catalog, &plugins, input);
        errors.merge(field_errors);
        if !errors.is_empty() {
            return Err(SeedError::Rejected(errors));
        }

        let channel_options = collect_options(schema.id, &catalog.known_options, input);
        let request = SeedRequest::new(schema.id, seed_count, field_options, channel_options);

        Ok(PreparedRun {
            schema,
            request,
            plugins,
        })
    }
}

impl Run {
    /// Options first, then fields in schema order.
    fn build_draft(&mut self, iteration: u64) -> Result<RecordDraft, PluginError> {
        let mut draft = RecordDraft::new(self.author_id, self.entry_date);

        for (name, raw_value) in self.request.channel_options().iter() {
            let plugin = self.plugins.option_mut(name).ok_or_else(|| {
                PluginError::Generation(format!("option plugin '{name}' is not loaded"))
            })?;
            if let Some(value) = plugin.generate(raw_value, &mut self.rng)? {
                draft.set_option(name, value);
                self.report.record_option_usage(name);
            }
        }

        for options in self.request.field_options() {
            if options.populate == Populate::Sparse && !self.rng.random_bool(self.sparse_rate) {
                draft.set_field(options.key, FieldValue::empty());
                self.report.record_sparse_skip();
                continue;
            }

            let field = self.schema.field(options.field_id).ok_or_else(|| {
                PluginError::Generation(format!("field {} missing from schema", options.field_id))
            })?;
            let plugin = self.plugins.field_mut(&options.field_type).ok_or_else(|| {
                PluginError::Generation(format!(
                    "field plugin '{}' is not loaded",
                    options.field_type
                ))
            })?;
            let ctx = FieldContext {
                iteration,
                field_id: field.id,
                schema_id: self.schema.id,
                field,
                options,
            };
            let value = plugin.generate(&ctx, &mut self.rng)?;
            self.report.record_generator_usage(plugin.id());
            draft.set_field(options.key, value);
        }

        Ok(draft)
    }

    /// Failures are recorded in the report and never stop the run.
    fn post_save(&mut self, iteration: u64, record_id: RecordId, draft: &RecordDraft) {
        for (name, raw_value) in self.request.channel_options().iter() {
            let result = match self.plugins.option_mut(name) {
                Some(plugin) => plugin.post_save(record_id, draft, raw_value),
                None => continue,
            };
            if let Err(err) = result {
                warn!(record_id, option = name, error = %err, "option post-save failed");
                self.report.record_post_save_failure(
                    SeedIssue::new(
                        IssueKind::PostSave,
                        "post_save_failed",
                        format!("option '{name}' on record {record_id}: {err}"),
                    )
                    .with_key(name),
                );
            }
        }

        for options in self.request.field_options() {
            let Some(field) = self.schema.field(options.field_id) else {
                continue;
            };
            let Some(plugin) = self.plugins.field_mut(&options.field_type) else {
                continue;
            };
            let ctx = FieldContext {
                iteration,
                field_id: field.id,
                schema_id: self.schema.id,
                field,
                options,
            };
            if let Err(err) = plugin.post_save(record_id, draft, &ctx) {
                warn!(record_id, field = %field.name, error = %err, "field post-save failed");
                self.report.record_post_save_failure(
                    SeedIssue::new(
                        IssueKind::PostSave,
                        "post_save_failed",
                        format!("field '{}' on record {record_id}: {err}", field.label),
                    )
                    .with_key(options.key.to_string()),
                );
            }
        }
    }
}

fn commit_issues(err: CommitError) -> ErrorList {
    err.errors
        .into_iter()
        .map(|message| SeedIssue::new(IssueKind::Commit, "commit_failed", message))
        .collect()
}

fn finish(mut report: SeedReport, start: Instant) -> Box<SeedReport> {
    report.duration_ms = start.elapsed().as_millis() as u64;
    Box::new(report)
}
