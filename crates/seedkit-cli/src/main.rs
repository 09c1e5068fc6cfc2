mod config;
mod registry;
mod sources;
mod store;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use config::{ConfigError, OutputFormat, load_or_create_settings};
use registry::{RunContext, init_run_logging, start_run, write_errors, write_report};
use seedkit_core::{Error as CoreError, Schema, SchemaProvider};
use seedkit_generate::{SeedEngine, SeedError};
use store::FileRecordWriter;

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid schema document: {}", .0.join("; "))]
    InvalidSchemas(Vec<String>),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Seed(#[from] SeedError),
}

#[derive(Parser, Debug)]
#[command(name = "seedkit", version, about = "Seed schemas with generated records")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate and commit records for one schema.
    Seed(SeedArgs),
    /// Print the configuration view context of a field or grid cell.
    ViewField(ViewFieldArgs),
    /// Print the configuration view context of a record option.
    ViewOption(ViewOptionArgs),
    /// Print the effective type catalog and registered plugins.
    Types(ConfigArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Settings file, created with defaults when missing.
    #[arg(long, default_value = "seedkit.toml")]
    config: PathBuf,
}

#[derive(Args, Debug)]
struct SeedArgs {
    /// Schema document (JSON object or array).
    #[arg(long)]
    schemas: PathBuf,
    /// Raw request values (JSON object or key=value lines).
    #[arg(long)]
    input: Option<PathBuf>,
    /// Raw request value override, applied after --input.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,
    /// Output directory for runs.
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
    /// Seed for reproducible output.
    #[arg(long)]
    rng_seed: Option<u64>,
    /// Only log to the run's logs.ndjson.
    #[arg(long, default_value_t = false)]
    quiet: bool,
    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args, Debug)]
struct ViewFieldArgs {
    #[arg(long)]
    schemas: PathBuf,
    #[arg(long)]
    schema_id: u64,
    #[arg(long)]
    field_id: u32,
    /// Grid cell to view instead of the field itself.
    #[arg(long)]
    cell: Option<u32>,
    /// Type to resolve; defaults to the declared type of the field or cell.
    #[arg(long = "type")]
    field_type: Option<String>,
    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args, Debug)]
struct ViewOptionArgs {
    #[arg(long)]
    schema_id: u64,
    #[arg(long)]
    option: String,
    /// Option type; nothing is printed when absent or empty.
    #[arg(long = "type")]
    option_type: Option<String>,
    #[command(flatten)]
    config: ConfigArgs,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Seed(args) => run_seed(args),
        Command::ViewField(args) => run_view_field(args),
        Command::ViewOption(args) => run_view_option(args),
        Command::Types(args) => run_types(args),
    }
}

fn run_seed(args: SeedArgs) -> Result<(), CliError> {
    let mut settings = load_or_create_settings(&args.config.config)?;
    if let Some(seed) = args.rng_seed {
        settings.seed.rng_seed = Some(seed);
    }
    let format = args.format.unwrap_or(settings.format);
    let out_dir = args.out.clone().unwrap_or_else(|| settings.out_dir.clone());

    let engine = SeedEngine::new(settings.seed.clone())?;
    let schemas = sources::load_schemas(&args.schemas)?;
    let input = sources::load_input(args.input.as_deref(), &args.set)?;

    let run_id = Uuid::new_v4().to_string();
    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        out_dir,
        format,
        schemas_path: args.schemas.clone(),
        input_path: args.input.clone(),
        options: settings.seed.clone(),
    };
    let run_paths = start_run(&run_ctx)?;
    init_run_logging(&run_paths.logs_path, settings.log_to_stderr && !args.quiet)?;

    tracing::info!(
        event = "run_started",
        run_id = %run_id,
        run_dir = %run_paths.root.display(),
        format = format.extension()
    );

    let mut writer = FileRecordWriter::create(
        &run_paths.records_path,
        format,
        settings.first_record_id,
        engine.catalog().known_options.clone(),
    )?;

    match engine.seed_run(&run_id, &input, &schemas, &mut writer) {
        Ok(report) => {
            write_report(&run_paths, &report)?;
            tracing::info!(
                event = "run_finished",
                status = "success",
                committed = report.committed.len(),
                duration_ms = report.duration_ms
            );
            println!("{}", run_paths.root.display());
            Ok(())
        }
        Err(err) => {
            let errors = err.errors();
            write_errors(&run_paths, &errors)?;
            if let Some(report) = err.report() {
                write_report(&run_paths, report)?;
            }
            for issue in errors.iter() {
                tracing::warn!(
                    event = "seed_issue",
                    kind = ?issue.kind,
                    code = %issue.code,
                    key = ?issue.key,
                    message = %issue.message
                );
            }
            tracing::info!(
                event = "run_finished",
                status = "failed",
                committed = writer.committed()
            );
            Err(err.into())
        }
    }
}

fn run_view_field(args: ViewFieldArgs) -> Result<(), CliError> {
    let settings = load_or_create_settings(&args.config.config)?;
    let engine = SeedEngine::new(settings.seed)?;
    let provider = sources::load_schemas(&args.schemas)?;

    let definition = provider
        .get_schema(args.schema_id)
        .ok_or_else(|| CliError::NotFound(format!("schema {}", args.schema_id)))?;
    let schema = Schema::from_definition(definition)?;
    let field = schema.field(args.field_id).ok_or_else(|| {
        CliError::NotFound(format!("field {} in schema {}", args.field_id, args.schema_id))
    })?;
    let cell = match args.cell {
        Some(cell_id) => Some(
            field
                .cells
                .iter()
                .find(|cell| cell.id == cell_id)
                .ok_or_else(|| {
                    CliError::NotFound(format!("cell {cell_id} in field {}", field.id))
                })?,
        ),
        None => None,
    };
    let field_type = match (&args.field_type, cell) {
        (Some(field_type), _) => field_type.clone(),
        (None, Some(cell)) => cell.cell_type.clone(),
        (None, None) => field.field_type.clone(),
    };

    let view = engine.field_view_context(
        &provider,
        &field_type,
        args.schema_id,
        args.field_id,
        field,
        cell,
    )?;
    print_json(&view)
}

fn run_view_option(args: ViewOptionArgs) -> Result<(), CliError> {
    let settings = load_or_create_settings(&args.config.config)?;
    let engine = SeedEngine::new(settings.seed)?;

    if let Some(view) =
        engine.option_view_context(args.option_type.as_deref(), args.schema_id, &args.option)
    {
        print_json(&view)?;
    }
    Ok(())
}

fn run_types(args: ConfigArgs) -> Result<(), CliError> {
    let settings = load_or_create_settings(&args.config)?;
    let engine = SeedEngine::new(settings.seed)?;

    print_json(&json!({
        "catalog": engine.catalog(),
        "field_plugins": engine.factory().field_types().collect::<Vec<_>>(),
        "option_plugins": engine.factory().option_names().collect::<Vec<_>>(),
    }))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
