use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::Value;

use seedkit_core::{CommitError, FieldKey, PersistenceWriter, RecordDraft, RecordId, Schema, SchemaId};

use crate::config::OutputFormat;

const META_COLUMNS: &[&str] = &["record_id", "schema_id", "author_id", "entry_date"];

enum Sink {
    Jsonl(BufWriter<File>),
    Csv {
        writer: csv::Writer<BufWriter<File>>,
        fields: Vec<FieldKey>,
    },
}

/// Persistence writer appending committed records to a file.
///
/// Record ids are sequential. Every record is flushed on commit so an
/// aborted run leaves the records it committed on disk.
pub struct FileRecordWriter {
    sink: Sink,
    options: Vec<String>,
    next_id: RecordId,
    committed: u64,
}

impl FileRecordWriter {
    pub fn create(
        path: &Path,
        format: OutputFormat,
        first_id: RecordId,
        options: Vec<String>,
    ) -> std::io::Result<Self> {
        let file = BufWriter::new(File::create(path)?);
        let sink = match format {
            OutputFormat::Jsonl => Sink::Jsonl(file),
            OutputFormat::Csv => Sink::Csv {
                writer: csv::WriterBuilder::new()
                    .has_headers(false)
                    .from_writer(file),
                fields: Vec::new(),
            },
        };
        Ok(Self {
            sink,
            options,
            next_id: first_id,
            committed: 0,
        })
    }

    pub fn committed(&self) -> u64 {
        self.committed
    }

    fn write_jsonl(
        out: &mut BufWriter<File>,
        record_id: RecordId,
        schema_id: SchemaId,
        draft: &RecordDraft,
    ) -> Result<(), CommitError> {
        let mut value = serde_json::to_value(draft).map_err(commit_error)?;
        if let Value::Object(map) = &mut value {
            map.insert("record_id".to_string(), Value::from(record_id));
            map.insert("schema_id".to_string(), Value::from(schema_id));
        }
        serde_json::to_writer(&mut *out, &value).map_err(commit_error)?;
        out.write_all(b"\n").map_err(commit_error)?;
        out.flush().map_err(commit_error)
    }
}

impl PersistenceWriter for FileRecordWriter {
    /// CSV output gets its header here, once the schema's fields are known.
    fn prepare(&mut self, schema: &Schema) -> Result<(), CommitError> {
        let Sink::Csv { writer, fields } = &mut self.sink else {
            return Ok(());
        };
        *fields = schema.fields.iter().map(|field| field.key()).collect();

        let header = META_COLUMNS
            .iter()
            .map(|column| column.to_string())
            .chain(self.options.iter().cloned())
            .chain(fields.iter().map(|key| key.to_string()));
        writer.write_record(header).map_err(commit_error)?;
        writer.flush().map_err(commit_error)
    }

    fn commit(
        &mut self,
        schema_id: SchemaId,
        draft: &RecordDraft,
    ) -> Result<RecordId, CommitError> {
        let record_id = self.next_id;
        match &mut self.sink {
            Sink::Jsonl(out) => Self::write_jsonl(out, record_id, schema_id, draft)?,
            Sink::Csv { writer, fields } => {
                let row = [
                    record_id.to_string(),
                    schema_id.to_string(),
                    draft.author_id.to_string(),
                    draft.entry_date.to_rfc3339(),
                ]
                .into_iter()
                .chain(self.options.iter().map(|name| {
                    draft
                        .option(name)
                        .map(|value| value.render())
                        .unwrap_or_default()
                }))
                .chain(fields.iter().map(|key| {
                    draft
                        .field(*key)
                        .map(|value| value.render())
                        .unwrap_or_default()
                }));
                writer.write_record(row).map_err(commit_error)?;
                writer.flush().map_err(commit_error)?;
            }
        }
        self.next_id += 1;
        self.committed += 1;
        Ok(record_id)
    }
}

fn commit_error(err: impl std::fmt::Display) -> CommitError {
    CommitError::new(err.to_string())
}
