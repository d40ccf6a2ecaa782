//! CSV ingest and export through Arrow.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::record_batch::RecordBatch;
use tracing::info;

use crate::StoreError;

/// Read a headed CSV file into a single table. Column types are inferred
/// from every row.
pub fn read_csv(path: &Path) -> Result<RecordBatch, StoreError> {
    if !path.exists() {
        return Err(StoreError::CsvNotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let batch = read_csv_from(file)?;
    info!(
        path = %path.display(),
        rows = batch.num_rows(),
        columns = batch.num_columns(),
        "read CSV"
    );
    Ok(batch)
}

/// Read headed CSV from any seekable source. The source is scanned twice:
/// once to infer the schema, once to decode.
pub fn read_csv_from<R: Read + Seek>(mut reader: R) -> Result<RecordBatch, StoreError> {
    let (schema, _) = Format::default()
        .with_header(true)
        .infer_schema(&mut reader, None)?;
    reader.rewind()?;

    let schema = Arc::new(schema);
    let decoder = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .build(reader)?;
    let batches = decoder.collect::<Result<Vec<_>, _>>()?;

    Ok(concat_batches(&schema, &batches)?)
}

/// Serialize a table as comma-separated text with a header row.
pub fn to_csv_bytes(batch: &RecordBatch) -> Result<Vec<u8>, StoreError> {
    let mut writer = WriterBuilder::new().with_header(true).build(Vec::new());
    writer.write(batch)?;
    Ok(writer.into_inner())
}

/// Write a table to `path`. The file is only created once the whole table
/// has serialized.
pub fn write_csv(path: &Path, batch: &RecordBatch) -> Result<(), StoreError> {
    let bytes = to_csv_bytes(batch)?;
    std::fs::write(path, bytes)?;
    info!(path = %path.display(), rows = batch.num_rows(), "wrote CSV");
    Ok(())
}
