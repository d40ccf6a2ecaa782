//! Batch pipeline: reads an uploaded CSV, scores every row, writes the
//! augmented table.

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use arrow::record_batch::RecordBatch;
use attrition_ai::Predictor;
use attrition_core::Outcome;
use attrition_store::{augment, read_csv, select_features, to_records, write_csv};
use tracing::{info, warn};

use crate::display;

/// Result of scoring one uploaded table.
pub enum BatchOutcome {
    /// Every row scored; `table` is the upload plus the output columns.
    Scored {
        table: RecordBatch,
        dropped: Vec<String>,
        resign: usize,
    },
    /// Nothing left to score after column selection.
    Empty,
}

pub struct BatchStats {
    pub total_rows: usize,
    pub resign: usize,
    pub elapsed_secs: f64,
}

/// Score an uploaded table in one pass. Fails before scoring when feature
/// columns are missing.
pub fn score_table(
    predictor: &mut Predictor,
    upload: &RecordBatch,
) -> anyhow::Result<BatchOutcome> {
    let selection = select_features(upload)?;
    if selection.table.num_rows() == 0 {
        warn!("uploaded table has no rows; nothing to score");
        return Ok(BatchOutcome::Empty);
    }

    let records = to_records(&selection.table)?;
    let predictions = predictor.predict(&records)?;
    let resign = predictions
        .iter()
        .filter(|p| p.outcome == Outcome::Resign)
        .count();
    let table = augment(upload, &predictions)?;

    Ok(BatchOutcome::Scored {
        table,
        dropped: selection.dropped,
        resign,
    })
}

/// Run the full batch flow: read CSV → score → write CSV → preview.
///
/// The output file is only written when the whole table scored.
pub fn run_batch(
    predictor: &mut Predictor,
    input: &Path,
    output: &Path,
    preview: usize,
) -> anyhow::Result<BatchStats> {
    let start = Instant::now();

    let upload = read_csv(input).with_context(|| format!("reading {}", input.display()))?;
    let total_rows = upload.num_rows();
    eprintln!("  Read {total_rows} rows from {}", input.display());

    let (table, dropped, resign) = match score_table(predictor, &upload)? {
        BatchOutcome::Empty => {
            eprintln!("  No rows to score; nothing written");
            return Ok(BatchStats {
                total_rows: 0,
                resign: 0,
                elapsed_secs: start.elapsed().as_secs_f64(),
            });
        }
        BatchOutcome::Scored {
            table,
            dropped,
            resign,
        } => (table, dropped, resign),
    };

    if !dropped.is_empty() {
        eprintln!("  Ignored columns: {}", dropped.join(", "));
    }

    write_csv(output, &table).with_context(|| format!("writing {}", output.display()))?;

    let elapsed_secs = start.elapsed().as_secs_f64();
    info!(rows = total_rows, resign, output = %output.display(), "batch scored");

    display::print_preview(&table, preview)?;
    eprintln!("  Scored {total_rows} rows ({resign} predicted to resign) in {elapsed_secs:.2}s");
    eprintln!("  Wrote {}", output.display());

    Ok(BatchStats {
        total_rows,
        resign,
        elapsed_secs,
    })
}
