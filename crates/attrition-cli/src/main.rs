mod batch;
mod display;
mod manual;
mod settings;

use std::path::PathBuf;

use anyhow::Context;
use attrition_core::Record;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "attrition", version, about = "Employee attrition scoring")]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score one employee entered by hand.
    Predict {
        /// Field assignment, e.g. `--set Age=42`. Repeatable.
        #[arg(long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,

        /// JSON object of field values applied before `--set`.
        #[arg(long, value_name = "FILE")]
        record: Option<PathBuf>,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Score every row of a CSV file and write the augmented table.
    Batch {
        input: PathBuf,

        #[arg(short, long, default_value = "predicted_attrition.csv")]
        output: PathBuf,

        /// Rows of the result to show.
        #[arg(long, default_value_t = 5)]
        preview: usize,
    },
    /// List the model's input fields with accepted values and defaults.
    Fields,
    /// Write the category vocabulary in use to a file.
    Vocab {
        #[arg(short, long, default_value = "vocabulary.json")]
        output: PathBuf,
    },
    /// Write a one-row CSV with every field at its default.
    Template {
        #[arg(short, long, default_value = "employees.csv")]
        output: PathBuf,
    },
}

fn init_tracing(quiet: bool) {
    let fallback = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet);
    tracing::debug!("attrition v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Predict { set, record, json } => {
            let mut predictor = cli.settings.predictor()?;
            manual::run_predict(&mut predictor, &set, record.as_deref(), json)?;
        }
        Command::Batch {
            input,
            output,
            preview,
        } => {
            let mut predictor = cli.settings.predictor()?;
            let stats = batch::run_batch(&mut predictor, &input, &output, preview)?;
            tracing::debug!(
                rows = stats.total_rows,
                resign = stats.resign,
                secs = stats.elapsed_secs,
                "batch finished"
            );
        }
        Command::Fields => display::print_fields(),
        Command::Vocab { output } => {
            let table = cli.settings.categories()?;
            table
                .save(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            eprintln!("  Wrote {} categorical features to {}", table.len(), output.display());
        }
        Command::Template { output } => {
            let table = attrition_store::records_to_table(&[Record::manual_defaults()])?;
            attrition_store::write_csv(&output, &table)
                .with_context(|| format!("writing {}", output.display()))?;
            eprintln!("  Wrote template to {}", output.display());
        }
    }

    Ok(())
}
