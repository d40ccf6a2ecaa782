//! Terminal rendering for predictions, batch previews, and the field list.

use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use attrition_core::{FEATURES, FieldKind, Prediction};

/// Probability as a percentage with two decimals, e.g. `23.45%`.
pub fn format_probability(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

/// The two result lines shown for a manual prediction.
pub fn prediction_lines(prediction: &Prediction) -> [String; 2] {
    [
        format!("Prediction: {}", prediction.outcome.as_str()),
        format!(
            "Probability of Resignation: {}",
            format_probability(prediction.probability)
        ),
    ]
}

pub fn print_prediction(prediction: &Prediction, json: bool) -> anyhow::Result<()> {
    if json {
        let value = serde_json::json!({
            "prediction": prediction.outcome.as_str(),
            "label": prediction.outcome.label(),
            "probability": prediction.probability,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("=== Prediction Result ===");
    for line in prediction_lines(prediction) {
        println!("{line}");
    }
    Ok(())
}

/// Print the first `rows` rows of a table as a grid.
pub fn print_preview(batch: &RecordBatch, rows: usize) -> anyhow::Result<()> {
    let shown = rows.min(batch.num_rows());
    if shown == 0 {
        return Ok(());
    }
    let head = batch.slice(0, shown);
    println!("{}", pretty_format_batches(&[head])?);
    if batch.num_rows() > shown {
        println!("  ... and {} more rows", batch.num_rows() - shown);
    }
    Ok(())
}

/// One line per catalogue field: name, accepted values, default.
pub fn field_lines() -> Vec<String> {
    FEATURES
        .iter()
        .map(|spec| {
            let accepts = match spec.kind {
                FieldKind::Integer { min, max, .. } => format!("integer {min}..={max}"),
                FieldKind::Category { options } => options.join(" | "),
            };
            format!(
                "  {:<26} {}  (default: {})",
                spec.name,
                accepts,
                spec.default_value()
            )
        })
        .collect()
}

pub fn print_fields() {
    println!("Model input fields ({})", FEATURES.len());
    for line in field_lines() {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrition_core::Outcome;

    #[test]
    fn probability_renders_as_percentage() {
        assert_eq!(format_probability(0.2345), "23.45%");
        assert_eq!(format_probability(1.0), "100.00%");
        assert_eq!(format_probability(0.0), "0.00%");
    }

    #[test]
    fn prediction_lines_use_labels() {
        let lines = prediction_lines(&Prediction {
            outcome: Outcome::Resign,
            probability: 0.5,
        });
        assert_eq!(lines[0], "Prediction: Resign");
        assert_eq!(lines[1], "Probability of Resignation: 50.00%");
    }

    #[test]
    fn field_lines_cover_catalogue() {
        let lines = field_lines();
        assert_eq!(lines.len(), FEATURES.len());
        assert!(lines[0].contains("Age"));
        assert!(lines[0].contains("integer 18..=60"));
        assert!(lines[0].contains("(default: 30)"));
        let overtime = lines.iter().find(|l| l.contains("OverTime")).unwrap();
        assert!(overtime.contains("Yes | No"));
    }
}
