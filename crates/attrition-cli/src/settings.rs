//! Global options shared by every subcommand, read from flags or the
//! environment.

use std::path::PathBuf;

use anyhow::Context;
use attrition_ai::{CategoryMode, DecisionPolicy, Predictor, load_model};
use attrition_core::CategoryTable;
use clap::Args;
use tracing::info;

#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Model artifact: a logistic-regression `.json` export or an `.onnx` file.
    #[arg(long, env = "ATTRITION_MODEL", default_value = "model.json", global = true)]
    pub model: PathBuf,

    /// Category vocabulary shipped with the model. Without it the built-in
    /// vocabulary (catalogue options, sorted) is used.
    #[arg(long, env = "ATTRITION_VOCABULARY", global = true)]
    pub vocabulary: Option<PathBuf>,

    /// Label rows as Resign when the probability reaches this value instead
    /// of using the model's own label.
    #[arg(long, env = "ATTRITION_THRESHOLD", global = true)]
    pub threshold: Option<f64>,

    /// Keep category mappings fitted from input for the rest of the run.
    #[arg(long, global = true)]
    pub learn_categories: bool,
}

impl Settings {
    pub fn categories(&self) -> anyhow::Result<CategoryTable> {
        match &self.vocabulary {
            Some(path) => CategoryTable::load(path)
                .with_context(|| format!("loading vocabulary {}", path.display())),
            None => {
                info!("using built-in category vocabulary");
                Ok(CategoryTable::builtin())
            }
        }
    }

    pub fn policy(&self) -> anyhow::Result<DecisionPolicy> {
        match self.threshold {
            Some(t) => Ok(DecisionPolicy::threshold(t)?),
            None => Ok(DecisionPolicy::ModelLabel),
        }
    }

    pub fn category_mode(&self) -> CategoryMode {
        if self.learn_categories {
            CategoryMode::Learn
        } else {
            CategoryMode::Frozen
        }
    }

    /// Validate settings, then load the model and vocabulary.
    pub fn predictor(&self) -> anyhow::Result<Predictor> {
        let policy = self.policy()?;
        let categories = self.categories()?;
        let model = load_model(&self.model)
            .with_context(|| format!("loading model {}", self.model.display()))?;

        Ok(Predictor::new(model, categories)
            .with_policy(policy)
            .with_category_mode(self.category_mode()))
    }
}
