use crate::config::Config;
use crate::data::{DataLoader, Dataset};
use crate::error::{Result, Stage, StageContext};
use crate::evaluation::ComparisonReport;
use crate::pipeline::{split_train_evaluate, ClassBalance};
use crate::preprocessing::{Cleaner, FeatureImportance, FeatureSelector};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

/// Everything a tabular run produced
#[derive(Debug, Clone, Serialize)]
pub struct AttritionReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub records: usize,
    /// Zero-variance features removed by the cleaner
    pub dropped_features: Vec<String>,
    /// Features converted to categorical
    pub coerced_features: Vec<String>,
    /// Permutation importance, most important first
    pub importance: Vec<FeatureImportance>,
    /// Least important features removed by selection
    pub deselected_features: Vec<String>,
    pub selected_features: Vec<String>,
    pub class_balance: ClassBalance,
    pub comparison: ComparisonReport,
}

/// clean → select → split → resample (train only) → tune/fit → evaluate
pub struct AttritionPipeline {
    config: Config,
}

impl AttritionPipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn run_path<P: AsRef<Path>>(&self, path: P) -> Result<AttritionReport> {
        let dataset = DataLoader::from_config(&self.config.data)
            .load_path(path)
            .stage(Stage::Loading)?;
        self.run(&dataset)
    }

    pub fn run(&self, dataset: &Dataset) -> Result<AttritionReport> {
        let run_id = Uuid::new_v4();
        info!(run_id = %run_id, records = dataset.len(), "Attrition pipeline started");

        let cleaned = Cleaner::from_config(&self.config.cleaning)
            .clean(dataset)
            .stage(Stage::Cleaning)?;

        let selection = FeatureSelector::from_config(&self.config.selection)
            .select(&cleaned.dataset)
            .stage(Stage::Selection)?;

        let resampling = self
            .config
            .resampling
            .enabled
            .then_some(&self.config.resampling);
        let (class_balance, comparison) = split_train_evaluate(
            &selection.dataset,
            &self.config.training,
            resampling,
            &self.config.training.models,
        )?;

        let selected_features = selection
            .dataset
            .schema()
            .names()
            .into_iter()
            .map(String::from)
            .collect();

        info!(
            run_id = %run_id,
            models = comparison.reports.len(),
            best = comparison.best_model().map(|r| r.model_id.as_str()).unwrap_or("-"),
            "Attrition pipeline finished"
        );

        Ok(AttritionReport {
            run_id,
            generated_at: Utc::now(),
            records: dataset.len(),
            dropped_features: cleaned.dropped,
            coerced_features: cleaned.coerced,
            importance: selection.ranking,
            deselected_features: selection.dropped,
            selected_features,
            class_balance,
            comparison,
        })
    }
}
