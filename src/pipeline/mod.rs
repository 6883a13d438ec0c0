/// End-to-end runs: the tabular attrition pipeline and the text sentiment pipeline
///
/// Each stage consumes the previous stage's output explicitly; any stage error
/// aborts the run with the stage name attached and no partial report.

pub mod attrition;
pub mod sentiment;

pub use attrition::{AttritionPipeline, AttritionReport};
pub use sentiment::{SentimentPipeline, SentimentReport};

use crate::config::{ModelConfig, ResamplingConfig, TrainingConfig};
use crate::data::{Attrition, ClassCounts, Dataset};
use crate::error::{PipelineError, Result, Stage, StageContext};
use crate::evaluation::{ComparisonReport, Evaluator};
use crate::ml::{ModelTrainer, TrainedModel};
use crate::preprocessing::Resampler;
use serde::Serialize;
use tracing::info;

/// Training-split class counts before and after resampling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassBalance {
    pub before: ClassCounts,
    pub after: ClassCounts,
}

/// Split, optionally rebalance the train side, then train and evaluate every model.
/// The test side is never touched by resampling.
pub(crate) fn split_train_evaluate(
    dataset: &Dataset,
    training: &TrainingConfig,
    resampling: Option<&ResamplingConfig>,
    models: &[ModelConfig],
) -> Result<(ClassBalance, ComparisonReport)> {
    let (train, test) = dataset
        .stratified_split(training.train_fraction, training.split_seed)
        .stage(Stage::Splitting)?;
    info!(train = train.len(), test = test.len(), "Dataset split");

    let before = train.class_counts();
    let train = match resampling {
        Some(config) => {
            Resampler::from_config(config)
                .resample(&train)
                .stage(Stage::Resampling)?
                .dataset
        }
        None => train,
    };
    let after = train.class_counts();
    info!(
        minority_share_before = minority_share(&before),
        minority_share_after = minority_share(&after),
        records = train.len(),
        "Training split prepared"
    );

    let trained = train_models(&train, training, models).stage(Stage::Training)?;

    let comparison = Evaluator::new(test, training.positive_class)
        .and_then(|evaluator| evaluator.compare(&trained))
        .stage(Stage::Evaluation)?;

    Ok((ClassBalance { before, after }, comparison))
}

fn train_models(
    train: &Dataset,
    training: &TrainingConfig,
    models: &[ModelConfig],
) -> Result<Vec<TrainedModel>> {
    if models.is_empty() {
        return Err(PipelineError::Configuration(
            "no models configured".to_string(),
        ));
    }

    let trainer = ModelTrainer::new(training.scheme.clone());
    models
        .iter()
        .map(|model| trainer.fit_tuned(model, train))
        .collect()
}

/// Minority class share of the training split, for log lines
fn minority_share(counts: &ClassCounts) -> f64 {
    let total = counts.left + counts.stayed;
    if total == 0 {
        return 0.0;
    }
    let minority = counts.get(Attrition::Left).min(counts.get(Attrition::Stayed));
    minority as f64 / total as f64
}
