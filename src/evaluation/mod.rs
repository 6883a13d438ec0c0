/// Held-out evaluation and model comparison

pub mod evaluator;
pub mod metrics;

pub use evaluator::{ComparisonReport, EvaluationReport, Evaluator};
pub use metrics::{roc_auc, ConfusionMatrix};
