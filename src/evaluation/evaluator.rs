use crate::data::{Attrition, Dataset};
use crate::error::{PipelineError, Result};
use crate::evaluation::metrics::{roc_auc, ConfusionMatrix};
use crate::ml::{ModelType, TrainedModel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::info;

/// Held-out performance of one trained model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub model_id: String,
    pub model_type: ModelType,
    pub positive_class: Attrition,
    pub confusion_matrix: ConfusionMatrix,
    pub accuracy: f64,
    pub recall: f64,
    pub precision: f64,
    pub f1_score: f64,
    /// None when the test set holds a single class
    pub roc_auc: Option<f64>,
    #[serde(with = "crate::ml::models::duration_secs")]
    pub training_time: Duration,
    /// Cross-validated AUC of the chosen hyperparameters
    pub cv_auc: Option<f64>,
}

/// Evaluation reports keyed by model identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub test_size: usize,
    pub positive_class: Attrition,
    pub reports: BTreeMap<String, EvaluationReport>,
}

impl ComparisonReport {
    pub fn get(&self, model_id: &str) -> Option<&EvaluationReport> {
        self.reports.get(model_id)
    }

    /// Model with the highest test ROC-AUC (accuracy when AUC is unavailable)
    pub fn best_model(&self) -> Option<&EvaluationReport> {
        self.reports.values().max_by(|a, b| {
            let key = |r: &EvaluationReport| r.roc_auc.unwrap_or(r.accuracy);
            key(a).total_cmp(&key(b))
        })
    }
}

/// Scores models on one fixed test set with one positive-class definition
pub struct Evaluator {
    test: Dataset,
    labels: Vec<Attrition>,
    positive: Attrition,
}

impl Evaluator {
    pub fn new(test: Dataset, positive: Attrition) -> Result<Self> {
        if test.is_empty() {
            return Err(PipelineError::Load("test set is empty".to_string()));
        }
        let labels = test.labels()?;
        Ok(Self {
            test,
            labels,
            positive,
        })
    }

    pub fn test_set(&self) -> &Dataset {
        &self.test
    }

    pub fn positive_class(&self) -> Attrition {
        self.positive
    }

    pub fn evaluate(&self, model: &TrainedModel) -> Result<EvaluationReport> {
        let predicted = model.predict(&self.test)?;
        let proba = model.predict_proba(&self.test)?;
        let scores: Vec<f64> = match self.positive {
            Attrition::Left => proba.to_vec(),
            Attrition::Stayed => proba.iter().map(|p| 1.0 - p).collect(),
        };

        let matrix = ConfusionMatrix::from_predictions(&self.labels, &predicted, self.positive);
        let summary = model.summary();

        Ok(EvaluationReport {
            model_id: summary.model_id.clone(),
            model_type: summary.model_type,
            positive_class: self.positive,
            confusion_matrix: matrix,
            accuracy: matrix.accuracy(),
            recall: matrix.recall(),
            precision: matrix.precision(),
            f1_score: matrix.f1_score(),
            roc_auc: roc_auc(&scores, &self.labels, self.positive),
            training_time: summary.training_time,
            cv_auc: summary.cv_auc,
        })
    }

    /// Evaluate every model on the same test set
    pub fn compare<'a, I>(&self, models: I) -> Result<ComparisonReport>
    where
        I: IntoIterator<Item = &'a TrainedModel>,
    {
        let mut reports = BTreeMap::new();
        for model in models {
            let report = self.evaluate(model)?;
            info!(
                model_id = %report.model_id,
                accuracy = report.accuracy,
                recall = report.recall,
                precision = report.precision,
                f1 = report.f1_score,
                roc_auc = ?report.roc_auc,
                "Model evaluated"
            );
            reports.insert(report.model_id.clone(), report);
        }

        let comparison = ComparisonReport {
            test_size: self.test.len(),
            positive_class: self.positive,
            reports,
        };
        if let Some(best) = comparison.best_model() {
            info!(
                best_model = %best.model_id,
                models = comparison.reports.len(),
                test_size = comparison.test_size,
                "Model comparison complete"
            );
        }
        Ok(comparison)
    }
}
