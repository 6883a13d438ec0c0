use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Model family enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// Support vector machine with kernel
    Svm,

    /// Bagged decision trees
    RandomForest,

    /// Gradient-boosted trees
    GradientBoosting,

    /// Logistic regression
    LogisticRegression,

    /// Stacked ensemble with a logistic meta-model
    Stacking,
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelType::Svm => write!(f, "Support Vector Machine"),
            ModelType::RandomForest => write!(f, "Random Forest"),
            ModelType::GradientBoosting => write!(f, "Gradient Boosting"),
            ModelType::LogisticRegression => write!(f, "Logistic Regression"),
            ModelType::Stacking => write!(f, "Stacking Ensemble"),
        }
    }
}

/// SVM kernel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Kernel {
    Linear,

    /// `exp(-||x - y||² / eps)`
    Gaussian { eps: f64 },

    /// `(<x, y> + constant)^degree`
    Polynomial { constant: f64, degree: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvmParams {
    /// Misclassification penalty, applied to both classes
    pub c: f64,
    pub kernel: Kernel,
}

impl Default for SvmParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            kernel: Kernel::Gaussian { eps: 10.0 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: u16,
    /// Features sampled per tree (square root of total if None)
    pub max_features: Option<usize>,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Random seed
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: 10,
            max_features: None,
            min_samples_leaf: 1,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingParams {
    /// Number of boosting iterations (trees)
    pub n_estimators: usize,
    /// Learning rate (shrinkage)
    pub learning_rate: f64,
    /// Maximum depth of each tree
    pub max_depth: u16,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Subsample ratio of the training instances
    pub subsample: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 150,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 5,
            subsample: 0.8,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticParams {
    /// L2 penalty
    pub alpha: f64,
    pub max_iterations: u64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            max_iterations: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackingParams {
    /// Base models, fitted independently on the shared resampling splits
    pub base: Vec<Hyperparameters>,

    /// Meta-model fitted on the base models' out-of-fold probabilities
    #[serde(default)]
    pub meta: LogisticParams,
}

/// Hyperparameter configuration, one variant per model family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum Hyperparameters {
    Svm(SvmParams),
    RandomForest(ForestParams),
    GradientBoosting(BoostingParams),
    LogisticRegression(LogisticParams),
    Stacking(StackingParams),
}

impl Hyperparameters {
    pub fn model_type(&self) -> ModelType {
        match self {
            Hyperparameters::Svm(_) => ModelType::Svm,
            Hyperparameters::RandomForest(_) => ModelType::RandomForest,
            Hyperparameters::GradientBoosting(_) => ModelType::GradientBoosting,
            Hyperparameters::LogisticRegression(_) => ModelType::LogisticRegression,
            Hyperparameters::Stacking(_) => ModelType::Stacking,
        }
    }
}

/// Mean cross-validated AUC of one hyperparameter candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateScore {
    pub hyperparameters: Hyperparameters,
    pub mean_auc: f64,
    pub evaluated_splits: usize,
}

/// What was fitted, on how much data, and how long it took
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub model_id: String,
    pub model_type: ModelType,
    pub hyperparameters: Hyperparameters,
    pub n_training_samples: usize,
    pub n_features: usize,
    /// Cross-validated AUC of the chosen candidate, when tuning ran
    pub cv_auc: Option<f64>,
    #[serde(with = "duration_secs")]
    pub training_time: Duration,
    pub trained_at: chrono::DateTime<chrono::Utc>,
}

pub(crate) mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(secs.max(0.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_type_display() {
        assert_eq!(ModelType::Svm.to_string(), "Support Vector Machine");
        assert_eq!(ModelType::RandomForest.to_string(), "Random Forest");
        assert_eq!(ModelType::Stacking.to_string(), "Stacking Ensemble");
    }

    #[test]
    fn test_hyperparameters_tagged_json() {
        let params = Hyperparameters::GradientBoosting(BoostingParams::default());
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["model"], "gradient_boosting");
        assert_eq!(json["n_estimators"], 150);

        let parsed: Hyperparameters =
            serde_json::from_str(r#"{"model":"svm","kernel":{"type":"linear"}}"#).unwrap();
        assert_eq!(
            parsed,
            Hyperparameters::Svm(SvmParams {
                c: 1.0,
                kernel: Kernel::Linear
            })
        );
        assert_eq!(parsed.model_type(), ModelType::Svm);
    }
}
