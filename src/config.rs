use crate::data::Attrition;
use crate::error::Result;
use crate::ml::models::{
    BoostingParams, ForestParams, Hyperparameters, Kernel, LogisticParams, StackingParams,
    SvmParams,
};
use crate::ml::validation::ResamplingScheme;
use crate::text::{LanguageStrategy, Weighting};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Main pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    /// Input sources and label definition
    #[validate(nested)]
    pub data: DataConfig,

    /// Cleaner configuration
    #[validate(nested)]
    pub cleaning: CleaningConfig,

    /// Feature selection configuration
    #[validate(nested)]
    pub selection: SelectionConfig,

    /// Class-imbalance correction configuration
    #[validate(nested)]
    pub resampling: ResamplingConfig,

    /// Model training configuration
    #[validate(nested)]
    pub training: TrainingConfig,

    /// Text sentiment pipeline configuration
    #[validate(nested)]
    pub text: TextConfig,

    /// External translation/sentiment service configuration
    #[validate(nested)]
    pub service: ServiceConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the embedded defaults, an optional file and environment
    pub fn load() -> Result<Self> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/attrition.toml".to_string());

        let config: Config = config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: ATTRITION__)
            .add_source(
                config::Environment::with_prefix("ATTRITION")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a single TOML document
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DataConfig {
    /// Tabular employee file
    pub tabular_path: Option<PathBuf>,

    /// Free-text employee review file
    pub text_path: Option<PathBuf>,

    /// Column holding the binary outcome
    #[validate(length(min = 1))]
    pub label_column: String,

    /// Label value denoting the positive (left) class
    #[validate(length(min = 1))]
    pub positive_label: String,

    /// Field delimiter
    pub delimiter: char,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            tabular_path: None,
            text_path: None,
            label_column: "Attrition".to_string(),
            positive_label: "Yes".to_string(),
            delimiter: ',',
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CleaningConfig {
    /// Integer-coded ordinal/nominal columns treated as categorical
    pub categorical_columns: Vec<String>,

    /// Free-text column kept as text instead of becoming categorical
    pub text_column: Option<String>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            categorical_columns: [
                "Education",
                "EnvironmentSatisfaction",
                "JobInvolvement",
                "JobLevel",
                "JobSatisfaction",
                "PerformanceRating",
                "RelationshipSatisfaction",
                "StockOptionLevel",
                "WorkLifeBalance",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            text_column: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SelectionConfig {
    /// Number of least important features to drop
    pub drop_count: usize,

    /// Trees in the importance-ranking ensemble
    #[validate(range(min = 1))]
    pub importance_trees: usize,

    /// Permutations per feature when scoring importance
    #[validate(range(min = 1))]
    pub permutation_repeats: usize,

    pub seed: u64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            drop_count: 3,
            importance_trees: 100,
            permutation_repeats: 3,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ResamplingConfig {
    /// Apply SMOTE to the training split
    pub enabled: bool,

    /// Synthetic minority records per minority record, in percent
    #[validate(range(min = 1))]
    pub over_sample_pct: u32,

    /// Majority records kept per synthetic record, in percent
    #[validate(range(min = 1))]
    pub under_sample_pct: u32,

    /// Nearest minority neighbours used for interpolation
    #[validate(range(min = 1))]
    pub k_neighbors: usize,

    pub seed: u64,
}

impl Default for ResamplingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            over_sample_pct: 300,
            under_sample_pct: 150,
            k_neighbors: 5,
            seed: 42,
        }
    }
}

/// Candidate hyperparameters for one reported model
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ModelConfig {
    /// Identifier the evaluation report is keyed by
    #[validate(length(min = 1))]
    pub id: String,

    /// Hyperparameter grid; the best candidate by cross-validated AUC is kept
    #[validate(length(min = 1))]
    pub candidates: Vec<Hyperparameters>,
}

impl ModelConfig {
    pub fn new(id: impl Into<String>, candidates: Vec<Hyperparameters>) -> Self {
        Self {
            id: id.into(),
            candidates,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TrainingConfig {
    /// Fraction of records used for training
    #[validate(range(min = 0.05, max = 0.95))]
    pub train_fraction: f64,

    pub split_seed: u64,

    /// Class counted as positive by the evaluator
    pub positive_class: Attrition,

    /// Shared cross-validation scheme
    pub scheme: ResamplingScheme,

    #[validate(nested)]
    pub models: Vec<ModelConfig>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        let svm = Hyperparameters::Svm(SvmParams::default());
        let forest = Hyperparameters::RandomForest(ForestParams::default());
        let boosting = Hyperparameters::GradientBoosting(BoostingParams::default());

        Self {
            train_fraction: 0.7,
            split_seed: 42,
            positive_class: Attrition::Left,
            scheme: ResamplingScheme::default(),
            models: vec![
                ModelConfig::new(
                    "svm",
                    vec![
                        svm.clone(),
                        Hyperparameters::Svm(SvmParams {
                            c: 10.0,
                            kernel: Kernel::Gaussian { eps: 50.0 },
                        }),
                    ],
                ),
                ModelConfig::new(
                    "random_forest",
                    vec![
                        forest.clone(),
                        Hyperparameters::RandomForest(ForestParams {
                            max_depth: 6,
                            ..ForestParams::default()
                        }),
                    ],
                ),
                ModelConfig::new(
                    "gradient_boosting",
                    vec![
                        boosting.clone(),
                        Hyperparameters::GradientBoosting(BoostingParams {
                            learning_rate: 0.05,
                            n_estimators: 300,
                            ..BoostingParams::default()
                        }),
                    ],
                ),
                ModelConfig::new(
                    "stacking",
                    vec![Hyperparameters::Stacking(StackingParams {
                        base: vec![svm, forest, boosting],
                        meta: LogisticParams::default(),
                    })],
                ),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
#[serde(default)]
pub struct StopWordsConfig {
    /// Include the built-in English list
    pub english: bool,

    /// Additional lists, one term per line
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TextConfig {
    /// Column holding the review text
    #[validate(length(min = 1))]
    pub text_column: String,

    #[validate(nested)]
    pub stop_words: StopWordsConfig,

    /// How multi-lingual corpora are normalized
    pub strategy: LanguageStrategy,

    pub weighting: Weighting,

    /// Keep terms present in at least this fraction of documents (0 keeps all)
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_doc_fraction: f64,

    /// Append an external sentiment score feature
    pub use_sentiment: bool,

    /// Apply SMOTE to the text training split
    pub resample: bool,

    #[validate(nested)]
    pub models: Vec<ModelConfig>,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            text_column: "Review".to_string(),
            stop_words: StopWordsConfig {
                english: true,
                files: Vec::new(),
            },
            strategy: LanguageStrategy::Monolingual,
            weighting: Weighting::TermFrequency,
            min_doc_fraction: 0.01,
            use_sentiment: false,
            resample: false,
            models: vec![
                ModelConfig::new(
                    "logistic_regression",
                    vec![Hyperparameters::LogisticRegression(LogisticParams::default())],
                ),
                ModelConfig::new(
                    "random_forest",
                    vec![Hyperparameters::RandomForest(ForestParams::default())],
                ),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the translation/sentiment service
    pub endpoint: Option<String>,

    /// Environment variable holding the service credential
    #[validate(length(min = 1))]
    pub credential_env: String,

    /// Per-attempt timeout (seconds)
    #[validate(range(min = 1))]
    pub timeout_secs: u64,

    /// Retries after the first attempt
    pub max_retries: u32,

    /// Backoff before the first retry, doubled per attempt (milliseconds)
    pub retry_backoff_ms: u64,

    /// Backoff cap (milliseconds)
    pub max_backoff_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            credential_env: "ATTRITION_API_KEY".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            retry_backoff_ms: 500,
            max_backoff_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter used when RUST_LOG is unset
    pub log_filter: String,

    /// Emit JSON log lines
    pub log_json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "attrition_pipeline=info".to_string(),
            log_json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::validation::ResamplingMethod;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.selection.drop_count, 3);
        assert_eq!(config.resampling.over_sample_pct, 300);
        assert_eq!(config.training.models.len(), 4);
    }

    #[test]
    fn test_embedded_defaults_parse() {
        let config = Config::from_toml_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.data.label_column, "Attrition");
        assert_eq!(config.resampling.under_sample_pct, 150);
        assert_eq!(config.training.models.len(), 4);
    }

    #[test]
    fn test_model_grid_from_toml() {
        let toml = r#"
            [training]
            train_fraction = 0.8

            [training.scheme]
            seed = 7
            method = { type = "bootstrap", resamples = 10 }

            [[training.models]]
            id = "svm"

            [[training.models.candidates]]
            model = "svm"
            c = 2.0
            kernel = { type = "polynomial", constant = 1.0, degree = 2.0 }

            [[training.models]]
            id = "forest"

            [[training.models.candidates]]
            model = "random_forest"
            n_trees = 50
        "#;

        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.training.train_fraction, 0.8);
        assert_eq!(config.training.models.len(), 2);
        assert!(matches!(
            config.training.scheme.method,
            ResamplingMethod::Bootstrap { resamples: 10 }
        ));
        match &config.training.models[1].candidates[0] {
            Hyperparameters::RandomForest(params) => {
                assert_eq!(params.n_trees, 50);
                assert_eq!(params.max_depth, ForestParams::default().max_depth);
            }
            other => panic!("unexpected candidate {:?}", other),
        }
    }

    #[test]
    fn test_invalid_fraction_rejected() {
        let toml = "[text]\nmin_doc_fraction = 1.5\n";
        assert!(Config::from_toml_str(toml).is_err());
    }
}
