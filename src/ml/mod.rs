/// Machine learning module for attrition classification
///
/// This module provides:
/// - A shared `Classifier` interface over encoded feature matrices
/// - Kernel SVM, random forest, gradient boosting, logistic regression and stacking
/// - Bootstrap / repeated k-fold resampling schemes
/// - Hyperparameter tuning by cross-validated ROC-AUC

pub mod boosting;
pub mod classifier;
pub mod forest;
pub mod logistic;
pub mod models;
pub mod stacking;
pub mod svm;
pub mod trainer;
pub mod validation;

pub use boosting::GradientBoostingClassifier;
pub use classifier::{build_classifier, Classifier};
pub use forest::RandomForestClassifier;
pub use logistic::LogisticRegressionClassifier;
pub use models::{
    BoostingParams, CandidateScore, ForestParams, Hyperparameters, Kernel, LogisticParams,
    ModelType, StackingParams, SvmParams, TrainingSummary,
};
pub use stacking::StackingClassifier;
pub use svm::SvmClassifier;
pub use trainer::{ModelTrainer, TrainedModel, TuningOutcome};
pub use validation::{ResamplingMethod, ResamplingScheme, Split};
