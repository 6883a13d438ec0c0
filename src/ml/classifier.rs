use crate::data::Attrition;
use crate::error::{PipelineError, Result};
use crate::ml::boosting::GradientBoostingClassifier;
use crate::ml::forest::RandomForestClassifier;
use crate::ml::logistic::LogisticRegressionClassifier;
use crate::ml::models::{Hyperparameters, ModelType};
use crate::ml::stacking::StackingClassifier;
use crate::ml::svm::SvmClassifier;
use crate::ml::validation::ResamplingScheme;
use ndarray::{Array1, Array2};
use smartcore::linalg::basic::matrix::DenseMatrix;

/// Binary attrition classifier over an encoded feature matrix
pub trait Classifier: Send + Sync {
    /// Train the classifier
    fn fit(&mut self, features: &Array2<f64>, labels: &[Attrition]) -> Result<()>;

    /// Probability of the `Left` class for every row
    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array1<f64>>;

    /// Predict class labels
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<Attrition>> {
        Ok(self
            .predict_proba(features)?
            .iter()
            .map(|&p| Attrition::from_bool(p >= 0.5))
            .collect())
    }

    /// Get model type
    fn model_type(&self) -> ModelType;

    /// Check if model is trained
    fn is_trained(&self) -> bool;
}

/// Instantiate an untrained classifier for a hyperparameter configuration
pub fn build_classifier(
    hyperparameters: &Hyperparameters,
    scheme: &ResamplingScheme,
) -> Box<dyn Classifier> {
    match hyperparameters {
        Hyperparameters::Svm(params) => Box::new(SvmClassifier::new(params.clone())),
        Hyperparameters::RandomForest(params) => {
            Box::new(RandomForestClassifier::new(params.clone()))
        }
        Hyperparameters::GradientBoosting(params) => {
            Box::new(GradientBoostingClassifier::new(params.clone()))
        }
        Hyperparameters::LogisticRegression(params) => {
            Box::new(LogisticRegressionClassifier::new(params.clone()))
        }
        Hyperparameters::Stacking(params) => {
            Box::new(StackingClassifier::new(params.clone(), scheme.clone()))
        }
    }
}

/// Reject inputs no binary classifier can be fitted on
pub(crate) fn check_training_input(
    model: ModelType,
    features: &Array2<f64>,
    labels: &[Attrition],
) -> Result<()> {
    if features.nrows() != labels.len() {
        return Err(PipelineError::train(
            model.to_string(),
            format!(
                "{} feature rows but {} labels",
                features.nrows(),
                labels.len()
            ),
        ));
    }
    if features.ncols() == 0 {
        return Err(PipelineError::train(model.to_string(), "no features to fit on"));
    }
    if !has_both_classes(labels) {
        return Err(PipelineError::train(
            model.to_string(),
            "training data must contain both classes",
        ));
    }
    Ok(())
}

pub(crate) fn has_both_classes(labels: &[Attrition]) -> bool {
    labels.iter().any(|l| l.is_left()) && labels.iter().any(|l| !l.is_left())
}

pub(crate) fn not_trained(model: ModelType) -> PipelineError {
    PipelineError::train(model.to_string(), "model not trained")
}

pub(crate) fn ndarray_to_densematrix(arr: &Array2<f64>) -> DenseMatrix<f64> {
    let shape = arr.shape();
    let data: Vec<f64> = arr.iter().copied().collect();
    DenseMatrix::new(shape[0], shape[1], data, false)
}

pub(crate) fn labels_to_targets(labels: &[Attrition]) -> Array1<bool> {
    labels.iter().map(|l| l.is_left()).collect()
}
