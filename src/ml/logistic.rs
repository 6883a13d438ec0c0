use crate::data::Attrition;
use crate::error::{PipelineError, Result};
use crate::ml::classifier::{check_training_input, labels_to_targets, not_trained, Classifier};
use crate::ml::models::{LogisticParams, ModelType};
use crate::preprocessing::Standardizer;
use linfa::prelude::*;
use linfa_logistic::{FittedLogisticRegression, LogisticRegression};
use ndarray::{s, Array1, Array2};

/// L2-regularized logistic regression, used standalone and as the stacking meta-model
pub struct LogisticRegressionClassifier {
    params: LogisticParams,
    scaler: Option<Standardizer>,
    model: Option<FittedLogisticRegression<f64, bool>>,
    // whether linfa's reported probability is for `true` (= Left)
    probability_of_left: bool,
}

impl LogisticRegressionClassifier {
    pub fn new(params: LogisticParams) -> Self {
        Self {
            params,
            scaler: None,
            model: None,
            probability_of_left: true,
        }
    }
}

impl Classifier for LogisticRegressionClassifier {
    fn fit(&mut self, features: &Array2<f64>, labels: &[Attrition]) -> Result<()> {
        check_training_input(ModelType::LogisticRegression, features, labels)?;

        let scaler = Standardizer::fit(features);
        let scaled = scaler.transform(features);
        let dataset = Dataset::new(scaled.clone(), labels_to_targets(labels));

        let model = LogisticRegression::default()
            .alpha(self.params.alpha)
            .max_iterations(self.params.max_iterations)
            .fit(&dataset)
            .map_err(|e| {
                PipelineError::train(ModelType::LogisticRegression.to_string(), e.to_string())
            })?;

        let probe = scaled.slice(s![0..1, ..]).to_owned();
        let p = model.predict_probabilities(&probe)[0];
        let predicted: Array1<bool> = model.predict(&probe);
        self.probability_of_left = if p >= 0.5 { predicted[0] } else { !predicted[0] };

        self.scaler = Some(scaler);
        self.model = Some(model);
        Ok(())
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array1<f64>> {
        let (scaler, model) = match (&self.scaler, &self.model) {
            (Some(scaler), Some(model)) => (scaler, model),
            _ => return Err(not_trained(ModelType::LogisticRegression)),
        };

        let p = model.predict_probabilities(&scaler.transform(features));
        Ok(if self.probability_of_left {
            p
        } else {
            p.mapv(|v| 1.0 - v)
        })
    }

    fn model_type(&self) -> ModelType {
        ModelType::LogisticRegression
    }

    fn is_trained(&self) -> bool {
        self.model.is_some()
    }
}
