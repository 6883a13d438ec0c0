use crate::data::Attrition;
use crate::error::{PipelineError, Result};
use crate::ml::classifier::{check_training_input, ndarray_to_densematrix, not_trained, Classifier};
use crate::ml::models::{BoostingParams, ModelType};
use ndarray::{Array1, Array2, Axis};
use rand::seq::index::sample;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_regressor::{
    DecisionTreeRegressor, DecisionTreeRegressorParameters,
};
use tracing::debug;

type Stage = DecisionTreeRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

const PROBABILITY_FLOOR: f64 = 1e-6;

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Stochastic gradient boosting on the logistic loss with regression-tree stages
pub struct GradientBoostingClassifier {
    params: BoostingParams,
    initial_score: f64,
    stages: Vec<Stage>,
}

impl GradientBoostingClassifier {
    pub fn new(params: BoostingParams) -> Self {
        Self {
            params,
            initial_score: 0.0,
            stages: Vec::new(),
        }
    }

    fn validate(&self) -> Result<()> {
        let p = &self.params;
        let problem = if p.n_estimators == 0 {
            Some("n_estimators must be at least 1")
        } else if !(p.learning_rate > 0.0 && p.learning_rate <= 1.0) {
            Some("learning_rate must be in (0, 1]")
        } else if !(p.subsample > 0.0 && p.subsample <= 1.0) {
            Some("subsample must be in (0, 1]")
        } else {
            None
        };
        match problem {
            Some(message) => Err(PipelineError::train(
                ModelType::GradientBoosting.to_string(),
                message,
            )),
            None => Ok(()),
        }
    }

    fn stage_error(e: smartcore::error::Failed) -> PipelineError {
        PipelineError::train(ModelType::GradientBoosting.to_string(), e.to_string())
    }

    /// Raw additive scores (log-odds of leaving)
    fn decision_function(&self, features: &Array2<f64>) -> Result<Array1<f64>> {
        let x = ndarray_to_densematrix(features);
        let mut scores = Array1::from_elem(features.nrows(), self.initial_score);
        for stage in &self.stages {
            let update = stage.predict(&x).map_err(Self::stage_error)?;
            for (score, delta) in scores.iter_mut().zip(update) {
                *score += self.params.learning_rate * delta;
            }
        }
        Ok(scores)
    }
}

impl Classifier for GradientBoostingClassifier {
    fn fit(&mut self, features: &Array2<f64>, labels: &[Attrition]) -> Result<()> {
        check_training_input(ModelType::GradientBoosting, features, labels)?;
        self.validate()?;

        let n = features.nrows();
        let targets: Vec<f64> = labels.iter().map(|l| f64::from(u8::from(l.is_left()))).collect();
        let prior = (targets.iter().sum::<f64>() / n as f64)
            .clamp(PROBABILITY_FLOOR, 1.0 - PROBABILITY_FLOOR);
        let initial_score = (prior / (1.0 - prior)).ln();

        let parameters = DecisionTreeRegressorParameters::default()
            .with_max_depth(self.params.max_depth)
            .with_min_samples_leaf(self.params.min_samples_leaf.max(1));
        let sample_size = ((self.params.subsample * n as f64).round() as usize).clamp(2.min(n), n);
        let full = ndarray_to_densematrix(features);
        let mut rng = ChaCha8Rng::seed_from_u64(self.params.seed);

        let mut scores = vec![initial_score; n];
        let mut stages = Vec::with_capacity(self.params.n_estimators);

        for _ in 0..self.params.n_estimators {
            let residuals: Vec<f64> = targets
                .iter()
                .zip(&scores)
                .map(|(y, f)| y - sigmoid(*f))
                .collect();

            let rows = if sample_size < n {
                let mut rows = sample(&mut rng, n, sample_size).into_vec();
                rows.sort_unstable();
                rows
            } else {
                (0..n).collect()
            };
            let x = ndarray_to_densematrix(&features.select(Axis(0), &rows));
            let r: Vec<f64> = rows.iter().map(|&i| residuals[i]).collect();

            let stage = Stage::fit(&x, &r, parameters.clone()).map_err(Self::stage_error)?;
            let update = stage.predict(&full).map_err(Self::stage_error)?;
            for (score, delta) in scores.iter_mut().zip(update) {
                *score += self.params.learning_rate * delta;
            }
            stages.push(stage);
        }

        debug!(
            stages = stages.len(),
            learning_rate = self.params.learning_rate,
            "Gradient boosting fitted"
        );
        self.initial_score = initial_score;
        self.stages = stages;
        Ok(())
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array1<f64>> {
        if self.stages.is_empty() {
            return Err(not_trained(ModelType::GradientBoosting));
        }
        Ok(self.decision_function(features)?.mapv(sigmoid))
    }

    fn model_type(&self) -> ModelType {
        ModelType::GradientBoosting
    }

    fn is_trained(&self) -> bool {
        !self.stages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_boosting_learns_threshold() {
        let x = array![
            [0.0],
            [1.0],
            [2.0],
            [3.0],
            [4.0],
            [5.0],
            [6.0],
            [7.0],
            [8.0],
            [9.0]
        ];
        let y: Vec<Attrition> = (0..10).map(|i| Attrition::from_bool(i >= 5)).collect();

        let mut model = GradientBoostingClassifier::new(BoostingParams {
            n_estimators: 30,
            learning_rate: 0.3,
            max_depth: 2,
            min_samples_leaf: 1,
            subsample: 1.0,
            seed: 1,
        });
        model.fit(&x, &y).unwrap();

        let proba = model.predict_proba(&x).unwrap();
        assert!(proba[9] > 0.5);
        assert!(proba[0] < 0.5);
        assert!(proba.iter().all(|p| *p > 0.0 && *p < 1.0));
    }

    #[test]
    fn test_invalid_learning_rate() {
        let mut model = GradientBoostingClassifier::new(BoostingParams {
            learning_rate: 0.0,
            ..Default::default()
        });
        let err = model
            .fit(&array![[0.0], [1.0]], &[Attrition::Stayed, Attrition::Left])
            .unwrap_err();
        assert!(err.to_string().contains("learning_rate"));
    }

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(10.0) > 0.99);
    }
}
