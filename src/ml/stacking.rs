use crate::data::Attrition;
use crate::error::{PipelineError, Result};
use crate::ml::classifier::{
    build_classifier, check_training_input, has_both_classes, not_trained, Classifier,
};
use crate::ml::logistic::LogisticRegressionClassifier;
use crate::ml::models::{ModelType, StackingParams};
use crate::ml::validation::ResamplingScheme;
use ndarray::{Array1, Array2, Axis};
use tracing::{debug, warn};

/// Base models combined by a logistic meta-model over their out-of-fold probabilities
pub struct StackingClassifier {
    params: StackingParams,
    scheme: ResamplingScheme,
    bases: Vec<Box<dyn Classifier>>,
    meta: Option<LogisticRegressionClassifier>,
}

impl StackingClassifier {
    pub fn new(params: StackingParams, scheme: ResamplingScheme) -> Self {
        Self {
            params,
            scheme,
            bases: Vec::new(),
            meta: None,
        }
    }

    fn error(message: impl Into<String>) -> PipelineError {
        PipelineError::train(ModelType::Stacking.to_string(), message)
    }

    /// Average hold-out probability of every base model per row, and which rows were ever held out
    fn out_of_fold(
        &self,
        features: &Array2<f64>,
        labels: &[Attrition],
    ) -> Result<(Array2<f64>, Vec<usize>)> {
        let n = features.nrows();
        let k = self.params.base.len();
        let mut sums = Array2::<f64>::zeros((n, k));
        let mut counts = vec![0usize; n];

        for (index, split) in self.scheme.splits(labels)?.into_iter().enumerate() {
            if split.holdout.is_empty() {
                continue;
            }
            let train_labels: Vec<Attrition> = split.train.iter().map(|&i| labels[i]).collect();
            if !has_both_classes(&train_labels) {
                warn!(split = index, "Skipping stacking split with a single training class");
                continue;
            }

            let train = features.select(Axis(0), &split.train);
            let holdout = features.select(Axis(0), &split.holdout);

            for (j, hyperparameters) in self.params.base.iter().enumerate() {
                let mut model = build_classifier(hyperparameters, &self.scheme);
                model.fit(&train, &train_labels)?;
                let proba = model.predict_proba(&holdout)?;
                for (&row, p) in split.holdout.iter().zip(proba.iter()) {
                    sums[[row, j]] += p;
                }
            }
            for &row in &split.holdout {
                counts[row] += 1;
            }
        }

        let rows: Vec<usize> = (0..n).filter(|&i| counts[i] > 0).collect();
        let mut meta_features = sums.select(Axis(0), &rows);
        for (mut row, &i) in meta_features.axis_iter_mut(Axis(0)).zip(&rows) {
            row /= counts[i] as f64;
        }
        Ok((meta_features, rows))
    }

    fn base_probabilities(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        let mut columns = Array2::zeros((features.nrows(), self.bases.len()));
        for (j, base) in self.bases.iter().enumerate() {
            columns.column_mut(j).assign(&base.predict_proba(features)?);
        }
        Ok(columns)
    }
}

impl Classifier for StackingClassifier {
    fn fit(&mut self, features: &Array2<f64>, labels: &[Attrition]) -> Result<()> {
        check_training_input(ModelType::Stacking, features, labels)?;
        if self.params.base.is_empty() {
            return Err(Self::error("at least one base model is required"));
        }
        if self
            .params
            .base
            .iter()
            .any(|h| h.model_type() == ModelType::Stacking)
        {
            return Err(Self::error("stacking models cannot be nested"));
        }

        let (meta_features, rows) = self.out_of_fold(features, labels)?;
        let meta_labels: Vec<Attrition> = rows.iter().map(|&i| labels[i]).collect();
        if !has_both_classes(&meta_labels) {
            return Err(Self::error(
                "out-of-fold predictions do not cover both classes",
            ));
        }

        let mut meta = LogisticRegressionClassifier::new(self.params.meta.clone());
        meta.fit(&meta_features, &meta_labels)?;

        let mut bases = Vec::with_capacity(self.params.base.len());
        for hyperparameters in &self.params.base {
            let mut model = build_classifier(hyperparameters, &self.scheme);
            model.fit(features, labels)?;
            bases.push(model);
        }

        debug!(
            base_models = bases.len(),
            meta_rows = rows.len(),
            "Stacking ensemble fitted"
        );
        self.bases = bases;
        self.meta = Some(meta);
        Ok(())
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array1<f64>> {
        let meta = self
            .meta
            .as_ref()
            .ok_or_else(|| not_trained(ModelType::Stacking))?;
        meta.predict_proba(&self.base_probabilities(features)?)
    }

    fn model_type(&self) -> ModelType {
        ModelType::Stacking
    }

    fn is_trained(&self) -> bool {
        self.meta.is_some()
    }
}
