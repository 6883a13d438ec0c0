use crate::data::Attrition;
use crate::error::{PipelineError, Result};
use crate::ml::classifier::{check_training_input, labels_to_targets, not_trained, Classifier};
use crate::ml::models::{Kernel, ModelType, SvmParams};
use crate::preprocessing::Standardizer;
use linfa::dataset::Pr;
use linfa::prelude::*;
use linfa_svm::Svm;
use ndarray::{Array1, Array2};
use tracing::debug;

/// Kernel SVM with Platt-scaled probabilities, trained on standardized features
pub struct SvmClassifier {
    params: SvmParams,
    scaler: Option<Standardizer>,
    model: Option<Svm<f64, Pr>>,
}

impl SvmClassifier {
    pub fn new(params: SvmParams) -> Self {
        Self {
            params,
            scaler: None,
            model: None,
        }
    }
}

impl Classifier for SvmClassifier {
    fn fit(&mut self, features: &Array2<f64>, labels: &[Attrition]) -> Result<()> {
        check_training_input(ModelType::Svm, features, labels)?;

        let scaler = Standardizer::fit(features);
        let dataset = Dataset::new(scaler.transform(features), labels_to_targets(labels));

        let c = self.params.c;
        let base = Svm::<f64, Pr>::params().pos_neg_weights(c, c);
        let params = match self.params.kernel {
            Kernel::Linear => base.linear_kernel(),
            Kernel::Gaussian { eps } => base.gaussian_kernel(eps),
            Kernel::Polynomial { constant, degree } => base.polynomial_kernel(constant, degree),
        };

        let model = params
            .fit(&dataset)
            .map_err(|e| PipelineError::train(ModelType::Svm.to_string(), e.to_string()))?;

        debug!(support_vectors = model.nsupport(), c, "SVM fitted");

        self.scaler = Some(scaler);
        self.model = Some(model);
        Ok(())
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array1<f64>> {
        let (scaler, model) = match (&self.scaler, &self.model) {
            (Some(scaler), Some(model)) => (scaler, model),
            _ => return Err(not_trained(ModelType::Svm)),
        };

        let predictions: Array1<Pr> = model.predict(&scaler.transform(features));
        Ok(predictions.mapv(|p| f64::from(*p)))
    }

    fn model_type(&self) -> ModelType {
        ModelType::Svm
    }

    fn is_trained(&self) -> bool {
        self.model.is_some()
    }
}
