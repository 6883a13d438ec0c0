use crate::config::ModelConfig;
use crate::data::{Attrition, Dataset, FeatureSchema};
use crate::error::{PipelineError, Result};
use crate::evaluation::metrics::roc_auc;
use crate::ml::classifier::{build_classifier, has_both_classes, Classifier};
use crate::ml::models::{CandidateScore, Hyperparameters, ModelType, TrainingSummary};
use crate::ml::validation::ResamplingScheme;
use crate::preprocessing::FeatureEncoder;
use ndarray::{Array1, Array2, Axis};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of scoring a hyperparameter grid
#[derive(Debug, Clone)]
pub struct TuningOutcome {
    pub best: Hyperparameters,
    /// Mean AUC of the winner (None when no split could be scored)
    pub best_auc: Option<f64>,
    pub scores: Vec<CandidateScore>,
}

/// Fitted classifier together with the encoding of the schema it was fitted on
pub struct TrainedModel {
    schema: FeatureSchema,
    encoder: FeatureEncoder,
    classifier: Box<dyn Classifier>,
    summary: TrainingSummary,
    candidate_scores: Vec<CandidateScore>,
}

impl TrainedModel {
    pub fn model_id(&self) -> &str {
        &self.summary.model_id
    }

    pub fn model_type(&self) -> ModelType {
        self.summary.model_type
    }

    pub fn summary(&self) -> &TrainingSummary {
        &self.summary
    }

    /// Cross-validated score of every candidate considered, in grid order
    pub fn candidate_scores(&self) -> &[CandidateScore] {
        &self.candidate_scores
    }

    fn encode(&self, dataset: &Dataset) -> Result<Array2<f64>> {
        self.schema.ensure_compatible(dataset.schema())?;
        self.encoder.transform(dataset)
    }

    /// Probability of `Left` for every record
    pub fn predict_proba(&self, dataset: &Dataset) -> Result<Array1<f64>> {
        self.classifier.predict_proba(&self.encode(dataset)?)
    }

    pub fn predict(&self, dataset: &Dataset) -> Result<Vec<Attrition>> {
        self.classifier.predict(&self.encode(dataset)?)
    }
}

/// Fits and tunes classifiers over a shared resampling scheme
#[derive(Debug, Clone, Default)]
pub struct ModelTrainer {
    scheme: ResamplingScheme,
}

impl ModelTrainer {
    pub fn new(scheme: ResamplingScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> &ResamplingScheme {
        &self.scheme
    }

    /// Fit one hyperparameter configuration on the whole training set
    pub fn fit(
        &self,
        model_id: &str,
        train: &Dataset,
        hyperparameters: &Hyperparameters,
    ) -> Result<TrainedModel> {
        let started = Instant::now();
        let (x, y, encoder) = self.encode(train)?;
        let classifier = self.fit_matrix(hyperparameters, &x, &y)?;

        Ok(self.assemble(
            model_id,
            train,
            encoder,
            classifier,
            hyperparameters.clone(),
            &x,
            None,
            Vec::new(),
            started,
        ))
    }

    /// Score every candidate by mean hold-out ROC-AUC over the scheme's splits
    pub fn tune(&self, train: &Dataset, candidates: &[Hyperparameters]) -> Result<TuningOutcome> {
        let (x, y, _) = self.encode(train)?;
        self.tune_matrix(candidates, &x, &y)
    }

    /// Tune, then refit the best candidate on the whole training set
    pub fn fit_tuned(&self, model: &ModelConfig, train: &Dataset) -> Result<TrainedModel> {
        let started = Instant::now();
        let (x, y, encoder) = self.encode(train)?;

        // a single candidate is still cross-validated so its AUC is reported
        let tuning = self.tune_matrix(&model.candidates, &x, &y)?;

        let classifier = self.fit_matrix(&tuning.best, &x, &y)?;
        let trained = self.assemble(
            &model.id,
            train,
            encoder,
            classifier,
            tuning.best.clone(),
            &x,
            tuning.best_auc,
            tuning.scores,
            started,
        );

        info!(
            model_id = %model.id,
            model_type = %trained.model_type(),
            cv_auc = ?trained.summary.cv_auc,
            training_secs = trained.summary.training_time.as_secs_f64(),
            "Model trained"
        );
        Ok(trained)
    }

    fn encode(&self, train: &Dataset) -> Result<(Array2<f64>, Vec<Attrition>, FeatureEncoder)> {
        let encoder = FeatureEncoder::fit(train.schema());
        let x = encoder.transform(train)?;
        let y = train.labels()?;
        Ok((x, y, encoder))
    }

    fn fit_matrix(
        &self,
        hyperparameters: &Hyperparameters,
        x: &Array2<f64>,
        y: &[Attrition],
    ) -> Result<Box<dyn Classifier>> {
        let mut classifier = build_classifier(hyperparameters, &self.scheme);
        classifier.fit(x, y)?;
        Ok(classifier)
    }

    fn tune_matrix(
        &self,
        candidates: &[Hyperparameters],
        x: &Array2<f64>,
        y: &[Attrition],
    ) -> Result<TuningOutcome> {
        let first = candidates
            .first()
            .ok_or_else(|| PipelineError::train("tuning", "no hyperparameter candidates"))?;
        let splits = self.scheme.splits(y)?;

        let mut scores = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let mut aucs = Vec::new();
            for (index, split) in splits.iter().enumerate() {
                let holdout_labels: Vec<Attrition> =
                    split.holdout.iter().map(|&i| y[i]).collect();
                let train_labels: Vec<Attrition> = split.train.iter().map(|&i| y[i]).collect();
                if !has_both_classes(&holdout_labels) || !has_both_classes(&train_labels) {
                    warn!(split = index, "Skipping split that lacks a class");
                    continue;
                }

                let model = self.fit_matrix(
                    candidate,
                    &x.select(Axis(0), &split.train),
                    &train_labels,
                )?;
                let proba = model.predict_proba(&x.select(Axis(0), &split.holdout))?;
                if let Some(auc) = roc_auc(&proba.to_vec(), &holdout_labels, Attrition::Left) {
                    aucs.push(auc);
                }
            }

            let mean_auc = if aucs.is_empty() {
                f64::NAN
            } else {
                aucs.iter().sum::<f64>() / aucs.len() as f64
            };
            debug!(
                model_type = %candidate.model_type(),
                mean_auc,
                evaluated_splits = aucs.len(),
                "Candidate scored"
            );
            scores.push(CandidateScore {
                hyperparameters: candidate.clone(),
                mean_auc,
                evaluated_splits: aucs.len(),
            });
        }

        let best = scores
            .iter()
            .filter(|s| s.evaluated_splits > 0)
            .fold(None::<&CandidateScore>, |best, s| match best {
                Some(b) if b.mean_auc >= s.mean_auc => Some(b),
                _ => Some(s),
            })
            .map(|winner| (winner.hyperparameters.clone(), winner.mean_auc));

        Ok(match best {
            Some((best, auc)) => TuningOutcome {
                best,
                best_auc: Some(auc),
                scores,
            },
            None => {
                warn!("No split could be scored; keeping the first candidate");
                TuningOutcome {
                    best: first.clone(),
                    best_auc: None,
                    scores,
                }
            }
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        model_id: &str,
        train: &Dataset,
        encoder: FeatureEncoder,
        classifier: Box<dyn Classifier>,
        hyperparameters: Hyperparameters,
        x: &Array2<f64>,
        cv_auc: Option<f64>,
        candidate_scores: Vec<CandidateScore>,
        started: Instant,
    ) -> TrainedModel {
        let summary = TrainingSummary {
            model_id: model_id.to_string(),
            model_type: hyperparameters.model_type(),
            hyperparameters,
            n_training_samples: x.nrows(),
            n_features: x.ncols(),
            cv_auc,
            training_time: started.elapsed(),
            trained_at: chrono::Utc::now(),
        };

        TrainedModel {
            schema: train.schema().clone(),
            encoder,
            classifier,
            summary,
            candidate_scores,
        }
    }
}
