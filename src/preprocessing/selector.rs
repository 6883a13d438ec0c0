//! Permutation-importance feature selection

use crate::config::SelectionConfig;
use crate::data::{Attrition, Dataset, FeatureKind};
use crate::error::{PipelineError, Result};
use crate::ml::{Classifier, ForestParams, RandomForestClassifier};
use crate::preprocessing::encoder::FeatureEncoder;
use ndarray::{Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    /// Mean drop in training accuracy when the feature is permuted
    pub importance: f64,
}

#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    pub dataset: Dataset,
    /// Tabular features, most important first
    pub ranking: Vec<FeatureImportance>,
    pub dropped: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FeatureSelector {
    drop_count: usize,
    importance_trees: usize,
    permutation_repeats: usize,
    seed: u64,
}

impl FeatureSelector {
    pub fn new(drop_count: usize) -> Self {
        let defaults = SelectionConfig::default();
        Self {
            drop_count,
            importance_trees: defaults.importance_trees,
            permutation_repeats: defaults.permutation_repeats,
            seed: defaults.seed,
        }
    }

    pub fn from_config(config: &SelectionConfig) -> Self {
        Self {
            drop_count: config.drop_count,
            importance_trees: config.importance_trees,
            permutation_repeats: config.permutation_repeats,
            seed: config.seed,
        }
    }

    pub fn with_importance_trees(mut self, trees: usize) -> Self {
        self.importance_trees = trees;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Rank tabular features by permutation importance (stable on ties)
    pub fn rank(&self, dataset: &Dataset) -> Result<Vec<FeatureImportance>> {
        let encoder = FeatureEncoder::fit(dataset.schema());
        let x = encoder.transform(dataset)?;
        let y = dataset.labels()?;

        let mut forest = RandomForestClassifier::new(ForestParams {
            n_trees: self.importance_trees,
            seed: self.seed,
            ..ForestParams::default()
        });
        forest.fit(&x, &y)?;
        let baseline = accuracy(&forest, &x, &y)?;
        let repeats = self.permutation_repeats.max(1);

        let mut ranking = encoder
            .groups()
            .par_iter()
            .enumerate()
            .map(|(g, group)| -> Result<FeatureImportance> {
                let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(g as u64));
                let mut order: Vec<usize> = (0..x.nrows()).collect();
                let mut total_drop = 0.0;

                for _ in 0..repeats {
                    order.shuffle(&mut rng);
                    let shuffled = x.select(Axis(0), &order);
                    let mut permuted = x.clone();
                    for col in group.columns.clone() {
                        permuted.column_mut(col).assign(&shuffled.column(col));
                    }
                    total_drop += baseline - accuracy(&forest, &permuted, &y)?;
                }

                Ok(FeatureImportance {
                    feature: group.feature.clone(),
                    importance: total_drop / repeats as f64,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        ranking.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        debug!(baseline_accuracy = baseline, features = ranking.len(), "Features ranked");
        Ok(ranking)
    }

    /// Keep the `total - drop_count` most important tabular features; text passes through
    pub fn select(&self, dataset: &Dataset) -> Result<SelectionOutcome> {
        let tabular = dataset
            .schema()
            .features()
            .iter()
            .filter(|f| f.kind != FeatureKind::Text)
            .count();

        if self.drop_count >= tabular || tabular - self.drop_count < 2 {
            return Err(PipelineError::Selection(format!(
                "dropping {} of {} features would leave fewer than 2",
                self.drop_count, tabular
            )));
        }

        let ranking = self.rank(dataset)?;
        let keep = tabular - self.drop_count;
        let dropped: Vec<String> = ranking[keep..].iter().map(|r| r.feature.clone()).collect();

        let retained: Vec<String> = dataset
            .schema()
            .names()
            .into_iter()
            .filter(|name| !dropped.iter().any(|d| d == name))
            .map(str::to_string)
            .collect();
        let selected = dataset.project(&retained)?;

        info!(
            kept = keep,
            dropped = ?dropped,
            "Features selected"
        );

        Ok(SelectionOutcome {
            dataset: selected,
            ranking,
            dropped,
        })
    }
}

fn accuracy(model: &RandomForestClassifier, x: &Array2<f64>, y: &[Attrition]) -> Result<f64> {
    let predicted = model.predict(x)?;
    let correct = predicted.iter().zip(y).filter(|(p, t)| p == t).count();
    Ok(correct as f64 / y.len().max(1) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Feature, FeatureSchema, Record, Value};

    fn dataset() -> Dataset {
        let schema = FeatureSchema::new(vec![
            Feature::numeric("Noise"),
            Feature::numeric("OverTimeHours"),
            Feature::categorical("Travel", vec!["Rarely".into(), "Frequently".into()]),
            Feature::numeric("Constantish"),
            Feature::text("Review"),
        ])
        .unwrap();
        let records = (0..40)
            .map(|i| {
                let left = i % 2 == 0;
                Record::labeled(
                    vec![
                        Value::Numeric(((i * 37) % 11) as f64),
                        Value::Numeric(if left { 15.0 } else { 2.0 } + (i % 4) as f64),
                        Value::Categorical(
                            if left && i % 4 == 0 { "Frequently" } else { "Rarely" }.into(),
                        ),
                        Value::Numeric(if i == 0 { 1.0 } else { 0.0 }),
                        Value::Text(format!("text {}", i)),
                    ],
                    Attrition::from_bool(left),
                )
            })
            .collect();
        Dataset::new(schema, records).unwrap()
    }

    fn selector(drop_count: usize) -> FeatureSelector {
        FeatureSelector::new(drop_count)
            .with_importance_trees(30)
            .with_seed(9)
    }

    #[test]
    fn test_ranking_puts_signal_first() {
        let ranking = selector(1).rank(&dataset()).unwrap();
        assert_eq!(ranking.len(), 4);
        assert_eq!(ranking[0].feature, "OverTimeHours");
        for pair in ranking.windows(2) {
            assert!(pair[0].importance >= pair[1].importance);
        }
    }

    #[test]
    fn test_select_keeps_original_order_and_text() {
        let outcome = selector(2).select(&dataset()).unwrap();
        let names = outcome.dataset.schema().names();

        assert_eq!(outcome.dropped.len(), 2);
        assert_eq!(names.len(), 3);
        assert!(names.contains(&"OverTimeHours"));
        assert_eq!(*names.last().unwrap(), "Review");
        let positions: Vec<usize> = names
            .iter()
            .map(|n| dataset().schema().index_of(n).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_zero_drop_is_idempotent() {
        let selected = selector(2).select(&dataset()).unwrap().dataset;
        let again = selector(0).select(&selected).unwrap().dataset;
        assert_eq!(again, selected);
    }

    #[test]
    fn test_too_many_dropped() {
        let err = selector(3).select(&dataset()).unwrap_err();
        assert!(matches!(err, PipelineError::Selection(_)));
        assert!(selector(4).select(&dataset()).is_err());
    }
}
