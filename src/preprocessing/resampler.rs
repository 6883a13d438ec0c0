//! SMOTE over-/under-sampling for mixed-type training data

use crate::config::ResamplingConfig;
use crate::data::{Attrition, Dataset, FeatureKind, FeatureSchema, Record, Value};
use crate::error::{PipelineError, Result};
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

/// Rebalanced training data and how it was produced
#[derive(Debug, Clone)]
pub struct ResampleOutcome {
    pub dataset: Dataset,
    pub minority: Attrition,
    pub synthesized: usize,
    pub majority_kept: usize,
}

#[derive(Debug, Clone)]
pub struct Resampler {
    over_sample_pct: u32,
    under_sample_pct: u32,
    k_neighbors: usize,
    seed: u64,
}

impl Resampler {
    pub fn new(over_sample_pct: u32, under_sample_pct: u32, k_neighbors: usize, seed: u64) -> Self {
        Self {
            over_sample_pct,
            under_sample_pct,
            k_neighbors,
            seed,
        }
    }

    pub fn from_config(config: &ResamplingConfig) -> Self {
        Self::new(
            config.over_sample_pct,
            config.under_sample_pct,
            config.k_neighbors,
            config.seed,
        )
    }

    pub fn resample(&self, dataset: &Dataset) -> Result<ResampleOutcome> {
        if self.k_neighbors == 0 {
            return Err(PipelineError::Resample(
                "k_neighbors must be at least 1".to_string(),
            ));
        }

        let labels = dataset.labels()?;
        let counts = dataset.class_counts();
        if counts.left == 0 || counts.stayed == 0 {
            return Err(PipelineError::Resample(format!(
                "both classes are required (left {}, stayed {})",
                counts.left, counts.stayed
            )));
        }

        let minority = if counts.left <= counts.stayed {
            Attrition::Left
        } else {
            Attrition::Stayed
        };
        let (minority_rows, majority_rows): (Vec<usize>, Vec<usize>) =
            (0..labels.len()).partition(|&i| labels[i] == minority);

        if minority_rows.len() < self.k_neighbors + 1 {
            return Err(PipelineError::Resample(format!(
                "minority class '{}' has {} records; at least {} are needed for {} neighbours",
                minority,
                minority_rows.len(),
                self.k_neighbors + 1,
                self.k_neighbors
            )));
        }

        let minority_records: Vec<&Record> =
            minority_rows.iter().map(|&i| &dataset.records()[i]).collect();
        let neighbours = self.nearest_neighbours(dataset.schema(), &minority_records);

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let bases: Vec<usize> = if self.over_sample_pct >= 100 {
            let per_record = (self.over_sample_pct / 100) as usize;
            (0..minority_records.len())
                .flat_map(|i| std::iter::repeat(i).take(per_record))
                .collect()
        } else {
            let n = ((self.over_sample_pct as f64 / 100.0) * minority_records.len() as f64).round()
                as usize;
            let mut chosen = sample(&mut rng, minority_records.len(), n).into_vec();
            chosen.sort_unstable();
            chosen
        };

        let synthetic: Vec<Record> = bases
            .iter()
            .map(|&base| {
                let neighbour = neighbours[base][rng.gen_range(0..self.k_neighbors)];
                let gap: f64 = rng.gen();
                interpolate(
                    minority_records[base],
                    minority_records[neighbour],
                    gap,
                    minority,
                )
            })
            .collect();

        let wanted = (self.under_sample_pct as f64 / 100.0 * synthetic.len() as f64) as usize;
        let majority_kept = wanted.min(majority_rows.len());
        let mut picked = sample(&mut rng, majority_rows.len(), majority_kept).into_vec();
        picked.sort_unstable();

        let mut records: Vec<Record> = picked
            .iter()
            .map(|&i| dataset.records()[majority_rows[i]].clone())
            .collect();
        records.extend(minority_records.iter().map(|r| (*r).clone()));
        let synthesized = synthetic.len();
        records.extend(synthetic);

        let resampled = Dataset::new(dataset.schema().clone(), records)?;
        let after = resampled.class_counts();
        info!(
            minority = %minority,
            synthesized,
            majority_kept,
            left_before = counts.left,
            stayed_before = counts.stayed,
            left_after = after.left,
            stayed_after = after.stayed,
            "Training data resampled"
        );

        Ok(ResampleOutcome {
            dataset: resampled,
            minority,
            synthesized,
            majority_kept,
        })
    }

    /// For every minority record, the positions of its k nearest minority neighbours
    fn nearest_neighbours(&self, schema: &FeatureSchema, records: &[&Record]) -> Vec<Vec<usize>> {
        let metric = GowerMetric::fit(schema, records);
        debug!(
            records = records.len(),
            k = self.k_neighbors,
            "Computing Gower neighbours"
        );

        (0..records.len())
            .map(|i| {
                let mut others: Vec<(f64, usize)> = (0..records.len())
                    .filter(|&j| j != i)
                    .map(|j| (metric.distance(records[i], records[j]), j))
                    .collect();
                others.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                others
                    .into_iter()
                    .take(self.k_neighbors)
                    .map(|(_, j)| j)
                    .collect()
            })
            .collect()
    }
}

enum Term {
    Numeric { range: f64 },
    Categorical,
    Ignored,
}

/// Gower distance: range-scaled numeric differences and categorical mismatches, averaged
struct GowerMetric {
    terms: Vec<Term>,
    contributing: usize,
}

impl GowerMetric {
    fn fit(schema: &FeatureSchema, records: &[&Record]) -> Self {
        let terms: Vec<Term> = schema
            .features()
            .iter()
            .enumerate()
            .map(|(col, feature)| match feature.kind {
                FeatureKind::Numeric => {
                    let (min, max) = records
                        .iter()
                        .filter_map(|r| r.values()[col].as_f64())
                        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                            (lo.min(v), hi.max(v))
                        });
                    Term::Numeric {
                        range: (max - min).max(0.0),
                    }
                }
                FeatureKind::Categorical { .. } => Term::Categorical,
                FeatureKind::Text => Term::Ignored,
            })
            .collect();
        let contributing = terms
            .iter()
            .filter(|t| !matches!(t, Term::Ignored))
            .count();
        Self {
            terms,
            contributing,
        }
    }

    fn distance(&self, a: &Record, b: &Record) -> f64 {
        if self.contributing == 0 {
            return 0.0;
        }

        let total: f64 = self
            .terms
            .iter()
            .zip(a.values().iter().zip(b.values()))
            .map(|(term, (x, y))| match (term, x, y) {
                (Term::Numeric { range }, Value::Numeric(x), Value::Numeric(y)) => {
                    if *range > 0.0 {
                        (x - y).abs() / range
                    } else {
                        0.0
                    }
                }
                (Term::Categorical, x, y) => {
                    if x == y {
                        0.0
                    } else {
                        1.0
                    }
                }
                _ => 0.0,
            })
            .sum();
        total / self.contributing as f64
    }
}

fn interpolate(base: &Record, neighbour: &Record, gap: f64, label: Attrition) -> Record {
    let values = base
        .values()
        .iter()
        .zip(neighbour.values())
        .map(|(x, y)| match (x, y) {
            (Value::Numeric(x), Value::Numeric(y)) => Value::Numeric(x + gap * (y - x)),
            // nearer endpoint wins
            (Value::Categorical(_), Value::Categorical(_)) if gap < 0.5 => x.clone(),
            (Value::Categorical(_), Value::Categorical(_)) => y.clone(),
            _ => x.clone(),
        })
        .collect();
    Record::labeled(values, label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Feature;

    fn imbalanced(n_left: usize, n_stayed: usize) -> Dataset {
        let schema = FeatureSchema::new(vec![
            Feature::numeric("MonthlyIncome"),
            Feature::categorical("OverTime", vec!["No".into(), "Yes".into()]),
            Feature::text("Review"),
        ])
        .unwrap();
        let records = (0..n_left + n_stayed)
            .map(|i| {
                let left = i < n_left;
                Record::labeled(
                    vec![
                        Value::Numeric(if left { 2000.0 } else { 6000.0 } + i as f64 * 10.0),
                        Value::Categorical(if i % 3 == 0 { "Yes" } else { "No" }.into()),
                        Value::Text(format!("review {}", i)),
                    ],
                    Attrition::from_bool(left),
                )
            })
            .collect();
        Dataset::new(schema, records).unwrap()
    }

    #[test]
    fn test_smote_counts() {
        let data = imbalanced(10, 90);
        let outcome = Resampler::new(300, 150, 5, 42).resample(&data).unwrap();
        let counts = outcome.dataset.class_counts();

        assert_eq!(outcome.minority, Attrition::Left);
        assert_eq!(outcome.synthesized, 30);
        assert_eq!(outcome.majority_kept, 45);
        assert_eq!(counts.left, 40);
        assert_eq!(counts.stayed, 45);
        assert!(counts.balance() > data.class_counts().balance());
    }

    #[test]
    fn test_synthetic_values_stay_between_endpoints() {
        let data = imbalanced(8, 40);
        let outcome = Resampler::new(200, 100, 3, 7).resample(&data).unwrap();

        let synthetic = &outcome.dataset.records()[outcome.majority_kept + 8..];
        assert_eq!(synthetic.len(), 16);
        for record in synthetic {
            let income = record.values()[0].as_f64().unwrap();
            assert!((2000.0..=2070.0).contains(&income));
            assert!(record.values()[2].as_str().unwrap().starts_with("review "));
            assert_eq!(record.label(), Some(Attrition::Left));
        }
    }

    #[test]
    fn test_fractional_over_sampling() {
        let data = imbalanced(10, 30);
        let outcome = Resampler::new(50, 200, 2, 1).resample(&data).unwrap();
        assert_eq!(outcome.synthesized, 5);
        assert_eq!(outcome.majority_kept, 10);
    }

    #[test]
    fn test_input_is_untouched_and_deterministic() {
        let data = imbalanced(10, 50);
        let snapshot = data.clone();
        let resampler = Resampler::new(300, 150, 5, 3);

        let a = resampler.resample(&data).unwrap();
        let b = resampler.resample(&data).unwrap();
        assert_eq!(data, snapshot);
        assert_eq!(a.dataset, b.dataset);
    }

    #[test]
    fn test_too_few_minority_records() {
        let data = imbalanced(3, 20);
        let err = Resampler::new(300, 150, 5, 0).resample(&data).unwrap_err();
        assert!(matches!(err, PipelineError::Resample(_)));
    }

    #[test]
    fn test_single_class_rejected() {
        let data = imbalanced(0, 20);
        assert!(Resampler::new(300, 150, 5, 0).resample(&data).is_err());
    }

    #[test]
    fn test_gower_distance() {
        let schema = FeatureSchema::new(vec![
            Feature::numeric("Age"),
            Feature::categorical("Dept", vec!["HR".into(), "IT".into()]),
        ])
        .unwrap();
        let a = Record::labeled(
            vec![Value::Numeric(20.0), Value::Categorical("HR".into())],
            Attrition::Left,
        );
        let b = Record::labeled(
            vec![Value::Numeric(30.0), Value::Categorical("IT".into())],
            Attrition::Left,
        );
        let c = Record::labeled(
            vec![Value::Numeric(40.0), Value::Categorical("HR".into())],
            Attrition::Left,
        );
        let metric = GowerMetric::fit(&schema, &[&a, &b, &c]);

        assert_eq!(metric.distance(&a, &b), (0.5 + 1.0) / 2.0);
        assert_eq!(metric.distance(&a, &c), 0.5);
        assert_eq!(metric.distance(&a, &a), 0.0);
    }
}
