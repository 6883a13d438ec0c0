//! Shared resampling schemes for tuning and stacking

use crate::data::Attrition;
use crate::error::{PipelineError, Result};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// How training rows are partitioned into fit/hold-out pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResamplingMethod {
    /// Sample n rows with replacement; hold out the out-of-bag rows
    Bootstrap { resamples: usize },

    /// Stratified k-fold, repeated with fresh shuffles
    RepeatedKFold { folds: usize, repeats: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResamplingScheme {
    pub method: ResamplingMethod,
    pub seed: u64,
}

impl Default for ResamplingScheme {
    fn default() -> Self {
        Self {
            method: ResamplingMethod::RepeatedKFold {
                folds: 5,
                repeats: 1,
            },
            seed: 42,
        }
    }
}

/// Row indices of one fit/hold-out pair
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: Vec<usize>,
    pub holdout: Vec<usize>,
}

impl ResamplingScheme {
    pub fn k_fold(folds: usize, repeats: usize, seed: u64) -> Self {
        Self {
            method: ResamplingMethod::RepeatedKFold { folds, repeats },
            seed,
        }
    }

    pub fn bootstrap(resamples: usize, seed: u64) -> Self {
        Self {
            method: ResamplingMethod::Bootstrap { resamples },
            seed,
        }
    }

    /// Generate the splits for a label vector; identical inputs give identical splits
    pub fn splits(&self, labels: &[Attrition]) -> Result<Vec<Split>> {
        let n = labels.len();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        match self.method {
            ResamplingMethod::Bootstrap { resamples } => {
                if resamples == 0 || n < 2 {
                    return Err(PipelineError::train(
                        "resampling",
                        format!("bootstrap needs resamples > 0 and at least 2 rows (got {} rows)", n),
                    ));
                }

                Ok((0..resamples)
                    .map(|_| {
                        let mut in_bag = vec![false; n];
                        let train: Vec<usize> = (0..n)
                            .map(|_| {
                                let i = rng.gen_range(0..n);
                                in_bag[i] = true;
                                i
                            })
                            .collect();
                        let holdout = (0..n).filter(|&i| !in_bag[i]).collect();
                        Split { train, holdout }
                    })
                    .collect())
            }
            ResamplingMethod::RepeatedKFold { folds, repeats } => {
                if folds < 2 || repeats == 0 || n < folds {
                    return Err(PipelineError::train(
                        "resampling",
                        format!(
                            "k-fold needs folds >= 2, repeats >= 1 and at least `folds` rows (folds {}, repeats {}, rows {})",
                            folds, repeats, n
                        ),
                    ));
                }

                let mut splits = Vec::with_capacity(folds * repeats);
                for _ in 0..repeats {
                    let assignment = stratified_folds(labels, folds, &mut rng);
                    for fold in 0..folds {
                        let (holdout, train): (Vec<usize>, Vec<usize>) =
                            (0..n).partition(|&i| assignment[i] == fold);
                        splits.push(Split { train, holdout });
                    }
                }
                Ok(splits)
            }
        }
    }
}

/// Assign each row a fold so every class is spread evenly over the folds
fn stratified_folds(labels: &[Attrition], folds: usize, rng: &mut ChaCha8Rng) -> Vec<usize> {
    let mut assignment = vec![0; labels.len()];
    let mut offset = 0;

    for class in [Attrition::Left, Attrition::Stayed] {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &label)| label == class)
            .map(|(i, _)| i)
            .collect();
        members.shuffle(rng);

        for (pos, &row) in members.iter().enumerate() {
            assignment[row] = (offset + pos) % folds;
        }
        offset += members.len();
    }

    assignment
}
