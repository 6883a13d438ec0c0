use crate::data::Attrition;
use crate::error::{PipelineError, Result};
use crate::ml::classifier::{
    check_training_input, has_both_classes, ndarray_to_densematrix, not_trained, Classifier,
};
use crate::ml::models::{ForestParams, ModelType};
use ndarray::{Array1, Array2, Axis};
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters, SplitCriterion,
};
use tracing::debug;

type Tree = DecisionTreeClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>;

enum Member {
    Tree { columns: Vec<usize>, tree: Tree },
    // bootstrap sample drawn from a single class
    Constant(f64),
}

impl Member {
    fn votes(&self, features: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            Member::Constant(vote) => Ok(Array1::from_elem(features.nrows(), *vote)),
            Member::Tree { columns, tree } => {
                let x = ndarray_to_densematrix(&features.select(Axis(1), columns));
                let predictions = tree.predict(&x).map_err(|e| {
                    PipelineError::train(ModelType::RandomForest.to_string(), e.to_string())
                })?;
                Ok(predictions.into_iter().map(f64::from).collect())
            }
        }
    }
}

/// Bagged Gini trees with per-tree feature subsampling; probability is the vote share
pub struct RandomForestClassifier {
    params: ForestParams,
    members: Vec<Member>,
}

impl RandomForestClassifier {
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            members: Vec::new(),
        }
    }

    fn tree_parameters(&self) -> DecisionTreeClassifierParameters {
        DecisionTreeClassifierParameters::default()
            .with_criterion(SplitCriterion::Gini)
            .with_max_depth(self.params.max_depth)
            .with_min_samples_leaf(self.params.min_samples_leaf.max(1))
    }

    fn features_per_tree(&self, n_columns: usize) -> usize {
        self.params
            .max_features
            .unwrap_or_else(|| (n_columns as f64).sqrt().ceil() as usize)
            .clamp(1, n_columns)
    }
}

impl Classifier for RandomForestClassifier {
    fn fit(&mut self, features: &Array2<f64>, labels: &[Attrition]) -> Result<()> {
        check_training_input(ModelType::RandomForest, features, labels)?;
        if self.params.n_trees == 0 {
            return Err(PipelineError::train(
                ModelType::RandomForest.to_string(),
                "n_trees must be at least 1",
            ));
        }

        let n_rows = features.nrows();
        let n_columns = features.ncols();
        let per_tree = self.features_per_tree(n_columns);
        let parameters = self.tree_parameters();
        let targets: Vec<i32> = labels.iter().map(|l| i32::from(l.is_left())).collect();

        let members = (0..self.params.n_trees)
            .into_par_iter()
            .map(|t| -> Result<Member> {
                let mut rng = ChaCha8Rng::seed_from_u64(self.params.seed.wrapping_add(t as u64));
                let rows: Vec<usize> = (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect();
                let mut columns = sample(&mut rng, n_columns, per_tree).into_vec();
                columns.sort_unstable();

                let bag_labels: Vec<Attrition> = rows.iter().map(|&r| labels[r]).collect();
                if !has_both_classes(&bag_labels) {
                    return Ok(Member::Constant(f64::from(targets[rows[0]])));
                }

                let x = features.select(Axis(0), &rows).select(Axis(1), &columns);
                let y: Vec<i32> = rows.iter().map(|&r| targets[r]).collect();
                let tree = Tree::fit(&ndarray_to_densematrix(&x), &y, parameters.clone())
                    .map_err(|e| {
                        PipelineError::train(ModelType::RandomForest.to_string(), e.to_string())
                    })?;
                Ok(Member::Tree { columns, tree })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            trees = members.len(),
            features_per_tree = per_tree,
            "Random forest fitted"
        );
        self.members = members;
        Ok(())
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array1<f64>> {
        if self.members.is_empty() {
            return Err(not_trained(ModelType::RandomForest));
        }

        let votes = self
            .members
            .par_iter()
            .map(|member| member.votes(features))
            .collect::<Result<Vec<_>>>()?;

        let total = votes
            .into_iter()
            .fold(Array1::zeros(features.nrows()), |acc, v| acc + v);
        Ok(total / self.members.len() as f64)
    }

    fn model_type(&self) -> ModelType {
        ModelType::RandomForest
    }

    fn is_trained(&self) -> bool {
        !self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn training_data() -> (Array2<f64>, Vec<Attrition>) {
        let x = array![
            [1.0, 2.0, 0.0],
            [1.5, 1.8, 1.0],
            [1.2, 2.2, 0.0],
            [0.9, 1.9, 1.0],
            [5.0, 8.0, 0.0],
            [5.5, 8.5, 1.0],
            [4.8, 7.9, 0.0],
            [5.2, 8.1, 1.0]
        ];
        let mut y = vec![Attrition::Stayed; 4];
        y.extend(vec![Attrition::Left; 4]);
        (x, y)
    }

    #[test]
    fn test_forest_training_and_prediction() {
        let (x, y) = training_data();
        let mut forest = RandomForestClassifier::new(ForestParams {
            n_trees: 25,
            max_depth: 4,
            max_features: Some(2),
            ..Default::default()
        });

        assert!(!forest.is_trained());
        forest.fit(&x, &y).unwrap();
        assert!(forest.is_trained());

        let proba = forest.predict_proba(&x).unwrap();
        assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
        assert_eq!(forest.predict(&array![[5.1, 8.2, 0.0]]).unwrap(), vec![Attrition::Left]);
    }

    #[test]
    fn test_forest_is_deterministic_for_seed() {
        let (x, y) = training_data();
        let params = ForestParams {
            n_trees: 10,
            seed: 7,
            ..Default::default()
        };
        let mut a = RandomForestClassifier::new(params.clone());
        let mut b = RandomForestClassifier::new(params);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
    }

    #[test]
    fn test_default_features_per_tree() {
        let forest = RandomForestClassifier::new(ForestParams::default());
        assert_eq!(forest.features_per_tree(9), 3);
        assert_eq!(forest.features_per_tree(10), 4);
        assert_eq!(forest.features_per_tree(1), 1);
    }
}
