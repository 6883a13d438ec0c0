use crate::data::Attrition;
use serde::{Deserialize, Serialize};

/// Binary confusion matrix relative to a chosen positive class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl ConfusionMatrix {
    pub fn from_predictions(actual: &[Attrition], predicted: &[Attrition], positive: Attrition) -> Self {
        let mut matrix = Self::default();
        for (&truth, &guess) in actual.iter().zip(predicted) {
            match (truth == positive, guess == positive) {
                (true, true) => matrix.true_positives += 1,
                (false, true) => matrix.false_positives += 1,
                (false, false) => matrix.true_negatives += 1,
                (true, false) => matrix.false_negatives += 1,
            }
        }
        matrix
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn f1_score(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        }
    }
}

/// Area under the ROC curve via the Mann-Whitney rank statistic.
///
/// `scores` rank records by how strongly they are predicted as `positive`.
/// Tied scores share their average rank. Returns `None` unless both classes
/// are present.
pub fn roc_auc(scores: &[f64], labels: &[Attrition], positive: Attrition) -> Option<f64> {
    let n = scores.len().min(labels.len());
    let n_pos = labels[..n].iter().filter(|&&l| l == positive).count();
    let n_neg = n - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < n {
        let mut end = start + 1;
        while end < n && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        // ranks are 1-based; the tie group covers ranks start+1..=end
        let average_rank = (start + 1 + end) as f64 / 2.0;
        let positives = order[start..end]
            .iter()
            .filter(|&&i| labels[i] == positive)
            .count();
        positive_rank_sum += average_rank * positives as f64;
        start = end;
    }

    let u = positive_rank_sum - (n_pos * (n_pos + 1)) as f64 / 2.0;
    Some(u / (n_pos * n_neg) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use Attrition::{Left, Stayed};

    #[test]
    fn test_confusion_matrix_metrics() {
        let actual = [Left, Left, Stayed, Stayed, Stayed];
        let predicted = [Left, Stayed, Left, Stayed, Stayed];
        let m = ConfusionMatrix::from_predictions(&actual, &predicted, Left);

        assert_eq!(m.true_positives, 1);
        assert_eq!(m.false_negatives, 1);
        assert_eq!(m.false_positives, 1);
        assert_eq!(m.true_negatives, 2);
        assert_eq!(m.accuracy(), 0.6);
        assert_eq!(m.recall(), 0.5);
        assert_eq!(m.precision(), 0.5);
        assert_eq!(m.f1_score(), 0.5);
    }

    #[test]
    fn test_zero_true_positives_give_zero_not_nan() {
        let m = ConfusionMatrix::from_predictions(&[Left, Stayed], &[Stayed, Left], Left);
        assert_eq!(m.recall(), 0.0);
        assert_eq!(m.precision(), 0.0);
        assert_eq!(m.f1_score(), 0.0);

        let empty = ConfusionMatrix::default();
        assert_eq!(empty.accuracy(), 0.0);
    }

    #[test]
    fn test_positive_class_is_respected() {
        let actual = [Left, Stayed, Stayed];
        let predicted = [Left, Stayed, Left];
        let m = ConfusionMatrix::from_predictions(&actual, &predicted, Stayed);
        assert_eq!(m.true_positives, 1);
        assert_eq!(m.false_negatives, 1);
        assert_eq!(m.true_negatives, 1);
    }

    #[test]
    fn test_roc_auc() {
        let labels = [Stayed, Stayed, Left, Left];
        assert_eq!(roc_auc(&[0.1, 0.4, 0.35, 0.8], &labels, Left), Some(0.75));
        assert_eq!(roc_auc(&[0.1, 0.2, 0.8, 0.9], &labels, Left), Some(1.0));
        assert_eq!(roc_auc(&[0.5, 0.5, 0.5, 0.5], &labels, Left), Some(0.5));
        assert_eq!(roc_auc(&[0.1, 0.2], &[Left, Left], Left), None);
    }
}
