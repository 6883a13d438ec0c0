use crate::config::TextConfig;
use crate::data::{Attrition, Dataset, Feature, FeatureSchema, Record, Value};
use crate::error::{PipelineError, Result};
use crate::text::corpus::Corpus;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Cell weighting of a term matrix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    /// Raw term counts
    #[default]
    TermFrequency,

    /// `count / doc_length * log2(n_docs / doc_freq)`
    TfIdf,
}

/// Documents × vocabulary weights; rows follow corpus order
#[derive(Debug, Clone, PartialEq)]
pub struct TermMatrix {
    vocabulary: Vec<String>,
    weights: Array2<f64>,
    unpruned_terms: usize,
}

impl TermMatrix {
    /// Terms in column order (lexicographic)
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn n_documents(&self) -> usize {
        self.weights.nrows()
    }

    pub fn n_terms(&self) -> usize {
        self.vocabulary.len()
    }

    /// Vocabulary size before sparsity pruning
    pub fn unpruned_terms(&self) -> usize {
        self.unpruned_terms
    }

    pub fn column(&self, term: &str) -> Option<usize> {
        self.vocabulary.binary_search_by(|t| t.as_str().cmp(term)).ok()
    }

    /// One numeric feature per term, labels attached row by row
    pub fn to_dataset(&self, labels: &[Attrition]) -> Result<Dataset> {
        if labels.len() != self.n_documents() {
            return Err(PipelineError::Schema(format!(
                "{} labels for {} documents",
                labels.len(),
                self.n_documents()
            )));
        }

        let schema = FeatureSchema::new(self.vocabulary.iter().map(Feature::numeric).collect())?;
        let records = self
            .weights
            .rows()
            .into_iter()
            .zip(labels)
            .map(|(row, &label)| {
                Record::labeled(row.iter().map(|&w| Value::Numeric(w)).collect(), label)
            })
            .collect();
        Dataset::new(schema, records)
    }
}

#[derive(Debug, Clone)]
pub struct Vectorizer {
    weighting: Weighting,
    min_doc_fraction: f64,
}

impl Vectorizer {
    pub fn new(weighting: Weighting, min_doc_fraction: f64) -> Self {
        Self {
            weighting,
            min_doc_fraction,
        }
    }

    pub fn from_config(config: &TextConfig) -> Self {
        Self::new(config.weighting, config.min_doc_fraction)
    }

    /// Build a fresh term matrix from whitespace tokens
    pub fn vectorize(&self, corpus: &Corpus) -> Result<TermMatrix> {
        if !(0.0..=1.0).contains(&self.min_doc_fraction) {
            return Err(PipelineError::Configuration(format!(
                "min_doc_fraction must be in [0, 1], got {}",
                self.min_doc_fraction
            )));
        }

        let counts: Vec<BTreeMap<&str, usize>> = corpus
            .texts()
            .map(|text| {
                let mut terms = BTreeMap::new();
                for token in text.split_whitespace() {
                    *terms.entry(token).or_insert(0) += 1;
                }
                terms
            })
            .collect();

        let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
        for doc in &counts {
            for term in doc.keys() {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let n_docs = counts.len();
        let unpruned_terms = doc_freq.len();
        let kept: Vec<(&str, usize)> = doc_freq
            .into_iter()
            .filter(|(_, df)| {
                self.min_doc_fraction == 0.0
                    || *df as f64 / n_docs as f64 >= self.min_doc_fraction
            })
            .collect();

        let mut weights = Array2::<f64>::zeros((n_docs, kept.len()));
        for (row, doc) in counts.iter().enumerate() {
            for (col, (term, _)) in kept.iter().enumerate() {
                if let Some(&count) = doc.get(term) {
                    weights[[row, col]] = count as f64;
                }
            }
        }

        if self.weighting == Weighting::TfIdf {
            let idf: Vec<f64> = kept
                .iter()
                .map(|(_, df)| (n_docs as f64 / *df as f64).log2())
                .collect();
            for mut row in weights.rows_mut() {
                let length: f64 = row.sum();
                if length > 0.0 {
                    for (w, idf) in row.iter_mut().zip(&idf) {
                        *w = *w / length * idf;
                    }
                }
            }
        }

        info!(
            documents = n_docs,
            terms = kept.len(),
            pruned = unpruned_terms - kept.len(),
            weighting = ?self.weighting,
            "Term matrix built"
        );

        Ok(TermMatrix {
            vocabulary: kept.into_iter().map(|(term, _)| term.to_string()).collect(),
            weights,
            unpruned_terms,
        })
    }
}
