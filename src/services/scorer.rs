use crate::data::Dataset;
use crate::error::Result;
use crate::services::{RetryPolicy, SentimentService};
use crate::text::Corpus;
use std::sync::Arc;
use tracing::info;

/// Name of the appended sentiment feature
pub const SENTIMENT_FEATURE: &str = "sentiment_score";

/// Scores documents one at a time through a sentiment service
pub struct SentimentScorer {
    service: Arc<dyn SentimentService>,
    policy: RetryPolicy,
}

impl SentimentScorer {
    pub fn new(service: Arc<dyn SentimentService>, policy: RetryPolicy) -> Self {
        Self { service, policy }
    }

    /// One score per document, in corpus order
    pub async fn score(&self, corpus: &Corpus) -> Result<Vec<f64>> {
        let mut scores = Vec::with_capacity(corpus.len());
        for text in corpus.texts() {
            let score = self
                .policy
                .run("sentiment", || self.service.score(text))
                .await?;
            scores.push(score);
        }

        info!(documents = scores.len(), "Sentiment scored");
        Ok(scores)
    }

    /// Score `corpus` and append the scores to `dataset` as a numeric feature
    pub async fn append(&self, corpus: &Corpus, dataset: &Dataset) -> Result<Dataset> {
        let scores = self.score(corpus).await?;
        dataset.with_numeric_feature(SENTIMENT_FEATURE, &scores)
    }
}
