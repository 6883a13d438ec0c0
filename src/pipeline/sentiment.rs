use crate::config::Config;
use crate::data::{DataLoader, Dataset};
use crate::error::{PipelineError, Result, Stage, StageContext};
use crate::evaluation::ComparisonReport;
use crate::pipeline::{split_train_evaluate, ClassBalance};
use crate::services::{
    CorpusTranslator, RetryPolicy, SentimentScorer, SentimentService, TranslationService,
};
use crate::text::{Corpus, LanguageStrategy, TextNormalizer, Vectorizer};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct SentimentReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub documents: usize,
    pub translated: bool,
    pub vocabulary_before_pruning: usize,
    pub vocabulary_after_pruning: usize,
    pub sentiment_used: bool,
    pub class_balance: ClassBalance,
    pub comparison: ComparisonReport,
}

/// corpus → translate? → normalize → vectorize → sentiment? → split → resample? → train → evaluate
pub struct SentimentPipeline {
    config: Config,
    translation: Option<Arc<dyn TranslationService>>,
    sentiment: Option<Arc<dyn SentimentService>>,
    policy: RetryPolicy,
}

impl SentimentPipeline {
    pub fn new(config: Config) -> Self {
        let policy = RetryPolicy::from_config(&config.service);
        Self {
            config,
            translation: None,
            sentiment: None,
            policy,
        }
    }

    pub fn with_translation(mut self, service: Arc<dyn TranslationService>) -> Self {
        self.translation = Some(service);
        self
    }

    pub fn with_sentiment(mut self, service: Arc<dyn SentimentService>) -> Self {
        self.sentiment = Some(service);
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn run_path<P: AsRef<Path>>(&self, path: P) -> Result<SentimentReport> {
        let dataset = DataLoader::from_config(&self.config.data)
            .load_path(path)
            .stage(Stage::Loading)?;
        self.run(&dataset).await
    }

    pub async fn run(&self, dataset: &Dataset) -> Result<SentimentReport> {
        let text = &self.config.text;
        let run_id = Uuid::new_v4();
        info!(run_id = %run_id, records = dataset.len(), "Sentiment pipeline started");

        let (corpus, labels) = Corpus::from_dataset(
            dataset,
            &text.text_column,
            text.strategy.language_column(),
        )
        .and_then(|corpus| Ok((corpus, dataset.labels()?)))
        .stage(Stage::Loading)?;

        let (corpus, translated) = match &text.strategy {
            LanguageStrategy::Translate {
                target_language, ..
            } => {
                let translated = self
                    .translate(&corpus, target_language)
                    .await
                    .stage(Stage::Translation)?;
                (translated, true)
            }
            _ => (corpus, false),
        };

        let normalized = TextNormalizer::from_config(text)
            .and_then(|normalizer| normalizer.normalize(corpus.clone()))
            .stage(Stage::Normalization)?;

        let matrix = Vectorizer::from_config(text)
            .vectorize(&normalized)
            .stage(Stage::Vectorization)?;
        let features = matrix.to_dataset(&labels).stage(Stage::Vectorization)?;

        let features = if text.use_sentiment {
            self.score(&corpus, &features)
                .await
                .stage(Stage::Sentiment)?
        } else {
            features
        };

        let resampling = text.resample.then_some(&self.config.resampling);
        let (class_balance, comparison) =
            split_train_evaluate(&features, &self.config.training, resampling, &text.models)?;

        info!(
            run_id = %run_id,
            terms = matrix.n_terms(),
            sentiment = text.use_sentiment,
            models = comparison.reports.len(),
            "Sentiment pipeline finished"
        );

        Ok(SentimentReport {
            run_id,
            generated_at: Utc::now(),
            documents: normalized.len(),
            translated,
            vocabulary_before_pruning: matrix.unpruned_terms(),
            vocabulary_after_pruning: matrix.n_terms(),
            sentiment_used: text.use_sentiment,
            class_balance,
            comparison,
        })
    }

    async fn translate(&self, corpus: &Corpus, target: &str) -> Result<Corpus> {
        let service = self.translation.clone().ok_or_else(|| {
            PipelineError::Configuration(
                "translate strategy requires a translation service".to_string(),
            )
        })?;
        CorpusTranslator::new(service, self.policy.clone())
            .translate(corpus, target)
            .await
    }

    async fn score(&self, corpus: &Corpus, features: &Dataset) -> Result<Dataset> {
        let service = self.sentiment.clone().ok_or_else(|| {
            PipelineError::Configuration("use_sentiment requires a sentiment service".to_string())
        })?;
        SentimentScorer::new(service, self.policy.clone())
            .append(corpus, features)
            .await
    }
}
