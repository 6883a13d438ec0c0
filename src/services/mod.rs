/// External translation and sentiment capabilities
///
/// The traits are the only seam the pipelines see; `CloudLanguageClient` is the
/// HTTP implementation and `RetryPolicy` bounds every call with a timeout and
/// exponential backoff.

pub mod client;
pub mod retry;
pub mod scorer;
pub mod translator;

pub use client::CloudLanguageClient;
pub use retry::RetryPolicy;
pub use scorer::{SentimentScorer, SENTIMENT_FEATURE};
pub use translator::CorpusTranslator;

use crate::error::Result;
use async_trait::async_trait;

/// Machine translation of a single text
#[async_trait]
pub trait TranslationService: Send + Sync {
    /// Translate `text` into `target`; `source` is detected by the service when absent
    async fn translate(&self, text: &str, source: Option<&str>, target: &str) -> Result<String>;
}

/// Document-level sentiment
#[async_trait]
pub trait SentimentService: Send + Sync {
    /// Sentiment of `text` in [0, 1], higher is more positive
    async fn score(&self, text: &str) -> Result<f64>;
}
