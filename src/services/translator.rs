use crate::error::Result;
use crate::services::{RetryPolicy, TranslationService};
use crate::text::{Corpus, Document};
use std::sync::Arc;
use tracing::info;

/// Translates a whole corpus into one target language, sequentially
pub struct CorpusTranslator {
    service: Arc<dyn TranslationService>,
    policy: RetryPolicy,
}

impl CorpusTranslator {
    pub fn new(service: Arc<dyn TranslationService>, policy: RetryPolicy) -> Self {
        Self { service, policy }
    }

    /// Documents keep their order; every translated document is tagged with `target`
    pub async fn translate(&self, corpus: &Corpus, target: &str) -> Result<Corpus> {
        let mut documents = Vec::with_capacity(corpus.len());
        for document in corpus.documents() {
            let source = document.language.as_deref();
            let text = if source == Some(target) {
                document.text.clone()
            } else {
                self.policy
                    .run("translate", || {
                        self.service.translate(&document.text, source, target)
                    })
                    .await?
            };
            documents.push(Document::tagged(text, target));
        }

        info!(documents = documents.len(), target, "Corpus translated");
        Ok(Corpus::new(documents))
    }
}
