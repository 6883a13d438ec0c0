use crate::config::TextConfig;
use crate::error::{PipelineError, Result};
use crate::text::corpus::{Corpus, Document};
use crate::text::stopwords::StopWords;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

lazy_static! {
    static ref DIGITS: Regex = Regex::new(r"\d+").expect("Failed to compile DIGITS pattern");
    static ref PUNCTUATION: Regex =
        Regex::new(r"[\p{P}\p{S}]+").expect("Failed to compile PUNCTUATION pattern");
    static ref WHITESPACE: Regex =
        Regex::new(r"\s+").expect("Failed to compile WHITESPACE pattern");
}

/// How stop words are chosen across a possibly multi-lingual corpus
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LanguageStrategy {
    /// One stop-word set for every document
    #[default]
    Monolingual,

    /// Route each document through the stop words of its language tag
    PerLanguage {
        language_column: String,
        stop_word_files: BTreeMap<String, PathBuf>,
    },

    /// Translate everything to one language first, then normalize monolingually.
    /// Documents already tagged with the target language are not translated.
    Translate {
        target_language: String,
        #[serde(default)]
        language_column: Option<String>,
    },
}

impl LanguageStrategy {
    /// Column holding language tags, when the strategy needs one
    pub fn language_column(&self) -> Option<&str> {
        match self {
            LanguageStrategy::PerLanguage {
                language_column, ..
            } => Some(language_column.as_str()),
            LanguageStrategy::Translate {
                language_column, ..
            } => language_column.as_deref(),
            LanguageStrategy::Monolingual => None,
        }
    }
}

enum Filter {
    Single(Option<Regex>),
    PerLanguage(BTreeMap<String, Option<Regex>>),
}

/// Digit, case, stop-word, punctuation and whitespace normalization
pub struct TextNormalizer {
    filter: Filter,
}

impl TextNormalizer {
    pub fn monolingual(stop_words: &StopWords) -> Result<Self> {
        Ok(Self {
            filter: Filter::Single(stop_words.pattern()?),
        })
    }

    pub fn per_language(sets: &BTreeMap<String, StopWords>) -> Result<Self> {
        let patterns = sets
            .iter()
            .map(|(language, words)| -> Result<(String, Option<Regex>)> {
                Ok((language.clone(), words.pattern()?))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;
        Ok(Self {
            filter: Filter::PerLanguage(patterns),
        })
    }

    /// Build the normalizer the configured language strategy calls for
    pub fn from_config(config: &TextConfig) -> Result<Self> {
        match &config.strategy {
            LanguageStrategy::Monolingual | LanguageStrategy::Translate { .. } => {
                Self::monolingual(&StopWords::from_config(&config.stop_words)?)
            }
            LanguageStrategy::PerLanguage {
                stop_word_files, ..
            } => {
                let sets = stop_word_files
                    .iter()
                    .map(|(language, path)| -> Result<(String, StopWords)> {
                        Ok((language.clone(), StopWords::from_path(path)?))
                    })
                    .collect::<Result<BTreeMap<_, _>>>()?;
                Self::per_language(&sets)
            }
        }
    }

    pub fn normalize_document(&self, document: &Document) -> Result<String> {
        let stop_words = match &self.filter {
            Filter::Single(pattern) => pattern.as_ref(),
            Filter::PerLanguage(patterns) => {
                let language = document.language.as_deref().ok_or_else(|| {
                    PipelineError::Schema(
                        "document has no language tag but stop words are chosen per language"
                            .to_string(),
                    )
                })?;
                patterns
                    .get(language)
                    .ok_or_else(|| {
                        PipelineError::Schema(format!(
                            "no stop-word list configured for language '{}'",
                            language
                        ))
                    })?
                    .as_ref()
            }
        };

        let text = DIGITS.replace_all(&document.text, "");
        let text = text.to_lowercase();
        let text = match stop_words {
            Some(pattern) => pattern.replace_all(&text, "").into_owned(),
            None => text,
        };
        let text = PUNCTUATION.replace_all(&text, "");
        let text = WHITESPACE.replace_all(&text, " ");
        Ok(text.trim().to_string())
    }

    /// Normalize every document; the corpus keeps its length and order
    pub fn normalize(&self, corpus: Corpus) -> Result<Corpus> {
        let documents = corpus.len();
        let normalized = corpus.map_texts(|doc| self.normalize_document(doc))?;
        info!(documents, "Corpus normalized");
        Ok(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn english() -> TextNormalizer {
        TextNormalizer::monolingual(&StopWords::english()).unwrap()
    }

    #[test]
    fn test_normalization_steps() {
        let doc = Document::new("The Managers were GREAT in 2019!!  Pay: $40k,   not bad.");
        assert_eq!(
            english().normalize_document(&doc).unwrap(),
            "managers great pay k bad"
        );
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let normalizer = english();
        let corpus = Corpus::from_texts([
            "Long hours, poor work-life balance (3/5)",
            "Great   colleagues and a supportive manager.",
            "",
        ]);
        let once = normalizer.normalize(corpus).unwrap();
        let twice = normalizer.normalize(once.clone()).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
        assert_eq!(once.documents()[2].text, "");
    }

    #[test]
    fn test_without_stop_words() {
        let normalizer = TextNormalizer::monolingual(&StopWords::empty()).unwrap();
        let doc = Document::new("the team");
        assert_eq!(normalizer.normalize_document(&doc).unwrap(), "the team");
    }

    #[test]
    fn test_per_language_routing() {
        let mut sets = BTreeMap::new();
        sets.insert("en".to_string(), ["the"].into_iter().collect::<StopWords>());
        sets.insert("fr".to_string(), ["la"].into_iter().collect::<StopWords>());
        let normalizer = TextNormalizer::per_language(&sets).unwrap();

        let corpus = Corpus::new(vec![
            Document::tagged("the boss la", "en"),
            Document::tagged("the boss la", "fr"),
        ]);
        let normalized = normalizer.normalize(corpus).unwrap();
        assert_eq!(
            normalized.texts().collect::<Vec<_>>(),
            vec!["boss la", "the boss"]
        );
    }

    #[test]
    fn test_per_language_rejects_untagged_and_unknown() {
        let mut sets = BTreeMap::new();
        sets.insert("en".to_string(), StopWords::english());
        let normalizer = TextNormalizer::per_language(&sets).unwrap();

        let untagged = normalizer.normalize(Corpus::from_texts(["hello"]));
        assert!(matches!(untagged, Err(PipelineError::Schema(_))));

        let unknown = normalizer.normalize(Corpus::new(vec![Document::tagged("hallo", "de")]));
        assert!(unknown.unwrap_err().to_string().contains("'de'"));
    }

    #[test]
    fn test_strategy_serde() {
        let strategy: LanguageStrategy =
            serde_json::from_str(r#"{"type":"translate","target_language":"en"}"#).unwrap();
        assert_eq!(
            strategy,
            LanguageStrategy::Translate {
                target_language: "en".into(),
                language_column: None,
            }
        );
        assert_eq!(strategy.language_column(), None);
    }
}
