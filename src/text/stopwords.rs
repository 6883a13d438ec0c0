use crate::config::StopWordsConfig;
use crate::error::{PipelineError, Result};
use regex::Regex;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const ENGLISH: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "would",
    "should", "could", "ought", "i'm", "you're", "he's", "she's", "it's", "we're", "they're",
    "i've", "you've", "we've", "they've", "i'd", "you'd", "he'd", "she'd", "we'd", "they'd",
    "i'll", "you'll", "he'll", "she'll", "we'll", "they'll", "isn't", "aren't", "wasn't",
    "weren't", "hasn't", "haven't", "hadn't", "doesn't", "don't", "didn't", "won't",
    "wouldn't", "shan't", "shouldn't", "can't", "cannot", "couldn't", "mustn't", "let's",
    "that's", "who's", "what's", "here's", "there's", "when's", "where's", "why's", "how's",
    "a", "an", "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at",
    "by", "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why", "how",
    "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no", "nor",
    "not", "only", "own", "same", "so", "than", "too", "very",
];

/// Lower-cased terms removed during normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopWords {
    words: BTreeSet<String>,
}

impl StopWords {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in English list
    pub fn english() -> Self {
        ENGLISH.iter().copied().collect()
    }

    /// One term per line; only the first comma, semicolon or tab separated field is used
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut words = BTreeSet::new();
        for line in reader.lines() {
            let line = line?;
            let term = line
                .split([',', ';', '\t'])
                .next()
                .unwrap_or_default()
                .trim()
                .to_lowercase();
            if !term.is_empty() {
                words.insert(term);
            }
        }
        Ok(Self { words })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Built-in list (when enabled) merged with every configured file
    pub fn from_config(config: &StopWordsConfig) -> Result<Self> {
        let mut words = if config.english {
            Self::english()
        } else {
            Self::empty()
        };
        for path in &config.files {
            words.extend(Self::from_path(path)?);
        }
        Ok(words)
    }

    pub fn extend(&mut self, other: StopWords) {
        self.words.extend(other.words);
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Whole-word alternation matching any stop word; None for an empty set
    pub(crate) fn pattern(&self) -> Result<Option<Regex>> {
        if self.words.is_empty() {
            return Ok(None);
        }
        // longest first so contractions win over their prefixes
        let mut words: Vec<&String> = self.words.iter().collect();
        words.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let alternation = words
            .iter()
            .map(|w| regex::escape(w))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"\b(?:{})\b", alternation))
            .map(Some)
            .map_err(|e| PipelineError::Configuration(format!("invalid stop-word list: {}", e)))
    }
}

impl<S: Into<String>> FromIterator<S> for StopWords {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().map(|w| w.into().to_lowercase()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;

    #[test]
    fn test_reader_takes_first_field() {
        let input = "Le,article\nla\n\n  des ;x\n";
        let words = StopWords::from_reader(Cursor::new(input)).unwrap();
        assert_eq!(words.len(), 3);
        assert!(words.contains("le"));
        assert!(words.contains("des"));
    }

    #[test]
    fn test_config_merges_builtin_and_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "management").unwrap();

        let config = StopWordsConfig {
            english: true,
            files: vec![file.path().to_path_buf()],
        };
        let words = StopWords::from_config(&config).unwrap();
        assert!(words.contains("the"));
        assert!(words.contains("management"));
    }

    #[test]
    fn test_pattern_matches_whole_words() {
        let words: StopWords = ["the", "don't"].into_iter().collect();
        let pattern = words.pattern().unwrap().unwrap();
        assert_eq!(pattern.replace_all("the theme don't", ""), " theme ");
        assert!(StopWords::empty().pattern().unwrap().is_none());
    }
}
