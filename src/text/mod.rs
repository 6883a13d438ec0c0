/// Free-text preparation for the sentiment pipeline
///
/// - `corpus`: documents with optional language tags
/// - `stopwords`: built-in and file-backed stop-word lists
/// - `normalizer`: digit, case, stop-word, punctuation and whitespace cleanup
/// - `vectorizer`: term matrices with optional TF-IDF weighting and sparsity pruning

pub mod corpus;
pub mod normalizer;
pub mod stopwords;
pub mod vectorizer;

pub use corpus::{Corpus, Document};
pub use normalizer::{LanguageStrategy, TextNormalizer};
pub use stopwords::StopWords;
pub use vectorizer::{TermMatrix, Vectorizer, Weighting};
