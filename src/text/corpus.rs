use crate::data::{Dataset, FeatureKind, Value};
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};

/// One free-text document with an optional language tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub language: Option<String>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
        }
    }

    pub fn tagged(text: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: Some(language.into()),
        }
    }
}

/// Documents in record order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(Document::new).collect())
    }

    /// One document per record, taken from a text (or categorical) column
    pub fn from_dataset(
        dataset: &Dataset,
        text_column: &str,
        language_column: Option<&str>,
    ) -> Result<Self> {
        let texts = string_column(dataset, text_column)?;
        let languages = match language_column {
            Some(column) => Some(string_column(dataset, column)?),
            None => None,
        };

        let documents = texts
            .into_iter()
            .enumerate()
            .map(|(row, text)| Document {
                text,
                language: languages.as_ref().map(|tags| tags[row].clone()),
            })
            .collect();
        Ok(Self::new(documents))
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|d| d.text.as_str())
    }

    /// Replace every document's text, keeping order, count and language tags
    pub fn map_texts<F>(self, mut f: F) -> Result<Corpus>
    where
        F: FnMut(&Document) -> Result<String>,
    {
        let documents = self
            .documents
            .into_iter()
            .map(|doc| -> Result<Document> {
                let text = f(&doc)?;
                Ok(Document { text, ..doc })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Corpus { documents })
    }
}

fn string_column(dataset: &Dataset, name: &str) -> Result<Vec<String>> {
    let feature = dataset.schema().feature(name)?;
    if matches!(feature.kind, FeatureKind::Numeric) {
        return Err(PipelineError::Schema(format!(
            "column '{}' is numeric and cannot hold documents",
            name
        )));
    }

    Ok(dataset
        .column(name)?
        .into_iter()
        .map(|value| match value {
            Value::Text(s) | Value::Categorical(s) => s.clone(),
            Value::Numeric(v) => v.to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Attrition, Feature, FeatureSchema, Record};

    fn reviews() -> Dataset {
        let schema = FeatureSchema::new(vec![
            Feature::text("Review"),
            Feature::categorical("Lang", vec!["en".into(), "fr".into()]),
            Feature::numeric("Rating"),
        ])
        .unwrap();
        let records = vec![
            Record::labeled(
                vec![
                    Value::Text("Great team".into()),
                    Value::Categorical("en".into()),
                    Value::Numeric(4.0),
                ],
                Attrition::Stayed,
            ),
            Record::labeled(
                vec![
                    Value::Text("Mauvaise gestion".into()),
                    Value::Categorical("fr".into()),
                    Value::Numeric(1.0),
                ],
                Attrition::Left,
            ),
        ];
        Dataset::new(schema, records).unwrap()
    }

    #[test]
    fn test_from_dataset_with_language() {
        let corpus = Corpus::from_dataset(&reviews(), "Review", Some("Lang")).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(
            corpus.documents()[1],
            Document::tagged("Mauvaise gestion", "fr")
        );
    }

    #[test]
    fn test_numeric_column_rejected() {
        let err = Corpus::from_dataset(&reviews(), "Rating", None).unwrap_err();
        assert!(matches!(err, PipelineError::Schema(_)));
        assert!(Corpus::from_dataset(&reviews(), "Missing", None).is_err());
    }

    #[test]
    fn test_map_texts_preserves_length_and_tags() {
        let corpus = Corpus::new(vec![Document::tagged("A", "en"), Document::new("B")]);
        let mapped = corpus.map_texts(|d| Ok(d.text.to_lowercase())).unwrap();
        assert_eq!(mapped.len(), 2);
        assert_eq!(mapped.documents()[0], Document::tagged("a", "en"));
        assert_eq!(mapped.texts().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
