use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Type of a feature column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureKind {
    Numeric,
    Categorical { levels: Vec<String> },
    Text,
}

impl FeatureKind {
    pub fn name(&self) -> &'static str {
        match self {
            FeatureKind::Numeric => "numeric",
            FeatureKind::Categorical { .. } => "categorical",
            FeatureKind::Text => "text",
        }
    }

    pub fn same_kind(&self, other: &FeatureKind) -> bool {
        self.name() == other.name()
    }
}

/// Named, typed feature column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub kind: FeatureKind,
}

impl Feature {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::Numeric,
        }
    }

    pub fn categorical(name: impl Into<String>, levels: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::Categorical { levels },
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::Text,
        }
    }

    pub fn levels(&self) -> Option<&[String]> {
        match &self.kind {
            FeatureKind::Categorical { levels } => Some(levels),
            _ => None,
        }
    }
}

/// Ordered feature-name to type mapping with checked lookup
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureSchema {
    features: Vec<Feature>,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    pub fn new(features: Vec<Feature>) -> Result<Self> {
        let mut index = HashMap::with_capacity(features.len());
        for (i, feature) in features.iter().enumerate() {
            if index.insert(feature.name.clone(), i).is_some() {
                return Err(PipelineError::Schema(format!(
                    "duplicate feature name '{}'",
                    feature.name
                )));
            }
        }
        Ok(Self { features, index })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Position of a feature, failing fast when it does not exist
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.index.get(name).copied().ok_or_else(|| {
            PipelineError::Schema(format!("feature '{}' does not exist in the schema", name))
        })
    }

    pub fn feature(&self, name: &str) -> Result<&Feature> {
        Ok(&self.features[self.index_of(name)?])
    }

    /// Check that data described by `other` can be fed to a model fitted on `self`
    pub fn ensure_compatible(&self, other: &FeatureSchema) -> Result<()> {
        if self.names() != other.names() {
            return Err(PipelineError::Schema(format!(
                "feature set mismatch: expected [{}], found [{}]",
                self.names().join(", "),
                other.names().join(", ")
            )));
        }

        for (expected, found) in self.features.iter().zip(other.features.iter()) {
            if !expected.kind.same_kind(&found.kind) {
                return Err(PipelineError::Schema(format!(
                    "feature '{}' is {} but was {} when fitted",
                    found.name,
                    found.kind.name(),
                    expected.kind.name()
                )));
            }
            if let (Some(known), Some(seen)) = (expected.levels(), found.levels()) {
                if let Some(unknown) = seen.iter().find(|level| !known.contains(level)) {
                    return Err(PipelineError::Schema(format!(
                        "categorical level '{}' of feature '{}' was not seen during training",
                        unknown, found.name
                    )));
                }
            }
        }

        Ok(())
    }
}
