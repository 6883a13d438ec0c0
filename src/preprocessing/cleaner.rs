//! Type coercion and zero-variance filtering

use crate::config::CleaningConfig;
use crate::data::{Dataset, Feature, FeatureKind, FeatureSchema, Record, Value};
use crate::error::{PipelineError, Result};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Cleaned dataset plus what was changed to get there
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    pub dataset: Dataset,
    /// Zero-variance features removed
    pub dropped: Vec<String>,
    /// Features converted to categorical
    pub coerced: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Conversion {
    Keep,
    NumericToCategorical,
    TextToCategorical,
}

#[derive(Debug, Clone)]
pub struct Cleaner {
    categorical_columns: Vec<String>,
    text_column: Option<String>,
}

impl Cleaner {
    pub fn new(categorical_columns: Vec<String>, text_column: Option<String>) -> Self {
        Self {
            categorical_columns,
            text_column,
        }
    }

    pub fn from_config(config: &CleaningConfig) -> Self {
        Self::new(config.categorical_columns.clone(), config.text_column.clone())
    }

    pub fn clean(&self, dataset: &Dataset) -> Result<CleaningOutcome> {
        if dataset.is_empty() {
            return Err(PipelineError::Load("dataset has no records".to_string()));
        }

        let schema = dataset.schema();
        for name in self.categorical_columns.iter().chain(self.text_column.iter()) {
            schema.index_of(name)?;
        }

        let plan: Vec<Conversion> = schema
            .features()
            .iter()
            .map(|feature| self.conversion_for(feature))
            .collect();

        let features: Vec<Feature> = schema
            .features()
            .iter()
            .zip(&plan)
            .enumerate()
            .map(|(col, (feature, conversion))| match conversion {
                Conversion::Keep => feature.clone(),
                Conversion::NumericToCategorical => {
                    Feature::categorical(feature.name.clone(), numeric_levels(dataset, col))
                }
                Conversion::TextToCategorical => {
                    Feature::categorical(feature.name.clone(), text_levels(dataset, col))
                }
            })
            .collect();

        let coerced: Vec<String> = schema
            .features()
            .iter()
            .zip(&plan)
            .filter(|(_, conversion)| **conversion != Conversion::Keep)
            .map(|(feature, _)| feature.name.clone())
            .collect();

        let keep: Vec<usize> = (0..features.len())
            .filter(|&col| has_variance(dataset, col))
            .collect();
        let dropped: Vec<String> = (0..features.len())
            .filter(|col| !keep.contains(col))
            .map(|col| features[col].name.clone())
            .collect();

        for name in &dropped {
            warn!(feature = %name, "Dropping zero-variance feature");
        }

        let records = dataset
            .records()
            .iter()
            .map(|record| {
                let values = keep
                    .iter()
                    .map(|&col| convert(&record.values()[col], plan[col]))
                    .collect();
                Record::new(values, record.label())
            })
            .collect();
        let kept_features = keep.iter().map(|&col| features[col].clone()).collect();

        let cleaned = Dataset::new(FeatureSchema::new(kept_features)?, records)?;

        info!(
            features = cleaned.schema().len(),
            dropped = dropped.len(),
            coerced = coerced.len(),
            "Dataset cleaned"
        );

        Ok(CleaningOutcome {
            dataset: cleaned,
            dropped,
            coerced,
        })
    }

    fn conversion_for(&self, feature: &Feature) -> Conversion {
        let listed = self.categorical_columns.iter().any(|c| *c == feature.name);
        let is_text_column = self.text_column.as_deref() == Some(feature.name.as_str());

        match &feature.kind {
            FeatureKind::Numeric if listed => Conversion::NumericToCategorical,
            FeatureKind::Text if !is_text_column => Conversion::TextToCategorical,
            _ => Conversion::Keep,
        }
    }
}

fn convert(value: &Value, conversion: Conversion) -> Value {
    match (conversion, value) {
        (Conversion::NumericToCategorical, Value::Numeric(v)) => Value::Categorical(v.to_string()),
        (Conversion::TextToCategorical, Value::Text(s)) => Value::Categorical(s.clone()),
        _ => value.clone(),
    }
}

/// Distinct observed values in numeric order, `3.0` rendered as `"3"`
fn numeric_levels(dataset: &Dataset, col: usize) -> Vec<String> {
    let mut values: Vec<f64> = dataset
        .records()
        .iter()
        .filter_map(|r| r.values()[col].as_f64())
        .collect();
    values.sort_by(f64::total_cmp);
    values.dedup();
    values.into_iter().map(|v| v.to_string()).collect()
}

fn text_levels(dataset: &Dataset, col: usize) -> Vec<String> {
    dataset
        .records()
        .iter()
        .filter_map(|r| r.values()[col].as_str())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn has_variance(dataset: &Dataset, col: usize) -> bool {
    let mut values = dataset.records().iter().map(|r| &r.values()[col]);
    match values.next() {
        Some(first) => values.any(|v| v != first),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Attrition;

    fn raw() -> Dataset {
        let schema = FeatureSchema::new(vec![
            Feature::numeric("Age"),
            Feature::numeric("JobLevel"),
            Feature::text("Department"),
            Feature::numeric("EmployeeCount"),
            Feature::text("Over18"),
            Feature::text("Review"),
        ])
        .unwrap();

        let rows = [
            (34.0, 2.0, "Sales", "good team"),
            (41.0, 1.0, "R&D", "long hours"),
            (29.0, 10.0, "HR", "good pay"),
            (50.0, 2.0, "Sales", "long hours"),
        ];
        let records = rows
            .iter()
            .enumerate()
            .map(|(i, (age, level, dept, review))| {
                Record::labeled(
                    vec![
                        Value::Numeric(*age),
                        Value::Numeric(*level),
                        Value::Text(dept.to_string()),
                        Value::Numeric(1.0),
                        Value::Text("Y".into()),
                        Value::Text(review.to_string()),
                    ],
                    Attrition::from_bool(i % 2 == 0),
                )
            })
            .collect();
        Dataset::new(schema, records).unwrap()
    }

    fn cleaner() -> Cleaner {
        Cleaner::new(vec!["JobLevel".into()], Some("Review".into()))
    }

    #[test]
    fn test_coercion_and_levels() {
        let outcome = cleaner().clean(&raw()).unwrap();
        let schema = outcome.dataset.schema();

        assert_eq!(
            schema.feature("JobLevel").unwrap().levels().unwrap(),
            ["1", "2", "10"]
        );
        assert_eq!(
            schema.feature("Department").unwrap().levels().unwrap(),
            ["HR", "R&D", "Sales"]
        );
        assert_eq!(schema.feature("Review").unwrap().kind, FeatureKind::Text);
        assert_eq!(outcome.coerced, vec!["JobLevel", "Department", "Over18"]);
    }

    #[test]
    fn test_zero_variance_features_dropped() {
        let outcome = cleaner().clean(&raw()).unwrap();
        assert_eq!(outcome.dropped, vec!["EmployeeCount", "Over18"]);
        assert_eq!(
            outcome.dataset.schema().names(),
            vec!["Age", "JobLevel", "Department", "Review"]
        );
        assert_eq!(outcome.dataset.len(), 4);
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let err = Cleaner::new(vec!["Education".into()], None)
            .clean(&raw())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Schema(_)));

        let err = Cleaner::new(Vec::new(), Some("Comments".into()))
            .clean(&raw())
            .unwrap_err();
        assert!(err.to_string().contains("Comments"));
    }

    #[test]
    fn test_empty_dataset_is_load_error() {
        let empty = Dataset::new(raw().schema().clone(), Vec::new()).unwrap();
        assert!(matches!(
            cleaner().clean(&empty),
            Err(PipelineError::Load(_))
        ));
    }
}
