use crate::data::models::{Attrition, ClassCounts, Record, Value};
use crate::data::schema::{Feature, FeatureKind, FeatureSchema};
use crate::error::{PipelineError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Ordered records sharing one feature schema
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    schema: FeatureSchema,
    records: Vec<Record>,
}

impl Dataset {
    /// Build a dataset, checking every record against the schema
    pub fn new(schema: FeatureSchema, records: Vec<Record>) -> Result<Self> {
        for (row, record) in records.iter().enumerate() {
            if record.values().len() != schema.len() {
                return Err(PipelineError::Schema(format!(
                    "record {} has {} values but the schema has {} features",
                    row,
                    record.values().len(),
                    schema.len()
                )));
            }

            for (feature, value) in schema.features().iter().zip(record.values()) {
                check_value(feature, value).map_err(|reason| {
                    PipelineError::Schema(format!(
                        "record {}, feature '{}': {}",
                        row, feature.name, reason
                    ))
                })?;
            }
        }

        Ok(Self { schema, records })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Labels of every record; all records must be labeled
    pub fn labels(&self) -> Result<Vec<Attrition>> {
        self.records
            .iter()
            .enumerate()
            .map(|(row, record)| {
                record.label().ok_or_else(|| {
                    PipelineError::Load(format!("record {} has no attrition label", row))
                })
            })
            .collect()
    }

    pub fn class_counts(&self) -> ClassCounts {
        let mut counts = ClassCounts::default();
        for record in &self.records {
            match record.label() {
                Some(Attrition::Left) => counts.left += 1,
                Some(Attrition::Stayed) => counts.stayed += 1,
                None => counts.unlabeled += 1,
            }
        }
        counts
    }

    pub fn column(&self, name: &str) -> Result<Vec<&Value>> {
        let idx = self.schema.index_of(name)?;
        Ok(self.records.iter().map(|r| &r.values()[idx]).collect())
    }

    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self.schema.index_of(name)?;
        if self.schema.features()[idx].kind != FeatureKind::Numeric {
            return Err(PipelineError::Schema(format!(
                "feature '{}' is {}, not numeric",
                name,
                self.schema.features()[idx].kind.name()
            )));
        }
        Ok(self
            .records
            .iter()
            .filter_map(|r| r.values()[idx].as_f64())
            .collect())
    }

    /// Keep only the named features, in original column order
    pub fn project(&self, names: &[String]) -> Result<Dataset> {
        let mut keep = names
            .iter()
            .map(|name| self.schema.index_of(name))
            .collect::<Result<Vec<_>>>()?;
        keep.sort_unstable();
        keep.dedup();

        let features = keep
            .iter()
            .map(|&i| self.schema.features()[i].clone())
            .collect();
        let records = self
            .records
            .iter()
            .map(|record| {
                let values = keep.iter().map(|&i| record.values()[i].clone()).collect();
                Record::new(values, record.label())
            })
            .collect();

        Ok(Dataset {
            schema: FeatureSchema::new(features)?,
            records,
        })
    }

    /// Records at the given positions, in the given order
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            schema: self.schema.clone(),
            records: indices.iter().map(|&i| self.records[i].clone()).collect(),
        }
    }

    /// Split into (train, test) keeping the class ratio in both parts
    pub fn stratified_split(&self, train_fraction: f64, seed: u64) -> Result<(Dataset, Dataset)> {
        if !(train_fraction > 0.0 && train_fraction < 1.0) {
            return Err(PipelineError::Configuration(format!(
                "train fraction must be in (0, 1), got {}",
                train_fraction
            )));
        }

        let labels = self.labels()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut train_idx = Vec::new();
        let mut test_idx = Vec::new();

        for class in [Attrition::Left, Attrition::Stayed] {
            let mut members: Vec<usize> = labels
                .iter()
                .enumerate()
                .filter(|(_, &label)| label == class)
                .map(|(i, _)| i)
                .collect();
            members.shuffle(&mut rng);

            let n_train = (members.len() as f64 * train_fraction).round() as usize;
            train_idx.extend_from_slice(&members[..n_train]);
            test_idx.extend_from_slice(&members[n_train..]);
        }

        train_idx.sort_unstable();
        test_idx.sort_unstable();

        if train_idx.is_empty() || test_idx.is_empty() {
            return Err(PipelineError::Load(format!(
                "cannot split {} records at fraction {}: one side would be empty",
                self.len(),
                train_fraction
            )));
        }

        Ok((self.subset(&train_idx), self.subset(&test_idx)))
    }

    /// Append a numeric feature column
    pub fn with_numeric_feature(&self, name: &str, values: &[f64]) -> Result<Dataset> {
        if self.schema.contains(name) {
            return Err(PipelineError::Schema(format!(
                "feature '{}' already exists",
                name
            )));
        }
        if values.len() != self.len() {
            return Err(PipelineError::Schema(format!(
                "feature '{}' has {} values for {} records",
                name,
                values.len(),
                self.len()
            )));
        }

        let mut features = self.schema.features().to_vec();
        features.push(Feature::numeric(name));

        let records = self
            .records
            .iter()
            .zip(values)
            .map(|(record, &v)| {
                let mut row = record.values().to_vec();
                row.push(Value::Numeric(v));
                Record::new(row, record.label())
            })
            .collect();

        Ok(Dataset {
            schema: FeatureSchema::new(features)?,
            records,
        })
    }
}

fn check_value(feature: &Feature, value: &Value) -> std::result::Result<(), String> {
    match (&feature.kind, value) {
        (FeatureKind::Numeric, Value::Numeric(v)) => {
            if v.is_finite() {
                Ok(())
            } else {
                Err(format!("non-finite numeric value {}", v))
            }
        }
        (FeatureKind::Categorical { levels }, Value::Categorical(level)) => {
            if levels.contains(level) {
                Ok(())
            } else {
                Err(format!("level '{}' is not declared", level))
            }
        }
        (FeatureKind::Text, Value::Text(_)) => Ok(()),
        (kind, value) => Err(format!(
            "expected a {} value, found {}",
            kind.name(),
            value.kind_name()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n_left: usize, n_stayed: usize) -> Dataset {
        let schema = FeatureSchema::new(vec![
            Feature::numeric("Age"),
            Feature::categorical("Department", vec!["HR".into(), "Sales".into()]),
        ])
        .unwrap();
        let records = (0..n_left + n_stayed)
            .map(|i| {
                let label = if i < n_left {
                    Attrition::Left
                } else {
                    Attrition::Stayed
                };
                let dept = if i % 2 == 0 { "HR" } else { "Sales" };
                Record::labeled(
                    vec![Value::Numeric(20.0 + i as f64), Value::Categorical(dept.into())],
                    label,
                )
            })
            .collect();
        Dataset::new(schema, records).unwrap()
    }

    #[test]
    fn test_value_kind_checked() {
        let schema = FeatureSchema::new(vec![Feature::numeric("Age")]).unwrap();
        let bad = vec![Record::labeled(
            vec![Value::Text("old".into())],
            Attrition::Left,
        )];
        assert!(matches!(
            Dataset::new(schema, bad),
            Err(PipelineError::Schema(_))
        ));
    }

    #[test]
    fn test_undeclared_level_rejected() {
        let schema =
            FeatureSchema::new(vec![Feature::categorical("Dept", vec!["HR".into()])]).unwrap();
        let bad = vec![Record::labeled(
            vec![Value::Categorical("IT".into())],
            Attrition::Left,
        )];
        assert!(Dataset::new(schema, bad).is_err());
    }

    #[test]
    fn test_project_keeps_column_order() {
        let ds = dataset(2, 2);
        let projected = ds
            .project(&["Department".to_string(), "Age".to_string()])
            .unwrap();
        assert_eq!(projected.schema().names(), vec!["Age", "Department"]);
        assert!(ds.project(&["Salary".to_string()]).is_err());
    }

    #[test]
    fn test_stratified_split_keeps_ratio() {
        let ds = dataset(20, 80);
        let (train, test) = ds.stratified_split(0.7, 7).unwrap();

        assert_eq!(train.len() + test.len(), 100);
        assert_eq!(train.class_counts().left, 14);
        assert_eq!(train.class_counts().stayed, 56);
        assert_eq!(test.class_counts().left, 6);
    }

    #[test]
    fn test_labels_require_every_record() {
        let schema = FeatureSchema::new(vec![Feature::numeric("Age")]).unwrap();
        let ds = Dataset::new(
            schema,
            vec![Record::new(vec![Value::Numeric(1.0)], None)],
        )
        .unwrap();
        assert!(matches!(ds.labels(), Err(PipelineError::Load(_))));
        assert_eq!(ds.class_counts().unlabeled, 1);
    }

    #[test]
    fn test_with_numeric_feature() {
        let ds = dataset(1, 1);
        let extended = ds.with_numeric_feature("sentiment_score", &[0.2, 0.9]).unwrap();
        assert_eq!(extended.numeric_column("sentiment_score").unwrap(), vec![0.2, 0.9]);
        assert!(ds.with_numeric_feature("Age", &[0.0, 0.0]).is_err());
        assert!(ds.with_numeric_feature("x", &[0.0]).is_err());
    }
}
