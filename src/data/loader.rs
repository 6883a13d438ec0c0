//! Delimited-text loading into typed datasets

use crate::config::DataConfig;
use crate::data::dataset::Dataset;
use crate::data::models::{Attrition, Record, Value};
use crate::data::schema::{Feature, FeatureSchema};
use crate::error::{PipelineError, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Reads a header-plus-rows delimited source into a [`Dataset`]
#[derive(Debug, Clone)]
pub struct DataLoader {
    label_column: String,
    positive_label: String,
    delimiter: u8,
}

impl DataLoader {
    pub fn new(label_column: impl Into<String>, positive_label: impl Into<String>) -> Self {
        Self {
            label_column: label_column.into(),
            positive_label: positive_label.into(),
            delimiter: b',',
        }
    }

    pub fn from_config(config: &DataConfig) -> Self {
        Self::new(&config.label_column, &config.positive_label).with_delimiter(config.delimiter as u8)
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<Dataset> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            PipelineError::Load(format!("failed to open {}: {}", path.display(), e))
        })?;
        info!(path = %path.display(), "Loading delimited input");
        self.load_reader(file)
    }

    pub fn load_reader<R: Read>(&self, reader: R) -> Result<Dataset> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let label_idx = headers
            .iter()
            .position(|h| h == self.label_column)
            .ok_or_else(|| {
                PipelineError::Load(format!(
                    "label column '{}' is absent (columns: {})",
                    self.label_column,
                    headers.iter().collect::<Vec<_>>().join(", ")
                ))
            })?;

        let rows = reader
            .records()
            .collect::<std::result::Result<Vec<StringRecord>, csv::Error>>()?;

        let labels = self.parse_labels(&rows, label_idx)?;

        let columns: Vec<(usize, &str)> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != label_idx)
            .collect();

        let mut features = Vec::with_capacity(columns.len());
        let mut parsed: Vec<Vec<Value>> = vec![Vec::with_capacity(columns.len()); rows.len()];

        for (col, name) in columns {
            let numeric = rows.iter().all(|row| row[col].parse::<f64>().is_ok());

            for (r, row) in rows.iter().enumerate() {
                let cell = &row[col];
                if cell.is_empty() {
                    return Err(PipelineError::Load(format!(
                        "row {}: column '{}' is empty",
                        r + 2,
                        name
                    )));
                }
                parsed[r].push(if numeric {
                    let value = cell.parse::<f64>().unwrap_or_default();
                    if !value.is_finite() {
                        return Err(PipelineError::Load(format!(
                            "row {}: column '{}' has non-finite value '{}'",
                            r + 2,
                            name,
                            cell
                        )));
                    }
                    Value::Numeric(value)
                } else {
                    Value::Text(cell.to_string())
                });
            }

            features.push(if numeric {
                Feature::numeric(name)
            } else {
                Feature::text(name)
            });
        }

        let records = parsed
            .into_iter()
            .zip(labels)
            .map(|(values, label)| Record::labeled(values, label))
            .collect();

        let dataset = Dataset::new(FeatureSchema::new(features)?, records)?;
        let counts = dataset.class_counts();
        info!(
            records = dataset.len(),
            features = dataset.schema().len(),
            left = counts.left,
            stayed = counts.stayed,
            "Loaded dataset"
        );

        Ok(dataset)
    }

    fn parse_labels(&self, rows: &[StringRecord], label_idx: usize) -> Result<Vec<Attrition>> {
        let mut distinct = BTreeSet::new();
        for (r, row) in rows.iter().enumerate() {
            let value = &row[label_idx];
            if value.is_empty() {
                return Err(PipelineError::Load(format!(
                    "row {}: label column '{}' is empty",
                    r + 2,
                    self.label_column
                )));
            }
            distinct.insert(value);
        }

        if distinct.len() != 2 {
            return Err(PipelineError::Load(format!(
                "label column '{}' must have exactly two distinct values, found {} ({})",
                self.label_column,
                distinct.len(),
                distinct.iter().copied().collect::<Vec<_>>().join(", ")
            )));
        }
        if !distinct.contains(self.positive_label.as_str()) {
            return Err(PipelineError::Load(format!(
                "positive label '{}' does not occur in column '{}'",
                self.positive_label, self.label_column
            )));
        }
        debug!(values = ?distinct, positive = %self.positive_label, "Coerced label column");

        Ok(rows
            .iter()
            .map(|row| Attrition::from_bool(&row[label_idx] == self.positive_label))
            .collect())
    }
}
