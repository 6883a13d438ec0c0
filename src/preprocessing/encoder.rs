//! Dataset to design-matrix encoding

use crate::data::{Dataset, FeatureKind, FeatureSchema, Value};
use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2, Axis};
use std::ops::Range;

/// Encoded columns belonging to one source feature
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureGroup {
    pub feature: String,
    pub columns: Range<usize>,
}

#[derive(Debug, Clone, PartialEq)]
enum Encoding {
    Numeric,
    OneHot(Vec<String>),
}

/// One-hot/numeric encoder fitted on a training schema
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureEncoder {
    plan: Vec<(String, Encoding)>,
    groups: Vec<FeatureGroup>,
    n_columns: usize,
}

impl FeatureEncoder {
    /// Plan the encoding; text features are not encoded
    pub fn fit(schema: &FeatureSchema) -> Self {
        let mut plan = Vec::new();
        let mut groups = Vec::new();
        let mut offset = 0;

        for feature in schema.features() {
            let (encoding, width) = match &feature.kind {
                FeatureKind::Numeric => (Encoding::Numeric, 1),
                FeatureKind::Categorical { levels } => {
                    (Encoding::OneHot(levels.clone()), levels.len())
                }
                FeatureKind::Text => continue,
            };
            groups.push(FeatureGroup {
                feature: feature.name.clone(),
                columns: offset..offset + width,
            });
            plan.push((feature.name.clone(), encoding));
            offset += width;
        }

        Self {
            plan,
            groups,
            n_columns: offset,
        }
    }

    pub fn n_columns(&self) -> usize {
        self.n_columns
    }

    pub fn groups(&self) -> &[FeatureGroup] {
        &self.groups
    }

    /// Encoded column names (`feature` or `feature=level`)
    pub fn column_names(&self) -> Vec<String> {
        self.plan
            .iter()
            .flat_map(|(name, encoding)| match encoding {
                Encoding::Numeric => vec![name.clone()],
                Encoding::OneHot(levels) => levels
                    .iter()
                    .map(|level| format!("{}={}", name, level))
                    .collect(),
            })
            .collect()
    }

    pub fn transform(&self, dataset: &Dataset) -> Result<Array2<f64>> {
        let schema = dataset.schema();
        let positions = self
            .plan
            .iter()
            .map(|(name, _)| schema.index_of(name))
            .collect::<Result<Vec<_>>>()?;

        let mut matrix = Array2::zeros((dataset.len(), self.n_columns));

        for (row, record) in dataset.records().iter().enumerate() {
            for ((name, encoding), (&pos, group)) in self
                .plan
                .iter()
                .zip(positions.iter().zip(self.groups.iter()))
            {
                let start = group.columns.start;
                match (encoding, &record.values()[pos]) {
                    (Encoding::Numeric, Value::Numeric(v)) => matrix[[row, start]] = *v,
                    (Encoding::OneHot(levels), Value::Categorical(level)) => {
                        let idx = levels.iter().position(|l| l == level).ok_or_else(|| {
                            PipelineError::Schema(format!(
                                "categorical level '{}' of feature '{}' was not seen during training",
                                level, name
                            ))
                        })?;
                        matrix[[row, start + idx]] = 1.0;
                    }
                    (_, value) => {
                        return Err(PipelineError::Schema(format!(
                            "feature '{}' holds a {} value but was encoded as {}",
                            name,
                            value.kind_name(),
                            match encoding {
                                Encoding::Numeric => "numeric",
                                Encoding::OneHot(_) => "categorical",
                            }
                        )))
                    }
                }
            }
        }

        Ok(matrix)
    }
}

/// Column standardization fitted on training rows
#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    means: Array1<f64>,
    scales: Array1<f64>,
}

impl Standardizer {
    pub fn fit(x: &Array2<f64>) -> Self {
        let means = x
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(x.ncols()));
        let scales = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > f64::EPSILON { s } else { 1.0 });
        Self { means, scales }
    }

    pub fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        (x - &self.means) / &self.scales
    }
}
