use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary attrition outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attrition {
    /// The employee left (positive class)
    Left,

    /// The employee stayed (negative class)
    Stayed,
}

impl Attrition {
    pub fn is_left(self) -> bool {
        matches!(self, Attrition::Left)
    }

    pub fn from_bool(left: bool) -> Self {
        if left {
            Attrition::Left
        } else {
            Attrition::Stayed
        }
    }

    /// The opposite class
    pub fn other(self) -> Self {
        match self {
            Attrition::Left => Attrition::Stayed,
            Attrition::Stayed => Attrition::Left,
        }
    }
}

impl fmt::Display for Attrition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attrition::Left => write!(f, "left"),
            Attrition::Stayed => write!(f, "stayed"),
        }
    }
}

/// A single cell of a record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Numeric(f64),
    Categorical(String),
    Text(String),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Numeric(v) => Some(*v),
            _ => None,
        }
    }

    /// String content of categorical and text values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Categorical(s) | Value::Text(s) => Some(s),
            Value::Numeric(_) => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Numeric(_) => "numeric",
            Value::Categorical(_) => "categorical",
            Value::Text(_) => "text",
        }
    }
}

/// One employee: values positionally aligned with the dataset schema
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: Vec<Value>,
    label: Option<Attrition>,
}

impl Record {
    pub fn new(values: Vec<Value>, label: Option<Attrition>) -> Self {
        Self { values, label }
    }

    pub fn labeled(values: Vec<Value>, label: Attrition) -> Self {
        Self::new(values, Some(label))
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn label(&self) -> Option<Attrition> {
        self.label
    }
}

/// Label counts of a dataset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCounts {
    pub left: usize,
    pub stayed: usize,
    pub unlabeled: usize,
}

impl ClassCounts {
    pub fn get(&self, class: Attrition) -> usize {
        match class {
            Attrition::Left => self.left,
            Attrition::Stayed => self.stayed,
        }
    }

    /// Minority-to-majority ratio in [0, 1]; 1.0 means perfectly balanced
    pub fn balance(&self) -> f64 {
        let (lo, hi) = if self.left <= self.stayed {
            (self.left, self.stayed)
        } else {
            (self.stayed, self.left)
        };
        if hi == 0 {
            0.0
        } else {
            lo as f64 / hi as f64
        }
    }
}
