//! Common test utilities
//!
//! Toy employee tables, review corpora and a configuration small enough to keep
//! integration runs fast.

#![allow(dead_code)]

use attrition_pipeline::{
    config::{Config, ModelConfig},
    data::{Attrition, Dataset, Feature, FeatureSchema, Record, Value},
    ml::{ForestParams, Hyperparameters, LogisticParams, ResamplingScheme},
};

const DEPARTMENTS: [&str; 3] = ["Sales", "Research & Development", "Human Resources"];

/// Mixed-type employee table. Every fifth employee left; leavers are younger,
/// earn less and mostly work overtime. `StandardHours` and `Over18` are constant.
pub fn employees(n: usize) -> Dataset {
    let schema = FeatureSchema::new(vec![
        Feature::numeric("Age"),
        Feature::numeric("MonthlyIncome"),
        Feature::numeric("JobLevel"),
        Feature::text("OverTime"),
        Feature::text("Department"),
        Feature::numeric("StandardHours"),
        Feature::text("Over18"),
    ])
    .unwrap();

    let records = (0..n)
        .map(|i| {
            let left = i % 5 == 0;
            let (age, income, level, overtime) = if left {
                (
                    22.0 + (i % 7) as f64,
                    2_000.0 + 100.0 * (i % 5) as f64,
                    1.0,
                    if i % 3 == 0 { "No" } else { "Yes" },
                )
            } else {
                (
                    35.0 + (i % 11) as f64,
                    6_000.0 + 150.0 * (i % 9) as f64,
                    2.0 + (i % 2) as f64,
                    if i % 4 == 0 { "Yes" } else { "No" },
                )
            };
            Record::labeled(
                vec![
                    Value::Numeric(age),
                    Value::Numeric(income),
                    Value::Numeric(level),
                    Value::Text(overtime.to_string()),
                    Value::Text(DEPARTMENTS[i % 3].to_string()),
                    Value::Numeric(80.0),
                    Value::Text("Y".to_string()),
                ],
                if left { Attrition::Left } else { Attrition::Stayed },
            )
        })
        .collect();

    Dataset::new(schema, records).unwrap()
}

/// The same table rendered as delimited text with a Yes/No label column
pub fn employees_csv(n: usize) -> String {
    let mut out = String::from(
        "Age,Attrition,MonthlyIncome,JobLevel,OverTime,Department,StandardHours,Over18\n",
    );
    let dataset = employees(n);
    for record in dataset.records() {
        let v = record.values();
        let label = match record.label() {
            Some(Attrition::Left) => "Yes",
            _ => "No",
        };
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{}\n",
            v[0].as_f64().unwrap(),
            label,
            v[1].as_f64().unwrap(),
            v[2].as_f64().unwrap(),
            v[3].as_str().unwrap(),
            v[4].as_str().unwrap(),
            v[5].as_f64().unwrap(),
            v[6].as_str().unwrap(),
        ));
    }
    out
}

/// Two numeric features, one of which separates the classes by a wide margin
pub fn separable(n_per_class: usize, offset: usize) -> Dataset {
    let schema = FeatureSchema::new(vec![
        Feature::numeric("Score"),
        Feature::numeric("Tenure"),
    ])
    .unwrap();

    let mut records = Vec::with_capacity(2 * n_per_class);
    for i in 0..n_per_class {
        let jitter = ((i + offset) % 5) as f64 * 0.1;
        records.push(Record::labeled(
            vec![Value::Numeric(1.0 + jitter), Value::Numeric((i % 4) as f64)],
            Attrition::Left,
        ));
        records.push(Record::labeled(
            vec![Value::Numeric(9.0 + jitter), Value::Numeric(((i + 1) % 4) as f64)],
            Attrition::Stayed,
        ));
    }
    Dataset::new(schema, records).unwrap()
}

/// Numeric-only table with `n_left` leavers and `n_stayed` stayers
pub fn imbalanced(n_left: usize, n_stayed: usize) -> Dataset {
    let schema = FeatureSchema::new(vec![
        Feature::numeric("YearsAtCompany"),
        Feature::numeric("DistanceFromHome"),
    ])
    .unwrap();

    let left = (0..n_left).map(|i| {
        Record::labeled(
            vec![
                Value::Numeric(1.0 + (i % 3) as f64),
                Value::Numeric(20.0 + (i % 6) as f64),
            ],
            Attrition::Left,
        )
    });
    let stayed = (0..n_stayed).map(|i| {
        Record::labeled(
            vec![
                Value::Numeric(5.0 + (i % 10) as f64),
                Value::Numeric(2.0 + (i % 8) as f64),
            ],
            Attrition::Stayed,
        )
    });

    Dataset::new(schema, left.chain(stayed).collect()).unwrap()
}

const NEGATIVE: [&str; 4] = [
    "Terrible management and bad pay, 60 hour weeks!",
    "Bad pay. Long hours; no growth.",
    "Management is terrible and the hours are long",
    "Awful culture, bad pay and terrible hours",
];

const POSITIVE: [&str; 4] = [
    "Great team, good culture and a supportive manager.",
    "Good benefits and a great team!!",
    "Supportive manager, great culture, good work-life balance",
    "Great people and good culture in 2023",
];

/// Review table: leavers write negative reviews, stayers positive ones
pub fn reviews(n_per_class: usize) -> Dataset {
    let schema = FeatureSchema::new(vec![Feature::text("Review")]).unwrap();
    let mut records = Vec::with_capacity(2 * n_per_class);
    for i in 0..n_per_class {
        records.push(Record::labeled(
            vec![Value::Text(NEGATIVE[i % NEGATIVE.len()].to_string())],
            Attrition::Left,
        ));
        records.push(Record::labeled(
            vec![Value::Text(POSITIVE[i % POSITIVE.len()].to_string())],
            Attrition::Stayed,
        ));
    }
    Dataset::new(schema, records).unwrap()
}

/// Review table with a language tag column
pub fn tagged_reviews(n_per_class: usize, language: &str) -> Dataset {
    let base = reviews(n_per_class);
    let schema = FeatureSchema::new(vec![
        Feature::text("Review"),
        Feature::text("Language"),
    ])
    .unwrap();
    let records = base
        .records()
        .iter()
        .map(|r| {
            let mut values = r.values().to_vec();
            values.push(Value::Text(language.to_string()));
            Record::new(values, r.label())
        })
        .collect();
    Dataset::new(schema, records).unwrap()
}

/// Review table whose language tags cycle through `languages` every two records,
/// so both classes carry every tag
pub fn mixed_language_reviews(n_per_class: usize, languages: &[&str]) -> Dataset {
    let base = reviews(n_per_class);
    let schema = FeatureSchema::new(vec![
        Feature::text("Review"),
        Feature::text("Language"),
    ])
    .unwrap();
    let records = base
        .records()
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let mut values = r.values().to_vec();
            values.push(Value::Text(languages[(i / 2) % languages.len()].to_string()));
            Record::new(values, r.label())
        })
        .collect();
    Dataset::new(schema, records).unwrap()
}

pub fn logistic() -> ModelConfig {
    ModelConfig::new(
        "logistic_regression",
        vec![Hyperparameters::LogisticRegression(LogisticParams::default())],
    )
}

pub fn small_forest() -> ModelConfig {
    ModelConfig::new(
        "random_forest",
        vec![
            Hyperparameters::RandomForest(ForestParams {
                n_trees: 15,
                max_depth: 4,
                ..ForestParams::default()
            }),
            Hyperparameters::RandomForest(ForestParams {
                n_trees: 15,
                max_depth: 2,
                ..ForestParams::default()
            }),
        ],
    )
}

/// Defaults shrunk for fast runs over [`employees`] and [`reviews`]
pub fn quick_config() -> Config {
    let mut config = Config::default();
    config.cleaning.categorical_columns = vec!["JobLevel".to_string()];
    config.selection.drop_count = 1;
    config.selection.importance_trees = 10;
    config.selection.permutation_repeats = 1;
    config.training.scheme = ResamplingScheme::k_fold(3, 1, 42);
    config.training.models = vec![logistic(), small_forest()];
    config.text.min_doc_fraction = 0.0;
    config.text.models = vec![logistic()];
    config
}
