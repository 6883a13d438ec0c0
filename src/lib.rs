//! Employee attrition prediction and review sentiment pipelines
//!
//! The tabular pipeline cleans an employee table, ranks and drops the least
//! informative features, rebalances the training split with SMOTE and compares
//! several classifiers on an untouched test split. The text pipeline turns free
//! text reviews into a term matrix (optionally translated first and enriched with
//! an external sentiment score) and runs the same train-and-compare stage.

pub mod config;
pub mod data;
pub mod error;
pub mod evaluation;
pub mod ml;
pub mod pipeline;
pub mod preprocessing;
pub mod services;
pub mod text;

pub use config::Config;
pub use error::{PipelineError, Result, Stage};
pub use pipeline::{AttritionPipeline, AttritionReport, SentimentPipeline, SentimentReport};
