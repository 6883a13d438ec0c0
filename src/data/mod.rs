/// Tabular data model: records, typed schema, datasets and loading

pub mod dataset;
pub mod loader;
pub mod models;
pub mod schema;

pub use dataset::Dataset;
pub use loader::DataLoader;
pub use models::{Attrition, ClassCounts, Record, Value};
pub use schema::{Feature, FeatureKind, FeatureSchema};
