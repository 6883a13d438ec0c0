/// Tabular preprocessing stages
///
/// - `cleaner`: categorical coercion and zero-variance filtering
/// - `encoder`: design-matrix encoding and standardization
/// - `selector`: permutation-importance feature selection
/// - `resampler`: SMOTE class rebalancing for training data

pub mod cleaner;
pub mod encoder;
pub mod resampler;
pub mod selector;

pub use cleaner::{Cleaner, CleaningOutcome};
pub use encoder::{FeatureEncoder, FeatureGroup, Standardizer};
pub use resampler::{ResampleOutcome, Resampler};
pub use selector::{FeatureImportance, FeatureSelector, SelectionOutcome};
