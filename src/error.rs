use serde::Serialize;
use thiserror::Error;

/// Pipeline stage names, attached to errors so a failed run says where it stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Loading,
    Cleaning,
    Selection,
    Splitting,
    Resampling,
    Training,
    Evaluation,
    Translation,
    Normalization,
    Vectorization,
    Sentiment,
}

/// Pipeline error types
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Malformed or missing input, missing or non-binary label column
    #[error("Load error: {0}")]
    Load(String),

    /// Feature set mismatch or unknown feature
    #[error("Schema error: {0}")]
    Schema(String),

    /// Too few features would survive selection
    #[error("Selection error: {0}")]
    Selection(String),

    /// Minority class too small to synthesize from
    #[error("Resample error: {0}")]
    Resample(String),

    /// Model fitting or prediction failure
    #[error("Training error ({model}): {message}")]
    Train { model: String, message: String },

    /// External translation/sentiment service failure
    #[error("Service error: {0}")]
    Service(String),

    /// Service refused the configured credential
    #[error("Credential error: {0}")]
    Credential(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An error raised inside a named pipeline stage
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    pub fn train(model: impl Into<String>, message: impl Into<String>) -> Self {
        PipelineError::Train {
            model: model.into(),
            message: message.into(),
        }
    }

    /// Stage the error was raised in, if it has been attached
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Innermost error, with stage wrappers removed
    pub fn root(&self) -> &PipelineError {
        match self {
            PipelineError::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether repeating the failed call could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self.root(), PipelineError::Service(_))
    }

    /// Get error code string
    pub fn error_code(&self) -> &str {
        match self.root() {
            PipelineError::Load(_) => "LOAD_ERROR",
            PipelineError::Schema(_) => "SCHEMA_ERROR",
            PipelineError::Selection(_) => "SELECTION_ERROR",
            PipelineError::Resample(_) => "RESAMPLE_ERROR",
            PipelineError::Train { .. } => "TRAIN_ERROR",
            PipelineError::Service(_) => "SERVICE_ERROR",
            PipelineError::Credential(_) => "CREDENTIAL_ERROR",
            PipelineError::Configuration(_) => "CONFIGURATION_ERROR",
            PipelineError::Io(_) => "IO_ERROR",
            PipelineError::Serialization(_) => "SERIALIZATION_ERROR",
            PipelineError::Stage { .. } => "STAGE_ERROR",
        }
    }
}

/// Attach a stage name to the error side of a result
pub trait StageContext<T> {
    fn stage(self, stage: Stage) -> Result<T>;
}

impl<T> StageContext<T> for Result<T> {
    fn stage(self, stage: Stage) -> Result<T> {
        self.map_err(|err| match err {
            already @ PipelineError::Stage { .. } => already,
            other => PipelineError::Stage {
                stage,
                source: Box::new(other),
            },
        })
    }
}

/// Conversion from csv::Error
impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        let row = err
            .position()
            .map(|pos| format!(" at line {}", pos.line()))
            .unwrap_or_default();
        PipelineError::Load(format!("malformed delimited input{}: {}", row, err))
    }
}

/// Conversion from serde_json::Error
impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

/// Conversion from reqwest::Error
impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        PipelineError::Service(err.to_string())
    }
}

/// Conversion from validator::ValidationErrors
impl From<validator::ValidationErrors> for PipelineError {
    fn from(err: validator::ValidationErrors) -> Self {
        PipelineError::Configuration(err.to_string())
    }
}

/// Conversion from config::ConfigError
impl From<config::ConfigError> for PipelineError {
    fn from(err: config::ConfigError) -> Self {
        PipelineError::Configuration(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(PipelineError::Load("x".to_string()).error_code(), "LOAD_ERROR");
        assert_eq!(
            PipelineError::train("svm", "diverged").error_code(),
            "TRAIN_ERROR"
        );
        assert_eq!(
            PipelineError::Resample("x".to_string()).error_code(),
            "RESAMPLE_ERROR"
        );
    }

    #[test]
    fn test_stage_context_wraps_once() {
        let result: Result<()> = Err(PipelineError::Schema("missing 'Age'".to_string()));
        let err = result
            .stage(Stage::Cleaning)
            .stage(Stage::Training)
            .unwrap_err();

        assert_eq!(err.stage(), Some(Stage::Cleaning));
        assert_eq!(err.error_code(), "SCHEMA_ERROR");
        assert_eq!(
            err.to_string(),
            "cleaning stage failed: Schema error: missing 'Age'"
        );
    }

    #[test]
    fn test_only_service_errors_are_retryable() {
        assert!(PipelineError::Service("503".to_string()).is_retryable());
        assert!(!PipelineError::Credential("401".to_string()).is_retryable());
        assert!(!PipelineError::Configuration("x".to_string()).is_retryable());
    }

    #[test]
    fn test_stage_display_is_snake_case() {
        assert_eq!(Stage::Resampling.to_string(), "resampling");
        assert_eq!(Stage::Vectorization.to_string(), "vectorization");
    }
}
