//! Pipeline error types.
//!
//! Every failure mode has a named variant. No stringly-typed errors.

use std::path::PathBuf;

use leak_engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unsupported table format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error in '{}': {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON parse error in '{}' at line {line}: {source}", path.display())]
    Json {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected table shape in '{}': {reason}", path.display())]
    Shape { path: PathBuf, reason: String },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Run log error at '{}': {source}", path.display())]
    RunLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl PipelineError {
    /// True when the input data itself is at fault rather than the environment.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            PipelineError::Engine(_)
                | PipelineError::Csv { .. }
                | PipelineError::Json { .. }
                | PipelineError::Shape { .. }
                | PipelineError::UnsupportedFormat { .. }
        )
    }
}

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
