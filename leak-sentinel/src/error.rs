use std::path::PathBuf;

use leak_pipeline::PipelineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Failed to write report to '{}': {source}", path.display())]
    WriteReport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    /// 2 for bad input data, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Pipeline(e) if e.is_data_error() => 2,
            _ => 1,
        }
    }
}
