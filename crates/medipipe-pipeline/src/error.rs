use std::path::PathBuf;

use thiserror::Error;

use medipipe_storage::StorageError;

/// Errors surfaced by a pipeline run.
///
/// Per-file failures (a transcode that exits non-zero, an upload that is
/// rejected) are logged and counted in the run report rather than raised
/// here; this type covers conditions that prevent the run itself.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Input directory not readable: {path}: {source}")]
    InputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Worker task failed: {0}")]
    Worker(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
