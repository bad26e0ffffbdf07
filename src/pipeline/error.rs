//! Pipeline-specific error types.

use crate::config::ParameterError;
use crate::source::SourceError;
use thiserror::Error;

/// Errors that can occur within the frame pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Frame source failed to start: {0}")]
    SourceInit(#[source] SourceError),

    #[error("Configuration rejected: {0}")]
    Parameter(#[from] ParameterError),

    #[error("Failed to spawn pipeline thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Pipeline thread panicked")]
    ThreadPanicked,
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
