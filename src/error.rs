//! Error handling for forcefield-rs
//!
//! This module defines the crate-level error type and a Result alias.
//! Layer-specific errors ([`PipelineError`], [`ParameterError`],
//! [`FrameError`], [`SourceError`]) convert into [`ForceFieldError`] with `?`.

use crate::config::ParameterError;
use crate::pipeline::PipelineError;
use crate::raster::FrameError;
use crate::source::SourceError;
use thiserror::Error;

/// Main error type for forcefield-rs operations
#[derive(Error, Debug)]
pub enum ForceFieldError {
    /// A pipeline parameter was outside its allowed range
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    /// Errors raised by the frame pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Errors raised by a frame source
    #[error("Frame source error: {0}")]
    Source(#[from] SourceError),

    /// Malformed pixel buffers
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// Image decoding errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ForceFieldError>,
    },
}

impl ForceFieldError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ForceFieldError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for forcefield-rs operations
pub type Result<T> = std::result::Result<T, ForceFieldError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ForceFieldError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ForceFieldError::Config("missing [pipeline] table".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: missing [pipeline] table"
        );
    }

    #[test]
    fn test_error_with_context() {
        let err = ForceFieldError::Source(SourceError::Empty);
        let with_ctx = err.with_context("Failed to open replay");
        assert!(with_ctx.to_string().contains("Failed to open replay"));
        assert!(with_ctx.to_string().contains("no frames"));
    }

    #[test]
    fn test_parameter_error_converts() {
        let err: ForceFieldError = ParameterError::Radius {
            value: 42,
            min: 1,
            max: 20,
        }
        .into();
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_result_ext_on_foreign_error() {
        let io: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        let err = io.context("Reading config").unwrap_err();
        assert!(err.to_string().starts_with("Reading config"));
    }
}
