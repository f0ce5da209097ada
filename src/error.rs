//! Error handling for gridflow
//!
//! This module defines the crate-level error type and a Result alias used by
//! configuration, pipeline files and the command line. Filters report their
//! own problems as diagnostics (see [`crate::pipeline::FilterError`]).

use crate::data::DataError;
use crate::pipeline::{FilterError, PipelineError};
use crate::storage::StoreError;
use thiserror::Error;

/// Main error type for gridflow operations
#[derive(Error, Debug)]
pub enum GridFlowError {
    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors assembling a pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// A filter rejected a parameter or input
    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    /// Data model errors outside a pipeline run
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Array store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

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
        source: Box<GridFlowError>,
    },
}

impl GridFlowError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        GridFlowError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

impl From<serde_json::Error> for GridFlowError {
    fn from(err: serde_json::Error) -> Self {
        GridFlowError::Serialization(err.to_string())
    }
}

/// Result type alias for gridflow operations
pub type Result<T> = std::result::Result<T, GridFlowError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<GridFlowError>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: GridFlowError = e.into();
            err.with_context(context)
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: GridFlowError = e.into();
            err.with_context(f())
        })
    }
}
