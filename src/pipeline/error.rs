//! Pipeline-specific error types.

use crate::data::{DataError, DataPath};
use crate::shape::ShapeError;
use crate::storage::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable condition codes carried by diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    MissingData,
    TypeMismatch,
    InvalidParameter,
    DuplicateName,
    NotFound,
    DomainError,
    Cancelled,
    Storage,
}

impl ErrorCode {
    /// Numeric code shown in diagnostics.
    pub fn code(&self) -> i32 {
        match self {
            ErrorCode::MissingData => -1001,
            ErrorCode::TypeMismatch => -1002,
            ErrorCode::InvalidParameter => -1003,
            ErrorCode::DuplicateName => -1004,
            ErrorCode::NotFound => -1005,
            ErrorCode::DomainError => -1006,
            ErrorCode::Cancelled => -1007,
            ErrorCode::Storage => -1008,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        [
            ErrorCode::MissingData,
            ErrorCode::TypeMismatch,
            ErrorCode::InvalidParameter,
            ErrorCode::DuplicateName,
            ErrorCode::NotFound,
            ErrorCode::DomainError,
            ErrorCode::Cancelled,
            ErrorCode::Storage,
        ]
        .into_iter()
        .find(|c| c.code() == code)
    }
}

/// Errors a filter reports while preflighting or executing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Required data '{path}' is missing: {source}")]
    MissingData {
        path: String,
        #[source]
        source: DataError,
    },

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Cancelled")]
    Cancelled,
}

impl FilterError {
    /// A declared required path did not resolve.
    pub fn missing(path: &DataPath, source: DataError) -> Self {
        FilterError::MissingData {
            path: path.to_string(),
            source,
        }
    }

    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        FilterError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            FilterError::MissingData { .. } => ErrorCode::MissingData,
            FilterError::InvalidParameter { .. } => ErrorCode::InvalidParameter,
            FilterError::Data(err) => match err {
                DataError::NotFound { .. } => ErrorCode::NotFound,
                DataError::DuplicateName { .. } => ErrorCode::DuplicateName,
                DataError::TupleMismatch { .. }
                | DataError::TypeMismatch { .. }
                | DataError::BadLayout { .. } => ErrorCode::TypeMismatch,
                DataError::GeometryMismatch { .. }
                | DataError::GridTooLarge { .. }
                | DataError::CapacityOverflow { .. } => ErrorCode::InvalidParameter,
            },
            FilterError::Shape(_) => ErrorCode::DomainError,
            FilterError::Storage(_) => ErrorCode::Storage,
            FilterError::Cancelled => ErrorCode::Cancelled,
        }
    }
}

impl From<StoreError> for FilterError {
    fn from(err: StoreError) -> Self {
        FilterError::Storage(err.to_string())
    }
}

/// Errors from assembling pipelines.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No filters in pipeline")]
    NoFilters,

    #[error("Unknown filter '{0}'")]
    UnknownFilter(String),

    #[error("Filter '{0}' is not a built-in filter and cannot be saved")]
    NotSerializable(String),

    #[error("Filter '{filter}': {source}")]
    Parameter {
        filter: String,
        #[source]
        source: FilterError,
    },
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
