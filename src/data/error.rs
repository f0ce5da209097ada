//! Data model error types.

use crate::types::ElementType;
use thiserror::Error;

/// Errors raised by arrays, groups, containers and the registry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("{kind} '{name}' already exists")]
    DuplicateName { kind: &'static str, name: String },

    #[error("Array '{array}' has {actual} tuples but group '{group}' has {expected}")]
    TupleMismatch {
        group: String,
        array: String,
        expected: usize,
        actual: usize,
    },

    #[error(
        "Array '{array}' is {actual_type} x{actual_components}, expected {expected_type} x{expected_components}"
    )]
    TypeMismatch {
        array: String,
        expected_type: ElementType,
        expected_components: usize,
        actual_type: ElementType,
        actual_components: usize,
    },

    #[error("Buffer of {len} values cannot hold whole tuples of {components} components")]
    BadLayout { len: usize, components: usize },

    #[error("Array '{array}' of {tuples} tuples x {components} components is too large to allocate")]
    CapacityOverflow {
        array: String,
        tuples: usize,
        components: usize,
    },

    #[error("Grid of {dimensions:?} voxels has more cells than can be addressed")]
    GridTooLarge { dimensions: [usize; 3] },

    #[error("Container '{container}' geometry expects {expected} {kind} tuples, group has {actual}")]
    GeometryMismatch {
        container: String,
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl DataError {
    pub(crate) fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        DataError::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn duplicate(kind: &'static str, name: impl Into<String>) -> Self {
        DataError::DuplicateName {
            kind,
            name: name.into(),
        }
    }
}

pub type DataResult<T> = std::result::Result<T, DataError>;
