//! Diagnostics accumulated while a pipeline runs.

use crate::pipeline::error::{ErrorCode, FilterError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How bad a diagnostic is. Only `Error` stops a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// One reported problem, tagged with the filter that raised it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: i32,
    pub message: String,
    pub filter_index: usize,
    pub filter_name: String,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        code: i32,
        message: impl Into<String>,
        filter_index: usize,
        filter_name: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            filter_index,
            filter_name: filter_name.into(),
        }
    }

    /// Build from a filter error. Cancellation is reported as a warning.
    pub fn from_error(err: &FilterError, filter_index: usize, filter_name: &str) -> Self {
        let code = err.code();
        let severity = if code == ErrorCode::Cancelled {
            Severity::Warning
        } else {
            Severity::Error
        };
        Self::new(severity, code.code(), err.to_string(), filter_index, filter_name)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        ErrorCode::from_code(self.code)
    }

    pub fn is_cancellation(&self) -> bool {
        self.code == ErrorCode::Cancelled.code()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [#{} {}]: {}",
            self.severity, self.code, self.filter_index, self.filter_name, self.message
        )
    }
}
