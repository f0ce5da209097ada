//! Per-filter run context: diagnostics, progress and cancellation.

use crate::pipeline::diagnostic::{Diagnostic, Severity};
use crate::pipeline::error::FilterError;
use crate::pipeline::observer::PipelineObserver;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Which half of the filter contract is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Preflight,
    Execute,
}

impl Phase {
    pub fn display_name(&self) -> &'static str {
        match self {
            Phase::Preflight => "preflight",
            Phase::Execute => "execute",
        }
    }
}

/// Shared cancellation flag. Clones observe the same flag, so a token can be
/// handed to another thread (or an observer) to stop a running pipeline.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub(crate) fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Passed to `Filter::preflight` and `Filter::execute`.
///
/// Collects the diagnostics the filter reports and forwards them, together
/// with progress updates, to the pipeline observer as they happen.
pub struct FilterContext<'a> {
    index: usize,
    filter_name: &'a str,
    phase: Phase,
    cancel: &'a CancelToken,
    observer: &'a mut dyn PipelineObserver,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> FilterContext<'a> {
    pub fn new(
        index: usize,
        filter_name: &'a str,
        phase: Phase,
        cancel: &'a CancelToken,
        observer: &'a mut dyn PipelineObserver,
    ) -> Self {
        Self {
            index,
            filter_name,
            phase,
            cancel,
            observer,
            diagnostics: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_preflight(&self) -> bool {
        self.phase == Phase::Preflight
    }

    /// Record a filter error as a diagnostic.
    pub fn report(&mut self, err: FilterError) {
        let diagnostic = Diagnostic::from_error(&err, self.index, self.filter_name);
        self.push(diagnostic);
    }

    pub fn warning(&mut self, code: i32, message: impl Into<String>) {
        let diagnostic =
            Diagnostic::new(Severity::Warning, code, message, self.index, self.filter_name);
        self.push(diagnostic);
    }

    /// Unwrap a result, reporting the error and yielding `None` on failure.
    pub fn check<T>(&mut self, result: Result<T, FilterError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.report(err);
                None
            }
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Filter-local progress, 0..=100.
    pub fn progress(&mut self, percent: u8, status: &str) {
        self.observer.progress(self.index, percent.min(100), status);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        self.observer.diagnostic(&diagnostic);
        self.diagnostics.push(diagnostic);
    }
}
