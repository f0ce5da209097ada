//! Pipeline executor.
//!
//! A run has two passes over the filter list:
//! 1. Preflight every filter, in order, against a skeleton of the registry
//!    (same structure, every group at zero tuples). Later filters see the
//!    placeholders declared by earlier ones.
//! 2. If preflight produced no errors, execute every filter in order against
//!    the real registry, stopping at the first error or on cancellation.

use crate::data::ContainerRegistry;
use crate::pipeline::context::{CancelToken, FilterContext, Phase};
use crate::pipeline::diagnostic::{Diagnostic, Severity};
use crate::pipeline::error::{ErrorCode, PipelineError, PipelineResult};
use crate::pipeline::filter::Filter;
use crate::pipeline::observer::PipelineObserver;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// Lifecycle of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PipelineState {
    #[default]
    Idle,
    Preflighting,
    Executing,
    Completed,
    Failed,
    Cancelled,
}

impl PipelineState {
    pub fn display_name(&self) -> &'static str {
        match self {
            PipelineState::Idle => "Idle",
            PipelineState::Preflighting => "Preflighting",
            PipelineState::Executing => "Executing",
            PipelineState::Completed => "Completed",
            PipelineState::Failed => "Failed",
            PipelineState::Cancelled => "Cancelled",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, PipelineState::Preflighting | PipelineState::Executing)
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            PipelineState::Completed | PipelineState::Failed | PipelineState::Cancelled
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Outcome of a preflight or a full run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub pipeline: String,
    pub state: PipelineState,
    pub diagnostics: Vec<Diagnostic>,
    /// Filters whose `execute` was called.
    pub filters_executed: usize,
    pub rolled_back: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn is_success(&self) -> bool {
        self.state == PipelineState::Completed
    }
}

/// An ordered list of filters and the state of its last run.
pub struct Pipeline {
    name: String,
    filters: Vec<Box<dyn Filter>>,
    state: PipelineState,
    diagnostics: Vec<Diagnostic>,
    cancel: CancelToken,
}

impl Pipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filters: Vec::new(),
            state: PipelineState::Idle,
            diagnostics: Vec::new(),
            cancel: CancelToken::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn push(&mut self, filter: impl Filter + 'static) {
        self.filters.push(Box::new(filter));
    }

    pub fn push_boxed(&mut self, filter: Box<dyn Filter>) {
        self.filters.push(filter);
    }

    pub fn insert(&mut self, index: usize, filter: Box<dyn Filter>) {
        let index = index.min(self.filters.len());
        self.filters.insert(index, filter);
    }

    pub fn remove(&mut self, index: usize) -> Option<Box<dyn Filter>> {
        (index < self.filters.len()).then(|| self.filters.remove(index))
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn filters(&self) -> impl Iterator<Item = &dyn Filter> {
        self.filters.iter().map(|f| f.as_ref())
    }

    pub fn filter(&self, index: usize) -> Option<&dyn Filter> {
        self.filters.get(index).map(|f| f.as_ref())
    }

    pub fn filter_mut(&mut self, index: usize) -> Option<&mut Box<dyn Filter>> {
        self.filters.get_mut(index)
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Diagnostics of the last preflight or run.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    /// Handle for cancelling a run from another thread or an observer.
    ///
    /// A cancellation requested before [`run`](Self::run) stops that run
    /// before its first filter executes. The flag is cleared when a run
    /// ends, so the next run starts uncancelled.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Copy with independent filters and a fresh state.
    pub fn duplicate(&self) -> Pipeline {
        Pipeline {
            name: self.name.clone(),
            filters: self.filters.iter().map(|f| f.clone_filter()).collect(),
            state: PipelineState::Idle,
            diagnostics: Vec::new(),
            cancel: CancelToken::new(),
        }
    }

    /// Preflight only. The registry is never modified.
    ///
    /// Ends `Idle` when clean, `Failed` when any filter reported an error.
    pub fn preflight(
        &mut self,
        registry: &ContainerRegistry,
        observer: &mut dyn PipelineObserver,
    ) -> RunReport {
        let started_at = Utc::now();
        self.diagnostics.clear();

        let clean = self.preflight_all(registry, observer);
        let end = if clean {
            PipelineState::Idle
        } else {
            PipelineState::Failed
        };
        self.transition(end, observer);
        self.report(0, false, started_at)
    }

    /// Preflight, then execute every filter against `registry`.
    pub fn run(
        &mut self,
        registry: &mut ContainerRegistry,
        observer: &mut dyn PipelineObserver,
    ) -> RunReport {
        let report = self.run_once(registry, observer);
        self.cancel.reset();
        report
    }

    fn run_once(
        &mut self,
        registry: &mut ContainerRegistry,
        observer: &mut dyn PipelineObserver,
    ) -> RunReport {
        let started_at = Utc::now();
        let timer = Instant::now();
        self.diagnostics.clear();

        tracing::info!(pipeline = %self.name, filters = self.filters.len(), "Pipeline run started");

        if !self.preflight_all(registry, observer) {
            self.transition(PipelineState::Failed, observer);
            tracing::warn!(
                pipeline = %self.name,
                errors = self.errors().count(),
                "Preflight failed, nothing executed"
            );
            return self.report(0, false, started_at);
        }

        self.transition(PipelineState::Executing, observer);
        let mut executed = 0;
        let mut end = PipelineState::Completed;

        for index in 0..self.filters.len() {
            if self.cancel.is_cancelled() {
                let filter_name = self.filters[index].name();
                self.diagnostics.push(Diagnostic::new(
                    Severity::Warning,
                    ErrorCode::Cancelled.code(),
                    "Pipeline cancelled before this filter ran",
                    index,
                    filter_name,
                ));
                end = PipelineState::Cancelled;
                break;
            }

            let filter = &mut self.filters[index];
            let filter_name = filter.name();
            observer.filter_started(index, Phase::Execute, filter_name);
            let filter_timer = Instant::now();

            let mut ctx =
                FilterContext::new(index, filter_name, Phase::Execute, &self.cancel, &mut *observer);
            filter.execute(registry, &mut ctx);
            let diagnostics = ctx.into_diagnostics();

            tracing::debug!(
                index,
                filter = filter_name,
                elapsed_ms = filter_timer.elapsed().as_millis() as u64,
                "Filter executed"
            );
            observer.filter_finished(index, Phase::Execute);
            executed += 1;

            let cancelled = diagnostics.iter().any(Diagnostic::is_cancellation);
            let failed = diagnostics.iter().any(Diagnostic::is_error);
            self.diagnostics.extend(diagnostics);

            if cancelled {
                end = PipelineState::Cancelled;
                break;
            }
            if failed {
                end = PipelineState::Failed;
                break;
            }
        }

        self.transition(end, observer);
        tracing::info!(
            pipeline = %self.name,
            state = %end,
            executed,
            elapsed_ms = timer.elapsed().as_millis() as u64,
            "Pipeline run finished"
        );
        self.report(executed, false, started_at)
    }

    /// Like [`run`](Self::run), but restores `registry` to its state before
    /// the run when the run fails or is cancelled after executing anything.
    pub fn run_with_rollback(
        &mut self,
        registry: &mut ContainerRegistry,
        observer: &mut dyn PipelineObserver,
    ) -> RunReport {
        let snapshot = registry.clone();
        let mut report = self.run(registry, observer);
        let unfinished = matches!(
            report.state,
            PipelineState::Failed | PipelineState::Cancelled
        );
        if unfinished && report.filters_executed > 0 {
            *registry = snapshot;
            report.rolled_back = true;
            tracing::warn!(pipeline = %self.name, state = %report.state, "Registry rolled back");
        }
        report
    }

    /// Preflight every filter against a skeleton of `registry`. Returns true
    /// when no filter reported an error.
    fn preflight_all(
        &mut self,
        registry: &ContainerRegistry,
        observer: &mut dyn PipelineObserver,
    ) -> bool {
        self.transition(PipelineState::Preflighting, observer);
        let mut scratch = registry.skeleton();

        for (index, filter) in self.filters.iter_mut().enumerate() {
            let filter_name = filter.name();
            observer.filter_started(index, Phase::Preflight, filter_name);
            let mut ctx = FilterContext::new(
                index,
                filter_name,
                Phase::Preflight,
                &self.cancel,
                &mut *observer,
            );
            filter.preflight(&mut scratch, &mut ctx);
            self.diagnostics.extend(ctx.into_diagnostics());
            observer.filter_finished(index, Phase::Preflight);
        }

        !self.diagnostics.iter().any(Diagnostic::is_error)
    }

    fn transition(&mut self, state: PipelineState, observer: &mut dyn PipelineObserver) {
        if self.state != state {
            tracing::debug!(pipeline = %self.name, from = %self.state, to = %state, "State transition");
        }
        self.state = state;
        observer.state_changed(state);
    }

    fn report(&self, executed: usize, rolled_back: bool, started_at: DateTime<Utc>) -> RunReport {
        RunReport {
            pipeline: self.name.clone(),
            state: self.state,
            diagnostics: self.diagnostics.clone(),
            filters_executed: executed,
            rolled_back,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("filters", &self.filters)
            .field("state", &self.state)
            .finish()
    }
}

/// Builder for pipelines assembled in code.
pub struct PipelineBuilder {
    pipeline: Pipeline,
}

impl PipelineBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            pipeline: Pipeline::new(name),
        }
    }

    pub fn filter(mut self, filter: impl Filter + 'static) -> Self {
        self.pipeline.push(filter);
        self
    }

    pub fn boxed(mut self, filter: Box<dyn Filter>) -> Self {
        self.pipeline.push_boxed(filter);
        self
    }

    pub fn build(self) -> PipelineResult<Pipeline> {
        if self.pipeline.is_empty() {
            return Err(PipelineError::NoFilters);
        }
        Ok(self.pipeline)
    }
}
