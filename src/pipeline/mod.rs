//! Filter pipelines over a container registry.
//!
//! A pipeline is an ordered list of filters. Each run validates the whole
//! list before anything executes, then executes filters one at a time.
//!
//! # Architecture
//!
//! ```text
//! Idle ──► Preflighting ──► Executing ──► Completed
//!               │               ├──────► Failed
//!               └──► Failed     └──────► Cancelled
//! ```
//!
//! # Design
//!
//! - **Preflight on a skeleton**: validation runs against a copy of the
//!   registry with every group at zero tuples, so it cannot touch real data.
//! - **Diagnostics, not early returns**: filters report through
//!   [`FilterContext`] and every preflight problem is collected.
//! - **Static parameter tables**: name-based parameter access through
//!   `dyn Filter` without per-filter boilerplate.
//! - **Observers**: progress and diagnostics leave the executor through
//!   [`PipelineObserver`]; [`ChannelObserver`] crosses threads.

pub mod context;
pub mod diagnostic;
pub mod error;
pub mod executor;
pub mod filter;
pub mod filter_kind;
pub mod filters;
pub mod observer;
pub mod parameter;

pub use context::{CancelToken, FilterContext, Phase};
pub use diagnostic::{Diagnostic, Severity};
pub use error::{ErrorCode, FilterError, PipelineError, PipelineResult};
pub use executor::{Pipeline, PipelineBuilder, PipelineState, RunReport};
pub use filter::Filter;
pub use filter_kind::FilterKind;
pub use observer::{ChannelObserver, LogObserver, NullObserver, PipelineMessage, PipelineObserver};
pub use parameter::{
    Configurable, Parameter, ParameterAccess, ParameterInfo, ParameterKind, ParameterValue,
};
