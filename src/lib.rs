//! # gridflow: dataflow pipelines for voxel datasets
//!
//! A pipeline engine for scientific datasets stored as named containers of
//! attribute arrays. Filters declare what they read and create, every filter
//! is validated before any of them runs, and runs can be cancelled between
//! and inside filters.
//!
//! ## Architecture
//!
//! - **Data**: typed [`data::DataArray`]s grouped into tuple-aligned
//!   [`data::AttributeGroup`]s inside [`data::DataContainer`]s, all owned by a
//!   [`data::ContainerRegistry`]
//! - **Pipeline**: [`pipeline::Filter`]s with preflight and execute phases,
//!   driven by a [`pipeline::Pipeline`] state machine
//! - **Shapes**: [`shape::ShapeOps`] for placing synthetic grains
//! - **Storage**: the [`storage::ArrayStore`] boundary for reading and writing arrays
//! - **Communication**: observers, including a crossbeam channel observer
//!
//! ## Configuration
//!
//! Engine settings are stored as TOML in the platform config directory under
//! `io.gridflow`. Pipelines are JSON documents ([`config::PipelineFile`]).
//!
//! ## Example
//!
//! ```ignore
//! use gridflow::{
//!     config::PipelineFile,
//!     data::ContainerRegistry,
//!     pipeline::LogObserver,
//! };
//!
//! let mut pipeline = PipelineFile::load("grains.json")?.build()?;
//! let mut registry = ContainerRegistry::new();
//! let report = pipeline.run(&mut registry, &mut LogObserver);
//! println!("{}", report.state);
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod shape;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use config::{EngineSettings, PipelineFile};
pub use data::{AttributeGroup, ContainerRegistry, DataArray, DataContainer, DataPath};
pub use error::{GridFlowError, Result};
pub use pipeline::{Filter, FilterKind, Pipeline, PipelineBuilder, PipelineState, RunReport};
pub use types::{ElementType, GeometryKind, GroupKind};
