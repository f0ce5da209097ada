//! Configuration module for gridflow
//!
//! This module handles the documents gridflow reads and writes:
//! - Pipeline files (`.json`) describing an ordered list of filters
//! - Engine settings (`settings.toml`) for logging, storage and runs
//!
//! # Config Location
//!
//! Settings live in the platform-appropriate location:
//! - **Linux**: `~/.config/io.gridflow/`
//! - **macOS**: `~/Library/Application Support/io.gridflow/`
//! - **Windows**: `%APPDATA%\io.gridflow\`
//!
//! Pipeline files are saved wherever the user chooses.
//!
//! # Example
//!
//! ```ignore
//! use gridflow::config::PipelineFile;
//!
//! let file = PipelineFile::load("grains.json")?;
//! let mut pipeline = file.build()?;
//! let report = pipeline.run(&mut registry, &mut NullObserver);
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{GridFlowError, Result};
use crate::pipeline::{FilterKind, Pipeline, PipelineError, ParameterValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "io.gridflow";

/// Settings filename inside the config directory
pub const SETTINGS_FILE: &str = "settings.toml";

/// Current pipeline file version
pub const PIPELINE_FILE_VERSION: u32 = 1;

// ==================== Config Directory ====================

/// Get the application config directory path
pub fn app_config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app config directory exists
pub fn ensure_app_config_dir() -> Result<PathBuf> {
    let dir = app_config_dir().ok_or_else(|| {
        GridFlowError::Config("Could not determine app config directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            GridFlowError::Config(format!("Failed to create app config directory: {}", e))
        })?;
    }

    Ok(dir)
}

// ==================== Pipeline File ====================

fn default_version() -> u32 {
    PIPELINE_FILE_VERSION
}

/// One filter of a saved pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterEntry {
    pub filter: FilterKind,

    /// Parameters by name. Missing names keep the filter's default.
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterValue>,
}

impl FilterEntry {
    pub fn new(filter: FilterKind) -> Self {
        Self {
            filter,
            parameters: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: ParameterValue) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }
}

/// Saved pipeline document
///
/// ```json
/// {
///   "version": 1,
///   "name": "grains",
///   "filters": [
///     { "filter": "create_image_geometry",
///       "parameters": { "dimensions": { "type": "int_vec3", "value": [64, 64, 64] } } }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineFile {
    #[serde(default = "default_version")]
    pub version: u32,

    pub name: String,

    #[serde(default)]
    pub filters: Vec<FilterEntry>,
}

impl Default for PipelineFile {
    fn default() -> Self {
        Self {
            version: PIPELINE_FILE_VERSION,
            name: "Untitled".to_string(),
            filters: Vec::new(),
        }
    }
}

impl PipelineFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Load a pipeline file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GridFlowError::Config(format!("Failed to read pipeline file {:?}: {}", path, e))
        })?;

        let file: PipelineFile = serde_json::from_str(&content).map_err(|e| {
            GridFlowError::Config(format!("Failed to parse pipeline file {:?}: {}", path, e))
        })?;

        if file.version > PIPELINE_FILE_VERSION {
            return Err(GridFlowError::Config(format!(
                "Pipeline file {:?} has version {}, newest supported is {}",
                path, file.version, PIPELINE_FILE_VERSION
            )));
        }
        Ok(file)
    }

    /// Save a pipeline file to disk as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    GridFlowError::Config(format!("Failed to create pipeline directory: {}", e))
                })?;
            }
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| GridFlowError::Config(format!("Failed to serialize pipeline: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            GridFlowError::Config(format!("Failed to write pipeline file {:?}: {}", path, e))
        })
    }

    /// Capture a configured pipeline through each filter's parameter table.
    pub fn from_pipeline(pipeline: &Pipeline) -> Result<Self> {
        let mut filters = Vec::with_capacity(pipeline.len());
        for filter in pipeline.filters() {
            let kind = FilterKind::from_id(filter.name())
                .ok_or_else(|| PipelineError::NotSerializable(filter.name().to_string()))?;
            let parameters = filter
                .parameters()
                .into_iter()
                .map(|info| (info.name.to_string(), info.value))
                .collect();
            filters.push(FilterEntry { filter: kind, parameters });
        }
        Ok(Self {
            version: PIPELINE_FILE_VERSION,
            name: pipeline.name().to_string(),
            filters,
        })
    }

    /// Instantiate every filter and apply its saved parameters.
    pub fn build(&self) -> Result<Pipeline> {
        let mut pipeline = Pipeline::new(&self.name);
        for entry in &self.filters {
            let mut filter = entry.filter.create();
            for (name, value) in &entry.parameters {
                filter
                    .set_parameter(name, value.clone())
                    .map_err(|source| PipelineError::Parameter {
                        filter: entry.filter.id().to_string(),
                        source,
                    })?;
            }
            pipeline.push_boxed(filter);
        }
        tracing::debug!(pipeline = %self.name, filters = pipeline.len(), "Pipeline built from file");
        Ok(pipeline)
    }
}
