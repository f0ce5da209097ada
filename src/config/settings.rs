//! Engine settings read at startup
//!
//! Settings are stored as TOML. Every field has a default, so a partial file
//! (or no file at all) is valid.
//!
//! ```toml
//! log_filter = "gridflow=debug"
//! log_dir = "/var/log/gridflow"
//! progress_channel_capacity = 256
//! rollback_on_failure = true
//! store_root = "data"
//! ```

use super::{app_config_dir, ensure_app_config_dir, SETTINGS_FILE};
use crate::error::{GridFlowError, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default tracing filter directive
pub const DEFAULT_LOG_FILTER: &str = "gridflow=info";

/// Default capacity of the progress channel between the runner and the CLI
pub const DEFAULT_PROGRESS_CAPACITY: usize = 1024;

/// Settings for the pipeline engine and its command line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is not set
    pub log_filter: String,

    /// Directory for daily-rolling log files; console only when unset
    pub log_dir: Option<PathBuf>,

    /// Bounded capacity of the progress channel
    pub progress_channel_capacity: usize,

    /// Restore the registry when a run fails or is cancelled
    pub rollback_on_failure: bool,

    /// Default root for the JSON array store
    pub store_root: PathBuf,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_dir: None,
            progress_channel_capacity: DEFAULT_PROGRESS_CAPACITY,
            rollback_on_failure: false,
            store_root: PathBuf::from("."),
        }
    }
}

impl EngineSettings {
    /// Path of the settings file in the platform config directory
    pub fn default_path() -> Option<PathBuf> {
        app_config_dir().map(|p| p.join(SETTINGS_FILE))
    }

    /// Load settings from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GridFlowError::Config(format!("Failed to read settings {:?}: {}", path, e))
        })?;

        let settings: EngineSettings = toml::from_str(&content).map_err(|e| {
            GridFlowError::Config(format!("Failed to parse settings {:?}: {}", path, e))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default location. See [`load_from_or_default`].
    ///
    /// [`load_from_or_default`]: Self::load_from_or_default
    pub fn load_or_default() -> (Self, Option<GridFlowError>) {
        match Self::default_path() {
            Some(path) => Self::load_from_or_default(path),
            None => (Self::default(), None),
        }
    }

    /// Load settings from `path`, falling back to defaults. A missing file is
    /// not an error; any other failure is handed back alongside the defaults
    /// so it can be reported once logging is running.
    pub fn load_from_or_default(path: impl AsRef<Path>) -> (Self, Option<GridFlowError>) {
        let path = path.as_ref();
        if !path.exists() {
            return (Self::default(), None);
        }
        match Self::load(path) {
            Ok(settings) => (settings, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Save settings as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create settings directory {:?}", parent))?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| GridFlowError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(path, content).with_context(|| format!("Failed to write settings {:?}", path))
    }

    /// Save settings to the default location
    pub fn save_default(&self) -> Result<PathBuf> {
        let path = ensure_app_config_dir()
            .context("Settings cannot be saved")?
            .join(SETTINGS_FILE);
        self.save(&path)?;
        Ok(path)
    }

    fn validate(&self) -> Result<()> {
        if self.progress_channel_capacity == 0 {
            return Err(GridFlowError::Config(
                "progress_channel_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
