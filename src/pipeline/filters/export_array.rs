//! Writes an array through an [`ArrayStore`].

use crate::data::{ContainerRegistry, DataPath};
use crate::pipeline::context::FilterContext;
use crate::pipeline::error::FilterError;
use crate::pipeline::filter::{require_complete, Filter};
use crate::pipeline::parameter::{Configurable, Parameter, ParameterKind, ParameterValue};
use crate::storage::{ArrayStore, JsonArrayStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct ExportArray {
    pub input: DataPath,
    pub store_root: String,
    /// Defaults to the input path when empty.
    pub location: String,
    store: Option<Arc<dyn ArrayStore>>,
}

impl Default for ExportArray {
    fn default() -> Self {
        Self {
            input: DataPath::new("ImageDataContainer", "CellData", "FeatureIds"),
            store_root: ".".to_string(),
            location: String::new(),
            store: None,
        }
    }
}

impl Configurable for ExportArray {
    const PARAMETERS: &'static [Parameter<Self>] = &[
        Parameter {
            name: "input",
            label: "Array to Export",
            units: "",
            kind: ParameterKind::DataPath,
            get: |f| ParameterValue::DataPath(f.input.clone()),
            set: |f, v| f.input = v.as_path().cloned().unwrap_or_default(),
        },
        Parameter {
            name: "store_root",
            label: "Store Directory",
            units: "",
            kind: ParameterKind::Text,
            get: |f| ParameterValue::Text(f.store_root.clone()),
            set: |f, v| f.store_root = v.as_str().unwrap_or_default().to_string(),
        },
        Parameter {
            name: "location",
            label: "Location",
            units: "",
            kind: ParameterKind::Text,
            get: |f| ParameterValue::Text(f.location.clone()),
            set: |f, v| f.location = v.as_str().unwrap_or_default().to_string(),
        },
    ];
}

impl ExportArray {
    pub fn new(input: DataPath) -> Self {
        Self {
            input,
            ..Self::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_store_root(mut self, root: impl Into<String>) -> Self {
        self.store_root = root.into();
        self
    }

    pub fn with_store(mut self, store: Arc<dyn ArrayStore>) -> Self {
        self.store = Some(store);
        self
    }

    fn location(&self) -> String {
        if self.location.is_empty() {
            self.input.to_string()
        } else {
            self.location.clone()
        }
    }

    fn data_check(&self, registry: &ContainerRegistry, ctx: &mut FilterContext) {
        if ctx.check(require_complete("input", &self.input)).is_none() {
            return;
        }
        if let Err(e) = registry.array(&self.input) {
            ctx.report(FilterError::missing(&self.input, e));
        }
        if self.store.is_none() {
            let store = JsonArrayStore::new(&self.store_root);
            if let Err(e) = store.file_for(&self.location()) {
                ctx.report(FilterError::invalid("location", e.to_string()));
            }
        }
    }
}

impl Filter for ExportArray {
    fn name(&self) -> &'static str {
        "export_array"
    }

    fn group(&self) -> &'static str {
        "IO"
    }

    fn human_label(&self) -> &'static str {
        "Export Array"
    }

    fn preflight(&mut self, registry: &mut ContainerRegistry, ctx: &mut FilterContext) {
        self.data_check(registry, ctx);
    }

    fn execute(&mut self, registry: &mut ContainerRegistry, ctx: &mut FilterContext) {
        self.data_check(registry, ctx);
        if ctx.has_errors() {
            return;
        }
        let Ok(array) = registry.array(&self.input) else {
            return;
        };
        let location = self.location();
        let result = match &self.store {
            Some(store) => store.write_array(array, &location),
            None => JsonArrayStore::new(&self.store_root).write_array(array, &location),
        };
        if ctx.check(result.map_err(FilterError::from)).is_some() {
            tracing::info!(input = %self.input, location = %location, "Array exported");
            ctx.progress(100, "Array exported");
        }
    }

    fn clone_filter(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}
