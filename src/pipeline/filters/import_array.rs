//! Reads a stored array into an attribute group.

use crate::data::{ContainerRegistry, DataError, DataPath};
use crate::pipeline::context::FilterContext;
use crate::pipeline::error::FilterError;
use crate::pipeline::filter::{require_complete, require_group, Filter};
use crate::pipeline::parameter::{Configurable, Parameter, ParameterKind, ParameterValue};
use crate::storage::{ArrayHeader, ArrayStore, JsonArrayStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct ImportArray {
    pub store_root: String,
    pub location: String,
    pub output: DataPath,
    store: Option<Arc<dyn ArrayStore>>,
}

impl Default for ImportArray {
    fn default() -> Self {
        Self {
            store_root: ".".to_string(),
            location: String::new(),
            output: DataPath::new("ImageDataContainer", "CellData", "Imported"),
            store: None,
        }
    }
}

impl Configurable for ImportArray {
    const PARAMETERS: &'static [Parameter<Self>] = &[
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
        Parameter {
            name: "output",
            label: "Imported Array",
            units: "",
            kind: ParameterKind::DataPath,
            get: |f| ParameterValue::DataPath(f.output.clone()),
            set: |f, v| f.output = v.as_path().cloned().unwrap_or_default(),
        },
    ];
}

impl ImportArray {
    pub fn new(location: impl Into<String>, output: DataPath) -> Self {
        Self {
            location: location.into(),
            output,
            ..Self::default()
        }
    }

    /// Read through `store` instead of a JSON store at `store_root`.
    pub fn with_store(mut self, store: Arc<dyn ArrayStore>) -> Self {
        self.store = Some(store);
        self
    }

    fn store(&self) -> Arc<dyn ArrayStore> {
        match &self.store {
            Some(store) => Arc::clone(store),
            None => Arc::new(JsonArrayStore::new(&self.store_root)),
        }
    }

    fn check_tuples(&self, header: &ArrayHeader, group_tuples: usize) -> Result<(), FilterError> {
        if header.tuples != group_tuples {
            return Err(FilterError::Data(DataError::TupleMismatch {
                group: self.output.group.clone(),
                array: self.location.clone(),
                expected: group_tuples,
                actual: header.tuples,
            }));
        }
        Ok(())
    }

    /// Returns the stored header once the destination has been declared.
    fn data_check(
        &self,
        registry: &mut ContainerRegistry,
        ctx: &mut FilterContext,
    ) -> Option<ArrayHeader> {
        ctx.check(require_complete("output", &self.output));
        if self.location.is_empty() {
            ctx.report(FilterError::invalid("location", "must not be empty"));
        }
        if ctx.has_errors() {
            return None;
        }

        let header = ctx.check(self.store().describe(&self.location).map_err(FilterError::from))?;
        let group = ctx.check(require_group(registry, &self.output))?;
        if group.contains(&self.output.array) {
            ctx.report(FilterError::Data(DataError::DuplicateName {
                kind: "Array",
                name: self.output.to_string(),
            }));
            return None;
        }
        if !ctx.is_preflight() {
            ctx.check(self.check_tuples(&header, group.tuple_count()))?;
        }

        let group = registry.group_mut(&self.output).ok()?;
        ctx.check(
            group
                .create_array(&self.output.array, header.element_type, header.components)
                .map(|_| ())
                .map_err(FilterError::from),
        )?;
        Some(header)
    }
}

impl Filter for ImportArray {
    fn name(&self) -> &'static str {
        "import_array"
    }

    fn group(&self) -> &'static str {
        "IO"
    }

    fn human_label(&self) -> &'static str {
        "Import Array"
    }

    fn preflight(&mut self, registry: &mut ContainerRegistry, ctx: &mut FilterContext) {
        self.data_check(registry, ctx);
    }

    fn execute(&mut self, registry: &mut ContainerRegistry, ctx: &mut FilterContext) {
        let Some(header) = self.data_check(registry, ctx) else {
            return;
        };
        let Some(mut array) =
            ctx.check(self.store().read_array(&self.location).map_err(FilterError::from))
        else {
            return;
        };
        let expected = ArrayHeader {
            name: array.name().to_string(),
            ..header
        };
        if ArrayHeader::of(&array) != expected {
            ctx.report(FilterError::Storage(format!(
                "'{}' changed between describe and read",
                self.location
            )));
            return;
        }

        array.set_name(self.output.array.clone());
        let Ok(group) = registry.group_mut(&self.output) else {
            return;
        };
        if ctx.check(group.insert(array).map_err(FilterError::from)).is_some() {
            tracing::debug!(location = %self.location, output = %self.output, "Array imported");
            ctx.progress(100, "Array imported");
        }
    }

    fn clone_filter(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}
