//! Builds a boolean mask by comparing a scalar array against a value.

use crate::data::{ContainerRegistry, DataPath};
use crate::pipeline::context::FilterContext;
use crate::pipeline::error::FilterError;
use crate::pipeline::filter::{require_complete, require_name, require_scalar, Filter};
use crate::pipeline::parameter::{Configurable, Parameter, ParameterKind, ParameterValue};
use crate::types::ElementType;

const COMPARISONS: &[&str] = &[">", ">=", "<", "<=", "==", "!="];

fn compare(op: &str, lhs: f64, rhs: f64) -> bool {
    match op {
        ">" => lhs > rhs,
        ">=" => lhs >= rhs,
        "<" => lhs < rhs,
        "<=" => lhs <= rhs,
        "==" => lhs == rhs,
        "!=" => lhs != rhs,
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdArray {
    pub input: DataPath,
    pub output: String,
    pub comparison: String,
    pub value: f64,
}

impl Default for ThresholdArray {
    fn default() -> Self {
        Self {
            input: DataPath::new("ImageDataContainer", "CellData", "Confidence"),
            output: "Mask".to_string(),
            comparison: ">".to_string(),
            value: 0.0,
        }
    }
}

impl Configurable for ThresholdArray {
    const PARAMETERS: &'static [Parameter<Self>] = &[
        Parameter {
            name: "input",
            label: "Input Array",
            units: "",
            kind: ParameterKind::DataPath,
            get: |f| ParameterValue::DataPath(f.input.clone()),
            set: |f, v| f.input = v.as_path().cloned().unwrap_or_default(),
        },
        Parameter {
            name: "output",
            label: "Mask Array Name",
            units: "",
            kind: ParameterKind::Text,
            get: |f| ParameterValue::Text(f.output.clone()),
            set: |f, v| f.output = v.as_str().unwrap_or_default().to_string(),
        },
        Parameter {
            name: "comparison",
            label: "Comparison",
            units: "",
            kind: ParameterKind::Choice(COMPARISONS),
            get: |f| ParameterValue::Text(f.comparison.clone()),
            set: |f, v| f.comparison = v.as_str().unwrap_or_default().to_string(),
        },
        Parameter {
            name: "value",
            label: "Threshold Value",
            units: "",
            kind: ParameterKind::Float,
            get: |f| ParameterValue::Float(f.value),
            set: |f, v| f.value = v.as_float().unwrap_or_default(),
        },
    ];
}

impl ThresholdArray {
    pub fn new(input: DataPath, comparison: &str, value: f64) -> Self {
        Self {
            input,
            comparison: comparison.to_string(),
            value,
            ..Self::default()
        }
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    fn output_path(&self) -> DataPath {
        self.input.sibling(self.output.clone())
    }

    fn data_check(&self, registry: &mut ContainerRegistry, ctx: &mut FilterContext) {
        ctx.check(require_complete("input", &self.input));
        ctx.check(require_name("output", &self.output));
        if self.output == self.input.array {
            ctx.report(FilterError::invalid(
                "output",
                "mask must not overwrite its input array",
            ));
        }
        if !COMPARISONS.contains(&self.comparison.as_str()) {
            ctx.report(FilterError::invalid(
                "comparison",
                format!("unknown comparison '{}'", self.comparison),
            ));
        }
        if ctx.has_errors() {
            return;
        }

        if ctx.check(require_scalar(registry, &self.input)).is_none() {
            return;
        }
        if let Ok(group) = registry.group_mut(&self.input) {
            let created = group
                .create_array(&self.output, ElementType::Bool, 1)
                .map(|_| ())
                .map_err(FilterError::from);
            ctx.check(created);
        }
    }
}

impl Filter for ThresholdArray {
    fn name(&self) -> &'static str {
        "threshold_array"
    }

    fn group(&self) -> &'static str {
        "Processing"
    }

    fn human_label(&self) -> &'static str {
        "Threshold Array"
    }

    fn preflight(&mut self, registry: &mut ContainerRegistry, ctx: &mut FilterContext) {
        self.data_check(registry, ctx);
    }

    fn execute(&mut self, registry: &mut ContainerRegistry, ctx: &mut FilterContext) {
        self.data_check(registry, ctx);
        if ctx.has_errors() {
            return;
        }

        let Ok(input) = registry.array(&self.input) else {
            return;
        };
        let mask: Vec<bool> = (0..input.len())
            .map(|i| {
                input
                    .value(i)
                    .is_some_and(|v| compare(&self.comparison, v, self.value))
            })
            .collect();
        let selected = mask.iter().filter(|&&m| m).count();

        let output = self.output_path();
        if let Ok(array) = registry.array_mut(&output) {
            if let Ok(values) = array.as_mut_slice::<bool>() {
                values.copy_from_slice(&mask);
            }
        }
        tracing::debug!(input = %self.input, selected, total = mask.len(), "Threshold applied");
        ctx.progress(100, &format!("{} of {} tuples selected", selected, mask.len()));
    }

    fn clone_filter(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}
