//! Creates a new array filled with a constant.

use crate::data::{ContainerRegistry, DataPath};
use crate::pipeline::context::FilterContext;
use crate::pipeline::error::FilterError;
use crate::pipeline::filter::{require_complete, require_group, Filter};
use crate::pipeline::parameter::{Configurable, Parameter, ParameterKind, ParameterValue};
use crate::types::ElementType;

#[derive(Debug, Clone, PartialEq)]
pub struct CreateDataArray {
    pub output: DataPath,
    pub element_type: ElementType,
    pub components: i64,
    pub initial_value: f64,
}

impl Default for CreateDataArray {
    fn default() -> Self {
        Self {
            output: DataPath::new("ImageDataContainer", "CellData", "NewArray"),
            element_type: ElementType::F32,
            components: 1,
            initial_value: 0.0,
        }
    }
}

impl Configurable for CreateDataArray {
    const PARAMETERS: &'static [Parameter<Self>] = &[
        Parameter {
            name: "output",
            label: "Created Array",
            units: "",
            kind: ParameterKind::DataPath,
            get: |f| ParameterValue::DataPath(f.output.clone()),
            set: |f, v| f.output = v.as_path().cloned().unwrap_or_default(),
        },
        Parameter {
            name: "element_type",
            label: "Element Type",
            units: "",
            kind: ParameterKind::ElementType,
            get: |f| ParameterValue::ElementType(f.element_type),
            set: |f, v| f.element_type = v.as_element_type().unwrap_or_default(),
        },
        Parameter {
            name: "components",
            label: "Number of Components",
            units: "",
            kind: ParameterKind::Integer,
            get: |f| ParameterValue::Integer(f.components),
            set: |f, v| f.components = v.as_int().unwrap_or_default(),
        },
        Parameter {
            name: "initial_value",
            label: "Initial Value",
            units: "",
            kind: ParameterKind::Float,
            get: |f| ParameterValue::Float(f.initial_value),
            set: |f, v| f.initial_value = v.as_float().unwrap_or_default(),
        },
    ];
}

/// Largest accepted component count per tuple.
pub const MAX_COMPONENTS: i64 = 1 << 16;

/// Whether `value` survives a round trip through `element_type`.
fn representable(element_type: ElementType, value: f64) -> bool {
    let (min, max) = match element_type {
        ElementType::F32 => return !value.is_finite() || value.abs() <= f32::MAX as f64,
        ElementType::F64 => return true,
        ElementType::Bool => return value == 0.0 || value == 1.0,
        ElementType::I8 => (i8::MIN as f64, i8::MAX as f64),
        ElementType::U8 => (0.0, u8::MAX as f64),
        ElementType::I16 => (i16::MIN as f64, i16::MAX as f64),
        ElementType::U16 => (0.0, u16::MAX as f64),
        ElementType::I32 => (i32::MIN as f64, i32::MAX as f64),
        ElementType::U32 => (0.0, u32::MAX as f64),
        ElementType::I64 => (i64::MIN as f64, i64::MAX as f64),
        ElementType::U64 => (0.0, u64::MAX as f64),
    };
    value.fract() == 0.0 && value >= min && value <= max
}

impl CreateDataArray {
    pub fn new(output: DataPath, element_type: ElementType, components: usize) -> Self {
        Self {
            output,
            element_type,
            components: components as i64,
            ..Self::default()
        }
    }

    pub fn with_initial_value(mut self, value: f64) -> Self {
        self.initial_value = value;
        self
    }

    fn data_check(&self, registry: &mut ContainerRegistry, ctx: &mut FilterContext) {
        ctx.check(require_complete("output", &self.output));
        if !(1..=MAX_COMPONENTS).contains(&self.components) {
            ctx.report(FilterError::invalid(
                "components",
                format!("must be between 1 and {}", MAX_COMPONENTS),
            ));
        }
        if !representable(self.element_type, self.initial_value) {
            ctx.report(FilterError::invalid(
                "initial_value",
                format!(
                    "{} cannot be stored as {}",
                    self.initial_value, self.element_type
                ),
            ));
        }
        if ctx.has_errors() {
            return;
        }

        let group_path = self.output.sibling("");
        let Some(group) = ctx.check(require_group(registry, &group_path)) else {
            return;
        };
        if group.contains(&self.output.array) {
            ctx.report(FilterError::Data(crate::data::DataError::DuplicateName {
                kind: "Array",
                name: self.output.to_string(),
            }));
            return;
        }

        if let Ok(group) = registry.group_mut(&group_path) {
            let created = group
                .create_array(&self.output.array, self.element_type, self.components as usize)
                .map(|_| ())
                .map_err(FilterError::from);
            ctx.check(created);
        }
    }
}

impl Filter for CreateDataArray {
    fn name(&self) -> &'static str {
        "create_data_array"
    }

    fn group(&self) -> &'static str {
        "Core"
    }

    fn human_label(&self) -> &'static str {
        "Create Data Array"
    }

    fn preflight(&mut self, registry: &mut ContainerRegistry, ctx: &mut FilterContext) {
        self.data_check(registry, ctx);
    }

    fn execute(&mut self, registry: &mut ContainerRegistry, ctx: &mut FilterContext) {
        self.data_check(registry, ctx);
        if ctx.has_errors() {
            return;
        }
        if let Ok(array) = registry.array_mut(&self.output) {
            array.fill(self.initial_value);
        }
        ctx.progress(100, "Array initialized");
    }

    fn clone_filter(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataContainer, Geometry, ImageGeometry};
    use crate::pipeline::context::Phase;
    use crate::pipeline::error::ErrorCode;
    use crate::pipeline::filters::testing::run;
    use crate::types::GroupKind;

    fn registry(tuples: usize) -> ContainerRegistry {
        let mut registry = ContainerRegistry::new();
        registry
            .insert(DataContainer::new(
                "Image",
                Geometry::Image(ImageGeometry::new([tuples, 1, 1])),
            ))
            .unwrap()
            .create_group("CellData", GroupKind::Cell, tuples)
            .unwrap();
        registry
    }

    fn path() -> DataPath {
        DataPath::new("Image", "CellData", "Phases")
    }

    #[test]
    fn test_execute_fills_array() {
        let mut filter = CreateDataArray::new(path(), ElementType::I32, 2).with_initial_value(7.0);
        let mut registry = registry(5);
        assert!(run(&mut filter, &mut registry, Phase::Execute).is_empty());

        let array = registry.array(&path()).unwrap();
        assert_eq!(array.tuple_count(), 5);
        assert_eq!(array.component_count(), 2);
        assert_eq!(array.as_slice::<i32>().unwrap(), &[7; 10]);
    }

    #[test]
    fn test_preflight_creates_placeholder() {
        let mut filter = CreateDataArray::new(path(), ElementType::F64, 3);
        let mut registry = registry(5).skeleton();
        assert!(run(&mut filter, &mut registry, Phase::Preflight).is_empty());

        let array = registry.array(&path()).unwrap();
        assert_eq!(array.tuple_count(), 0);
        assert_eq!(array.element_type(), ElementType::F64);
        assert_eq!(array.component_count(), 3);
    }

    #[test]
    fn test_missing_group() {
        let mut filter =
            CreateDataArray::new(DataPath::new("Image", "FeatureData", "X"), ElementType::F32, 1);
        let mut registry = registry(2);
        assert_eq!(
            run(&mut filter, &mut registry, Phase::Preflight),
            vec![ErrorCode::MissingData.code()]
        );
    }

    #[test]
    fn test_existing_array_is_duplicate() {
        let mut filter = CreateDataArray::new(path(), ElementType::F32, 1);
        let mut registry = registry(2);
        run(&mut filter, &mut registry, Phase::Execute);
        assert_eq!(
            run(&mut filter, &mut registry, Phase::Execute),
            vec![ErrorCode::DuplicateName.code()]
        );
    }

    #[test]
    fn test_component_count_is_bounded() {
        let mut registry = registry(4);
        for components in [0, MAX_COMPONENTS + 1, i64::MAX] {
            let mut filter = CreateDataArray::new(path(), ElementType::F64, 1);
            filter.components = components;
            assert_eq!(
                run(&mut filter, &mut registry, Phase::Execute),
                vec![ErrorCode::InvalidParameter.code()]
            );
        }
        assert!(registry.array(&path()).is_err());

        let mut filter = CreateDataArray::new(path(), ElementType::U8, MAX_COMPONENTS as usize);
        assert!(run(&mut filter, &mut registry, Phase::Execute).is_empty());
    }

    #[test]
    fn test_unrepresentable_initial_value() {
        let mut filter = CreateDataArray::new(path(), ElementType::U8, 1).with_initial_value(-1.0);
        let mut registry = registry(2);
        assert_eq!(
            run(&mut filter, &mut registry, Phase::Preflight),
            vec![ErrorCode::InvalidParameter.code()]
        );

        assert!(representable(ElementType::U8, 255.0));
        assert!(!representable(ElementType::I32, 1.5));
        assert!(!representable(ElementType::Bool, 2.0));
        assert!(representable(ElementType::F64, -1e300));
    }
}
