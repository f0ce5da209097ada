//! Adds a container with an image geometry and an empty cell group.

use crate::data::{ContainerRegistry, DataContainer, Geometry, ImageGeometry};
use crate::pipeline::context::FilterContext;
use crate::pipeline::error::FilterError;
use crate::pipeline::filter::{require_name, Filter};
use crate::pipeline::parameter::{Configurable, Parameter, ParameterKind, ParameterValue};
use crate::types::GroupKind;

#[derive(Debug, Clone, PartialEq)]
pub struct CreateImageGeometry {
    pub container: String,
    pub cell_group: String,
    pub dimensions: [i64; 3],
    pub spacing: [f64; 3],
    pub origin: [f64; 3],
}

impl Default for CreateImageGeometry {
    fn default() -> Self {
        Self {
            container: "ImageDataContainer".to_string(),
            cell_group: "CellData".to_string(),
            dimensions: [64, 64, 64],
            spacing: [1.0; 3],
            origin: [0.0; 3],
        }
    }
}

impl Configurable for CreateImageGeometry {
    const PARAMETERS: &'static [Parameter<Self>] = &[
        Parameter {
            name: "container",
            label: "Container Name",
            units: "",
            kind: ParameterKind::Text,
            get: |f| ParameterValue::Text(f.container.clone()),
            set: |f, v| f.container = v.as_str().unwrap_or_default().to_string(),
        },
        Parameter {
            name: "cell_group",
            label: "Cell Group Name",
            units: "",
            kind: ParameterKind::Text,
            get: |f| ParameterValue::Text(f.cell_group.clone()),
            set: |f, v| f.cell_group = v.as_str().unwrap_or_default().to_string(),
        },
        Parameter {
            name: "dimensions",
            label: "Dimensions",
            units: "voxels",
            kind: ParameterKind::IntVec3,
            get: |f| ParameterValue::IntVec3(f.dimensions),
            set: |f, v| f.dimensions = v.as_int_vec3().unwrap_or_default(),
        },
        Parameter {
            name: "spacing",
            label: "Spacing",
            units: "µm",
            kind: ParameterKind::FloatVec3,
            get: |f| ParameterValue::FloatVec3(f.spacing),
            set: |f, v| f.spacing = v.as_float_vec3().unwrap_or_default(),
        },
        Parameter {
            name: "origin",
            label: "Origin",
            units: "µm",
            kind: ParameterKind::FloatVec3,
            get: |f| ParameterValue::FloatVec3(f.origin),
            set: |f, v| f.origin = v.as_float_vec3().unwrap_or_default(),
        },
    ];
}

impl CreateImageGeometry {
    pub fn new(container: impl Into<String>, dimensions: [usize; 3]) -> Self {
        Self {
            container: container.into(),
            dimensions: dimensions.map(|d| d as i64),
            ..Self::default()
        }
    }

    fn geometry(&self) -> Result<ImageGeometry, FilterError> {
        if self.dimensions.iter().any(|&d| d <= 0) {
            return Err(FilterError::invalid(
                "dimensions",
                "every dimension must be at least 1",
            ));
        }
        if self.spacing.iter().any(|&s| !(s > 0.0)) {
            return Err(FilterError::invalid("spacing", "spacing must be positive"));
        }
        if self.origin.iter().any(|o| !o.is_finite()) {
            return Err(FilterError::invalid("origin", "origin must be finite"));
        }
        let geometry = ImageGeometry::new(self.dimensions.map(|d| d as usize))
            .with_spacing(self.spacing.map(|s| s as f32))
            .with_origin(self.origin.map(|o| o as f32));
        if geometry.cell_count().is_none() {
            return Err(FilterError::invalid(
                "dimensions",
                format!("{:?} voxels overflow the addressable cell count", self.dimensions),
            ));
        }
        Ok(geometry)
    }

    /// Shared by both phases; the cell group gets `cell_count` tuples only
    /// when executing.
    fn data_check(&self, registry: &mut ContainerRegistry, ctx: &mut FilterContext) {
        ctx.check(require_name("container", &self.container));
        ctx.check(require_name("cell_group", &self.cell_group));
        let geometry = ctx.check(self.geometry());
        if ctx.has_errors() {
            return;
        }
        let Some(geometry) = geometry else {
            return;
        };

        let tuples = if ctx.is_preflight() {
            0
        } else {
            geometry.cell_count().unwrap_or_default()
        };
        let mut container = DataContainer::new(&self.container, Geometry::Image(geometry));
        if let Err(e) = container.create_group(&self.cell_group, GroupKind::Cell, tuples) {
            ctx.report(e.into());
            return;
        }
        if let Err(e) = registry.insert(container) {
            ctx.report(e.into());
        }
    }
}

impl Filter for CreateImageGeometry {
    fn name(&self) -> &'static str {
        "create_image_geometry"
    }

    fn group(&self) -> &'static str {
        "Core"
    }

    fn human_label(&self) -> &'static str {
        "Create Image Geometry"
    }

    fn preflight(&mut self, registry: &mut ContainerRegistry, ctx: &mut FilterContext) {
        self.data_check(registry, ctx);
    }

    fn execute(&mut self, registry: &mut ContainerRegistry, ctx: &mut FilterContext) {
        self.data_check(registry, ctx);
        if !ctx.has_errors() {
            ctx.progress(100, "Image geometry created");
        }
    }

    fn clone_filter(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}
