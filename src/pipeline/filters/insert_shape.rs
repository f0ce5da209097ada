//! Places one shape into a voxel grid.
//!
//! Voxels whose centers pass the shape's inside test are labelled with
//! `feature_id` in the cell-level feature id array. The feature group is grown
//! to hold `feature_id` and records the shape kind of each inserted feature.

use crate::data::{ContainerRegistry, DataPath, ImageGeometry};
use crate::pipeline::context::FilterContext;
use crate::pipeline::error::FilterError;
use crate::pipeline::filter::{
    require_complete, require_group, require_group_kind, require_image, require_name, Filter,
};
use crate::pipeline::filters::{SHAPE_TYPES, WARN_EMPTY_RESULT, WARN_NO_FORMULA};
use crate::pipeline::parameter::{Configurable, Parameter, ParameterKind, ParameterValue};
use crate::shape::{RadiusEstimate, ShapeKind, ShapeOps};
use crate::types::{ElementType, GroupKind};

const SHAPES: &[&str] = &["ellipsoid", "super_ellipsoid", "cube", "cylinder", "unknown"];

#[derive(Debug, Clone, PartialEq)]
pub struct InsertShape {
    pub feature_ids: DataPath,
    pub feature_group: String,
    pub shape: String,
    pub exponent: f64,
    pub center: [f64; 3],
    pub volume: f64,
    pub b_over_a: f64,
    pub c_over_a: f64,
    pub feature_id: i64,
}

impl Default for InsertShape {
    fn default() -> Self {
        Self {
            feature_ids: DataPath::new("ImageDataContainer", "CellData", "FeatureIds"),
            feature_group: "CellFeatureData".to_string(),
            shape: ShapeKind::Ellipsoid.as_str().to_string(),
            exponent: 2.0,
            center: [32.0; 3],
            volume: 1000.0,
            b_over_a: 1.0,
            c_over_a: 1.0,
            feature_id: 1,
        }
    }
}

impl Configurable for InsertShape {
    const PARAMETERS: &'static [Parameter<Self>] = &[
        Parameter {
            name: "feature_ids",
            label: "Feature Ids",
            units: "",
            kind: ParameterKind::DataPath,
            get: |f| ParameterValue::DataPath(f.feature_ids.clone()),
            set: |f, v| f.feature_ids = v.as_path().cloned().unwrap_or_default(),
        },
        Parameter {
            name: "feature_group",
            label: "Feature Group",
            units: "",
            kind: ParameterKind::Text,
            get: |f| ParameterValue::Text(f.feature_group.clone()),
            set: |f, v| f.feature_group = v.as_str().unwrap_or_default().to_string(),
        },
        Parameter {
            name: "shape",
            label: "Shape",
            units: "",
            kind: ParameterKind::Choice(SHAPES),
            get: |f| ParameterValue::Text(f.shape.clone()),
            set: |f, v| f.shape = v.as_str().unwrap_or_default().to_string(),
        },
        Parameter {
            name: "exponent",
            label: "Super-Ellipsoid Exponent",
            units: "",
            kind: ParameterKind::Float,
            get: |f| ParameterValue::Float(f.exponent),
            set: |f, v| f.exponent = v.as_float().unwrap_or_default(),
        },
        Parameter {
            name: "center",
            label: "Center",
            units: "µm",
            kind: ParameterKind::FloatVec3,
            get: |f| ParameterValue::FloatVec3(f.center),
            set: |f, v| f.center = v.as_float_vec3().unwrap_or_default(),
        },
        Parameter {
            name: "volume",
            label: "Volume",
            units: "µm³",
            kind: ParameterKind::Float,
            get: |f| ParameterValue::Float(f.volume),
            set: |f, v| f.volume = v.as_float().unwrap_or_default(),
        },
        Parameter {
            name: "b_over_a",
            label: "Aspect Ratio b/a",
            units: "",
            kind: ParameterKind::Float,
            get: |f| ParameterValue::Float(f.b_over_a),
            set: |f, v| f.b_over_a = v.as_float().unwrap_or_default(),
        },
        Parameter {
            name: "c_over_a",
            label: "Aspect Ratio c/a",
            units: "",
            kind: ParameterKind::Float,
            get: |f| ParameterValue::Float(f.c_over_a),
            set: |f, v| f.c_over_a = v.as_float().unwrap_or_default(),
        },
        Parameter {
            name: "feature_id",
            label: "Feature Id",
            units: "",
            kind: ParameterKind::Integer,
            get: |f| ParameterValue::Integer(f.feature_id),
            set: |f, v| f.feature_id = v.as_int().unwrap_or_default(),
        },
    ];
}

/// Index range of voxels along one axis whose centers may lie within
/// `extent` of `center`.
fn axis_range(center: f64, extent: f64, origin: f32, spacing: f32, dim: usize) -> (usize, usize) {
    let lo = ((center - extent - origin as f64) / spacing as f64 - 0.5).floor();
    let hi = ((center + extent - origin as f64) / spacing as f64 - 0.5).ceil() + 1.0;
    let clamp = |v: f64| v.max(0.0).min(dim as f64) as usize;
    (clamp(lo), clamp(hi))
}

impl InsertShape {
    pub fn new(kind: ShapeKind, center: [f64; 3], volume: f64) -> Self {
        Self {
            shape: kind.as_str().to_string(),
            center,
            volume,
            ..Self::default()
        }
    }

    pub fn with_feature_ids(mut self, path: DataPath) -> Self {
        self.feature_ids = path;
        self
    }

    pub fn with_feature_id(mut self, id: i64) -> Self {
        self.feature_id = id;
        self
    }

    pub fn with_aspect(mut self, b_over_a: f64, c_over_a: f64) -> Self {
        self.b_over_a = b_over_a;
        self.c_over_a = c_over_a;
        self
    }

    pub fn with_exponent(mut self, exponent: f64) -> Self {
        self.exponent = exponent;
        self
    }

    fn feature_group_path(&self) -> DataPath {
        DataPath::new(self.feature_ids.container.clone(), self.feature_group.clone(), SHAPE_TYPES)
    }

    /// Validate parameters and declare outputs. Returns the shape, its
    /// radius and the target grid when everything checks out.
    fn data_check(
        &self,
        registry: &mut ContainerRegistry,
        ctx: &mut FilterContext,
    ) -> Option<(ShapeOps, RadiusEstimate, ImageGeometry)> {
        ctx.check(require_complete("feature_ids", &self.feature_ids));
        ctx.check(require_name("feature_group", &self.feature_group));
        if self.feature_id < 1 || self.feature_id > i32::MAX as i64 {
            ctx.report(FilterError::invalid(
                "feature_id",
                "must be a positive 32-bit integer",
            ));
        }
        if self.center.iter().any(|c| !c.is_finite()) {
            ctx.report(FilterError::invalid("center", "must be finite"));
        }
        let kind = ctx.check(
            self.shape
                .parse::<ShapeKind>()
                .map_err(|reason| FilterError::invalid("shape", reason)),
        )?;
        let ops = ShapeOps::for_kind(kind, self.exponent);
        let estimate = ctx.check(
            ops.radius_from_volume_and_aspect(self.volume, self.b_over_a, self.c_over_a)
                .map_err(FilterError::from),
        )?;
        if ctx.has_errors() {
            return None;
        }

        let preflight = ctx.is_preflight();
        let image = ctx
            .check(require_image(registry, &self.feature_ids.container, preflight))
            .copied()?;
        if image
            .cell_count()
            .map_or(true, |cells| self.feature_id as usize > cells)
        {
            ctx.report(FilterError::invalid(
                "feature_id",
                "must not exceed the number of voxels in the grid",
            ));
            return None;
        }
        let cells = ctx.check(require_group(registry, &self.feature_ids))?;
        ctx.check(require_group_kind(cells, GroupKind::Cell, "feature_ids"))?;
        if let Ok(ids) = cells.get(&self.feature_ids.array) {
            ctx.check(ids.check_layout(ElementType::I32, 1).map_err(FilterError::from))?;
        }

        let features_path = self.feature_group_path();
        if let Ok(features) = registry.group(&features_path) {
            ctx.check(require_group_kind(features, GroupKind::Feature, "feature_group"))?;
            if let Ok(types) = features.get(SHAPE_TYPES) {
                ctx.check(types.check_layout(ElementType::U32, 1).map_err(FilterError::from))?;
            }
        }

        let container = registry.get_mut(&self.feature_ids.container).ok()?;
        if let Ok(cells) = container.group_mut(&self.feature_ids.group) {
            if !cells.contains(&self.feature_ids.array) {
                ctx.check(
                    cells
                        .create_array(&self.feature_ids.array, ElementType::I32, 1)
                        .map(|_| ())
                        .map_err(FilterError::from),
                )?;
            }
        }
        let features = container.ensure_group(&self.feature_group, GroupKind::Feature, 0);
        if !features.contains(SHAPE_TYPES) {
            ctx.check(
                features
                    .create_array(SHAPE_TYPES, ElementType::U32, 1)
                    .map(|_| ())
                    .map_err(FilterError::from),
            )?;
        }

        if !estimate.computed {
            ctx.warning(
                WARN_NO_FORMULA,
                format!("Shape '{}' has no volume formula; nothing will be inserted", kind),
            );
        }
        Some((ops, estimate, image))
    }

    /// Label voxels inside the shape. Returns the number labelled, or `None`
    /// when cancelled.
    fn label_voxels(
        &self,
        image: &ImageGeometry,
        ops: ShapeOps,
        radius: f64,
        ids: &mut [i32],
        ctx: &mut FilterContext,
    ) -> Option<usize> {
        let semi_axes = [radius, radius * self.b_over_a, radius * self.c_over_a];
        let extent = semi_axes.iter().copied().fold(0.0, f64::max);
        let ranges: Vec<(usize, usize)> = (0..3)
            .map(|axis| {
                axis_range(
                    self.center[axis],
                    extent,
                    image.origin[axis],
                    image.spacing[axis],
                    image.dimensions[axis],
                )
            })
            .collect();

        let id = self.feature_id as i32;
        let (z0, z1) = ranges[2];
        let mut labelled = 0;
        for z in z0..z1 {
            if ctx.is_cancelled() {
                return None;
            }
            for y in ranges[1].0..ranges[1].1 {
                for x in ranges[0].0..ranges[0].1 {
                    let c = image.cell_center(x, y, z);
                    let a1 = (c[0] as f64 - self.center[0]) / semi_axes[0];
                    let a2 = (c[1] as f64 - self.center[1]) / semi_axes[1];
                    let a3 = (c[2] as f64 - self.center[2]) / semi_axes[2];
                    if !ops.contains(a1, a2, a3) {
                        continue;
                    }
                    if let Some(slot) = ids.get_mut(image.index(x, y, z)) {
                        *slot = id;
                        labelled += 1;
                    }
                }
            }
            let done = (z + 1 - z0) * 100 / (z1 - z0);
            ctx.progress(done as u8, "Inserting shape");
        }
        Some(labelled)
    }
}

impl Filter for InsertShape {
    fn name(&self) -> &'static str {
        "insert_shape"
    }

    fn group(&self) -> &'static str {
        "Synthetic"
    }

    fn human_label(&self) -> &'static str {
        "Insert Shape"
    }

    fn preflight(&mut self, registry: &mut ContainerRegistry, ctx: &mut FilterContext) {
        self.data_check(registry, ctx);
    }

    fn execute(&mut self, registry: &mut ContainerRegistry, ctx: &mut FilterContext) {
        let Some((ops, estimate, image)) = self.data_check(registry, ctx) else {
            return;
        };
        if !estimate.computed {
            return;
        }
        let Some(ids) = registry
            .array_mut(&self.feature_ids)
            .ok()
            .and_then(|a| a.as_mut_slice::<i32>().ok())
        else {
            return;
        };

        let Some(labelled) = self.label_voxels(&image, ops, estimate.radius, ids, ctx) else {
            ctx.report(FilterError::Cancelled);
            return;
        };

        let shape_index = ShapeKind::all()
            .iter()
            .position(|k| *k == ops.kind())
            .unwrap_or_default();
        if let Ok(features) = registry.group_mut(&self.feature_group_path()) {
            let needed = self.feature_id as usize + 1;
            if features.tuple_count() < needed {
                if let Err(e) = features.resize(needed) {
                    ctx.report(e.into());
                    return;
                }
            }
            if let Ok(types) = features.get_mut(SHAPE_TYPES) {
                types.set_value(self.feature_id as usize, shape_index as f64);
            }
        }

        tracing::debug!(
            shape = %ops.kind(),
            radius = estimate.radius,
            labelled,
            feature_id = self.feature_id,
            "Shape inserted"
        );
        if labelled == 0 {
            ctx.warning(
                WARN_EMPTY_RESULT,
                "Shape does not cover any voxel center; no voxels labelled",
            );
        }
    }

    fn clone_filter(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}
