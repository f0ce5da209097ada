//! Per-feature voxel counts, volumes and equivalent sphere diameters.
//!
//! The number of features is only known once the feature ids are read, so
//! preflight declares the outputs in a zero-tuple feature group and execute
//! grows the group to `max(feature id) + 1`.

use crate::data::{ContainerRegistry, DataPath, ImageGeometry};
use crate::pipeline::context::FilterContext;
use crate::pipeline::error::FilterError;
use crate::pipeline::filter::{
    require_array, require_complete, require_group_kind, require_image, require_name, Filter,
};
use crate::pipeline::filters::WARN_EMPTY_RESULT;
use crate::pipeline::parameter::{Configurable, Parameter, ParameterKind, ParameterValue};
use crate::shape::equivalent_sphere_diameter;
use crate::types::{ElementType, GroupKind};

#[derive(Debug, Clone, PartialEq)]
pub struct FindFeatureSizes {
    pub feature_ids: DataPath,
    pub feature_group: String,
    pub num_cells: String,
    pub volumes: String,
    pub diameters: String,
}

impl Default for FindFeatureSizes {
    fn default() -> Self {
        Self {
            feature_ids: DataPath::new("ImageDataContainer", "CellData", "FeatureIds"),
            feature_group: "CellFeatureData".to_string(),
            num_cells: "NumCells".to_string(),
            volumes: "Volumes".to_string(),
            diameters: "EquivalentDiameters".to_string(),
        }
    }
}

impl Configurable for FindFeatureSizes {
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
            name: "num_cells",
            label: "Number of Cells",
            units: "",
            kind: ParameterKind::Text,
            get: |f| ParameterValue::Text(f.num_cells.clone()),
            set: |f, v| f.num_cells = v.as_str().unwrap_or_default().to_string(),
        },
        Parameter {
            name: "volumes",
            label: "Volumes",
            units: "µm³",
            kind: ParameterKind::Text,
            get: |f| ParameterValue::Text(f.volumes.clone()),
            set: |f, v| f.volumes = v.as_str().unwrap_or_default().to_string(),
        },
        Parameter {
            name: "diameters",
            label: "Equivalent Diameters",
            units: "µm",
            kind: ParameterKind::Text,
            get: |f| ParameterValue::Text(f.diameters.clone()),
            set: |f, v| f.diameters = v.as_str().unwrap_or_default().to_string(),
        },
    ];
}

impl FindFeatureSizes {
    fn features_path(&self) -> DataPath {
        DataPath::new(
            self.feature_ids.container.clone(),
            self.feature_group.clone(),
            "",
        )
    }

    /// Validate parameters and inputs and declare the outputs. Returns the
    /// grid the ids live on.
    fn data_check(
        &self,
        registry: &mut ContainerRegistry,
        ctx: &mut FilterContext,
    ) -> Option<ImageGeometry> {
        ctx.check(require_complete("feature_ids", &self.feature_ids));
        ctx.check(require_name("feature_group", &self.feature_group));
        ctx.check(require_name("num_cells", &self.num_cells));
        ctx.check(require_name("volumes", &self.volumes));
        ctx.check(require_name("diameters", &self.diameters));
        let outputs = [&self.num_cells, &self.volumes, &self.diameters];
        if outputs[0] == outputs[1] || outputs[1] == outputs[2] || outputs[0] == outputs[2] {
            ctx.report(FilterError::invalid(
                "num_cells",
                "output array names must be distinct",
            ));
        }
        if ctx.has_errors() {
            return None;
        }

        let preflight = ctx.is_preflight();
        let image = ctx
            .check(require_image(registry, &self.feature_ids.container, preflight))
            .copied()?;
        ctx.check(require_array(registry, &self.feature_ids, ElementType::I32, 1))?;
        if let Ok(features) = registry.group(&self.features_path()) {
            ctx.check(require_group_kind(features, GroupKind::Feature, "feature_group"))?;
        }

        let container = registry.get_mut(&self.feature_ids.container).ok()?;
        let features = container.ensure_group(&self.feature_group, GroupKind::Feature, 0);
        for (name, element_type) in [
            (&self.num_cells, ElementType::I32),
            (&self.volumes, ElementType::F32),
            (&self.diameters, ElementType::F32),
        ] {
            if let Err(e) = features.create_array(name, element_type, 1) {
                ctx.report(e.into());
                return None;
            }
        }
        Some(image)
    }
}

impl Filter for FindFeatureSizes {
    fn name(&self) -> &'static str {
        "find_feature_sizes"
    }

    fn group(&self) -> &'static str {
        "Statistics"
    }

    fn human_label(&self) -> &'static str {
        "Find Feature Sizes"
    }

    fn preflight(&mut self, registry: &mut ContainerRegistry, ctx: &mut FilterContext) {
        self.data_check(registry, ctx);
    }

    fn execute(&mut self, registry: &mut ContainerRegistry, ctx: &mut FilterContext) {
        let Some(image) = self.data_check(registry, ctx) else {
            return;
        };
        let Some(ids) = registry
            .array(&self.feature_ids)
            .ok()
            .and_then(|a| a.as_slice::<i32>().ok())
        else {
            return;
        };

        if let Some(position) = ids.iter().position(|&id| id < 0) {
            ctx.report(FilterError::invalid(
                "feature_ids",
                format!("negative feature id {} at cell {}", ids[position], position),
            ));
            return;
        }

        let max_id = ids.iter().copied().max().unwrap_or(0) as usize;
        if max_id > ids.len() {
            ctx.report(FilterError::invalid(
                "feature_ids",
                format!(
                    "feature id {} exceeds the number of cells ({})",
                    max_id,
                    ids.len()
                ),
            ));
            return;
        }
        let feature_count = max_id + 1;
        let mut counts = vec![0i32; feature_count];
        for &id in ids {
            counts[id as usize] += 1;
        }
        ctx.progress(50, "Cells counted");

        let Ok(features) = registry.group_mut(&self.features_path()) else {
            return;
        };
        if features.tuple_count() < feature_count {
            if let Err(e) = features.resize(feature_count) {
                ctx.report(e.into());
                return;
            }
        }
        let cell_volume = image.cell_volume() as f64;
        let mut nonempty = 0;
        for (feature, &count) in counts.iter().enumerate().skip(1) {
            if count == 0 {
                continue;
            }
            nonempty += 1;
            let volume = count as f64 * cell_volume;
            if let Ok(a) = features.get_mut(&self.num_cells) {
                a.set_value(feature, count as f64);
            }
            if let Ok(a) = features.get_mut(&self.volumes) {
                a.set_value(feature, volume);
            }
            if let Ok(a) = features.get_mut(&self.diameters) {
                a.set_value(feature, equivalent_sphere_diameter(volume));
            }
        }

        tracing::debug!(features = feature_count - 1, nonempty, "Feature sizes computed");
        if nonempty == 0 {
            ctx.warning(WARN_EMPTY_RESULT, "No cell belongs to a feature");
        }
        ctx.progress(100, "Feature sizes computed");
    }

    fn clone_filter(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}
