//! Built-in filter kinds for dynamic creation.
//!
//! Pipeline files and the CLI refer to filters by kind; [`FilterKind::create`]
//! turns a kind back into a filter with default parameters.

use crate::pipeline::filter::Filter;
use crate::pipeline::filters::{
    CreateDataArray, CreateImageGeometry, ExportArray, FindFeatureSizes, ImportArray, InsertShape,
    RenameContainer, ThresholdArray,
};
use serde::{Deserialize, Serialize};

/// Filters that can be instantiated by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    // Core
    CreateImageGeometry,
    CreateDataArray,
    RenameContainer,

    // Processing
    ThresholdArray,

    // Synthetic
    InsertShape,

    // Statistics
    FindFeatureSizes,

    // IO
    ImportArray,
    ExportArray,
}

impl FilterKind {
    /// Stable identifier; matches `Filter::name` of the created filter.
    pub fn id(&self) -> &'static str {
        match self {
            FilterKind::CreateImageGeometry => "create_image_geometry",
            FilterKind::CreateDataArray => "create_data_array",
            FilterKind::RenameContainer => "rename_container",
            FilterKind::ThresholdArray => "threshold_array",
            FilterKind::InsertShape => "insert_shape",
            FilterKind::FindFeatureSizes => "find_feature_sizes",
            FilterKind::ImportArray => "import_array",
            FilterKind::ExportArray => "export_array",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FilterKind::CreateImageGeometry => "Create Image Geometry",
            FilterKind::CreateDataArray => "Create Data Array",
            FilterKind::RenameContainer => "Rename Container",
            FilterKind::ThresholdArray => "Threshold Array",
            FilterKind::InsertShape => "Insert Shape",
            FilterKind::FindFeatureSizes => "Find Feature Sizes",
            FilterKind::ImportArray => "Import Array",
            FilterKind::ExportArray => "Export Array",
        }
    }

    pub fn all() -> &'static [FilterKind] {
        &[
            FilterKind::CreateImageGeometry,
            FilterKind::CreateDataArray,
            FilterKind::RenameContainer,
            FilterKind::ThresholdArray,
            FilterKind::InsertShape,
            FilterKind::FindFeatureSizes,
            FilterKind::ImportArray,
            FilterKind::ExportArray,
        ]
    }

    pub fn from_id(id: &str) -> Option<FilterKind> {
        FilterKind::all().iter().copied().find(|k| k.id() == id)
    }

    pub fn description(&self) -> &'static str {
        match self {
            FilterKind::CreateImageGeometry =>
                "Creates a container with a voxel grid geometry.\n\
                 The cell group is sized to the number of voxels.",

            FilterKind::CreateDataArray =>
                "Creates a typed array in an existing group.\n\
                 Every element starts at the initial value.",

            FilterKind::RenameContainer => "Renames a container in the registry.",

            FilterKind::ThresholdArray =>
                "Compares a scalar array against a value.\n\
                 Writes a boolean mask next to the input.",

            FilterKind::InsertShape =>
                "Places an ellipsoid, super-ellipsoid, cube or cylinder\n\
                 of a given volume into a voxel grid and labels its voxels.",

            FilterKind::FindFeatureSizes =>
                "Counts the voxels of every feature.\n\
                 Computes volumes and equivalent sphere diameters.",

            FilterKind::ImportArray => "Reads a stored array into a group.",

            FilterKind::ExportArray => "Writes an array to the array store.",
        }
    }

    /// New filter of this kind with default parameters.
    pub fn create(&self) -> Box<dyn Filter> {
        match self {
            FilterKind::CreateImageGeometry => Box::new(CreateImageGeometry::default()),
            FilterKind::CreateDataArray => Box::new(CreateDataArray::default()),
            FilterKind::RenameContainer => Box::new(RenameContainer::default()),
            FilterKind::ThresholdArray => Box::new(ThresholdArray::default()),
            FilterKind::InsertShape => Box::new(InsertShape::default()),
            FilterKind::FindFeatureSizes => Box::new(FindFeatureSizes::default()),
            FilterKind::ImportArray => Box::new(ImportArray::default()),
            FilterKind::ExportArray => Box::new(ExportArray::default()),
        }
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
