//! Built-in filters.

pub mod create_data_array;
pub mod create_image_geometry;
pub mod export_array;
pub mod find_feature_sizes;
pub mod import_array;
pub mod insert_shape;
pub mod rename_container;
pub mod threshold_array;

pub use create_data_array::CreateDataArray;
pub use create_image_geometry::CreateImageGeometry;
pub use export_array::ExportArray;
pub use find_feature_sizes::FindFeatureSizes;
pub use import_array::ImportArray;
pub use insert_shape::InsertShape;
pub use rename_container::RenameContainer;
pub use threshold_array::ThresholdArray;

/// Per-feature shape kind written by `InsertShape`.
pub const SHAPE_TYPES: &str = "ShapeTypes";

/// Warning: the selected shape has no volume formula.
pub const WARN_NO_FORMULA: i32 = 2001;

/// Warning: a filter ran but produced nothing.
pub const WARN_EMPTY_RESULT: i32 = 2002;
