//! Test data builders for registries and pipelines

use gridflow::data::{ContainerRegistry, DataArray, DataContainer, DataPath, Geometry, ImageGeometry};
use gridflow::pipeline::filters::{CreateImageGeometry, InsertShape};
use gridflow::pipeline::Pipeline;
use gridflow::shape::ShapeKind;
use gridflow::types::GroupKind;

pub const CONTAINER: &str = "ImageDataContainer";
pub const CELLS: &str = "CellData";

pub fn feature_ids() -> DataPath {
    DataPath::new(CONTAINER, CELLS, "FeatureIds")
}

/// Builder for registries holding one voxel container
pub struct RegistryBuilder {
    dimensions: [usize; 3],
    arrays: Vec<DataArray>,
}

impl RegistryBuilder {
    pub fn new(dimensions: [usize; 3]) -> Self {
        Self {
            dimensions,
            arrays: Vec::new(),
        }
    }

    /// Add a cell array; its length must match the voxel count.
    pub fn cell_array(mut self, array: DataArray) -> Self {
        self.arrays.push(array);
        self
    }

    pub fn build(self) -> ContainerRegistry {
        let [x, y, z] = self.dimensions;
        let mut registry = ContainerRegistry::new();
        let group = registry
            .insert(DataContainer::new(
                CONTAINER,
                Geometry::Image(ImageGeometry::new(self.dimensions)),
            ))
            .unwrap()
            .create_group(CELLS, GroupKind::Cell, x * y * z)
            .unwrap();
        for array in self.arrays {
            group.insert(array).unwrap();
        }
        registry
    }
}

/// Pipeline that creates a `size`³ grid and inserts one shape at `center`.
pub fn grain_pipeline(size: usize, kind: ShapeKind, center: f64, volume: f64) -> Pipeline {
    let mut pipeline = Pipeline::new("grain");
    pipeline.push(CreateImageGeometry::new(CONTAINER, [size; 3]));
    pipeline.push(InsertShape::new(kind, [center; 3], volume).with_feature_ids(feature_ids()));
    pipeline
}
