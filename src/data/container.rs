//! Containers: a geometry descriptor plus named attribute groups.

use crate::data::error::{DataError, DataResult};
use crate::data::group::AttributeGroup;
use crate::types::{GeometryKind, GroupKind};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// A regular voxel grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageGeometry {
    /// Voxels along x, y, z
    pub dimensions: [usize; 3],
    /// Voxel edge lengths along x, y, z
    pub spacing: [f32; 3],
    /// Position of the grid's minimum corner
    pub origin: [f32; 3],
}

impl ImageGeometry {
    pub fn new(dimensions: [usize; 3]) -> Self {
        Self {
            dimensions,
            spacing: [1.0; 3],
            origin: [0.0; 3],
        }
    }

    pub fn with_spacing(mut self, spacing: [f32; 3]) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_origin(mut self, origin: [f32; 3]) -> Self {
        self.origin = origin;
        self
    }

    /// Number of voxels, or `None` when the product overflows.
    pub fn cell_count(&self) -> Option<usize> {
        self.dimensions
            .iter()
            .try_fold(1usize, |count, &d| count.checked_mul(d))
    }

    /// Volume of one voxel.
    pub fn cell_volume(&self) -> f32 {
        self.spacing.iter().product()
    }

    /// Flat cell index of voxel (x, y, z), x fastest.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.dimensions[1] + y) * self.dimensions[0] + x
    }

    /// Center of voxel (x, y, z) in physical coordinates.
    #[inline]
    pub fn cell_center(&self, x: usize, y: usize, z: usize) -> [f32; 3] {
        [
            self.origin[0] + (x as f32 + 0.5) * self.spacing[0],
            self.origin[1] + (y as f32 + 0.5) * self.spacing[1],
            self.origin[2] + (z as f32 + 0.5) * self.spacing[2],
        ]
    }
}

/// Geometry descriptor of a container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Geometry {
    Image(ImageGeometry),
    Surface {
        vertices: usize,
        edges: usize,
        faces: usize,
    },
    Edge {
        vertices: usize,
        edges: usize,
    },
    Vertex {
        vertices: usize,
    },
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Image(_) => GeometryKind::Image,
            Geometry::Surface { .. } => GeometryKind::Surface,
            Geometry::Edge { .. } => GeometryKind::Edge,
            Geometry::Vertex { .. } => GeometryKind::Vertex,
        }
    }

    pub fn as_image(&self) -> Option<&ImageGeometry> {
        match self {
            Geometry::Image(image) => Some(image),
            _ => None,
        }
    }

    /// Number of geometric elements a group of `kind` must have tuples for,
    /// or `None` when the geometry places no constraint on that kind.
    pub fn element_count(&self, kind: GroupKind) -> DataResult<Option<usize>> {
        Ok(match (self, kind) {
            (Geometry::Image(image), GroupKind::Cell) => Some(image.cell_count().ok_or(
                DataError::GridTooLarge {
                    dimensions: image.dimensions,
                },
            )?),
            (Geometry::Surface { vertices, .. }, GroupKind::Vertex)
            | (Geometry::Edge { vertices, .. }, GroupKind::Vertex)
            | (Geometry::Vertex { vertices }, GroupKind::Vertex) => Some(*vertices),
            (Geometry::Surface { edges, .. }, GroupKind::Edge)
            | (Geometry::Edge { edges, .. }, GroupKind::Edge) => Some(*edges),
            (Geometry::Surface { faces, .. }, GroupKind::Face) => Some(*faces),
            _ => None,
        })
    }
}

/// A geometry plus the attribute groups defined on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataContainer {
    name: String,
    geometry: Geometry,
    groups: BTreeMap<String, AttributeGroup>,
}

impl DataContainer {
    pub fn new(name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            name: name.into(),
            geometry,
            groups: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry = geometry;
    }

    /// Add a new group. Fails if the name is taken, or if the geometry
    /// fixes the tuple count for `kind` and `tuples` is neither that count
    /// nor zero.
    pub fn create_group(
        &mut self,
        name: &str,
        kind: GroupKind,
        tuples: usize,
    ) -> DataResult<&mut AttributeGroup> {
        if let Some(expected) = self.geometry.element_count(kind)? {
            if tuples != expected && tuples != 0 {
                return Err(DataError::GeometryMismatch {
                    container: self.name.clone(),
                    kind: kind.display_name(),
                    expected,
                    actual: tuples,
                });
            }
        }
        match self.groups.entry(name.to_string()) {
            Entry::Occupied(_) => Err(DataError::duplicate("Attribute group", name)),
            Entry::Vacant(slot) => Ok(slot.insert(AttributeGroup::new(name, kind, tuples))),
        }
    }

    /// Return the group `name`, creating it with `tuples` tuples if absent.
    pub fn ensure_group(&mut self, name: &str, kind: GroupKind, tuples: usize) -> &mut AttributeGroup {
        self.groups
            .entry(name.to_string())
            .or_insert_with(|| AttributeGroup::new(name, kind, tuples))
    }

    pub fn group(&self, name: &str) -> DataResult<&AttributeGroup> {
        self.groups
            .get(name)
            .ok_or_else(|| DataError::not_found("Attribute group", name))
    }

    pub fn group_mut(&mut self, name: &str) -> DataResult<&mut AttributeGroup> {
        self.groups
            .get_mut(name)
            .ok_or_else(|| DataError::not_found("Attribute group", name))
    }

    pub fn contains_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn remove_group(&mut self, name: &str) -> DataResult<AttributeGroup> {
        self.groups
            .remove(name)
            .ok_or_else(|| DataError::not_found("Attribute group", name))
    }

    pub fn rename_group(&mut self, old: &str, new: &str) -> DataResult<()> {
        if !self.groups.contains_key(old) {
            return Err(DataError::not_found("Attribute group", old));
        }
        if old == new {
            return Ok(());
        }
        if self.groups.contains_key(new) {
            return Err(DataError::duplicate("Attribute group", new));
        }
        if let Some(mut group) = self.groups.remove(old) {
            group.set_name(new);
            self.groups.insert(new.to_string(), group);
        }
        Ok(())
    }

    pub fn groups(&self) -> impl Iterator<Item = &AttributeGroup> {
        self.groups.values()
    }

    /// Check every geometry-bound group against the geometry's element
    /// counts. Zero-tuple groups pass when `allow_placeholders` is set.
    pub fn validate(&self, allow_placeholders: bool) -> DataResult<()> {
        for group in self.groups.values() {
            let Some(expected) = self.geometry.element_count(group.kind())? else {
                continue;
            };
            let actual = group.tuple_count();
            if actual == expected || (allow_placeholders && actual == 0) {
                continue;
            }
            return Err(DataError::GeometryMismatch {
                container: self.name.clone(),
                kind: group.kind().display_name(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Same geometry and group/array structure, every group at zero tuples.
    pub fn skeleton(&self) -> Self {
        Self {
            name: self.name.clone(),
            geometry: self.geometry.clone(),
            groups: self
                .groups
                .iter()
                .map(|(name, g)| (name.clone(), g.skeleton()))
                .collect(),
        }
    }
}
