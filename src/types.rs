//! Core tag types for gridflow
//!
//! This module contains the closed enumerations shared by the data model,
//! the filters and the pipeline file format.
//!
//! # Main Types
//!
//! - [`ElementType`] - Primitive type stored by a [`DataArray`](crate::data::DataArray)
//! - [`GroupKind`] - What one tuple of an attribute group represents
//! - [`GeometryKind`] - The geometry a container describes
//!
//! # Geometry capabilities
//!
//! Mesh geometries form a capability ladder: a surface mesh has edges and
//! vertices, an edge mesh has vertices. [`GeometryKind::provides`] answers
//! whether a container of one kind can stand in where another is required.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Primitive type stored in an array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ElementType {
    /// Boolean flag
    Bool,
    /// 8-bit signed integer
    I8,
    /// 8-bit unsigned integer
    U8,
    /// 16-bit signed integer
    I16,
    /// 16-bit unsigned integer
    U16,
    /// 32-bit signed integer
    I32,
    /// 32-bit unsigned integer
    U32,
    /// 64-bit signed integer
    I64,
    /// 64-bit unsigned integer
    U64,
    /// 32-bit floating point
    #[default]
    F32,
    /// 64-bit floating point
    F64,
}

impl ElementType {
    /// Returns the size in bytes of one element
    pub fn size_bytes(&self) -> usize {
        match self {
            ElementType::Bool | ElementType::I8 | ElementType::U8 => 1,
            ElementType::I16 | ElementType::U16 => 2,
            ElementType::I32 | ElementType::U32 | ElementType::F32 => 4,
            ElementType::I64 | ElementType::U64 | ElementType::F64 => 8,
        }
    }

    /// Returns true for the two floating point types
    pub fn is_float(&self) -> bool {
        matches!(self, ElementType::F32 | ElementType::F64)
    }

    /// Returns true for signed and unsigned integer types
    pub fn is_integer(&self) -> bool {
        !self.is_float() && *self != ElementType::Bool
    }

    /// Get all element types
    pub fn all() -> &'static [ElementType] {
        &[
            ElementType::Bool,
            ElementType::I8,
            ElementType::U8,
            ElementType::I16,
            ElementType::U16,
            ElementType::I32,
            ElementType::U32,
            ElementType::I64,
            ElementType::U64,
            ElementType::F32,
            ElementType::F64,
        ]
    }

    /// Short lowercase name, also accepted by [`FromStr`]
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Bool => "bool",
            ElementType::I8 => "i8",
            ElementType::U8 => "u8",
            ElementType::I16 => "i16",
            ElementType::U16 => "u16",
            ElementType::I32 => "i32",
            ElementType::U32 => "u32",
            ElementType::I64 => "i64",
            ElementType::U64 => "u64",
            ElementType::F32 => "f32",
            ElementType::F64 => "f64",
        }
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementType::all()
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown element type '{}'", s))
    }
}

/// What one tuple of an attribute group stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKind {
    /// One tuple per voxel / cell
    Cell,
    /// One tuple per feature (a connected region of cells)
    Feature,
    /// One tuple per ensemble (a class of features)
    Ensemble,
    /// One tuple per mesh vertex
    Vertex,
    /// One tuple per mesh edge
    Edge,
    /// One tuple per mesh face
    Face,
}

impl GroupKind {
    /// Get display name for this group kind
    pub fn display_name(&self) -> &'static str {
        match self {
            GroupKind::Cell => "Cell",
            GroupKind::Feature => "Feature",
            GroupKind::Ensemble => "Ensemble",
            GroupKind::Vertex => "Vertex",
            GroupKind::Edge => "Edge",
            GroupKind::Face => "Face",
        }
    }
}

impl std::fmt::Display for GroupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The geometry a container describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    /// Regular voxel grid
    Image,
    /// Triangle surface mesh
    Surface,
    /// Line segment mesh
    Edge,
    /// Unconnected point set
    Vertex,
}

impl GeometryKind {
    /// Whether a container of this kind satisfies a requirement for `required`.
    ///
    /// Surface ⊇ Edge ⊇ Vertex. Image grids only satisfy Image.
    pub fn provides(&self, required: GeometryKind) -> bool {
        match (self, required) {
            (a, b) if *a == b => true,
            (GeometryKind::Surface, GeometryKind::Edge | GeometryKind::Vertex) => true,
            (GeometryKind::Edge, GeometryKind::Vertex) => true,
            _ => false,
        }
    }

    /// Get display name for this geometry kind
    pub fn display_name(&self) -> &'static str {
        match self {
            GeometryKind::Image => "Image",
            GeometryKind::Surface => "Surface Mesh",
            GeometryKind::Edge => "Edge Mesh",
            GeometryKind::Vertex => "Vertex",
        }
    }
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
