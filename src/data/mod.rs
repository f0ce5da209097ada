//! The dataset model filters operate on.
//!
//! ```text
//! ContainerRegistry ─► DataContainer (geometry) ─► AttributeGroup (tuple count) ─► DataArray
//! ```
//!
//! Ownership is strictly top-down. Element, group and geometry polymorphism
//! are closed enums ([`ElementType`](crate::types::ElementType),
//! [`GroupKind`](crate::types::GroupKind), [`Geometry`]) so every lookup and
//! type check is a total `match`.

pub mod array;
pub mod container;
pub mod error;
pub mod group;
pub mod path;
pub mod registry;

pub use array::{ArrayBuffer, DataArray, Element};
pub use container::{DataContainer, Geometry, ImageGeometry};
pub use error::{DataError, DataResult};
pub use group::AttributeGroup;
pub use path::DataPath;
pub use registry::ContainerRegistry;
