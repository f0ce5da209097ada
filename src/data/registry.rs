//! The container registry: the shared dataset a pipeline operates on.
//!
//! The registry exclusively owns its containers, containers own their
//! groups and groups own their arrays. Nothing holds a pointer back up the
//! tree; anything that needs to find "the group an array lives in" does so
//! through a [`DataPath`] lookup here.

use crate::data::array::DataArray;
use crate::data::container::DataContainer;
use crate::data::error::{DataError, DataResult};
use crate::data::group::AttributeGroup;
use crate::data::path::DataPath;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Named collection of containers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerRegistry {
    containers: BTreeMap<String, DataContainer>,
}

impl ContainerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.containers.contains_key(name)
    }

    pub fn get(&self, name: &str) -> DataResult<&DataContainer> {
        self.containers
            .get(name)
            .ok_or_else(|| DataError::not_found("Container", name))
    }

    pub fn get_mut(&mut self, name: &str) -> DataResult<&mut DataContainer> {
        self.containers
            .get_mut(name)
            .ok_or_else(|| DataError::not_found("Container", name))
    }

    /// Add a container under its own name. Fails if the name is taken.
    pub fn insert(&mut self, container: DataContainer) -> DataResult<&mut DataContainer> {
        match self.containers.entry(container.name().to_string()) {
            Entry::Occupied(slot) => Err(DataError::duplicate("Container", slot.key().as_str())),
            Entry::Vacant(slot) => Ok(slot.insert(container)),
        }
    }

    /// Add or overwrite a container.
    pub fn replace(&mut self, container: DataContainer) -> Option<DataContainer> {
        self.containers
            .insert(container.name().to_string(), container)
    }

    pub fn remove(&mut self, name: &str) -> DataResult<DataContainer> {
        self.containers
            .remove(name)
            .ok_or_else(|| DataError::not_found("Container", name))
    }

    /// Rename a container. On failure neither container is touched.
    pub fn rename(&mut self, old: &str, new: &str) -> DataResult<()> {
        if !self.containers.contains_key(old) {
            return Err(DataError::not_found("Container", old));
        }
        if old == new {
            return Ok(());
        }
        if self.containers.contains_key(new) {
            return Err(DataError::duplicate("Container", new));
        }
        if let Some(mut container) = self.containers.remove(old) {
            container.set_name(new);
            self.containers.insert(new.to_string(), container);
        }
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.containers.keys().map(String::as_str)
    }

    pub fn containers(&self) -> impl Iterator<Item = &DataContainer> {
        self.containers.values()
    }

    /// Resolve the group part of `path`.
    pub fn group(&self, path: &DataPath) -> DataResult<&AttributeGroup> {
        self.get(&path.container)?.group(&path.group)
    }

    pub fn group_mut(&mut self, path: &DataPath) -> DataResult<&mut AttributeGroup> {
        self.get_mut(&path.container)?.group_mut(&path.group)
    }

    /// Resolve the array `path` points at.
    pub fn array(&self, path: &DataPath) -> DataResult<&DataArray> {
        self.group(path)?.get(&path.array)
    }

    pub fn array_mut(&mut self, path: &DataPath) -> DataResult<&mut DataArray> {
        self.group_mut(path)?.get_mut(&path.array)
    }

    /// Structural copy: same containers, geometries, groups and arrays with
    /// every group at zero tuples. Validation runs against this so it never
    /// touches real data.
    pub fn skeleton(&self) -> Self {
        Self {
            containers: self
                .containers
                .iter()
                .map(|(name, c)| (name.clone(), c.skeleton()))
                .collect(),
        }
    }
}
