//! Attribute groups: named sets of arrays sharing one tuple count.

use crate::data::array::DataArray;
use crate::data::error::{DataError, DataResult};
use crate::types::{ElementType, GroupKind};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// A named collection of arrays that all have `tuple_count` tuples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeGroup {
    name: String,
    kind: GroupKind,
    tuples: usize,
    arrays: BTreeMap<String, DataArray>,
}

impl AttributeGroup {
    pub fn new(name: impl Into<String>, kind: GroupKind, tuples: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            tuples,
            arrays: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    pub fn tuple_count(&self) -> usize {
        self.tuples
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Insert `array`, replacing any array of the same name.
    ///
    /// Fails without touching the group when the tuple counts differ.
    pub fn insert(&mut self, array: DataArray) -> DataResult<Option<DataArray>> {
        if array.tuple_count() != self.tuples {
            return Err(DataError::TupleMismatch {
                group: self.name.clone(),
                array: array.name().to_string(),
                expected: self.tuples,
                actual: array.tuple_count(),
            });
        }
        Ok(self.arrays.insert(array.name().to_string(), array))
    }

    /// Create a zero-filled array sized to this group, replacing any array of
    /// the same name. Returns the new array.
    pub fn create_array(
        &mut self,
        name: &str,
        element_type: ElementType,
        components: usize,
    ) -> DataResult<&mut DataArray> {
        let array = DataArray::zeroed(name, element_type, self.tuples, components)?;
        Ok(match self.arrays.entry(name.to_string()) {
            Entry::Occupied(mut slot) => {
                slot.insert(array);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(array),
        })
    }

    pub fn get(&self, name: &str) -> DataResult<&DataArray> {
        self.arrays
            .get(name)
            .ok_or_else(|| DataError::not_found("Array", name))
    }

    pub fn get_mut(&mut self, name: &str) -> DataResult<&mut DataArray> {
        self.arrays
            .get_mut(name)
            .ok_or_else(|| DataError::not_found("Array", name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.arrays.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> DataResult<DataArray> {
        self.arrays
            .remove(name)
            .ok_or_else(|| DataError::not_found("Array", name))
    }

    /// Rename an array. Fails if `old` is absent or `new` is taken.
    pub fn rename(&mut self, old: &str, new: &str) -> DataResult<()> {
        if !self.arrays.contains_key(old) {
            return Err(DataError::not_found("Array", old));
        }
        if old == new {
            return Ok(());
        }
        if self.arrays.contains_key(new) {
            return Err(DataError::duplicate("Array", new));
        }
        if let Some(mut array) = self.arrays.remove(old) {
            array.set_name(new);
            self.arrays.insert(new.to_string(), array);
        }
        Ok(())
    }

    /// Resize the group and every member array.
    ///
    /// Either every array is resized or, when one of them cannot hold
    /// `tuples` tuples, none is.
    pub fn resize(&mut self, tuples: usize) -> DataResult<()> {
        for array in self.arrays.values() {
            array.checked_len(tuples)?;
        }
        for array in self.arrays.values_mut() {
            array.resize(tuples)?;
        }
        self.tuples = tuples;
        Ok(())
    }

    pub fn array_names(&self) -> impl Iterator<Item = &str> {
        self.arrays.keys().map(String::as_str)
    }

    pub fn arrays(&self) -> impl Iterator<Item = &DataArray> {
        self.arrays.values()
    }

    /// Same arrays (type, components), zero tuples.
    pub fn skeleton(&self) -> Self {
        let arrays = self
            .arrays
            .iter()
            .map(|(name, a)| {
                (
                    name.clone(),
                    DataArray::placeholder(name.as_str(), a.element_type(), a.component_count()),
                )
            })
            .collect();
        Self {
            name: self.name.clone(),
            kind: self.kind,
            tuples: 0,
            arrays,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_insert_matching_array() {
        let mut group = AttributeGroup::new("CellData", GroupKind::Cell, 8);
        let previous = group.insert(DataArray::new::<i32>("FeatureIds", 8, 1).unwrap()).unwrap();
        assert!(previous.is_none());
        assert!(group.contains("FeatureIds"));
    }

    #[test]
    fn test_insert_mismatched_array_leaves_group_unchanged() {
        let mut group = AttributeGroup::new("CellData", GroupKind::Cell, 8);
        group.insert(DataArray::new::<i32>("FeatureIds", 8, 1).unwrap()).unwrap();
        let before = group.clone();

        let err = group
            .insert(DataArray::new::<f32>("Confidence", 7, 1).unwrap())
            .unwrap_err();
        assert!(matches!(err, DataError::TupleMismatch { expected: 8, actual: 7, .. }));
        assert_eq!(group, before);
    }

    #[test]
    fn test_resize_resizes_members() {
        let mut group = AttributeGroup::new("Features", GroupKind::Feature, 1);
        group.create_array("Volumes", ElementType::F32, 1).unwrap();
        group.create_array("Centroids", ElementType::F32, 3).unwrap();

        group.resize(10).unwrap();
        assert_eq!(group.tuple_count(), 10);
        for array in group.arrays() {
            assert_eq!(array.tuple_count(), 10);
        }
        assert_eq!(group.get("Centroids").unwrap().len(), 30);
    }

    #[test]
    fn test_oversized_resize_is_all_or_nothing() {
        let mut group = AttributeGroup::new("Features", GroupKind::Feature, 2);
        group.create_array("Ids", ElementType::U8, 1).unwrap();
        group.create_array("Centroids", ElementType::F64, 3).unwrap();
        let before = group.clone();

        let err = group.resize(usize::MAX / 8).unwrap_err();
        assert!(matches!(err, DataError::CapacityOverflow { .. }));
        assert_eq!(group, before);

        let err = group.create_array("Huge", ElementType::F64, usize::MAX).unwrap_err();
        assert!(matches!(err, DataError::CapacityOverflow { .. }));
        assert!(!group.contains("Huge"));
    }

    #[test]
    fn test_rename_array() {
        let mut group = AttributeGroup::new("CellData", GroupKind::Cell, 2);
        group.create_array("a", ElementType::U8, 1).unwrap();
        group.create_array("b", ElementType::U8, 1).unwrap();

        assert!(matches!(
            group.rename("a", "b"),
            Err(DataError::DuplicateName { .. })
        ));
        group.rename("a", "c").unwrap();
        assert_eq!(group.get("c").unwrap().name(), "c");
        assert!(!group.contains("a"));
    }

    #[test]
    fn test_skeleton_keeps_structure() {
        let mut group = AttributeGroup::new("CellData", GroupKind::Cell, 100);
        group.create_array("Quats", ElementType::F32, 4).unwrap();
        let skeleton = group.skeleton();
        assert_eq!(skeleton.tuple_count(), 0);
        let quats = skeleton.get("Quats").unwrap();
        assert_eq!(quats.component_count(), 4);
        assert!(quats.is_empty());
    }

    proptest! {
        #[test]
        fn test_member_counts_always_match(
            group_tuples in 0usize..64,
            candidates in prop::collection::vec(0usize..64, 1..16),
        ) {
            let mut group = AttributeGroup::new("g", GroupKind::Cell, group_tuples);
            for (i, tuples) in candidates.into_iter().enumerate() {
                let before = group.clone();
                let result = group.insert(DataArray::new::<u16>(format!("a{i}"), tuples, 1).unwrap());
                if tuples == group_tuples {
                    prop_assert!(result.is_ok());
                } else {
                    prop_assert!(result.is_err());
                    prop_assert_eq!(&group, &before);
                }
                for array in group.arrays() {
                    prop_assert_eq!(array.tuple_count(), group.tuple_count());
                }
            }
        }
    }
}
