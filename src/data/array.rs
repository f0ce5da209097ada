//! Typed, resizable arrays of fixed-width tuples.
//!
//! A `DataArray` stores `tuple_count × component_count` elements of one
//! [`ElementType`] in an [`ArrayBuffer`]. The buffer is a closed enum over the
//! supported primitives, so every operation is a single `match` and typed
//! access through the wrong element type is an error rather than a
//! reinterpretation of bytes.
//!
//! `resize` is the only way the tuple count changes. New elements are filled
//! with the element's zero value (`false` for `Bool`).

use crate::data::error::{DataError, DataResult};
use crate::types::ElementType;
use serde::{Deserialize, Serialize};

/// Owned element storage, one variant per [`ElementType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum ArrayBuffer {
    Bool(Vec<bool>),
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    I32(Vec<i32>),
    U32(Vec<u32>),
    I64(Vec<i64>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

macro_rules! each_buffer {
    ($buf:expr, $v:ident => $body:expr) => {
        match $buf {
            ArrayBuffer::Bool($v) => $body,
            ArrayBuffer::I8($v) => $body,
            ArrayBuffer::U8($v) => $body,
            ArrayBuffer::I16($v) => $body,
            ArrayBuffer::U16($v) => $body,
            ArrayBuffer::I32($v) => $body,
            ArrayBuffer::U32($v) => $body,
            ArrayBuffer::I64($v) => $body,
            ArrayBuffer::U64($v) => $body,
            ArrayBuffer::F32($v) => $body,
            ArrayBuffer::F64($v) => $body,
        }
    };
}

impl ArrayBuffer {
    /// A buffer of `len` zero values.
    pub fn zeroed(element_type: ElementType, len: usize) -> Self {
        match element_type {
            ElementType::Bool => ArrayBuffer::Bool(vec![false; len]),
            ElementType::I8 => ArrayBuffer::I8(vec![0; len]),
            ElementType::U8 => ArrayBuffer::U8(vec![0; len]),
            ElementType::I16 => ArrayBuffer::I16(vec![0; len]),
            ElementType::U16 => ArrayBuffer::U16(vec![0; len]),
            ElementType::I32 => ArrayBuffer::I32(vec![0; len]),
            ElementType::U32 => ArrayBuffer::U32(vec![0; len]),
            ElementType::I64 => ArrayBuffer::I64(vec![0; len]),
            ElementType::U64 => ArrayBuffer::U64(vec![0; len]),
            ElementType::F32 => ArrayBuffer::F32(vec![0.0; len]),
            ElementType::F64 => ArrayBuffer::F64(vec![0.0; len]),
        }
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            ArrayBuffer::Bool(_) => ElementType::Bool,
            ArrayBuffer::I8(_) => ElementType::I8,
            ArrayBuffer::U8(_) => ElementType::U8,
            ArrayBuffer::I16(_) => ElementType::I16,
            ArrayBuffer::U16(_) => ElementType::U16,
            ArrayBuffer::I32(_) => ElementType::I32,
            ArrayBuffer::U32(_) => ElementType::U32,
            ArrayBuffer::I64(_) => ElementType::I64,
            ArrayBuffer::U64(_) => ElementType::U64,
            ArrayBuffer::F32(_) => ElementType::F32,
            ArrayBuffer::F64(_) => ElementType::F64,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        each_buffer!(self, v => v.len())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resize to `len` elements, filling new slots with `fill`.
    fn resize_with_value(&mut self, len: usize, fill: f64) {
        each_buffer!(self, v => v.resize(len, Element::from_f64(fill)))
    }

    /// Read element `index` widened to `f64`.
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        each_buffer!(self, v => v.get(index).map(|x| Element::to_f64(*x)))
    }

    /// Write element `index` from an `f64`, narrowing with `as` semantics.
    pub fn set_f64(&mut self, index: usize, value: f64) -> bool {
        each_buffer!(self, v => match v.get_mut(index) {
            Some(slot) => {
                *slot = Element::from_f64(value);
                true
            }
            None => false,
        })
    }

    /// Overwrite every element with `value`.
    pub fn fill_f64(&mut self, value: f64) {
        each_buffer!(self, v => v.iter_mut().for_each(|x| *x = Element::from_f64(value)))
    }
}

/// A primitive that can live in an [`ArrayBuffer`].
pub trait Element: Copy + Default + PartialEq + std::fmt::Debug + Send + Sync + 'static {
    const TYPE: ElementType;

    fn to_f64(self) -> f64;
    fn from_f64(value: f64) -> Self;
    fn slice(buffer: &ArrayBuffer) -> Option<&[Self]>;
    fn slice_mut(buffer: &mut ArrayBuffer) -> Option<&mut [Self]>;
    fn into_buffer(values: Vec<Self>) -> ArrayBuffer;
}

macro_rules! impl_numeric_element {
    ($t:ty, $variant:ident) => {
        impl Element for $t {
            const TYPE: ElementType = ElementType::$variant;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(value: f64) -> Self {
                value as $t
            }

            fn slice(buffer: &ArrayBuffer) -> Option<&[Self]> {
                match buffer {
                    ArrayBuffer::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn slice_mut(buffer: &mut ArrayBuffer) -> Option<&mut [Self]> {
                match buffer {
                    ArrayBuffer::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn into_buffer(values: Vec<Self>) -> ArrayBuffer {
                ArrayBuffer::$variant(values)
            }
        }
    };
}

impl_numeric_element!(i8, I8);
impl_numeric_element!(u8, U8);
impl_numeric_element!(i16, I16);
impl_numeric_element!(u16, U16);
impl_numeric_element!(i32, I32);
impl_numeric_element!(u32, U32);
impl_numeric_element!(i64, I64);
impl_numeric_element!(u64, U64);
impl_numeric_element!(f32, F32);
impl_numeric_element!(f64, F64);

impl Element for bool {
    const TYPE: ElementType = ElementType::Bool;

    #[inline]
    fn to_f64(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value != 0.0
    }

    fn slice(buffer: &ArrayBuffer) -> Option<&[Self]> {
        match buffer {
            ArrayBuffer::Bool(v) => Some(v),
            _ => None,
        }
    }

    fn slice_mut(buffer: &mut ArrayBuffer) -> Option<&mut [Self]> {
        match buffer {
            ArrayBuffer::Bool(v) => Some(v),
            _ => None,
        }
    }

    fn into_buffer(values: Vec<Self>) -> ArrayBuffer {
        ArrayBuffer::Bool(values)
    }
}

/// Element count of `tuples × components`, rejecting sizes whose byte
/// length would not fit in an allocation.
fn checked_len(
    array: &str,
    element_type: ElementType,
    tuples: usize,
    components: usize,
) -> DataResult<usize> {
    tuples
        .checked_mul(components)
        .filter(|len| {
            len.checked_mul(element_type.size_bytes())
                .is_some_and(|bytes| bytes <= isize::MAX as usize)
        })
        .ok_or_else(|| DataError::CapacityOverflow {
            array: array.to_string(),
            tuples,
            components,
        })
}

/// A named, typed array of `tuple_count` tuples with `component_count`
/// components each.
///
/// Invariant: `buffer.len() == tuple_count * component_count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataArray {
    name: String,
    components: usize,
    tuples: usize,
    buffer: ArrayBuffer,
}

impl DataArray {
    /// Create a zero-filled array of `T`.
    pub fn new<T: Element>(
        name: impl Into<String>,
        tuples: usize,
        components: usize,
    ) -> DataResult<Self> {
        Self::zeroed(name, T::TYPE, tuples, components)
    }

    /// Create a zero-filled array from a runtime element type.
    ///
    /// Fails when `tuples × components` elements cannot be allocated.
    pub fn zeroed(
        name: impl Into<String>,
        element_type: ElementType,
        tuples: usize,
        components: usize,
    ) -> DataResult<Self> {
        debug_assert!(components > 0, "arrays need at least one component");
        let name = name.into();
        let components = components.max(1);
        let len = checked_len(&name, element_type, tuples, components)?;
        Ok(Self {
            name,
            components,
            tuples,
            buffer: ArrayBuffer::zeroed(element_type, len),
        })
    }

    /// Zero-tuple array carrying only structure (type and component count).
    pub fn placeholder(
        name: impl Into<String>,
        element_type: ElementType,
        components: usize,
    ) -> Self {
        Self {
            name: name.into(),
            components: components.max(1),
            tuples: 0,
            buffer: ArrayBuffer::zeroed(element_type, 0),
        }
    }

    /// Wrap existing values. Fails when `values` does not split into whole tuples.
    pub fn from_vec<T: Element>(
        name: impl Into<String>,
        values: Vec<T>,
        components: usize,
    ) -> DataResult<Self> {
        if components == 0 || values.len() % components != 0 {
            return Err(DataError::BadLayout {
                len: values.len(),
                components,
            });
        }
        Ok(Self {
            name: name.into(),
            components,
            tuples: values.len() / components,
            buffer: T::into_buffer(values),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn element_type(&self) -> ElementType {
        self.buffer.element_type()
    }

    pub fn component_count(&self) -> usize {
        self.components
    }

    pub fn tuple_count(&self) -> usize {
        self.tuples
    }

    /// Total number of elements (`tuples × components`).
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn buffer(&self) -> &ArrayBuffer {
        &self.buffer
    }

    /// Change the tuple count. Existing elements are kept, new ones are zero.
    pub fn resize(&mut self, tuples: usize) -> DataResult<()> {
        self.resize_with(tuples, 0.0)
    }

    /// Change the tuple count, filling new elements with `fill`. Leaves the
    /// array untouched when the new size cannot be allocated.
    pub fn resize_with(&mut self, tuples: usize, fill: f64) -> DataResult<()> {
        let len = self.checked_len(tuples)?;
        self.buffer.resize_with_value(len, fill);
        self.tuples = tuples;
        Ok(())
    }

    /// Element count for `tuples` tuples of this array's layout.
    pub fn checked_len(&self, tuples: usize) -> DataResult<usize> {
        checked_len(&self.name, self.element_type(), tuples, self.components)
    }

    /// Check this array's element type and component count.
    pub fn check_layout(&self, element_type: ElementType, components: usize) -> DataResult<()> {
        if self.element_type() != element_type || self.components != components {
            return Err(DataError::TypeMismatch {
                array: self.name.clone(),
                expected_type: element_type,
                expected_components: components,
                actual_type: self.element_type(),
                actual_components: self.components,
            });
        }
        Ok(())
    }

    /// Check the buffer length invariant (used after deserializing).
    pub fn check_invariant(&self) -> DataResult<()> {
        if self.components == 0 || self.buffer.len() != self.tuples * self.components {
            return Err(DataError::BadLayout {
                len: self.buffer.len(),
                components: self.components,
            });
        }
        Ok(())
    }

    fn type_mismatch<T: Element>(&self) -> DataError {
        DataError::TypeMismatch {
            array: self.name.clone(),
            expected_type: T::TYPE,
            expected_components: self.components,
            actual_type: self.element_type(),
            actual_components: self.components,
        }
    }

    /// Borrow all elements as `T`.
    pub fn as_slice<T: Element>(&self) -> DataResult<&[T]> {
        T::slice(&self.buffer).ok_or_else(|| self.type_mismatch::<T>())
    }

    /// Mutably borrow all elements as `T`.
    pub fn as_mut_slice<T: Element>(&mut self) -> DataResult<&mut [T]> {
        if T::TYPE != self.element_type() {
            return Err(self.type_mismatch::<T>());
        }
        let len = self.buffer.len();
        let components = self.components;
        // The type check above makes this infallible.
        T::slice_mut(&mut self.buffer).ok_or(DataError::BadLayout { len, components })
    }

    /// Borrow the components of tuple `index`.
    pub fn tuple<T: Element>(&self, index: usize) -> Option<&[T]> {
        if index >= self.tuples {
            return None;
        }
        let start = index * self.components;
        T::slice(&self.buffer).map(|s| &s[start..start + self.components])
    }

    /// Element `index` (flat) as `f64`.
    pub fn value(&self, index: usize) -> Option<f64> {
        self.buffer.get_f64(index)
    }

    /// Write flat element `index` from an `f64`. Returns false when out of range.
    pub fn set_value(&mut self, index: usize, value: f64) -> bool {
        self.buffer.set_f64(index, value)
    }

    /// Overwrite every element with `value`.
    pub fn fill(&mut self, value: f64) {
        self.buffer.fill_f64(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_array_is_zeroed() {
        let arr = DataArray::new::<f32>("Confidence", 4, 3).unwrap();
        assert_eq!(arr.element_type(), ElementType::F32);
        assert_eq!(arr.tuple_count(), 4);
        assert_eq!(arr.component_count(), 3);
        assert_eq!(arr.len(), 12);
        assert!(arr.as_slice::<f32>().unwrap().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_placeholder_has_structure_only() {
        let arr = DataArray::placeholder("Mask", ElementType::Bool, 1);
        assert!(arr.is_empty());
        assert_eq!(arr.tuple_count(), 0);
        assert_eq!(arr.element_type(), ElementType::Bool);
    }

    #[test]
    fn test_resize_preserves_and_fills() {
        let mut arr = DataArray::from_vec("Ids", vec![1i32, 2, 3], 1).unwrap();
        arr.resize(5).unwrap();
        assert_eq!(arr.as_slice::<i32>().unwrap(), &[1, 2, 3, 0, 0]);

        arr.resize_with(7, -1.0).unwrap();
        assert_eq!(arr.as_slice::<i32>().unwrap(), &[1, 2, 3, 0, 0, -1, -1]);

        arr.resize(2).unwrap();
        assert_eq!(arr.as_slice::<i32>().unwrap(), &[1, 2]);
    }

    #[test]
    fn test_wrong_type_access_fails() {
        let arr = DataArray::new::<u8>("Phases", 2, 1).unwrap();
        let err = arr.as_slice::<f32>().unwrap_err();
        assert!(matches!(err, DataError::TypeMismatch { .. }));
    }

    #[test]
    fn test_from_vec_rejects_partial_tuples() {
        let err = DataArray::from_vec("Euler", vec![0.0f32; 7], 3).unwrap_err();
        assert_eq!(err, DataError::BadLayout { len: 7, components: 3 });
    }

    #[test]
    fn test_tuple_access() {
        let arr = DataArray::from_vec("Pos", vec![1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0], 3).unwrap();
        assert_eq!(arr.tuple::<f64>(1), Some(&[4.0, 5.0, 6.0][..]));
        assert_eq!(arr.tuple::<f64>(2), None);
        assert_eq!(arr.tuple::<f32>(0), None);
    }

    #[test]
    fn test_f64_bridge() {
        let mut arr = DataArray::new::<bool>("Mask", 2, 1).unwrap();
        assert!(arr.set_value(1, 5.0));
        assert_eq!(arr.value(1), Some(1.0));
        assert!(!arr.set_value(2, 1.0));

        arr.fill(0.0);
        assert_eq!(arr.as_slice::<bool>().unwrap(), &[false, false]);
    }

    #[test]
    fn test_check_layout() {
        let arr = DataArray::new::<i32>("FeatureIds", 10, 1).unwrap();
        assert!(arr.check_layout(ElementType::I32, 1).is_ok());
        assert!(arr.check_layout(ElementType::I32, 3).is_err());
        assert!(arr.check_layout(ElementType::F32, 1).is_err());
    }

    #[test]
    fn test_oversized_arrays_are_rejected() {
        let err = DataArray::zeroed("Huge", ElementType::F64, usize::MAX / 2, 3).unwrap_err();
        assert!(matches!(err, DataError::CapacityOverflow { components: 3, .. }));

        let err = DataArray::new::<u32>("Bytes", isize::MAX as usize / 2, 1).unwrap_err();
        assert!(matches!(err, DataError::CapacityOverflow { .. }));
    }

    #[test]
    fn test_failed_resize_leaves_array_intact() {
        let mut arr = DataArray::from_vec("Ids", vec![4i32, 5], 1).unwrap();
        assert!(arr.resize(usize::MAX).is_err());
        assert_eq!(arr.tuple_count(), 2);
        assert_eq!(arr.as_slice::<i32>().unwrap(), &[4, 5]);
    }

    proptest! {
        #[test]
        fn test_length_invariant_across_resizes(
            components in 1usize..6,
            sizes in prop::collection::vec(0usize..200, 1..12),
            type_index in 0usize..11,
        ) {
            let ty = ElementType::all()[type_index];
            let mut arr = DataArray::zeroed("a", ty, 0, components).unwrap();
            prop_assert_eq!(arr.len(), 0);
            for tuples in sizes {
                arr.resize(tuples).unwrap();
                prop_assert_eq!(arr.tuple_count() * arr.component_count(), arr.len());
                prop_assert!(arr.check_invariant().is_ok());
            }
        }
    }
}
