//! Property-based tests for the data model and shape math

use gridflow::data::{AttributeGroup, DataArray};
use gridflow::shape::{gamma, ShapeKind, ShapeOps};
use gridflow::types::{ElementType, GroupKind};
use proptest::prelude::*;

fn element_type() -> impl Strategy<Value = ElementType> {
    prop::sample::select(ElementType::all().to_vec())
}

proptest! {
    #[test]
    fn array_length_tracks_tuples_across_resizes(
        ty in element_type(),
        components in 1usize..5,
        sizes in prop::collection::vec(0usize..200, 1..8),
    ) {
        let mut array = DataArray::zeroed("a", ty, 0, components).unwrap();
        prop_assert!(array.check_invariant().is_ok());
        for tuples in sizes {
            array.resize(tuples).unwrap();
            prop_assert_eq!(array.tuple_count(), tuples);
            prop_assert_eq!(array.len(), tuples * components);
            prop_assert!(array.check_invariant().is_ok());
        }
    }

    #[test]
    fn resize_keeps_existing_values(values in prop::collection::vec(-1000i32..1000, 1..50), grow in 0usize..50) {
        let mut array = DataArray::from_vec("ids", values.clone(), 1).unwrap();
        array.resize(values.len() + grow).unwrap();
        let slice = array.as_slice::<i32>().unwrap();
        prop_assert_eq!(&slice[..values.len()], &values[..]);
        prop_assert!(slice[values.len()..].iter().all(|&v| v == 0));
    }

    #[test]
    fn group_rejects_mismatched_tuple_counts(group_tuples in 0usize..64, array_tuples in 0usize..64) {
        prop_assume!(group_tuples != array_tuples);
        let mut group = AttributeGroup::new("CellData", GroupKind::Cell, group_tuples);
        group.create_array("Existing", ElementType::F32, 1).unwrap();
        let before = group.clone();

        let result = group.insert(DataArray::zeroed("New", ElementType::U8, array_tuples, 1).unwrap());
        prop_assert!(result.is_err());
        prop_assert_eq!(group, before);
    }

    #[test]
    fn oversized_resize_never_changes_array(tuples in (usize::MAX / 4)..usize::MAX, components in 1usize..5) {
        let mut array = DataArray::zeroed("a", ElementType::F64, 3, components).unwrap();
        let before = array.clone();
        prop_assert!(array.resize(tuples).is_err());
        prop_assert_eq!(array, before);
    }

    #[test]
    fn gamma_satisfies_recurrence(x in 0.05f64..40.0) {
        let lhs = gamma(x + 1.0);
        let rhs = x * gamma(x);
        prop_assert!(((lhs - rhs) / rhs).abs() < 1e-9, "Γ({}+1)={} but xΓ(x)={}", x, lhs, rhs);
    }

    #[test]
    fn radius_reproduces_volume(
        kind in prop::sample::select(vec![
            ShapeKind::Ellipsoid,
            ShapeKind::SuperEllipsoid,
            ShapeKind::Cube,
            ShapeKind::Cylinder,
        ]),
        exponent in 0.5f64..8.0,
        volume in 0.01f64..1.0e6,
        b_over_a in 0.1f64..4.0,
        c_over_a in 0.1f64..4.0,
    ) {
        let ops = ShapeOps::for_kind(kind, exponent);
        let estimate = ops.radius_from_volume_and_aspect(volume, b_over_a, c_over_a).unwrap();
        prop_assert!(estimate.computed);
        let back = ops.volume(estimate.radius, b_over_a, c_over_a).unwrap();
        prop_assert!(((back - volume) / volume).abs() < 1e-9);
    }

    #[test]
    fn center_is_inside_and_far_points_are_not(kind_index in 0usize..4, far in 1.01f64..100.0) {
        let kind = ShapeKind::all()[kind_index];
        let ops = ShapeOps::for_kind(kind, 3.0);
        prop_assert!(ops.contains(0.0, 0.0, 0.0));
        prop_assert!(!ops.contains(far, 0.0, 0.0));
        prop_assert!(!ops.contains(0.0, far, far));
    }
}

#[test]
fn gamma_matches_factorials() {
    let mut factorial = 1.0;
    for n in 1..15u32 {
        assert!((gamma(n as f64) - factorial).abs() / factorial < 1e-12);
        factorial *= n as f64;
    }
}

#[test]
fn unknown_shape_never_contains() {
    let ops = ShapeOps::for_kind(ShapeKind::Unknown, 2.0);
    assert!(!ops.contains(0.0, 0.0, 0.0));
    let estimate = ops.radius_from_volume_and_aspect(10.0, 1.0, 1.0).unwrap();
    assert!(!estimate.computed);
    assert_eq!(estimate.radius, 1.0);
}
