//! Property tests for shapevec
//!
//! These tests check the algebraic laws the vector engine promises for
//! every species.

use proptest::prelude::*;
use shapevec::{FaultKind, Operator, VectorError, VectorShape, VectorSpecies};

const FIXED_SHAPES: [VectorShape; 4] = [
    VectorShape::S64,
    VectorShape::S128,
    VectorShape::S256,
    VectorShape::S512,
];

fn shape() -> impl Strategy<Value = VectorShape> {
    prop::sample::select(FIXED_SHAPES.to_vec())
}

// ============================================================
// Broadcast / ADD wrapping law
// ============================================================

macro_rules! wrapping_add_law {
    ($name:ident, $t:ty) => {
        proptest! {
            #[test]
            fn $name(a in any::<$t>(), b in any::<$t>(), shape in shape()) {
                let s = VectorSpecies::<$t>::of(shape).unwrap();
                let sum = s.broadcast(a).add(&s.broadcast(b)).unwrap();
                prop_assert_eq!(sum, s.broadcast(a.wrapping_add(b)));
            }
        }
    };
}

wrapping_add_law!(add_law_i8, i8);
wrapping_add_law!(add_law_i16, i16);
wrapping_add_law!(add_law_i32, i32);
wrapping_add_law!(add_law_i64, i64);

proptest! {
    #[test]
    fn add_law_f32(a in -1.0e30f32..1.0e30, b in -1.0e30f32..1.0e30, shape in shape()) {
        let s = VectorSpecies::<f32>::of(shape).unwrap();
        let sum = s.broadcast(a).add(&s.broadcast(b)).unwrap();
        prop_assert_eq!(sum, s.broadcast(a + b));
    }

    #[test]
    fn add_law_f64(a in -1.0e300f64..1.0e300, b in -1.0e300f64..1.0e300, shape in shape()) {
        let s = VectorSpecies::<f64>::of(shape).unwrap();
        let sum = s.broadcast(a).add(&s.broadcast(b)).unwrap();
        prop_assert_eq!(sum, s.broadcast(a + b));
    }
}

// ============================================================
// Masking law
// ============================================================

proptest! {
    // Unset lanes keep the first operand; set lanes match the unmasked op.
    #[test]
    fn masked_op_blends(
        a in prop::collection::vec(any::<i32>(), 8),
        b in prop::collection::vec(any::<i32>(), 8),
        bits in any::<u8>(),
    ) {
        let s = VectorSpecies::<i32>::of(VectorShape::S256).unwrap();
        let va = s.from_values(&a).unwrap();
        let vb = s.from_values(&b).unwrap();
        let m = s.mask_from_long(u64::from(bits));
        for op in [Operator::Add, Operator::Mul, Operator::Xor, Operator::Lshl, Operator::Rol, Operator::Max] {
            let masked = va.lanewise_masked(op, &vb, &m).unwrap();
            let full = va.lanewise(op, &vb).unwrap();
            for i in 0..8 {
                let expected = if m.lane_is_set(i).unwrap() { full.lane(i).unwrap() } else { a[i] };
                prop_assert_eq!(masked.lane(i).unwrap(), expected);
            }
        }
    }

    #[test]
    fn unary_masked_blends(a in prop::collection::vec(any::<i16>(), 8), bits in any::<u8>()) {
        let s = VectorSpecies::<i16>::of(VectorShape::S128).unwrap();
        let v = s.from_values(&a).unwrap();
        let m = s.mask_from_long(u64::from(bits));
        let masked = v.lanewise_unary_masked(Operator::Neg, &m).unwrap();
        prop_assert_eq!(masked, v.blend(&v.neg().unwrap(), &m).unwrap());
    }
}

// ============================================================
// Reduction identities
// ============================================================

proptest! {
    #[test]
    fn masked_reduction_matches_filtered_fold(
        a in prop::collection::vec(any::<i64>(), 4),
        bits in 0u64..16,
    ) {
        let s = VectorSpecies::<i64>::of(VectorShape::S256).unwrap();
        let v = s.from_values(&a).unwrap();
        let m = s.mask_from_long(bits);
        let active: Vec<i64> = (0..4).filter(|&i| bits >> i & 1 == 1).map(|i| a[i]).collect();

        prop_assert_eq!(
            v.reduce_lanes_masked(Operator::Add, &m).unwrap(),
            active.iter().fold(0i64, |x, &y| x.wrapping_add(y))
        );
        prop_assert_eq!(
            v.reduce_lanes_masked(Operator::Mul, &m).unwrap(),
            active.iter().fold(1i64, |x, &y| x.wrapping_mul(y))
        );
        prop_assert_eq!(
            v.reduce_lanes_masked(Operator::And, &m).unwrap(),
            active.iter().fold(-1i64, |x, &y| x & y)
        );
        prop_assert_eq!(
            v.reduce_lanes_masked(Operator::Min, &m).unwrap(),
            active.iter().copied().min().unwrap_or(i64::MAX)
        );
        prop_assert_eq!(
            v.reduce_lanes_masked(Operator::Max, &m).unwrap(),
            active.iter().copied().max().unwrap_or(i64::MIN)
        );
        prop_assert_eq!(
            v.reduce_lanes_masked(Operator::FirstNonzero, &m).unwrap(),
            active.iter().copied().find(|&x| x != 0).unwrap_or(0)
        );
    }

    #[test]
    fn reduction_of_broadcast_identity_is_identity(shape in shape()) {
        let s = VectorSpecies::<i8>::of(shape).unwrap();
        prop_assert_eq!(s.zero().reduce_lanes(Operator::Add).unwrap(), 0);
        prop_assert_eq!(s.broadcast(1).reduce_lanes(Operator::Mul).unwrap(), 1);
        prop_assert_eq!(s.broadcast(-1).reduce_lanes(Operator::And).unwrap(), -1);
    }
}

// ============================================================
// Mask algebra
// ============================================================

proptest! {
    #[test]
    fn mask_algebra(x in any::<u16>(), y in any::<u16>()) {
        let s = VectorSpecies::<i8>::of(VectorShape::S128).unwrap();
        let a = s.mask_from_long(u64::from(x));
        let b = s.mask_from_long(u64::from(y));

        prop_assert_eq!(a.not().not(), a.clone());
        prop_assert_eq!(a.and(&b).unwrap().to_long().unwrap(), u64::from(x & y));
        prop_assert_eq!(a.or(&b).unwrap().to_long().unwrap(), u64::from(x | y));
        prop_assert_eq!(a.xor(&b).unwrap().to_long().unwrap(), u64::from(x ^ y));
        prop_assert_eq!(a.and_not(&b).unwrap().to_long().unwrap(), u64::from(x & !y));
        prop_assert_eq!(a.eq(&b).unwrap().to_long().unwrap(), u64::from(!(x ^ y)));
        prop_assert_eq!(a.true_count(), x.count_ones() as usize);
        prop_assert!(a.eq(&a).unwrap().all_true());
        // De Morgan
        prop_assert_eq!(a.and(&b).unwrap().not(), a.not().or(&b.not()).unwrap());
    }

    #[test]
    fn mask_first_and_last(x in any::<u8>()) {
        let s = VectorSpecies::<i16>::of(VectorShape::S128).unwrap();
        let m = s.mask_from_long(u64::from(x));
        if x == 0 {
            prop_assert_eq!(m.first_true(), 8);
            prop_assert_eq!(m.last_true(), -1);
        } else {
            prop_assert_eq!(m.first_true(), x.trailing_zeros() as usize);
            prop_assert_eq!(m.last_true(), 7 - x.leading_zeros() as isize);
        }
    }
}

// ============================================================
// Shuffles
// ============================================================

proptest! {
    #[test]
    fn iota_rearrange_is_identity(a in prop::collection::vec(any::<i32>(), 16)) {
        let s = VectorSpecies::<i32>::of(VectorShape::S512).unwrap();
        let v = s.from_values(&a).unwrap();
        prop_assert_eq!(v.rearrange(&s.iota_shuffle(0, 1, false)).unwrap(), v);
    }

    #[test]
    fn wrapped_shuffles_are_valid(start in any::<i32>(), step in -64i64..64) {
        let s = VectorSpecies::<f32>::of(VectorShape::S256).unwrap();
        let shuffle = s.iota_shuffle(i64::from(start), step, false);
        prop_assert!(shuffle.wrap_indexes().check_indexes().is_ok());
        prop_assert!(shuffle.as_slice().iter().all(|&x| (-8..8).contains(&x)));
    }

    #[test]
    fn slice_then_unslice_restores(a in prop::collection::vec(any::<i16>(), 8), origin in 0usize..=8) {
        let s = VectorSpecies::<i16>::of(VectorShape::S128).unwrap();
        let v = s.from_values(&a).unwrap();
        let restored = v.slice(origin).unwrap().unslice_into(origin, &v, 0).unwrap();
        prop_assert_eq!(restored, v);
    }
}

// ============================================================
// Shape round trip
// ============================================================

proptest! {
    #[test]
    fn reinterpret_round_trip(a in prop::collection::vec(any::<i64>(), 1)) {
        let small = VectorSpecies::<i64>::of(VectorShape::S64).unwrap();
        let v = small.from_values(&a).unwrap();
        for shape in [VectorShape::S128, VectorShape::S256, VectorShape::S512] {
            let wide = VectorSpecies::<i8>::of(shape).unwrap();
            let there = v.reinterpret_shape(wide, 0).unwrap();
            prop_assert_eq!(there.reinterpret_shape(small, 0).unwrap(), v.clone());
        }
    }

    #[test]
    fn cast_round_trip_through_wider_lanes(a in prop::collection::vec(any::<i16>(), 4)) {
        let shorts = VectorSpecies::<i16>::of(VectorShape::S64).unwrap();
        let ints = VectorSpecies::<i32>::of(VectorShape::S128).unwrap();
        let v = shorts.from_values(&a).unwrap();
        let widened = v.cast_shape(ints, 0).unwrap();
        prop_assert_eq!(widened.cast_shape(shorts, 0).unwrap(), v);
    }
}

// ============================================================
// Division faults
// ============================================================

proptest! {
    #[test]
    fn division_faults_only_on_active_zero(
        a in prop::collection::vec(any::<i32>(), 4),
        zero_lane in 0usize..4,
        bits in 0u64..16,
    ) {
        let s = VectorSpecies::<i32>::of(VectorShape::S128).unwrap();
        let va = s.from_values(&a).unwrap();
        let vb = s.from_fn(|i| if i == zero_lane { 0 } else { 3 });
        let m = s.mask_from_long(bits);

        let err = va.div(&vb).unwrap_err();
        prop_assert_eq!(err.kind(), FaultKind::DivideByZero);

        let result = va.lanewise_masked(Operator::Div, &vb, &m);
        if bits >> zero_lane & 1 == 1 {
            prop_assert_eq!(result, Err(VectorError::DivideByZero { lane: zero_lane }));
        } else {
            let v = result.unwrap();
            prop_assert_eq!(v.lane(zero_lane).unwrap(), a[zero_lane]);
        }
    }
}
