//! Scalar fallback kernels.
//!
//! Each operator maps to a per-lane function; the builders at the bottom
//! wrap those into slice-level closures for [`ImplCache`](super::ImplCache).

use super::{BinaryImpl, CompareImpl, ReduceImpl, TernaryImpl, TestImpl, UnaryImpl};
use crate::lane::Lane;
use crate::operator::Operator;
use std::sync::Arc;

fn shift_count<E: Lane>(n: E) -> u32 {
    // Masking the raw bits also brings negative counts into range.
    (n.to_bits() & u64::from(E::KIND.bits() - 1)) as u32
}

fn all_ones<E: Lane>() -> E {
    E::from_bits(u64::MAX)
}

fn via_f64<E: Lane>(x: E, f: fn(f64) -> f64) -> E {
    E::from_f64(f(x.to_f64()))
}

/// Per-lane function of a unary operator.
pub(crate) fn unary_lane<E: Lane>(op: Operator) -> Option<fn(E) -> E> {
    let f: fn(E) -> E = match op {
        Operator::Neg => E::lane_neg,
        Operator::Abs => E::lane_abs,
        Operator::Not => |x: E| E::from_bits(!x.to_bits()),
        Operator::Zomo => |x: E| {
            if x.to_bits() == 0 {
                E::default()
            } else {
                all_ones()
            }
        },
        Operator::Sqrt => |x: E| via_f64(x, f64::sqrt),
        Operator::Cbrt => |x: E| via_f64(x, f64::cbrt),
        Operator::Sin => |x: E| via_f64(x, f64::sin),
        Operator::Cos => |x: E| via_f64(x, f64::cos),
        Operator::Tan => |x: E| via_f64(x, f64::tan),
        Operator::Asin => |x: E| via_f64(x, f64::asin),
        Operator::Acos => |x: E| via_f64(x, f64::acos),
        Operator::Atan => |x: E| via_f64(x, f64::atan),
        Operator::Sinh => |x: E| via_f64(x, f64::sinh),
        Operator::Cosh => |x: E| via_f64(x, f64::cosh),
        Operator::Tanh => |x: E| via_f64(x, f64::tanh),
        Operator::Exp => |x: E| via_f64(x, f64::exp),
        Operator::Expm1 => |x: E| via_f64(x, f64::exp_m1),
        Operator::Log => |x: E| via_f64(x, f64::ln),
        Operator::Log10 => |x: E| via_f64(x, f64::log10),
        Operator::Log1p => |x: E| via_f64(x, f64::ln_1p),
        _ => return None,
    };
    Some(f)
}

/// Per-lane function of a binary operator. `SPECIAL` operators have none.
pub(crate) fn binary_lane<E: Lane>(op: Operator) -> Option<fn(E, E) -> E> {
    let f: fn(E, E) -> E = match op {
        Operator::Add => E::lane_add,
        Operator::Sub => E::lane_sub,
        Operator::Mul => E::lane_mul,
        Operator::Div => E::lane_div,
        Operator::Min => E::lane_min,
        Operator::Max => E::lane_max,
        Operator::And => |x: E, y: E| E::from_bits(x.to_bits() & y.to_bits()),
        Operator::Or => |x: E, y: E| E::from_bits(x.to_bits() | y.to_bits()),
        Operator::Xor => |x: E, y: E| E::from_bits(x.to_bits() ^ y.to_bits()),
        Operator::Lshl => |x: E, n: E| E::from_i64(x.to_i64().wrapping_shl(shift_count(n))),
        Operator::Ashr => |x: E, n: E| E::from_i64(x.to_i64() >> shift_count(n)),
        Operator::Lshr => |x: E, n: E| E::from_bits(x.to_bits() >> shift_count(n)),
        Operator::Atan2 => |y: E, x: E| E::from_f64(y.to_f64().atan2(x.to_f64())),
        Operator::Pow => |x: E, y: E| E::from_f64(x.to_f64().powf(y.to_f64())),
        Operator::Hypot => |x: E, y: E| E::from_f64(x.to_f64().hypot(y.to_f64())),
        _ => return None,
    };
    Some(f)
}

/// Per-lane function of a ternary operator.
pub(crate) fn ternary_lane<E: Lane>(op: Operator) -> Option<fn(E, E, E) -> E> {
    let f: fn(E, E, E) -> E = match op {
        Operator::Fma => E::lane_fma,
        Operator::BitwiseBlend => |a: E, b: E, c: E| {
            let (a, b, c) = (a.to_bits(), b.to_bits(), c.to_bits());
            E::from_bits((a & !c) | (b & c))
        },
        _ => return None,
    };
    Some(f)
}

/// Per-lane predicate of a comparison.
pub(crate) fn compare_lane<E: Lane>(op: Operator) -> Option<fn(E, E) -> bool> {
    let f: fn(E, E) -> bool = match op {
        Operator::Eq => |a: E, b: E| a == b,
        Operator::Ne => |a: E, b: E| a != b,
        Operator::Lt => |a: E, b: E| a < b,
        Operator::Le => |a: E, b: E| a <= b,
        Operator::Gt => |a: E, b: E| a > b,
        Operator::Ge => |a: E, b: E| a >= b,
        Operator::UnsignedLt => |a: E, b: E| a.to_bits() < b.to_bits(),
        Operator::UnsignedLe => |a: E, b: E| a.to_bits() <= b.to_bits(),
        Operator::UnsignedGt => |a: E, b: E| a.to_bits() > b.to_bits(),
        Operator::UnsignedGe => |a: E, b: E| a.to_bits() >= b.to_bits(),
        _ => return None,
    };
    Some(f)
}

/// Per-lane predicate of a test.
pub(crate) fn test_lane<E: Lane>(op: Operator) -> Option<fn(E) -> bool> {
    let f: fn(E) -> bool = match op {
        Operator::IsDefault => |a: E| a.to_bits() == 0,
        Operator::IsNegative => |a: E| (a.to_bits() >> (E::KIND.bits() - 1)) & 1 == 1,
        Operator::IsFinite => |a: E| a.to_f64().is_finite(),
        Operator::IsNan => |a: E| a.to_f64().is_nan(),
        Operator::IsInfinite => |a: E| a.to_f64().is_infinite(),
        _ => return None,
    };
    Some(f)
}

/// Identity element of a reduction.
pub(crate) fn reduction_identity<E: Lane>(op: Operator) -> Option<E> {
    match op {
        Operator::Add | Operator::Or | Operator::Xor | Operator::FirstNonzero => Some(E::default()),
        Operator::Mul => Some(E::ONE),
        Operator::And => Some(all_ones()),
        Operator::Min => Some(E::MAX_VALUE),
        Operator::Max => Some(E::MIN_VALUE),
        _ => None,
    }
}

/// Accumulation step of a reduction.
pub(crate) fn reduce_lane<E: Lane>(op: Operator) -> Option<fn(E, E) -> E> {
    if op == Operator::FirstNonzero {
        let first: fn(E, E) -> E = |acc, x| if acc.to_bits() == 0 { x } else { acc };
        return Some(first);
    }
    binary_lane(op)
}

pub(crate) fn unary<E: Lane>(op: Operator) -> Option<UnaryImpl<E>> {
    let f = unary_lane::<E>(op)?;
    Some(Arc::new(move |a: &[E], out: &mut [E]| {
        for (o, &x) in out.iter_mut().zip(a) {
            *o = f(x);
        }
    }))
}

pub(crate) fn binary<E: Lane>(op: Operator) -> Option<BinaryImpl<E>> {
    let f = binary_lane::<E>(op)?;
    Some(Arc::new(move |a: &[E], b: &[E], out: &mut [E]| {
        for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
            *o = f(x, y);
        }
    }))
}

pub(crate) fn ternary<E: Lane>(op: Operator) -> Option<TernaryImpl<E>> {
    let f = ternary_lane::<E>(op)?;
    Some(Arc::new(move |a: &[E], b: &[E], c: &[E], out: &mut [E]| {
        for (i, o) in out.iter_mut().enumerate() {
            *o = f(a[i], b[i], c[i]);
        }
    }))
}

pub(crate) fn reduce<E: Lane>(op: Operator) -> Option<ReduceImpl<E>> {
    let f = reduce_lane::<E>(op)?;
    let identity = reduction_identity::<E>(op)?;
    Some(Arc::new(move |a: &[E]| a.iter().fold(identity, |acc, &x| f(acc, x))))
}

pub(crate) fn compare<E: Lane>(op: Operator) -> Option<CompareImpl<E>> {
    let f = compare_lane::<E>(op)?;
    Some(Arc::new(move |a: &[E], b: &[E], out: &mut [bool]| {
        for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
            *o = f(x, y);
        }
    }))
}

pub(crate) fn test<E: Lane>(op: Operator) -> Option<TestImpl<E>> {
    let f = test_lane::<E>(op)?;
    Some(Arc::new(move |a: &[E], out: &mut [bool]| {
        for (o, &x) in out.iter_mut().zip(a) {
            *o = f(x);
        }
    }))
}
