//! Lane kinds and the [`Lane`] trait tying them to Rust primitives.
//!
//! | Kind | Rust type | Bits | Integral |
//! |------|-----------|------|----------|
//! | `I8` | `i8` | 8 | yes |
//! | `I16` | `i16` | 16 | yes |
//! | `I32` | `i32` | 32 | yes |
//! | `I64` | `i64` | 64 | yes |
//! | `F32` | `f32` | 32 | no |
//! | `F64` | `f64` | 64 | no |

use crate::dispatch::{Kernels, LaneSlice, LaneSliceMut};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::sync::OnceLock;

/// Inline storage for the lanes of one vector.
pub type LaneBuf<E> = SmallVec<[E; 16]>;

/// Primitive numeric kind of a lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneKind {
    /// 8-bit signed integer.
    I8,
    /// 16-bit signed integer.
    I16,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// 32-bit IEEE 754 float.
    F32,
    /// 64-bit IEEE 754 float.
    F64,
}

impl LaneKind {
    /// Every lane kind, in registry order.
    pub const ALL: [Self; 6] = [Self::I8, Self::I16, Self::I32, Self::I64, Self::F32, Self::F64];

    /// Position of this kind in [`LaneKind::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::I8 => 0,
            Self::I16 => 1,
            Self::I32 => 2,
            Self::I64 => 3,
            Self::F32 => 4,
            Self::F64 => 5,
        }
    }

    /// Width of one lane in bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::I8 => 8,
            Self::I16 => 16,
            Self::I32 | Self::F32 => 32,
            Self::I64 | Self::F64 => 64,
        }
    }

    /// Width of one lane in bytes.
    #[must_use]
    pub const fn bytes(self) -> usize {
        (self.bits() / 8) as usize
    }

    /// Base-2 logarithm of [`LaneKind::bits`].
    #[must_use]
    pub const fn bits_log2(self) -> u32 {
        self.bits().trailing_zeros()
    }

    /// Returns true for `F32` and `F64`.
    #[must_use]
    pub const fn is_floating(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Returns true for the integer kinds.
    #[must_use]
    pub const fn is_integral(self) -> bool {
        !self.is_floating()
    }

    /// Every supported kind is signed.
    #[must_use]
    pub const fn is_signed(self) -> bool {
        true
    }

    /// The integral kind of the same width.
    #[must_use]
    pub const fn integral(self) -> Self {
        match self {
            Self::F32 => Self::I32,
            Self::F64 => Self::I64,
            other => other,
        }
    }

    /// Get the name of this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}

impl fmt::Display for LaneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A Rust primitive that can occupy a vector lane.
///
/// The trait is sealed: it is implemented for `i8`, `i16`, `i32`, `i64`,
/// `f32` and `f64` only. Besides naming the [`LaneKind`], it supplies the
/// conversions every scalar fallback is written in terms of:
///
/// - raw bits (`to_bits`/`from_bits`), zero-extended into a `u64`;
/// - numeric values (`to_i64`/`to_f64`, `from_i64`/`from_f64`), with
///   wrapping narrowing for integers and saturating float-to-integer
///   conversion (NaN becomes 0);
/// - per-lane arithmetic whose integer forms wrap on overflow.
pub trait Lane:
    sealed::Sealed
    + Copy
    + Default
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + 'static
{
    /// The kind of this lane type.
    const KIND: LaneKind;

    /// Largest value, or `+inf` for floats. Identity of `MIN`.
    const MAX_VALUE: Self;

    /// Smallest value, or `-inf` for floats. Identity of `MAX`.
    const MIN_VALUE: Self;

    /// The value one.
    const ONE: Self;

    /// Integral lane type of the same width.
    type Integral: Lane;

    /// Floating lane type of the same width. `i8` and `i16` have none and
    /// name `f32`, which never matches their width.
    type Floating: Lane;

    /// Raw bit pattern, zero-extended.
    fn to_bits(self) -> u64;

    /// Lane from the low bits of `bits`.
    fn from_bits(bits: u64) -> Self;

    /// Numeric value as `i64`.
    fn to_i64(self) -> i64;

    /// Numeric value as `f64`.
    fn to_f64(self) -> f64;

    /// Lane from an `i64`, wrapping or rounding as the kind requires.
    fn from_i64(value: i64) -> Self;

    /// Lane from an `f64`.
    fn from_f64(value: f64) -> Self;

    /// Lane from an `i64` only if the value survives the round trip.
    fn from_i64_exact(value: i64) -> Option<Self> {
        let lane = Self::from_i64(value);
        (lane.to_i64() == value).then_some(lane)
    }

    /// Read one lane from the start of `bytes` in native byte order.
    fn read_ne(bytes: &[u8]) -> Self;

    /// Write this lane to the start of `out` in native byte order.
    fn write_ne(self, out: &mut [u8]);

    /// Reverse the byte order of this lane.
    #[must_use]
    fn swap_lane_bytes(self) -> Self;

    /// Wrapping (integral) or IEEE (floating) addition.
    #[must_use]
    fn lane_add(self, rhs: Self) -> Self;

    /// Wrapping or IEEE subtraction.
    #[must_use]
    fn lane_sub(self, rhs: Self) -> Self;

    /// Wrapping or IEEE multiplication.
    #[must_use]
    fn lane_mul(self, rhs: Self) -> Self;

    /// Wrapping or IEEE division. Integral zero divisors yield zero; the
    /// engine rejects them before a kernel ever runs.
    #[must_use]
    fn lane_div(self, rhs: Self) -> Self;

    /// Minimum; floats propagate NaN and order `-0.0` below `+0.0`.
    #[must_use]
    fn lane_min(self, rhs: Self) -> Self;

    /// Maximum; floats propagate NaN and order `-0.0` below `+0.0`.
    #[must_use]
    fn lane_max(self, rhs: Self) -> Self;

    /// Wrapping negation, or sign flip for floats.
    #[must_use]
    fn lane_neg(self) -> Self;

    /// Wrapping absolute value.
    #[must_use]
    fn lane_abs(self) -> Self;

    /// `self * b + c`, fused for floats.
    #[must_use]
    fn lane_fma(self, b: Self, c: Self) -> Self;

    #[doc(hidden)]
    fn lanes(slice: &[Self]) -> LaneSlice<'_>;

    #[doc(hidden)]
    fn lanes_mut(slice: &mut [Self]) -> LaneSliceMut<'_>;

    #[doc(hidden)]
    fn kernels() -> &'static Kernels<Self>;
}

macro_rules! impl_common_lane {
    ($t:ty, $variant:ident) => {
        fn read_ne(bytes: &[u8]) -> Self {
            let mut raw = [0u8; std::mem::size_of::<$t>()];
            raw.copy_from_slice(&bytes[..std::mem::size_of::<$t>()]);
            <$t>::from_ne_bytes(raw)
        }

        fn write_ne(self, out: &mut [u8]) {
            out[..std::mem::size_of::<$t>()].copy_from_slice(&self.to_ne_bytes());
        }

        fn lanes(slice: &[Self]) -> LaneSlice<'_> {
            LaneSlice::$variant(slice)
        }

        fn lanes_mut(slice: &mut [Self]) -> LaneSliceMut<'_> {
            LaneSliceMut::$variant(slice)
        }

        fn kernels() -> &'static Kernels<Self> {
            static KERNELS: OnceLock<Kernels<$t>> = OnceLock::new();
            KERNELS.get_or_init(Kernels::new)
        }
    };
}

macro_rules! impl_integral_lane {
    ($t:ty, $u:ty, $wide:ty, $float:ty, $kind:ident) => {
        impl sealed::Sealed for $t {}

        impl Lane for $t {
            const KIND: LaneKind = LaneKind::$kind;
            const MAX_VALUE: Self = <$t>::MAX;
            const MIN_VALUE: Self = <$t>::MIN;
            const ONE: Self = 1;

            type Integral = $t;
            type Floating = $float;

            fn to_bits(self) -> u64 {
                u64::from(self as $u)
            }

            fn from_bits(bits: u64) -> Self {
                bits as $u as $t
            }

            fn to_i64(self) -> i64 {
                i64::from(self)
            }

            #[allow(clippy::cast_precision_loss)]
            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_i64(value: i64) -> Self {
                value as $t
            }

            fn from_f64(value: f64) -> Self {
                // Saturate to the wide integer first, then narrow by wrapping.
                (value as $wide) as $t
            }

            fn swap_lane_bytes(self) -> Self {
                self.swap_bytes()
            }

            fn lane_add(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }

            fn lane_sub(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }

            fn lane_mul(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }

            fn lane_div(self, rhs: Self) -> Self {
                if rhs == 0 {
                    0
                } else {
                    self.wrapping_div(rhs)
                }
            }

            fn lane_min(self, rhs: Self) -> Self {
                Ord::min(self, rhs)
            }

            fn lane_max(self, rhs: Self) -> Self {
                Ord::max(self, rhs)
            }

            fn lane_neg(self) -> Self {
                self.wrapping_neg()
            }

            fn lane_abs(self) -> Self {
                self.wrapping_abs()
            }

            fn lane_fma(self, b: Self, c: Self) -> Self {
                self.wrapping_mul(b).wrapping_add(c)
            }

            impl_common_lane!($t, $kind);
        }
    };
}

macro_rules! impl_floating_lane {
    ($t:ty, $int:ty, $kind:ident) => {
        impl sealed::Sealed for $t {}

        impl Lane for $t {
            const KIND: LaneKind = LaneKind::$kind;
            const MAX_VALUE: Self = <$t>::INFINITY;
            const MIN_VALUE: Self = <$t>::NEG_INFINITY;
            const ONE: Self = 1.0;

            type Integral = $int;
            type Floating = $t;

            fn to_bits(self) -> u64 {
                u64::from(<$t>::to_bits(self))
            }

            #[allow(clippy::cast_possible_truncation)]
            fn from_bits(bits: u64) -> Self {
                <$t>::from_bits(bits as _)
            }

            #[allow(clippy::cast_possible_truncation)]
            fn to_i64(self) -> i64 {
                self as i64
            }

            fn to_f64(self) -> f64 {
                f64::from(self)
            }

            #[allow(clippy::cast_precision_loss)]
            fn from_i64(value: i64) -> Self {
                value as $t
            }

            #[allow(clippy::cast_possible_truncation)]
            fn from_f64(value: f64) -> Self {
                value as $t
            }

            fn swap_lane_bytes(self) -> Self {
                <$t>::from_bits(<$t>::to_bits(self).swap_bytes())
            }

            fn lane_add(self, rhs: Self) -> Self {
                self + rhs
            }

            fn lane_sub(self, rhs: Self) -> Self {
                self - rhs
            }

            fn lane_mul(self, rhs: Self) -> Self {
                self * rhs
            }

            fn lane_div(self, rhs: Self) -> Self {
                self / rhs
            }

            fn lane_min(self, rhs: Self) -> Self {
                if self.is_nan() {
                    self
                } else if rhs.is_nan() {
                    rhs
                } else if self == 0.0 && rhs == 0.0 {
                    if self.is_sign_negative() {
                        self
                    } else {
                        rhs
                    }
                } else if self <= rhs {
                    self
                } else {
                    rhs
                }
            }

            fn lane_max(self, rhs: Self) -> Self {
                if self.is_nan() {
                    self
                } else if rhs.is_nan() {
                    rhs
                } else if self == 0.0 && rhs == 0.0 {
                    if self.is_sign_negative() {
                        rhs
                    } else {
                        self
                    }
                } else if self >= rhs {
                    self
                } else {
                    rhs
                }
            }

            fn lane_neg(self) -> Self {
                -self
            }

            fn lane_abs(self) -> Self {
                self.abs()
            }

            fn lane_fma(self, b: Self, c: Self) -> Self {
                self.mul_add(b, c)
            }

            impl_common_lane!($t, $kind);
        }
    };
}

impl_integral_lane!(i8, u8, i32, f32, I8);
impl_integral_lane!(i16, u16, i32, f32, I16);
impl_integral_lane!(i32, u32, i32, f32, I32);
impl_integral_lane!(i64, u64, i64, f64, I64);
impl_floating_lane!(f32, i32, F32);
impl_floating_lane!(f64, i64, F64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_sizes() {
        assert_eq!(LaneKind::I8.bits(), 8);
        assert_eq!(LaneKind::F64.bytes(), 8);
        assert_eq!(LaneKind::I16.bits_log2(), 4);
        assert!(LaneKind::F32.is_floating());
        assert!(LaneKind::I64.is_integral());
        assert_eq!(LaneKind::F32.integral(), LaneKind::I32);
    }

    #[test]
    fn test_kind_index_matches_all() {
        for (i, kind) in LaneKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_bits_are_zero_extended() {
        assert_eq!((-1i8).to_bits(), 0xff);
        assert_eq!((-1i32).to_bits(), 0xffff_ffff);
        assert_eq!(i16::from_bits(0x1_8000), i16::MIN);
        assert_eq!((-0.0f32).to_bits(), 0x8000_0000);
    }

    #[test]
    fn test_float_to_int_saturates_then_wraps() {
        assert_eq!(i32::from_f64(1e20), i32::MAX);
        assert_eq!(i32::from_f64(f64::NAN), 0);
        // 300 saturates nowhere as an i32, then wraps into the byte.
        assert_eq!(i8::from_f64(300.0), 44);
        assert_eq!(i8::from_f64(1e20), -1);
    }

    #[test]
    fn test_exact_conversion() {
        assert_eq!(i8::from_i64_exact(127), Some(127));
        assert_eq!(i8::from_i64_exact(128), None);
        assert_eq!(f64::from_i64_exact(1 << 53), Some(9_007_199_254_740_992.0));
        assert_eq!(f32::from_i64_exact((1 << 24) + 1), None);
    }

    #[test]
    fn test_float_min_max_ordering() {
        assert!(f32::NAN.lane_min(1.0).is_nan());
        assert!(1.0f64.lane_max(f64::NAN).is_nan());
        assert!(0.0f32.lane_min(-0.0).is_sign_negative());
        assert!((-0.0f64).lane_max(0.0).is_sign_positive());
    }

    #[test]
    fn test_integral_wrapping() {
        assert_eq!(i8::MAX.lane_add(1), i8::MIN);
        assert_eq!(i32::MIN.lane_abs(), i32::MIN);
        assert_eq!(i64::MIN.lane_div(-1), i64::MIN);
    }

    #[test]
    fn test_native_bytes_round_trip() {
        let mut buf = [0u8; 8];
        0x0102_0304i32.write_ne(&mut buf);
        assert_eq!(i32::read_ne(&buf), 0x0102_0304);
        assert_eq!(0x0102_0304i32.swap_lane_bytes(), 0x0403_0201);
    }
}
