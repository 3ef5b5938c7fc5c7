//! SSE2 / AVX / AVX2 backend for x86_64.

use super::backend::{Backend, LaneSlice, LaneSliceMut};
use crate::operator::Operator;
use crate::species::Species;
use std::arch::x86_64::*;

/// Accelerates lane-wise arithmetic with 128-bit SSE2 registers, or 256-bit
/// AVX / AVX2 registers when the CPU has them.
///
/// Intercepts `ADD SUB MUL DIV` on floating lanes and `ADD SUB AND OR XOR`
/// on integral lanes, for species of at least 128 bits.
#[derive(Clone, Copy, Debug)]
pub struct X86Backend {
    avx: bool,
    avx2: bool,
}

#[derive(Clone, Copy, Debug)]
enum FloatOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Clone, Copy, Debug)]
enum IntOp {
    Add,
    Sub,
    And,
    Or,
    Xor,
}

const fn float_op(op: Operator) -> Option<FloatOp> {
    match op {
        Operator::Add => Some(FloatOp::Add),
        Operator::Sub => Some(FloatOp::Sub),
        Operator::Mul => Some(FloatOp::Mul),
        Operator::Div => Some(FloatOp::Div),
        _ => None,
    }
}

const fn int_op(op: Operator) -> Option<IntOp> {
    match op {
        Operator::Add => Some(IntOp::Add),
        Operator::Sub => Some(IntOp::Sub),
        Operator::And => Some(IntOp::And),
        Operator::Or => Some(IntOp::Or),
        Operator::Xor => Some(IntOp::Xor),
        _ => None,
    }
}

impl X86Backend {
    /// Use the widest registers the running CPU supports.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            avx: is_x86_feature_detected!("avx"),
            avx2: is_x86_feature_detected!("avx2"),
        }
    }

    /// Use 128-bit SSE2 registers only.
    #[must_use]
    pub const fn sse2() -> Self {
        Self {
            avx: false,
            avx2: false,
        }
    }

    fn binary_f32(self, op: FloatOp, a: &[f32], b: &[f32], out: &mut [f32]) -> bool {
        let bytes = std::mem::size_of_val(out);
        // SAFETY: all three slices have the same length, a whole number of
        // registers, and the feature checks happened at construction.
        unsafe {
            if self.avx && bytes % 32 == 0 {
                f32_avx(op, a, b, out);
            } else if bytes % 16 == 0 {
                f32_sse(op, a, b, out);
            } else {
                return false;
            }
        }
        true
    }

    fn binary_f64(self, op: FloatOp, a: &[f64], b: &[f64], out: &mut [f64]) -> bool {
        let bytes = std::mem::size_of_val(out);
        // SAFETY: as in `binary_f32`.
        unsafe {
            if self.avx && bytes % 32 == 0 {
                f64_avx(op, a, b, out);
            } else if bytes % 16 == 0 {
                f64_sse(op, a, b, out);
            } else {
                return false;
            }
        }
        true
    }

    fn binary_int<T: Copy>(self, op: IntOp, a: &[T], b: &[T], out: &mut [T]) -> bool {
        let lane_bits = std::mem::size_of::<T>() * 8;
        let bytes = std::mem::size_of_val(out);
        let (a, b, out) = (a.as_ptr().cast::<u8>(), b.as_ptr().cast::<u8>(), out.as_mut_ptr().cast::<u8>());
        // SAFETY: the pointers cover `bytes` bytes each, `bytes` is a whole
        // number of registers, and the feature checks happened at
        // construction.
        unsafe {
            if self.avx2 && bytes % 32 == 0 {
                int_avx2(op, lane_bits, a, b, out, bytes);
            } else if bytes % 16 == 0 {
                int_sse2(op, lane_bits, a, b, out, bytes);
            } else {
                return false;
            }
        }
        true
    }
}

impl Backend for X86Backend {
    fn name(&self) -> &'static str {
        if self.avx2 {
            "x86_64-avx2"
        } else if self.avx {
            "x86_64-avx"
        } else {
            "x86_64-sse2"
        }
    }

    fn is_available(&self) -> bool {
        (!self.avx || is_x86_feature_detected!("avx"))
            && (!self.avx2 || is_x86_feature_detected!("avx2"))
    }

    fn supports(&self, op: Operator, species: &Species) -> bool {
        if op.is_special() || species.vector_byte_size() % 16 != 0 {
            return false;
        }
        if species.kind().is_floating() {
            float_op(op).is_some()
        } else {
            int_op(op).is_some()
        }
    }

    fn binary(
        &self,
        op: Operator,
        species: &Species,
        a: LaneSlice<'_>,
        b: LaneSlice<'_>,
        out: LaneSliceMut<'_>,
    ) -> bool {
        if !self.supports(op, species) {
            return false;
        }
        match (a, b, out) {
            (LaneSlice::F32(a), LaneSlice::F32(b), LaneSliceMut::F32(out))
                if a.len() == out.len() && b.len() == out.len() =>
            {
                float_op(op).is_some_and(|op| self.binary_f32(op, a, b, out))
            }
            (LaneSlice::F64(a), LaneSlice::F64(b), LaneSliceMut::F64(out))
                if a.len() == out.len() && b.len() == out.len() =>
            {
                float_op(op).is_some_and(|op| self.binary_f64(op, a, b, out))
            }
            (LaneSlice::I8(a), LaneSlice::I8(b), LaneSliceMut::I8(out))
                if a.len() == out.len() && b.len() == out.len() =>
            {
                int_op(op).is_some_and(|op| self.binary_int(op, a, b, out))
            }
            (LaneSlice::I16(a), LaneSlice::I16(b), LaneSliceMut::I16(out))
                if a.len() == out.len() && b.len() == out.len() =>
            {
                int_op(op).is_some_and(|op| self.binary_int(op, a, b, out))
            }
            (LaneSlice::I32(a), LaneSlice::I32(b), LaneSliceMut::I32(out))
                if a.len() == out.len() && b.len() == out.len() =>
            {
                int_op(op).is_some_and(|op| self.binary_int(op, a, b, out))
            }
            (LaneSlice::I64(a), LaneSlice::I64(b), LaneSliceMut::I64(out))
                if a.len() == out.len() && b.len() == out.len() =>
            {
                int_op(op).is_some_and(|op| self.binary_int(op, a, b, out))
            }
            _ => false,
        }
    }
}

#[target_feature(enable = "sse2")]
unsafe fn f32_sse(op: FloatOp, a: &[f32], b: &[f32], out: &mut [f32]) {
    for i in (0..out.len()).step_by(4) {
        let x = _mm_loadu_ps(a.as_ptr().add(i));
        let y = _mm_loadu_ps(b.as_ptr().add(i));
        let r = match op {
            FloatOp::Add => _mm_add_ps(x, y),
            FloatOp::Sub => _mm_sub_ps(x, y),
            FloatOp::Mul => _mm_mul_ps(x, y),
            FloatOp::Div => _mm_div_ps(x, y),
        };
        _mm_storeu_ps(out.as_mut_ptr().add(i), r);
    }
}

#[target_feature(enable = "avx")]
unsafe fn f32_avx(op: FloatOp, a: &[f32], b: &[f32], out: &mut [f32]) {
    for i in (0..out.len()).step_by(8) {
        let x = _mm256_loadu_ps(a.as_ptr().add(i));
        let y = _mm256_loadu_ps(b.as_ptr().add(i));
        let r = match op {
            FloatOp::Add => _mm256_add_ps(x, y),
            FloatOp::Sub => _mm256_sub_ps(x, y),
            FloatOp::Mul => _mm256_mul_ps(x, y),
            FloatOp::Div => _mm256_div_ps(x, y),
        };
        _mm256_storeu_ps(out.as_mut_ptr().add(i), r);
    }
}

#[target_feature(enable = "sse2")]
unsafe fn f64_sse(op: FloatOp, a: &[f64], b: &[f64], out: &mut [f64]) {
    for i in (0..out.len()).step_by(2) {
        let x = _mm_loadu_pd(a.as_ptr().add(i));
        let y = _mm_loadu_pd(b.as_ptr().add(i));
        let r = match op {
            FloatOp::Add => _mm_add_pd(x, y),
            FloatOp::Sub => _mm_sub_pd(x, y),
            FloatOp::Mul => _mm_mul_pd(x, y),
            FloatOp::Div => _mm_div_pd(x, y),
        };
        _mm_storeu_pd(out.as_mut_ptr().add(i), r);
    }
}

#[target_feature(enable = "avx")]
unsafe fn f64_avx(op: FloatOp, a: &[f64], b: &[f64], out: &mut [f64]) {
    for i in (0..out.len()).step_by(4) {
        let x = _mm256_loadu_pd(a.as_ptr().add(i));
        let y = _mm256_loadu_pd(b.as_ptr().add(i));
        let r = match op {
            FloatOp::Add => _mm256_add_pd(x, y),
            FloatOp::Sub => _mm256_sub_pd(x, y),
            FloatOp::Mul => _mm256_mul_pd(x, y),
            FloatOp::Div => _mm256_div_pd(x, y),
        };
        _mm256_storeu_pd(out.as_mut_ptr().add(i), r);
    }
}

#[target_feature(enable = "sse2")]
unsafe fn int_sse2(op: IntOp, lane_bits: usize, a: *const u8, b: *const u8, out: *mut u8, bytes: usize) {
    for i in (0..bytes).step_by(16) {
        let x = _mm_loadu_si128(a.add(i).cast());
        let y = _mm_loadu_si128(b.add(i).cast());
        let r = match (op, lane_bits) {
            (IntOp::Add, 8) => _mm_add_epi8(x, y),
            (IntOp::Add, 16) => _mm_add_epi16(x, y),
            (IntOp::Add, 32) => _mm_add_epi32(x, y),
            (IntOp::Add, _) => _mm_add_epi64(x, y),
            (IntOp::Sub, 8) => _mm_sub_epi8(x, y),
            (IntOp::Sub, 16) => _mm_sub_epi16(x, y),
            (IntOp::Sub, 32) => _mm_sub_epi32(x, y),
            (IntOp::Sub, _) => _mm_sub_epi64(x, y),
            (IntOp::And, _) => _mm_and_si128(x, y),
            (IntOp::Or, _) => _mm_or_si128(x, y),
            (IntOp::Xor, _) => _mm_xor_si128(x, y),
        };
        _mm_storeu_si128(out.add(i).cast(), r);
    }
}

#[target_feature(enable = "avx2")]
unsafe fn int_avx2(op: IntOp, lane_bits: usize, a: *const u8, b: *const u8, out: *mut u8, bytes: usize) {
    for i in (0..bytes).step_by(32) {
        let x = _mm256_loadu_si256(a.add(i).cast());
        let y = _mm256_loadu_si256(b.add(i).cast());
        let r = match (op, lane_bits) {
            (IntOp::Add, 8) => _mm256_add_epi8(x, y),
            (IntOp::Add, 16) => _mm256_add_epi16(x, y),
            (IntOp::Add, 32) => _mm256_add_epi32(x, y),
            (IntOp::Add, _) => _mm256_add_epi64(x, y),
            (IntOp::Sub, 8) => _mm256_sub_epi8(x, y),
            (IntOp::Sub, 16) => _mm256_sub_epi16(x, y),
            (IntOp::Sub, 32) => _mm256_sub_epi32(x, y),
            (IntOp::Sub, _) => _mm256_sub_epi64(x, y),
            (IntOp::And, _) => _mm256_and_si256(x, y),
            (IntOp::Or, _) => _mm256_or_si256(x, y),
            (IntOp::Xor, _) => _mm256_xor_si256(x, y),
        };
        _mm256_storeu_si256(out.add(i).cast(), r);
    }
}
