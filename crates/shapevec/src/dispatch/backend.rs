//! Execution backends.
//!
//! A backend may take over a lane-wise operation for species it knows how
//! to accelerate. Every method returns `false` (the default) to decline,
//! in which case the scalar fallback runs. A backend that accepts must
//! produce output bit-identical to the fallback.

use crate::operator::Operator;
use crate::species::Species;

/// Borrowed lanes of any kind.
#[derive(Clone, Copy, Debug)]
pub enum LaneSlice<'a> {
    /// `i8` lanes.
    I8(&'a [i8]),
    /// `i16` lanes.
    I16(&'a [i16]),
    /// `i32` lanes.
    I32(&'a [i32]),
    /// `i64` lanes.
    I64(&'a [i64]),
    /// `f32` lanes.
    F32(&'a [f32]),
    /// `f64` lanes.
    F64(&'a [f64]),
}

/// Mutably borrowed lanes of any kind.
#[derive(Debug)]
pub enum LaneSliceMut<'a> {
    /// `i8` lanes.
    I8(&'a mut [i8]),
    /// `i16` lanes.
    I16(&'a mut [i16]),
    /// `i32` lanes.
    I32(&'a mut [i32]),
    /// `i64` lanes.
    I64(&'a mut [i64]),
    /// `f32` lanes.
    F32(&'a mut [f32]),
    /// `f64` lanes.
    F64(&'a mut [f64]),
}

/// An execution backend.
pub trait Backend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &'static str;

    /// Check if this backend can run on the host.
    fn is_available(&self) -> bool;

    /// Check if the backend accelerates `op` for `species`.
    fn supports(&self, op: Operator, species: &Species) -> bool;

    /// Run a unary operator into `out`.
    fn unary(
        &self,
        _op: Operator,
        _species: &Species,
        _a: LaneSlice<'_>,
        _out: LaneSliceMut<'_>,
    ) -> bool {
        false
    }

    /// Run a binary operator into `out`.
    fn binary(
        &self,
        _op: Operator,
        _species: &Species,
        _a: LaneSlice<'_>,
        _b: LaneSlice<'_>,
        _out: LaneSliceMut<'_>,
    ) -> bool {
        false
    }

    /// Run a ternary operator into `out`.
    fn ternary(
        &self,
        _op: Operator,
        _species: &Species,
        _a: LaneSlice<'_>,
        _b: LaneSlice<'_>,
        _c: LaneSlice<'_>,
        _out: LaneSliceMut<'_>,
    ) -> bool {
        false
    }

    /// Reduce `a` into the single lane of `out`.
    fn reduce(
        &self,
        _op: Operator,
        _species: &Species,
        _a: LaneSlice<'_>,
        _out: LaneSliceMut<'_>,
    ) -> bool {
        false
    }

    /// Compare `a` with `b` into `out`.
    fn compare(
        &self,
        _op: Operator,
        _species: &Species,
        _a: LaneSlice<'_>,
        _b: LaneSlice<'_>,
        _out: &mut [bool],
    ) -> bool {
        false
    }

    /// Test `a` into `out`.
    fn test(&self, _op: Operator, _species: &Species, _a: LaneSlice<'_>, _out: &mut [bool]) -> bool {
        false
    }
}

/// The backend that always declines, leaving every operation to the scalar
/// fallbacks.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScalarBackend;

impl ScalarBackend {
    /// Create the scalar backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Backend for ScalarBackend {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn supports(&self, _op: Operator, _species: &Species) -> bool {
        false
    }
}
