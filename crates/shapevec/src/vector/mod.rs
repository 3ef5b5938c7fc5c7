//! The vector engine.
//!
//! A [`Vector`] is an immutable sequence of lanes tagged with its species.
//! Every operation returns a new vector, and operands must share a species
//! unless the operation converts between them.
//!
//! The operations are split by family:
//!
//! - [`lanewise`]: unary, binary and ternary lane-wise operators, masked
//!   and scalar forms, and the operators the engine emulates;
//! - [`reduce`]: reductions over all or the masked lanes;
//! - [`compare`]: comparisons and lane tests producing masks;
//! - [`rearrange`]: slices, unslices and shuffles.

mod compare;
mod lanewise;
mod rearrange;
mod reduce;

use crate::error::{Result, VectorError};
use crate::lane::{Lane, LaneBuf};
use crate::mask::Mask;
use crate::shape::VectorShape;
use crate::shuffle::{partially_wrap, Shuffle};
use crate::species::{Species, VectorSpecies};
use smallvec::smallvec;
use std::fmt;

/// Lanes of `E` at one species.
pub struct Vector<E: Lane> {
    species: &'static Species,
    lanes: LaneBuf<E>,
}

impl<E: Lane> VectorSpecies<E> {
    /// Vector of zeros.
    #[must_use]
    pub fn zero(self) -> Vector<E> {
        self.broadcast(E::default())
    }

    /// Vector with every lane set to `e`.
    #[must_use]
    pub fn broadcast(self, e: E) -> Vector<E> {
        Vector::from_parts(self.species(), smallvec![e; self.lane_count()])
    }

    /// Vector with every lane set to `value`, which must be exactly
    /// representable as `E`.
    pub fn broadcast_long(self, value: i64) -> Result<Vector<E>> {
        let e = E::from_i64_exact(value).ok_or(VectorError::NotRepresentable {
            value: value.to_string(),
            kind: E::KIND,
        })?;
        Ok(self.broadcast(e))
    }

    /// Vector from exactly `lane_count` values.
    pub fn from_values(self, values: &[E]) -> Result<Vector<E>> {
        if values.len() != self.lane_count() {
            return Err(VectorError::LaneCountMismatch {
                expected: self.lane_count(),
                actual: values.len(),
            });
        }
        Ok(Vector::from_parts(self.species(), LaneBuf::from_slice(values)))
    }

    /// Vector whose lane `i` is `f(i)`.
    pub fn from_fn(self, f: impl FnMut(usize) -> E) -> Vector<E> {
        Vector::from_parts(self.species(), (0..self.lane_count()).map(f).collect())
    }

    /// Vector whose lane `i` is `i`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn iota(self) -> Vector<E> {
        self.from_fn(|i| E::from_i64(i as i64))
    }
}

impl<E: Lane> Vector<E> {
    pub(crate) fn from_parts(species: &'static Species, lanes: LaneBuf<E>) -> Self {
        debug_assert_eq!(lanes.len(), species.lane_count());
        Self { species, lanes }
    }

    pub(crate) fn untyped_species(&self) -> &'static Species {
        self.species
    }

    /// The species of this vector.
    #[must_use]
    pub fn species(&self) -> VectorSpecies<E> {
        VectorSpecies::wrap(self.species)
    }

    /// Vector shape.
    #[must_use]
    pub fn shape(&self) -> VectorShape {
        self.species.shape()
    }

    /// Number of lanes.
    #[must_use]
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Size of one lane in bytes.
    #[must_use]
    pub fn element_size(&self) -> usize {
        self.species.element_size()
    }

    /// Size of the vector in bits.
    #[must_use]
    pub fn bit_size(&self) -> u32 {
        self.species.vector_bit_size()
    }

    /// Size of the vector in bytes.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.species.vector_byte_size()
    }

    /// The lanes as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[E] {
        &self.lanes
    }

    /// The lanes as a `Vec`.
    #[must_use]
    pub fn to_vec(&self) -> Vec<E> {
        self.lanes.to_vec()
    }

    /// The lanes converted to `i64`.
    #[must_use]
    pub fn to_i64_vec(&self) -> Vec<i64> {
        self.lanes.iter().map(|e| e.to_i64()).collect()
    }

    /// The lanes converted to `f64`.
    #[must_use]
    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.lanes.iter().map(|e| e.to_f64()).collect()
    }

    /// Lane `i`.
    pub fn lane(&self, i: usize) -> Result<E> {
        VectorError::check_lane(i, self.lanes.len())?;
        Ok(self.lanes[i])
    }

    /// Copy of this vector with lane `i` replaced by `e`.
    pub fn with_lane(&self, i: usize, e: E) -> Result<Self> {
        VectorError::check_lane(i, self.lanes.len())?;
        let mut lanes = self.lanes.clone();
        lanes[i] = e;
        Ok(Self::from_parts(self.species, lanes))
    }

    /// Vector of this species with every lane set to `e`.
    #[must_use]
    pub fn broadcast(&self, e: E) -> Self {
        self.species().broadcast(e)
    }

    pub(crate) fn zero_like(&self) -> Self {
        self.species().zero()
    }

    pub(crate) fn check_species(&self, other: &Self) -> Result<()> {
        self.species.check(other.species)
    }

    /// Lanes of `v` where `m` is set, lanes of this vector elsewhere.
    pub fn blend(&self, v: &Self, m: &Mask<E>) -> Result<Self> {
        self.check_species(v)?;
        m.check(self.species)?;
        let lanes = self
            .lanes
            .iter()
            .zip(&v.lanes)
            .zip(m.as_slice())
            .map(|((&a, &b), &set)| if set { b } else { a })
            .collect();
        Ok(Self::from_parts(self.species, lanes))
    }

    /// `e` where `m` is set, lanes of this vector elsewhere.
    pub fn blend_scalar(&self, e: E, m: &Mask<E>) -> Result<Self> {
        self.blend(&self.broadcast(e), m)
    }

    /// Add `i * scale` to lane `i`. Fails if a product does not fit `E`.
    #[allow(clippy::cast_possible_wrap)]
    pub fn add_index(&self, scale: i64) -> Result<Self> {
        let offsets = (0..self.lanes.len())
            .map(|i| {
                (i as i64)
                    .checked_mul(scale)
                    .and_then(E::from_i64_exact)
                    .ok_or_else(|| VectorError::NotRepresentable {
                        value: format!("{i} * {scale}"),
                        kind: E::KIND,
                    })
            })
            .collect::<Result<LaneBuf<E>>>()?;
        self.add(&Self::from_parts(self.species, offsets))
    }

    /// Shuffle whose entry `i` is lane `i` converted to an integer and
    /// partially wrapped.
    #[must_use]
    pub fn to_shuffle(&self) -> Shuffle<E> {
        let n = self.lanes.len();
        let indexes = self
            .lanes
            .iter()
            .map(|e| partially_wrap(e.to_i64(), n))
            .collect();
        Shuffle::from_parts(self.species, indexes)
    }
}

impl<E: Lane> Clone for Vector<E> {
    fn clone(&self) -> Self {
        Self::from_parts(self.species, self.lanes.clone())
    }
}

impl<E: Lane> PartialEq for Vector<E> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.species, other.species) && self.lanes == other.lanes
    }
}

impl<E: Lane> fmt::Debug for Vector<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector<{}>{:?}", self.species, self.lanes.as_slice())
    }
}

impl<E: Lane> fmt::Display for Vector<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, e) in self.lanes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{e}")?;
        }
        f.write_str("]")
    }
}
