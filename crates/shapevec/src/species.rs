//! The species registry.
//!
//! A species pairs a [`LaneKind`] with a [`VectorShape`]. There is exactly one
//! [`Species`] value per pair in the process, so species identity is pointer
//! identity. [`VectorSpecies`] is the typed handle the rest of the API works
//! with.

use crate::error::{Result, VectorError};
use crate::lane::{Lane, LaneKind};
use crate::shape::VectorShape;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::sync::OnceLock;

/// Value identity of a species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpeciesId {
    /// Lane kind.
    pub kind: LaneKind,
    /// Vector shape.
    pub shape: VectorShape,
}

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lanes = self.shape.lane_count(self.kind);
        write!(f, "{}x{} ({})", self.kind, lanes, self.shape)
    }
}

/// A lane kind at a vector shape.
#[derive(Debug)]
pub struct Species {
    id: SpeciesId,
    bits: u32,
    lane_count: usize,
}

static REGISTRY: [[OnceLock<Species>; VectorShape::ALL.len()]; LaneKind::ALL.len()] =
    [const { [const { OnceLock::new() }; VectorShape::ALL.len()] }; LaneKind::ALL.len()];

impl Species {
    /// The canonical species for `kind` and `shape`.
    ///
    /// Fails if the shape does not hold a whole, positive number of lanes.
    pub fn resolve(kind: LaneKind, shape: VectorShape) -> Result<&'static Self> {
        let bits = shape.bit_size();
        if bits < kind.bits() || bits % kind.bits() != 0 {
            return Err(VectorError::UnsupportedSpecies { kind, bits });
        }
        Ok(REGISTRY[kind.index()][shape.index()].get_or_init(|| {
            let species = Self {
                id: SpeciesId { kind, shape },
                bits,
                lane_count: (bits / kind.bits()) as usize,
            };
            tracing::debug!(species = %species, "registered species");
            species
        }))
    }

    /// Every species the platform supports.
    pub fn all() -> impl Iterator<Item = &'static Self> {
        LaneKind::ALL.into_iter().flat_map(|kind| {
            VectorShape::ALL
                .into_iter()
                .filter_map(move |shape| Self::resolve(kind, shape).ok())
        })
    }

    /// Value identity of this species.
    #[must_use]
    pub const fn id(&self) -> SpeciesId {
        self.id
    }

    /// Lane kind.
    #[must_use]
    pub const fn kind(&self) -> LaneKind {
        self.id.kind
    }

    /// Vector shape.
    #[must_use]
    pub const fn shape(&self) -> VectorShape {
        self.id.shape
    }

    /// Number of lanes.
    #[must_use]
    pub const fn lane_count(&self) -> usize {
        self.lane_count
    }

    /// Size of one lane in bits.
    #[must_use]
    pub const fn element_bits(&self) -> u32 {
        self.id.kind.bits()
    }

    /// Size of one lane in bytes.
    #[must_use]
    pub const fn element_size(&self) -> usize {
        self.id.kind.bytes()
    }

    /// Size of the whole vector in bits.
    #[must_use]
    pub const fn vector_bit_size(&self) -> u32 {
        self.bits
    }

    /// Size of the whole vector in bytes.
    #[must_use]
    pub const fn vector_byte_size(&self) -> usize {
        (self.bits / 8) as usize
    }

    /// Base-2 logarithm of the vector bit size.
    #[must_use]
    pub fn vector_bit_size_log2(&self) -> u32 {
        debug_assert!(self.bits.is_power_of_two());
        self.bits.trailing_zeros()
    }

    /// Same shape, other lane kind.
    pub fn with_kind(&self, kind: LaneKind) -> Result<&'static Self> {
        Self::resolve(kind, self.shape())
    }

    /// Same lane kind, other shape.
    pub fn with_shape(&self, shape: VectorShape) -> Result<&'static Self> {
        Self::resolve(self.kind(), shape)
    }

    /// Fail unless `other` is this species.
    pub fn check(&self, other: &Self) -> Result<()> {
        if std::ptr::eq(self, other) {
            Ok(())
        } else {
            Err(VectorError::SpeciesMismatch {
                expected: self.id,
                found: other.id,
            })
        }
    }
}

impl PartialEq for Species {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Species {}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} ({})", self.kind(), self.lane_count, self.shape())
    }
}

/// Typed handle on the species of `E` lanes at one shape.
pub struct VectorSpecies<E: Lane> {
    species: &'static Species,
    _lane: PhantomData<fn() -> E>,
}

impl<E: Lane> VectorSpecies<E> {
    /// The species of `E` lanes at `shape`.
    pub fn of(shape: VectorShape) -> Result<Self> {
        Species::resolve(E::KIND, shape).map(Self::wrap)
    }

    /// The species of `E` lanes at the preferred shape.
    pub fn preferred() -> Result<Self> {
        Self::of(VectorShape::preferred())
    }

    /// The species of `E` lanes at the widest shape for `E`.
    pub fn largest() -> Result<Self> {
        Self::of(VectorShape::largest_for(E::KIND))
    }

    /// Typed view of an untyped species.
    pub fn from_species(species: &'static Species) -> Result<Self> {
        if species.kind() == E::KIND {
            Ok(Self::wrap(species))
        } else {
            Err(VectorError::SpeciesMismatch {
                expected: SpeciesId {
                    kind: E::KIND,
                    shape: species.shape(),
                },
                found: species.id(),
            })
        }
    }

    pub(crate) const fn wrap(species: &'static Species) -> Self {
        Self {
            species,
            _lane: PhantomData,
        }
    }

    /// The untyped species.
    #[must_use]
    pub const fn species(self) -> &'static Species {
        self.species
    }

    /// Vector shape.
    #[must_use]
    pub const fn shape(self) -> VectorShape {
        self.species.shape()
    }

    /// Number of lanes.
    #[must_use]
    pub const fn lane_count(self) -> usize {
        self.species.lane_count()
    }

    /// Size of one lane in bytes.
    #[must_use]
    pub const fn element_size(self) -> usize {
        self.species.element_size()
    }

    /// Size of the whole vector in bits.
    #[must_use]
    pub const fn vector_bit_size(self) -> u32 {
        self.species.vector_bit_size()
    }

    /// Size of the whole vector in bytes.
    #[must_use]
    pub const fn vector_byte_size(self) -> usize {
        self.species.vector_byte_size()
    }

    /// Same shape with `F` lanes.
    pub fn with_lanes<F: Lane>(self) -> Result<VectorSpecies<F>> {
        VectorSpecies::of(self.shape())
    }

    /// Same lanes at `shape`.
    pub fn with_shape(self, shape: VectorShape) -> Result<Self> {
        Self::of(shape)
    }

    /// Largest multiple of the lane count not above `length`.
    #[must_use]
    pub const fn loop_bound(self, length: usize) -> usize {
        length - length % self.lane_count()
    }
}

impl<E: Lane> Clone for VectorSpecies<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: Lane> Copy for VectorSpecies<E> {}

impl<E: Lane> PartialEq for VectorSpecies<E> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.species, other.species)
    }
}

impl<E: Lane> Eq for VectorSpecies<E> {}

impl<E: Lane> fmt::Debug for VectorSpecies<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VectorSpecies<{}>", self.species)
    }
}

impl<E: Lane> fmt::Display for VectorSpecies<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.species, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_are_canonical() {
        let a = Species::resolve(LaneKind::I32, VectorShape::S128).unwrap();
        let b = Species::resolve(LaneKind::I32, VectorShape::S128).unwrap();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.lane_count(), 4);
        assert_eq!(a.vector_byte_size(), 16);
        assert!(a.check(b).is_ok());
    }

    #[test]
    fn test_lane_counts() {
        for kind in LaneKind::ALL {
            for shape in [VectorShape::S64, VectorShape::S128, VectorShape::S256, VectorShape::S512] {
                let species = Species::resolve(kind, shape).unwrap();
                assert_eq!(
                    species.lane_count() * kind.bits() as usize,
                    shape.bit_size() as usize
                );
            }
        }
    }

    #[test]
    fn test_mismatch_is_reported() {
        let a = Species::resolve(LaneKind::I32, VectorShape::S128).unwrap();
        let b = Species::resolve(LaneKind::I32, VectorShape::S256).unwrap();
        let err = a.check(b).unwrap_err();
        assert!(matches!(err, VectorError::SpeciesMismatch { .. }));
    }

    #[test]
    fn test_typed_handle() {
        let species = VectorSpecies::<f64>::of(VectorShape::S256).unwrap();
        assert_eq!(species.lane_count(), 4);
        assert_eq!(species.element_size(), 8);
        assert_eq!(species.loop_bound(11), 8);
        let ints = species.with_lanes::<i16>().unwrap();
        assert_eq!(ints.lane_count(), 16);
        let untyped = Species::resolve(LaneKind::I8, VectorShape::S64).unwrap();
        assert!(VectorSpecies::<i8>::from_species(untyped).is_ok());
        assert!(VectorSpecies::<i16>::from_species(untyped).is_err());
    }

    #[test]
    fn test_display() {
        let species = Species::resolve(LaneKind::I16, VectorShape::S128).unwrap();
        assert_eq!(species.to_string(), "i16x8 (128-bit)");
        assert_eq!(species.id().to_string(), "i16x8 (128-bit)");
    }

    #[test]
    fn test_all_species() {
        let count = Species::all().count();
        assert!(count >= 24);
        assert!(Species::all().all(|s| s.lane_count() >= 1));
    }
}
