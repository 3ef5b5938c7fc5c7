//! Lane masks.

use crate::dispatch::BoolBuf;
use crate::error::{Result, VectorError};
use crate::lane::{Lane, LaneBuf};
use crate::species::{Species, VectorSpecies};
use crate::vector::Vector;
use std::fmt;
use std::marker::PhantomData;

/// One boolean per lane of a species.
pub struct Mask<E: Lane> {
    species: &'static Species,
    bits: BoolBuf,
    _lane: PhantomData<fn() -> E>,
}

impl<E: Lane> VectorSpecies<E> {
    /// Mask with every lane set to `bit`.
    #[must_use]
    pub fn mask_all(self, bit: bool) -> Mask<E> {
        Mask::from_parts(self.species(), smallvec::smallvec![bit; self.lane_count()])
    }

    /// Mask from exactly `lane_count` booleans.
    pub fn mask_from_values(self, bits: &[bool]) -> Result<Mask<E>> {
        if bits.len() != self.lane_count() {
            return Err(VectorError::LaneCountMismatch {
                expected: self.lane_count(),
                actual: bits.len(),
            });
        }
        Ok(Mask::from_parts(self.species(), bits.iter().copied().collect()))
    }

    /// Mask from `lane_count` booleans starting at `offset`.
    pub fn mask_from_slice(self, bits: &[bool], offset: usize) -> Result<Mask<E>> {
        let n = self.lane_count();
        VectorError::check_range(offset, n, bits.len())?;
        Ok(Mask::from_parts(self.species(), bits[offset..offset + n].iter().copied().collect()))
    }

    /// Mask whose lane `i` is `f(i)`.
    pub fn mask_from_fn(self, f: impl FnMut(usize) -> bool) -> Mask<E> {
        Mask::from_parts(self.species(), (0..self.lane_count()).map(f).collect())
    }

    /// Mask whose lane `i` is bit `i` of `bits`. Lanes past 64 are unset.
    #[must_use]
    pub fn mask_from_long(self, bits: u64) -> Mask<E> {
        self.mask_from_fn(|i| i < 64 && (bits >> i) & 1 == 1)
    }

    /// Mask of the lanes `i` with `offset + i < limit`.
    #[must_use]
    pub fn index_in_range(self, offset: usize, limit: usize) -> Mask<E> {
        self.mask_from_fn(|i| offset.saturating_add(i) < limit)
    }
}

impl<E: Lane> Mask<E> {
    pub(crate) fn from_parts(species: &'static Species, bits: BoolBuf) -> Self {
        debug_assert_eq!(bits.len(), species.lane_count());
        Self {
            species,
            bits,
            _lane: PhantomData,
        }
    }

    /// The species of this mask.
    #[must_use]
    pub fn species(&self) -> VectorSpecies<E> {
        VectorSpecies::wrap(self.species)
    }

    /// Number of lanes.
    #[must_use]
    pub fn lane_count(&self) -> usize {
        self.bits.len()
    }

    /// The lanes as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    /// The lanes as a vector of booleans.
    #[must_use]
    pub fn to_vec(&self) -> Vec<bool> {
        self.bits.to_vec()
    }

    pub(crate) fn check(&self, species: &Species) -> Result<()> {
        species.check(self.species)
    }

    fn zip_with(&self, other: &Self, f: impl Fn(bool, bool) -> bool) -> Result<Self> {
        self.species.check(other.species)?;
        let bits = self.bits.iter().zip(&other.bits).map(|(&a, &b)| f(a, b)).collect();
        Ok(Self::from_parts(self.species, bits))
    }

    /// Lane-wise and.
    pub fn and(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a & b)
    }

    /// Lane-wise or.
    pub fn or(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a | b)
    }

    /// Lane-wise exclusive or.
    pub fn xor(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a ^ b)
    }

    /// Lanes set here and unset in `other`.
    pub fn and_not(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a & !b)
    }

    /// Lanes where both masks agree.
    pub fn eq(&self, other: &Self) -> Result<Self> {
        self.xor(&other.not())
    }

    /// Lane-wise complement, computed as `xor` with the all-true mask.
    #[must_use]
    pub fn not(&self) -> Self {
        let bits = self.bits.iter().map(|&a| a ^ true).collect();
        Self::from_parts(self.species, bits)
    }

    /// Number of set lanes.
    #[must_use]
    pub fn true_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Lowest set lane, or `lane_count` when none is set.
    #[must_use]
    pub fn first_true(&self) -> usize {
        self.bits.iter().position(|&b| b).unwrap_or(self.bits.len())
    }

    /// Highest set lane, or -1 when none is set.
    #[must_use]
    pub fn last_true(&self) -> isize {
        self.bits
            .iter()
            .rposition(|&b| b)
            .map_or(-1, |i| i as isize)
    }

    /// Check if any lane is set.
    #[must_use]
    pub fn any_true(&self) -> bool {
        self.bits.iter().any(|&b| b)
    }

    /// Check if every lane is set.
    #[must_use]
    pub fn all_true(&self) -> bool {
        self.bits.iter().all(|&b| b)
    }

    /// Check if lane `i` is set.
    pub fn lane_is_set(&self, i: usize) -> Result<bool> {
        VectorError::check_lane(i, self.bits.len())?;
        Ok(self.bits[i])
    }

    /// Lane `i` in bit `i`. Fails for masks of more than 64 lanes.
    pub fn to_long(&self) -> Result<u64> {
        if self.bits.len() > 64 {
            return Err(VectorError::MaskTooWide {
                lane_count: self.bits.len(),
            });
        }
        Ok(self
            .bits
            .iter()
            .enumerate()
            .fold(0, |acc, (i, &b)| acc | (u64::from(b) << i)))
    }

    /// Vector with all bits set in set lanes and zero elsewhere.
    #[must_use]
    pub fn to_vector(&self) -> Vector<E> {
        let ones = E::from_bits(u64::MAX);
        let lanes: LaneBuf<E> = self
            .bits
            .iter()
            .map(|&b| if b { ones } else { E::default() })
            .collect();
        Vector::from_parts(self.species, lanes)
    }

    /// Same lanes for a species with the same lane count.
    pub fn cast<F: Lane>(&self, species: VectorSpecies<F>) -> Result<Mask<F>> {
        if species.lane_count() != self.lane_count() {
            return Err(VectorError::LaneCountMismatch {
                expected: species.lane_count(),
                actual: self.lane_count(),
            });
        }
        Ok(Mask::from_parts(species.species(), self.bits.clone()))
    }

    /// Clear the lanes `i` with `offset + i >= limit`.
    #[must_use]
    pub fn index_in_range(&self, offset: usize, limit: usize) -> Self {
        let bits = self
            .bits
            .iter()
            .enumerate()
            .map(|(i, &b)| b && offset.saturating_add(i) < limit)
            .collect();
        Self::from_parts(self.species, bits)
    }
}

impl<E: Lane> Clone for Mask<E> {
    fn clone(&self) -> Self {
        Self::from_parts(self.species, self.bits.clone())
    }
}

impl<E: Lane> PartialEq for Mask<E> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.species, other.species) && self.bits == other.bits
    }
}

impl<E: Lane> Eq for Mask<E> {}

impl<E: Lane> fmt::Debug for Mask<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mask<{}>{}", self.species, self)
    }
}

impl<E: Lane> fmt::Display for Mask<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for &b in &self.bits {
            f.write_str(if b { "T" } else { "." })?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::VectorShape;

    fn species() -> VectorSpecies<i32> {
        VectorSpecies::of(VectorShape::S128).unwrap()
    }

    #[test]
    fn test_algebra() {
        let s = species();
        let a = s.mask_from_values(&[true, true, false, false]).unwrap();
        let b = s.mask_from_values(&[true, false, true, false]).unwrap();
        assert_eq!(a.and(&b).unwrap().to_vec(), [true, false, false, false]);
        assert_eq!(a.or(&b).unwrap().to_vec(), [true, true, true, false]);
        assert_eq!(a.xor(&b).unwrap().to_vec(), [false, true, true, false]);
        assert_eq!(a.and_not(&b).unwrap().to_vec(), [false, true, false, false]);
        assert_eq!(a.eq(&b).unwrap().to_vec(), [true, false, false, true]);
        assert_eq!(a.not().to_vec(), [false, false, true, true]);
    }

    #[test]
    fn test_queries() {
        let s = species();
        let m = s.mask_from_values(&[false, true, false, true]).unwrap();
        assert_eq!(m.true_count(), 2);
        assert_eq!(m.first_true(), 1);
        assert_eq!(m.last_true(), 3);
        assert!(m.any_true());
        assert!(!m.all_true());
        assert_eq!(m.lane_is_set(1), Ok(true));
        assert!(m.lane_is_set(4).is_err());

        let none = s.mask_all(false);
        assert_eq!(none.first_true(), 4);
        assert_eq!(none.last_true(), -1);
        assert!(s.mask_all(true).all_true());
    }

    #[test]
    fn test_long_round_trip() {
        let s = species();
        let m = s.mask_from_long(0b1010);
        assert_eq!(m.to_vec(), [false, true, false, true]);
        assert_eq!(m.to_long(), Ok(0b1010));

        let wide = VectorSpecies::<i8>::of(VectorShape::S512).unwrap();
        assert!(matches!(wide.mask_all(true).to_long(), Err(VectorError::MaskTooWide { .. })));
    }

    #[test]
    fn test_index_in_range() {
        let s = species();
        assert_eq!(s.index_in_range(6, 8).to_vec(), [true, true, false, false]);
        let m = s.mask_from_values(&[false, true, true, true]).unwrap();
        assert_eq!(m.index_in_range(0, 3).to_vec(), [false, true, true, false]);
    }

    #[test]
    fn test_to_vector_and_cast() {
        let s = species();
        let m = s.mask_from_values(&[true, false, true, false]).unwrap();
        assert_eq!(m.to_vector().to_vec(), [-1, 0, -1, 0]);
        let floats = VectorSpecies::<f32>::of(VectorShape::S128).unwrap();
        let cast = m.cast(floats).unwrap();
        assert_eq!(cast.to_vec(), m.to_vec());
        let shorts = VectorSpecies::<i16>::of(VectorShape::S128).unwrap();
        assert!(m.cast(shorts).is_err());
    }

    #[test]
    fn test_species_mismatch() {
        let a = species().mask_all(true);
        let b = VectorSpecies::<i32>::of(VectorShape::S256).unwrap().mask_all(true);
        assert!(matches!(a.and(&b), Err(VectorError::SpeciesMismatch { .. })));
    }

    #[test]
    fn test_display() {
        let m = species().mask_from_values(&[true, false, false, true]).unwrap();
        assert_eq!(m.to_string(), "[T..T]");
    }
}
