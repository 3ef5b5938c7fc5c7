//! Lane shuffles.
//!
//! A shuffle holds one source index per lane. Entries in `0..lane_count`
//! are valid. Anything else is stored *partially wrapped*: reduced modulo
//! the lane count and then shifted down by the lane count, so exceptional
//! entries land in `-lane_count..0`. An exceptional entry `x` still names
//! the source lane `x + lane_count` once wrapped.

use crate::dispatch::kernels;
use crate::error::{Result, VectorError};
use crate::lane::{Lane, LaneBuf};
use crate::mask::Mask;
use crate::operator::Operator;
use crate::species::{Species, VectorSpecies};
use crate::vector::Vector;
use smallvec::SmallVec;
use std::fmt;
use std::marker::PhantomData;

pub(crate) type IndexBuf = SmallVec<[i32; 32]>;

/// Decoded shuffle entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShuffleEntry {
    /// A source lane.
    Valid(usize),
    /// An out-of-range entry, in `-lane_count..0`.
    Exceptional(i32),
}

/// Partially wrap `index` for a vector of `n` lanes.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub(crate) fn partially_wrap(index: i64, n: usize) -> i32 {
    let n = n as i64;
    if (0..n).contains(&index) {
        index as i32
    } else {
        (index.rem_euclid(n) - n) as i32
    }
}

/// One source index per lane of a species.
pub struct Shuffle<E: Lane> {
    species: &'static Species,
    indexes: IndexBuf,
    _lane: PhantomData<fn() -> E>,
}

impl<E: Lane> VectorSpecies<E> {
    /// Shuffle with entry `i = start + i * step`.
    ///
    /// With `wrap` the entries are reduced modulo the lane count, otherwise
    /// out-of-range entries become exceptional.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn iota_shuffle(self, start: i64, step: i64, wrap: bool) -> Shuffle<E> {
        let n = self.lane_count();
        let indexes = (0..n)
            .map(|i| {
                let index = start.wrapping_add((i as i64).wrapping_mul(step));
                if wrap {
                    index.rem_euclid(n as i64) as i32
                } else {
                    partially_wrap(index, n)
                }
            })
            .collect();
        Shuffle::from_parts(self.species(), indexes)
    }

    /// Shuffle from exactly `lane_count` source indexes.
    pub fn shuffle_from_values(self, indexes: &[i64]) -> Result<Shuffle<E>> {
        if indexes.len() != self.lane_count() {
            return Err(VectorError::LaneCountMismatch {
                expected: self.lane_count(),
                actual: indexes.len(),
            });
        }
        Ok(self.shuffle_from_fn(|i| indexes[i]))
    }

    /// Shuffle from `lane_count` source indexes starting at `offset`.
    pub fn shuffle_from_slice(self, indexes: &[i64], offset: usize) -> Result<Shuffle<E>> {
        VectorError::check_range(offset, self.lane_count(), indexes.len())?;
        Ok(self.shuffle_from_fn(|i| indexes[offset + i]))
    }

    /// Shuffle whose entry `i` is `f(i)`.
    pub fn shuffle_from_fn(self, mut f: impl FnMut(usize) -> i64) -> Shuffle<E> {
        let n = self.lane_count();
        let indexes = (0..n).map(|i| partially_wrap(f(i), n)).collect();
        Shuffle::from_parts(self.species(), indexes)
    }
}

impl<E: Lane> Shuffle<E> {
    pub(crate) fn from_parts(species: &'static Species, indexes: IndexBuf) -> Self {
        debug_assert_eq!(indexes.len(), species.lane_count());
        Self {
            species,
            indexes,
            _lane: PhantomData,
        }
    }

    /// The species of this shuffle.
    #[must_use]
    pub fn species(&self) -> VectorSpecies<E> {
        VectorSpecies::wrap(self.species)
    }

    /// Number of lanes.
    #[must_use]
    pub fn lane_count(&self) -> usize {
        self.indexes.len()
    }

    /// The raw entries.
    #[must_use]
    pub fn as_slice(&self) -> &[i32] {
        &self.indexes
    }

    /// The raw entries as a vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<i32> {
        self.indexes.to_vec()
    }

    /// Raw entry of lane `i`.
    pub fn lane_source(&self, i: usize) -> Result<i32> {
        VectorError::check_lane(i, self.indexes.len())?;
        Ok(self.indexes[i])
    }

    /// Decoded entry of lane `i`.
    #[allow(clippy::cast_sign_loss)]
    pub fn entry(&self, i: usize) -> Result<ShuffleEntry> {
        let index = self.lane_source(i)?;
        Ok(if index >= 0 {
            ShuffleEntry::Valid(index as usize)
        } else {
            ShuffleEntry::Exceptional(index)
        })
    }

    pub(crate) fn check(&self, species: &Species) -> Result<()> {
        species.check(self.species)
    }

    /// Fail on the first exceptional entry.
    pub fn check_indexes(&self) -> Result<&Self> {
        match self.indexes.iter().position(|&x| x < 0) {
            None => Ok(self),
            Some(lane) => Err(VectorError::ShuffleIndex {
                lane,
                index: i64::from(self.indexes[lane]),
                lane_count: self.lane_count(),
            }),
        }
    }

    /// Shuffle with every entry reduced modulo the lane count.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn wrap_indexes(&self) -> Self {
        let n = self.lane_count() as i32;
        let indexes = self
            .indexes
            .iter()
            .map(|&x| if x < 0 { x + n } else { x })
            .collect();
        Self::from_parts(self.species, indexes)
    }

    /// Mask of the lanes holding valid entries.
    #[must_use]
    pub fn lane_is_valid(&self) -> Mask<E> {
        Mask::from_parts(self.species, self.indexes.iter().map(|&x| x >= 0).collect())
    }

    /// Compose with `s`: entry `i` of the result is entry `s[i]` of this
    /// shuffle. Exceptional entries of this shuffle carry over.
    pub fn rearrange(&self, s: &Self) -> Result<Self> {
        self.species.check(s.species)?;
        s.check_indexes()?;
        #[allow(clippy::cast_sign_loss)]
        let indexes = s.indexes.iter().map(|&i| self.indexes[i as usize]).collect();
        Ok(Self::from_parts(self.species, indexes))
    }

    /// The raw entries as lanes.
    #[must_use]
    pub fn to_vector(&self) -> Vector<E> {
        let lanes: LaneBuf<E> = self
            .indexes
            .iter()
            .map(|&x| E::from_i64(i64::from(x)))
            .collect();
        Vector::from_parts(self.species, lanes)
    }

    /// Same entries for a species with the same lane count.
    pub fn cast<F: Lane>(&self, species: VectorSpecies<F>) -> Result<Shuffle<F>> {
        if species.lane_count() != self.lane_count() {
            return Err(VectorError::LaneCountMismatch {
                expected: species.lane_count(),
                actual: self.lane_count(),
            });
        }
        Ok(Shuffle::from_parts(species.species(), self.indexes.clone()))
    }

    /// Mask of the lanes whose entry satisfies `entry op bound`.
    ///
    /// Entries are compared as wide integers, so no lane kind can overflow.
    pub(crate) fn compare_indexes(&self, op: Operator, bound: i64) -> Result<Mask<E>> {
        let cmp = kernels::compare_lane::<i64>(op).ok_or(VectorError::UnsupportedOperation {
            op,
            kind: E::KIND,
        })?;
        let bits = self.indexes.iter().map(|&x| cmp(i64::from(x), bound)).collect();
        Ok(Mask::from_parts(self.species, bits))
    }
}

impl<E: Lane> Clone for Shuffle<E> {
    fn clone(&self) -> Self {
        Self::from_parts(self.species, self.indexes.clone())
    }
}

impl<E: Lane> PartialEq for Shuffle<E> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.species, other.species) && self.indexes == other.indexes
    }
}

impl<E: Lane> Eq for Shuffle<E> {}

impl<E: Lane> fmt::Debug for Shuffle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shuffle<{}>{:?}", self.species, self.indexes.as_slice())
    }
}

impl<E: Lane> fmt::Display for Shuffle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.indexes.as_slice())
    }
}
