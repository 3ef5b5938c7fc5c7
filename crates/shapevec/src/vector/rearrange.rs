//! Slices, unslices and shuffles.
//!
//! Every operation here is a rearrangement by an iota shuffle followed by
//! a blend under a mask derived from comparing the shuffle's entries.

use super::Vector;
use crate::error::{Result, VectorError};
use crate::lane::{Lane, LaneBuf};
use crate::mask::Mask;
use crate::operator::Operator;
use crate::shuffle::Shuffle;

impl<E: Lane> Vector<E> {
    #[allow(clippy::cast_possible_wrap)]
    fn check_origin(&self, origin: usize) -> Result<i64> {
        let lane_count = self.lanes.len();
        if origin > lane_count {
            return Err(VectorError::SliceOrigin { origin, lane_count });
        }
        Ok(origin as i64)
    }

    /// Mask of the lanes `i` with `i op bound`.
    fn iota_mask(&self, op: Operator, bound: i64) -> Result<Mask<E>> {
        self.species().iota_shuffle(0, 1, true).compare_indexes(op, bound)
    }

    #[allow(clippy::cast_sign_loss)]
    fn gather(&self, s: &Shuffle<E>) -> Self {
        let lanes = s
            .as_slice()
            .iter()
            .map(|&i| if i < 0 { E::default() } else { self.lanes[i as usize] })
            .collect::<LaneBuf<E>>();
        Self::from_parts(self.species, lanes)
    }

    /// Lane `i` of the result is lane `s[i]` of this vector.
    ///
    /// Fails if any entry of `s` is exceptional.
    pub fn rearrange(&self, s: &Shuffle<E>) -> Result<Self> {
        s.check(self.species)?;
        s.check_indexes()?;
        Ok(self.gather(s))
    }

    /// Rearrange the lanes set in `m`; unset lanes are zero.
    ///
    /// Exceptional entries are only an error in set lanes.
    pub fn rearrange_masked(&self, s: &Shuffle<E>, m: &Mask<E>) -> Result<Self> {
        s.check(self.species)?;
        m.check(self.species)?;
        let invalid = m.and_not(&s.lane_is_valid())?;
        if invalid.any_true() {
            let lane = invalid.first_true();
            return Err(VectorError::ShuffleIndex {
                lane,
                index: i64::from(s.as_slice()[lane]),
                lane_count: s.lane_count(),
            });
        }
        self.zero_like().blend(&self.gather(s), m)
    }

    /// Rearrange across two vectors: valid entries select from this vector,
    /// exceptional entries select the wrapped lane of `v`.
    pub fn rearrange_with(&self, s: &Shuffle<E>, v: &Self) -> Result<Self> {
        self.check_species(v)?;
        s.check(self.species)?;
        let valid = s.lane_is_valid();
        let wrapped = s.wrap_indexes();
        let from_this = self.rearrange(&wrapped)?;
        v.rearrange(&wrapped)?.blend(&from_this, &valid)
    }

    /// Use this vector's lanes as a shuffle over `v`.
    pub fn select_from(&self, v: &Self) -> Result<Self> {
        self.check_species(v)?;
        v.rearrange(&self.to_shuffle())
    }

    /// [`select_from`](Self::select_from) for the lanes set in `m`.
    pub fn select_from_masked(&self, v: &Self, m: &Mask<E>) -> Result<Self> {
        self.check_species(v)?;
        v.rearrange_masked(&self.to_shuffle(), m)
    }

    /// Drop the first `origin` lanes, shift the rest down and fill the top
    /// with zeros.
    pub fn slice(&self, origin: usize) -> Result<Self> {
        let origin = self.check_origin(origin)?;
        let n = self.lanes.len() as i64;
        let keep = self.iota_mask(Operator::Lt, n - origin)?;
        let iota = self.species().iota_shuffle(origin, 1, true);
        self.zero_like().blend(&self.rearrange(&iota)?, &keep)
    }

    /// Lanes `origin..` of this vector followed by the first lanes of `v1`.
    pub fn slice_with(&self, origin: usize, v1: &Self) -> Result<Self> {
        self.check_species(v1)?;
        let origin = self.check_origin(origin)?;
        let n = self.lanes.len() as i64;
        let keep = self.iota_mask(Operator::Lt, n - origin)?;
        let iota = self.species().iota_shuffle(origin, 1, true);
        v1.rearrange(&iota)?.blend(&self.rearrange(&iota)?, &keep)
    }

    /// [`slice_with`](Self::slice_with) with the lanes unset in `m`
    /// zeroed.
    pub fn slice_masked(&self, origin: usize, w: &Self, m: &Mask<E>) -> Result<Self> {
        m.check(self.species)?;
        self.zero_like().blend(&self.slice_with(origin, w)?, m)
    }

    /// Shift lanes up by `origin`, filling the bottom with zeros.
    pub fn unslice(&self, origin: usize) -> Result<Self> {
        let origin = self.check_origin(origin)?;
        let place = self.iota_mask(Operator::Ge, origin)?;
        let iota = self.species().iota_shuffle(-origin, 1, true);
        self.zero_like().blend(&self.rearrange(&iota)?, &place)
    }

    /// Write this vector into `w` as if `w` were the lanes `origin..` of a
    /// double-width window.
    ///
    /// Part 0 fills lanes `origin..` of `w` from the bottom of this vector.
    /// Part 1 fills lanes `..origin` of `w` from the top.
    pub fn unslice_into(&self, origin: usize, w: &Self, part: i32) -> Result<Self> {
        self.check_species(w)?;
        let origin = self.check_origin(origin)?;
        let op = match part {
            0 => Operator::Ge,
            1 => Operator::Lt,
            _ => return Err(VectorError::SlicePart { part }),
        };
        let place = self.iota_mask(op, origin)?;
        let iota = self.species().iota_shuffle(-origin, 1, true);
        w.blend(&self.rearrange(&iota)?, &place)
    }

    /// [`unslice_into`](Self::unslice_into) writing only the lanes set in
    /// `m`.
    pub fn unslice_into_masked(&self, origin: usize, w: &Self, part: i32, m: &Mask<E>) -> Result<Self> {
        m.check(self.species)?;
        if m.all_true() {
            return self.unslice_into(origin, w, part);
        }
        let window = w.slice_with(origin, w)?.blend(self, m)?;
        window.unslice_into(origin, w, part)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::VectorError;
    use crate::shape::VectorShape;
    use crate::species::VectorSpecies;

    fn ints() -> VectorSpecies<i32> {
        VectorSpecies::of(VectorShape::S128).unwrap()
    }

    #[test]
    fn test_slice_and_unslice() {
        let v = ints().from_values(&[10, 20, 30, 40]).unwrap();
        let sliced = v.slice(1).unwrap();
        assert_eq!(sliced.to_vec(), [20, 30, 40, 0]);
        assert_eq!(sliced.unslice_into(1, &v, 0).unwrap(), v);
        assert_eq!(sliced.unslice(1).unwrap().to_vec(), [0, 20, 30, 40]);
        assert_eq!(v.slice(0).unwrap(), v);
        assert_eq!(v.slice(4).unwrap(), ints().zero());
        assert!(matches!(
            v.slice(5),
            Err(VectorError::SliceOrigin { origin: 5, lane_count: 4 })
        ));
    }

    #[test]
    fn test_slice_with() {
        let s = ints();
        let a = s.from_values(&[1, 2, 3, 4]).unwrap();
        let b = s.from_values(&[5, 6, 7, 8]).unwrap();
        assert_eq!(a.slice_with(1, &b).unwrap().to_vec(), [2, 3, 4, 5]);
        assert_eq!(a.slice_with(3, &b).unwrap().to_vec(), [4, 5, 6, 7]);
        assert_eq!(a.slice_with(4, &b).unwrap(), b);
        let m = s.mask_from_values(&[true, false, true, false]).unwrap();
        assert_eq!(a.slice_masked(1, &b, &m).unwrap().to_vec(), [2, 0, 4, 0]);
    }

    #[test]
    fn test_unslice_parts() {
        let s = ints();
        let v = s.from_values(&[1, 2, 3, 4]).unwrap();
        let w = s.from_values(&[-1, -2, -3, -4]).unwrap();
        assert_eq!(v.unslice_into(1, &w, 0).unwrap().to_vec(), [-1, 1, 2, 3]);
        assert_eq!(v.unslice_into(1, &w, 1).unwrap().to_vec(), [4, -2, -3, -4]);
        assert_eq!(v.unslice_into(1, &w, 2), Err(VectorError::SlicePart { part: 2 }));

        let all = s.mask_all(true);
        assert_eq!(
            v.unslice_into_masked(1, &w, 0, &all).unwrap(),
            v.unslice_into(1, &w, 0).unwrap()
        );
        let m = s.mask_from_values(&[true, false, true, true]).unwrap();
        assert_eq!(v.unslice_into_masked(1, &w, 0, &m).unwrap().to_vec(), [-1, 1, -3, 3]);
    }

    #[test]
    fn test_slice_on_byte_lanes() {
        let bytes = VectorSpecies::<i8>::of(VectorShape::S512).unwrap();
        let v = bytes.iota();
        let sliced = v.slice(60).unwrap();
        assert_eq!(&sliced.to_vec()[..5], &[60, 61, 62, 63, 0]);
    }

    #[test]
    fn test_rearrange() {
        let s = ints();
        let v = s.from_values(&[10, 20, 30, 40]).unwrap();
        let reverse = s.shuffle_from_values(&[3, 2, 1, 0]).unwrap();
        assert_eq!(v.rearrange(&reverse).unwrap().to_vec(), [40, 30, 20, 10]);

        let partial = s.shuffle_from_values(&[0, 5, 2, -1]).unwrap();
        assert!(matches!(
            v.rearrange(&partial),
            Err(VectorError::ShuffleIndex { lane: 1, .. })
        ));
        let m = s.mask_from_values(&[true, false, true, false]).unwrap();
        assert_eq!(v.rearrange_masked(&partial, &m).unwrap().to_vec(), [10, 0, 30, 0]);
        let bad = s.mask_from_values(&[false, false, false, true]).unwrap();
        assert!(matches!(
            v.rearrange_masked(&partial, &bad),
            Err(VectorError::ShuffleIndex { lane: 3, .. })
        ));

        let other = s.from_values(&[-10, -20, -30, -40]).unwrap();
        assert_eq!(v.rearrange_with(&partial, &other).unwrap().to_vec(), [10, -20, 30, -40]);
    }

    #[test]
    fn test_select_from() {
        let s = ints();
        let v = s.from_values(&[10, 20, 30, 40]).unwrap();
        let idx = s.from_values(&[2, 2, 0, 3]).unwrap();
        assert_eq!(idx.select_from(&v).unwrap().to_vec(), [30, 30, 10, 40]);
        let m = s.mask_from_values(&[false, true, true, false]).unwrap();
        assert_eq!(idx.select_from_masked(&v, &m).unwrap().to_vec(), [0, 30, 10, 0]);
        let out_of_range = s.from_values(&[0, 9, 0, 0]).unwrap();
        assert!(out_of_range.select_from(&v).is_err());
    }
}
