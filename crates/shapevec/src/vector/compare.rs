//! Comparisons and lane tests.

use super::Vector;
use crate::dispatch;
use crate::error::Result;
use crate::lane::Lane;
use crate::mask::Mask;
use crate::operator::Operator;

impl<E: Lane> Vector<E> {
    /// Compare every lane with the matching lane of `v`.
    pub fn compare(&self, op: Operator, v: &Self) -> Result<Mask<E>> {
        self.check_species(v)?;
        let bits = dispatch::compare(op, self.species, &self.lanes, &v.lanes)?;
        Ok(Mask::from_parts(self.species, bits))
    }

    /// Compare every lane with `e`.
    pub fn compare_scalar(&self, op: Operator, e: E) -> Result<Mask<E>> {
        self.compare(op, &self.broadcast(e))
    }

    /// Compare the lanes set in `m`; unset lanes are false.
    pub fn compare_masked(&self, op: Operator, v: &Self, m: &Mask<E>) -> Result<Mask<E>> {
        self.compare(op, v)?.and(m)
    }

    /// Lanes equal to the matching lane of `v`.
    pub fn eq(&self, v: &Self) -> Result<Mask<E>> {
        self.compare(Operator::Eq, v)
    }

    /// Lanes less than the matching lane of `v`.
    pub fn lt(&self, v: &Self) -> Result<Mask<E>> {
        self.compare(Operator::Lt, v)
    }

    /// Test every lane.
    pub fn test(&self, op: Operator) -> Result<Mask<E>> {
        let bits = dispatch::test(op, self.species, &self.lanes)?;
        Ok(Mask::from_parts(self.species, bits))
    }

    /// Test the lanes set in `m`; unset lanes are false.
    pub fn test_masked(&self, op: Operator, m: &Mask<E>) -> Result<Mask<E>> {
        self.test(op)?.and(m)
    }
}

#[cfg(test)]
mod tests {
    use crate::operator::Operator;
    use crate::shape::VectorShape;
    use crate::species::VectorSpecies;

    #[test]
    fn test_eq_example() {
        let s = VectorSpecies::<i32>::of(VectorShape::S128).unwrap();
        let a = s.from_values(&[1, 2, 3, 4]).unwrap();
        let b = s.from_values(&[1, 0, 3, 0]).unwrap();
        let m = a.eq(&b).unwrap();
        assert_eq!(m.to_vec(), [true, false, true, false]);
        assert_eq!(m.true_count(), 2);
        assert_eq!(m.first_true(), 0);
        assert_eq!(m.last_true(), 2);
    }

    #[test]
    fn test_eq_broadcast() {
        let s = VectorSpecies::<i32>::of(VectorShape::S128).unwrap();
        let a = s.from_values(&[1, 2, 3, 4]).unwrap();
        let m = a.eq(&s.broadcast(2)).unwrap();
        assert_eq!(m.to_vec(), [false, true, false, false]);
        assert_eq!(m.true_count(), 1);
        assert_eq!(m.first_true(), 1);
        assert_eq!(m.last_true(), 1);
        assert_eq!(a.compare_scalar(Operator::Eq, 2).unwrap(), m);
    }

    #[test]
    fn test_unsigned_comparisons() {
        let s = VectorSpecies::<i8>::of(VectorShape::S64).unwrap();
        let a = s.from_values(&[-1, 1, 0, -128, 127, 5, 5, 0]).unwrap();
        let m = a.compare_scalar(Operator::UnsignedGt, 100).unwrap();
        assert_eq!(m.to_vec(), [true, false, false, true, true, false, false, false]);
        let m = a.compare_scalar(Operator::Gt, 100).unwrap();
        assert_eq!(m.to_vec(), [false, false, false, false, true, false, false, false]);
    }

    #[test]
    fn test_masked_forms() {
        let s = VectorSpecies::<i64>::of(VectorShape::S256).unwrap();
        let a = s.from_values(&[1, 2, 3, 4]).unwrap();
        let m = s.mask_from_values(&[true, true, false, false]).unwrap();
        let cmp = a.compare_masked(Operator::Ge, &s.broadcast(2), &m).unwrap();
        assert_eq!(cmp.to_vec(), [false, true, false, false]);
        let neg = s.from_values(&[-1, 2, -3, 4]).unwrap();
        assert_eq!(neg.test_masked(Operator::IsNegative, &m).unwrap().to_vec(), [true, false, false, false]);
    }

    #[test]
    fn test_float_tests() {
        let s = VectorSpecies::<f32>::of(VectorShape::S128).unwrap();
        let a = s.from_values(&[0.0, -0.0, f32::NAN, f32::NEG_INFINITY]).unwrap();
        assert_eq!(a.test(Operator::IsDefault).unwrap().to_vec(), [true, false, false, false]);
        assert_eq!(a.test(Operator::IsNegative).unwrap().to_vec(), [false, true, false, true]);
        assert_eq!(a.test(Operator::IsNan).unwrap().to_vec(), [false, false, true, false]);
        assert_eq!(a.test(Operator::IsFinite).unwrap().to_vec(), [true, true, false, false]);
        assert_eq!(a.test(Operator::IsInfinite).unwrap().to_vec(), [false, false, false, true]);
        assert_eq!(a.lt(&s.zero()).unwrap().to_vec(), [false, false, false, true]);
        assert!(s.zero().test(Operator::IsNan).is_ok());
        assert!(VectorSpecies::<i32>::of(VectorShape::S128).unwrap().zero().test(Operator::IsNan).is_err());
    }
}
