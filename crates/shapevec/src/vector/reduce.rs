//! Reductions.

use super::Vector;
use crate::dispatch::{self, kernels};
use crate::error::{Result, VectorError};
use crate::lane::Lane;
use crate::mask::Mask;
use crate::operator::{OpKind, Operator};

impl<E: Lane> Vector<E> {
    /// Fold every lane with an associative operator.
    pub fn reduce_lanes(&self, op: Operator) -> Result<E> {
        dispatch::reduce(op, self.species, &self.lanes)
    }

    /// Fold the lanes set in `m`; unset lanes count as the identity of `op`.
    pub fn reduce_lanes_masked(&self, op: Operator, m: &Mask<E>) -> Result<E> {
        m.check(self.species)?;
        op.require(OpKind::ASSOCIATIVE, E::KIND)?;
        let identity = kernels::reduction_identity::<E>(op).ok_or(VectorError::UnsupportedOperation {
            op,
            kind: E::KIND,
        })?;
        self.broadcast(identity).blend(self, m)?.reduce_lanes(op)
    }

    /// [`reduce_lanes`](Self::reduce_lanes) widened to `i64`.
    pub fn reduce_lanes_to_long(&self, op: Operator) -> Result<i64> {
        Ok(self.reduce_lanes(op)?.to_i64())
    }

    /// [`reduce_lanes_masked`](Self::reduce_lanes_masked) widened to `i64`.
    pub fn reduce_lanes_to_long_masked(&self, op: Operator, m: &Mask<E>) -> Result<i64> {
        Ok(self.reduce_lanes_masked(op, m)?.to_i64())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::VectorError;
    use crate::operator::Operator;
    use crate::shape::VectorShape;
    use crate::species::VectorSpecies;

    #[test]
    fn test_integral_reductions() {
        let s = VectorSpecies::<i16>::of(VectorShape::S128).unwrap();
        let v = s.from_values(&[3, -1, 4, 1, -5, 9, 2, 6]).unwrap();
        assert_eq!(v.reduce_lanes(Operator::Add), Ok(19));
        assert_eq!(v.reduce_lanes(Operator::Min), Ok(-5));
        assert_eq!(v.reduce_lanes(Operator::Max), Ok(9));
        assert_eq!(v.reduce_lanes(Operator::Mul), Ok(6480));
        assert_eq!(v.reduce_lanes(Operator::Or), Ok(-1));
        assert_eq!(v.reduce_lanes_to_long(Operator::Add), Ok(19));
    }

    #[test]
    fn test_masked_identities() {
        let s = VectorSpecies::<i32>::of(VectorShape::S128).unwrap();
        let v = s.from_values(&[5, 6, 7, 8]).unwrap();
        let none = s.mask_all(false);
        assert_eq!(v.reduce_lanes_masked(Operator::Add, &none), Ok(0));
        assert_eq!(v.reduce_lanes_masked(Operator::Mul, &none), Ok(1));
        assert_eq!(v.reduce_lanes_masked(Operator::And, &none), Ok(-1));
        assert_eq!(v.reduce_lanes_masked(Operator::Min, &none), Ok(i32::MAX));
        assert_eq!(v.reduce_lanes_masked(Operator::Max, &none), Ok(i32::MIN));

        let m = s.mask_from_values(&[false, true, false, true]).unwrap();
        assert_eq!(v.reduce_lanes_masked(Operator::Add, &m), Ok(14));
        assert_eq!(v.reduce_lanes_to_long_masked(Operator::Mul, &m), Ok(48));
    }

    #[test]
    fn test_float_identities() {
        let f = VectorSpecies::<f64>::of(VectorShape::S256).unwrap();
        let v = f.from_values(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        let none = f.mask_all(false);
        assert_eq!(v.reduce_lanes_masked(Operator::Min, &none), Ok(f64::INFINITY));
        assert_eq!(v.reduce_lanes_masked(Operator::Max, &none), Ok(f64::NEG_INFINITY));
        assert_eq!(v.reduce_lanes(Operator::Add), Ok(10.0));
        assert!(v.reduce_lanes(Operator::Xor).is_err());
    }

    #[test]
    fn test_first_nonzero() {
        let s = VectorSpecies::<i64>::of(VectorShape::S256).unwrap();
        assert_eq!(s.from_values(&[0, 0, 7, 3]).unwrap().reduce_lanes(Operator::FirstNonzero), Ok(7));
        assert_eq!(s.zero().reduce_lanes(Operator::FirstNonzero), Ok(0));
        let m = s.mask_from_values(&[false, false, false, true]).unwrap();
        let v = s.from_values(&[0, 0, 7, 3]).unwrap();
        assert_eq!(v.reduce_lanes_masked(Operator::FirstNonzero, &m), Ok(3));
    }

    #[test]
    fn test_non_associative_rejected() {
        let s = VectorSpecies::<i32>::of(VectorShape::S64).unwrap();
        assert!(matches!(
            s.zero().reduce_lanes(Operator::Sub),
            Err(VectorError::UnsupportedOperation { .. } | VectorError::WrongArity { .. })
        ));
    }
}
