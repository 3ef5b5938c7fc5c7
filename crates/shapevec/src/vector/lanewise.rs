//! Lane-wise operators.

use super::Vector;
use crate::dispatch;
use crate::error::{Result, VectorError};
use crate::lane::Lane;
use crate::mask::Mask;
use crate::operator::{OpKind, Operator};

impl<E: Lane> Vector<E> {
    /// Apply a unary operator to every lane.
    pub fn lanewise_unary(&self, op: Operator) -> Result<Self> {
        let lanes = dispatch::unary(op, self.species, &self.lanes)?;
        Ok(Self::from_parts(self.species, lanes))
    }

    /// Apply a unary operator to the lanes set in `m`.
    pub fn lanewise_unary_masked(&self, op: Operator, m: &Mask<E>) -> Result<Self> {
        m.check(self.species)?;
        self.blend(&self.lanewise_unary(op)?, m)
    }

    /// Combine every lane with the matching lane of `v`.
    pub fn lanewise(&self, op: Operator, v: &Self) -> Result<Self> {
        self.check_species(v)?;
        op.require(OpKind::BINARY, E::KIND)?;
        match op {
            Operator::FirstNonzero => {
                let zero = self.test(Operator::IsDefault)?;
                self.blend(v, &zero)
            }
            Operator::AndNot => self.lanewise(Operator::And, &v.lanewise_unary(Operator::Not)?),
            Operator::Rol | Operator::Ror => {
                let negated = v.lanewise_unary(Operator::Neg)?;
                let (left, right) = if op == Operator::Rol {
                    (v, &negated)
                } else {
                    (&negated, v)
                };
                let high = self.lanewise(Operator::Lshl, left)?;
                let low = self.lanewise(Operator::Lshr, right)?;
                high.lanewise(Operator::Or, &low)
            }
            Operator::Div if E::KIND.is_integral() => {
                if let Some(lane) = v.lanes.iter().position(|d| d.to_bits() == 0) {
                    return Err(VectorError::DivideByZero { lane });
                }
                self.dispatch_binary(op, v)
            }
            _ => self.dispatch_binary(op, v),
        }
    }

    fn dispatch_binary(&self, op: Operator, v: &Self) -> Result<Self> {
        let lanes = dispatch::binary(op, self.species, &self.lanes, &v.lanes)?;
        Ok(Self::from_parts(self.species, lanes))
    }

    /// Combine the lanes set in `m` with the matching lanes of `v`; unset
    /// lanes keep this vector's values.
    ///
    /// Integral division only faults on zero divisors in set lanes.
    pub fn lanewise_masked(&self, op: Operator, v: &Self, m: &Mask<E>) -> Result<Self> {
        self.check_species(v)?;
        m.check(self.species)?;
        if op == Operator::Div && E::KIND.is_integral() {
            let zero = v.test(Operator::IsDefault)?;
            let active = zero.and(m)?;
            if active.any_true() {
                return Err(VectorError::DivideByZero {
                    lane: active.first_true(),
                });
            }
            // Inactive zero divisors become -1 so the full-width division
            // cannot fault; their lanes are blended away below.
            let safe = v.lanewise_unary_masked(Operator::Not, &zero)?;
            return self.blend(&self.lanewise(op, &safe)?, m);
        }
        self.blend(&self.lanewise(op, v)?, m)
    }

    /// Combine every lane with `e`.
    pub fn lanewise_scalar(&self, op: Operator, e: E) -> Result<Self> {
        self.lanewise(op, &self.broadcast(e))
    }

    /// Combine the lanes set in `m` with `e`.
    pub fn lanewise_scalar_masked(&self, op: Operator, e: E, m: &Mask<E>) -> Result<Self> {
        self.lanewise_masked(op, &self.broadcast(e), m)
    }

    /// Apply a ternary operator lane by lane.
    pub fn lanewise_ternary(&self, op: Operator, b: &Self, c: &Self) -> Result<Self> {
        self.check_species(b)?;
        self.check_species(c)?;
        let lanes = dispatch::ternary(op, self.species, &self.lanes, &b.lanes, &c.lanes)?;
        Ok(Self::from_parts(self.species, lanes))
    }

    /// Apply a ternary operator to the lanes set in `m`.
    pub fn lanewise_ternary_masked(&self, op: Operator, b: &Self, c: &Self, m: &Mask<E>) -> Result<Self> {
        m.check(self.species)?;
        self.blend(&self.lanewise_ternary(op, b, c)?, m)
    }

    /// Lane-wise `ADD`.
    pub fn add(&self, v: &Self) -> Result<Self> {
        self.lanewise(Operator::Add, v)
    }

    /// Lane-wise `SUB`.
    pub fn sub(&self, v: &Self) -> Result<Self> {
        self.lanewise(Operator::Sub, v)
    }

    /// Lane-wise `MUL`.
    pub fn mul(&self, v: &Self) -> Result<Self> {
        self.lanewise(Operator::Mul, v)
    }

    /// Lane-wise `DIV`.
    pub fn div(&self, v: &Self) -> Result<Self> {
        self.lanewise(Operator::Div, v)
    }

    /// Lane-wise `MIN`.
    pub fn min(&self, v: &Self) -> Result<Self> {
        self.lanewise(Operator::Min, v)
    }

    /// Lane-wise `MAX`.
    pub fn max(&self, v: &Self) -> Result<Self> {
        self.lanewise(Operator::Max, v)
    }

    /// Lane-wise `NEG`.
    pub fn neg(&self) -> Result<Self> {
        self.lanewise_unary(Operator::Neg)
    }

    /// Lane-wise `ABS`.
    pub fn abs(&self) -> Result<Self> {
        self.lanewise_unary(Operator::Abs)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::VectorError;
    use crate::operator::Operator;
    use crate::shape::VectorShape;
    use crate::species::VectorSpecies;

    fn ints() -> VectorSpecies<i32> {
        VectorSpecies::of(VectorShape::S128).unwrap()
    }

    #[test]
    fn test_binary_and_scalar() {
        let s = ints();
        let a = s.from_values(&[1, -2, 3, i32::MAX]).unwrap();
        let b = s.from_values(&[4, 5, -6, 1]).unwrap();
        assert_eq!(a.add(&b).unwrap().to_vec(), [5, 3, -3, i32::MIN]);
        assert_eq!(a.lanewise_scalar(Operator::Mul, 2).unwrap().to_vec(), [2, -4, 6, -2]);
        assert_eq!(a.min(&b).unwrap().to_vec(), [1, -2, -6, 1]);
        assert_eq!(a.neg().unwrap().to_vec(), [-1, 2, -3, -i32::MAX]);
    }

    #[test]
    fn test_masked_keeps_first_operand() {
        let s = ints();
        let a = s.from_values(&[1, 2, 3, 4]).unwrap();
        let b = s.broadcast(10);
        let m = s.mask_from_values(&[false, true, false, true]).unwrap();
        assert_eq!(a.lanewise_masked(Operator::Sub, &b, &m).unwrap().to_vec(), [1, -8, 3, -6]);
        assert_eq!(a.lanewise_unary_masked(Operator::Neg, &m).unwrap().to_vec(), [1, -2, 3, -4]);
    }

    #[test]
    fn test_first_nonzero() {
        let s = ints();
        let a = s.from_values(&[0, 7, 0, -1]).unwrap();
        let b = s.from_values(&[5, 6, 0, 8]).unwrap();
        assert_eq!(a.lanewise(Operator::FirstNonzero, &b).unwrap().to_vec(), [5, 7, 0, -1]);

        let f = VectorSpecies::<f64>::of(VectorShape::S128).unwrap();
        let a = f.from_values(&[-0.0, 0.0]).unwrap();
        let b = f.broadcast(2.0);
        let r = a.lanewise(Operator::FirstNonzero, &b).unwrap().to_vec();
        assert!(r[0].is_sign_negative() && r[0] == 0.0);
        assert_eq!(r[1], 2.0);
    }

    #[test]
    fn test_shifts_and_rotates() {
        let bytes = VectorSpecies::<i8>::of(VectorShape::S64).unwrap();
        let a = bytes.broadcast(0b0110_0001);
        assert_eq!(a.lanewise_scalar(Operator::Rol, 1).unwrap().lane(0), Ok(-0b0011_1110));
        assert_eq!(a.lanewise_scalar(Operator::Ror, 1).unwrap().lane(0), Ok(-0b0101_0000));
        assert_eq!(a.lanewise_scalar(Operator::Rol, 8).unwrap().lane(0), Ok(0b0110_0001));
        let neg = bytes.broadcast(-128);
        assert_eq!(neg.lanewise_scalar(Operator::Lshr, 7).unwrap().lane(0), Ok(1));
        assert_eq!(neg.lanewise_scalar(Operator::Ashr, 7).unwrap().lane(0), Ok(-1));

        let s = ints();
        let x = s.broadcast(0x1234_5678);
        assert_eq!(
            x.lanewise_scalar(Operator::Ror, 8).unwrap().lane(0),
            Ok(0x7812_3456)
        );
    }

    #[test]
    fn test_and_not() {
        let s = ints();
        let a = s.broadcast(0b1111);
        assert_eq!(a.lanewise_scalar(Operator::AndNot, 0b0101).unwrap().lane(0), Ok(0b1010));
    }

    #[test]
    fn test_integral_division_by_zero() {
        let s = ints();
        let a = s.from_values(&[10, 20, 30, 40]).unwrap();
        let b = s.from_values(&[2, 0, 3, 4]).unwrap();
        assert_eq!(a.div(&b), Err(VectorError::DivideByZero { lane: 1 }));

        let m = s.mask_from_values(&[true, false, true, true]).unwrap();
        assert_eq!(a.lanewise_masked(Operator::Div, &b, &m).unwrap().to_vec(), [5, 20, 10, 10]);

        let all = s.mask_all(true);
        assert!(matches!(
            a.lanewise_masked(Operator::Div, &b, &all),
            Err(VectorError::DivideByZero { lane: 1 })
        ));
    }

    #[test]
    fn test_float_division_follows_ieee() {
        let f = VectorSpecies::<f32>::of(VectorShape::S64).unwrap();
        let a = f.from_values(&[1.0, 0.0]).unwrap();
        let r = a.div(&f.zero()).unwrap().to_vec();
        assert_eq!(r[0], f32::INFINITY);
        assert!(r[1].is_nan());
    }

    #[test]
    fn test_ternary() {
        let f = VectorSpecies::<f64>::of(VectorShape::S128).unwrap();
        let a = f.from_values(&[2.0, 3.0]).unwrap();
        let b = f.from_values(&[4.0, 5.0]).unwrap();
        let c = f.from_values(&[1.0, -1.0]).unwrap();
        assert_eq!(a.lanewise_ternary(Operator::Fma, &b, &c).unwrap().to_vec(), [9.0, 14.0]);
        let m = f.mask_from_values(&[false, true]).unwrap();
        assert_eq!(
            a.lanewise_ternary_masked(Operator::Fma, &b, &c, &m).unwrap().to_vec(),
            [2.0, 14.0]
        );
    }

    #[test]
    fn test_unsupported_operators() {
        let f = VectorSpecies::<f32>::of(VectorShape::S128).unwrap();
        let a = f.broadcast(1.0);
        assert!(matches!(
            a.lanewise(Operator::Xor, &a),
            Err(VectorError::UnsupportedOperation { .. })
        ));
        assert!(matches!(
            ints().zero().lanewise_unary(Operator::Sqrt),
            Err(VectorError::UnsupportedOperation { .. })
        ));
        assert!(matches!(
            a.lanewise(Operator::Lt, &a),
            Err(VectorError::WrongArity { .. })
        ));
    }

    #[test]
    fn test_species_must_match() {
        let a = ints().zero();
        let b = VectorSpecies::<i32>::of(VectorShape::S256).unwrap().zero();
        assert!(matches!(a.add(&b), Err(VectorError::SpeciesMismatch { .. })));
    }
}
