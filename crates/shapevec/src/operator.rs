//! Operator tokens.
//!
//! Every lane-wise, reduction, comparison and test operation is named by an
//! [`Operator`]. An operator carries [`OpKind`] flags that say how many
//! operands it takes and which lane kinds accept it.

use crate::error::{Result, VectorError};
use crate::lane::LaneKind;
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Capability flags of an operator.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct OpKind: u16 {
        /// Takes one vector operand.
        const UNARY = 1 << 0;
        /// Takes two vector operands.
        const BINARY = 1 << 1;
        /// Takes three vector operands.
        const TERNARY = 1 << 2;
        /// Usable as a reduction.
        const ASSOCIATIVE = 1 << 3;
        /// Produces a mask from two operands.
        const COMPARISON = 1 << 4;
        /// Produces a mask from one operand.
        const TEST = 1 << 5;
        /// Second operand is a shift count.
        const SHIFT = 1 << 6;
        /// Defined for floating lanes only.
        const ONLY_FP = 1 << 7;
        /// Defined for integral lanes only.
        const NO_FP = 1 << 8;
        /// Emulated by the engine, never handed to a backend.
        const SPECIAL = 1 << 9;
        /// Compares raw bits as unsigned integers.
        const UNSIGNED = 1 << 10;
    }
}

/// Operator token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operator {
    // Unary
    /// Negation.
    Neg,
    /// Absolute value.
    Abs,
    /// Bitwise complement.
    Not,
    /// All bits set if the lane is nonzero, else zero.
    Zomo,
    /// Square root.
    Sqrt,
    /// Cube root.
    Cbrt,
    /// Sine.
    Sin,
    /// Cosine.
    Cos,
    /// Tangent.
    Tan,
    /// Arc sine.
    Asin,
    /// Arc cosine.
    Acos,
    /// Arc tangent.
    Atan,
    /// Hyperbolic sine.
    Sinh,
    /// Hyperbolic cosine.
    Cosh,
    /// Hyperbolic tangent.
    Tanh,
    /// `e^x`.
    Exp,
    /// `e^x - 1`.
    Expm1,
    /// Natural logarithm.
    Log,
    /// Base-10 logarithm.
    Log10,
    /// `ln(1 + x)`.
    Log1p,

    // Binary
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
    /// Minimum.
    Min,
    /// Maximum.
    Max,
    /// First operand unless its bits are zero, else the second.
    FirstNonzero,
    /// Bitwise and.
    And,
    /// Bitwise and with the complement of the second operand.
    AndNot,
    /// Bitwise or.
    Or,
    /// Bitwise exclusive or.
    Xor,
    /// Left shift.
    Lshl,
    /// Arithmetic right shift.
    Ashr,
    /// Logical right shift.
    Lshr,
    /// Rotate left.
    Rol,
    /// Rotate right.
    Ror,
    /// Two-argument arc tangent.
    Atan2,
    /// Power.
    Pow,
    /// `sqrt(x² + y²)`.
    Hypot,

    // Ternary
    /// Fused multiply-add.
    Fma,
    /// Bits of the second operand where the third has ones, else the first.
    BitwiseBlend,

    // Comparison
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
    /// Unsigned less than.
    UnsignedLt,
    /// Unsigned less than or equal.
    UnsignedLe,
    /// Unsigned greater than.
    UnsignedGt,
    /// Unsigned greater than or equal.
    UnsignedGe,

    // Test
    /// Lane bits are all zero.
    IsDefault,
    /// Sign bit is set.
    IsNegative,
    /// Neither infinite nor NaN.
    IsFinite,
    /// NaN.
    IsNan,
    /// Positive or negative infinity.
    IsInfinite,
}

impl Operator {
    /// Every operator.
    pub const ALL: [Self; 56] = [
        Self::Neg,
        Self::Abs,
        Self::Not,
        Self::Zomo,
        Self::Sqrt,
        Self::Cbrt,
        Self::Sin,
        Self::Cos,
        Self::Tan,
        Self::Asin,
        Self::Acos,
        Self::Atan,
        Self::Sinh,
        Self::Cosh,
        Self::Tanh,
        Self::Exp,
        Self::Expm1,
        Self::Log,
        Self::Log10,
        Self::Log1p,
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Min,
        Self::Max,
        Self::FirstNonzero,
        Self::And,
        Self::AndNot,
        Self::Or,
        Self::Xor,
        Self::Lshl,
        Self::Ashr,
        Self::Lshr,
        Self::Rol,
        Self::Ror,
        Self::Atan2,
        Self::Pow,
        Self::Hypot,
        Self::Fma,
        Self::BitwiseBlend,
        Self::Eq,
        Self::Ne,
        Self::Lt,
        Self::Le,
        Self::Gt,
        Self::Ge,
        Self::UnsignedLt,
        Self::UnsignedLe,
        Self::UnsignedGt,
        Self::UnsignedGe,
        Self::IsDefault,
        Self::IsNegative,
        Self::IsFinite,
        Self::IsNan,
        Self::IsInfinite,
    ];

    /// Capability flags.
    #[must_use]
    pub const fn kind(self) -> OpKind {
        use Operator::*;
        const FP_UNARY: OpKind = OpKind::UNARY.union(OpKind::ONLY_FP);
        const FP_BINARY: OpKind = OpKind::BINARY.union(OpKind::ONLY_FP);
        const BITWISE: OpKind = OpKind::BINARY
            .union(OpKind::ASSOCIATIVE)
            .union(OpKind::NO_FP);
        const SHIFT: OpKind = OpKind::BINARY.union(OpKind::SHIFT).union(OpKind::NO_FP);
        const UNSIGNED: OpKind = OpKind::COMPARISON
            .union(OpKind::UNSIGNED)
            .union(OpKind::NO_FP);
        match self {
            Neg | Abs => OpKind::UNARY,
            Not | Zomo => OpKind::UNARY.union(OpKind::NO_FP),
            Sqrt | Cbrt | Sin | Cos | Tan | Asin | Acos | Atan | Sinh | Cosh | Tanh | Exp
            | Expm1 | Log | Log10 | Log1p => FP_UNARY,
            Add | Mul | Min | Max => OpKind::BINARY.union(OpKind::ASSOCIATIVE),
            Sub | Div => OpKind::BINARY,
            FirstNonzero => OpKind::BINARY
                .union(OpKind::ASSOCIATIVE)
                .union(OpKind::SPECIAL),
            And | Or | Xor => BITWISE,
            AndNot => OpKind::BINARY.union(OpKind::NO_FP).union(OpKind::SPECIAL),
            Lshl | Ashr | Lshr => SHIFT,
            Rol | Ror => SHIFT.union(OpKind::SPECIAL),
            Atan2 | Pow | Hypot => FP_BINARY,
            Fma => OpKind::TERNARY.union(OpKind::ONLY_FP),
            BitwiseBlend => OpKind::TERNARY.union(OpKind::NO_FP),
            Eq | Ne | Lt | Le | Gt | Ge => OpKind::COMPARISON,
            UnsignedLt | UnsignedLe | UnsignedGt | UnsignedGe => UNSIGNED,
            IsDefault | IsNegative => OpKind::TEST,
            IsFinite | IsNan | IsInfinite => OpKind::TEST.union(OpKind::ONLY_FP),
        }
    }

    /// Get the name of this operator.
    #[must_use]
    pub const fn name(self) -> &'static str {
        use Operator::*;
        match self {
            Neg => "NEG",
            Abs => "ABS",
            Not => "NOT",
            Zomo => "ZOMO",
            Sqrt => "SQRT",
            Cbrt => "CBRT",
            Sin => "SIN",
            Cos => "COS",
            Tan => "TAN",
            Asin => "ASIN",
            Acos => "ACOS",
            Atan => "ATAN",
            Sinh => "SINH",
            Cosh => "COSH",
            Tanh => "TANH",
            Exp => "EXP",
            Expm1 => "EXPM1",
            Log => "LOG",
            Log10 => "LOG10",
            Log1p => "LOG1P",
            Add => "ADD",
            Sub => "SUB",
            Mul => "MUL",
            Div => "DIV",
            Min => "MIN",
            Max => "MAX",
            FirstNonzero => "FIRST_NONZERO",
            And => "AND",
            AndNot => "AND_NOT",
            Or => "OR",
            Xor => "XOR",
            Lshl => "LSHL",
            Ashr => "ASHR",
            Lshr => "LSHR",
            Rol => "ROL",
            Ror => "ROR",
            Atan2 => "ATAN2",
            Pow => "POW",
            Hypot => "HYPOT",
            Fma => "FMA",
            BitwiseBlend => "BITWISE_BLEND",
            Eq => "EQ",
            Ne => "NE",
            Lt => "LT",
            Le => "LE",
            Gt => "GT",
            Ge => "GE",
            UnsignedLt => "UNSIGNED_LT",
            UnsignedLe => "UNSIGNED_LE",
            UnsignedGt => "UNSIGNED_GT",
            UnsignedGe => "UNSIGNED_GE",
            IsDefault => "IS_DEFAULT",
            IsNegative => "IS_NEGATIVE",
            IsFinite => "IS_FINITE",
            IsNan => "IS_NAN",
            IsInfinite => "IS_INFINITE",
        }
    }

    /// Check whether the operator has all of `flags`.
    #[must_use]
    pub const fn has(self, flags: OpKind) -> bool {
        self.kind().contains(flags)
    }

    /// Second operand is a shift count.
    #[must_use]
    pub const fn is_shift(self) -> bool {
        self.has(OpKind::SHIFT)
    }

    /// Defined for floating lanes only.
    #[must_use]
    pub const fn is_floating_only(self) -> bool {
        self.has(OpKind::ONLY_FP)
    }

    /// Defined for integral lanes only.
    #[must_use]
    pub const fn is_integral_only(self) -> bool {
        self.has(OpKind::NO_FP)
    }

    /// Emulated by the engine rather than run as a single kernel.
    #[must_use]
    pub const fn is_special(self) -> bool {
        self.has(OpKind::SPECIAL)
    }

    /// Check whether the operator is defined for `kind` lanes.
    #[must_use]
    pub const fn supports(self, kind: LaneKind) -> bool {
        if kind.is_floating() {
            !self.has(OpKind::NO_FP)
        } else {
            !self.has(OpKind::ONLY_FP)
        }
    }

    /// Fail unless the operator has the `arity` flag and accepts `kind`.
    pub(crate) fn require(self, arity: OpKind, kind: LaneKind) -> Result<()> {
        if !self.has(arity) {
            return Err(VectorError::WrongArity {
                op: self,
                expected: arity_name(arity),
            });
        }
        if !self.supports(kind) {
            return Err(VectorError::UnsupportedOperation { op: self, kind });
        }
        Ok(())
    }
}

fn arity_name(arity: OpKind) -> &'static str {
    if arity == OpKind::UNARY {
        "unary"
    } else if arity == OpKind::BINARY {
        "binary"
    } else if arity == OpKind::TERNARY {
        "ternary"
    } else if arity == OpKind::ASSOCIATIVE {
        "reduction"
    } else if arity == OpKind::COMPARISON {
        "comparison"
    } else if arity == OpKind::TEST {
        "test"
    } else {
        "lane-wise"
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_operator_has_one_arity() {
        let arities = OpKind::UNARY | OpKind::BINARY | OpKind::TERNARY | OpKind::COMPARISON | OpKind::TEST;
        for op in Operator::ALL {
            assert_eq!((op.kind() & arities).bits().count_ones(), 1, "{op}");
        }
    }

    #[test]
    fn test_lane_kind_support() {
        assert!(Operator::Add.supports(LaneKind::F32));
        assert!(!Operator::Xor.supports(LaneKind::F64));
        assert!(!Operator::Sqrt.supports(LaneKind::I32));
        assert!(Operator::IsNegative.supports(LaneKind::F32));
        assert!(!Operator::UnsignedLt.supports(LaneKind::F32));
    }

    #[test]
    fn test_require() {
        assert!(Operator::Add.require(OpKind::BINARY, LaneKind::I8).is_ok());
        assert!(matches!(
            Operator::Neg.require(OpKind::BINARY, LaneKind::I8),
            Err(VectorError::WrongArity { expected: "binary", .. })
        ));
        assert!(matches!(
            Operator::And.require(OpKind::BINARY, LaneKind::F32),
            Err(VectorError::UnsupportedOperation { .. })
        ));
        assert!(Operator::Sub.require(OpKind::ASSOCIATIVE, LaneKind::I32).is_err());
    }

    #[test]
    fn test_special_operators() {
        for op in [Operator::FirstNonzero, Operator::AndNot, Operator::Rol, Operator::Ror] {
            assert!(op.is_special());
        }
        assert!(!Operator::Add.is_special());
        assert!(Operator::Ror.is_shift());
    }

    #[test]
    fn test_display() {
        assert_eq!(Operator::FirstNonzero.to_string(), "FIRST_NONZERO");
        assert_eq!(Operator::UnsignedGe.to_string(), "UNSIGNED_GE");
    }
}
