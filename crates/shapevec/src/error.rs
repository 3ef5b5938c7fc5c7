//! Error types for vector operations.

use crate::config::ConfigError;
use crate::lane::LaneKind;
use crate::operator::Operator;
use crate::species::SpeciesId;
use thiserror::Error;

/// Result type for vector operations.
pub type Result<T> = std::result::Result<T, VectorError>;

/// Coarse classification of a [`VectorError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// A lane, shuffle, part, slice or memory index is out of range, or two
    /// operands disagree on their species.
    IndexOutOfRange,
    /// A value or configuration cannot be represented.
    IllegalValue,
    /// Integral division with a zero divisor in an active lane.
    DivideByZero,
    /// The operator or query is not defined for the operands.
    UnsupportedOperation,
}

/// Errors raised by vector, mask and shuffle operations.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum VectorError {
    /// Lane index outside `0..lane_count`.
    #[error("lane index {index} out of bounds for length {lane_count}")]
    LaneIndex {
        /// The rejected index.
        index: usize,
        /// Number of lanes.
        lane_count: usize,
    },

    /// A shuffle entry is exceptional where a valid source lane is required.
    #[error("shuffle index {index} at lane {lane} out of bounds for length {lane_count}")]
    ShuffleIndex {
        /// Lane holding the exceptional entry.
        lane: usize,
        /// The exceptional entry.
        index: i64,
        /// Number of lanes.
        lane_count: usize,
    },

    /// Illegal part number for a shape-changing conversion.
    #[error("bad part number {part} {action} {from} -> {to}{lane_change}")]
    ConversionPart {
        /// The rejected part number.
        part: i32,
        /// `converting` or `reinterpreting`.
        action: &'static str,
        /// Source species.
        from: SpeciesId,
        /// Target species.
        to: SpeciesId,
        /// Describes how the lane count changes, if it does.
        lane_change: String,
    },

    /// Part number of an unslice that is neither 0 nor 1.
    #[error("bad part number {part} for slice operation")]
    SlicePart {
        /// The rejected part number.
        part: i32,
    },

    /// Slice origin greater than the lane count.
    #[error("slice origin {origin} out of bounds for length {lane_count}")]
    SliceOrigin {
        /// The rejected origin.
        origin: usize,
        /// Number of lanes.
        lane_count: usize,
    },

    /// Operands of different species.
    #[error("species mismatch: expected {expected}, found {found}")]
    SpeciesMismatch {
        /// Species of the receiver.
        expected: SpeciesId,
        /// Species of the argument.
        found: SpeciesId,
    },

    /// A memory access that falls outside its container.
    #[error("range {offset}..{offset}+{len} out of bounds for length {available}")]
    OutOfBounds {
        /// First element accessed.
        offset: usize,
        /// Number of elements accessed.
        len: usize,
        /// Length of the container.
        available: usize,
    },

    /// A scalar that the lane kind cannot hold exactly.
    #[error("{value} is not representable as {kind}")]
    NotRepresentable {
        /// The value, formatted.
        value: String,
        /// The lane kind.
        kind: LaneKind,
    },

    /// Lane kind and shape that do not yield a whole number of lanes.
    #[error("{kind} lanes do not fit a {bits}-bit vector")]
    UnsupportedSpecies {
        /// The lane kind.
        kind: LaneKind,
        /// The shape size.
        bits: u32,
    },

    /// Bit size that names no vector shape.
    #[error("no vector shape is {bits} bits wide")]
    UnsupportedShape {
        /// The rejected size.
        bits: u32,
    },

    /// Lane data whose length differs from the species lane count.
    #[error("expected {expected} lanes, got {actual}")]
    LaneCountMismatch {
        /// Lanes required.
        expected: usize,
        /// Lanes supplied.
        actual: usize,
    },

    /// Rejected configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Integral division by zero.
    #[error("division by zero in lane {lane}")]
    DivideByZero {
        /// First active lane with a zero divisor.
        lane: usize,
    },

    /// Operator not defined for the lane kind.
    #[error("operator {op} is not supported for {kind} lanes")]
    UnsupportedOperation {
        /// The operator.
        op: Operator,
        /// The lane kind.
        kind: LaneKind,
    },

    /// Operator used with the wrong number of operands.
    #[error("operator {op} is not a {expected} operator")]
    WrongArity {
        /// The operator.
        op: Operator,
        /// The arity the call site needed.
        expected: &'static str,
    },

    /// Conversion token that does not match its operands.
    #[error("cannot apply {conversion} to {from} -> {to} lanes")]
    InvalidConversion {
        /// The conversion, formatted.
        conversion: String,
        /// Source lane kind.
        from: LaneKind,
        /// Target lane kind.
        to: LaneKind,
    },

    /// Mask too wide for a 64-bit word.
    #[error("mask of {lane_count} lanes does not fit in 64 bits")]
    MaskTooWide {
        /// Number of lanes.
        lane_count: usize,
    },
}

impl VectorError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> FaultKind {
        match self {
            Self::LaneIndex { .. }
            | Self::ShuffleIndex { .. }
            | Self::ConversionPart { .. }
            | Self::SlicePart { .. }
            | Self::SliceOrigin { .. }
            | Self::SpeciesMismatch { .. }
            | Self::LaneCountMismatch { .. }
            | Self::OutOfBounds { .. } => FaultKind::IndexOutOfRange,
            Self::NotRepresentable { .. }
            | Self::UnsupportedSpecies { .. }
            | Self::UnsupportedShape { .. }
            | Self::InvalidConfig(_) => FaultKind::IllegalValue,
            Self::DivideByZero { .. } => FaultKind::DivideByZero,
            Self::UnsupportedOperation { .. }
            | Self::WrongArity { .. }
            | Self::InvalidConversion { .. }
            | Self::MaskTooWide { .. } => FaultKind::UnsupportedOperation,
        }
    }

    pub(crate) fn check_lane(index: usize, lane_count: usize) -> Result<()> {
        if index < lane_count {
            Ok(())
        } else {
            Err(Self::LaneIndex { index, lane_count })
        }
    }

    pub(crate) fn check_range(offset: usize, len: usize, available: usize) -> Result<()> {
        match offset.checked_add(len) {
            Some(end) if end <= available => Ok(()),
            _ => Err(Self::OutOfBounds {
                offset,
                len,
                available,
            }),
        }
    }
}
