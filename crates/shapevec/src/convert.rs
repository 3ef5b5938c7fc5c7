//! Shape-changing conversions.
//!
//! A conversion either maps every lane numerically to a new lane kind
//! (cast or zero extension) or reinterprets the vector's raw bits. When the
//! result does not fill the target vector exactly, a *part* number picks
//! where the two line up:
//!
//! - **contraction** (result wider than the target): part `p` in
//!   `0..ratio` converts the `p`-th block of source lanes;
//! - **expansion** (result narrower than the target): part `p` in
//!   `-(ratio-1)..=0` places the result in the `-p`-th block of an otherwise
//!   zero target.
//!
//! All sizes are powers of two, so the planner works on `log2` sizes.

use crate::error::{Result, VectorError};
use crate::lane::{Lane, LaneBuf, LaneKind};
use crate::species::{Species, VectorSpecies};
use crate::vector::Vector;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a conversion maps lanes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionKind {
    /// Numeric value conversion.
    Cast,
    /// Unsigned widening of an integral lane.
    ZeroExtend,
    /// Same bits, different lane kind of the same width.
    Reinterpret,
}

/// A lane conversion from one lane kind to another.
///
/// Deserialized tokens go through the same checks as the constructors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawConversion")]
pub struct Conversion {
    kind: ConversionKind,
    from: LaneKind,
    to: LaneKind,
}

#[derive(Deserialize)]
struct RawConversion {
    kind: ConversionKind,
    from: LaneKind,
    to: LaneKind,
}

impl TryFrom<RawConversion> for Conversion {
    type Error = VectorError;

    fn try_from(raw: RawConversion) -> Result<Self> {
        match raw.kind {
            ConversionKind::Cast => Ok(Self::cast(raw.from, raw.to)),
            ConversionKind::ZeroExtend => Self::zero_extend(raw.from, raw.to),
            ConversionKind::Reinterpret => Self::reinterpret(raw.from, raw.to),
        }
    }
}

impl Conversion {
    /// Numeric conversion. Narrowing integers wrap; floats to integers
    /// truncate toward zero and saturate at the `i32` or `i64` range.
    #[must_use]
    pub const fn cast(from: LaneKind, to: LaneKind) -> Self {
        Self {
            kind: ConversionKind::Cast,
            from,
            to,
        }
    }

    /// Unsigned widening between integral kinds.
    pub fn zero_extend(from: LaneKind, to: LaneKind) -> Result<Self> {
        let conv = Self {
            kind: ConversionKind::ZeroExtend,
            from,
            to,
        };
        if from.is_integral() && to.is_integral() && to.bits() > from.bits() {
            Ok(conv)
        } else {
            Err(conv.invalid())
        }
    }

    /// Bit-preserving conversion between kinds of the same width.
    pub fn reinterpret(from: LaneKind, to: LaneKind) -> Result<Self> {
        let conv = Self {
            kind: ConversionKind::Reinterpret,
            from,
            to,
        };
        if from.bits() == to.bits() {
            Ok(conv)
        } else {
            Err(conv.invalid())
        }
    }

    /// The conversion of a kind to itself.
    #[must_use]
    pub const fn identity(kind: LaneKind) -> Self {
        Self::cast(kind, kind)
    }

    /// Conversion kind.
    #[must_use]
    pub const fn kind(self) -> ConversionKind {
        self.kind
    }

    /// Source lane kind.
    #[must_use]
    pub const fn from(self) -> LaneKind {
        self.from
    }

    /// Target lane kind.
    #[must_use]
    pub const fn to(self) -> LaneKind {
        self.to
    }

    /// Check if source and target kinds agree.
    #[must_use]
    pub fn is_identity(self) -> bool {
        self.from == self.to
    }

    /// Check if this conversion moves raw bits rather than values.
    #[must_use]
    pub fn is_reinterpret(self) -> bool {
        self.kind == ConversionKind::Reinterpret || self.is_identity()
    }

    fn invalid(self) -> VectorError {
        VectorError::InvalidConversion {
            conversion: self.to_string(),
            from: self.from,
            to: self.to,
        }
    }

    fn check<E: Lane, F: Lane>(self) -> Result<()> {
        if self.from == E::KIND && self.to == F::KIND {
            Ok(())
        } else {
            Err(VectorError::InvalidConversion {
                conversion: self.to_string(),
                from: E::KIND,
                to: F::KIND,
            })
        }
    }

    /// Convert one lane.
    pub fn apply<E: Lane, F: Lane>(self, x: E) -> Result<F> {
        self.check::<E, F>()?;
        Ok(self.apply_unchecked(x))
    }

    #[allow(clippy::cast_possible_wrap)]
    fn apply_unchecked<E: Lane, F: Lane>(self, x: E) -> F {
        match self.kind {
            ConversionKind::Reinterpret => F::from_bits(x.to_bits()),
            ConversionKind::ZeroExtend => F::from_i64(x.to_bits() as i64),
            ConversionKind::Cast if E::KIND.is_floating() => F::from_f64(x.to_f64()),
            ConversionKind::Cast => F::from_i64(x.to_i64()),
        }
    }
}

const fn kind_letter(kind: LaneKind) -> char {
    match kind {
        LaneKind::I8 => 'B',
        LaneKind::I16 => 'S',
        LaneKind::I32 => 'I',
        LaneKind::I64 => 'L',
        LaneKind::F32 => 'F',
        LaneKind::F64 => 'D',
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ConversionKind::Cast => {}
            ConversionKind::ZeroExtend => f.write_str("ZERO_EXTEND_")?,
            ConversionKind::Reinterpret => f.write_str("REINTERPRET_")?,
        }
        write!(f, "{}2{}", kind_letter(self.from), kind_letter(self.to))
    }
}

/// Where the source lanes of a conversion land in the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Placement {
    /// The converted source fills the target exactly.
    Whole,
    /// Only `source_lanes` lanes starting at `source_origin` are converted.
    Contract {
        /// First source lane converted.
        source_origin: usize,
        /// Number of source lanes converted.
        source_lanes: usize,
    },
    /// The converted source is placed at `target_offset` in a zero target.
    Expand {
        /// Target lane receiving the first converted lane.
        target_offset: usize,
    },
}

/// Plan a conversion from `src` to `dst` for `part`.
///
/// `lanewise` conversions keep the lane count and change each lane's size;
/// the others keep the bit size.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
pub fn plan(src: &Species, dst: &Species, lanewise: bool, part: i32) -> Result<Placement> {
    let log_logical = if lanewise {
        debug_assert!(src.lane_count().is_power_of_two());
        src.lane_count().trailing_zeros() + dst.element_bits().trailing_zeros()
    } else {
        src.vector_bit_size_log2()
    };
    let log_target = dst.vector_bit_size_log2();

    let placement = if log_logical == log_target {
        (part == 0).then_some(Placement::Whole)
    } else if log_logical > log_target {
        let shift = log_logical - log_target;
        let ratio = 1i64 << shift;
        (0..ratio).contains(&i64::from(part)).then(|| {
            let source_lanes = src.lane_count() >> shift;
            Placement::Contract {
                source_origin: part as usize * source_lanes,
                source_lanes,
            }
        })
    } else {
        let shift = log_target - log_logical;
        let ratio = 1i64 << shift;
        (-ratio + 1..=0).contains(&i64::from(part)).then(|| Placement::Expand {
            target_offset: (-part) as usize * (dst.lane_count() >> shift),
        })
    };

    placement.ok_or_else(|| VectorError::ConversionPart {
        part,
        action: if lanewise { "converting" } else { "reinterpreting" },
        from: src.id(),
        to: dst.id(),
        lane_change: lane_change(src, dst),
    })
}

fn lane_change(src: &Species, dst: &Species) -> String {
    if src.lane_count() == dst.lane_count() {
        String::new()
    } else {
        format!(" ({} lanes to {})", src.lane_count(), dst.lane_count())
    }
}

impl<E: Lane> Vector<E> {
    /// Convert the lanes with `conv` into a vector of `species`, which may
    /// have a different shape. See the module docs for `part`.
    pub fn convert_shape<F: Lane>(&self, conv: Conversion, species: VectorSpecies<F>, part: i32) -> Result<Vector<F>> {
        conv.check::<E, F>()?;
        if conv.is_reinterpret() {
            return self.reinterpret_shape(species, part);
        }
        let src = self.untyped_species();
        let dst = species.species();
        let lanes: LaneBuf<F> = match plan(src, dst, true, part)? {
            Placement::Whole => self.as_slice().iter().map(|&x| conv.apply_unchecked(x)).collect(),
            Placement::Contract {
                source_origin,
                source_lanes,
            } => self.as_slice()[source_origin..source_origin + source_lanes]
                .iter()
                .map(|&x| conv.apply_unchecked(x))
                .collect(),
            Placement::Expand { target_offset } => {
                let mut lanes: LaneBuf<F> = smallvec::smallvec![F::default(); dst.lane_count()];
                for (out, &x) in lanes[target_offset..].iter_mut().zip(self.as_slice()) {
                    *out = conv.apply_unchecked(x);
                }
                lanes
            }
        };
        Ok(Vector::from_parts(dst, lanes))
    }

    /// Convert the lanes with `conv`, keeping the shape.
    pub fn convert<F: Lane>(&self, conv: Conversion, part: i32) -> Result<Vector<F>> {
        self.convert_shape(conv, self.species().with_lanes::<F>()?, part)
    }

    /// Numeric conversion into `species`.
    pub fn cast_shape<F: Lane>(&self, species: VectorSpecies<F>, part: i32) -> Result<Vector<F>> {
        self.convert_shape(Conversion::cast(E::KIND, F::KIND), species, part)
    }

    /// Reinterpret the raw bits as a vector of `species`.
    ///
    /// Lanes are laid out little-endian regardless of the host.
    pub fn reinterpret_shape<F: Lane>(&self, species: VectorSpecies<F>, part: i32) -> Result<Vector<F>> {
        let src = self.untyped_species();
        let dst = species.species();
        let bytes = self.register_bytes();
        let size = src.element_size();
        let target = match plan(src, dst, false, part)? {
            Placement::Whole => bytes,
            Placement::Contract {
                source_origin,
                source_lanes,
            } => bytes[source_origin * size..(source_origin + source_lanes) * size].into(),
            Placement::Expand { target_offset } => {
                let start = target_offset * dst.element_size();
                let mut out = smallvec::smallvec![0u8; dst.vector_byte_size()];
                out[start..start + bytes.len()].copy_from_slice(&bytes);
                out
            }
        };
        Ok(Vector::from_register_bytes(dst, &target))
    }

    /// Same bits as lanes of `F`, keeping the shape.
    pub fn reinterpret_as<F: Lane>(&self) -> Result<Vector<F>> {
        self.reinterpret_shape(self.species().with_lanes::<F>()?, 0)
    }

    /// Same bits as byte lanes.
    pub fn reinterpret_as_bytes(&self) -> Result<Vector<i8>> {
        self.reinterpret_as::<i8>()
    }

    /// Same bits as integral lanes of the same width.
    pub fn view_as_integral_lanes(&self) -> Result<Vector<E::Integral>> {
        self.reinterpret_as::<E::Integral>()
    }

    /// Same bits as floating lanes of the same width. Byte and short lanes
    /// have no floating counterpart and fail with
    /// [`FaultKind::UnsupportedOperation`](crate::error::FaultKind).
    pub fn view_as_floating_lanes(&self) -> Result<Vector<E::Floating>> {
        Conversion::reinterpret(E::KIND, <E::Floating as Lane>::KIND)?;
        self.reinterpret_as::<E::Floating>()
    }
}
