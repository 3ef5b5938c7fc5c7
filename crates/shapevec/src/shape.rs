//! Vector shapes.

use crate::error::{Result, VectorError};
use crate::lane::LaneKind;
use crate::platform;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Total bit width of a vector.
///
/// `Max` is the widest width of the running platform (or the configured
/// override). It is fixed on first use and may coincide with a fixed shape
/// size while remaining a distinct shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VectorShape {
    /// 64 bits.
    S64,
    /// 128 bits.
    S128,
    /// 256 bits.
    S256,
    /// 512 bits.
    S512,
    /// The platform maximum.
    Max,
}

impl VectorShape {
    /// Every shape, in registry order.
    pub const ALL: [Self; 5] = [Self::S64, Self::S128, Self::S256, Self::S512, Self::Max];

    /// Position of this shape in [`VectorShape::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::S64 => 0,
            Self::S128 => 1,
            Self::S256 => 2,
            Self::S512 => 3,
            Self::Max => 4,
        }
    }

    /// Bit size of a fixed shape, `None` for `Max`.
    #[must_use]
    pub const fn fixed_bits(self) -> Option<u32> {
        match self {
            Self::S64 => Some(64),
            Self::S128 => Some(128),
            Self::S256 => Some(256),
            Self::S512 => Some(512),
            Self::Max => None,
        }
    }

    /// Size in bits.
    #[must_use]
    pub fn bit_size(self) -> u32 {
        match self.fixed_bits() {
            Some(bits) => bits,
            None => platform::profile().max_bits(),
        }
    }

    /// Size in bytes.
    #[must_use]
    pub fn byte_size(self) -> usize {
        (self.bit_size() / 8) as usize
    }

    /// Base-2 logarithm of the bit size.
    #[must_use]
    pub fn bit_size_log2(self) -> u32 {
        let bits = self.bit_size();
        debug_assert!(bits.is_power_of_two(), "shape size {bits} is not a power of two");
        bits.trailing_zeros()
    }

    /// Number of `kind` lanes in this shape.
    #[must_use]
    pub fn lane_count(self, kind: LaneKind) -> usize {
        (self.bit_size() / kind.bits()) as usize
    }

    /// The shape with `bits` bits.
    ///
    /// Fixed sizes win over `Max` when both match.
    pub fn for_bit_size(bits: u32) -> Result<Self> {
        match bits {
            64 => Ok(Self::S64),
            128 => Ok(Self::S128),
            256 => Ok(Self::S256),
            512 => Ok(Self::S512),
            _ if bits == platform::profile().max_bits() => Ok(Self::Max),
            _ => Err(VectorError::UnsupportedShape { bits }),
        }
    }

    /// Map a width known to the platform to a shape without consulting the
    /// resolved profile.
    pub(crate) const fn for_width(bits: u32, max_bits: u32) -> Self {
        match bits {
            64 => Self::S64,
            128 => Self::S128,
            256 => Self::S256,
            512 => Self::S512,
            _ => {
                debug_assert!(bits == max_bits);
                Self::Max
            }
        }
    }

    /// Widest shape supported by every lane kind.
    #[must_use]
    pub fn preferred() -> Self {
        platform::profile().preferred()
    }

    /// Widest shape supported for lanes of `kind`.
    #[must_use]
    pub fn largest_for(kind: LaneKind) -> Self {
        platform::profile().largest_for(kind)
    }
}

impl fmt::Display for VectorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fixed_bits() {
            Some(bits) => write!(f, "{bits}-bit"),
            None => write!(f, "max({}-bit)", self.bit_size()),
        }
    }
}
