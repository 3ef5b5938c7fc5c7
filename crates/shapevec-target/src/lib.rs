//! Host platform description for shapevec.
//!
//! This crate answers the questions the vector library needs to ask about
//! the machine it runs on: which architecture it is, which SIMD extensions
//! the CPU reports at runtime, what byte order it uses, and how wide a
//! vector register is for each lane width.
//!
//! # Supported Architectures
//!
//! - **x86_64**: SSE2 baseline, SSE4.2, AVX, AVX2, AVX-512 (F and BW)
//! - **aarch64**: NEON baseline, SVE
//! - **wasm32**: SIMD128
//!
//! Anything else is reported as [`Arch::Other`] and gets the 64-bit
//! scalar-register width.

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// Host architecture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Arch {
    /// x86-64 (AMD64).
    X86_64,
    /// 64-bit ARM.
    Aarch64,
    /// 32-bit WebAssembly.
    Wasm32,
    /// 64-bit RISC-V.
    Riscv64,
    /// Any other architecture.
    Other,
}

impl Arch {
    /// The architecture this crate was compiled for.
    #[must_use]
    pub const fn host() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            Self::X86_64
        }
        #[cfg(target_arch = "aarch64")]
        {
            Self::Aarch64
        }
        #[cfg(target_arch = "wasm32")]
        {
            Self::Wasm32
        }
        #[cfg(target_arch = "riscv64")]
        {
            Self::Riscv64
        }
        #[cfg(not(any(
            target_arch = "x86_64",
            target_arch = "aarch64",
            target_arch = "wasm32",
            target_arch = "riscv64"
        )))]
        {
            Self::Other
        }
    }

    /// Get the name of this architecture.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Aarch64 => "aarch64",
            Self::Wasm32 => "wasm32",
            Self::Riscv64 => "riscv64",
            Self::Other => "other",
        }
    }

    /// Check if this architecture has a SIMD register file we know about.
    #[must_use]
    pub const fn has_simd(self) -> bool {
        matches!(self, Self::X86_64 | Self::Aarch64 | Self::Wasm32)
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Byte order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endianness {
    /// Little-endian byte order.
    Little,
    /// Big-endian byte order.
    Big,
}

impl Endianness {
    /// Byte order of the host.
    #[must_use]
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Little => write!(f, "little"),
            Self::Big => write!(f, "big"),
        }
    }
}

/// SIMD features reported by the CPU.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuFeatures {
    /// SSE2 support (x86_64 baseline).
    pub sse2: bool,
    /// SSE4.2 support (x86_64).
    pub sse42: bool,
    /// AVX support (x86_64).
    pub avx: bool,
    /// AVX2 support (x86_64).
    pub avx2: bool,
    /// AVX-512 Foundation support (x86_64).
    pub avx512: bool,
    /// AVX-512 byte/word instructions (x86_64).
    pub avx512bw: bool,
    /// NEON support (aarch64).
    pub neon: bool,
    /// SVE support (aarch64).
    pub sve: bool,
    /// SIMD128 support (wasm).
    pub simd128: bool,
}

impl CpuFeatures {
    /// Create a feature set with no features enabled.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            sse2: false,
            sse42: false,
            avx: false,
            avx2: false,
            avx512: false,
            avx512bw: false,
            neon: false,
            sve: false,
            simd128: false,
        }
    }

    /// Create a feature set with the guaranteed baseline for `arch`.
    #[must_use]
    pub fn baseline_for_arch(arch: Arch) -> Self {
        let mut features = Self::none();
        match arch {
            Arch::X86_64 => {
                features.sse2 = true;
            }
            Arch::Aarch64 => {
                features.neon = true;
            }
            Arch::Wasm32 => {
                features.simd128 = cfg!(target_feature = "simd128");
            }
            _ => {}
        }
        features
    }

    /// Query the running CPU.
    #[must_use]
    pub fn detect() -> Self {
        #[allow(unused_mut)]
        let mut features = Self::baseline_for_arch(Arch::host());

        #[cfg(target_arch = "x86_64")]
        {
            features.sse42 = is_x86_feature_detected!("sse4.2");
            features.avx = is_x86_feature_detected!("avx");
            features.avx2 = is_x86_feature_detected!("avx2");
            features.avx512 = is_x86_feature_detected!("avx512f");
            features.avx512bw = is_x86_feature_detected!("avx512bw");
        }

        #[cfg(target_arch = "aarch64")]
        {
            features.neon = std::arch::is_aarch64_feature_detected!("neon");
            features.sve = std::arch::is_aarch64_feature_detected!("sve");
        }

        features
    }

    /// Get the maximum SIMD vector width in bits over all lane widths.
    #[must_use]
    pub const fn max_vector_width(&self) -> u32 {
        if self.avx512 {
            512
        } else if self.avx || self.avx2 {
            256
        } else if self.sse2 || self.sse42 || self.neon || self.simd128 || self.sve {
            128
        } else {
            64
        }
    }

    /// Get the maximum vector width in bits for lanes of `lane_bits` bits.
    ///
    /// x86 is uneven here: AVX widened only the floating-point registers
    /// (integral 256-bit arithmetic arrived with AVX2), and AVX-512 byte and
    /// word lanes need the BW extension.
    #[must_use]
    pub const fn max_vector_width_for(&self, lane_bits: u32, floating: bool) -> u32 {
        let width = if self.avx512 {
            if lane_bits >= 32 || self.avx512bw {
                512
            } else if self.avx2 {
                256
            } else {
                128
            }
        } else if self.avx2 || (self.avx && floating) {
            256
        } else {
            self.baseline_width()
        };
        if width < lane_bits {
            lane_bits
        } else {
            width
        }
    }

    const fn baseline_width(&self) -> u32 {
        if self.sse2 || self.sse42 || self.avx || self.neon || self.simd128 || self.sve {
            128
        } else {
            64
        }
    }

    /// Names of the enabled features, in a stable order.
    #[must_use]
    pub fn enabled(&self) -> Vec<&'static str> {
        let table = [
            (self.sse2, "sse2"),
            (self.sse42, "sse4.2"),
            (self.avx, "avx"),
            (self.avx2, "avx2"),
            (self.avx512, "avx512f"),
            (self.avx512bw, "avx512bw"),
            (self.neon, "neon"),
            (self.sve, "sve"),
            (self.simd128, "simd128"),
        ];
        table
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, name)| *name)
            .collect()
    }
}

/// A description of the host machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    /// Architecture.
    pub arch: Arch,
    /// Byte order.
    pub endianness: Endianness,
    /// CPU features.
    pub features: CpuFeatures,
}

impl TargetSpec {
    /// Get the maximum vector width in bits over all lane widths.
    #[must_use]
    pub const fn max_vector_width(&self) -> u32 {
        self.features.max_vector_width()
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}-endian", self.arch, self.endianness)?;
        for name in self.features.enabled() {
            write!(f, ", {name}")?;
        }
        write!(f, ")")
    }
}

/// Get the target specification for the host machine, with runtime-detected
/// CPU features.
#[must_use]
pub fn host_target() -> TargetSpec {
    TargetSpec {
        arch: Arch::host(),
        endianness: Endianness::native(),
        features: CpuFeatures::detect(),
    }
}
