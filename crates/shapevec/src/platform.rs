//! Vector widths of the running machine.
//!
//! Resolved once per process from the detected CPU features, or from
//! [`Config::max_bits`](crate::config::Config::max_bits) when set.

use crate::config::{self, Config};
use crate::lane::LaneKind;
use crate::shape::VectorShape;
use shapevec_target::{host_target, TargetSpec};
use std::sync::OnceLock;

/// Per-kind vector widths chosen for this process.
#[derive(Clone, Debug)]
pub struct PlatformProfile {
    target: TargetSpec,
    max_bits: u32,
    widths: [u32; LaneKind::ALL.len()],
    preferred: VectorShape,
}

impl PlatformProfile {
    fn resolve(target: TargetSpec, config: &Config) -> Self {
        let widths = match config.max_bits {
            Some(bits) => [bits; LaneKind::ALL.len()],
            None => LaneKind::ALL.map(|kind| {
                target
                    .features
                    .max_vector_width_for(kind.bits(), kind.is_floating())
            }),
        };
        let max_bits = widths.iter().copied().max().unwrap_or(64);
        let min_bits = widths.iter().copied().min().unwrap_or(64);
        let preferred = VectorShape::for_width(min_bits, max_bits);
        Self {
            target,
            max_bits,
            widths,
            preferred,
        }
    }

    /// The host description the profile was built from.
    #[must_use]
    pub fn target(&self) -> &TargetSpec {
        &self.target
    }

    /// Width of the `Max` shape in bits.
    #[must_use]
    pub const fn max_bits(&self) -> u32 {
        self.max_bits
    }

    /// Widest vector in bits for lanes of `kind`.
    #[must_use]
    pub const fn max_bits_for(&self, kind: LaneKind) -> u32 {
        self.widths[kind.index()]
    }

    /// Widest shape supported by every lane kind.
    #[must_use]
    pub const fn preferred(&self) -> VectorShape {
        self.preferred
    }

    /// Widest shape for lanes of `kind`.
    #[must_use]
    pub fn largest_for(&self, kind: LaneKind) -> VectorShape {
        VectorShape::for_width(self.max_bits_for(kind), self.max_bits)
    }
}

static PROFILE: OnceLock<PlatformProfile> = OnceLock::new();

/// The profile of this process.
pub fn profile() -> &'static PlatformProfile {
    PROFILE.get_or_init(|| {
        let profile = PlatformProfile::resolve(host_target(), config::get());
        log_resolved(&profile);
        profile
    })
}

/// Runs inside the `PROFILE` initializer, so it must not format a
/// [`VectorShape::Max`]: that reads `profile()` again.
fn log_resolved(profile: &PlatformProfile) {
    let preferred_bits = profile.preferred.fixed_bits().unwrap_or(profile.max_bits);
    tracing::debug!(
        target = %profile.target,
        max_bits = profile.max_bits,
        preferred_bits,
        "resolved vector platform"
    );
}
