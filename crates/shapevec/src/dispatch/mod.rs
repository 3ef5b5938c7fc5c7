//! Operator dispatch.
//!
//! Every lane-wise, reduction, comparison and test operation goes through
//! this module. A call resolves the operator's scalar fallback through the
//! per-lane-type [`Kernels`] caches, then offers the operands to the active
//! [`Backend`]. If the backend declines, the fallback runs.
//!
//! `SPECIAL` operators never get here; the vector engine builds them out of
//! other operators.

mod backend;
mod cache;
pub(crate) mod kernels;
#[cfg(target_arch = "x86_64")]
mod x86;

pub use backend::{Backend, LaneSlice, LaneSliceMut, ScalarBackend};
pub use cache::ImplCache;
#[cfg(target_arch = "x86_64")]
pub use x86::X86Backend;

use crate::config::{self, BackendChoice};
use crate::error::Result;
use crate::lane::{Lane, LaneBuf};
use crate::operator::{OpKind, Operator};
use crate::species::Species;
use parking_lot::RwLock;
use smallvec::{smallvec, SmallVec};
use std::sync::Arc;

/// Scalar fallback of a unary operator.
pub type UnaryImpl<E> = Arc<dyn Fn(&[E], &mut [E]) + Send + Sync>;
/// Scalar fallback of a binary operator.
pub type BinaryImpl<E> = Arc<dyn Fn(&[E], &[E], &mut [E]) + Send + Sync>;
/// Scalar fallback of a ternary operator.
pub type TernaryImpl<E> = Arc<dyn Fn(&[E], &[E], &[E], &mut [E]) + Send + Sync>;
/// Scalar fallback of a reduction.
pub type ReduceImpl<E> = Arc<dyn Fn(&[E]) -> E + Send + Sync>;
/// Scalar fallback of a comparison.
pub type CompareImpl<E> = Arc<dyn Fn(&[E], &[E], &mut [bool]) + Send + Sync>;
/// Scalar fallback of a test.
pub type TestImpl<E> = Arc<dyn Fn(&[E], &mut [bool]) + Send + Sync>;

pub(crate) type BoolBuf = SmallVec<[bool; 32]>;

/// Operator implementation caches for one lane type.
#[doc(hidden)]
pub struct Kernels<E: Lane> {
    unary: ImplCache<UnaryImpl<E>>,
    binary: ImplCache<BinaryImpl<E>>,
    ternary: ImplCache<TernaryImpl<E>>,
    reduce: ImplCache<ReduceImpl<E>>,
    compare: ImplCache<CompareImpl<E>>,
    test: ImplCache<TestImpl<E>>,
}

impl<E: Lane> Kernels<E> {
    pub(crate) fn new() -> Self {
        Self {
            unary: ImplCache::new("unary"),
            binary: ImplCache::new("binary"),
            ternary: ImplCache::new("ternary"),
            reduce: ImplCache::new("reduce"),
            compare: ImplCache::new("compare"),
            test: ImplCache::new("test"),
        }
    }

    /// Number of cached implementations over all families.
    #[must_use]
    pub fn len(&self) -> usize {
        self.unary.len()
            + self.binary.len()
            + self.ternary.len()
            + self.reduce.len()
            + self.compare.len()
            + self.test.len()
    }

    /// Check if nothing is cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static BACKEND: RwLock<Option<Arc<dyn Backend>>> = RwLock::new(None);

/// Build the backend selected by `choice`.
#[must_use]
pub fn default_backend(choice: BackendChoice) -> Arc<dyn Backend> {
    match choice {
        BackendChoice::Scalar => Arc::new(ScalarBackend::new()),
        BackendChoice::Auto => {
            #[cfg(target_arch = "x86_64")]
            {
                Arc::new(X86Backend::detect())
            }
            #[cfg(not(target_arch = "x86_64"))]
            {
                Arc::new(ScalarBackend::new())
            }
        }
    }
}

/// The active backend, installing the configured one on first use.
pub fn backend() -> Arc<dyn Backend> {
    if let Some(backend) = BACKEND.read().as_ref() {
        return Arc::clone(backend);
    }
    let mut slot = BACKEND.write();
    let backend = slot.get_or_insert_with(|| {
        let backend = default_backend(config::get().backend);
        tracing::info!(backend = backend.name(), "installed vector backend");
        backend
    });
    Arc::clone(backend)
}

/// Replace the active backend, returning the previous one.
///
/// Backends that report themselves unavailable are ignored and `None` is
/// returned.
pub fn install_backend(backend: Arc<dyn Backend>) -> Option<Arc<dyn Backend>> {
    if !backend.is_available() {
        tracing::warn!(backend = backend.name(), "backend is not available on this host");
        return None;
    }
    tracing::info!(backend = backend.name(), "installed vector backend");
    BACKEND.write().replace(backend)
}

pub(crate) fn unary<E: Lane>(op: Operator, species: &Species, a: &[E]) -> Result<LaneBuf<E>> {
    op.require(OpKind::UNARY, E::KIND)?;
    let fallback = E::kernels().unary.find(op, species, kernels::unary::<E>)?;
    let mut out: LaneBuf<E> = smallvec![E::default(); a.len()];
    if op.is_special() || !backend().unary(op, species, E::lanes(a), E::lanes_mut(&mut out)) {
        fallback(a, &mut out);
    }
    Ok(out)
}

pub(crate) fn binary<E: Lane>(op: Operator, species: &Species, a: &[E], b: &[E]) -> Result<LaneBuf<E>> {
    op.require(OpKind::BINARY, E::KIND)?;
    let fallback = E::kernels().binary.find(op, species, kernels::binary::<E>)?;
    let mut out: LaneBuf<E> = smallvec![E::default(); a.len()];
    if op.is_special()
        || !backend().binary(op, species, E::lanes(a), E::lanes(b), E::lanes_mut(&mut out))
    {
        fallback(a, b, &mut out);
    }
    Ok(out)
}

pub(crate) fn ternary<E: Lane>(
    op: Operator,
    species: &Species,
    a: &[E],
    b: &[E],
    c: &[E],
) -> Result<LaneBuf<E>> {
    op.require(OpKind::TERNARY, E::KIND)?;
    let fallback = E::kernels().ternary.find(op, species, kernels::ternary::<E>)?;
    let mut out: LaneBuf<E> = smallvec![E::default(); a.len()];
    if op.is_special()
        || !backend().ternary(
            op,
            species,
            E::lanes(a),
            E::lanes(b),
            E::lanes(c),
            E::lanes_mut(&mut out),
        )
    {
        fallback(a, b, c, &mut out);
    }
    Ok(out)
}

pub(crate) fn reduce<E: Lane>(op: Operator, species: &Species, a: &[E]) -> Result<E> {
    op.require(OpKind::ASSOCIATIVE, E::KIND)?;
    let fallback = E::kernels().reduce.find(op, species, kernels::reduce::<E>)?;
    let mut out = [E::default()];
    if op.is_special() || !backend().reduce(op, species, E::lanes(a), E::lanes_mut(&mut out)) {
        return Ok(fallback(a));
    }
    Ok(out[0])
}

pub(crate) fn compare<E: Lane>(op: Operator, species: &Species, a: &[E], b: &[E]) -> Result<BoolBuf> {
    op.require(OpKind::COMPARISON, E::KIND)?;
    let fallback = E::kernels().compare.find(op, species, kernels::compare::<E>)?;
    let mut out: BoolBuf = smallvec![false; a.len()];
    if !backend().compare(op, species, E::lanes(a), E::lanes(b), &mut out) {
        fallback(a, b, &mut out);
    }
    Ok(out)
}

pub(crate) fn test<E: Lane>(op: Operator, species: &Species, a: &[E]) -> Result<BoolBuf> {
    op.require(OpKind::TEST, E::KIND)?;
    let fallback = E::kernels().test.find(op, species, kernels::test::<E>)?;
    let mut out: BoolBuf = smallvec![false; a.len()];
    if !backend().test(op, species, E::lanes(a), &mut out) {
        fallback(a, &mut out);
    }
    Ok(out)
}

/// Run a binary operator on `backend` and on the scalar fallback, and
/// report whether the backend accepted it and matched bit for bit.
///
/// Returns `Ok(None)` when the backend declines the operands.
pub fn verify_binary<E: Lane>(
    backend: &dyn Backend,
    op: Operator,
    species: &Species,
    a: &[E],
    b: &[E],
) -> Result<Option<bool>> {
    op.require(OpKind::BINARY, E::KIND)?;
    let fallback = E::kernels().binary.find(op, species, kernels::binary::<E>)?;
    let mut expected = vec![E::default(); a.len()];
    fallback(a, b, &mut expected);
    let mut actual = vec![E::default(); a.len()];
    if op.is_special() || !backend.binary(op, species, E::lanes(a), E::lanes(b), E::lanes_mut(&mut actual)) {
        return Ok(None);
    }
    let identical = expected
        .iter()
        .zip(&actual)
        .all(|(x, y)| x.to_bits() == y.to_bits());
    Ok(Some(identical))
}
