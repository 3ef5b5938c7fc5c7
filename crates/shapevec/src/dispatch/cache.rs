//! Memoized operator implementations.

use crate::error::{Result, VectorError};
use crate::operator::Operator;
use crate::species::{Species, SpeciesId};
use dashmap::DashMap;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;

/// Cache of one family of operator implementations, keyed by operator and
/// species.
///
/// The first lookup of a key builds the implementation; later lookups clone
/// the stored handle. Two threads racing on the same key may both build it;
/// one result is kept and both are equivalent.
pub struct ImplCache<F> {
    family: &'static str,
    entries: DashMap<(Operator, SpeciesId), F, BuildHasherDefault<FxHasher>>,
}

impl<F: Clone> ImplCache<F> {
    /// Create an empty cache for the `family` of operators.
    #[must_use]
    pub fn new(family: &'static str) -> Self {
        Self {
            family,
            entries: DashMap::with_hasher(BuildHasherDefault::default()),
        }
    }

    /// Look up the implementation of `op` for `species`, building it with
    /// `make` on first use.
    pub fn find(
        &self,
        op: Operator,
        species: &Species,
        make: impl FnOnce(Operator) -> Option<F>,
    ) -> Result<F> {
        let key = (op, species.id());
        if let Some(entry) = self.entries.get(&key) {
            tracing::trace!(cache = self.family, %op, "cache hit");
            return Ok(entry.value().clone());
        }

        let built = make(op).ok_or(VectorError::UnsupportedOperation {
            op,
            kind: species.kind(),
        })?;
        let value = self.entries.entry(key).or_insert(built).value().clone();
        tracing::trace!(cache = self.family, %op, species = %species, "computed and cached");
        Ok(value)
    }

    /// Number of cached implementations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
