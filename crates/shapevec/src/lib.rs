//! Shape-polymorphic fixed-width vectors.
//!
//! A [`Vector<E>`] holds a fixed number of lanes of one primitive type.
//! Its [`VectorSpecies`] pairs the lane type with a [`VectorShape`], and the
//! pair fixes the lane count. Operations are written once against the
//! species and run on whatever shape the caller picks, including the widest
//! shape the host supports.
//!
//! # Overview
//!
//! - **Lane-wise operators** ([`Operator`]) with masked and scalar forms;
//! - **Reductions, comparisons and tests** producing scalars and [`Mask`]s;
//! - **Shuffles** ([`Shuffle`]) with slices, unslices and rearrangements;
//! - **Shape conversion** ([`convert`]) between species of any size;
//! - **Memory adapters** over lane and byte slices ([`ByteOrder`]).
//!
//! # Dispatch
//!
//! Every operator has a scalar fallback. The [`dispatch`] layer offers
//! operands to an accelerated [`dispatch::Backend`] first and runs the
//! fallback when the backend declines. Backends must be bit-identical to
//! the fallback.
//!
//! ```text
//! Vector::lanewise ─▶ dispatch ─▶ ImplCache (op, species) ─▶ fallback
//!                         │
//!                         └──────▶ Backend (SSE2 / AVX2 / scalar)
//! ```
//!
//! # Example
//!
//! ```
//! use shapevec::{Operator, VectorShape, VectorSpecies};
//!
//! let s = VectorSpecies::<i32>::of(VectorShape::S128)?;
//! let a = s.from_values(&[1, 2, 3, 4])?;
//! let b = s.broadcast(10);
//! assert_eq!(a.add(&b)?.to_vec(), [11, 12, 13, 14]);
//! assert_eq!(a.reduce_lanes(Operator::Add)?, 10);
//! # Ok::<(), shapevec::VectorError>(())
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod convert;
pub mod dispatch;
mod error;
mod lane;
mod mask;
mod memory;
mod operator;
pub mod platform;
mod shape;
mod shuffle;
mod species;
mod vector;

pub use config::{BackendChoice, Config, ConfigError};
pub use convert::{Conversion, ConversionKind, Placement};
pub use error::{FaultKind, Result, VectorError};
pub use lane::{Lane, LaneKind};
pub use mask::Mask;
pub use memory::ByteOrder;
pub use operator::{OpKind, Operator};
pub use platform::PlatformProfile;
pub use shape::VectorShape;
pub use shuffle::{Shuffle, ShuffleEntry};
pub use species::{Species, SpeciesId, VectorSpecies};
pub use vector::Vector;
