//! Physical materials built on the substance model.
//!
//! Core concepts:
//! - **Material**: a mutable body of matter: constituents at normalized
//!   proportions plus shape, mass, density and optional temperature
//! - **Composite**: several materials sharing one shape, e.g. the mass bands
//!   produced by splitting
//! - **Shape**: an opaque geometric capability (volume, placement,
//!   clone-style repositioning)
//!
//! Constituents are keyed by substance reference tokens from
//! [`amalgam_core`], so persisted materials survive catalog evolution: stale
//! references resolve to the "none" substance instead of failing.
//!
//! # Example
//!
//! ```
//! use amalgam_core::reference::HomogeneousReference;
//! use amalgam_matter::{codec, Material, Shape};
//!
//! let mut block = Material::of_substance(
//!     HomogeneousReference::new("water"),
//!     Shape::cuboid([0.1, 0.1, 0.1]),
//!     1.0,
//!     998.2,
//! );
//! block
//!     .add_constituent(HomogeneousReference::new("ethanol"), 0.2)
//!     .unwrap();
//!
//! let text = codec::encode(&block.clone().into()).unwrap();
//! let decoded = codec::decode(&text).unwrap();
//! assert_eq!(decoded, block.into());
//! ```

pub mod codec;
pub mod material;
pub mod shape;

pub use codec::{CodecError, Matter};
pub use material::{Composite, Material, MaterialError};
pub use shape::{Shape, Vec3};
