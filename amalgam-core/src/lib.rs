//! Amalgam models chemical substances and their composition.
//!
//! Core concepts:
//! - **Substance**: a closed variant set (chemicals, uniform matter,
//!   mixtures, solutions) unified under one sum type
//! - **Reference**: a stable, serializable pointer to a substance by
//!   reference code and id (`"HR:water"`), resolved through the registry
//! - **Registry**: a process-wide, lazily populated catalog of built-in
//!   substances with persistent ids
//! - **Proportions**: normalized constituent shares, rebalanced in place on
//!   every mutation so they always sum to 1
//! - **Formula**: canonical molecular formulas with glyph-exact round trips
//!   (`H₂O`, `O₄S²⁻`)
//!
//! # Example
//!
//! ```
//! use amalgam_core::{codec, registry};
//!
//! let water = registry::catalog::water();
//! let reference = water.reference();
//! assert_eq!(reference.to_string(), "SR:water");
//!
//! // Round trips preserve the runtime variant through the sum type
//! let text = codec::encode(water).unwrap();
//! let decoded = codec::decode(&text).unwrap();
//! assert_eq!(&decoded, water);
//! ```
//!
//! # Serialization
//!
//! Substances travel as JSON objects tagged with a `"type"` discriminator;
//! references travel as single string tokens, in value and map-key position
//! alike. Both forms are stable wire contracts persisted in user data.

pub mod codec;
pub mod formula;
pub mod nuclide;
pub mod proportions;
pub mod reference;
pub mod registry;
pub mod substance;

pub use codec::CodecError;
pub use formula::{Formula, FormulaError};
pub use nuclide::{Element, Isotope, IsotopeKey, Nuclide, NuclideError};
pub use proportions::{ProportionError, Proportions};
pub use reference::{HomogeneousReference, Reference, ReferenceError, SubstanceReference};
pub use substance::{
    Chemical, HomogeneousSubstance, Mixture, Phase, Solution, Substance,
};
