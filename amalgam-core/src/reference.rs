//! Typed substance references.
//!
//! A reference is a stable, serializable pointer to a substance: a reference
//! code fixed by the concrete kind plus the target's id. On the wire a
//! reference is always the single string token `"<code>:<id>"`, in value
//! position and in map-key position alike, never an object.
//!
//! References resolve through the process-wide registry. An unknown or empty
//! id resolves to the well-known "none" substance rather than failing, so
//! graphs holding stale or forward-declared ids stay loadable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::registry;
use crate::substance::Substance;

/// Reference code for [`SubstanceReference`].
pub const SUBSTANCE_CODE: &str = "SR";
/// Reference code for [`HomogeneousReference`].
pub const HOMOGENEOUS_CODE: &str = "HR";

/// Error type for reference token parsing.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized reference token: {0}")]
pub struct ReferenceError(pub String);

/// A reference to any substance, token form `"SR:<id>"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SubstanceReference {
    id: String,
}

impl SubstanceReference {
    pub fn new(id: impl Into<String>) -> Self {
        SubstanceReference { id: id.into() }
    }

    /// The empty sentinel reference; resolves to the "none" substance.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    /// The fixed reference code of this kind.
    pub fn code(&self) -> &'static str {
        SUBSTANCE_CODE
    }

    /// Resolves through the registry; unknown ids yield the "none" substance.
    pub fn substance(&self) -> &'static Substance {
        registry::get(&self.id)
    }
}

impl fmt::Display for SubstanceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", SUBSTANCE_CODE, self.id)
    }
}

impl FromStr for SubstanceReference {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((SUBSTANCE_CODE, id)) => Ok(SubstanceReference::new(id)),
            _ => Err(ReferenceError(s.to_string())),
        }
    }
}

/// A reference that only resolves to homogeneous substances, token form
/// `"HR:<id>"`.
///
/// Resolution of an id that names a non-homogeneous substance yields "none",
/// mirroring the unknown-id behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct HomogeneousReference {
    id: String,
}

impl HomogeneousReference {
    pub fn new(id: impl Into<String>) -> Self {
        HomogeneousReference { id: id.into() }
    }

    /// The empty sentinel reference; resolves to the "none" substance.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    /// The fixed reference code of this kind.
    pub fn code(&self) -> &'static str {
        HOMOGENEOUS_CODE
    }

    /// Resolves through the registry, requiring the homogeneous capability.
    pub fn substance(&self) -> &'static Substance {
        let substance = registry::get(&self.id);
        if substance.is_homogeneous() {
            substance
        } else {
            registry::none()
        }
    }
}

impl fmt::Display for HomogeneousReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", HOMOGENEOUS_CODE, self.id)
    }
}

impl FromStr for HomogeneousReference {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((HOMOGENEOUS_CODE, id)) => Ok(HomogeneousReference::new(id)),
            _ => Err(ReferenceError(s.to_string())),
        }
    }
}

/// Either reference kind, for positions where both token prefixes are legal
/// (material and solution constituent keys).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    Substance(SubstanceReference),
    Homogeneous(HomogeneousReference),
}

impl Reference {
    pub fn id(&self) -> &str {
        match self {
            Reference::Substance(r) => r.id(),
            Reference::Homogeneous(r) => r.id(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Reference::Substance(r) => r.code(),
            Reference::Homogeneous(r) => r.code(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id().is_empty()
    }

    pub fn substance(&self) -> &'static Substance {
        match self {
            Reference::Substance(r) => r.substance(),
            Reference::Homogeneous(r) => r.substance(),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Substance(r) => r.fmt(f),
            Reference::Homogeneous(r) => r.fmt(f),
        }
    }
}

impl FromStr for Reference {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((SUBSTANCE_CODE, id)) => Ok(Reference::Substance(SubstanceReference::new(id))),
            Some((HOMOGENEOUS_CODE, id)) => {
                Ok(Reference::Homogeneous(HomogeneousReference::new(id)))
            }
            _ => Err(ReferenceError(s.to_string())),
        }
    }
}

impl From<SubstanceReference> for Reference {
    fn from(r: SubstanceReference) -> Self {
        Reference::Substance(r)
    }
}

impl From<HomogeneousReference> for Reference {
    fn from(r: HomogeneousReference) -> Self {
        Reference::Homogeneous(r)
    }
}

// Wire form is the display token, in value and map-key position alike.
macro_rules! impl_token_serde {
    ($t:ty) => {
        impl Serialize for $t {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $t {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let token = String::deserialize(deserializer)?;
                token.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

impl_token_serde!(SubstanceReference);
impl_token_serde!(HomogeneousReference);
impl_token_serde!(Reference);

// Cross-type equality: a reference equals the substance it points to.
// The symmetry of these impls is pinned by tests.

impl PartialEq<Substance> for SubstanceReference {
    fn eq(&self, other: &Substance) -> bool {
        !self.is_empty() && self.id == other.id()
    }
}

impl PartialEq<SubstanceReference> for Substance {
    fn eq(&self, other: &SubstanceReference) -> bool {
        other == self
    }
}

impl PartialEq<Substance> for HomogeneousReference {
    fn eq(&self, other: &Substance) -> bool {
        !self.is_empty() && self.id == other.id() && other.is_homogeneous()
    }
}

impl PartialEq<HomogeneousReference> for Substance {
    fn eq(&self, other: &HomogeneousReference) -> bool {
        other == self
    }
}

impl PartialEq<Substance> for Reference {
    fn eq(&self, other: &Substance) -> bool {
        match self {
            Reference::Substance(r) => r == other,
            Reference::Homogeneous(r) => r == other,
        }
    }
}

impl PartialEq<Reference> for Substance {
    fn eq(&self, other: &Reference) -> bool {
        other == self
    }
}
