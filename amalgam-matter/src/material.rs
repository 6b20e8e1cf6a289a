//! Materials: physical bodies of matter.
//!
//! A [`Material`] is an ordinary mutable value holder: a constituent map at
//! normalized proportions plus shape, mass, density and an optional
//! temperature. Constituent mutation goes through the same rebalancing
//! engine mixtures use, so the sum-to-1 invariant holds after every
//! operation. A material whose last constituent is removed resets to the
//! empty sentinel: zero mass, zero density, origin shape, no temperature.
//!
//! Materials are not synchronized; concurrent mutation needs external
//! locking.

use serde::{Deserialize, Serialize};

use amalgam_core::proportions::{ProportionError, Proportions};
use amalgam_core::reference::Reference;
use amalgam_core::substance::Substance;

use crate::shape::Shape;

/// Error type for material operations.
#[derive(Debug, thiserror::Error)]
pub enum MaterialError {
    #[error("split share out of range: {0}")]
    InvalidShare(f64),
    #[error(transparent)]
    Proportion(#[from] ProportionError),
}

/// A body of matter: constituents at normalized proportions, a shape, and
/// bulk physical state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Keyed by `SR:` or `HR:` tokens; values sum to 1.
    #[serde(default)]
    pub constituents: Proportions<Reference>,
    #[serde(default)]
    pub shape: Shape,
    /// Mass in kg.
    #[serde(default)]
    pub mass: f64,
    /// Density in kg/m³.
    #[serde(default)]
    pub density: f64,
    /// Temperature in K, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl Material {
    /// The empty material: no constituents, zero mass and density, origin
    /// shape, no temperature.
    pub fn empty() -> Self {
        Material {
            constituents: Proportions::new(),
            shape: Shape::origin(),
            mass: 0.0,
            density: 0.0,
            temperature: None,
        }
    }

    pub fn new(shape: Shape, mass: f64, density: f64) -> Self {
        Material {
            constituents: Proportions::new(),
            shape,
            mass,
            density,
            temperature: None,
        }
    }

    /// A material made of a single substance.
    pub fn of_substance(
        reference: impl Into<Reference>,
        shape: Shape,
        mass: f64,
        density: f64,
    ) -> Self {
        let mut material = Material::new(shape, mass, density);
        // A share of 1 on an empty container cannot be out of range.
        let _ = material.constituents.set(reference.into(), 1.0);
        material
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.constituents.is_empty()
    }

    /// Sets a constituent's share, rebalancing the others.
    pub fn add_constituent(
        &mut self,
        reference: impl Into<Reference>,
        proportion: f64,
    ) -> Result<(), ProportionError> {
        self.constituents.set(reference.into(), proportion)
    }

    /// Sets a batch of shares with one aggregate rebalance.
    pub fn add_constituents(
        &mut self,
        pairs: impl IntoIterator<Item = (Reference, f64)>,
    ) -> Result<(), ProportionError> {
        self.constituents.set_many(pairs)
    }

    /// Removes a constituent, rescaling the survivors. Removing the last
    /// constituent resets the material to [`Material::empty`].
    pub fn remove_constituent(&mut self, reference: &Reference) -> Option<f64> {
        let removed = self.constituents.remove(reference);
        if removed.is_some() && self.constituents.is_empty() {
            *self = Material::empty();
        }
        removed
    }

    /// Removes every constituent matching the predicate, rebalancing once
    /// for the aggregate. Returns the number removed.
    pub fn remove_constituents(
        &mut self,
        predicate: impl FnMut(&Reference, f64) -> bool,
    ) -> usize {
        let removed = self.constituents.remove_by(predicate);
        if removed > 0 && self.constituents.is_empty() {
            *self = Material::empty();
        }
        removed
    }

    /// The referenced constituent's share, 0 when absent.
    pub fn proportion_of(&self, reference: &Reference) -> f64 {
        self.constituents.proportion(reference)
    }

    /// Share of the given substance itself; `SR:` and `HR:` entries for the
    /// same id both count.
    pub fn proportion_of_substance(&self, substance: &Substance) -> f64 {
        self.constituents
            .iter()
            .filter(|(reference, _)| **reference == *substance)
            .map(|(_, share)| share)
            .sum()
    }

    /// An independent copy with the mass scaled; composition, shape, density
    /// and temperature carry over unchanged.
    pub fn clone_scaled(&self, factor: f64) -> Material {
        let mut clone = self.clone();
        clone.mass *= factor;
        clone
    }

    /// Splits into a composite of mass bands sharing this material's shape.
    ///
    /// No shares means an even two-way split; exactly one share `p` means
    /// `[p, 1 - p]`; otherwise the shares are normalized to sum 1. Each
    /// component is a mass-scaled clone, so relative composition per band is
    /// preserved.
    pub fn split(&self, shares: &[f64]) -> Result<Composite, MaterialError> {
        let shares: Vec<f64> = match shares {
            [] => vec![0.5, 0.5],
            &[p] => {
                if !p.is_finite() || p <= 0.0 || p >= 1.0 {
                    return Err(MaterialError::InvalidShare(p));
                }
                vec![p, 1.0 - p]
            }
            many => {
                for &share in many {
                    if !share.is_finite() || share <= 0.0 {
                        return Err(MaterialError::InvalidShare(share));
                    }
                }
                let total: f64 = many.iter().sum();
                many.iter().map(|share| share / total).collect()
            }
        };
        let components = shares
            .iter()
            .map(|&share| self.clone_scaled(share))
            .collect();
        Ok(Composite {
            components,
            shape: self.shape.clone(),
        })
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::empty()
    }
}

/// Several materials sharing one shape, e.g. the bands of a split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composite {
    pub components: Vec<Material>,
    #[serde(default)]
    pub shape: Shape,
}

impl Composite {
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Total mass across components, kg.
    pub fn mass(&self) -> f64 {
        self.components.iter().map(|m| m.mass).sum()
    }

    /// Mass-weighted share of the referenced constituent across components.
    pub fn proportion_of(&self, reference: &Reference) -> f64 {
        let total = self.mass();
        if total <= 0.0 {
            return 0.0;
        }
        self.components
            .iter()
            .map(|m| m.proportion_of(reference) * m.mass)
            .sum::<f64>()
            / total
    }
}
