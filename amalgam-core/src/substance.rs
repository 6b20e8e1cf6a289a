//! The substance hierarchy.
//!
//! Substances form a closed variant set:
//! - [`Chemical`]: a homogeneous substance defined by a molecular formula
//! - [`HomogeneousSubstance`]: uniform matter without a single formula
//!   (minerals, polymers, biological materials)
//! - [`Mixture`]: homogeneous constituents at normalized proportions
//! - [`Solution`]: constituents dissolved in a designated solvent
//!
//! [`Substance`] is the sum type unifying them. Registry instances are shared
//! and treated as immutable; the mutating composition methods live on owned
//! values (builders and copies), never on the shared catalog entries.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::formula::Formula;
use crate::proportions::{ProportionError, Proportions};
use crate::reference::{HomogeneousReference, Reference, SubstanceReference};

/// Molar gas constant, J/(mol·K).
pub const GAS_CONSTANT: f64 = 8.31446261815324;
/// Standard pressure, Pa.
pub const STANDARD_PRESSURE: f64 = 101_325.0;
/// Standard temperature, K.
pub const STANDARD_TEMPERATURE: f64 = 293.15;

/// Phase of matter at given conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Solid,
    Liquid,
    Gas,
}

fn phase_between(temperature: f64, melting_point: f64, boiling_point: f64) -> Phase {
    if temperature < melting_point {
        Phase::Solid
    } else if temperature < boiling_point {
        Phase::Liquid
    } else {
        Phase::Gas
    }
}

/// Ideal-gas density in kg/m³ for a molar mass in g/mol.
fn ideal_gas_density(molar_mass: f64, temperature: f64, pressure: f64) -> f64 {
    if temperature <= 0.0 {
        return 0.0;
    }
    pressure * (molar_mass / 1000.0) / (GAS_CONSTANT * temperature)
}

/// A homogeneous substance defined by a molecular formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chemical {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub categories: BTreeSet<String>,
    pub formula: Formula,
    /// Density at standard conditions, kg/m³.
    pub density: f64,
    /// Melting point, K.
    pub melting_point: f64,
    /// Boiling point, K.
    pub boiling_point: f64,
}

impl Chemical {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        formula: Formula,
        density: f64,
        melting_point: f64,
        boiling_point: f64,
    ) -> Self {
        Chemical {
            id: id.into(),
            name: name.into(),
            categories: BTreeSet::new(),
            formula,
            density,
            melting_point,
            boiling_point,
        }
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Molar mass in g/mol, derived from the formula.
    pub fn molar_mass(&self) -> f64 {
        self.formula.molar_mass()
    }

    pub fn phase(&self, temperature: f64, _pressure: f64) -> Phase {
        phase_between(temperature, self.melting_point, self.boiling_point)
    }

    pub fn density(&self, temperature: f64, pressure: f64) -> f64 {
        match self.phase(temperature, pressure) {
            Phase::Gas => ideal_gas_density(self.molar_mass(), temperature, pressure),
            _ => self.density,
        }
    }
}

/// Uniform matter without a single molecular formula.
///
/// Numeric fields default to zero on deserialization so that degraded
/// records (and the ancestor-fallback decode path) still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomogeneousSubstance {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub categories: BTreeSet<String>,
    /// Mean molar mass in g/mol, when meaningful.
    #[serde(default)]
    pub molar_mass: Option<f64>,
    /// Density at standard conditions, kg/m³.
    #[serde(default)]
    pub density: f64,
    #[serde(default)]
    pub melting_point: f64,
    #[serde(default)]
    pub boiling_point: f64,
}

impl HomogeneousSubstance {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        density: f64,
        melting_point: f64,
        boiling_point: f64,
    ) -> Self {
        HomogeneousSubstance {
            id: id.into(),
            name: name.into(),
            categories: BTreeSet::new(),
            molar_mass: None,
            density,
            melting_point,
            boiling_point,
        }
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_molar_mass(mut self, molar_mass: f64) -> Self {
        self.molar_mass = Some(molar_mass);
        self
    }

    pub fn phase(&self, temperature: f64, _pressure: f64) -> Phase {
        phase_between(temperature, self.melting_point, self.boiling_point)
    }

    pub fn density(&self, temperature: f64, pressure: f64) -> f64 {
        match (self.phase(temperature, pressure), self.molar_mass) {
            (Phase::Gas, Some(molar_mass)) => {
                ideal_gas_density(molar_mass, temperature, pressure)
            }
            _ => self.density,
        }
    }
}

/// Homogeneous constituents at normalized proportions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mixture {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub categories: BTreeSet<String>,
    /// Keyed by `HR:` tokens only; values sum to 1.
    pub constituents: Proportions<HomogeneousReference>,
}

impl Mixture {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Mixture {
            id: id.into(),
            name: name.into(),
            categories: BTreeSet::new(),
            constituents: Proportions::new(),
        }
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_constituent(
        mut self,
        reference: HomogeneousReference,
        proportion: f64,
    ) -> Result<Self, ProportionError> {
        self.add_constituent(reference, proportion)?;
        Ok(self)
    }

    pub fn add_constituent(
        &mut self,
        reference: HomogeneousReference,
        proportion: f64,
    ) -> Result<(), ProportionError> {
        self.constituents.set(reference, proportion)
    }

    pub fn add_constituents(
        &mut self,
        pairs: impl IntoIterator<Item = (HomogeneousReference, f64)>,
    ) -> Result<(), ProportionError> {
        self.constituents.set_many(pairs)
    }

    pub fn remove_constituent(&mut self, reference: &HomogeneousReference) -> Option<f64> {
        self.constituents.remove(reference)
    }

    /// Removes every constituent matching the predicate, rebalancing once
    /// for the aggregate. Returns the number removed.
    pub fn remove_constituents(
        &mut self,
        predicate: impl FnMut(&HomogeneousReference, f64) -> bool,
    ) -> usize {
        self.constituents.remove_by(predicate)
    }

    pub fn proportion_of(&self, reference: &HomogeneousReference) -> f64 {
        self.constituents.proportion(reference)
    }

    /// Share of the given substance itself, matched by id and kind.
    pub fn proportion_of_substance(&self, substance: &Substance) -> f64 {
        self.constituents
            .iter()
            .filter(|(reference, _)| **reference == *substance)
            .map(|(_, share)| share)
            .sum()
    }

    pub fn phase(&self, temperature: f64, pressure: f64) -> Phase {
        match self.constituents.dominant() {
            Some(reference) => reference.substance().phase(temperature, pressure),
            None => Phase::Solid,
        }
    }

    pub fn density(&self, temperature: f64, pressure: f64) -> f64 {
        composite_density(
            self.constituents
                .iter()
                .map(|(reference, share)| (reference.substance(), share)),
            temperature,
            pressure,
        )
    }
}

/// Constituents dissolved in a designated solvent.
///
/// The solvent's own share is part of `constituents`, so the proportions
/// still sum to 1 over everything present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub categories: BTreeSet<String>,
    pub solvent: HomogeneousReference,
    /// Keyed by `SR:` or `HR:` tokens; values sum to 1.
    pub constituents: Proportions<Reference>,
}

impl Solution {
    /// A fresh solution is pure solvent.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        solvent: HomogeneousReference,
    ) -> Self {
        let mut constituents = Proportions::new();
        // A share of 1 on an empty container cannot be out of range.
        let _ = constituents.set(Reference::Homogeneous(solvent.clone()), 1.0);
        Solution {
            id: id.into(),
            name: name.into(),
            categories: BTreeSet::new(),
            solvent,
            constituents,
        }
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_solute(
        mut self,
        reference: impl Into<Reference>,
        proportion: f64,
    ) -> Result<Self, ProportionError> {
        self.add_solute(reference, proportion)?;
        Ok(self)
    }

    /// Dissolves a solute at the given share, shrinking the solvent band.
    pub fn add_solute(
        &mut self,
        reference: impl Into<Reference>,
        proportion: f64,
    ) -> Result<(), ProportionError> {
        self.constituents.set(reference.into(), proportion)
    }

    /// Dissolves a batch of solutes with one aggregate rebalance.
    pub fn add_solutes(
        &mut self,
        pairs: impl IntoIterator<Item = (Reference, f64)>,
    ) -> Result<(), ProportionError> {
        self.constituents.set_many(pairs)
    }

    pub fn remove_solute(&mut self, reference: &Reference) -> Option<f64> {
        self.constituents.remove(reference)
    }

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

    pub fn phase(&self, temperature: f64, pressure: f64) -> Phase {
        self.solvent.substance().phase(temperature, pressure)
    }

    pub fn density(&self, temperature: f64, pressure: f64) -> f64 {
        composite_density(
            self.constituents
                .iter()
                .map(|(reference, share)| (reference.substance(), share)),
            temperature,
            pressure,
        )
    }
}

/// Mass-weighted harmonic mean of constituent densities (volume
/// additivity). Constituents that resolve to "none" contribute no volume.
fn composite_density<'a>(
    constituents: impl Iterator<Item = (&'a Substance, f64)>,
    temperature: f64,
    pressure: f64,
) -> f64 {
    let mut inverse = 0.0;
    for (substance, share) in constituents {
        let density = substance.density(temperature, pressure);
        if density > 0.0 {
            inverse += share / density;
        }
    }
    if inverse > 0.0 { 1.0 / inverse } else { 0.0 }
}

/// Any substance: the closed variant set.
///
/// Serializes with a `"type"` discriminator naming the concrete variant, so
/// round trips preserve the runtime type through any capability-typed
/// handle. Deserialization dispatches on that tag (see the codec module).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Substance {
    Chemical(Chemical),
    HomogeneousSubstance(HomogeneousSubstance),
    Mixture(Mixture),
    Solution(Solution),
}

impl Substance {
    /// Stable id; the registry key and reference target.
    pub fn id(&self) -> &str {
        match self {
            Substance::Chemical(s) => &s.id,
            Substance::HomogeneousSubstance(s) => &s.id,
            Substance::Mixture(s) => &s.id,
            Substance::Solution(s) => &s.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Substance::Chemical(s) => &s.name,
            Substance::HomogeneousSubstance(s) => &s.name,
            Substance::Mixture(s) => &s.name,
            Substance::Solution(s) => &s.name,
        }
    }

    pub fn categories(&self) -> &BTreeSet<String> {
        match self {
            Substance::Chemical(s) => &s.categories,
            Substance::HomogeneousSubstance(s) => &s.categories,
            Substance::Mixture(s) => &s.categories,
            Substance::Solution(s) => &s.categories,
        }
    }

    /// The fixed serialization discriminator of the concrete variant.
    pub fn discriminator(&self) -> &'static str {
        match self {
            Substance::Chemical(_) => codec::CHEMICAL,
            Substance::HomogeneousSubstance(_) => codec::HOMOGENEOUS_SUBSTANCE,
            Substance::Mixture(_) => codec::MIXTURE,
            Substance::Solution(_) => codec::SOLUTION,
        }
    }

    /// True for substances with one uniform, non-decomposable composition.
    pub fn is_homogeneous(&self) -> bool {
        matches!(
            self,
            Substance::Chemical(_) | Substance::HomogeneousSubstance(_)
        )
    }

    /// True for the "none" sentinel (empty id).
    pub fn is_none(&self) -> bool {
        self.id().is_empty()
    }

    pub fn formula(&self) -> Option<&Formula> {
        match self {
            Substance::Chemical(s) => Some(&s.formula),
            _ => None,
        }
    }

    /// Molar mass in g/mol; `None` for composites and formula-less matter.
    pub fn molar_mass(&self) -> Option<f64> {
        match self {
            Substance::Chemical(s) => Some(s.molar_mass()),
            Substance::HomogeneousSubstance(s) => s.molar_mass,
            _ => None,
        }
    }

    /// Density in kg/m³ at the given temperature (K) and pressure (Pa).
    pub fn density(&self, temperature: f64, pressure: f64) -> f64 {
        match self {
            Substance::Chemical(s) => s.density(temperature, pressure),
            Substance::HomogeneousSubstance(s) => s.density(temperature, pressure),
            Substance::Mixture(s) => s.density(temperature, pressure),
            Substance::Solution(s) => s.density(temperature, pressure),
        }
    }

    /// Phase at the given temperature (K) and pressure (Pa).
    pub fn phase(&self, temperature: f64, pressure: f64) -> Phase {
        match self {
            Substance::Chemical(s) => s.phase(temperature, pressure),
            Substance::HomogeneousSubstance(s) => s.phase(temperature, pressure),
            Substance::Mixture(s) => s.phase(temperature, pressure),
            Substance::Solution(s) => s.phase(temperature, pressure),
        }
    }

    /// Captures this substance by id.
    pub fn reference(&self) -> SubstanceReference {
        SubstanceReference::new(self.id())
    }

    /// Captures this substance by id as a homogeneous reference, when the
    /// capability applies.
    pub fn homogeneous_reference(&self) -> Option<HomogeneousReference> {
        if self.is_homogeneous() {
            Some(HomogeneousReference::new(self.id()))
        } else {
            None
        }
    }

    /// Constituent share of the referenced substance, 0 when absent or when
    /// this substance has no constituents.
    pub fn proportion_of(&self, reference: &Reference) -> f64 {
        match (self, reference) {
            (Substance::Mixture(m), Reference::Homogeneous(hr)) => m.proportion_of(hr),
            (Substance::Mixture(_), _) => 0.0,
            (Substance::Solution(s), r) => s.proportion_of(r),
            _ => 0.0,
        }
    }
}

impl From<Chemical> for Substance {
    fn from(s: Chemical) -> Self {
        Substance::Chemical(s)
    }
}

impl From<HomogeneousSubstance> for Substance {
    fn from(s: HomogeneousSubstance) -> Self {
        Substance::HomogeneousSubstance(s)
    }
}

impl From<Mixture> for Substance {
    fn from(s: Mixture) -> Self {
        Substance::Mixture(s)
    }
}

impl From<Solution> for Substance {
    fn from(s: Solution) -> Self {
        Substance::Solution(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> Chemical {
        Chemical::new(
            "water",
            "Water",
            "H2O".parse().unwrap(),
            998.2,
            273.15,
            373.15,
        )
    }

    #[test]
    fn chemical_phase_transitions() {
        let water = water();
        assert_eq!(water.phase(250.0, STANDARD_PRESSURE), Phase::Solid);
        assert_eq!(water.phase(300.0, STANDARD_PRESSURE), Phase::Liquid);
        assert_eq!(water.phase(400.0, STANDARD_PRESSURE), Phase::Gas);
    }

    #[test]
    fn chemical_density_by_phase() {
        let water = water();
        assert_eq!(water.density(300.0, STANDARD_PRESSURE), 998.2);
        // Steam follows the ideal gas law
        let steam = water.density(400.0, STANDARD_PRESSURE);
        assert!((steam - 0.549).abs() < 0.01, "steam density {steam}");
    }

    #[test]
    fn chemical_molar_mass_from_formula() {
        assert!((water().molar_mass() - 18.015).abs() < 1e-3);
    }

    #[test]
    fn mixture_composition() {
        let mut alloy = Mixture::new("test-alloy", "Test alloy");
        alloy
            .add_constituent(HomogeneousReference::new("copper"), 1.0)
            .unwrap();
        alloy
            .add_constituent(HomogeneousReference::new("zinc"), 0.37)
            .unwrap();
        assert!((alloy.proportion_of(&HomogeneousReference::new("copper")) - 0.63).abs() < 1e-12);
        assert_eq!(alloy.proportion_of(&HomogeneousReference::new("tin")), 0.0);
    }

    #[test]
    fn solution_starts_as_pure_solvent() {
        let brine = Solution::new("test-brine", "Test brine", HomogeneousReference::new("water"))
            .with_solute(HomogeneousReference::new("sodium-chloride"), 0.035)
            .unwrap();
        let water_share =
            brine.proportion_of(&Reference::Homogeneous(HomogeneousReference::new("water")));
        assert!((water_share - 0.965).abs() < 1e-12);
    }

    #[test]
    fn substance_capability_surface() {
        let s = Substance::from(water());
        assert_eq!(s.id(), "water");
        assert_eq!(s.discriminator(), "Chemical");
        assert!(s.is_homogeneous());
        assert!(!s.is_none());
        assert_eq!(s.reference().to_string(), "SR:water");
        assert_eq!(
            s.homogeneous_reference().unwrap().to_string(),
            "HR:water"
        );
        let m = Substance::from(Mixture::new("m", "M"));
        assert!(!m.is_homogeneous());
        assert!(m.homogeneous_reference().is_none());
        assert!(m.molar_mass().is_none());
    }

    #[test]
    fn serialized_form_carries_discriminator() {
        let value = serde_json::to_value(Substance::from(water())).unwrap();
        assert_eq!(value["type"], "Chemical");
        assert_eq!(value["formula"], "H₂O");
    }
}
