//! The process-wide substance catalog.
//!
//! The catalog maps stable string ids to fully constructed, shared substance
//! instances. Population is lazy and happens at most once per process behind
//! a [`OnceLock`]; the first caller builds the tables, later callers read the
//! populated state with no locking.
//!
//! Each entry's id is a persistence contract: ids are serialized into stored
//! material and mixture data, so an id, once shipped, is never reused for a
//! different substance.

use std::sync::OnceLock;

use indexmap::IndexMap;

use crate::proportions::Proportions;
use crate::reference::HomogeneousReference;
use crate::substance::{Chemical, HomogeneousSubstance, Mixture, Solution, Substance};

static CATALOG: OnceLock<IndexMap<String, Substance>> = OnceLock::new();
static NONE: OnceLock<Substance> = OnceLock::new();

/// The well-known empty substance: unknown ids resolve to it so that graphs
/// holding stale references stay loadable in degraded form.
pub fn none() -> &'static Substance {
    NONE.get_or_init(|| {
        Substance::HomogeneousSubstance(HomogeneousSubstance::new("", "none", 0.0, 0.0, 0.0))
    })
}

/// Looks up a substance by id. Total: unknown and empty ids yield the
/// "none" sentinel.
pub fn get(id: &str) -> &'static Substance {
    try_get(id).unwrap_or_else(none)
}

/// Looks up a substance by id, `None` when the catalog has no such entry.
pub fn try_get(id: &str) -> Option<&'static Substance> {
    catalog().get(id)
}

/// All catalog entries, in a stable order.
pub fn all() -> impl Iterator<Item = &'static Substance> {
    catalog().values()
}

/// Number of catalog entries.
pub fn count() -> usize {
    catalog().len()
}

fn catalog() -> &'static IndexMap<String, Substance> {
    CATALOG.get_or_init(|| {
        let mut entries = IndexMap::new();
        for substance in build_catalog() {
            entries.insert(substance.id().to_string(), substance);
        }
        log::debug!("substance catalog populated: {} entries", entries.len());
        entries
    })
}

fn chemical(
    id: &str,
    name: &str,
    formula: &str,
    density: f64,
    melting_point: f64,
    boiling_point: f64,
    categories: &[&str],
) -> Substance {
    Substance::Chemical(
        Chemical::new(
            id,
            name,
            formula.parse().expect("valid built-in formula"),
            density,
            melting_point,
            boiling_point,
        )
        .with_categories(categories.iter().copied()),
    )
}

fn uniform(
    id: &str,
    name: &str,
    density: f64,
    melting_point: f64,
    boiling_point: f64,
    categories: &[&str],
) -> Substance {
    Substance::HomogeneousSubstance(
        HomogeneousSubstance::new(id, name, density, melting_point, boiling_point)
            .with_categories(categories.iter().copied()),
    )
}

fn mixture(id: &str, name: &str, parts: &[(&str, f64)], categories: &[&str]) -> Substance {
    let mut mixture = Mixture::new(id, name).with_categories(categories.iter().copied());
    mixture.constituents = Proportions::normalized(
        parts
            .iter()
            .map(|&(target, weight)| (HomogeneousReference::new(target), weight)),
    )
    .expect("valid built-in proportions");
    Substance::Mixture(mixture)
}

fn solution(
    id: &str,
    name: &str,
    solvent: &str,
    solutes: &[(&str, f64)],
    categories: &[&str],
) -> Substance {
    let mut solution = Solution::new(id, name, HomogeneousReference::new(solvent))
        .with_categories(categories.iter().copied());
    solution
        .add_solutes(
            solutes
                .iter()
                .map(|&(target, share)| (HomogeneousReference::new(target).into(), share)),
        )
        .expect("valid built-in proportions");
    Substance::Solution(solution)
}

fn build_catalog() -> Vec<Substance> {
    vec![
        // Elemental substances
        chemical("hydrogen", "Hydrogen", "H2", 0.0899, 13.99, 20.27, &["element", "gas"]),
        chemical("oxygen", "Oxygen", "O2", 1.429, 54.36, 90.19, &["element", "gas"]),
        chemical("nitrogen", "Nitrogen", "N2", 1.2506, 63.15, 77.36, &["element", "gas"]),
        chemical("argon", "Argon", "Ar", 1.784, 83.81, 87.30, &["element", "gas", "noble"]),
        chemical("carbon", "Carbon (graphite)", "C", 2267.0, 3915.0, 4300.0, &["element"]),
        chemical("iron", "Iron", "Fe", 7874.0, 1811.0, 3134.0, &["element", "metal"]),
        chemical("copper", "Copper", "Cu", 8960.0, 1357.77, 2835.0, &["element", "metal"]),
        chemical("zinc", "Zinc", "Zn", 7134.0, 692.68, 1180.0, &["element", "metal"]),
        chemical("tin", "Tin", "Sn", 7265.0, 505.08, 2875.0, &["element", "metal"]),
        chemical("gold", "Gold", "Au", 19300.0, 1337.33, 3243.0, &["element", "metal"]),
        // Common compounds
        chemical("water", "Water", "H2O", 998.2, 273.15, 373.15, &["compound", "solvent"]),
        chemical("carbon-dioxide", "Carbon dioxide", "CO2", 1.977, 194.65, 194.65, &["compound", "gas"]),
        chemical("methane", "Methane", "CH4", 0.657, 90.69, 111.65, &["compound", "gas", "organic"]),
        chemical("ammonia", "Ammonia", "NH3", 0.73, 195.4, 239.8, &["compound", "gas"]),
        chemical("ethanol", "Ethanol", "C2H6O", 789.3, 159.05, 351.44, &["compound", "organic", "solvent"]),
        chemical("benzene", "Benzene", "C6H6", 876.5, 278.68, 353.24, &["compound", "organic", "solvent"]),
        chemical("acetic-acid", "Acetic acid", "C2H4O2", 1049.0, 289.8, 391.2, &["compound", "organic", "acid"]),
        chemical("glycerol", "Glycerol", "C3H8O3", 1261.0, 291.33, 563.0, &["compound", "organic"]),
        chemical("sulfuric-acid", "Sulfuric acid", "H2SO4", 1830.2, 283.46, 610.0, &["compound", "acid"]),
        chemical("sodium-chloride", "Sodium chloride", "NaCl", 2165.0, 1073.8, 1738.0, &["compound", "salt", "mineral"]),
        chemical("sucrose", "Sucrose", "C12H22O11", 1587.0, 459.15, 459.15, &["compound", "organic", "biological"]),
        // Minerals
        chemical("quartz", "Quartz", "SiO2", 2648.0, 1986.0, 2503.0, &["mineral", "compound"]),
        chemical("calcite", "Calcite", "CaCO3", 2711.0, 1612.0, 1612.0, &["mineral", "compound"]),
        chemical("corundum", "Corundum", "Al2O3", 3987.0, 2345.0, 3250.0, &["mineral", "compound"]),
        // Uniform matter without a single formula
        uniform("cellulose", "Cellulose", 1500.0, 533.0, 533.0, &["biological", "polymer"]),
        uniform("olive-oil", "Olive oil", 911.0, 267.0, 573.0, &["biological", "oil"]),
        uniform("granite", "Granite", 2700.0, 1500.0, 3000.0, &["mineral", "rock"]),
        // Mixtures
        mixture(
            "air",
            "Air",
            &[
                ("nitrogen", 0.755),
                ("oxygen", 0.2314),
                ("argon", 0.0129),
                ("carbon-dioxide", 0.0007),
            ],
            &["gas", "atmosphere"],
        ),
        mixture("brass", "Brass", &[("copper", 0.63), ("zinc", 0.37)], &["metal", "alloy"]),
        mixture("bronze", "Bronze", &[("copper", 0.88), ("tin", 0.12)], &["metal", "alloy"]),
        mixture("steel", "Carbon steel", &[("iron", 0.99), ("carbon", 0.01)], &["metal", "alloy"]),
        // Solutions
        solution("seawater", "Seawater", "water", &[("sodium-chloride", 0.035)], &["aqueous"]),
        solution("vinegar", "Vinegar", "water", &[("acetic-acid", 0.05)], &["aqueous", "food"]),
        solution("sugar-syrup", "Sugar syrup", "water", &[("sucrose", 0.4)], &["aqueous", "food"]),
    ]
}

/// Named accessors for the built-in catalog.
///
/// These cannot miss: every accessor names an id the population routine
/// inserts, which the catalog smoke tests pin.
pub mod catalog {
    use super::Substance;

    fn builtin(id: &str) -> &'static Substance {
        super::try_get(id).expect("built-in catalog id")
    }

    macro_rules! accessors {
        ($($fn_name:ident => $id:literal),+ $(,)?) => {
            $(pub fn $fn_name() -> &'static Substance {
                builtin($id)
            })+
        };
    }

    accessors! {
        hydrogen => "hydrogen",
        oxygen => "oxygen",
        nitrogen => "nitrogen",
        argon => "argon",
        carbon => "carbon",
        iron => "iron",
        copper => "copper",
        zinc => "zinc",
        tin => "tin",
        gold => "gold",
        water => "water",
        carbon_dioxide => "carbon-dioxide",
        methane => "methane",
        ammonia => "ammonia",
        ethanol => "ethanol",
        benzene => "benzene",
        acetic_acid => "acetic-acid",
        glycerol => "glycerol",
        sulfuric_acid => "sulfuric-acid",
        sodium_chloride => "sodium-chloride",
        sucrose => "sucrose",
        quartz => "quartz",
        calcite => "calcite",
        corundum => "corundum",
        cellulose => "cellulose",
        olive_oil => "olive-oil",
        granite => "granite",
        air => "air",
        brass => "brass",
        bronze => "bronze",
        steel => "steel",
        seawater => "seawater",
        vinegar => "vinegar",
        sugar_syrup => "sugar-syrup",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::Reference;
    use crate::substance::{Phase, STANDARD_PRESSURE, STANDARD_TEMPERATURE};

    /// Shipped ids are frozen: an id, once in this list, must never be
    /// reused for a different substance.
    const GOLDEN_IDS: &[&str] = &[
        "hydrogen",
        "oxygen",
        "nitrogen",
        "argon",
        "carbon",
        "iron",
        "copper",
        "zinc",
        "tin",
        "gold",
        "water",
        "carbon-dioxide",
        "methane",
        "ammonia",
        "ethanol",
        "benzene",
        "acetic-acid",
        "glycerol",
        "sulfuric-acid",
        "sodium-chloride",
        "sucrose",
        "quartz",
        "calcite",
        "corundum",
        "cellulose",
        "olive-oil",
        "granite",
        "air",
        "brass",
        "bronze",
        "steel",
        "seawater",
        "vinegar",
        "sugar-syrup",
    ];

    #[test]
    fn golden_id_list() {
        let ids: Vec<&str> = all().map(|s| s.id()).collect();
        assert_eq!(ids, GOLDEN_IDS);
    }

    #[test]
    fn ids_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for substance in all() {
            assert!(seen.insert(substance.id()), "duplicate id {}", substance.id());
        }
    }

    #[test]
    fn lookup_total_behavior() {
        assert_eq!(get("water").name(), "Water");
        assert!(try_get("no-such-id").is_none());
        assert!(get("no-such-id").is_none());
        assert!(get("").is_none());
    }

    #[test]
    fn none_sentinel_shape() {
        let sentinel = none();
        assert!(sentinel.is_none());
        assert_eq!(sentinel.id(), "");
        assert_eq!(sentinel.name(), "none");
        assert_eq!(
            sentinel.density(STANDARD_TEMPERATURE, STANDARD_PRESSURE),
            0.0
        );
    }

    #[test]
    fn named_accessors_resolve() {
        assert_eq!(catalog::water().id(), "water");
        assert_eq!(catalog::sodium_chloride().id(), "sodium-chloride");
        assert_eq!(catalog::air().id(), "air");
        assert_eq!(catalog::sugar_syrup().id(), "sugar-syrup");
    }

    #[test]
    fn composite_entries_resolve_their_constituents() {
        for substance in all() {
            match substance {
                Substance::Mixture(m) => {
                    for (reference, _) in m.constituents.iter() {
                        assert!(
                            !reference.substance().is_none(),
                            "{} holds dangling reference {reference}",
                            m.id
                        );
                    }
                }
                Substance::Solution(s) => {
                    assert!(!s.solvent.substance().is_none());
                    for (reference, _) in s.constituents.iter() {
                        assert!(
                            !reference.substance().is_none(),
                            "{} holds dangling reference {reference}",
                            s.id
                        );
                    }
                }
                _ => {}
            }
        }
    }

    #[test]
    fn air_is_a_gas_with_plausible_density() {
        let air = catalog::air();
        assert_eq!(air.phase(STANDARD_TEMPERATURE, STANDARD_PRESSURE), Phase::Gas);
        let density = air.density(STANDARD_TEMPERATURE, STANDARD_PRESSURE);
        assert!(density > 1.0 && density < 1.5, "air density {density}");
    }

    #[test]
    fn seawater_composition() {
        let seawater = catalog::seawater();
        let water_share = seawater.proportion_of(&Reference::Homogeneous(
            crate::reference::HomogeneousReference::new("water"),
        ));
        assert!((water_share - 0.965).abs() < 1e-12);
    }
}
