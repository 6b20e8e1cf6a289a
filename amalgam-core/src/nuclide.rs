//! Chemical element and isotope data.
//!
//! The periodic table lives in process-wide tables behind a one-time lazy
//! initialization. Element rows are fixed; the isotope table can be extended
//! at runtime through [`add_isotope`], which takes the same lock the
//! population routine uses.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock};

/// Error type for element and isotope lookups.
#[derive(Debug, thiserror::Error)]
pub enum NuclideError {
    #[error("unknown element: Z={0}")]
    UnknownElement(u32),
    #[error("unknown element symbol: {0}")]
    UnknownSymbol(String),
    #[error("malformed isotope key: {0}")]
    MalformedKey(String),
}

/// A chemical element row from the periodic table.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Proton count, 1-based.
    pub atomic_number: u32,
    /// Canonical symbol (`"H"`, `"Fe"`, ...).
    pub symbol: &'static str,
    /// English name.
    pub name: &'static str,
    /// Standard atomic weight in g/mol (mass number of the most stable
    /// isotope for elements without one).
    pub atomic_weight: f64,
}

/// A specific isotope of an element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Isotope {
    pub atomic_number: u32,
    pub mass_number: u32,
    /// Isotopic mass in g/mol.
    pub mass: f64,
    /// Natural abundance as a fraction, `None` for synthetic isotopes.
    pub abundance: Option<f64>,
}

impl Isotope {
    pub fn key(&self) -> IsotopeKey {
        IsotopeKey {
            atomic_number: self.atomic_number,
            mass_number: self.mass_number,
        }
    }
}

/// Stable textual key for an isotope: `"<atomicNumber>:<massNumber>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IsotopeKey {
    pub atomic_number: u32,
    pub mass_number: u32,
}

impl fmt::Display for IsotopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.atomic_number, self.mass_number)
    }
}

impl FromStr for IsotopeKey {
    type Err = NuclideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (z, a) = s
            .split_once(':')
            .ok_or_else(|| NuclideError::MalformedKey(s.to_string()))?;
        let atomic_number = z
            .parse()
            .map_err(|_| NuclideError::MalformedKey(s.to_string()))?;
        let mass_number = a
            .parse()
            .map_err(|_| NuclideError::MalformedKey(s.to_string()))?;
        Ok(IsotopeKey {
            atomic_number,
            mass_number,
        })
    }
}

/// An element, optionally pinned to a specific mass number.
///
/// Formulas count nuclides, so `H` and `²H` are distinct constituents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nuclide {
    pub atomic_number: u32,
    pub mass_number: Option<u32>,
}

impl Nuclide {
    /// A nuclide standing for the element's natural composition.
    pub fn element(atomic_number: u32) -> Self {
        Nuclide {
            atomic_number,
            mass_number: None,
        }
    }

    /// A nuclide pinned to one isotope.
    pub fn isotope(atomic_number: u32, mass_number: u32) -> Self {
        Nuclide {
            atomic_number,
            mass_number: Some(mass_number),
        }
    }

    /// The element row this nuclide belongs to.
    pub fn element_data(&self) -> Result<&'static Element, NuclideError> {
        element(self.atomic_number)
    }

    /// Canonical symbol, or `"?"` for an out-of-range atomic number.
    pub fn symbol(&self) -> &'static str {
        try_element(self.atomic_number)
            .map(|e| e.symbol)
            .unwrap_or("?")
    }

    /// Mass in g/mol: the curated isotopic mass when pinned (falling back to
    /// the mass number), the standard atomic weight otherwise.
    pub fn mass(&self) -> Result<f64, NuclideError> {
        let element = self.element_data()?;
        match self.mass_number {
            None => Ok(element.atomic_weight),
            Some(a) => Ok(isotope(self.atomic_number, a)
                .map(|iso| iso.mass)
                .unwrap_or(a as f64)),
        }
    }
}

impl fmt::Display for Nuclide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(a) = self.mass_number {
            write!(f, "{}", crate::formula::superscript(a))?;
        }
        f.write_str(self.symbol())
    }
}

/// Returns the element with the given atomic number.
pub fn element(atomic_number: u32) -> Result<&'static Element, NuclideError> {
    try_element(atomic_number).ok_or(NuclideError::UnknownElement(atomic_number))
}

/// Non-failing twin of [`element`].
pub fn try_element(atomic_number: u32) -> Option<&'static Element> {
    let tables = tables();
    atomic_number
        .checked_sub(1)
        .and_then(|i| tables.elements.get(i as usize))
}

/// Returns the element with the given canonical symbol.
pub fn element_by_symbol(symbol: &str) -> Result<&'static Element, NuclideError> {
    try_element_by_symbol(symbol).ok_or_else(|| NuclideError::UnknownSymbol(symbol.to_string()))
}

/// Non-failing twin of [`element_by_symbol`].
pub fn try_element_by_symbol(symbol: &str) -> Option<&'static Element> {
    let tables = tables();
    tables
        .by_symbol
        .get(symbol)
        .and_then(|&z| try_element(z))
}

/// Number of known elements.
pub fn element_count() -> u32 {
    tables().elements.len() as u32
}

/// Returns the curated isotopes of an element, empty when none are known.
pub fn isotopes(atomic_number: u32) -> Vec<Isotope> {
    let tables = tables();
    let isotopes = tables.isotopes.read().unwrap_or_else(|e| e.into_inner());
    isotopes
        .get(&atomic_number)
        .cloned()
        .unwrap_or_default()
}

/// Indexed isotope lookup by atomic number and mass number.
pub fn isotope(atomic_number: u32, mass_number: u32) -> Option<Isotope> {
    let tables = tables();
    let isotopes = tables.isotopes.read().unwrap_or_else(|e| e.into_inner());
    isotopes
        .get(&atomic_number)
        .and_then(|list| list.iter().find(|iso| iso.mass_number == mass_number))
        .copied()
}

/// Registers a custom isotope, replacing any existing entry with the same
/// atomic and mass number. Visible to all subsequent readers.
pub fn add_isotope(isotope: Isotope) -> Result<(), NuclideError> {
    element(isotope.atomic_number)?;
    let tables = tables();
    let mut isotopes = tables.isotopes.write().unwrap_or_else(|e| e.into_inner());
    let list = isotopes.entry(isotope.atomic_number).or_default();
    match list
        .iter_mut()
        .find(|existing| existing.mass_number == isotope.mass_number)
    {
        Some(existing) => *existing = isotope,
        None => list.push(isotope),
    }
    Ok(())
}

struct Tables {
    elements: Vec<Element>,
    by_symbol: HashMap<&'static str, u32>,
    isotopes: RwLock<HashMap<u32, Vec<Isotope>>>,
}

static TABLES: OnceLock<Tables> = OnceLock::new();

fn tables() -> &'static Tables {
    TABLES.get_or_init(|| {
        let elements: Vec<Element> = ELEMENT_ROWS
            .iter()
            .enumerate()
            .map(|(i, &(symbol, name, atomic_weight))| Element {
                atomic_number: i as u32 + 1,
                symbol,
                name,
                atomic_weight,
            })
            .collect();
        let by_symbol = elements
            .iter()
            .map(|e| (e.symbol, e.atomic_number))
            .collect();
        let mut isotopes: HashMap<u32, Vec<Isotope>> = HashMap::new();
        for &(z, a, mass, abundance) in ISOTOPE_ROWS {
            isotopes.entry(z).or_default().push(Isotope {
                atomic_number: z,
                mass_number: a,
                mass,
                abundance,
            });
        }
        log::debug!(
            "periodic table populated: {} elements, {} isotope rows",
            elements.len(),
            ISOTOPE_ROWS.len()
        );
        Tables {
            elements,
            by_symbol,
            isotopes: RwLock::new(isotopes),
        }
    })
}

/// (symbol, name, standard atomic weight), indexed by Z-1.
const ELEMENT_ROWS: &[(&str, &str, f64)] = &[
    ("H", "Hydrogen", 1.008),
    ("He", "Helium", 4.0026),
    ("Li", "Lithium", 6.94),
    ("Be", "Beryllium", 9.0122),
    ("B", "Boron", 10.81),
    ("C", "Carbon", 12.011),
    ("N", "Nitrogen", 14.007),
    ("O", "Oxygen", 15.999),
    ("F", "Fluorine", 18.998),
    ("Ne", "Neon", 20.180),
    ("Na", "Sodium", 22.990),
    ("Mg", "Magnesium", 24.305),
    ("Al", "Aluminium", 26.982),
    ("Si", "Silicon", 28.085),
    ("P", "Phosphorus", 30.974),
    ("S", "Sulfur", 32.06),
    ("Cl", "Chlorine", 35.45),
    ("Ar", "Argon", 39.948),
    ("K", "Potassium", 39.098),
    ("Ca", "Calcium", 40.078),
    ("Sc", "Scandium", 44.956),
    ("Ti", "Titanium", 47.867),
    ("V", "Vanadium", 50.942),
    ("Cr", "Chromium", 51.996),
    ("Mn", "Manganese", 54.938),
    ("Fe", "Iron", 55.845),
    ("Co", "Cobalt", 58.933),
    ("Ni", "Nickel", 58.693),
    ("Cu", "Copper", 63.546),
    ("Zn", "Zinc", 65.38),
    ("Ga", "Gallium", 69.723),
    ("Ge", "Germanium", 72.630),
    ("As", "Arsenic", 74.922),
    ("Se", "Selenium", 78.971),
    ("Br", "Bromine", 79.904),
    ("Kr", "Krypton", 83.798),
    ("Rb", "Rubidium", 85.468),
    ("Sr", "Strontium", 87.62),
    ("Y", "Yttrium", 88.906),
    ("Zr", "Zirconium", 91.224),
    ("Nb", "Niobium", 92.906),
    ("Mo", "Molybdenum", 95.95),
    ("Tc", "Technetium", 97.0),
    ("Ru", "Ruthenium", 101.07),
    ("Rh", "Rhodium", 102.91),
    ("Pd", "Palladium", 106.42),
    ("Ag", "Silver", 107.87),
    ("Cd", "Cadmium", 112.41),
    ("In", "Indium", 114.82),
    ("Sn", "Tin", 118.71),
    ("Sb", "Antimony", 121.76),
    ("Te", "Tellurium", 127.60),
    ("I", "Iodine", 126.90),
    ("Xe", "Xenon", 131.29),
    ("Cs", "Caesium", 132.91),
    ("Ba", "Barium", 137.33),
    ("La", "Lanthanum", 138.91),
    ("Ce", "Cerium", 140.12),
    ("Pr", "Praseodymium", 140.91),
    ("Nd", "Neodymium", 144.24),
    ("Pm", "Promethium", 145.0),
    ("Sm", "Samarium", 150.36),
    ("Eu", "Europium", 151.96),
    ("Gd", "Gadolinium", 157.25),
    ("Tb", "Terbium", 158.93),
    ("Dy", "Dysprosium", 162.50),
    ("Ho", "Holmium", 164.93),
    ("Er", "Erbium", 167.26),
    ("Tm", "Thulium", 168.93),
    ("Yb", "Ytterbium", 173.05),
    ("Lu", "Lutetium", 174.97),
    ("Hf", "Hafnium", 178.49),
    ("Ta", "Tantalum", 180.95),
    ("W", "Tungsten", 183.84),
    ("Re", "Rhenium", 186.21),
    ("Os", "Osmium", 190.23),
    ("Ir", "Iridium", 192.22),
    ("Pt", "Platinum", 195.08),
    ("Au", "Gold", 196.97),
    ("Hg", "Mercury", 200.59),
    ("Tl", "Thallium", 204.38),
    ("Pb", "Lead", 207.2),
    ("Bi", "Bismuth", 208.98),
    ("Po", "Polonium", 209.0),
    ("At", "Astatine", 210.0),
    ("Rn", "Radon", 222.0),
    ("Fr", "Francium", 223.0),
    ("Ra", "Radium", 226.0),
    ("Ac", "Actinium", 227.0),
    ("Th", "Thorium", 232.04),
    ("Pa", "Protactinium", 231.04),
    ("U", "Uranium", 238.03),
    ("Np", "Neptunium", 237.0),
    ("Pu", "Plutonium", 244.0),
    ("Am", "Americium", 243.0),
    ("Cm", "Curium", 247.0),
    ("Bk", "Berkelium", 247.0),
    ("Cf", "Californium", 251.0),
    ("Es", "Einsteinium", 252.0),
    ("Fm", "Fermium", 257.0),
    ("Md", "Mendelevium", 258.0),
    ("No", "Nobelium", 259.0),
    ("Lr", "Lawrencium", 266.0),
    ("Rf", "Rutherfordium", 267.0),
    ("Db", "Dubnium", 268.0),
    ("Sg", "Seaborgium", 269.0),
    ("Bh", "Bohrium", 270.0),
    ("Hs", "Hassium", 277.0),
    ("Mt", "Meitnerium", 278.0),
    ("Ds", "Darmstadtium", 281.0),
    ("Rg", "Roentgenium", 282.0),
    ("Cn", "Copernicium", 285.0),
    ("Nh", "Nihonium", 286.0),
    ("Fl", "Flerovium", 289.0),
    ("Mc", "Moscovium", 290.0),
    ("Lv", "Livermorium", 293.0),
    ("Ts", "Tennessine", 294.0),
    ("Og", "Oganesson", 294.0),
];

/// (Z, A, isotopic mass, natural abundance) for the curated isotope set.
const ISOTOPE_ROWS: &[(u32, u32, f64, Option<f64>)] = &[
    (1, 1, 1.007825, Some(0.999885)),
    (1, 2, 2.014102, Some(0.000115)),
    (1, 3, 3.016049, None),
    (6, 12, 12.0, Some(0.9893)),
    (6, 13, 13.003355, Some(0.0107)),
    (6, 14, 14.003242, None),
    (7, 14, 14.003074, Some(0.99636)),
    (7, 15, 15.000109, Some(0.00364)),
    (8, 16, 15.994915, Some(0.99757)),
    (8, 17, 16.999132, Some(0.00038)),
    (8, 18, 17.999160, Some(0.00205)),
    (17, 35, 34.968853, Some(0.7576)),
    (17, 37, 36.965903, Some(0.2424)),
    (92, 234, 234.040952, Some(0.000054)),
    (92, 235, 235.043930, Some(0.007204)),
    (92, 238, 238.050788, Some(0.992742)),
];
