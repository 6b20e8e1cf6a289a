//! Molecular formulas.
//!
//! A [`Formula`] is an immutable, canonically ordered multiset of nuclides
//! plus a net charge. The display form uses Unicode subscript digits for
//! counts and superscripts for isotope mass numbers and charge
//! (`H₂O`, `O₄S²⁻`, `²H`); the parser accepts both that glyph form and the
//! plain ASCII input form (`H2O`, `SO4-2`), so the printed representation
//! reparses to an equal value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::nuclide::{self, Nuclide, NuclideError};

/// Error type for formula construction and parsing.
#[derive(Debug, thiserror::Error)]
pub enum FormulaError {
    #[error("empty formula")]
    Empty,
    #[error("unknown element symbol: {0}")]
    UnknownSymbol(String),
    #[error("zero count for {0}")]
    ZeroCount(String),
    #[error("unexpected character {0:?} in formula")]
    Unexpected(char),
    #[error("malformed charge")]
    BadCharge,
    #[error(transparent)]
    Nuclide(#[from] NuclideError),
}

/// A molecular formula: counted nuclides in canonical order, plus charge.
///
/// Canonical order is ascending by element symbol, then by mass number with
/// the natural (unpinned) nuclide first. Duplicate nuclides merge on
/// construction, so equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Formula {
    nuclides: Vec<(Nuclide, u32)>,
    charge: i32,
}

impl Formula {
    /// Builds a formula from nuclide counts.
    ///
    /// Rejects empty input, zero counts, and nuclides whose element is not in
    /// the periodic table.
    pub fn new(
        nuclides: impl IntoIterator<Item = (Nuclide, u32)>,
        charge: i32,
    ) -> Result<Self, FormulaError> {
        let mut merged: Vec<(Nuclide, u32)> = Vec::new();
        for (nuclide, count) in nuclides {
            nuclide.element_data()?;
            if count == 0 {
                return Err(FormulaError::ZeroCount(nuclide.to_string()));
            }
            match merged.iter_mut().find(|(n, _)| *n == nuclide) {
                Some((_, existing)) => *existing += count,
                None => merged.push((nuclide, count)),
            }
        }
        if merged.is_empty() {
            return Err(FormulaError::Empty);
        }
        merged.sort_by_key(|(n, _)| (n.symbol(), n.mass_number.unwrap_or(0)));
        Ok(Formula {
            nuclides: merged,
            charge,
        })
    }

    /// The counted nuclides, in canonical order.
    pub fn nuclides(&self) -> &[(Nuclide, u32)] {
        &self.nuclides
    }

    /// Net charge; 0 renders no suffix.
    pub fn charge(&self) -> i32 {
        self.charge
    }

    /// Total number of atoms, charge not included.
    pub fn number_of_atoms(&self) -> u32 {
        self.nuclides.iter().map(|(_, count)| count).sum()
    }

    /// Molar mass in g/mol from element weights and isotopic masses.
    pub fn molar_mass(&self) -> f64 {
        self.nuclides
            .iter()
            .map(|(nuclide, count)| nuclide.mass().unwrap_or(0.0) * f64::from(*count))
            .sum()
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (nuclide, count) in &self.nuclides {
            if let Some(a) = nuclide.mass_number {
                f.write_str(&superscript(a))?;
            }
            f.write_str(nuclide.symbol())?;
            if *count > 1 {
                f.write_str(&subscript(*count))?;
            }
        }
        if self.charge != 0 {
            let magnitude = self.charge.unsigned_abs();
            if magnitude > 1 {
                f.write_str(&superscript(magnitude))?;
            }
            f.write_str(if self.charge < 0 { "⁻" } else { "⁺" })?;
        }
        Ok(())
    }
}

impl FromStr for Formula {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars().peekable();
        let mut nuclides: Vec<(Nuclide, u32)> = Vec::new();
        let mut charge = 0i32;

        while let Some(&c) = chars.peek() {
            if let Some(first) = superscript_digit(c) {
                chars.next();
                let mut value = first;
                while let Some(d) = chars.peek().copied().and_then(superscript_digit) {
                    chars.next();
                    value = value * 10 + d;
                }
                match chars.peek() {
                    // Mass number prefix of the next term
                    Some(next) if next.is_ascii_uppercase() => {
                        let (nuclide, count) = parse_term(&mut chars, Some(value))?;
                        nuclides.push((nuclide, count));
                    }
                    // Charge magnitude followed by a sign glyph
                    Some('⁻') | Some('⁺') => {
                        let sign = if chars.next() == Some('⁻') { -1 } else { 1 };
                        charge = sign * value as i32;
                        break;
                    }
                    _ => return Err(FormulaError::BadCharge),
                }
            } else if c == '⁻' || c == '⁺' {
                chars.next();
                charge = if c == '⁻' { -1 } else { 1 };
                break;
            } else if c == '-' || c == '+' {
                chars.next();
                let mut magnitude = 0u32;
                while let Some(d) = chars.peek().copied().and_then(|d| d.to_digit(10)) {
                    chars.next();
                    magnitude = magnitude * 10 + d;
                }
                if magnitude == 0 {
                    magnitude = 1;
                }
                charge = if c == '-' {
                    -(magnitude as i32)
                } else {
                    magnitude as i32
                };
                break;
            } else if c.is_ascii_uppercase() {
                let (nuclide, count) = parse_term(&mut chars, None)?;
                nuclides.push((nuclide, count));
            } else {
                return Err(FormulaError::Unexpected(c));
            }
        }

        if let Some(trailing) = chars.next() {
            return Err(FormulaError::Unexpected(trailing));
        }
        Formula::new(nuclides, charge)
    }
}

/// One `symbol[count]` term; `mass_number` is a superscript prefix already
/// consumed by the caller.
fn parse_term(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    mass_number: Option<u32>,
) -> Result<(Nuclide, u32), FormulaError> {
    let mut symbol = String::new();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => symbol.push(c),
        Some(c) => return Err(FormulaError::Unexpected(c)),
        None => return Err(FormulaError::Empty),
    }
    while let Some(&c) = chars.peek() {
        if c.is_ascii_lowercase() {
            chars.next();
            symbol.push(c);
        } else {
            break;
        }
    }
    let element = nuclide::try_element_by_symbol(&symbol)
        .ok_or_else(|| FormulaError::UnknownSymbol(symbol.clone()))?;

    let mut count = 0u32;
    while let Some(&c) = chars.peek() {
        if let Some(d) = c.to_digit(10).or_else(|| subscript_digit(c)) {
            chars.next();
            count = count * 10 + d;
        } else {
            break;
        }
    }
    if count == 0 {
        count = 1;
    }

    let nuclide = match mass_number {
        Some(a) => Nuclide::isotope(element.atomic_number, a),
        None => Nuclide::element(element.atomic_number),
    };
    Ok((nuclide, count))
}

impl Serialize for Formula {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Formula {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

const SUBSCRIPT_DIGITS: [char; 10] = ['₀', '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉'];
const SUPERSCRIPT_DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];

/// Renders a number with Unicode subscript digits.
pub(crate) fn subscript(value: u32) -> String {
    map_digits(value, &SUBSCRIPT_DIGITS)
}

/// Renders a number with Unicode superscript digits.
pub(crate) fn superscript(value: u32) -> String {
    map_digits(value, &SUPERSCRIPT_DIGITS)
}

fn map_digits(value: u32, digits: &[char; 10]) -> String {
    value
        .to_string()
        .chars()
        .map(|c| digits[c.to_digit(10).unwrap_or(0) as usize])
        .collect()
}

fn subscript_digit(c: char) -> Option<u32> {
    SUBSCRIPT_DIGITS.iter().position(|&d| d == c).map(|i| i as u32)
}

fn superscript_digit(c: char) -> Option<u32> {
    SUPERSCRIPT_DIGITS
        .iter()
        .position(|&d| d == c)
        .map(|i| i as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Formula {
        s.parse().unwrap()
    }

    #[test]
    fn water_display() {
        let water = parse("H2O");
        assert_eq!(water.to_string(), "H₂O");
        assert_eq!(water.number_of_atoms(), 3);
        assert_eq!(water.charge(), 0);
    }

    #[test]
    fn sulfate_canonical_order_and_charge() {
        let sulfate = parse("SO4-2");
        assert_eq!(sulfate.to_string(), "O₄S²⁻");
        assert_eq!(sulfate.charge(), -2);
        assert_eq!(sulfate.number_of_atoms(), 5);
    }

    #[test]
    fn glyph_form_reparses_equal() {
        for input in ["H2O", "SO4-2", "C6H12O6", "NH4+", "Fe2O3"] {
            let first = parse(input);
            let reparsed = parse(&first.to_string());
            assert_eq!(first, reparsed, "glyph round trip for {input}");
        }
    }

    #[test]
    fn unit_charge_renders_bare_sign() {
        assert_eq!(parse("Na+").to_string(), "Na⁺");
        assert_eq!(parse("Na+1").to_string(), "Na⁺");
        assert_eq!(parse("Cl-").to_string(), "Cl⁻");
        assert_eq!(parse("Na⁺"), parse("Na+"));
    }

    #[test]
    fn subscript_input_accepted() {
        assert_eq!(parse("H₂O"), parse("H2O"));
    }

    #[test]
    fn isotope_prefix_roundtrip() {
        let heavy_water = Formula::new(
            [
                (Nuclide::isotope(1, 2), 2),
                (Nuclide::element(8), 1),
            ],
            0,
        )
        .unwrap();
        assert_eq!(heavy_water.to_string(), "²H₂O");
        assert_eq!(parse("²H₂O"), heavy_water);
    }

    #[test]
    fn duplicate_terms_merge() {
        // CH3COOH style input collapses per element
        let acetic = parse("CH3COOH");
        let canonical = parse("C2H4O2");
        assert_eq!(acetic, canonical);
        assert_eq!(acetic.to_string(), "C₂H₄O₂");
    }

    #[test]
    fn molar_mass_water() {
        let mass = parse("H2O").molar_mass();
        assert!((mass - 18.015).abs() < 1e-3, "got {mass}");
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(
            "Xx2".parse::<Formula>(),
            Err(FormulaError::UnknownSymbol(_))
        ));
        assert!(matches!("".parse::<Formula>(), Err(FormulaError::Empty)));
        assert!(matches!(
            "H2O!".parse::<Formula>(),
            Err(FormulaError::Unexpected('!'))
        ));
        assert!(Formula::new([(Nuclide::element(1), 0)], 0).is_err());
        assert!(Formula::new([(Nuclide::element(999), 1)], 0).is_err());
    }

    #[test]
    fn serde_as_display_string() {
        let json = serde_json::to_string(&parse("SO4-2")).unwrap();
        assert_eq!(json, "\"O₄S²⁻\"");
        let back: Formula = serde_json::from_str(&json).unwrap();
        assert_eq!(back, parse("SO4-2"));
    }
}
