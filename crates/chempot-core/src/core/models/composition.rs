use super::element::{Element, UnknownElementError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::iter::Peekable;
use std::str::{Chars, FromStr};
use thiserror::Error;

/// Amounts closer than this are considered equal; smaller amounts are dropped.
pub const AMOUNT_TOLERANCE: f64 = 1e-8;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompositionError {
    #[error(transparent)]
    UnknownElement(#[from] UnknownElementError),

    #[error("Malformed formula '{formula}': {reason}")]
    MalformedFormula { formula: String, reason: String },

    #[error("Negative amount {amount} for element {element}")]
    NegativeAmount { element: Element, amount: f64 },
}

/// A chemical composition: a mapping from element to a non-negative amount.
///
/// Amounts are stored per element in alphabetical order. Compositions compare equal
/// when every amount agrees within [`AMOUNT_TOLERANCE`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<Element, f64>",
    into = "BTreeMap<Element, f64>"
)]
pub struct Composition {
    amounts: BTreeMap<Element, f64>,
}

impl Composition {
    /// Builds a composition, summing repeated elements and dropping vanishing amounts.
    ///
    /// # Errors
    ///
    /// Returns [`CompositionError::NegativeAmount`] if any summed amount is negative.
    pub fn new(
        amounts: impl IntoIterator<Item = (Element, f64)>,
    ) -> Result<Self, CompositionError> {
        let mut summed: BTreeMap<Element, f64> = BTreeMap::new();
        for (element, amount) in amounts {
            *summed.entry(element).or_insert(0.0) += amount;
        }
        if let Some((&element, &amount)) = summed.iter().find(|(_, a)| **a < -AMOUNT_TOLERANCE) {
            return Err(CompositionError::NegativeAmount { element, amount });
        }
        summed.retain(|_, amount| *amount >= AMOUNT_TOLERANCE);
        Ok(Self { amounts: summed })
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    /// Elements present in the composition, alphabetically.
    pub fn elements(&self) -> impl Iterator<Item = Element> + '_ {
        self.amounts.keys().copied()
    }

    pub fn amounts(&self) -> impl Iterator<Item = (Element, f64)> + '_ {
        self.amounts.iter().map(|(e, a)| (*e, *a))
    }

    /// Amount of `element`, zero when absent.
    pub fn get(&self, element: Element) -> f64 {
        self.amounts.get(&element).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, element: Element) -> bool {
        self.amounts.contains_key(&element)
    }

    pub fn num_elements(&self) -> usize {
        self.amounts.len()
    }

    pub fn num_atoms(&self) -> f64 {
        self.amounts.values().sum()
    }

    /// True for single-element compositions.
    pub fn is_element(&self) -> bool {
        self.amounts.len() == 1
    }

    /// Molar mass in g/mol.
    pub fn weight(&self) -> f64 {
        self.amounts
            .iter()
            .map(|(e, a)| a * e.atomic_mass())
            .sum()
    }

    pub fn weight_fraction(&self, element: Element) -> f64 {
        let weight = self.weight();
        if weight == 0.0 {
            return 0.0;
        }
        self.get(element) * element.atomic_mass() / weight
    }

    pub fn atomic_fraction(&self, element: Element) -> f64 {
        let atoms = self.num_atoms();
        if atoms == 0.0 {
            return 0.0;
        }
        self.get(element) / atoms
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            amounts: self
                .amounts
                .iter()
                .map(|(e, a)| (*e, a * factor))
                .filter(|(_, a)| a.abs() >= AMOUNT_TOLERANCE)
                .collect(),
        }
    }

    /// The composition with every element of `removed` dropped.
    pub fn without(&self, removed: &[Element]) -> Self {
        Self {
            amounts: self
                .amounts
                .iter()
                .filter(|(e, _)| !removed.contains(e))
                .map(|(e, a)| (*e, *a))
                .collect(),
        }
    }

    /// Reduced composition and the factor it was divided by.
    ///
    /// When every amount is integral the factor is the GCD of the amounts, otherwise
    /// the composition is already considered reduced and the factor is 1.
    pub fn reduced_composition_and_factor(&self) -> (Composition, f64) {
        let all_integral = self
            .amounts
            .values()
            .all(|a| (a - a.round()).abs() < AMOUNT_TOLERANCE);
        if !all_integral || self.is_empty() {
            return (self.clone(), 1.0);
        }
        let divisor = self
            .amounts
            .values()
            .map(|a| a.round() as u64)
            .fold(0, gcd)
            .max(1) as f64;
        (self.scaled(1.0 / divisor), divisor)
    }

    pub fn reduced_composition(&self) -> Composition {
        self.reduced_composition_and_factor().0
    }

    pub fn reduced_formula(&self) -> String {
        self.reduced_composition().formula()
    }

    /// Formula with elements ordered by electronegativity, e.g. `Na2O` or `NaNbO3`.
    pub fn formula(&self) -> String {
        let mut elements: Vec<_> = self.amounts.iter().collect();
        elements.sort_by(|(a, _), (b, _)| a.formula_order(b));
        elements
            .into_iter()
            .map(|(e, a)| format!("{}{}", e.symbol(), format_amount(*a)))
            .collect()
    }

    pub fn almost_equals(&self, other: &Composition, tolerance: f64) -> bool {
        self.amounts.len() == other.amounts.len()
            && self
                .amounts
                .iter()
                .all(|(e, a)| (a - other.get(*e)).abs() < tolerance && other.contains(*e))
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}

fn format_amount(amount: f64) -> String {
    if (amount - 1.0).abs() < AMOUNT_TOLERANCE {
        String::new()
    } else if (amount - amount.round()).abs() < AMOUNT_TOLERANCE {
        format!("{}", amount.round() as i64)
    } else {
        let text = format!("{:.8}", amount);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

impl PartialEq for Composition {
    fn eq(&self, other: &Self) -> bool {
        self.almost_equals(other, AMOUNT_TOLERANCE)
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formula())
    }
}

impl TryFrom<BTreeMap<Element, f64>> for Composition {
    type Error = CompositionError;

    fn try_from(amounts: BTreeMap<Element, f64>) -> Result<Self, Self::Error> {
        Self::new(amounts)
    }
}

impl From<Composition> for BTreeMap<Element, f64> {
    fn from(composition: Composition) -> Self {
        composition.amounts
    }
}

impl FromStr for Composition {
    type Err = CompositionError;

    /// Parses formulas such as `Na2O`, `Fe2(SO4)3` or `Li0.5CoO2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = FormulaParser {
            formula: s,
            chars: s.chars().peekable(),
        };
        let amounts = parser.parse_group(0)?;
        if amounts.is_empty() {
            return Err(parser.error("formula contains no elements"));
        }
        Self::new(amounts)
    }
}

struct FormulaParser<'a> {
    formula: &'a str,
    chars: Peekable<Chars<'a>>,
}

impl FormulaParser<'_> {
    fn error(&self, reason: &str) -> CompositionError {
        CompositionError::MalformedFormula {
            formula: self.formula.to_string(),
            reason: reason.to_string(),
        }
    }

    fn parse_group(&mut self, depth: usize) -> Result<Vec<(Element, f64)>, CompositionError> {
        let mut amounts = Vec::new();
        while let Some(&c) = self.chars.peek() {
            match c {
                '(' | '[' => {
                    self.chars.next();
                    let inner = self.parse_group(depth + 1)?;
                    let multiplier = self.parse_number()?.unwrap_or(1.0);
                    amounts.extend(inner.into_iter().map(|(e, a)| (e, a * multiplier)));
                }
                ')' | ']' => {
                    if depth == 0 {
                        return Err(self.error("unbalanced closing bracket"));
                    }
                    self.chars.next();
                    return Ok(amounts);
                }
                c if c.is_ascii_uppercase() => {
                    let mut symbol = String::from(c);
                    self.chars.next();
                    while let Some(&l) = self.chars.peek() {
                        if !l.is_ascii_lowercase() {
                            break;
                        }
                        symbol.push(l);
                        self.chars.next();
                    }
                    let element: Element = symbol.parse()?;
                    let amount = self.parse_number()?.unwrap_or(1.0);
                    amounts.push((element, amount));
                }
                c if c.is_whitespace() => {
                    self.chars.next();
                }
                _ => return Err(self.error(&format!("unexpected character '{}'", c))),
            }
        }
        if depth > 0 {
            return Err(self.error("unbalanced opening bracket"));
        }
        Ok(amounts)
    }

    fn parse_number(&mut self) -> Result<Option<f64>, CompositionError> {
        let mut digits = String::new();
        while let Some(&c) = self.chars.peek() {
            if !(c.is_ascii_digit() || c == '.') {
                break;
            }
            digits.push(c);
            self.chars.next();
        }
        if digits.is_empty() {
            return Ok(None);
        }
        digits
            .parse::<f64>()
            .map(Some)
            .map_err(|_| self.error(&format!("invalid amount '{}'", digits)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(s: &str) -> Element {
        s.parse().unwrap()
    }

    fn comp(s: &str) -> Composition {
        s.parse().unwrap()
    }

    #[test]
    fn parses_simple_formulas() {
        let c = comp("Na2O");
        assert_eq!(c.get(el("Na")), 2.0);
        assert_eq!(c.get(el("O")), 1.0);
        assert_eq!(c.num_atoms(), 3.0);
        assert_eq!(c.num_elements(), 2);
    }

    #[test]
    fn parses_brackets_and_repeated_elements() {
        let c = comp("Fe2(SO4)3");
        assert_eq!(c.get(el("Fe")), 2.0);
        assert_eq!(c.get(el("S")), 3.0);
        assert_eq!(c.get(el("O")), 12.0);

        let c = comp("CH3COOH");
        assert_eq!(c.get(el("C")), 2.0);
        assert_eq!(c.get(el("H")), 4.0);
        assert_eq!(c.get(el("O")), 2.0);
    }

    #[test]
    fn parses_fractional_amounts() {
        let c = comp("Li0.5CoO2");
        assert_eq!(c.get(el("Li")), 0.5);
        let (reduced, factor) = c.reduced_composition_and_factor();
        assert_eq!(factor, 1.0);
        assert_eq!(reduced, c);
        assert_eq!(c.formula(), "Li0.5CoO2");
    }

    #[test]
    fn malformed_formulas_are_rejected() {
        assert!(matches!(
            "Na2O)".parse::<Composition>(),
            Err(CompositionError::MalformedFormula { .. })
        ));
        assert!(matches!(
            "(Na2O".parse::<Composition>(),
            Err(CompositionError::MalformedFormula { .. })
        ));
        assert!(matches!(
            "na2o".parse::<Composition>(),
            Err(CompositionError::MalformedFormula { .. })
        ));
        assert!(matches!(
            "Xy2".parse::<Composition>(),
            Err(CompositionError::UnknownElement(_))
        ));
        assert!("".parse::<Composition>().is_err());
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let result = Composition::new([(el("O"), -1.0)]);
        assert!(matches!(
            result,
            Err(CompositionError::NegativeAmount { .. })
        ));
    }

    #[test]
    fn reduction_divides_by_gcd() {
        let (reduced, factor) = comp("Na4O2").reduced_composition_and_factor();
        assert_eq!(factor, 2.0);
        assert_eq!(reduced, comp("Na2O"));
        assert_eq!(comp("Nb6O12").reduced_formula(), "NbO2");
        assert_eq!(comp("O2").reduced_composition_and_factor().1, 2.0);
    }

    #[test]
    fn formula_orders_by_electronegativity() {
        assert_eq!(comp("ONa2").formula(), "Na2O");
        assert_eq!(comp("O3NbNa").formula(), "NaNbO3");
        assert_eq!(comp("Na4O2").to_string(), "Na4O2");
    }

    #[test]
    fn equality_uses_tolerance() {
        let a = Composition::new([(el("Na"), 1.0), (el("Cl"), 1.0)]).unwrap();
        let b = Composition::new([(el("Na"), 1.0 + 1e-10), (el("Cl"), 1.0)]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, comp("NaCl2"));
        assert_ne!(comp("NaCl"), comp("Na"));
    }

    #[test]
    fn weight_fraction_uses_atomic_masses() {
        let c = comp("NaCl");
        let expected = 22.990 / (22.990 + 35.45);
        assert!((c.weight_fraction(el("Na")) - expected).abs() < 1e-12);
        assert_eq!(c.weight_fraction(el("O")), 0.0);
        assert!((c.atomic_fraction(el("Cl")) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn without_drops_elements() {
        let c = comp("NaNbO3").without(&[el("O")]);
        assert_eq!(c, comp("NaNb"));
    }

    #[test]
    fn serde_round_trips_through_symbols() {
        let c = comp("Na2O");
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"{"Na":2.0,"O":1.0}"#);
        let back: Composition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
        assert!(serde_json::from_str::<Composition>(r#"{"Na":-2.0}"#).is_err());
    }
}
