use phf::{Map, phf_map};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Static physical data attached to every element of the periodic table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementData {
    /// Atomic number (Z).
    pub number: u8,
    /// Standard atomic weight in g/mol.
    pub mass: f64,
    /// Pauling electronegativity, absent for the lighter noble gases.
    pub electronegativity: Option<f64>,
}

const fn data(number: u8, mass: f64, electronegativity: f64) -> ElementData {
    ElementData {
        number,
        mass,
        electronegativity: Some(electronegativity),
    }
}

const fn noble(number: u8, mass: f64) -> ElementData {
    ElementData {
        number,
        mass,
        electronegativity: None,
    }
}

static PERIODIC_TABLE: Map<&'static str, ElementData> = phf_map! {
    // --- Period 1 ---
    "H" => data(1, 1.008, 2.20), "He" => noble(2, 4.0026),
    // --- Period 2 ---
    "Li" => data(3, 6.94, 0.98), "Be" => data(4, 9.0122, 1.57), "B" => data(5, 10.81, 2.04),
    "C" => data(6, 12.011, 2.55), "N" => data(7, 14.007, 3.04), "O" => data(8, 15.999, 3.44),
    "F" => data(9, 18.998, 3.98), "Ne" => noble(10, 20.180),
    // --- Period 3 ---
    "Na" => data(11, 22.990, 0.93), "Mg" => data(12, 24.305, 1.31), "Al" => data(13, 26.982, 1.61),
    "Si" => data(14, 28.085, 1.90), "P" => data(15, 30.974, 2.19), "S" => data(16, 32.06, 2.58),
    "Cl" => data(17, 35.45, 3.16), "Ar" => noble(18, 39.948),
    // --- Period 4 ---
    "K" => data(19, 39.098, 0.82), "Ca" => data(20, 40.078, 1.00), "Sc" => data(21, 44.956, 1.36),
    "Ti" => data(22, 47.867, 1.54), "V" => data(23, 50.942, 1.63), "Cr" => data(24, 51.996, 1.66),
    "Mn" => data(25, 54.938, 1.55), "Fe" => data(26, 55.845, 1.83), "Co" => data(27, 58.933, 1.88),
    "Ni" => data(28, 58.693, 1.91), "Cu" => data(29, 63.546, 1.90), "Zn" => data(30, 65.38, 1.65),
    "Ga" => data(31, 69.723, 1.81), "Ge" => data(32, 72.630, 2.01), "As" => data(33, 74.922, 2.18),
    "Se" => data(34, 78.971, 2.55), "Br" => data(35, 79.904, 2.96), "Kr" => data(36, 83.798, 3.00),
    // --- Period 5 ---
    "Rb" => data(37, 85.468, 0.82), "Sr" => data(38, 87.62, 0.95), "Y" => data(39, 88.906, 1.22),
    "Zr" => data(40, 91.224, 1.33), "Nb" => data(41, 92.906, 1.60), "Mo" => data(42, 95.95, 2.16),
    "Tc" => data(43, 98.0, 1.90), "Ru" => data(44, 101.07, 2.20), "Rh" => data(45, 102.91, 2.28),
    "Pd" => data(46, 106.42, 2.20), "Ag" => data(47, 107.87, 1.93), "Cd" => data(48, 112.41, 1.69),
    "In" => data(49, 114.82, 1.78), "Sn" => data(50, 118.71, 1.96), "Sb" => data(51, 121.76, 2.05),
    "Te" => data(52, 127.60, 2.10), "I" => data(53, 126.90, 2.66), "Xe" => data(54, 131.29, 2.60),
    // --- Period 6 ---
    "Cs" => data(55, 132.91, 0.79), "Ba" => data(56, 137.33, 0.89), "La" => data(57, 138.91, 1.10),
    "Ce" => data(58, 140.12, 1.12), "Pr" => data(59, 140.91, 1.13), "Nd" => data(60, 144.24, 1.14),
    "Pm" => data(61, 145.0, 1.13), "Sm" => data(62, 150.36, 1.17), "Eu" => data(63, 151.96, 1.20),
    "Gd" => data(64, 157.25, 1.20), "Tb" => data(65, 158.93, 1.10), "Dy" => data(66, 162.50, 1.22),
    "Ho" => data(67, 164.93, 1.23), "Er" => data(68, 167.26, 1.24), "Tm" => data(69, 168.93, 1.25),
    "Yb" => data(70, 173.05, 1.10), "Lu" => data(71, 174.97, 1.27), "Hf" => data(72, 178.49, 1.30),
    "Ta" => data(73, 180.95, 1.50), "W" => data(74, 183.84, 2.36), "Re" => data(75, 186.21, 1.90),
    "Os" => data(76, 190.23, 2.20), "Ir" => data(77, 192.22, 2.20), "Pt" => data(78, 195.08, 2.28),
    "Au" => data(79, 196.97, 2.54), "Hg" => data(80, 200.59, 2.00), "Tl" => data(81, 204.38, 1.62),
    "Pb" => data(82, 207.2, 2.33), "Bi" => data(83, 208.98, 2.02), "Po" => data(84, 209.0, 2.00),
    "At" => data(85, 210.0, 2.20), "Rn" => data(86, 222.0, 2.20),
    // --- Period 7 ---
    "Fr" => data(87, 223.0, 0.70), "Ra" => data(88, 226.0, 0.90), "Ac" => data(89, 227.0, 1.10),
    "Th" => data(90, 232.04, 1.30), "Pa" => data(91, 231.04, 1.50), "U" => data(92, 238.03, 1.38),
    "Np" => data(93, 237.0, 1.36), "Pu" => data(94, 244.0, 1.28), "Am" => data(95, 243.0, 1.30),
    "Cm" => data(96, 247.0, 1.30), "Bk" => data(97, 247.0, 1.30), "Cf" => data(98, 251.0, 1.30),
    "Es" => data(99, 252.0, 1.30), "Fm" => data(100, 257.0, 1.30), "Md" => data(101, 258.0, 1.30),
    "No" => data(102, 259.0, 1.30), "Lr" => data(103, 262.0, 1.30),
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown element symbol: '{0}'")]
pub struct UnknownElementError(pub String);

/// An atomic species of the periodic table.
///
/// Elements are cheap `Copy` handles into a static table. They order and hash by
/// their symbol, so any `BTreeMap<Element, _>` iterates alphabetically, which is the
/// canonical variable ordering used throughout the analysis layer.
#[derive(Clone, Copy)]
pub struct Element {
    symbol: &'static str,
    data: &'static ElementData,
}

impl Element {
    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    pub fn atomic_number(&self) -> u8 {
        self.data.number
    }

    pub fn atomic_mass(&self) -> f64 {
        self.data.mass
    }

    pub fn electronegativity(&self) -> Option<f64> {
        self.data.electronegativity
    }

    /// Ordering used when writing chemical formulas: increasing electronegativity,
    /// ties broken by symbol, elements without a Pauling value last.
    pub fn formula_order(&self, other: &Element) -> Ordering {
        let x1 = self.electronegativity().unwrap_or(f64::INFINITY);
        let x2 = other.electronegativity().unwrap_or(f64::INFINITY);
        x1.partial_cmp(&x2)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.symbol.cmp(other.symbol))
    }
}

impl FromStr for Element {
    type Err = UnknownElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PERIODIC_TABLE
            .get_entry(s.trim())
            .map(|(symbol, data)| Element {
                symbol: *symbol,
                data,
            })
            .ok_or_else(|| UnknownElementError(s.to_string()))
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl Eq for Element {}

impl PartialOrd for Element {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Element {
    fn cmp(&self, other: &Self) -> Ordering {
        self.symbol.cmp(other.symbol)
    }
}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbol.hash(state);
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Element({})", self.symbol)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol)
    }
}

impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol)
    }
}

impl<'de> Deserialize<'de> for Element {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let symbol = String::deserialize(deserializer)?;
        symbol.parse().map_err(serde::de::Error::custom)
    }
}
