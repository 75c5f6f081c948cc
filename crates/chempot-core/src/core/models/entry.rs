use super::composition::Composition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A candidate compound for a phase diagram: a composition and its total energy.
///
/// The energy is the total energy of the composition as written (not per atom, not
/// per formula unit), typically in eV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdEntry {
    /// Display name of the entry; defaults to the reduced formula.
    pub name: String,
    pub composition: Composition,
    pub energy: f64,
}

impl PdEntry {
    /// Creates an entry named after its reduced formula.
    pub fn new(composition: Composition, energy: f64) -> Self {
        Self {
            name: composition.reduced_formula(),
            composition,
            energy,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn energy_per_atom(&self) -> f64 {
        self.energy / self.composition.num_atoms()
    }

    pub fn is_element(&self) -> bool {
        self.composition.is_element()
    }
}

impl fmt::Display for PdEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) with energy {:.4}",
            self.name,
            self.composition.formula(),
            self.energy
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_is_named_after_reduced_formula() {
        let entry = PdEntry::new("Na4O2".parse().unwrap(), -12.0);
        assert_eq!(entry.name, "Na2O");
        assert_eq!(entry.energy_per_atom(), -2.0);
        assert!(!entry.is_element());
    }

    #[test]
    fn with_name_overrides_the_default_name() {
        let entry = PdEntry::new("O2".parse().unwrap(), -9.8).with_name("O2 (gas)");
        assert_eq!(entry.name, "O2 (gas)");
        assert!(entry.is_element());
        assert!((entry.energy_per_atom() + 4.9).abs() < 1e-12);
    }
}
