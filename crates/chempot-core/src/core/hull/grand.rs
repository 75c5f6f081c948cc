use super::error::HullError;
use super::phase_diagram::PhaseDiagram;
use crate::core::models::{Element, PdEntry};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// A phase diagram re-evaluated at fixed (absolute) chemical potentials.
///
/// Each entry is projected onto the open elements: the fixed elements are removed from
/// its composition and their contribution `Σ n_el · μ_el` is subtracted from its energy,
/// giving the grand potential. Entries made only of fixed elements drop out. Stability
/// is then decided by an ordinary convex hull over the open elements.
#[derive(Debug, Clone)]
pub struct GrandPotentialPhaseDiagram {
    chempots: BTreeMap<Element, f64>,
    diagram: PhaseDiagram,
    originals: Vec<PdEntry>,
}

impl GrandPotentialPhaseDiagram {
    #[instrument(skip_all, name = "grand_potential_diagram")]
    pub fn new(
        entries: &[PdEntry],
        chempots: &BTreeMap<Element, f64>,
        tolerance: f64,
    ) -> Result<Self, HullError> {
        if let Some((&element, &value)) = chempots.iter().find(|(_, v)| !v.is_finite()) {
            return Err(HullError::NonFiniteChempot { element, value });
        }
        let fixed: Vec<Element> = chempots.keys().copied().collect();

        let mut projected = Vec::new();
        let mut originals = Vec::new();
        for entry in entries {
            let open = entry.composition.without(&fixed);
            if open.is_empty() {
                continue;
            }
            let grand_energy = entry.energy
                - chempots
                    .iter()
                    .map(|(el, mu)| entry.composition.get(*el) * mu)
                    .sum::<f64>();
            projected.push(PdEntry {
                name: entry.name.clone(),
                composition: open,
                energy: grand_energy,
            });
            originals.push(entry.clone());
        }
        if projected.is_empty() {
            return Err(HullError::NoOpenElements);
        }

        let diagram = PhaseDiagram::with_tolerance(projected, tolerance)?;
        debug!(
            "Grand potential diagram at {:?}: {} of {} entries stable.",
            chempots
                .iter()
                .map(|(e, mu)| format!("{}={:.4}", e, mu))
                .collect::<Vec<_>>(),
            diagram.stable_entries().count(),
            originals.len()
        );
        Ok(Self {
            chempots: chempots.clone(),
            diagram,
            originals,
        })
    }

    /// The fixed absolute chemical potentials.
    pub fn chempots(&self) -> &BTreeMap<Element, f64> {
        &self.chempots
    }

    /// Elements that are not fixed, alphabetically.
    pub fn open_elements(&self) -> &[Element] {
        self.diagram.elements()
    }

    /// The hull over projected (grand-potential) entries.
    pub fn diagram(&self) -> &PhaseDiagram {
        &self.diagram
    }

    /// Original (unprojected) entries that are stable under the fixed potentials.
    pub fn stable_entries(&self) -> impl Iterator<Item = &PdEntry> + '_ {
        self.diagram
            .entries_with_stability()
            .zip(&self.originals)
            .filter(|((_, stable), _)| *stable)
            .map(|(_, original)| original)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hull::phase_diagram::DEFAULT_STABILITY_TOLERANCE;

    fn el(s: &str) -> Element {
        s.parse().unwrap()
    }

    fn entry(formula: &str, energy: f64) -> PdEntry {
        PdEntry::new(formula.parse().unwrap(), energy)
    }

    // References: Na -1, Nb -10, O -5 eV/atom.
    fn na_nb_o_entries() -> Vec<PdEntry> {
        vec![
            entry("Na", -1.0),
            entry("Nb", -10.0),
            entry("O2", -10.0),
            entry("Na2O", -10.0),
            entry("NbO2", -25.0),
            entry("NaNbO3", -35.0),
        ]
    }

    fn grand(chempots: &[(&str, f64)]) -> Result<GrandPotentialPhaseDiagram, HullError> {
        let chempots = chempots.iter().map(|(e, mu)| (el(e), *mu)).collect();
        GrandPotentialPhaseDiagram::new(&na_nb_o_entries(), &chempots, DEFAULT_STABILITY_TOLERANCE)
    }

    fn stable_names(gpd: &GrandPotentialPhaseDiagram) -> Vec<String> {
        gpd.stable_entries().map(|e| e.name.clone()).collect()
    }

    #[test]
    fn entries_of_only_fixed_elements_are_dropped() {
        let gpd = grand(&[("O", -5.0)]).unwrap();
        assert_eq!(gpd.open_elements(), &[el("Na"), el("Nb")]);
        assert_eq!(gpd.diagram().all_entries().len(), 5);
        assert!(!stable_names(&gpd).contains(&"O2".to_string()));
    }

    #[test]
    fn oxygen_rich_conditions_stabilize_oxides() {
        // At the O2 reference, the oxides remain stable against the metals.
        let gpd = grand(&[("O", -5.0)]).unwrap();
        assert_eq!(stable_names(&gpd), vec!["Na2O", "NbO2", "NaNbO3"]);
    }

    #[test]
    fn oxygen_poor_conditions_favor_the_metals() {
        let gpd = grand(&[("O", -10.0)]).unwrap();
        assert_eq!(stable_names(&gpd), vec!["Na", "Nb"]);
    }

    #[test]
    fn fixing_every_element_is_rejected() {
        let result = grand(&[("Na", -1.0), ("Nb", -10.0), ("O", -5.0)]);
        assert_eq!(result.unwrap_err(), HullError::NoOpenElements);
    }

    #[test]
    fn non_finite_chempots_are_rejected() {
        let result = grand(&[("O", f64::NAN)]);
        assert!(matches!(result, Err(HullError::NonFiniteChempot { .. })));
    }
}
