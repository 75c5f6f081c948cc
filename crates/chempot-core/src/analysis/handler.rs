use super::chempots::ChemicalPotentials;
use super::error::AnalysisError;
use crate::core::hull::PhaseDiagram;
use crate::core::models::{Composition, PdEntry};

/// Read-only queries over a [`PhaseDiagram`].
///
/// Compositions are always matched through their reduced form, so `Na4O2` finds the
/// `Na2O` entries. Formation energies are reported per reduced formula unit.
#[derive(Debug, Clone, Copy)]
pub struct PhaseDiagramHandler<'a> {
    pd: &'a PhaseDiagram,
}

impl<'a> PhaseDiagramHandler<'a> {
    pub fn new(pd: &'a PhaseDiagram) -> Self {
        Self { pd }
    }

    pub fn phase_diagram(&self) -> &'a PhaseDiagram {
        self.pd
    }

    /// Energy per atom of every element's reference entry, keyed alphabetically.
    pub fn chempots_reference(&self) -> ChemicalPotentials {
        self.pd
            .el_refs()
            .into_iter()
            .map(|(element, entry)| (element, entry.energy_per_atom()))
            .collect()
    }

    /// All entries whose reduced composition equals that of `comp`.
    pub fn entries_for_composition(
        &self,
        comp: &Composition,
    ) -> Result<Vec<&'a PdEntry>, AnalysisError> {
        let target = comp.reduced_composition();
        let entries: Vec<_> = self
            .pd
            .all_entries()
            .iter()
            .filter(|e| e.composition.reduced_composition() == target)
            .collect();
        if entries.is_empty() {
            return Err(AnalysisError::NotFound(target.formula()));
        }
        Ok(entries)
    }

    /// Formation energy per reduced formula unit of every entry matching `comp`.
    pub fn formation_energies_for_composition(
        &self,
        comp: &Composition,
    ) -> Result<Vec<(&'a PdEntry, f64)>, AnalysisError> {
        self.entries_for_composition(comp)?
            .into_iter()
            .map(|entry| Ok((entry, self.formation_energy_per_formula_unit(entry)?)))
            .collect()
    }

    /// The unique stable entry with the reduced composition of `comp`.
    ///
    /// The phase diagram keeps one hull candidate per composition point, so the
    /// [`AnalysisError::AmbiguousMatch`] branch only fires for a diagram whose stable
    /// set was assembled some other way.
    pub fn stable_entry_for_composition(
        &self,
        comp: &Composition,
    ) -> Result<&'a PdEntry, AnalysisError> {
        let target = comp.reduced_composition();
        let mut matches = self
            .pd
            .stable_entries()
            .filter(|e| e.composition.reduced_composition() == target);
        let first = matches
            .next()
            .ok_or_else(|| AnalysisError::StableNotFound(target.formula()))?;
        let others = matches.count();
        if others > 0 {
            return Err(AnalysisError::AmbiguousMatch {
                composition: target.formula(),
                count: others + 1,
            });
        }
        Ok(first)
    }

    /// Formation energy per reduced formula unit of the stable entry matching `comp`.
    pub fn formation_energy_of_stable(&self, comp: &Composition) -> Result<f64, AnalysisError> {
        let entry = self.stable_entry_for_composition(comp)?;
        self.formation_energy_per_formula_unit(entry)
    }

    fn formation_energy_per_formula_unit(&self, entry: &PdEntry) -> Result<f64, AnalysisError> {
        let (_, factor) = entry.composition.reduced_composition_and_factor();
        Ok(self.pd.formation_energy(entry)? / factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Element;
    use approx::assert_abs_diff_eq;

    fn el(s: &str) -> Element {
        s.parse().unwrap()
    }

    fn comp(formula: &str) -> Composition {
        formula.parse().unwrap()
    }

    fn entry(formula: &str, energy: f64) -> PdEntry {
        PdEntry::new(comp(formula), energy)
    }

    fn na_o_diagram() -> PhaseDiagram {
        PhaseDiagram::new(vec![
            entry("Na", -1.0),
            entry("Na", -0.9).with_name("Na (bcc)"),
            entry("O2", -10.0),
            entry("Na4O2", -20.0),
            entry("NaO2", -12.2),
        ])
        .unwrap()
    }

    #[test]
    fn reference_chempots_are_sorted_energies_per_atom() {
        let pd = na_o_diagram();
        let reference = PhaseDiagramHandler::new(&pd).chempots_reference();
        let pairs: Vec<_> = reference.iter().collect();
        assert_eq!(pairs, vec![(el("Na"), -1.0), (el("O"), -5.0)]);
    }

    #[test]
    fn entries_are_matched_by_reduced_composition() {
        let pd = na_o_diagram();
        let handler = PhaseDiagramHandler::new(&pd);
        assert_eq!(handler.entries_for_composition(&comp("Na")).unwrap().len(), 2);
        let oxides = handler.entries_for_composition(&comp("Na2O")).unwrap();
        assert_eq!(oxides.len(), 1);
        assert_eq!(oxides[0].name, "Na2O");
    }

    #[test]
    fn unknown_composition_is_not_found() {
        let pd = na_o_diagram();
        let result = PhaseDiagramHandler::new(&pd).entries_for_composition(&comp("NaO3"));
        assert_eq!(result.unwrap_err(), AnalysisError::NotFound("NaO3".to_string()));
    }

    #[test]
    fn formation_energies_are_per_reduced_formula_unit() {
        let pd = na_o_diagram();
        let handler = PhaseDiagramHandler::new(&pd);
        let energies = handler
            .formation_energies_for_composition(&comp("Na2O"))
            .unwrap();
        assert_eq!(energies.len(), 1);
        // Na4O2: -20 - (4 * -1 + 2 * -5) = -6, two formula units.
        assert_abs_diff_eq!(energies[0].1, -3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            handler.formation_energy_of_stable(&comp("Na2O")).unwrap(),
            -3.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn unstable_composition_has_no_stable_entry() {
        let pd = na_o_diagram();
        let handler = PhaseDiagramHandler::new(&pd);
        assert_eq!(
            handler.stable_entry_for_composition(&comp("NaO2")),
            Err(AnalysisError::StableNotFound("NaO2".to_string()))
        );
        assert_eq!(
            handler.stable_entry_for_composition(&comp("Na")).unwrap().name,
            "Na"
        );
    }

    #[test]
    fn degenerate_polymorphs_leave_one_stable_entry() {
        let pd = PhaseDiagram::new(vec![
            entry("Na", -1.0),
            entry("O2", -10.0),
            entry("Na2O", -10.0).with_name("Na2O (a)"),
            entry("Na4O2", -20.0).with_name("Na2O (b)"),
        ])
        .unwrap();
        let handler = PhaseDiagramHandler::new(&pd);
        assert_eq!(handler.entries_for_composition(&comp("Na2O")).unwrap().len(), 2);
        assert_eq!(
            handler.stable_entry_for_composition(&comp("Na2O")).unwrap().name,
            "Na2O (a)"
        );
    }
}
