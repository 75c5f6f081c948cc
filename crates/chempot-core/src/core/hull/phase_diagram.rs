use super::error::HullError;
use super::geometry::{HullPoint, LowerHull};
use crate::core::models::{AMOUNT_TOLERANCE, Element, PdEntry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Formation energies per atom (eV/atom) closer than this are considered degenerate.
pub const DEFAULT_STABILITY_TOLERANCE: f64 = 1e-8;

const DOCUMENT_MODULE: &str = "chempot.core.hull";
const DOCUMENT_CLASS: &str = "PhaseDiagram";

/// An immutable convex-hull phase diagram over a fixed set of elements.
///
/// Every entry is placed in energy-composition space as its atomic fractions and its
/// formation energy per atom. The stable entries are the vertices of the lower convex
/// hull of those points. Each element has exactly one reference entry: its lowest
/// energy-per-atom elemental phase.
///
/// The diagram serializes to a [`PhaseDiagramDocument`] holding the elements and the
/// entries; the hull is recomputed on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "PhaseDiagramDocument", try_from = "PhaseDiagramDocument")]
pub struct PhaseDiagram {
    elements: Vec<Element>,
    entries: Vec<PdEntry>,
    el_refs: BTreeMap<Element, usize>,
    stable: Vec<usize>,
    hull: LowerHull,
    tolerance: f64,
}

impl PhaseDiagram {
    /// Builds a diagram over the union of the entries' elements.
    ///
    /// # Errors
    ///
    /// Fails if there are no entries, an entry is empty, or an element lacks an
    /// elemental reference entry.
    pub fn new(entries: Vec<PdEntry>) -> Result<Self, HullError> {
        Self::with_tolerance(entries, DEFAULT_STABILITY_TOLERANCE)
    }

    pub fn with_tolerance(entries: Vec<PdEntry>, tolerance: f64) -> Result<Self, HullError> {
        let elements = entries
            .iter()
            .flat_map(|e| e.composition.elements())
            .collect();
        Self::with_elements(entries, elements, tolerance)
    }

    /// Builds a diagram over an explicit element set.
    ///
    /// # Errors
    ///
    /// In addition to the failures of [`PhaseDiagram::new`], returns
    /// [`HullError::UnknownElement`] if an entry contains an element outside `elements`.
    #[instrument(skip_all, name = "phase_diagram")]
    pub fn with_elements(
        entries: Vec<PdEntry>,
        mut elements: Vec<Element>,
        tolerance: f64,
    ) -> Result<Self, HullError> {
        if entries.is_empty() {
            return Err(HullError::NoEntries);
        }
        elements.sort();
        elements.dedup();

        for entry in &entries {
            if entry.composition.is_empty() {
                return Err(HullError::EmptyComposition(entry.name.clone()));
            }
            if let Some(element) = entry.composition.elements().find(|e| !elements.contains(e)) {
                return Err(HullError::UnknownElement {
                    name: entry.name.clone(),
                    element,
                });
            }
        }

        let el_refs = find_elemental_references(&entries, &elements)?;
        let points = entries
            .iter()
            .map(|entry| hull_point(&elements, &el_refs, &entries, entry))
            .collect::<Result<Vec<_>, _>>()?;
        let (stable, hull) = compute_hull(&points, &elements, tolerance)?;
        let diagram = Self {
            elements,
            entries,
            el_refs,
            stable,
            hull,
            tolerance,
        };

        debug!(
            "Built phase diagram over {:?}: {} entries, {} stable.",
            diagram.elements.iter().map(|e| e.symbol()).collect::<Vec<_>>(),
            diagram.entries.len(),
            diagram.stable.len()
        );
        Ok(diagram)
    }

    /// Elements of the diagram, alphabetically.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn dim(&self) -> usize {
        self.elements.len()
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn all_entries(&self) -> &[PdEntry] {
        &self.entries
    }

    pub fn stable_entries(&self) -> impl Iterator<Item = &PdEntry> + '_ {
        self.stable.iter().map(|&idx| &self.entries[idx])
    }

    pub fn unstable_entries(&self) -> impl Iterator<Item = &PdEntry> + '_ {
        self.entries_with_stability()
            .filter(|(_, stable)| !stable)
            .map(|(entry, _)| entry)
    }

    /// Every entry in input order, paired with its stability flag.
    pub fn entries_with_stability(&self) -> impl Iterator<Item = (&PdEntry, bool)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (entry, self.stable.binary_search(&idx).is_ok()))
    }

    /// Reference entry of every element, keyed alphabetically.
    pub fn el_refs(&self) -> BTreeMap<Element, &PdEntry> {
        self.el_refs
            .iter()
            .map(|(element, &idx)| (*element, &self.entries[idx]))
            .collect()
    }

    pub fn reference_entry(&self, element: Element) -> Option<&PdEntry> {
        self.el_refs.get(&element).map(|&idx| &self.entries[idx])
    }

    pub fn reference_energy_per_atom(&self, element: Element) -> Option<f64> {
        self.reference_entry(element).map(PdEntry::energy_per_atom)
    }

    /// Total formation energy of `entry` with respect to the elemental references.
    ///
    /// # Errors
    ///
    /// Returns [`HullError::UnknownElement`] if the entry contains an element outside
    /// the diagram.
    pub fn formation_energy(&self, entry: &PdEntry) -> Result<f64, HullError> {
        formation_energy(&self.el_refs, &self.entries, entry)
    }

    pub fn formation_energy_per_atom(&self, entry: &PdEntry) -> Result<f64, HullError> {
        Ok(self.formation_energy(entry)? / entry.composition.num_atoms())
    }

    /// Distance (eV/atom) of `entry` above the lower hull; zero for stable entries.
    pub fn energy_above_hull(&self, entry: &PdEntry) -> Result<f64, HullError> {
        let point = hull_point(&self.elements, &self.el_refs, &self.entries, entry)?;
        let hull = self
            .hull
            .energy_at(&point.coords, self.tolerance)
            .ok_or_else(|| HullError::OutsideHull(entry.composition.formula()))?;
        Ok((point.energy - hull).max(0.0))
    }
}

fn formation_energy(
    el_refs: &BTreeMap<Element, usize>,
    entries: &[PdEntry],
    entry: &PdEntry,
) -> Result<f64, HullError> {
    let mut reference = 0.0;
    for (element, amount) in entry.composition.amounts() {
        let idx = el_refs
            .get(&element)
            .ok_or_else(|| HullError::UnknownElement {
                name: entry.name.clone(),
                element,
            })?;
        reference += amount * entries[*idx].energy_per_atom();
    }
    Ok(entry.energy - reference)
}

fn hull_point(
    elements: &[Element],
    el_refs: &BTreeMap<Element, usize>,
    entries: &[PdEntry],
    entry: &PdEntry,
) -> Result<HullPoint, HullError> {
    Ok(HullPoint {
        coords: elements
            .iter()
            .map(|e| entry.composition.atomic_fraction(*e))
            .collect(),
        energy: formation_energy(el_refs, entries, entry)? / entry.composition.num_atoms(),
    })
}

/// Stable entry indices (ascending) and the lower hull of the candidate points.
fn compute_hull(
    points: &[HullPoint],
    elements: &[Element],
    tolerance: f64,
) -> Result<(Vec<usize>, LowerHull), HullError> {
    // Lowest-energy entry per composition point; anything above zero formation
    // energy can never touch the hull.
    let mut candidates: Vec<usize> = Vec::new();
    for (idx, point) in points.iter().enumerate() {
        if point.energy > tolerance {
            continue;
        }
        let same_point = candidates.iter_mut().find(|other| {
            points[**other]
                .coords
                .iter()
                .zip(&point.coords)
                .all(|(a, b)| (a - b).abs() < AMOUNT_TOLERANCE)
        });
        match same_point {
            Some(slot) => {
                if point.energy < points[*slot].energy {
                    *slot = idx;
                }
            }
            None => candidates.push(idx),
        }
    }

    let corners = (0..elements.len())
        .map(|axis| {
            candidates
                .iter()
                .position(|&idx| (points[idx].coords[axis] - 1.0).abs() < AMOUNT_TOLERANCE)
                .ok_or(HullError::MissingTerminal(elements[axis]))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let candidate_points: Vec<HullPoint> =
        candidates.iter().map(|&idx| points[idx].clone()).collect();
    let hull = LowerHull::build(&candidate_points, &corners, tolerance)
        .ok_or(HullError::DegenerateReferences)?;
    let mut stable: Vec<usize> = hull
        .strict_vertices(&candidate_points, tolerance)
        .into_iter()
        .map(|local| candidates[local])
        .collect();
    stable.sort_unstable();
    Ok((stable, hull))
}

fn find_elemental_references(
    entries: &[PdEntry],
    elements: &[Element],
) -> Result<BTreeMap<Element, usize>, HullError> {
    elements
        .iter()
        .map(|&element| {
            entries
                .iter()
                .enumerate()
                .filter(|(_, e)| e.is_element() && e.composition.contains(element))
                .min_by(|(_, a), (_, b)| a.energy_per_atom().total_cmp(&b.energy_per_atom()))
                .map(|(idx, _)| (element, idx))
                .ok_or(HullError::MissingTerminal(element))
        })
        .collect()
}

fn default_tolerance() -> f64 {
    DEFAULT_STABILITY_TOLERANCE
}

/// JSON-compatible persisted form of a [`PhaseDiagram`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseDiagramDocument {
    #[serde(rename = "@module")]
    pub module: String,
    #[serde(rename = "@class")]
    pub class: String,
    pub elements: Vec<Element>,
    pub all_entries: Vec<PdEntry>,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl From<PhaseDiagram> for PhaseDiagramDocument {
    fn from(diagram: PhaseDiagram) -> Self {
        Self {
            module: DOCUMENT_MODULE.to_string(),
            class: DOCUMENT_CLASS.to_string(),
            elements: diagram.elements,
            all_entries: diagram.entries,
            tolerance: diagram.tolerance,
        }
    }
}

impl TryFrom<PhaseDiagramDocument> for PhaseDiagram {
    type Error = HullError;

    fn try_from(document: PhaseDiagramDocument) -> Result<Self, Self::Error> {
        if document.class != DOCUMENT_CLASS {
            return Err(HullError::InvalidDocument(format!(
                "expected @class '{}', found '{}'",
                DOCUMENT_CLASS, document.class
            )));
        }
        Self::with_elements(document.all_entries, document.elements, document.tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn el(s: &str) -> Element {
        s.parse().unwrap()
    }

    fn entry(formula: &str, energy: f64) -> PdEntry {
        PdEntry::new(formula.parse().unwrap(), energy)
    }

    // Na: -1 eV/atom, O: -5 eV/atom.
    // Na2O: formation -1.0 eV/atom (stable), NaO2: -0.4 eV/atom (0.1 above hull).
    fn na_o_entries() -> Vec<PdEntry> {
        vec![
            entry("Na", -1.0),
            entry("Na", -0.9).with_name("Na (bcc)"),
            entry("O2", -10.0),
            entry("Na2O", -10.0),
            entry("NaO2", -12.2),
        ]
    }

    #[test]
    fn elemental_references_are_lowest_energy_per_atom() {
        let pd = PhaseDiagram::new(na_o_entries()).unwrap();
        assert_eq!(pd.elements(), &[el("Na"), el("O")]);
        assert_eq!(pd.reference_entry(el("Na")).unwrap().name, "Na");
        assert_abs_diff_eq!(pd.reference_energy_per_atom(el("O")).unwrap(), -5.0);
        assert_eq!(pd.el_refs().len(), 2);
    }

    #[test]
    fn stable_entries_are_hull_vertices() {
        let pd = PhaseDiagram::new(na_o_entries()).unwrap();
        let stable: Vec<_> = pd.stable_entries().map(|e| e.name.as_str()).collect();
        assert_eq!(stable, vec!["Na", "O2", "Na2O"]);
        let unstable: Vec<_> = pd.unstable_entries().map(|e| e.name.as_str()).collect();
        assert_eq!(unstable, vec!["Na (bcc)", "NaO2"]);
    }

    #[test]
    fn formation_energies_are_relative_to_references() {
        let pd = PhaseDiagram::new(na_o_entries()).unwrap();
        let na2o = &pd.all_entries()[3];
        assert_abs_diff_eq!(pd.formation_energy(na2o).unwrap(), -3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            pd.formation_energy_per_atom(na2o).unwrap(),
            -1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn energy_above_hull_measures_distance_to_the_hull() {
        let pd = PhaseDiagram::new(na_o_entries()).unwrap();
        let entries = pd.all_entries();
        let e_above = |idx: usize| pd.energy_above_hull(&entries[idx]).unwrap();
        assert_abs_diff_eq!(e_above(3), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(e_above(4), 0.1, epsilon = 1e-9);
        assert_abs_diff_eq!(e_above(1), 0.1, epsilon = 1e-9);
    }

    #[test]
    fn points_on_the_hull_between_vertices_are_not_stable() {
        let mut entries = na_o_entries();
        // Exactly on the Na2O-O2 tie line at x(O) = 1/2.
        entries.push(entry("Na2O2", -15.0));
        let pd = PhaseDiagram::new(entries).unwrap();
        assert!(pd.stable_entries().all(|e| e.name != "Na2O2"));
    }

    #[test]
    fn missing_terminal_is_rejected() {
        let result = PhaseDiagram::new(vec![entry("Na", -1.0), entry("Na2O", -10.0)]);
        assert_eq!(result.unwrap_err(), HullError::MissingTerminal(el("O")));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(PhaseDiagram::new(vec![]).unwrap_err(), HullError::NoEntries);
    }

    #[test]
    fn entries_outside_explicit_elements_are_rejected() {
        let result = PhaseDiagram::with_elements(
            na_o_entries(),
            vec![el("Na")],
            DEFAULT_STABILITY_TOLERANCE,
        );
        assert!(matches!(result, Err(HullError::UnknownElement { .. })));
    }

    #[test]
    fn ternary_compound_below_binary_tie_lines_is_stable() {
        let entries = vec![
            entry("Na", -1.0),
            entry("Nb", -10.0),
            entry("O2", -10.0),
            entry("Na2O", -10.0),
            entry("NbO2", -25.0),
            entry("NaNbO3", -35.0),
        ];
        let pd = PhaseDiagram::new(entries).unwrap();
        assert_eq!(pd.dim(), 3);
        assert!(pd.stable_entries().any(|e| e.name == "NaNbO3"));
        assert_eq!(pd.stable_entries().count(), 6);
    }

    // Formation energy per atom on the strictly convex surface Σx² - 1, so every
    // grid point is a hull vertex until it is lifted off the surface.
    fn convex_ternary_grid() -> (Vec<PdEntry>, Vec<String>) {
        const ATOMS: u32 = 19;
        let mut entries = vec![entry("Na", -1.0), entry("Nb", -10.0), entry("O2", -10.0)];
        let mut lifted = Vec::new();
        for a in 1..ATOMS {
            for b in 1..ATOMS - a {
                let c = ATOMS - a - b;
                let n = f64::from(ATOMS);
                let (a_f, b_f, c_f) = (f64::from(a), f64::from(b), f64::from(c));
                let surface = (a_f * a_f + b_f * b_f + c_f * c_f) / (n * n) - 1.0;
                let mut energy = n * surface - a_f - 10.0 * b_f - 5.0 * c_f;
                let name = format!("Na{}Nb{}O{}", a, b, c);
                if a % 5 == 0 {
                    energy += 0.5;
                    lifted.push(name.clone());
                }
                entries.push(entry(&name, energy).with_name(&name));
            }
        }
        (entries, lifted)
    }

    #[test]
    fn large_ternary_diagram_finds_every_convex_vertex() {
        let (entries, lifted) = convex_ternary_grid();
        assert_eq!(entries.len(), 156);
        assert_eq!(lifted.len(), 24);

        let pd = PhaseDiagram::new(entries).unwrap();
        assert_eq!(pd.stable_entries().count(), 132);
        let unstable: Vec<String> = pd.unstable_entries().map(|e| e.name.clone()).collect();
        assert_eq!(unstable, lifted);

        for (entry, stable) in pd.entries_with_stability() {
            let e_above = pd.energy_above_hull(entry).unwrap();
            if stable {
                assert_abs_diff_eq!(e_above, 0.0, epsilon = 1e-9);
            } else {
                assert!(e_above > 0.0, "{} should sit above the hull", entry.name);
            }
        }
    }

    #[test]
    fn document_round_trip_recomputes_the_hull() {
        let pd = PhaseDiagram::new(na_o_entries()).unwrap();
        let json = serde_json::to_string(&pd).unwrap();
        assert!(json.contains("\"@class\":\"PhaseDiagram\""));

        let back: PhaseDiagram = serde_json::from_str(&json).unwrap();
        assert_eq!(back.all_entries(), pd.all_entries());
        let names = |d: &PhaseDiagram| {
            d.stable_entries()
                .map(|e| e.name.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&back), names(&pd));
    }

    #[test]
    fn document_with_wrong_class_fails_loudly() {
        let pd = PhaseDiagram::new(na_o_entries()).unwrap();
        let mut document = PhaseDiagramDocument::from(pd);
        document.class = "Reservoirs".to_string();
        assert!(matches!(
            PhaseDiagram::try_from(document),
            Err(HullError::InvalidDocument(_))
        ));
    }

    #[test]
    fn document_without_terminals_fails_loudly() {
        let json = r#"{"@module":"x","@class":"PhaseDiagram","elements":["Na","O"],
            "all_entries":[{"name":"Na","composition":{"Na":1.0},"energy":-1.0}]}"#;
        let result = serde_json::from_str::<PhaseDiagram>(json);
        assert!(result.is_err());
    }
}
