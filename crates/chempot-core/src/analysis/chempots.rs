use super::config::AnalysisConfig;
use super::error::AnalysisError;
use super::handler::PhaseDiagramHandler;
use crate::core::hull::{GrandPotentialPhaseDiagram, PhaseDiagram};
use crate::core::models::{AMOUNT_TOLERANCE, Composition, Element};
use crate::core::utils::linalg::solve_dense;
use indexmap::IndexMap;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument};

const TERNARY: usize = 3;

/// Chemical potentials (eV) keyed by element, ordered alphabetically by symbol.
///
/// The values carry no frame of their own: whether they are absolute or referenced to
/// the elemental phases is tracked by whoever owns them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChemicalPotentials(BTreeMap<Element, f64>);

impl ChemicalPotentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, element: Element) -> Option<f64> {
        self.0.get(&element).copied()
    }

    pub fn insert(&mut self, element: Element, value: f64) -> Option<f64> {
        self.0.insert(element, value)
    }

    pub fn contains(&self, element: Element) -> bool {
        self.0.contains_key(&element)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn elements(&self) -> impl Iterator<Item = Element> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Element, f64)> + '_ {
        self.0.iter().map(|(e, v)| (*e, *v))
    }

    pub fn as_map(&self) -> &BTreeMap<Element, f64> {
        &self.0
    }
}

impl From<BTreeMap<Element, f64>> for ChemicalPotentials {
    fn from(map: BTreeMap<Element, f64>) -> Self {
        Self(map)
    }
}

impl FromIterator<(Element, f64)> for ChemicalPotentials {
    fn from_iter<I: IntoIterator<Item = (Element, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for ChemicalPotentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (element, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {:.4}", element, value)?;
        }
        f.write_str("}")
    }
}

/// Frame of a set of chemical potentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frame {
    /// Total chemical potentials, in the energy scale of the entries.
    Absolute,
    /// Potentials relative to the elemental reference phases (`Δμ`).
    Referenced,
}

impl Frame {
    pub fn is_delta(self) -> bool {
        self == Frame::Referenced
    }

    pub fn from_delta_flag(are_chempots_delta: bool) -> Self {
        if are_chempots_delta {
            Frame::Referenced
        } else {
            Frame::Absolute
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Absolute => f.write_str("absolute"),
            Frame::Referenced => f.write_str("referenced"),
        }
    }
}

/// Chemical-potential analysis of a phase diagram.
///
/// Every operation except [`ChempotAnalysis::to_delta`] takes referenced potentials
/// (`Δμ`, relative to the elemental reference phases) and returns referenced
/// potentials.
#[derive(Debug, Clone)]
pub struct ChempotAnalysis {
    pd: Arc<PhaseDiagram>,
    reference: ChemicalPotentials,
    config: AnalysisConfig,
}

impl ChempotAnalysis {
    pub fn new(pd: Arc<PhaseDiagram>) -> Self {
        Self::with_config(pd, AnalysisConfig::default())
    }

    pub fn with_config(pd: Arc<PhaseDiagram>, config: AnalysisConfig) -> Self {
        let reference = PhaseDiagramHandler::new(&pd).chempots_reference();
        Self {
            pd,
            reference,
            config,
        }
    }

    pub fn phase_diagram(&self) -> &Arc<PhaseDiagram> {
        &self.pd
    }

    pub fn handler(&self) -> PhaseDiagramHandler<'_> {
        PhaseDiagramHandler::new(&self.pd)
    }

    /// Energy per atom of each element's reference phase.
    pub fn reference(&self) -> &ChemicalPotentials {
        &self.reference
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Adds the reference energies to referenced potentials.
    pub fn to_absolute(
        &self,
        delta: &ChemicalPotentials,
    ) -> Result<ChemicalPotentials, AnalysisError> {
        delta
            .iter()
            .map(|(element, mu)| Ok((element, mu + self.reference_of(element)?)))
            .collect()
    }

    /// Subtracts the reference energies from absolute potentials.
    pub fn to_delta(
        &self,
        absolute: &ChemicalPotentials,
    ) -> Result<ChemicalPotentials, AnalysisError> {
        absolute
            .iter()
            .map(|(element, mu)| Ok((element, mu - self.reference_of(element)?)))
            .collect()
    }

    fn reference_of(&self, element: Element) -> Result<f64, AnalysisError> {
        self.reference
            .get(element)
            .ok_or(AnalysisError::UnknownElement(element))
    }

    /// Solves `ΔH_f(comp) = Σ n_e Δμ_e` for the one element of `comp` whose potential
    /// is not in `fixed_deltas`.
    ///
    /// Potentials of elements that are not part of `comp` are ignored.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::InvalidConstraint`] unless exactly one element of the reduced
    /// composition is left free; the errors of
    /// [`PhaseDiagramHandler::formation_energy_of_stable`] otherwise.
    pub fn single_chempot(
        &self,
        comp: &Composition,
        fixed_deltas: &ChemicalPotentials,
    ) -> Result<f64, AnalysisError> {
        let reduced = comp.reduced_composition();
        let free: Vec<(Element, f64)> = reduced
            .amounts()
            .filter(|(element, _)| !fixed_deltas.contains(*element))
            .collect();
        let [(element, coefficient)] = free[..] else {
            return Err(AnalysisError::InvalidConstraint(format!(
                "{} requires exactly one unconstrained element, found {}",
                reduced.formula(),
                free.len()
            )));
        };

        let formation = self.handler().formation_energy_of_stable(&reduced)?;
        let constrained: f64 = reduced
            .amounts()
            .filter_map(|(el, amount)| fixed_deltas.get(el).map(|mu| amount * mu))
            .sum();
        let mu = (formation - constrained) / coefficient;
        debug!(
            "Solved Δμ({}) = {:.6} eV from {}.",
            element,
            mu,
            reduced.formula()
        );
        Ok(mu)
    }

    /// Stable neighbors of `comp` along the open-element axis at one fixed potential.
    ///
    /// Builds the grand-potential diagram at `fixed_delta` (converted to absolute),
    /// checks that `comp` is stable in it, and returns the stable compositions with the
    /// nearest smaller and larger weight fraction of the axis element (the
    /// alphabetically first open element of `comp`), both in reduced form.
    #[instrument(skip_all, name = "composition_boundaries")]
    pub fn composition_boundaries(
        &self,
        comp: &Composition,
        fixed_delta: &ChemicalPotentials,
    ) -> Result<(Composition, Composition), AnalysisError> {
        let fixed_element = self.check_boundary_inputs(fixed_delta)?;
        let fixed_abs = self.to_absolute(fixed_delta)?;
        let gpd = GrandPotentialPhaseDiagram::new(
            self.pd.all_entries(),
            fixed_abs.as_map(),
            self.config.stability_tolerance,
        )?;

        let target = comp.reduced_composition();
        let mut stable: Vec<Composition> = Vec::new();
        for entry in gpd.stable_entries() {
            let reduced = entry.composition.reduced_composition();
            if !stable.contains(&reduced) {
                stable.push(reduced);
            }
        }
        if !stable.contains(&target) {
            return Err(AnalysisError::NotStable {
                composition: target.formula(),
                chempots: fixed_delta.to_string(),
            });
        }

        let axis = target
            .elements()
            .find(|e| *e != fixed_element)
            .ok_or_else(|| {
                AnalysisError::InvalidConstraint(format!(
                    "{} has no element besides the fixed {}",
                    target.formula(),
                    fixed_element
                ))
            })?;
        let fraction = |c: &Composition| c.without(&[fixed_element]).weight_fraction(axis);
        let x_target = fraction(&target);

        let others: Vec<(Composition, f64)> = stable
            .into_iter()
            .filter(|c| *c != target)
            .map(|c| {
                let x = fraction(&c);
                (c, x)
            })
            .collect();
        let left = nearest_neighbor(
            &others,
            &target,
            "left",
            |x| x < x_target - AMOUNT_TOLERANCE,
            |a, b| a > b,
        )?;
        let right = nearest_neighbor(
            &others,
            &target,
            "right",
            |x| x > x_target + AMOUNT_TOLERANCE,
            |a, b| a < b,
        )?;

        debug!(
            "Boundaries of {} along {} at Δμ({}) = {:.4}: {} | {}.",
            target.formula(),
            axis,
            fixed_element,
            fixed_delta.get(fixed_element).unwrap_or_default(),
            left.formula(),
            right.formula()
        );
        Ok((left, right))
    }

    /// Referenced potentials where the stable phases `comp1` and `comp2` coexist at a
    /// fixed potential of one element.
    ///
    /// The two free potentials are ordered alphabetically and solved from
    /// `ΔH_f(comp_i) − n_i(fixed)·Δμ_fixed = Σ n_i(e)·Δμ_e`. The result holds all
    /// three potentials.
    pub fn chempots_at_boundary(
        &self,
        comp1: &Composition,
        comp2: &Composition,
        fixed_delta: &ChemicalPotentials,
    ) -> Result<ChemicalPotentials, AnalysisError> {
        let fixed_element = self.check_boundary_inputs(fixed_delta)?;
        let mu_fixed = self.fixed_value(fixed_delta, fixed_element)?;

        let handler = self.handler();
        let comps = [comp1.reduced_composition(), comp2.reduced_composition()];
        let unknowns: Vec<Element> = self
            .reference
            .elements()
            .filter(|e| *e != fixed_element)
            .collect();

        let mut rhs = Vec::with_capacity(2);
        for comp in &comps {
            let formation = handler.formation_energy_of_stable(comp)?;
            rhs.push(formation - comp.get(fixed_element) * mu_fixed);
        }
        let matrix =
            DMatrix::from_fn(2, unknowns.len(), |row, col| comps[row].get(unknowns[col]));
        let solution = solve_dense(
            matrix,
            &DVector::from_vec(rhs),
            self.config.singular_tolerance,
        )
        .ok_or_else(|| {
            AnalysisError::SingularSystem(format!(
                "the {}-{} boundary",
                comps[0].formula(),
                comps[1].formula()
            ))
        })?;

        let mut chempots: ChemicalPotentials = unknowns
            .iter()
            .zip(solution.iter())
            .map(|(e, mu)| (*e, *mu))
            .collect();
        chempots.insert(fixed_element, mu_fixed);
        Ok(chempots)
    }

    /// Boundary potentials on both sides of `comp`.
    ///
    /// Returns two entries keyed `"<left>-<comp>"` and `"<comp>-<right>"` (reduced
    /// formulas), in that order.
    #[instrument(skip_all, name = "boundary_analysis")]
    pub fn boundary_analysis(
        &self,
        comp: &Composition,
        fixed_delta: &ChemicalPotentials,
    ) -> Result<IndexMap<String, ChemicalPotentials>, AnalysisError> {
        let (left, right) = self.composition_boundaries(comp, fixed_delta)?;
        let target = comp.reduced_composition();

        let mut result = IndexMap::new();
        for (a, b) in [(&left, &target), (&target, &right)] {
            let key = format!("{}-{}", a.formula(), b.formula());
            let chempots = self.chempots_at_boundary(a, b, fixed_delta)?;
            result.insert(key, chempots);
        }
        info!(
            "Boundary analysis of {} done: {}.",
            target.formula(),
            result.keys().cloned().collect::<Vec<_>>().join(", ")
        );
        Ok(result)
    }

    fn check_boundary_inputs(
        &self,
        fixed_delta: &ChemicalPotentials,
    ) -> Result<Element, AnalysisError> {
        if self.pd.dim() != TERNARY {
            return Err(AnalysisError::UnsupportedArity {
                expected: TERNARY,
                found: self.pd.dim(),
            });
        }
        let mut fixed = fixed_delta.elements();
        match (fixed.next(), fixed.next()) {
            (Some(element), None) => {
                self.reference_of(element)?;
                Ok(element)
            }
            _ => Err(AnalysisError::InvalidConstraint(format!(
                "boundary analysis needs exactly one fixed chemical potential, got {}",
                fixed_delta.len()
            ))),
        }
    }

    fn fixed_value(
        &self,
        fixed_delta: &ChemicalPotentials,
        element: Element,
    ) -> Result<f64, AnalysisError> {
        let value = fixed_delta
            .get(element)
            .ok_or(AnalysisError::UnknownElement(element))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(AnalysisError::InvalidConstraint(format!(
                "Δμ({}) is not finite",
                element
            )))
        }
    }
}

/// The closest composition among `candidates` passing `side`, where `closer(a, b)` means
/// fraction `a` is nearer to the target than `b`. Distinct compositions tied at the
/// winning fraction are ambiguous.
fn nearest_neighbor(
    candidates: &[(Composition, f64)],
    target: &Composition,
    side_name: &'static str,
    side: impl Fn(f64) -> bool,
    closer: impl Fn(f64, f64) -> bool,
) -> Result<Composition, AnalysisError> {
    let best = candidates
        .iter()
        .filter(|(_, x)| side(*x))
        .fold(None, |best: Option<f64>, (_, x)| match best {
            Some(b) if !closer(*x, b) => Some(b),
            _ => Some(*x),
        })
        .ok_or_else(|| AnalysisError::BoundaryNotFound {
            composition: target.formula(),
            side: side_name,
        })?;

    let winners: Vec<&Composition> = candidates
        .iter()
        .filter(|(_, x)| (x - best).abs() <= AMOUNT_TOLERANCE)
        .map(|(c, _)| c)
        .collect();
    match winners[..] {
        [winner] => Ok(winner.clone()),
        _ => Err(AnalysisError::AmbiguousMatch {
            composition: target.formula(),
            count: winners.len(),
        }),
    }
}
