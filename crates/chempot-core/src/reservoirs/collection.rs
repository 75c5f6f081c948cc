use super::error::ReservoirError;
use super::table::{Table, TableOptions};
use crate::analysis::{
    AnalysisError, ChemicalPotentials, ChempotAnalysis, Frame, PhaseDiagramHandler,
};
use crate::core::hull::PhaseDiagram;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Named sets of chemical potentials sharing one phase diagram and one frame.
///
/// Reservoirs keep their insertion order. Every set is either absolute or referenced
/// to the elemental phases of the diagram, as recorded by [`Reservoirs::frame`]; the
/// frame only changes through [`Reservoirs::set_to_absolute`] and
/// [`Reservoirs::set_to_referenced`], which convert every set at once.
#[derive(Debug, Clone)]
pub struct Reservoirs {
    res_dict: IndexMap<String, ChemicalPotentials>,
    phase_diagram: Arc<PhaseDiagram>,
    frame: Frame,
}

impl Reservoirs {
    pub fn new(
        res_dict: IndexMap<String, ChemicalPotentials>,
        phase_diagram: Arc<PhaseDiagram>,
        frame: Frame,
    ) -> Self {
        Self {
            res_dict,
            phase_diagram,
            frame,
        }
    }

    pub fn empty(phase_diagram: Arc<PhaseDiagram>, frame: Frame) -> Self {
        Self::new(IndexMap::new(), phase_diagram, frame)
    }

    pub fn phase_diagram(&self) -> &Arc<PhaseDiagram> {
        &self.phase_diagram
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn are_chempots_delta(&self) -> bool {
        self.frame.is_delta()
    }

    pub fn len(&self) -> usize {
        self.res_dict.len()
    }

    pub fn is_empty(&self) -> bool {
        self.res_dict.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.res_dict.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ChemicalPotentials> {
        self.res_dict.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ChemicalPotentials> {
        self.res_dict.get_mut(name)
    }

    /// Inserts or replaces a reservoir; a new name goes to the end.
    ///
    /// The values must be in the collection's current frame.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        chempots: ChemicalPotentials,
    ) -> Option<ChemicalPotentials> {
        self.res_dict.insert(name.into(), chempots)
    }

    /// Removes a reservoir, keeping the order of the others.
    pub fn remove(&mut self, name: &str) -> Result<ChemicalPotentials, ReservoirError> {
        self.res_dict
            .shift_remove(name)
            .ok_or_else(|| ReservoirError::UnknownReservoir(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.res_dict.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &ChemicalPotentials> + '_ {
        self.res_dict.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChemicalPotentials)> + Clone + '_ {
        self.res_dict.iter().map(|(name, mu)| (name.as_str(), mu))
    }

    pub fn res_dict(&self) -> &IndexMap<String, ChemicalPotentials> {
        &self.res_dict
    }

    pub fn analysis(&self) -> ChempotAnalysis {
        ChempotAnalysis::new(Arc::clone(&self.phase_diagram))
    }

    /// Energy per atom of every element's reference phase.
    pub fn reference_chempots(&self) -> ChemicalPotentials {
        PhaseDiagramHandler::new(&self.phase_diagram).chempots_reference()
    }

    /// Every reservoir converted to absolute potentials, leaving `self` untouched.
    pub fn absolute_chempots(
        &self,
    ) -> Result<IndexMap<String, ChemicalPotentials>, ReservoirError> {
        if self.frame == Frame::Absolute {
            return Err(ReservoirError::AlreadyInFrame(Frame::Absolute));
        }
        let analysis = self.analysis();
        self.convert(|mu| analysis.to_absolute(mu))
    }

    /// Every reservoir converted to referenced potentials, leaving `self` untouched.
    pub fn referenced_chempots(
        &self,
    ) -> Result<IndexMap<String, ChemicalPotentials>, ReservoirError> {
        if self.frame == Frame::Referenced {
            return Err(ReservoirError::AlreadyInFrame(Frame::Referenced));
        }
        let analysis = self.analysis();
        self.convert(|mu| analysis.to_delta(mu))
    }

    pub fn set_to_absolute(&mut self) -> Result<(), ReservoirError> {
        self.res_dict = self.absolute_chempots()?;
        self.frame = Frame::Absolute;
        info!("Converted {} reservoirs to absolute chemical potentials.", self.len());
        Ok(())
    }

    pub fn set_to_referenced(&mut self) -> Result<(), ReservoirError> {
        self.res_dict = self.referenced_chempots()?;
        self.frame = Frame::Referenced;
        info!(
            "Converted {} reservoirs to referenced chemical potentials.",
            self.len()
        );
        Ok(())
    }

    /// Converts the collection to `frame`, doing nothing if it is already there.
    pub fn ensure_frame(&mut self, frame: Frame) -> Result<(), ReservoirError> {
        match (self.frame, frame) {
            (current, wanted) if current == wanted => Ok(()),
            (_, Frame::Absolute) => self.set_to_absolute(),
            (_, Frame::Referenced) => self.set_to_referenced(),
        }
    }

    /// One row per reservoir, one column per element.
    pub fn table(&self, options: &TableOptions) -> Table {
        Table::from_reservoirs(self.iter(), options)
    }

    fn convert(
        &self,
        f: impl Fn(&ChemicalPotentials) -> Result<ChemicalPotentials, AnalysisError>,
    ) -> Result<IndexMap<String, ChemicalPotentials>, ReservoirError> {
        self.res_dict
            .iter()
            .map(|(name, mu)| Ok((name.clone(), f(mu)?)))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Reservoirs {
    type Item = (&'a String, &'a ChemicalPotentials);
    type IntoIter = indexmap::map::Iter<'a, String, ChemicalPotentials>;

    fn into_iter(self) -> Self::IntoIter {
        self.res_dict.iter()
    }
}

impl fmt::Display for Reservoirs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.table(&TableOptions::default()), f)
    }
}
