use super::collection::Reservoirs;
use super::error::ReservoirError;
use crate::analysis::{ChemicalPotentials, Frame};
use crate::core::hull::PhaseDiagram;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const DOCUMENT_MODULE: &str = "chempot.reservoirs";
const DOCUMENT_CLASS: &str = "Reservoirs";

/// Persisted form of [`Reservoirs`].
///
/// Chemical potentials are keyed by element symbol and the phase diagram is embedded
/// in full, so a document is self-contained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservoirsDocument {
    #[serde(rename = "@module")]
    pub module: String,
    #[serde(rename = "@class")]
    pub class: String,
    pub res_dict: IndexMap<String, ChemicalPotentials>,
    pub phase_diagram: PhaseDiagram,
    pub are_chempots_delta: bool,
}

impl Reservoirs {
    pub fn to_document(&self) -> ReservoirsDocument {
        ReservoirsDocument {
            module: DOCUMENT_MODULE.to_string(),
            class: DOCUMENT_CLASS.to_string(),
            res_dict: self.res_dict().clone(),
            phase_diagram: PhaseDiagram::clone(self.phase_diagram()),
            are_chempots_delta: self.are_chempots_delta(),
        }
    }

    pub fn from_document(document: ReservoirsDocument) -> Result<Self, ReservoirError> {
        if document.class != DOCUMENT_CLASS {
            return Err(ReservoirError::InvalidDocument(format!(
                "expected @class '{}', found '{}'",
                DOCUMENT_CLASS, document.class
            )));
        }
        Ok(Self::new(
            document.res_dict,
            Arc::new(document.phase_diagram),
            Frame::from_delta_flag(document.are_chempots_delta),
        ))
    }

    pub fn to_json_string(&self) -> Result<String, ReservoirError> {
        Ok(serde_json::to_string(&self.to_document())?)
    }

    pub fn to_json_file(&self, path: &Path) -> Result<(), ReservoirError> {
        let json = serde_json::to_string_pretty(&self.to_document())?;
        std::fs::write(path, json).map_err(|e| ReservoirError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        debug!("Wrote {} reservoirs to '{}'.", self.len(), path.display());
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, ReservoirError> {
        let document: ReservoirsDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ReservoirError> {
        let content = std::fs::read_to_string(path).map_err(|e| ReservoirError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let reservoirs = Self::from_json_str(&content)?;
        debug!(
            "Read {} reservoirs from '{}'.",
            reservoirs.len(),
            path.display()
        );
        Ok(reservoirs)
    }

    /// Reads `path_or_string` as a file if such a file exists, otherwise as JSON text.
    pub fn from_json(path_or_string: &str) -> Result<Self, ReservoirError> {
        let path = Path::new(path_or_string);
        if path.is_file() {
            Self::from_json_file(path)
        } else {
            Self::from_json_str(path_or_string)
        }
    }
}
