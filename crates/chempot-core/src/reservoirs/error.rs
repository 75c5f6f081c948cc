use crate::analysis::{AnalysisError, Frame};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReservoirError {
    #[error("Chemical potentials are already {0}")]
    AlreadyInFrame(Frame),

    #[error("Chemical-potential analysis failed: {source}")]
    Analysis {
        #[from]
        source: AnalysisError,
    },

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },

    #[error("No reservoir named '{0}'")]
    UnknownReservoir(String),

    #[error("Invalid reservoirs document: {0}")]
    InvalidDocument(String),
}
