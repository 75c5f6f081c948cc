use crate::error::{CliError, Result};
use chempot::analysis::{ChemicalPotentials, Frame};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileAnalysisConfig {
    pub stability_tolerance: Option<f64>,
    pub singular_tolerance: Option<f64>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileBoundary {
    pub composition: String,
    pub fixed: ChemicalPotentials,
}

/// The on-disk shape of a reservoirs configuration.
///
/// ```toml
/// entries = "entries.csv"
/// frame = "referenced"
///
/// [analysis]
/// stability-tolerance = 1e-8
///
/// [reservoirs.O-rich]
/// Na = -1.5
/// O = 0.0
///
/// [[boundaries]]
/// composition = "NaNbO3"
/// fixed = { O = -1.0 }
/// ```
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub entries: Option<PathBuf>,
    pub frame: Option<Frame>,
    pub analysis: Option<FileAnalysisConfig>,
    pub reservoirs: Option<IndexMap<String, ChemicalPotentials>>,
    pub boundaries: Option<Vec<FileBoundary>>,
}

impl FileConfig {
    /// Parses a TOML file; a relative `entries` path is taken relative to the file.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;

        if let (Some(entries), Some(base)) = (&config.entries, path.parent()) {
            if entries.is_relative() {
                config.entries = Some(base.join(entries));
            }
        }
        Ok(config)
    }
}
