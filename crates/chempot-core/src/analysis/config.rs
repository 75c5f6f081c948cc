use crate::core::hull::DEFAULT_STABILITY_TOLERANCE;
use crate::core::utils::linalg::DEFAULT_SINGULAR_TOLERANCE;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Invalid value {value} for parameter '{name}': must be finite and positive")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Numerical tolerances used by the chemical-potential analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisConfig {
    /// Energy tolerance (eV/atom) for hull stability decisions.
    pub stability_tolerance: f64,
    /// Determinant magnitude below which a linear system counts as singular.
    pub singular_tolerance: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            stability_tolerance: DEFAULT_STABILITY_TOLERANCE,
            singular_tolerance: DEFAULT_SINGULAR_TOLERANCE,
        }
    }
}

#[derive(Default)]
pub struct AnalysisConfigBuilder {
    stability_tolerance: Option<f64>,
    singular_tolerance: Option<f64>,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stability_tolerance(mut self, tolerance: f64) -> Self {
        self.stability_tolerance = Some(tolerance);
        self
    }
    pub fn singular_tolerance(mut self, tolerance: f64) -> Self {
        self.singular_tolerance = Some(tolerance);
        self
    }

    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        let defaults = AnalysisConfig::default();
        Ok(AnalysisConfig {
            stability_tolerance: validate(
                "stability_tolerance",
                self.stability_tolerance
                    .unwrap_or(defaults.stability_tolerance),
            )?,
            singular_tolerance: validate(
                "singular_tolerance",
                self.singular_tolerance
                    .unwrap_or(defaults.singular_tolerance),
            )?,
        })
    }
}

fn validate(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidParameter { name, value })
    }
}
