use chempot::analysis::{AnalysisConfig, Frame};

pub struct DefaultsConfig {
    pub frame: Frame,
    pub stability_tolerance: f64,
    pub singular_tolerance: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let analysis = AnalysisConfig::default();
        Self {
            frame: Frame::Referenced,
            stability_tolerance: analysis.stability_tolerance,
            singular_tolerance: analysis.singular_tolerance,
        }
    }
}
