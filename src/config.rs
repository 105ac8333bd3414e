use std::path::Path;

use anyhow::Context as _;

use crate::{
    detect::DetectionConfig,
    export::ExportConfig,
    foundation::error::{FramefitError, FramefitResult},
    render::ComposeConfig,
};

/// All tunables of a run, loadable from JSON. Missing fields take their defaults.
///
/// ```json
/// {
///   "detection": { "alpha_threshold": 50, "brightness_threshold": 200.0, "fallback_padding_ratio": 0.2 },
///   "compose": { "filter": "catmull_rom" },
///   "export": { "sequential_spacing_ms": 100, "individual_spacing_ms": 200 }
/// }
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub detection: DetectionConfig,
    pub compose: ComposeConfig,
    pub export: ExportConfig,
}

impl PipelineConfig {
    pub fn from_json(json: &str) -> FramefitResult<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| FramefitError::validation(format!("invalid config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> FramefitResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> FramefitResult<()> {
        self.detection.validate()
    }
}
