use serde::{Deserialize, Serialize};

use crate::background::BackgroundConfig;
use crate::error::Result;
use crate::exposure::ExposureConfig;
use crate::snr::ApertureConfig;
use crate::stats::SigmaClipParams;

/// Every tunable of a single-frame analysis.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub sigma_clip: SigmaClipParams,
    #[serde(default)]
    pub background: BackgroundConfig,
    #[serde(default)]
    pub aperture: ApertureConfig,
    #[serde(default)]
    pub exposure: ExposureConfig,
    /// Fail instead of assuming 1 s when the exposure time is missing.
    #[serde(default)]
    pub strict_metadata: bool,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        self.sigma_clip.validate()?;
        self.background.validate()?;
        self.aperture.validate()?;
        self.exposure.validate()?;
        Ok(())
    }
}
