use serde::{Deserialize, Serialize};

use crate::background::BackgroundModel;
use crate::detection::stars::StarMetrics;
use crate::error::{CentaurError, Result};
use crate::exposure::ExposureRecommendation;
use crate::profile::{ProfileCheck, ThresholdStatus};
use crate::saturation::SaturationReport;
use crate::sky::SkyBrightness;
use crate::snr::SnrResult;

/// Identity of the analyzed frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameInfo {
    pub filename: String,
    /// [height, width]
    pub dimensions: [usize; 2],
    pub filter: Option<String>,
    pub target: Option<String>,
    /// Header values as found, before defaults.
    pub exposure_from_header: Option<f64>,
    pub gain: Option<f64>,
    pub saturation_level: Option<f64>,
}

/// Sigma-clipped statistics of the whole frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageStats {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    /// max / std, 0 when std is 0.
    pub dynamic_range: f64,
    pub num_sources_detected: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub frame: FrameInfo,
    pub saturation: SaturationReport,
    pub background: BackgroundModel,
    pub image_stats: ImageStats,
    pub snr: SnrResult,
    pub sky: SkyBrightness,
    pub exposure: ExposureRecommendation,
    pub stars: Option<StarMetrics>,
    pub profile_checks: Vec<ProfileCheck>,
    pub recommendations: Vec<String>,
    /// Star-shape advice, kept apart from the ordered recommendations.
    #[serde(default)]
    pub quality_notes: Vec<String>,
    /// Degraded sub-results (e.g. unusable aperture) that did not abort the analysis.
    pub warnings: Vec<String>,
    pub analyzer_version: String,
}

impl AnalysisReport {
    /// Nested key/value document for persistence and export.
    ///
    /// Non-finite floats become `null`.
    pub fn to_document(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| CentaurError::Serialization(e.to_string()))
    }

    pub fn profile_alerts(&self) -> impl Iterator<Item = &ProfileCheck> {
        self.profile_checks
            .iter()
            .filter(|c| c.status != ThresholdStatus::Ok)
    }
}

/// Result of analyzing one frame: a full report or a tagged failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Success { report: Box<AnalysisReport> },
    Failed { filename: String, error: String },
}

impl AnalysisOutcome {
    pub fn failed(filename: impl Into<String>, error: &CentaurError) -> Self {
        Self::Failed {
            filename: filename.into(),
            error: error.to_string(),
        }
    }

    pub fn filename(&self) -> &str {
        match self {
            Self::Success { report } => &report.frame.filename,
            Self::Failed { filename, .. } => filename,
        }
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            Self::Success { report } => Some(report),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
