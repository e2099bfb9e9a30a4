use crate::frame::SourceCatalog;
use crate::profile::OpticalProfile;

/// Analysis stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnalysisStage {
    Statistics,
    Saturation,
    Background,
    SignalToNoise,
    SkyBrightness,
    Exposure,
    Report,
}

impl std::fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Statistics => write!(f, "Computing image statistics"),
            Self::Saturation => write!(f, "Classifying saturation"),
            Self::Background => write!(f, "Separating background"),
            Self::SignalToNoise => write!(f, "Estimating SNR"),
            Self::SkyBrightness => write!(f, "Measuring sky brightness"),
            Self::Exposure => write!(f, "Advising exposure"),
            Self::Report => write!(f, "Assembling report"),
        }
    }
}

/// Thread-safe progress reporting for an analysis.
///
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn begin_stage(&self, _stage: AnalysisStage) {}

    fn finish_stage(&self) {}
}

/// No-op progress reporter, used when `analyze_frame` delegates.
pub(super) struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// Optional collaborator inputs for one analysis.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnalysisInputs<'a> {
    /// Source mask and records from an external extractor.
    pub sources: Option<&'a SourceCatalog>,
    /// Aperture centre (column, row); overrides the brightest source.
    pub position: Option<(f64, f64)>,
    pub profile: Option<&'a OpticalProfile>,
}
