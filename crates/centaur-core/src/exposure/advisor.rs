use serde::{Deserialize, Serialize};
use tracing::info;

use crate::consts::{
    HIGH_SEVERITY_PERCENT, MODERATE_SATURATION_REDUCTION, NARROWBAND_FILTERS,
    SEVERE_SATURATION_REDUCTION, UNMEASURED_SNR_MULTIPLIER,
};
use crate::error::{CentaurError, Result};
use crate::frame::FrameMetadata;
use crate::saturation::{SaturationReport, SaturationSeverity};
use crate::sky::SkyBrightness;

use super::config::ExposureConfig;

/// Which branch produced the recommendation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposureReason {
    Saturation,
    SnrOptimization,
}

impl std::fmt::Display for ExposureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Saturation => write!(f, "saturation"),
            Self::SnrOptimization => write!(f, "snr_optimization"),
        }
    }
}

/// Sky shot noise versus read noise for one sub-exposure.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseRegime {
    pub read_noise: f64,
    /// sqrt of sky electrons per pixel.
    pub sky_noise: f64,
    pub read_noise_dominant: bool,
    pub sky_rate: f64,
}

/// SII/OIII guidance derived from the main recommendation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NarrowbandAdjustment {
    pub is_narrowband: bool,
    /// 1.0 for broadband filters.
    pub factor: f64,
    pub recommended_exposure: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExposureRecommendation {
    pub current_exposure: f64,
    /// Clamped to the configured exposure bounds.
    pub recommended_exposure: f64,
    /// recommended / current; 1.0 when the current exposure is zero.
    pub exposure_factor: f64,
    /// The current exposure was zero so the factor carries no information.
    pub indeterminate: bool,
    pub reason: ExposureReason,
    /// SNR the SNR branch scaled against (unused by the saturation branch).
    pub measured_snr: f64,
    pub target_snr: f64,
    pub saturation_warning: bool,
    pub read_noise_dominant: bool,
    pub optimal_sub_length: f64,
    pub noise_regime: NoiseRegime,
    pub narrowband: NarrowbandAdjustment,
}

/// True if the upper-cased filter name names a narrowband line.
pub fn is_narrowband(filter: &str) -> bool {
    let upper = filter.to_uppercase();
    NARROWBAND_FILTERS.iter().any(|f| upper.contains(f))
}

/// Sub length at which sky shot noise equals read noise, clamped to the
/// configured band; the default length when the sky rate is not positive.
pub fn optimal_sub_length(read_noise: f64, sky_rate: f64, config: &ExposureConfig) -> Result<f64> {
    config.validate()?;
    if sky_rate > 0.0 {
        Ok(clamp_finite(
            read_noise * read_noise / sky_rate,
            config.min_sub_length,
            config.max_sub_length,
        ))
    } else {
        Ok(config.default_sub_length)
    }
}

/// Recommend an exposure from saturation, measured SNR and sky level.
///
/// Significant saturation (HIGH or MODERATE with a warning) scales the
/// exposure down by 0.5 or 0.7; otherwise it is scaled by
/// `(target / measured)^2`, or by 4 when no SNR was measured.
pub fn advise_exposure(
    saturation: &SaturationReport,
    measured_snr: f64,
    sky: &SkyBrightness,
    metadata: &FrameMetadata,
    strict_metadata: bool,
    config: &ExposureConfig,
) -> Result<ExposureRecommendation> {
    config.validate()?;
    if !(saturation.saturation_level > 0.0) {
        return Err(CentaurError::InvalidConfiguration(format!(
            "saturation level must be positive, got {}",
            saturation.saturation_level
        )));
    }
    let current = metadata.exposure_time(strict_metadata)?;

    let significant = saturation.warning
        && matches!(
            saturation.severity,
            SaturationSeverity::High | SaturationSeverity::Moderate
        );

    let (raw, reason) = if significant {
        let reduction = if saturation.near_saturated_percent() > HIGH_SEVERITY_PERCENT {
            SEVERE_SATURATION_REDUCTION
        } else {
            MODERATE_SATURATION_REDUCTION
        };
        (current * reduction, ExposureReason::Saturation)
    } else if measured_snr > 0.0 && measured_snr.is_finite() {
        (
            current * (config.target_snr / measured_snr).powi(2),
            ExposureReason::SnrOptimization,
        )
    } else {
        (current * UNMEASURED_SNR_MULTIPLIER, ExposureReason::SnrOptimization)
    };

    let recommended = clamp_finite(raw, config.min_exposure, config.max_exposure);
    let (exposure_factor, indeterminate) = if current > 0.0 {
        (recommended / current, false)
    } else {
        (1.0, true)
    };

    let read_noise = metadata.read_noise();
    let sky_rate = sky.electrons_per_second_per_pixel;
    let sky_noise = sky.electrons_per_pixel.max(0.0).sqrt();
    let noise_regime = NoiseRegime {
        read_noise,
        sky_noise,
        read_noise_dominant: read_noise > sky_noise,
        sky_rate,
    };

    let narrowband_filter = metadata.filter.as_deref().is_some_and(is_narrowband);
    let factor = if narrowband_filter {
        config.narrowband_factor
    } else {
        1.0
    };
    let narrowband = NarrowbandAdjustment {
        is_narrowband: narrowband_filter,
        factor,
        recommended_exposure: recommended * factor,
    };

    let optimal_sub = optimal_sub_length(read_noise, sky_rate, config)?;

    info!(
        current,
        recommended,
        factor = exposure_factor,
        %reason,
        optimal_sub,
        "Exposure advised"
    );

    Ok(ExposureRecommendation {
        current_exposure: current,
        recommended_exposure: recommended,
        exposure_factor,
        indeterminate,
        reason,
        measured_snr,
        target_snr: config.target_snr,
        saturation_warning: saturation.warning,
        read_noise_dominant: noise_regime.read_noise_dominant,
        optimal_sub_length: optimal_sub,
        noise_regime,
        narrowband,
    })
}

/// Clamp, sending NaN to the lower bound and infinities to the nearest bound.
fn clamp_finite(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        lo
    } else {
        value.clamp(lo, hi)
    }
}
