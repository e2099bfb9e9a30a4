use ndarray::parallel::prelude::*;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{
    HIGH_SATURATION_FRACTION, HIGH_SEVERITY_PERCENT, HOT_PIXEL_REGION_SIZE,
    MODERATE_SEVERITY_PERCENT, NEAR_SATURATION_FRACTION,
};
use crate::detection::components::{label_regions, mean_region_area};
use crate::error::{CentaurError, Result};
use crate::stats::finite_min_max;

/// How badly a frame is saturated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaturationSeverity {
    None,
    Minor,
    Moderate,
    High,
}

impl std::fmt::Display for SaturationSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::Minor => write!(f, "MINOR"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaturationReport {
    pub max_value: f64,
    pub saturation_level: f64,
    /// Brightest pixel as a percentage of the saturation level.
    pub max_percentage: f64,
    /// Pixels >= 95% of saturation.
    pub near_saturated_pixels: usize,
    pub near_saturated_fraction: f64,
    /// Pixels in [80%, 95%) of saturation.
    pub high_saturation_pixels: usize,
    pub high_saturation_fraction: f64,
    /// Number of 4-connected near-saturated regions.
    pub saturated_regions: usize,
    pub severity: SaturationSeverity,
    pub likely_hot_pixels: bool,
    pub warning: bool,
    pub total_pixels: usize,
}

impl SaturationReport {
    pub fn near_saturated_percent(&self) -> f64 {
        self.near_saturated_fraction * 100.0
    }

    pub fn high_saturation_percent(&self) -> f64 {
        self.high_saturation_fraction * 100.0
    }
}

/// Classify saturation against `saturation_level` (ADU, > 0).
///
/// Near-saturated pixels are grouped into 4-connected regions; a small mean
/// region size means isolated hot pixels rather than saturated objects.
pub fn classify_saturation(data: &Array2<f32>, saturation_level: f64) -> Result<SaturationReport> {
    if !(saturation_level > 0.0 && saturation_level.is_finite()) {
        return Err(CentaurError::InvalidConfiguration(format!(
            "saturation level must be positive, got {saturation_level}"
        )));
    }
    let Some((_, max_value)) = finite_min_max(data) else {
        return Err(CentaurError::InsufficientData(
            "pixel array has no finite values".into(),
        ));
    };

    let total_pixels = data.len();
    let near_cut = NEAR_SATURATION_FRACTION * saturation_level;
    let high_cut = HIGH_SATURATION_FRACTION * saturation_level;

    let near_mask = data.mapv(|v| v as f64 >= near_cut);
    let near_saturated_pixels = near_mask.par_iter().filter(|&&m| m).count();
    let high_saturation_pixels = data
        .par_iter()
        .filter(|&&v| {
            let v = v as f64;
            v >= high_cut && v < near_cut
        })
        .count();

    let near_saturated_fraction = near_saturated_pixels as f64 / total_pixels as f64;
    let high_saturation_fraction = high_saturation_pixels as f64 / total_pixels as f64;

    let regions = if near_saturated_pixels > 0 {
        label_regions(&near_mask)
    } else {
        Vec::new()
    };
    let likely_hot_pixels =
        mean_region_area(&regions).is_some_and(|mean| mean < HOT_PIXEL_REGION_SIZE);

    let near_percent = near_saturated_fraction * 100.0;
    let (severity, warning) = if near_percent > HIGH_SEVERITY_PERCENT {
        (SaturationSeverity::High, true)
    } else if near_percent > MODERATE_SEVERITY_PERCENT {
        (SaturationSeverity::Moderate, true)
    } else if max_value >= saturation_level {
        (SaturationSeverity::Minor, !likely_hot_pixels)
    } else {
        (SaturationSeverity::None, false)
    };

    debug!(
        max_value,
        near_saturated_pixels,
        regions = regions.len(),
        %severity,
        "Saturation classified"
    );

    Ok(SaturationReport {
        max_value,
        saturation_level,
        max_percentage: max_value / saturation_level * 100.0,
        near_saturated_pixels,
        near_saturated_fraction,
        high_saturation_pixels,
        high_saturation_fraction,
        saturated_regions: regions.len(),
        severity,
        likely_hot_pixels,
        warning,
        total_pixels,
    })
}
