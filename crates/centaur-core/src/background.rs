use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::consts::{DEFAULT_HOT_PIXEL_FRACTION, DEFAULT_MIN_BACKGROUND_PIXELS};
use crate::detection::components::label_regions;
use crate::error::{CentaurError, Result};
use crate::stats::{finite_values, select_unmasked, sigma_clipped_stats, SigmaClipParams};

/// Background separation settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackgroundConfig {
    /// Background set size below which the next fallback is tried.
    #[serde(default = "default_min_background_pixels")]
    pub min_background_pixels: usize,
    /// Pixels at or above this fraction of saturation are masked as hot.
    #[serde(default = "default_hot_pixel_fraction")]
    pub hot_pixel_fraction: f64,
}

fn default_min_background_pixels() -> usize {
    DEFAULT_MIN_BACKGROUND_PIXELS
}
fn default_hot_pixel_fraction() -> f64 {
    DEFAULT_HOT_PIXEL_FRACTION
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            min_background_pixels: DEFAULT_MIN_BACKGROUND_PIXELS,
            hot_pixel_fraction: DEFAULT_HOT_PIXEL_FRACTION,
        }
    }
}

impl BackgroundConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.hot_pixel_fraction > 0.0 && self.hot_pixel_fraction <= 1.0) {
            return Err(CentaurError::InvalidConfiguration(format!(
                "hot pixel fraction must be in (0, 1], got {}",
                self.hot_pixel_fraction
            )));
        }
        Ok(())
    }
}

/// Which pixel set the background estimate was computed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskStage {
    /// Sources and hot pixels excluded.
    SourcesAndHotPixels,
    /// Only hot pixels excluded.
    HotPixelsOnly,
    /// Every pixel used.
    Unmasked,
}

impl std::fmt::Display for MaskStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourcesAndHotPixels => write!(f, "sources + hot pixels masked"),
            Self::HotPixelsOnly => write!(f, "hot pixels masked"),
            Self::Unmasked => write!(f, "unmasked"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackgroundModel {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    /// Finite pixels handed to sigma clipping.
    pub pixel_count: usize,
    /// Detected source regions excluded from the estimate.
    pub source_regions: usize,
    pub hot_pixels: usize,
    pub mask_stage: MaskStage,
}

/// Estimate sky background from pixels that are neither hot nor sources.
///
/// Falls back to the hot-pixel-masked set, then to every pixel, whenever
/// the current set holds fewer than `min_background_pixels` finite values.
pub fn separate_background(
    data: &Array2<f32>,
    saturation_level: f64,
    source_mask: Option<&Array2<bool>>,
    config: &BackgroundConfig,
    clip: &SigmaClipParams,
) -> Result<BackgroundModel> {
    if data.is_empty() {
        return Err(CentaurError::InsufficientData("pixel array is empty".into()));
    }
    if !(saturation_level > 0.0 && saturation_level.is_finite()) {
        return Err(CentaurError::InvalidConfiguration(format!(
            "saturation level must be positive, got {saturation_level}"
        )));
    }
    if let Some(mask) = source_mask {
        if mask.dim() != data.dim() {
            return Err(CentaurError::ShapeMismatch {
                expected: data.dim(),
                found: mask.dim(),
            });
        }
    }

    let hot_cut = config.hot_pixel_fraction * saturation_level;
    let hot_mask = data.mapv(|v| v as f64 >= hot_cut);
    let hot_pixels = hot_mask.iter().filter(|&&m| m).count();

    let source_regions = source_mask.map_or(0, |m| label_regions(m).len());

    let (mut stage, mut values) = match source_mask {
        Some(sources) => {
            let mut combined = hot_mask.clone();
            Zip::from(&mut combined)
                .and(sources)
                .for_each(|c, &s| *c = *c || s);
            (
                MaskStage::SourcesAndHotPixels,
                select_unmasked(data, &combined),
            )
        }
        None => (MaskStage::HotPixelsOnly, select_unmasked(data, &hot_mask)),
    };

    if values.len() < config.min_background_pixels && stage == MaskStage::SourcesAndHotPixels {
        debug!(
            count = values.len(),
            "Too few background pixels with sources masked, masking hot pixels only"
        );
        stage = MaskStage::HotPixelsOnly;
        values = select_unmasked(data, &hot_mask);
    }
    if values.len() < config.min_background_pixels {
        debug!(
            count = values.len(),
            "Too few background pixels, using the whole frame"
        );
        stage = MaskStage::Unmasked;
        values = finite_values(data);
    }

    let stats = sigma_clipped_stats(&values, clip)?;

    info!(
        mean = stats.mean,
        median = stats.median,
        std = stats.std,
        pixels = values.len(),
        %stage,
        "Background estimated"
    );

    Ok(BackgroundModel {
        mean: stats.mean,
        median: stats.median,
        std: stats.std,
        pixel_count: values.len(),
        source_regions,
        hot_pixels,
        mask_stage: stage,
    })
}
