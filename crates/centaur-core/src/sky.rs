use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::ARCSEC_PER_RADIAN_MILLI;
use crate::frame::FrameMetadata;

/// Where the plate scale came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelScaleSource {
    /// Explicit `PIXSCALE` header value.
    Header,
    /// Focal length and pixel size.
    Geometry,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkyBrightness {
    pub adu_per_pixel: f64,
    pub electrons_per_pixel: f64,
    pub electrons_per_second_per_pixel: f64,
    /// `None` when the plate scale is unknown or the sky rate is not positive.
    pub mag_per_arcsec2: Option<f64>,
    pub pixel_scale: Option<f64>,
    pub pixel_scale_source: Option<PixelScaleSource>,
    pub exposure_time_used: f64,
    pub gain: f64,
    pub zero_point: f64,
}

/// Plate scale in arcsec/pixel.
///
/// Prefers an explicit positive `PIXSCALE`, then `206.265 * XPIXSZ / FOCALLEN`.
/// `focal_length_fallback` stands in for a missing `FOCALLEN`.
pub fn resolve_pixel_scale(
    metadata: &FrameMetadata,
    focal_length_fallback: Option<f64>,
) -> Option<(f64, PixelScaleSource)> {
    if let Some(scale) = metadata.pixel_scale.filter(|s| *s > 0.0 && s.is_finite()) {
        return Some((scale, PixelScaleSource::Header));
    }
    let focal = metadata.focal_length_mm.or(focal_length_fallback)?;
    let pixel = metadata.pixel_size_um?;
    if focal > 0.0 && pixel > 0.0 && focal.is_finite() && pixel.is_finite() {
        Some((
            ARCSEC_PER_RADIAN_MILLI * pixel / focal,
            PixelScaleSource::Geometry,
        ))
    } else {
        None
    }
}

/// Surface brightness in mag/arcsec^2, or `None` for a non-positive rate
/// or scale.
pub fn surface_brightness(zero_point: f64, sky_rate: f64, pixel_scale: f64) -> Option<f64> {
    if sky_rate > 0.0 && pixel_scale > 0.0 {
        Some(zero_point - 2.5 * (sky_rate / (pixel_scale * pixel_scale)).log10())
    } else {
        None
    }
}

/// Convert a background level in ADU into sky brightness figures.
pub fn sky_brightness(
    background_adu: f64,
    metadata: &FrameMetadata,
    exposure_time: f64,
    focal_length_fallback: Option<f64>,
) -> SkyBrightness {
    let gain = metadata.gain();
    let zero_point = metadata.zero_point();
    let electrons = background_adu * gain;
    let rate = if exposure_time > 0.0 {
        electrons / exposure_time
    } else {
        electrons
    };

    let scale = resolve_pixel_scale(metadata, focal_length_fallback);
    let mag = scale.and_then(|(s, _)| surface_brightness(zero_point, rate, s));
    debug!(electrons, rate, pixel_scale = ?scale.map(|(s, _)| s), mag = ?mag, "Sky brightness");

    SkyBrightness {
        adu_per_pixel: background_adu,
        electrons_per_pixel: electrons,
        electrons_per_second_per_pixel: rate,
        mag_per_arcsec2: mag,
        pixel_scale: scale.map(|(s, _)| s),
        pixel_scale_source: scale.map(|(_, src)| src),
        exposure_time_used: exposure_time,
        gain,
        zero_point,
    }
}
