use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_DARK_CURRENT, DEFAULT_EXPOSURE_TIME, DEFAULT_GAIN, DEFAULT_READ_NOISE,
    DEFAULT_SATURATION_LEVEL, DEFAULT_ZERO_POINT,
};
use crate::error::{CentaurError, Result};

/// A single-exposure grayscale frame in raw ADU.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
    /// File name the frame was decoded from
    pub filename: String,
    pub metadata: FrameMetadata,
}

impl Frame {
    pub fn new(data: Array2<f32>, filename: impl Into<String>, metadata: FrameMetadata) -> Self {
        Self {
            data,
            filename: filename.into(),
            metadata,
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Camera and telescope metadata recognized from the frame header.
///
/// Every field is optional; the accessors resolve absent values to fallbacks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameMetadata {
    /// Exposure time in seconds (`EXPTIME`).
    pub exposure_time: Option<f64>,
    /// Gain in e-/ADU (`GAIN`).
    pub gain: Option<f64>,
    /// Read noise in electrons (`RDNOISE`).
    pub read_noise: Option<f64>,
    /// Dark current in e-/s (`DARKCURR`).
    pub dark_current: Option<f64>,
    /// Saturation level in ADU (`SATURATE`).
    pub saturation_level: Option<f64>,
    /// Plate scale in arcsec/pixel (`PIXSCALE`).
    pub pixel_scale: Option<f64>,
    /// Focal length in mm (`FOCALLEN`).
    pub focal_length_mm: Option<f64>,
    /// Pixel size in microns (`XPIXSZ`).
    pub pixel_size_um: Option<f64>,
    /// Photometric zero point (`MAGZPT`).
    pub zero_point: Option<f64>,
    /// Filter name (`FILTER`).
    pub filter: Option<String>,
    /// Target name (`OBJECT`).
    pub target: Option<String>,
}

impl FrameMetadata {
    pub fn gain(&self) -> f64 {
        positive_or(self.gain, DEFAULT_GAIN)
    }

    pub fn read_noise(&self) -> f64 {
        non_negative_or(self.read_noise, DEFAULT_READ_NOISE)
    }

    pub fn dark_current(&self) -> f64 {
        non_negative_or(self.dark_current, DEFAULT_DARK_CURRENT)
    }

    /// Saturation level, defaulting when absent.
    ///
    /// A header that states a non-positive level is a configuration error,
    /// not a missing value.
    pub fn saturation_level(&self) -> Result<f64> {
        match self.saturation_level {
            None => Ok(DEFAULT_SATURATION_LEVEL),
            Some(level) if level > 0.0 && level.is_finite() => Ok(level),
            Some(level) => Err(CentaurError::InvalidConfiguration(format!(
                "saturation level must be positive, got {level}"
            ))),
        }
    }

    pub fn zero_point(&self) -> f64 {
        self.zero_point
            .filter(|z| z.is_finite())
            .unwrap_or(DEFAULT_ZERO_POINT)
    }

    /// Exposure time in seconds.
    ///
    /// In strict mode an absent value is an error; otherwise it falls back
    /// to one second. Negative values are clamped to zero.
    pub fn exposure_time(&self, strict: bool) -> Result<f64> {
        match self.exposure_time {
            Some(t) if t.is_finite() => Ok(t.max(0.0)),
            _ if strict => Err(CentaurError::MissingMetadata("EXPTIME")),
            _ => Ok(DEFAULT_EXPOSURE_TIME),
        }
    }

    /// Filter name in upper case, if any.
    pub fn filter_upper(&self) -> Option<String> {
        self.filter
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_uppercase)
    }
}

fn positive_or(value: Option<f64>, fallback: f64) -> f64 {
    value.filter(|v| *v > 0.0 && v.is_finite()).unwrap_or(fallback)
}

fn non_negative_or(value: Option<f64>, fallback: f64) -> f64 {
    value.filter(|v| *v >= 0.0 && v.is_finite()).unwrap_or(fallback)
}

/// One detected source as reported by an external source extractor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Centroid column, if the extractor reports one.
    #[serde(default)]
    pub x: Option<f64>,
    /// Centroid row, if the extractor reports one.
    #[serde(default)]
    pub y: Option<f64>,
    pub flux: f64,
    /// Semi-major axis in pixels.
    pub semi_major: f64,
    /// Semi-minor axis in pixels.
    pub semi_minor: f64,
}

/// Everything the source-extraction collaborator hands to the engine.
#[derive(Clone, Debug, Default)]
pub struct SourceCatalog {
    /// Pixels belonging to detected sources; same shape as the frame.
    pub mask: Option<Array2<bool>>,
    pub sources: Vec<SourceRecord>,
}

impl SourceCatalog {
    pub fn new(mask: Option<Array2<bool>>, sources: Vec<SourceRecord>) -> Self {
        Self { mask, sources }
    }

    /// The record with the largest finite flux.
    pub fn brightest(&self) -> Option<&SourceRecord> {
        self.sources
            .iter()
            .filter(|s| s.flux.is_finite())
            .max_by(|a, b| a.flux.total_cmp(&b.flux))
    }
}
