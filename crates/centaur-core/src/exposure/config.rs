use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_MAX_EXPOSURE, DEFAULT_MAX_SUB_LENGTH, DEFAULT_MIN_EXPOSURE, DEFAULT_MIN_SUB_LENGTH,
    DEFAULT_NARROWBAND_FACTOR, DEFAULT_SUB_LENGTH, DEFAULT_TARGET_SNR,
};
use crate::error::{CentaurError, Result};

/// Exposure advice settings. Times in seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExposureConfig {
    /// SNR the recommendation aims for (default: 10, tuned for faint detail).
    #[serde(default = "default_target_snr")]
    pub target_snr: f64,
    #[serde(default = "default_min_exposure")]
    pub min_exposure: f64,
    #[serde(default = "default_max_exposure")]
    pub max_exposure: f64,
    /// Bounds for the sky-vs-read-noise optimal sub length.
    #[serde(default = "default_min_sub_length")]
    pub min_sub_length: f64,
    #[serde(default = "default_max_sub_length")]
    pub max_sub_length: f64,
    /// Sub length used when the sky rate is unknown.
    #[serde(default = "default_sub_length")]
    pub default_sub_length: f64,
    /// Empirical SII/OIII exposure ratio relative to the Ha baseline.
    #[serde(default = "default_narrowband_factor")]
    pub narrowband_factor: f64,
}

fn default_target_snr() -> f64 {
    DEFAULT_TARGET_SNR
}
fn default_min_exposure() -> f64 {
    DEFAULT_MIN_EXPOSURE
}
fn default_max_exposure() -> f64 {
    DEFAULT_MAX_EXPOSURE
}
fn default_min_sub_length() -> f64 {
    DEFAULT_MIN_SUB_LENGTH
}
fn default_max_sub_length() -> f64 {
    DEFAULT_MAX_SUB_LENGTH
}
fn default_sub_length() -> f64 {
    DEFAULT_SUB_LENGTH
}
fn default_narrowband_factor() -> f64 {
    DEFAULT_NARROWBAND_FACTOR
}

impl Default for ExposureConfig {
    fn default() -> Self {
        Self {
            target_snr: DEFAULT_TARGET_SNR,
            min_exposure: DEFAULT_MIN_EXPOSURE,
            max_exposure: DEFAULT_MAX_EXPOSURE,
            min_sub_length: DEFAULT_MIN_SUB_LENGTH,
            max_sub_length: DEFAULT_MAX_SUB_LENGTH,
            default_sub_length: DEFAULT_SUB_LENGTH,
            narrowband_factor: DEFAULT_NARROWBAND_FACTOR,
        }
    }
}

impl ExposureConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("target SNR", self.target_snr),
            ("minimum exposure", self.min_exposure),
            ("minimum sub length", self.min_sub_length),
            ("default sub length", self.default_sub_length),
            ("narrowband factor", self.narrowband_factor),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(CentaurError::InvalidConfiguration(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !(self.max_exposure >= self.min_exposure) {
            return Err(CentaurError::InvalidConfiguration(format!(
                "exposure bounds inverted: [{}, {}]",
                self.min_exposure, self.max_exposure
            )));
        }
        if !(self.max_sub_length >= self.min_sub_length) {
            return Err(CentaurError::InvalidConfiguration(format!(
                "sub length bounds inverted: [{}, {}]",
                self.min_sub_length, self.max_sub_length
            )));
        }
        Ok(())
    }
}
