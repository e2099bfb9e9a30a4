use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::background::BackgroundModel;
use crate::consts::{
    APERTURE_SNR_WEIGHT, FAINT_OBJECT_SIGMA, MODERATE_OBJECT_SIGMA, PHYSICAL_SNR_WEIGHT,
};

use super::aperture::{measure_aperture, ApertureGeometry, ApertureMeasurement};

/// Sensor noise sources for the physical noise budget.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseParams {
    /// Read noise in electrons.
    pub read_noise: f64,
    /// Dark current in e-/s.
    pub dark_current: f64,
    /// Exposure time in seconds.
    pub exposure_time: f64,
}

/// Variance contributions summed in quadrature by the physical method.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseBudget {
    pub source_variance: f64,
    pub sky_variance: f64,
    pub read_variance: f64,
    pub dark_variance: f64,
}

impl NoiseBudget {
    pub fn total_noise(&self) -> f64 {
        (self.source_variance + self.sky_variance + self.read_variance + self.dark_variance).sqrt()
    }
}

/// Reference SNRs implied by background statistics alone.
///
/// `snr_faint_object` and `snr_moderate_object` describe hypothetical 3σ
/// and 10σ objects; they are reference levels, not measurements.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackgroundSnr {
    pub snr_background: f64,
    pub snr_faint_object: f64,
    pub snr_moderate_object: f64,
    pub faint_signal_level: f64,
    pub moderate_signal_level: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnrResult {
    /// Aperture centre (column, row), when one was available.
    pub position: Option<(f64, f64)>,
    pub geometry: Option<ApertureGeometry>,
    pub measurement: Option<ApertureMeasurement>,
    pub noise_budget: Option<NoiseBudget>,
    /// Simple aperture/annulus SNR.
    pub aperture_snr: Option<f64>,
    /// Physical noise-budget SNR.
    pub physical_snr: Option<f64>,
    /// 0.6 * physical + 0.4 * aperture, when both exist.
    pub blended_snr: Option<f64>,
    pub background: BackgroundSnr,
    /// Why the aperture methods produced no figures despite a position.
    pub aperture_failure: Option<String>,
}

impl SnrResult {
    /// SNR driving exposure advice: the blended aperture figure if present,
    /// otherwise the 10σ background reference.
    pub fn measured(&self) -> f64 {
        self.blended_snr
            .unwrap_or(self.background.snr_moderate_object)
    }
}

/// SNR references from background mean and std; zero when std is zero.
pub fn background_snr(background: &BackgroundModel) -> BackgroundSnr {
    let (mean, std) = (background.mean, background.std);
    let ratio = |signal: f64| if std > 0.0 { signal / std } else { 0.0 };
    let faint_signal_level = mean + FAINT_OBJECT_SIGMA * std;
    let moderate_signal_level = mean + MODERATE_OBJECT_SIGMA * std;
    BackgroundSnr {
        snr_background: ratio(mean),
        snr_faint_object: ratio(faint_signal_level - mean),
        snr_moderate_object: ratio(moderate_signal_level - mean),
        faint_signal_level,
        moderate_signal_level,
    }
}

/// Net flux over the aperture/annulus noise estimate.
pub fn aperture_snr(m: &ApertureMeasurement) -> f64 {
    let net = m.net_flux();
    let noise = (net.abs() + m.aperture_area as f64 * m.annulus_mean.abs()).sqrt();
    if noise > 0.0 {
        net / noise
    } else {
        0.0
    }
}

/// Noise budget of source, sky, read and dark terms over the aperture.
pub fn noise_budget(m: &ApertureMeasurement, noise: &NoiseParams) -> NoiseBudget {
    let area = m.aperture_area as f64;
    NoiseBudget {
        source_variance: m.net_flux().abs(),
        sky_variance: m.annulus_mean.abs() * area,
        read_variance: noise.read_noise.powi(2) * area,
        dark_variance: noise.dark_current * noise.exposure_time * area,
    }
}

pub fn physical_snr(m: &ApertureMeasurement, budget: &NoiseBudget) -> f64 {
    let total = budget.total_noise();
    if total > 0.0 {
        m.net_flux() / total
    } else {
        0.0
    }
}

pub fn blend_snr(physical: f64, aperture: f64) -> f64 {
    PHYSICAL_SNR_WEIGHT * physical + APERTURE_SNR_WEIGHT * aperture
}

/// Compute every SNR figure the inputs allow.
///
/// Background references are always produced. With a position, both
/// aperture methods run; if the aperture is unusable (off-frame, empty
/// annulus) those figures stay `None` and the reason is recorded.
pub fn estimate_snr(
    data: &Array2<f32>,
    position: Option<(f64, f64)>,
    geometry: &ApertureGeometry,
    noise: &NoiseParams,
    background: &BackgroundModel,
) -> SnrResult {
    let mut result = SnrResult {
        position,
        geometry: None,
        measurement: None,
        noise_budget: None,
        aperture_snr: None,
        physical_snr: None,
        blended_snr: None,
        background: background_snr(background),
        aperture_failure: None,
    };

    let Some((x, y)) = position else {
        debug!("No aperture position, reporting background-implied SNR only");
        return result;
    };

    match measure_aperture(data, x, y, geometry) {
        Ok(m) => {
            let budget = noise_budget(&m, noise);
            let simple = aperture_snr(&m);
            let physical = physical_snr(&m, &budget);
            let blended = blend_snr(physical, simple);
            debug!(
                x,
                y,
                net_flux = m.net_flux(),
                aperture = simple,
                physical,
                blended,
                "Aperture SNR measured"
            );
            result.geometry = Some(*geometry);
            result.measurement = Some(m);
            result.noise_budget = Some(budget);
            result.aperture_snr = Some(simple);
            result.physical_snr = Some(physical);
            result.blended_snr = Some(blended);
        }
        Err(e) => {
            warn!(x, y, error = %e, "Aperture SNR unavailable");
            result.aperture_failure = Some(e.to_string());
        }
    }
    result
}
