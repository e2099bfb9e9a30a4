use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_SIGMA_CLIP, DEFAULT_SIGMA_CLIP_ITERATIONS};
use crate::error::{CentaurError, Result};

/// Parameters for iterative sigma clipping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SigmaClipParams {
    /// Values beyond mean +/- sigma*stddev are rejected (default: 3.0).
    #[serde(default = "default_sigma")]
    pub sigma: f64,
    /// Upper bound on rejection passes (default: 5).
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_sigma() -> f64 {
    DEFAULT_SIGMA_CLIP
}
fn default_max_iterations() -> usize {
    DEFAULT_SIGMA_CLIP_ITERATIONS
}

impl Default for SigmaClipParams {
    fn default() -> Self {
        Self {
            sigma: DEFAULT_SIGMA_CLIP,
            max_iterations: DEFAULT_SIGMA_CLIP_ITERATIONS,
        }
    }
}

impl SigmaClipParams {
    pub fn with_sigma(sigma: f64) -> Self {
        Self {
            sigma,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.sigma > 0.0 && self.sigma.is_finite()) {
            return Err(CentaurError::InvalidConfiguration(format!(
                "sigma-clip threshold must be positive, got {}",
                self.sigma
            )));
        }
        Ok(())
    }
}

/// Outlier-resistant summary of a pixel set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RobustStats {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    /// Values surviving the final clipping pass.
    pub retained: usize,
}

/// Sigma-clipped mean, median and population standard deviation.
///
/// Each pass computes mean and stddev of the surviving values and rejects
/// those more than `sigma` standard deviations from the mean. Stops after
/// `max_iterations` passes or once a pass rejects nothing. Non-finite
/// values are ignored.
pub fn sigma_clipped_stats(values: &[f32], params: &SigmaClipParams) -> Result<RobustStats> {
    let mut kept: Vec<f64> = values
        .iter()
        .filter(|v| v.is_finite())
        .map(|&v| v as f64)
        .collect();
    if kept.is_empty() {
        return Err(CentaurError::InsufficientData(
            "no finite pixel values to summarize".into(),
        ));
    }

    for _ in 0..params.max_iterations {
        let (mean, stddev) = mean_stddev(&kept);
        if stddev <= 0.0 {
            break;
        }
        let limit = params.sigma * stddev;
        let before = kept.len();
        kept.retain(|v| (v - mean).abs() <= limit);
        if kept.len() == before {
            break;
        }
        // A pathological sigma (< 1) can empty the set; keep the last mean.
        if kept.is_empty() {
            return Ok(RobustStats {
                mean,
                median: mean,
                std: 0.0,
                retained: 0,
            });
        }
    }

    let (mean, std) = mean_stddev(&kept);
    let median = median_in_place(&mut kept);
    Ok(RobustStats {
        mean,
        median,
        std,
        retained: kept.len(),
    })
}

pub(crate) fn mean_stddev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Median with even-length averaging. Reorders `values`.
pub(crate) fn median_in_place(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_unstable_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
