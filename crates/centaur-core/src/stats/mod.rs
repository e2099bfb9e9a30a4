pub mod sigma_clip;

use ndarray::Array2;
use tracing::debug;

use crate::error::{CentaurError, Result};

pub use sigma_clip::{sigma_clipped_stats, RobustStats, SigmaClipParams};

/// Sigma-clipped statistics of a pixel array, skipping masked pixels.
///
/// `exclude` marks pixels to leave out. When it excludes everything the
/// whole array is used instead. An empty array is an error.
pub fn image_statistics(
    data: &Array2<f32>,
    exclude: Option<&Array2<bool>>,
    params: &SigmaClipParams,
) -> Result<RobustStats> {
    if data.is_empty() {
        return Err(CentaurError::InsufficientData("pixel array is empty".into()));
    }

    let Some(mask) = exclude else {
        return sigma_clipped_stats(&collect_values(data), params);
    };

    if mask.dim() != data.dim() {
        return Err(CentaurError::ShapeMismatch {
            expected: data.dim(),
            found: mask.dim(),
        });
    }

    let values = select_unmasked(data, mask);
    if values.is_empty() {
        debug!("Exclusion mask covers every pixel, using the full array");
        return sigma_clipped_stats(&collect_values(data), params);
    }
    sigma_clipped_stats(&values, params)
}

/// Finite pixels where `mask` is false, in row-major order.
pub fn select_unmasked(data: &Array2<f32>, mask: &Array2<bool>) -> Vec<f32> {
    data.iter()
        .zip(mask.iter())
        .filter(|(v, &masked)| !masked && v.is_finite())
        .map(|(&v, _)| v)
        .collect()
}

/// Every finite pixel, in row-major order.
pub fn finite_values(data: &Array2<f32>) -> Vec<f32> {
    data.iter().copied().filter(|v| v.is_finite()).collect()
}

fn collect_values(data: &Array2<f32>) -> Vec<f32> {
    data.iter().copied().collect()
}

/// Minimum and maximum over finite pixels, or `None` when there are none.
pub fn finite_min_max(data: &Array2<f32>) -> Option<(f64, f64)> {
    data.iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| {
            let v = v as f64;
            Some(match acc {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            })
        })
}
