use serde::{Deserialize, Serialize};

use crate::consts::{HFR_PER_SEMI_MAJOR, TRAILING_ROUNDNESS};
use crate::frame::SourceRecord;
use crate::stats::sigma_clip::{mean_stddev, median_in_place};

/// Focus and tracking indicators derived from detected sources.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StarMetrics {
    pub star_count: usize,
    /// Median half-flux radius of the bright subset, in pixels.
    pub hfr: f64,
    pub hfr_std: f64,
    /// Mean minor/major axis ratio of the bright subset (1 = round).
    pub roundness: f64,
    pub has_trailing: bool,
}

/// Summarize source records, or `None` when there are none.
///
/// Only bright sources are measured: those above the median flux, narrowed
/// to the top decile of that subset when more than ten remain. If nothing
/// clears the median (all fluxes equal) every source is used.
pub fn star_metrics(sources: &[SourceRecord]) -> Option<StarMetrics> {
    let usable: Vec<&SourceRecord> = sources
        .iter()
        .filter(|s| s.flux.is_finite() && s.semi_major.is_finite() && s.semi_major > 0.0)
        .collect();
    if usable.is_empty() {
        return None;
    }

    let mut bright = above_percentile(&usable, 50.0);
    if bright.len() > 10 {
        bright = above_percentile(&bright, 90.0);
    }
    if bright.is_empty() {
        bright = usable.clone();
    }

    let mut hfr_values: Vec<f64> = bright
        .iter()
        .map(|s| HFR_PER_SEMI_MAJOR * s.semi_major)
        .collect();
    let (_, hfr_std) = mean_stddev(&hfr_values);
    let hfr = median_in_place(&mut hfr_values);

    let roundness = bright
        .iter()
        .map(|s| (s.semi_minor / s.semi_major).clamp(0.0, 1.0))
        .sum::<f64>()
        / bright.len() as f64;

    Some(StarMetrics {
        star_count: sources.len(),
        hfr,
        hfr_std,
        roundness,
        has_trailing: roundness < TRAILING_ROUNDNESS,
    })
}

fn above_percentile<'a>(sources: &[&'a SourceRecord], q: f64) -> Vec<&'a SourceRecord> {
    let mut fluxes: Vec<f64> = sources.iter().map(|s| s.flux).collect();
    fluxes.sort_unstable_by(|a, b| a.total_cmp(b));
    let cut = percentile(&fluxes, q);
    sources.iter().copied().filter(|s| s.flux > cut).collect()
}

/// Linear-interpolated percentile of sorted values.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
