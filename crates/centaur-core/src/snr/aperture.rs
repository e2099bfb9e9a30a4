use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_ANNULUS_INNER, DEFAULT_ANNULUS_OUTER, DEFAULT_APERTURE_RADIUS, FWHM_PER_SIGMA,
    MIN_SOURCE_APERTURE_RADIUS,
};
use crate::error::{CentaurError, Result};
use crate::frame::SourceRecord;

/// How aperture radii are chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApertureSizing {
    /// Use the configured radii as-is.
    #[default]
    Fixed,
    /// Scale radii to the FWHM of the measured source.
    FromSources,
}

impl std::fmt::Display for ApertureSizing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed => write!(f, "Fixed"),
            Self::FromSources => write!(f, "From Sources"),
        }
    }
}

/// Aperture photometry settings, radii in pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApertureConfig {
    #[serde(default = "default_radius")]
    pub radius: f64,
    #[serde(default = "default_annulus_inner")]
    pub annulus_inner: f64,
    #[serde(default = "default_annulus_outer")]
    pub annulus_outer: f64,
    #[serde(default)]
    pub sizing: ApertureSizing,
}

fn default_radius() -> f64 {
    DEFAULT_APERTURE_RADIUS
}
fn default_annulus_inner() -> f64 {
    DEFAULT_ANNULUS_INNER
}
fn default_annulus_outer() -> f64 {
    DEFAULT_ANNULUS_OUTER
}

impl Default for ApertureConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_APERTURE_RADIUS,
            annulus_inner: DEFAULT_ANNULUS_INNER,
            annulus_outer: DEFAULT_ANNULUS_OUTER,
            sizing: ApertureSizing::Fixed,
        }
    }
}

impl ApertureConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("aperture radius", self.radius),
            ("annulus inner radius", self.annulus_inner),
            ("annulus outer radius", self.annulus_outer),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(CentaurError::InvalidConfiguration(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.annulus_inner >= self.annulus_outer {
            return Err(CentaurError::InvalidConfiguration(format!(
                "annulus inner radius {} must be smaller than outer radius {}",
                self.annulus_inner, self.annulus_outer
            )));
        }
        Ok(())
    }

    /// Concrete radii for one measurement.
    ///
    /// With `FromSources` sizing and a source that has a usable semi-major
    /// axis, radii are 1.5, 3 and 5 FWHM (FWHM taken as 2.355 * a).
    pub fn geometry_for(&self, source: Option<&SourceRecord>) -> ApertureGeometry {
        let fixed = ApertureGeometry {
            radius: self.radius,
            annulus_inner: self.annulus_inner,
            annulus_outer: self.annulus_outer,
        };
        if self.sizing == ApertureSizing::Fixed {
            return fixed;
        }
        let Some(a) = source
            .map(|s| s.semi_major)
            .filter(|a| *a > 0.0 && a.is_finite())
        else {
            return fixed;
        };

        let fwhm = FWHM_PER_SIGMA * a;
        let radius = (1.5 * fwhm).max(MIN_SOURCE_APERTURE_RADIUS);
        let annulus_inner = (3.0 * fwhm).max(radius);
        let annulus_outer = (5.0 * fwhm).max(annulus_inner + radius);
        ApertureGeometry {
            radius,
            annulus_inner,
            annulus_outer,
        }
    }
}

/// Radii used for one aperture measurement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApertureGeometry {
    pub radius: f64,
    pub annulus_inner: f64,
    pub annulus_outer: f64,
}

/// Raw sums from a circular aperture and its sky annulus.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApertureMeasurement {
    pub aperture_sum: f64,
    /// Pixels inside the aperture.
    pub aperture_area: usize,
    /// Mean pixel value in the annulus (local sky per pixel).
    pub annulus_mean: f64,
    pub annulus_area: usize,
}

impl ApertureMeasurement {
    /// Aperture sum minus the sky expected over the aperture area.
    pub fn net_flux(&self) -> f64 {
        self.aperture_sum - self.annulus_mean * self.aperture_area as f64
    }
}

/// Sum the aperture and average the annulus centred at `(x, y)`
/// (column, row). Pixels count when their centre falls inside the ring or
/// disk; non-finite pixels are skipped.
pub fn measure_aperture(
    data: &Array2<f32>,
    x: f64,
    y: f64,
    geometry: &ApertureGeometry,
) -> Result<ApertureMeasurement> {
    if !(x.is_finite() && y.is_finite()) {
        return Err(CentaurError::InvalidPosition { x, y });
    }
    let (h, w) = data.dim();
    let reach = geometry.radius.max(geometry.annulus_outer);

    let row_lo = (y - reach).floor().max(0.0) as usize;
    let col_lo = (x - reach).floor().max(0.0) as usize;
    let row_hi = ((y + reach).ceil().max(-1.0) as i64).min(h as i64 - 1);
    let col_hi = ((x + reach).ceil().max(-1.0) as i64).min(w as i64 - 1);

    let r_ap_sq = geometry.radius * geometry.radius;
    let r_in_sq = geometry.annulus_inner * geometry.annulus_inner;
    let r_out_sq = geometry.annulus_outer * geometry.annulus_outer;

    let mut aperture_sum = 0.0_f64;
    let mut aperture_area = 0usize;
    let mut annulus_sum = 0.0_f64;
    let mut annulus_area = 0usize;

    if row_hi >= 0 && col_hi >= 0 {
        for row in row_lo..=row_hi as usize {
            for col in col_lo..=col_hi as usize {
                let v = data[[row, col]];
                if !v.is_finite() {
                    continue;
                }
                let dx = col as f64 - x;
                let dy = row as f64 - y;
                let d_sq = dx * dx + dy * dy;
                if d_sq <= r_ap_sq {
                    aperture_sum += v as f64;
                    aperture_area += 1;
                }
                if d_sq >= r_in_sq && d_sq <= r_out_sq {
                    annulus_sum += v as f64;
                    annulus_area += 1;
                }
            }
        }
    }

    if aperture_area == 0 || annulus_area == 0 {
        return Err(CentaurError::InvalidPosition { x, y });
    }

    Ok(ApertureMeasurement {
        aperture_sum,
        aperture_area,
        annulus_mean: annulus_sum / annulus_area as f64,
        annulus_area,
    })
}
