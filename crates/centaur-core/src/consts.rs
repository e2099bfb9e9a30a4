// Metadata fallbacks applied when a header field is absent.

/// Camera gain in e-/ADU.
pub const DEFAULT_GAIN: f64 = 1.0;

/// Read noise in electrons.
pub const DEFAULT_READ_NOISE: f64 = 10.0;

/// Dark current in e-/s.
pub const DEFAULT_DARK_CURRENT: f64 = 0.0;

/// Sensor saturation level in ADU (16-bit full well).
pub const DEFAULT_SATURATION_LEVEL: f64 = 65_535.0;

/// Photometric zero point.
pub const DEFAULT_ZERO_POINT: f64 = 25.0;

/// Exposure time in seconds.
pub const DEFAULT_EXPOSURE_TIME: f64 = 1.0;

// Sigma clipping.

/// Rejection threshold in standard deviations.
pub const DEFAULT_SIGMA_CLIP: f64 = 3.0;

/// Upper bound on rejection passes.
pub const DEFAULT_SIGMA_CLIP_ITERATIONS: usize = 5;

// Saturation tiers, as fractions of the saturation level.

/// Pixels at or above this fraction are "near saturated".
pub const NEAR_SATURATION_FRACTION: f64 = 0.95;

/// Lower edge of the "high" tier (upper edge is the near-saturation tier).
pub const HIGH_SATURATION_FRACTION: f64 = 0.80;

/// Mean near-saturated region size (pixels) below which saturation is
/// attributed to isolated hot pixels.
pub const HOT_PIXEL_REGION_SIZE: f64 = 10.0;

/// Near-saturated percentage above which severity is HIGH.
pub const HIGH_SEVERITY_PERCENT: f64 = 1.0;

/// Near-saturated percentage above which severity is MODERATE.
pub const MODERATE_SEVERITY_PERCENT: f64 = 0.1;

// Background separation.

/// Pixels at or above this fraction of saturation are masked as hot.
pub const DEFAULT_HOT_PIXEL_FRACTION: f64 = 0.90;

/// Minimum background set size before falling back to a wider set.
pub const DEFAULT_MIN_BACKGROUND_PIXELS: usize = 1000;

// Aperture photometry, in pixels.

pub const DEFAULT_APERTURE_RADIUS: f64 = 15.0;
pub const DEFAULT_ANNULUS_INNER: f64 = 25.0;
pub const DEFAULT_ANNULUS_OUTER: f64 = 40.0;

/// Gaussian FWHM per unit sigma, 2*sqrt(2*ln 2).
pub const FWHM_PER_SIGMA: f64 = 2.354_820_045;

/// Smallest aperture radius used when sizing from detected sources.
pub const MIN_SOURCE_APERTURE_RADIUS: f64 = 3.0;

/// Weight of the physical noise-budget SNR in the blended figure.
pub const PHYSICAL_SNR_WEIGHT: f64 = 0.6;

/// Weight of the simple aperture SNR in the blended figure.
pub const APERTURE_SNR_WEIGHT: f64 = 0.4;

/// Reference object brightness for the "faint" SNR, in background sigmas.
pub const FAINT_OBJECT_SIGMA: f64 = 3.0;

/// Reference object brightness for the "moderate" SNR, in background sigmas.
pub const MODERATE_OBJECT_SIGMA: f64 = 10.0;

// Sky brightness.

/// Arcseconds per radian / 1000: scale = 206.265 * pixel_um / focal_mm.
pub const ARCSEC_PER_RADIAN_MILLI: f64 = 206.265;

// Exposure advice.

pub const DEFAULT_TARGET_SNR: f64 = 10.0;
pub const DEFAULT_MIN_EXPOSURE: f64 = 30.0;
pub const DEFAULT_MAX_EXPOSURE: f64 = 600.0;
pub const DEFAULT_MIN_SUB_LENGTH: f64 = 60.0;
pub const DEFAULT_MAX_SUB_LENGTH: f64 = 300.0;
pub const DEFAULT_SUB_LENGTH: f64 = 180.0;

/// Empirical exposure ratio for SII/OIII relative to the Ha baseline.
pub const DEFAULT_NARROWBAND_FACTOR: f64 = 0.6;

/// Exposure reduction when more than `HIGH_SEVERITY_PERCENT` is near saturation.
pub const SEVERE_SATURATION_REDUCTION: f64 = 0.5;

/// Exposure reduction for moderate saturation.
pub const MODERATE_SATURATION_REDUCTION: f64 = 0.7;

/// Multiplier applied when no usable SNR was measured.
pub const UNMEASURED_SNR_MULTIPLIER: f64 = 4.0;

/// Filter name fragments (upper case) that mark narrowband imaging.
pub const NARROWBAND_FILTERS: [&str; 3] = ["HA", "SII", "OIII"];

// Star metrics.

/// Half-flux radius per unit semi-major axis.
pub const HFR_PER_SEMI_MAJOR: f64 = 1.5;

/// Roundness (b/a) below which stars are considered trailed.
pub const TRAILING_ROUNDNESS: f64 = 0.7;

// Recommendation rules.

/// Difference (s) between current and optimal sub length worth reporting.
pub const SUB_LENGTH_TOLERANCE: f64 = 60.0;

/// Median HFR (px) above which focus is reported as poor.
pub const POOR_FOCUS_HFR: f64 = 4.0;

/// Median HFR (px) above which focus is reported as soft.
pub const SOFT_FOCUS_HFR: f64 = 3.0;

/// Star count below which clouds or focus trouble are suspected.
pub const FEW_STARS_COUNT: usize = 10;

/// Sky brighter than this (mag/arcsec^2) is reported as bright.
pub const BRIGHT_SKY_MAG: f64 = 19.0;

/// Sky darker than this (mag/arcsec^2) is reported as dark.
pub const DARK_SKY_MAG: f64 = 21.0;

/// Version tag stamped on every report.
pub const ANALYZER_VERSION: &str = "1.2";
