pub mod aperture;
pub mod estimator;

pub use aperture::{
    measure_aperture, ApertureConfig, ApertureGeometry, ApertureMeasurement, ApertureSizing,
};
pub use estimator::{estimate_snr, BackgroundSnr, NoiseBudget, NoiseParams, SnrResult};
