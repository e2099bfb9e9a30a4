pub mod advisor;
pub mod config;

pub use advisor::{
    advise_exposure, is_narrowband, optimal_sub_length, ExposureReason, ExposureRecommendation,
    NarrowbandAdjustment, NoiseRegime,
};
pub use config::ExposureConfig;
