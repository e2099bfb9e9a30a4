pub mod background;
pub mod consts;
pub mod detection;
pub mod error;
pub mod exposure;
pub mod frame;
pub mod io;
pub mod pipeline;
pub mod profile;
pub mod report;
pub mod saturation;
pub mod sky;
pub mod snr;
pub mod stats;
