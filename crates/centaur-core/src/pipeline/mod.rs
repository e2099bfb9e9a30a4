pub mod config;
mod orchestrator;
mod types;

pub use config::AnalysisConfig;
pub use orchestrator::{analyze_frame, analyze_frame_reported, analyze_outcome};
pub use types::{AnalysisInputs, AnalysisStage, ProgressReporter};
