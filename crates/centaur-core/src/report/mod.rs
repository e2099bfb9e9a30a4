mod recommendations;
mod types;

pub use recommendations::{build_quality_notes, build_recommendations};
pub use types::{AnalysisOutcome, AnalysisReport, FrameInfo, ImageStats};
