//! The four pipeline stages.

mod analyzer;
mod angles;
mod humanizer;
mod writer;

pub use analyzer::AnalyzerStage;
pub use angles::AngleStage;
pub use humanizer::HumanizerStage;
pub use writer::WriterStage;
