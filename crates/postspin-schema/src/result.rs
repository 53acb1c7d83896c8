//! The record returned for every run, successful or not.

use serde::{Deserialize, Serialize};

use crate::analysis::Analysis;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalPost {
    pub content: String,
    pub hashtags: Vec<String>,
    pub authenticity_score: f64,
    pub originality_score: f64,
    pub predicted_engagement: f64,
}

/// Outcome of one spin run.
///
/// On failure `final_post` is `None`, both checks are `false` and `error` carries the
/// reason. Fields produced before the failure (analysis, angle count, selected angle)
/// are kept so callers can see how far the run got.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinResult {
    pub success: bool,
    pub analysis: Option<Analysis>,
    pub angles_generated: usize,
    pub selected_angle: Option<String>,
    pub final_post: Option<FinalPost>,
    pub passed_ai_check: bool,
    pub passed_plagiarism_check: bool,
    pub iterations_count: u32,
    pub error: Option<String>,
}

impl SpinResult {
    /// A failed result with nothing produced yet.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            analysis: None,
            angles_generated: 0,
            selected_angle: None,
            final_post: None,
            passed_ai_check: false,
            passed_plagiarism_check: false,
            iterations_count: 0,
            error: Some(error.into()),
        }
    }

    /// Both quality gates passed.
    #[must_use]
    pub fn passed_all_checks(&self) -> bool {
        self.passed_ai_check && self.passed_plagiarism_check
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_result_serializes_nulls() {
        let value = serde_json::to_value(SpinResult::failed("boom")).unwrap();
        assert_eq!(value["success"], false);
        assert!(value["analysis"].is_null());
        assert!(value["final_post"].is_null());
        assert!(value["selected_angle"].is_null());
        assert_eq!(value["iterations_count"], 0);
        assert_eq!(value["error"], "boom");
    }
}
