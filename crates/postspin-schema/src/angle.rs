//! Angle generator output: alternative framings of the same universal theme.

use serde::{Deserialize, Serialize};

use crate::validation::{
    StageOutput, check_non_empty, check_score, deserialize_index, into_result,
};

/// Fewest angles a generator must offer.
pub const MIN_ANGLES: usize = 3;
/// Most angles a generator may offer.
pub const MAX_ANGLES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Angle {
    pub angle_name: String,
    pub angle_description: String,
    /// How this angle departs from the source post.
    pub differentiation: String,
    pub hook_idea: String,
    pub relevance_to_company: f64,
    pub originality_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngleSet {
    pub angles: Vec<Angle>,
    /// Zero-based index into `angles`. Range is checked at selection time, not here.
    #[serde(deserialize_with = "deserialize_index")]
    pub recommended_angle_index: i64,
}

impl AngleSet {
    /// The angle the generator recommended, if the index points at one.
    #[must_use]
    pub fn recommended(&self) -> Option<&Angle> {
        usize::try_from(self.recommended_angle_index)
            .ok()
            .and_then(|i| self.angles.get(i))
    }
}

impl StageOutput for AngleSet {
    const SHAPE: &'static str = r#"{
  "angles": [
    {
      "angle_name": "short name",
      "angle_description": "the approach",
      "differentiation": "how it differs from the original post",
      "hook_idea": "opening line idea",
      "relevance_to_company": 0,
      "originality_score": 0
    }
  ],
  "recommended_angle_index": 0
}"#;

    fn validate(&mut self) -> Result<(), Vec<String>> {
        let mut issues = Vec::new();
        let count = self.angles.len();
        if !(MIN_ANGLES..=MAX_ANGLES).contains(&count) {
            issues.push(format!(
                "angles: expected {MIN_ANGLES} to {MAX_ANGLES} entries, got {count}"
            ));
        }
        for (i, angle) in self.angles.iter().enumerate() {
            check_non_empty(&mut issues, &format!("angles[{i}].angle_name"), &angle.angle_name);
            check_score(
                &mut issues,
                &format!("angles[{i}].relevance_to_company"),
                angle.relevance_to_company,
            );
            check_score(
                &mut issues,
                &format!("angles[{i}].originality_score"),
                angle.originality_score,
            );
        }
        into_result(issues)
    }
}
