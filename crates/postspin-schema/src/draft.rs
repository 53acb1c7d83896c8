//! Writer and humanizer outputs.

use serde::{Deserialize, Serialize};

use crate::validation::{StageOutput, check_non_empty, check_score, into_result};

/// Most hashtags a post may carry.
pub const MAX_HASHTAGS: usize = 5;

/// First full draft from the writer stage, with its self-assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub draft_content: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    pub authenticity_score: f64,
    pub originality_score: f64,
    pub predicted_engagement: f64,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub ai_patterns_detected: Vec<String>,
    /// The writer's own verdict that the draft still reads as machine-written.
    pub needs_revision: bool,
}

/// One humanization pass over the current draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub revised_content: String,
    #[serde(default)]
    pub changes_made: Vec<String>,
    pub final_authenticity_score: f64,
    pub final_originality_score: f64,
    pub ready_to_publish: bool,
}

/// Trim, drop blanks, force a single leading `#` and remove case-insensitive duplicates.
fn normalize_hashtags(tags: &mut Vec<String>) {
    let mut seen = Vec::<String>::new();
    tags.retain_mut(|tag| {
        let bare = tag.trim().trim_start_matches('#').trim();
        if bare.is_empty() {
            return false;
        }
        let key = bare.to_lowercase();
        if seen.contains(&key) {
            return false;
        }
        seen.push(key);
        *tag = format!("#{bare}");
        true
    });
}

impl StageOutput for Draft {
    const SHAPE: &'static str = r##"{
  "draft_content": "the complete post",
  "hashtags": ["#Tag"],
  "authenticity_score": 0,
  "originality_score": 0,
  "predicted_engagement": 0,
  "strengths": ["what works"],
  "weaknesses": ["what to improve"],
  "ai_patterns_detected": ["machine-sounding phrases still present"],
  "needs_revision": false
}"##;

    fn validate(&mut self) -> Result<(), Vec<String>> {
        let mut issues = Vec::new();
        check_non_empty(&mut issues, "draft_content", &self.draft_content);
        normalize_hashtags(&mut self.hashtags);
        if self.hashtags.len() > MAX_HASHTAGS {
            issues.push(format!(
                "hashtags: at most {MAX_HASHTAGS} allowed, got {}",
                self.hashtags.len()
            ));
        }
        check_score(&mut issues, "authenticity_score", self.authenticity_score);
        check_score(&mut issues, "originality_score", self.originality_score);
        check_score(&mut issues, "predicted_engagement", self.predicted_engagement);
        into_result(issues)
    }
}

impl StageOutput for Revision {
    const SHAPE: &'static str = r#"{
  "revised_content": "the rewritten post",
  "changes_made": ["what was changed"],
  "final_authenticity_score": 0,
  "final_originality_score": 0,
  "ready_to_publish": false
}"#;

    fn validate(&mut self) -> Result<(), Vec<String>> {
        let mut issues = Vec::new();
        check_non_empty(&mut issues, "revised_content", &self.revised_content);
        check_score(
            &mut issues,
            "final_authenticity_score",
            self.final_authenticity_score,
        );
        check_score(
            &mut issues,
            "final_originality_score",
            self.final_originality_score,
        );
        into_result(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(hashtags: serde_json::Value) -> Draft {
        serde_json::from_value(json!({
            "draft_content": "We shipped late. Here's what it taught us.",
            "hashtags": hashtags,
            "authenticity_score": 88,
            "originality_score": 79,
            "predicted_engagement": 64,
            "needs_revision": false
        }))
        .unwrap()
    }

    #[test]
    fn hashtags_are_normalised() {
        let mut d = draft(json!(["leadership", "#Growth", " ##growth ", "", "#"]));
        d.validate().unwrap();
        assert_eq!(d.hashtags, vec!["#leadership", "#Growth"]);
    }

    #[test]
    fn too_many_hashtags_is_a_schema_issue() {
        let mut d = draft(json!(["a", "b", "c", "d", "e", "f"]));
        let issues = d.validate().unwrap_err();
        assert!(issues[0].contains("got 6"));
    }

    #[test]
    fn revision_rejects_blank_content() {
        let mut r: Revision = serde_json::from_value(json!({
            "revised_content": "",
            "final_authenticity_score": 91,
            "final_originality_score": 101,
            "ready_to_publish": true
        }))
        .unwrap();
        let issues = r.validate().unwrap_err();
        assert_eq!(issues.len(), 2);
        assert!(r.changes_made.is_empty());
    }

    #[test]
    fn needs_revision_is_required() {
        let err = serde_json::from_value::<Draft>(json!({
            "draft_content": "x",
            "authenticity_score": 88,
            "originality_score": 79,
            "predicted_engagement": 64
        }));
        assert!(err.is_err());
    }
}
