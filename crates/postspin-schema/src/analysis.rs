//! Analyzer stage output: what makes the source post work, abstracted away from its author.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr, VariantNames};

use crate::validation::{StageOutput, check_non_empty, check_score, into_result, parse_label};

/// How the first line grabs attention.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
    IntoStaticStr, VariantNames,
)]
#[serde(rename_all = "snake_case", try_from = "String")]
#[strum(serialize_all = "snake_case")]
pub enum HookType {
    Question,
    Statistic,
    Story,
    Controversial,
    HowTo,
    ListTeaser,
}

/// Shape of the post body.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
    IntoStaticStr, VariantNames,
)]
#[serde(rename_all = "snake_case", try_from = "String")]
#[strum(serialize_all = "snake_case")]
pub enum StructureType {
    Listicle,
    Narrative,
    Tutorial,
    Opinion,
    CaseStudy,
    Comparison,
}

/// What the closing line asks of the reader.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
    IntoStaticStr, VariantNames,
)]
#[serde(rename_all = "snake_case", try_from = "String")]
#[strum(serialize_all = "snake_case")]
pub enum CtaType {
    Question,
    Share,
    Comment,
    Link,
    Follow,
    None,
}

impl TryFrom<String> for HookType {
    type Error = String;
    fn try_from(raw: String) -> Result<Self, Self::Error> {
        parse_label(&raw)
    }
}

impl TryFrom<String> for StructureType {
    type Error = String;
    fn try_from(raw: String) -> Result<Self, Self::Error> {
        parse_label(&raw)
    }
}

impl TryFrom<String> for CtaType {
    type Error = String;
    fn try_from(raw: String) -> Result<Self, Self::Error> {
        parse_label(&raw)
    }
}

/// Structural and thematic breakdown of a high-performing post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub hook_type: HookType,
    /// The opening line, verbatim.
    pub hook_text: String,
    pub structure_type: StructureType,
    pub cta_type: CtaType,
    /// Abstract theme with no people, companies, products or events in it.
    pub universal_theme: String,
    pub core_message: String,
    pub emotional_trigger: String,
    #[serde(default)]
    pub engagement_drivers: Vec<String>,
    pub readability_score: f64,
    #[serde(default)]
    pub success_factors: Vec<String>,
    /// Details tied to the original author that must not reappear in the spin.
    #[serde(default)]
    pub company_specific_elements: Vec<String>,
    pub adaptability_score: f64,
    #[serde(default)]
    pub adaptation_challenges: Vec<String>,
}

impl StageOutput for Analysis {
    const SHAPE: &'static str = r#"{
  "hook_type": "question | statistic | story | controversial | how_to | list_teaser",
  "hook_text": "the exact opening line",
  "structure_type": "listicle | narrative | tutorial | opinion | case_study | comparison",
  "cta_type": "question | share | comment | link | follow | none",
  "universal_theme": "abstract theme, no names of people, companies, products or events",
  "core_message": "the central message in one sentence",
  "emotional_trigger": "curiosity | inspiration | fear | pride | ...",
  "engagement_drivers": ["personal_story | controversy | actionable_tips | data_backed | emotional_hook | community_question | formatting"],
  "readability_score": 0,
  "success_factors": ["why this post performs"],
  "company_specific_elements": ["author-specific details that must not be copied"],
  "adaptability_score": 0,
  "adaptation_challenges": ["what makes reuse hard"]
}"#;

    fn validate(&mut self) -> Result<(), Vec<String>> {
        let mut issues = Vec::new();
        check_non_empty(&mut issues, "hook_text", &self.hook_text);
        check_non_empty(&mut issues, "universal_theme", &self.universal_theme);
        check_non_empty(&mut issues, "core_message", &self.core_message);
        check_score(&mut issues, "readability_score", self.readability_score);
        check_score(&mut issues, "adaptability_score", self.adaptability_score);
        into_result(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "hook_type": "list_teaser",
            "hook_text": "5 mistakes that cost me my first startup",
            "structure_type": "listicle",
            "cta_type": "question",
            "universal_theme": "Learning from early failure",
            "core_message": "Mistakes compound unless you name them",
            "emotional_trigger": "curiosity",
            "engagement_drivers": ["personal_story", "actionable_tips"],
            "readability_score": 82,
            "success_factors": ["numbered list", "vulnerable tone"],
            "company_specific_elements": ["Acme Robotics", "Series A in 2019"],
            "adaptability_score": 74,
            "adaptation_challenges": []
        })
    }

    #[test]
    fn enums_accept_loose_spelling() {
        let mut value = sample();
        value["hook_type"] = json!("List-Teaser");
        value["structure_type"] = json!("Case Study");
        value["cta_type"] = json!("NONE");
        let analysis: Analysis = serde_json::from_value(value).unwrap();
        assert_eq!(analysis.hook_type, HookType::ListTeaser);
        assert_eq!(analysis.structure_type, StructureType::CaseStudy);
        assert_eq!(analysis.cta_type, CtaType::None);
    }

    #[test]
    fn enums_serialize_as_snake_case() {
        let analysis: Analysis = serde_json::from_value(sample()).unwrap();
        let out = serde_json::to_value(&analysis).unwrap();
        assert_eq!(out["hook_type"], "list_teaser");
        assert_eq!(HookType::HowTo.to_string(), "how_to");
    }

    #[test]
    fn unknown_hook_is_rejected_with_choices() {
        let mut value = sample();
        value["hook_type"] = json!("meme");
        let err = serde_json::from_value::<Analysis>(value).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unknown value 'meme'"), "{msg}");
        assert!(msg.contains("list_teaser"), "{msg}");
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let mut value = sample();
        let obj = value.as_object_mut().unwrap();
        obj.remove("success_factors");
        obj.remove("engagement_drivers");
        let analysis: Analysis = serde_json::from_value(value).unwrap();
        assert!(analysis.success_factors.is_empty());
        assert!(analysis.engagement_drivers.is_empty());
    }

    #[test]
    fn validate_flags_scores_and_blank_theme() {
        let mut analysis: Analysis = serde_json::from_value(sample()).unwrap();
        analysis.readability_score = 140.0;
        analysis.universal_theme = "  ".into();
        let issues = analysis.validate().unwrap_err();
        assert_eq!(issues.len(), 2);
    }
}
